// crates/projectile-cli/src/report.rs
//
// Output DTOs and renderers for the subcommands.

use std::io::{self, Write};

use anyhow::Result;
use projectile_aim::{GradResult, GridSample};
use projectile_core::{rad_to_deg, Float, LaunchProfile, Point};
use projectile_pointmass::FlightSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SimulationReport<'a> {
    pub profile: String,
    pub summary: FlightSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<&'a [Point]>,
}

#[derive(Debug, Serialize)]
pub struct AimReport {
    pub result: GradResult,
    pub alpha_deg: Float,
    pub beta_deg: Float,
    /// Input profile with the found angles written back
    pub profile: String,
    pub summary: FlightSummary,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_summary(profile: &LaunchProfile, s: &FlightSummary) {
    println!("profile       {profile}");
    println!("landing       ({:.3}, {:.3}, {:.3})", s.landing.x, s.landing.y, s.landing.z);
    println!("distance      {:.3}", s.distance);
    println!("flight time   {:.3}", s.flight_time);
    println!("max height    {:.3}", s.max_height);
    println!("impact speed  {:.3}", s.impact_speed);
    println!("impact angle  {:.2} deg", rad_to_deg(s.impact_angle));
}

pub fn print_points(points: &[Point]) {
    println!();
    println!("{:>10} {:>10} {:>10}", "x", "y", "z");
    for p in points {
        println!("{:>10.4} {:>10.4} {:>10.4}", p.x, p.y, p.z);
    }
}

pub fn print_aim(result: &GradResult, aimed: &LaunchProfile, s: &FlightSummary) {
    println!("outcome       {:?} after {} iterations", result.outcome, result.iterations);
    println!("alpha         {:.4} deg", aimed.alpha_deg);
    println!("beta          {:.4} deg", aimed.beta_deg);
    println!("miss          {:.4}", result.func_value);
    print_summary(aimed, s);
}

pub fn print_csv(samples: &[GridSample]) {
    println!("alpha,error,beta");
    for s in samples {
        println!("{},{},{}", s.alpha, s.error, s.beta);
    }
}
