// crates/projectile-cli/src/main.rs
//
// `projectile` command line: simulate, aim, grid, profile.

mod report;

use std::{fs, ops::ControlFlow, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use projectile_aim::{optimize, AimGuess, AngleGrid, GradParams};
use projectile_core::{deg_to_rad, ExternalParams, Float, Gravity, LaunchProfile, Point};
use projectile_pointmass::simulate;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "projectile",
    version,
    about = "Projectile trajectories with quadratic drag, wind and automatic aiming"
)]
struct Cli {
    /// Log more on stderr (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Integrate one flight and report where it lands
    Simulate(SimulateArgs),
    /// Search launch angles that put the landing point on a target
    Aim(AimArgs),
    /// Sample the target error over a grid of launch angles
    Grid(GridArgs),
    /// Normalize a profile string and show the environment it describes
    Profile(ProfileArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GridFormat {
    Csv,
    Json,
}

/* ------------------------------ launch inputs ----------------------------- */

#[derive(Debug, Args)]
struct LaunchArgs {
    /// Launch profile `h0;v0;alpha;beta;u;gamma;mu;m;dt` (angles in degrees). Replaces the flags below.
    #[arg(long, allow_hyphen_values = true)]
    profile: Option<LaunchProfile>,

    /// Launch height
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    h0: Float,
    /// Launch speed
    #[arg(long, default_value_t = 10.0)]
    v0: Float,
    /// Elevation above the horizontal [deg]
    #[arg(long, default_value_t = 45.0, allow_negative_numbers = true)]
    alpha: Float,
    /// Azimuth, measured from +y towards +x [deg]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    beta: Float,
    #[arg(long, default_value_t = 0.0)]
    wind_speed: Float,
    /// Direction the wind blows towards, same convention as beta [deg]
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    wind_direction: Float,
    /// Quadratic drag coefficient
    #[arg(long, default_value_t = 0.0)]
    mu: Float,
    #[arg(long, default_value_t = 1.0)]
    mass: Float,
    /// Integration time step
    #[arg(long, default_value_t = 0.01)]
    dt: Float,

    #[arg(long, default_value_t = Gravity::STANDARD.g)]
    gravity: Float,
    /// Abort a flight after this many integration steps
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: usize,
}

impl LaunchArgs {
    fn profile(&self) -> LaunchProfile {
        self.profile.unwrap_or(LaunchProfile {
            h0: self.h0,
            v0: self.v0,
            alpha_deg: self.alpha,
            beta_deg: self.beta,
            wind_speed: self.wind_speed,
            wind_direction_deg: self.wind_direction,
            mu: self.mu,
            mass: self.mass,
            dt: self.dt,
        })
    }

    fn external_params(&self, h_end: Float) -> ExternalParams {
        ExternalParams {
            gravity: Gravity { g: self.gravity },
            max_steps: self.max_steps,
            ..self.profile().external_params(h_end)
        }
    }
}

fn target_point(values: &[Float]) -> Result<Point> {
    match values {
        [x, y, h] => Ok(Point::new(*x, *y, *h)),
        _ => bail!("--target takes exactly three values: X Y H"),
    }
}

/* -------------------------------- commands -------------------------------- */

#[derive(Debug, Args)]
struct SimulateArgs {
    #[command(flatten)]
    launch: LaunchArgs,
    /// Height of the termination plane
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    h_end: Float,
    /// Also print every integration point
    #[arg(long)]
    trajectory: bool,
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Debug, Args)]
struct AimArgs {
    #[command(flatten)]
    launch: LaunchArgs,
    /// Target position. H is also the height of the termination plane.
    #[arg(
        long,
        required = true,
        num_args = 3,
        value_names = ["X", "Y", "H"],
        allow_negative_numbers = true
    )]
    target: Vec<Float>,
    /// Optimizer settings as JSON; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Finite-difference step for alpha [rad]
    #[arg(long)]
    da: Option<Float>,
    /// Finite-difference step for beta [rad]
    #[arg(long)]
    db: Option<Float>,
    #[arg(long)]
    step_a: Option<Float>,
    #[arg(long)]
    step_b: Option<Float>,
    #[arg(long)]
    max_iter: Option<usize>,
    /// Stop once the landing point is this close to the target
    #[arg(long)]
    tolerance: Option<Float>,
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

impl AimArgs {
    /// Defaults, then the config file, then individual flags.
    fn grad_params(&self) -> Result<GradParams> {
        let mut grad = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading optimizer settings from {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing optimizer settings in {}", path.display()))?
            }
            None => GradParams::default(),
        };
        if let Some(v) = self.da {
            grad.da = v;
        }
        if let Some(v) = self.db {
            grad.db = v;
        }
        if let Some(v) = self.step_a {
            grad.step_a = v;
        }
        if let Some(v) = self.step_b {
            grad.step_b = v;
        }
        if let Some(v) = self.max_iter {
            grad.max_iter = v;
        }
        if let Some(v) = self.tolerance {
            grad.tolerance = v;
        }
        Ok(grad)
    }
}

#[derive(Debug, Args)]
struct GridArgs {
    #[command(flatten)]
    launch: LaunchArgs,
    /// Target position. H is also the height of the termination plane.
    #[arg(
        long,
        required = true,
        num_args = 3,
        value_names = ["X", "Y", "H"],
        allow_negative_numbers = true
    )]
    target: Vec<Float>,
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    alpha_min: Float,
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    alpha_max: Float,
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    beta_min: Float,
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    beta_max: Float,
    /// Spacing of both axes [deg]
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    step: Float,
    #[arg(long, value_enum, default_value_t = GridFormat::Csv)]
    format: GridFormat,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    /// Profile string `h0;v0;alpha;beta;u;gamma;mu;m;dt`
    #[arg(allow_hyphen_values = true)]
    profile: LaunchProfile,
    /// Height of the termination plane
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    h_end: Float,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Simulate(args) => run_simulate(args),
        Command::Aim(args) => run_aim(args),
        Command::Grid(args) => run_grid(args),
        Command::Profile(args) => run_profile(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let profile = args.launch.profile();
    let params = args.launch.external_params(args.h_end);
    debug!(%profile, h_end = args.h_end, "simulating");

    let flight = simulate(&profile.launch(), &params).context("simulation failed")?;
    let summary = flight.summary(params.dt);

    match args.format {
        Format::Table => {
            report::print_summary(&profile, &summary);
            if args.trajectory {
                report::print_points(flight.points());
            }
        }
        Format::Json => report::print_json(&report::SimulationReport {
            profile: profile.to_string(),
            summary,
            trajectory: args.trajectory.then(|| flight.points()),
        })?,
    }
    Ok(())
}

fn run_aim(args: &AimArgs) -> Result<()> {
    let target = target_point(&args.target)?;
    let grad = args.grad_params()?;
    let profile = args.launch.profile();
    let params = args.launch.external_params(target.z);
    let guess = AimGuess {
        v0: profile.v0,
        alpha: deg_to_rad(profile.alpha_deg),
        beta: deg_to_rad(profile.beta_deg),
    };

    let mut logged_decile = None;
    let result = optimize(&grad, &guess, &target, &params, |percent| {
        let decile = percent / 10;
        if logged_decile != Some(decile) {
            info!(percent, "aiming");
            logged_decile = Some(decile);
        }
        ControlFlow::Continue(())
    })
    .context("aim search failed")?;

    let aimed = profile.with_angles(result.alpha, result.beta);
    let flight = simulate(&aimed.launch(), &params).context("simulating the aimed shot failed")?;
    let summary = flight.summary(params.dt);

    match args.format {
        Format::Table => report::print_aim(&result, &aimed, &summary),
        Format::Json => report::print_json(&report::AimReport {
            result,
            alpha_deg: aimed.alpha_deg,
            beta_deg: aimed.beta_deg,
            profile: aimed.to_string(),
            summary,
        })?,
    }
    Ok(())
}

fn run_grid(args: &GridArgs) -> Result<()> {
    let target = target_point(&args.target)?;
    let params = args.launch.external_params(target.z);
    let grid = AngleGrid::new(
        deg_to_rad(args.alpha_min),
        deg_to_rad(args.alpha_max),
        deg_to_rad(args.beta_min),
        deg_to_rad(args.beta_max),
        deg_to_rad(args.step),
    )
    .context("invalid angle grid")?;

    let samples = grid
        .sample(args.launch.profile().v0, &target, &params)
        .context("grid sampling failed")?;

    match args.format {
        GridFormat::Csv => report::print_csv(&samples),
        GridFormat::Json => report::print_json(&samples)?,
    }
    Ok(())
}

fn run_profile(args: &ProfileArgs) -> Result<()> {
    println!("{}", args.profile);
    report::print_json(&args.profile.external_params(args.h_end))
}

/* ---------------------------------- tests --------------------------------- */
