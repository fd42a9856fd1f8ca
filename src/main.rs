use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use choreolib::config::{parse_period, Config};
use choreolib::player::{LogSink, Player};
use choreolib::{Loader, SwerveSample, Trajectory, TrajectoryCache};

#[derive(Parser)]
#[command(name = "choreolib")]
#[command(about = "Inspect and replay robot trajectories")]
struct Cli {
    /// YAML config file
    #[arg(long, global = true)]
    config: Option<String>,
    /// Deploy directory holding the .chor and .traj files
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a trajectory file
    Validate { name: String },
    /// Print the interpolated state at a time (seconds)
    Sample {
        name: String,
        #[arg(allow_negative_numbers = true)]
        time: f64,
        #[arg(long)]
        split: Option<usize>,
    },
    /// Replay a trajectory against the clock
    Play {
        name: String,
        #[arg(long)]
        split: Option<usize>,
        /// Tick period, e.g. 20ms
        #[arg(long)]
        period: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let dir = cli.dir.unwrap_or_else(|| config.deploy.dir.clone());
    let mut cache = TrajectoryCache::<SwerveSample>::new(Arc::new(Loader::new(dir)));

    match cli.command {
        Commands::Validate { name } => validate(&mut cache, &name),
        Commands::Sample { name, time, split } => sample(&mut cache, &name, time, split),
        Commands::Play {
            name,
            split,
            period,
        } => {
            let period = match period {
                Some(p) => parse_period(&p),
                None => config.playback.period(),
            };
            match period {
                Ok(period) => play(&mut cache, &name, split, period),
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn fetch(
    cache: &mut TrajectoryCache<SwerveSample>,
    name: &str,
    split: Option<usize>,
) -> Option<Arc<Trajectory<SwerveSample>>> {
    let result = match split {
        Some(index) => cache.load_split(name, index),
        None => cache.load(name),
    };
    match result {
        Ok(Some(trajectory)) => Some(trajectory),
        Ok(None) => {
            eprintln!("Could not load trajectory {}", name);
            None
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

fn validate(cache: &mut TrajectoryCache<SwerveSample>, name: &str) -> ExitCode {
    let Some(trajectory) = fetch(cache, name, None) else {
        return ExitCode::FAILURE;
    };

    println!(
        "Trajectory {} is valid ({} samples, {:.3}s)",
        trajectory.name(),
        trajectory.samples().len(),
        trajectory.total_time()
    );
    for (i, start) in trajectory.splits().iter().enumerate() {
        println!("  split {}: starts at sample {}", i, start);
    }
    for marker in trajectory.events() {
        println!("  event {} @ {:.3}s", marker.event, marker.timestamp);
    }
    ExitCode::SUCCESS
}

fn sample(
    cache: &mut TrajectoryCache<SwerveSample>,
    name: &str,
    time: f64,
    split: Option<usize>,
) -> ExitCode {
    let Some(trajectory) = fetch(cache, name, split) else {
        return ExitCode::FAILURE;
    };

    let Some(state) = trajectory.sample_at(time) else {
        eprintln!("Trajectory {} has no samples", trajectory.name());
        return ExitCode::FAILURE;
    };

    match serde_json::to_string_pretty(&state) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding sample: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn play(
    cache: &mut TrajectoryCache<SwerveSample>,
    name: &str,
    split: Option<usize>,
    period: std::time::Duration,
) -> ExitCode {
    let Some(trajectory) = fetch(cache, name, split) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async {
        let mut player = Player::new(period);
        if let Err(e) = player.run(trajectory, LogSink).await {
            eprintln!("Playback error: {}", e);
            return ExitCode::FAILURE;
        }
        player.wait().await;

        if let Ok(json) = serde_json::to_string_pretty(&player.status()) {
            println!("{}", json);
        }
        ExitCode::SUCCESS
    })
}
