use anyhow::Result;
use clap::{Parser, Subcommand};
use gesturecam::{GestureApp, GestureProfiles, GesturecamConfig, LoopOptions, ShutdownReason};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "gesturecam")]
#[command(about = "Webcam hand gesture recognition with sound feedback")]
#[command(version)]
#[command(long_about = "Tracks a hand from a webcam or recorded frames, classifies the motion \
trail (point, lines, circle) or static hand poses from landmark model output, and plays a \
sound for each recognized gesture with per-gesture cooldowns.")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, default_value = "gesturecam.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Print the gesture profile table and exit
    #[arg(long, help = "Print configured gesture profiles and exit")]
    print_gestures: bool,

    /// Enable keyboard controls (q quit, s sound, r reset, c clear, g gestures, k calibrate)
    #[arg(short, long, global = true)]
    keyboard: bool,

    /// Disable sound output
    #[arg(long, global = true)]
    no_sound: bool,

    /// Stop after this many frames
    #[arg(long, value_name = "N", global = true)]
    max_frames: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Track the hand centroid and classify its motion trail
    Trail {
        /// Replay images from this directory instead of the camera
        #[arg(long, value_name = "DIR")]
        frames: Option<String>,
    },
    /// Classify static hand poses from recorded landmark output (JSON lines)
    Pose {
        #[arg(long, value_name = "FILE")]
        landmarks: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle special modes that don't require full initialization
    if args.print_config {
        println!("# Gesturecam configuration file with all defaults");
        println!();
        print!("{}", GesturecamConfig::default().to_toml()?);
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting gesturecam v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let mut config = GesturecamConfig::load_from_file(&args.config).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    config.validate()?;

    if args.print_gestures {
        let profiles = GestureProfiles::load_or_init(&config.gestures.profiles_path)?;
        print!("{}", profiles.render_table());
        return Ok(());
    }

    if args.no_sound {
        config.sound.enabled = false;
    }

    let command = args.command.unwrap_or(Command::Trail { frames: None });
    if let Command::Trail {
        frames: Some(dir), ..
    } = &command
    {
        config.camera.frames_dir = Some(dir.clone());
    }

    let mut app = GestureApp::new(config).with_options(LoopOptions {
        max_frames: args.max_frames,
    });
    app.set_keyboard_enabled(args.keyboard);

    let outcome = match command {
        Command::Trail { .. } => app.run_trail().await,
        Command::Pose { landmarks } => app.run_pose(landmarks).await,
    }
    .map_err(|e| {
        error!("Session failed: {}", e);
        e
    })?;

    info!(
        "Processed {} frames, {} gestures fired",
        outcome.stats.frames_processed, outcome.stats.gestures_fired
    );

    // Conventional exit status for a signal-terminated process
    if outcome.reason == ShutdownReason::Signal {
        std::process::exit(130);
    }
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gesturecam={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}
