use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "grove", version, about = "Grove focus timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Set focus and break lengths in minutes
    Durations {
        /// Focus minutes (5-120)
        #[arg(value_name = "FOCUS", allow_negative_numbers = true)]
        focus: f64,
        /// Break minutes (1-60)
        #[arg(value_name = "BREAK", allow_negative_numbers = true)]
        break_minutes: f64,
    },
    /// Chime and ambient sound preferences
    Sound {
        #[command(subcommand)]
        action: commands::sound::SoundAction,
    },
    /// Host settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Durations {
            focus,
            break_minutes,
        } => commands::timer::set_durations(focus, break_minutes),
        Commands::Sound { action } => commands::sound::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
