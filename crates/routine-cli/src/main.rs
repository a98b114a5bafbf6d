use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "routine", version, about = "Routine OS CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Daily statistics
    Stats(commands::stats::StatsArgs),
    /// Mood tracking
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Plugin management
    Plugin {
        #[command(subcommand)]
        action: commands::plugin::PluginAction,
    },
    /// Hydration tracker (requires the hydration plugin)
    Hydration {
        #[command(subcommand)]
        action: commands::hydration::HydrationAction,
    },
    /// Coach feedback and chat
    Coach {
        #[command(subcommand)]
        action: commands::coach::CoachAction,
    },
    /// Show a day's timeline
    Timeline(commands::timeline::TimelineArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROUTINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action).await,
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Plugin { action } => commands::plugin::run(action),
        Commands::Hydration { action } => commands::hydration::run(action),
        Commands::Coach { action } => commands::coach::run(action).await,
        Commands::Timeline(args) => commands::timeline::run(args).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
