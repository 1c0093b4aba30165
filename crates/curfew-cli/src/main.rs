use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "curfew", version, about = "Curfew Notifier CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the curfew countdown and home status
    Status {
        /// Print a human-readable line instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Notification rule management
    Rules {
        #[command(subcommand)]
        action: commands::rules::RulesAction,
    },
    /// Post the reminder for a rule right now
    Emulate {
        /// Lead time of the rule, in minutes
        minutes: u32,
    },
    /// Home location management
    Home {
        #[command(subcommand)]
        action: commands::home::HomeAction,
    },
    /// Fetch the news feed
    News {
        /// Print items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run the curfew monitor until interrupted
    Run {
        /// JSON file with the current location fix
        #[arg(long)]
        location_file: Option<std::path::PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CURFEW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status { text } => commands::status::run(text),
        Commands::Rules { action } => commands::rules::run(action),
        Commands::Emulate { minutes } => commands::emulate::run(minutes),
        Commands::Home { action } => commands::home::run(action),
        Commands::News { json } => commands::news::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Run { location_file } => commands::monitor::run(location_file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
