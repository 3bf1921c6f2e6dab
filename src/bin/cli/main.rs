mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::CulinairyClient;
use culinairy::config;
use output::{OutputConfig, OutputFormat};
use std::process;

/// Server URL used when neither the flag, the environment nor the config file name one
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// CLI for the CulinAIry meal planner
#[derive(Parser, Debug)]
#[clap(name = "culinairy-cli", about = "CLI for the CulinAIry meal planner")]
struct Cli {
    /// Server URL to connect to
    #[clap(
        long,
        env = "CULINAIRY_URL",
        global = true
    )]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the server is up
    Health,
    /// Browse and search recipes
    #[command(subcommand)]
    Recipe(commands::recipe::RecipeCommands),
    /// Generate and manage meal plans
    #[command(subcommand)]
    Plan(commands::plan::PlanCommands),
    /// Talk to the meal-planning assistant
    #[command(subcommand)]
    Ai(commands::ai::AiCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    // Try reading from config file
    let config_dir = config::get_config_dir_path();
    if let Some(ref dir) = config_dir {
        let config_path = dir.join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path))
            && let Some(url) = update.server_url
        {
            return url;
        }
    }

    DEFAULT_SERVER_URL.to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    // ClientError::Request wraps reqwest errors; check for connection issues
    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is culinairy running?\n  {}",
            err_string
        );
    }

    // ClientError::Server already formats as "Server error (STATUS): message"
    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = CulinairyClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Health => commands::health::execute(&client, &output_config).await,
        Commands::Recipe(cmd) => commands::recipe::execute(&client, cmd, &output_config).await,
        Commands::Plan(cmd) => commands::plan::execute(&client, cmd, &output_config).await,
        Commands::Ai(cmd) => commands::ai::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
