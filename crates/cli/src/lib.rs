pub mod commands;
pub mod logging;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use shopdesk_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "shopdesk",
    about = "Shopdesk sales assistant CLI",
    long_about = "Chat with the sales backend, inspect configuration, and check backend readiness.",
    after_help = "Examples:\n  shopdesk chat\n  shopdesk send \"running shoes under 2000\"\n  shopdesk doctor --json"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Path to a shopdesk.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override backend.base_url")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Override session.customer_id")]
    customer_id: Option<String>,
}

impl GlobalArgs {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                base_url: self.base_url.clone(),
                customer_id: self.customer_id.clone(),
                ..ConfigOverrides::default()
            },
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session on stdin (`/quit` to leave)")]
    Chat,
    #[command(about = "Send a single message and print the resulting transcript")]
    Send {
        #[arg(help = "Message text")]
        text: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and probe the backend health endpoint")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    let result = match cli.command {
        Command::Chat => commands::chat::run(options),
        Command::Send { text, json } => commands::send::run(options, &text, json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(options) }
        }
        Command::Doctor { json } => commands::doctor::run(options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
