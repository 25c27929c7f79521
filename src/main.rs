// Callbox - Apartment callbox webhook
// Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use callbox::config::{load_config, CallboxConfig};
use callbox::server::CallboxServer;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "callbox")]
#[command(about = "Telephony webhook that lets visitors in with access codes", version)]
struct Args {
    /// Path to a TOML config file (default: ./callbox.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the webhook server (default)
    Serve {
        /// Bind address, overrides configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Load configuration, validate it and print a summary
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing();

    let mut config = load_config(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            CallboxServer::from_config(config)?.serve().await
        }
        Command::CheckConfig => {
            print_summary(&config);
            Ok(())
        }
    }
}

/// Initialize tracing
///
/// Default: INFO level, can be overridden with RUST_LOG env var
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}

fn print_summary(config: &CallboxConfig) {
    fn redact(value: Option<&str>) -> &'static str {
        match value {
            Some(_) => "<set>",
            None => "<unset>",
        }
    }

    println!("service_url:       {}", config.service_url);
    println!("service_key:       {}", redact(Some(config.service_key.as_str())));
    println!("fallback_number:   {}", config.fallback_number);
    println!(
        "error_report_url:  {}",
        config.error_report_url.as_deref().unwrap_or("<unset>")
    );
    println!(
        "account_sid:       {}",
        config.provider.account_sid.as_deref().unwrap_or("<unset>")
    );
    println!(
        "auth_token:        {}",
        redact(config.provider.auth_token.as_deref())
    );
    println!(
        "public_url:        {}",
        config.public_url.as_deref().unwrap_or("<unset>")
    );
    println!("bind_address:      {}", config.bind_address);
    println!("webhook_path:      {}", config.webhook_path);
    println!(
        "signatures:        {}",
        if config.signature_validation_enabled() {
            "validated"
        } else {
            "NOT validated"
        }
    );
}
