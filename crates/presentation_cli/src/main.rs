//! Rail Madad CLI
//!
//! Command-line interface for gateway administration and smoke testing.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, SecurityValidator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "http://localhost:3001";

/// Rail Madad CLI
#[derive(Parser)]
#[command(name = "railmadad-cli")]
#[command(author, version, about = "Rail Madad gateway CLI", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health and the active target
    Status {
        /// Gateway URL
        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Send an SMS through the gateway
    ///
    /// Example: railmadad-cli sms --token $TOKEN --phone +911234567890 --message "PNR update"
    Sms {
        /// Recipient phone number
        #[arg(long)]
        phone: String,

        /// Message text
        #[arg(short, long)]
        message: String,

        /// Gateway bearer token
        #[arg(short, long, env = "RAILMADAD_TOKEN")]
        token: String,

        /// Use the gateway's local mock instead of forwarding upstream
        #[arg(long)]
        mock: bool,

        /// Gateway URL
        #[arg(short, long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Generate a random inbound token and print a config snippet for it
    GenerateToken {
        /// Target the token should route to
        #[arg(long, default_value = "local")]
        target: String,
    },

    /// Load the configuration, validate the topology and report security findings
    ///
    /// Exits non-zero when the configuration is invalid or has critical findings.
    CheckConfig {
        /// Configuration file (defaults to $RAILMADAD_CONFIG or ./config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Format endpoint URL
fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

const fn sms_path(mock: bool) -> &'static str {
    if mock { "/mock/api/sms" } else { "/sms" }
}

/// TOML snippet registering `token` for `target`
fn credential_snippet(token: &str, target: &str) -> String {
    format!("[[gateway.credentials]]\ntoken = \"{token}\"\ntarget = \"{target}\"")
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(Some(&path.to_string_lossy()))?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status { url } => {
            match client.get(endpoint_url(&url, "/health")).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body = resp.json::<serde_json::Value>().await?;
                    println!("📊 Gateway Status:");
                    println!("{}", serde_json::to_string_pretty(&body)?);
                },
                Ok(resp) => {
                    println!("❌ Unhealthy: HTTP {}", resp.status());
                    std::process::exit(1);
                },
                Err(e) => {
                    println!("❌ Unreachable: {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Sms {
            phone,
            message,
            token,
            mock,
            url,
        } => {
            println!("📨 Sending to {phone}{}", if mock { " (mock)" } else { "" });

            let resp = client
                .post(endpoint_url(&url, sms_path(mock)))
                .bearer_auth(token)
                .json(&serde_json::json!({ "phone": phone, "message": message }))
                .send()
                .await?;

            let status = resp.status();
            let body = resp.json::<serde_json::Value>().await.unwrap_or_default();

            if status.is_success() {
                println!("✅ HTTP {status}");
            } else {
                println!("❌ HTTP {status}");
            }
            println!("{}", serde_json::to_string_pretty(&body)?);

            if !status.is_success() {
                std::process::exit(1);
            }
        },

        Commands::GenerateToken { target } => {
            let token = uuid::Uuid::new_v4().to_string();

            println!("🔑 Token:");
            println!();
            println!("{token}");
            println!();
            println!("📋 Add to config.toml:");
            println!("{}", credential_snippet(&token, &target));
        },

        Commands::CheckConfig { config } => {
            let config = load_config(config.as_ref())?;

            let topology = match config.topology() {
                Ok(topology) => topology,
                Err(e) => {
                    println!("❌ Invalid gateway topology: {e}");
                    std::process::exit(1);
                },
            };

            println!("🧭 Environment: {}", config.environment.unwrap_or_default());
            println!("   Listen: {}", config.server.bind_address());
            println!("   Default target: {}", topology.default_target());
            for (name, target) in &config.gateway.targets {
                println!("   Target {name}: {}", target.base_url);
            }
            println!("   Credentials: {}", config.gateway.credentials.len());

            let warnings = SecurityValidator::validate(&config);
            if warnings.is_empty() {
                println!("✅ No security findings");
            }
            for warning in &warnings {
                println!(
                    "[{}] {}: {}\n   → {}",
                    warning.severity, warning.code, warning.message, warning.recommendation
                );
            }

            if warnings.iter().any(infrastructure::SecurityWarning::is_critical) {
                println!("❌ Critical findings present");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
