use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use claw_dashboard::api::{self, AppState};
use claw_dashboard::derivation::token_count_text;
use claw_dashboard::Config;

#[derive(Parser)]
#[command(name = "clawdash")]
#[command(about = "Monitoring dashboard API for OpenClaw agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API
    Serve {
        #[arg(long, help = "Port to listen on")]
        port: Option<u16>,

        #[arg(long, help = "Address to bind")]
        host: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print one overview aggregate as JSON and exit
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, help = "Path to the openclaw binary")]
    bin: Option<String>,

    #[arg(long, help = "Per-query timeout in milliseconds")]
    timeout_ms: Option<u64>,

    #[arg(long, help = "OpenClaw profile to query")]
    profile: Option<String>,

    #[arg(long, value_name = "FILE", help = "TOML file with agent names and emoji")]
    agents: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Read canned tool output from this directory")]
    fixtures: Option<PathBuf>,
}

impl SourceArgs {
    fn apply(self, config: &mut Config) {
        if let Some(bin) = self.bin {
            config.bin = bin;
        }
        if let Some(timeout_ms) = self.timeout_ms.filter(|t| *t > 0) {
            config.timeout_ms = timeout_ms;
        }
        if self.profile.is_some() {
            config.profile = self.profile;
        }
        if self.agents.is_some() {
            config.agents_file = self.agents;
        }
        if self.fixtures.is_some() {
            config.fixtures = self.fixtures;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Serve { port, host, source } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            source.apply(&mut config);
            serve(config).await?
        }
        Commands::Snapshot { source } => {
            source.apply(&mut config);
            snapshot(config).await?
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;
    let dashboard = config.dashboard()?;

    log::info!(
        "Loaded {} agent profiles{}",
        dashboard.directory().len(),
        if config.development {
            " (development mode)"
        } else {
            ""
        }
    );

    let state = AppState::new(dashboard).with_error_details(config.development);
    api::serve(state, addr).await
}

async fn snapshot(config: Config) -> Result<()> {
    let dashboard = config.dashboard()?;
    let overview = dashboard.overview().await?;

    log::info!(
        "{} agents ({} active), {} tokens, overall {}",
        overview.totals.agents,
        overview.totals.active_agents,
        token_count_text(overview.totals.total_tokens),
        overview.health.overall.as_str()
    );

    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}
