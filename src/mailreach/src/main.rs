//! mailreach: dynamic contact segmentation for email campaign targeting.
//!
//! Serves the contact-group API, or evaluates groups once from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mailreach_api::ApiServer;
use mailreach_cache::{RosterCache, RosterCacheSettings};
use mailreach_contacts::{ContactSource, HttpContactSource, StaticContactSource};
use mailreach_core::config::AppConfig;
use mailreach_core::SystemClock;
use mailreach_segmentation::SegmentationEngine;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "mailreach")]
#[command(about = "Dynamic contact segmentation for email campaign targeting")]
#[command(version)]
struct Cli {
    /// Read contacts from a JSON file instead of the Contacts API
    #[arg(long, global = true, env = "MAILREACH__ROSTER_FILE")]
    roster: Option<PathBuf>,

    /// Contacts API base URL (overrides config)
    #[arg(long, global = true, env = "MAILREACH__CONTACTS_API__BASE_URL")]
    contacts_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// HTTP port (overrides config)
        #[arg(long, env = "MAILREACH__API__HTTP_PORT")]
        http_port: Option<u16>,

        /// Do not start the Prometheus exporter
        #[arg(long, default_value_t = false)]
        no_metrics: bool,
    },
    /// Evaluate every contact group once and print it as JSON
    Groups,
    /// Print the deduplicated recipient list for the given groups
    Recipients {
        #[arg(required = true)]
        group_ids: Vec<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipientsOutput {
    emails: Vec<String>,
    estimated_total: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailreach=info,tower_http=info".into()),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(url) = cli.contacts_url {
        config.contacts_api.base_url = url;
    }

    let source: Arc<dyn ContactSource> = match &cli.roster {
        Some(path) => Arc::new(StaticContactSource::from_json_file(path)?),
        None => Arc::new(HttpContactSource::new(&config.contacts_api)?),
    };

    let cache = RosterCache::new(
        source,
        Arc::new(SystemClock),
        RosterCacheSettings::from(&config),
    );
    let engine = Arc::new(SegmentationEngine::new(Arc::new(cache)));

    match cli.command.unwrap_or(Command::Serve {
        http_port: None,
        no_metrics: false,
    }) {
        Command::Serve {
            http_port,
            no_metrics,
        } => {
            if let Some(port) = http_port {
                config.api.http_port = port;
            }

            info!(
                node_id = %config.node_id,
                http_port = config.api.http_port,
                contacts_api = %config.contacts_api.base_url,
                cache_ttl_secs = config.segmentation.cache_ttl_secs,
                "Configuration loaded"
            );

            let server = ApiServer::new(config.clone(), engine);
            if config.metrics.enabled && !no_metrics {
                if let Err(e) = server.start_metrics() {
                    error!(error = %e, "Failed to start metrics exporter");
                }
            }

            server.start_http().await?;
        }
        Command::Groups => {
            let outcome = engine.evaluate_groups().await;
            if let Some(reason) = &outcome.degraded {
                warn!(reason = %reason, "Contact groups are degraded");
            }
            println!("{}", serde_json::to_string_pretty(&outcome.groups)?);
        }
        Command::Recipients { group_ids } => {
            engine.evaluate_groups().await;
            let output = RecipientsOutput {
                emails: engine.get_contact_emails_for_groups(group_ids.as_slice()).await,
                estimated_total: engine.get_total_recipients_for_groups(group_ids.as_slice()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
