//! swell-sync command line

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use swell_sync::logger::init_logger_with_file;
use swell_sync::{SyncConfig, SyncController, SyncEngine};

#[derive(Debug, Parser)]
#[command(name = "swell-sync", version, about = "Surf school sync engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Keep the local mirror in sync until Ctrl-C
    Run,
    /// Print the locally mirrored state without contacting the store
    Status,
    /// Create the bootstrap admin account if missing
    EnsureAdmin,
    /// Import bookings from the configured website feed
    ImportWebsite,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = SyncConfig::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    let engine = Arc::new(SyncEngine::from_config(&config).context("failed to build sync engine")?);

    match cli.command {
        Command::Run => run(engine, &config).await,
        Command::Status => {
            print_status(&engine);
            Ok(())
        }
        Command::EnsureAdmin => {
            let check = engine.ensure_admin().await;
            println!("{}", check.message);
            if !check.success {
                if check.is_rls_error {
                    bail!("row-level security blocked the admin insert; check the partners table policies");
                }
                bail!("admin bootstrap failed");
            }
            Ok(())
        }
        Command::ImportWebsite => {
            engine.refresh().await.context("initial resync failed")?;
            let report = engine.sync_with_website().await?;
            println!("added {}, skipped {}", report.added, report.skipped);
            Ok(())
        }
    }
}

async fn run(engine: Arc<SyncEngine>, config: &SyncConfig) -> anyhow::Result<()> {
    let mut changes = engine.mirror().subscribe();
    let handle = SyncController::new(engine.clone(), config).spawn();
    let mut last_status = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = changes.borrow_and_update().clone();
                let status = (state.is_online, state.realtime_status);
                if last_status != Some(status) {
                    tracing::info!(
                        online = state.is_online,
                        realtime = %state.realtime_status,
                        reservations = state.reservations.len(),
                        "Sync state changed"
                    );
                    last_status = Some(status);
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn print_status(engine: &SyncEngine) {
    let state = engine.snapshot();
    let session = state
        .session
        .as_ref()
        .map_or("(signed out)".to_string(), |s| format!("{} ({:?})", s.username, s.role));

    println!("session:       {session}");
    println!("language:      {:?}", state.language);
    println!("last sync:     {}", state.last_sync.as_deref().unwrap_or("never"));
    println!("classes:       {} ({} active)", state.classes.len(), state.active_classes().count());
    println!("reservations:  {}", state.reservations.len());
    println!("expenses:      {}", state.expenses.len());
    println!("revenues:      {}", state.revenues.len());
    println!("partners:      {}", state.partners.len());
    if !state.website_api_url.is_empty() {
        println!("website feed:  {}", state.website_api_url);
    }
}
