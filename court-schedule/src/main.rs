use std::collections::BTreeSet;

use court_schedule::config::load_config;
use court_schedule::display::{print_court_week, render_conflicts};
use court_schedule::parser::load_slots;
use court_schedule::schedule::find_conflicts;
use court_schedule::store::MemoryStore;
use court_schedule::web;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,actix_server=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("check") => {
            let Some(csv_path) = args.get(2) else {
                anyhow::bail!("usage: court-schedule check <slots.csv>");
            };
            check_snapshot(csv_path)
        }
        Some("web") | None => {
            let mut config = load_config()?;
            if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
                config.server.port = port;
            }

            let store = match &config.data.seed_csv {
                Some(path) => {
                    let slots = load_slots(path)?;
                    let conflicts = find_conflicts(&slots);
                    if !conflicts.is_empty() {
                        anyhow::bail!(
                            "{} refused, {} overlapping slot pairs:\n{}",
                            path.display(),
                            conflicts.len(),
                            render_conflicts(&conflicts)
                        );
                    }
                    tracing::info!("Loaded {} slots from {}", slots.len(), path.display());
                    MemoryStore::with_slots(slots)
                }
                None => MemoryStore::new(),
            };

            web::start_server(config, store).await?;
            Ok(())
        }
        Some(other) => anyhow::bail!("unknown command {:?}, expected `web [port]` or `check <csv>`", other),
    }
}

/// Prints each court's week from a snapshot and fails if any slots overlap
fn check_snapshot(csv_path: &str) -> anyhow::Result<()> {
    let slots = load_slots(csv_path)?;
    tracing::info!("Loaded {} slots from {}", slots.len(), csv_path);

    let courts: BTreeSet<_> = slots.iter().map(|slot| slot.court_id).collect();
    for court_id in courts {
        print_court_week(court_id, &slots);
    }

    let conflicts = find_conflicts(&slots);
    if conflicts.is_empty() {
        println!("\nNo overlapping slots.");
        return Ok(());
    }
    println!("\n{} overlapping slot pairs:", conflicts.len());
    print!("{}", render_conflicts(&conflicts));
    anyhow::bail!("snapshot violates the no-overlap rule")
}
