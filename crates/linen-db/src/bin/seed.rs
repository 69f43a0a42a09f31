//! # Seed Data Generator
//!
//! Populates the database with linen categories, clients and batches for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 40 batches (default)
//! cargo run -p linen-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p linen-db --bin seed -- --batches 200
//!
//! # Specify database path
//! cargo run -p linen-db --bin seed -- --db ./data/linen.db
//!
//! # Different VAT rate
//! LINEN_VAT_RATE_BPS=2000 cargo run -p linen-db --bin seed
//!
//! # More log output
//! RUST_LOG=linen_db=debug cargo run -p linen-db --bin seed
//! ```
//!
//! ## Generated Data
//! - Linen categories across Bedding, Bath, Table and Staff sections
//! - A handful of clients
//! - Batches spread over the last months: roughly one in four comes back
//!   short or with extra items, one in five is express, and older batches
//!   are advanced through washing, completed and delivered

use chrono::{Duration, NaiveDate, Utc};
use linen_core::{BatchStatus, EngineConfig, ItemRecord, LinenCategory, Money};
use linen_db::{Database, DbConfig, NewBatch, NewCategory, NewClient};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (section, name, price in cents)
const CATEGORIES: &[(&str, &str, i64)] = &[
    ("Bedding", "Single Sheet", 350),
    ("Bedding", "Double Sheet", 450),
    ("Bedding", "Duvet Cover", 900),
    ("Bedding", "Pillow Case", 150),
    ("Bath", "Bath Towel", 400),
    ("Bath", "Hand Towel", 200),
    ("Bath", "Bath Mat", 300),
    ("Bath", "Bathrobe", 1200),
    ("Table", "Tablecloth", 800),
    ("Table", "Napkin", 100),
    ("Staff", "Chef Jacket", 1100),
    ("Staff", "Apron", 450),
];

const CLIENTS: &[&str] = &[
    "Harbour Hotel",
    "Alpine Lodge",
    "St. Mary's Clinic",
    "The Olive Tree Restaurant",
    "Seaside Guest House",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut batch_count: usize = 40;
    let mut db_path = String::from("./linen_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--batches" | "-b" => {
                if i + 1 < args.len() {
                    batch_count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Linen Ops Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --batches <N>  Number of batches to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./linen_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, batches = batch_count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path))
        .await?
        .with_engine_config(EngineConfig::from_env()?);

    let existing = db.categories().list_active().await?;
    if !existing.is_empty() {
        warn!(
            categories = existing.len(),
            "Database already has data; skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    // Categories
    let mut categories: Vec<LinenCategory> = Vec::with_capacity(CATEGORIES.len());
    for (section, name, cents) in CATEGORIES {
        let category = db
            .categories()
            .insert(NewCategory {
                name: name.to_string(),
                price: Money::from_cents(*cents),
                section: Some(section.to_string()),
            })
            .await?;
        categories.push(category);
    }
    info!(count = categories.len(), "Categories created");

    // Clients
    let mut client_ids = Vec::with_capacity(CLIENTS.len());
    for name in CLIENTS {
        let client = db
            .clients()
            .insert(NewClient {
                name: name.to_string(),
                email: Some(format!(
                    "linen@{}.example",
                    name.to_lowercase().replace(|c: char| !c.is_alphanumeric(), "")
                )),
                ..NewClient::default()
            })
            .await?;
        client_ids.push(client.id);
    }
    info!(count = client_ids.len(), "Clients created");

    // Batches
    let today = Utc::now().date_naive();
    let start = std::time::Instant::now();
    let mut created = 0;

    for seed in 0..batch_count {
        let pickup_date = today - Duration::days((batch_count - seed) as i64 * 2);
        let new = NewBatch {
            client_id: client_ids[seed % client_ids.len()].clone(),
            paper_batch_id: None,
            pickup_date,
            notes: (seed % 7 == 0).then(|| "Collected from service entrance".to_string()),
            items: generate_items(&categories, seed),
        };

        let batch = match db.batches().create(new).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(seed, error = %e, "Failed to create batch");
                continue;
            }
        };

        for status in target_path(pickup_date, today) {
            db.batches().update_status(&batch.id, status).await?;
        }

        created += 1;
    }

    info!(
        created,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batches created"
    );

    let totals = db.batches().dashboard_totals().await?;
    println!("{}", serde_json::to_string_pretty(&totals)?);

    Ok(())
}

/// Builds 2 to 5 items; every fourth batch has a count mismatch and every
/// fifth is express.
fn generate_items(categories: &[LinenCategory], seed: usize) -> Vec<ItemRecord> {
    let count = 2 + seed % 4;

    (0..count)
        .map(|n| {
            let category = &categories[(seed * 3 + n * 5) % categories.len()];
            let sent = 5 + ((seed * 17 + n * 11) % 60) as i64;
            let received = match (seed % 4, n) {
                (0, 0) => sent - 1 - (seed % 3) as i64,
                (3, 1) => sent + 1,
                _ => sent,
            };

            ItemRecord {
                linen_category_id: category.id.clone(),
                quantity_sent: sent,
                quantity_received: received.max(0),
                price_per_item: category.price().to_decimal(),
                express_delivery: seed % 5 == 0,
                discrepancy_details: (received != sent)
                    .then(|| format!("Counted {received} of {sent} at sorting")),
            }
        })
        .collect()
}

/// Statuses to walk through so older batches look processed.
fn target_path(pickup_date: NaiveDate, today: NaiveDate) -> Vec<BatchStatus> {
    let age = (today - pickup_date).num_days();
    let steps = match age {
        a if a > 14 => 3,
        a if a > 6 => 2,
        a if a > 2 => 1,
        _ => 0,
    };

    BatchStatus::ALL[1..=steps].to_vec()
}
