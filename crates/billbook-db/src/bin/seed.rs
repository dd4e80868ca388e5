//! # Demo Data Seeder
//!
//! Walks one document through the whole workflow so a fresh database has
//! something to show: quotation → sent → accepted → invoice → paid.
//!
//! ## Usage
//! ```bash
//! # Use billbook.toml / environment for the database location
//! cargo run -p billbook-db --bin seed
//!
//! # Specify database path
//! cargo run -p billbook-db --bin seed -- --db ./data/billbook.db
//!
//! # Specify config file
//! cargo run -p billbook-db --bin seed -- --config ./billbook.toml
//! ```

use billbook_core::{
    DocumentCalculator, DocumentDraft, InvoiceStatus, LineItem, Money, Party, PaymentMode,
    PaymentRequest, QuotationStatus, Rate, TaxBreakdown,
};
use billbook_db::{BillingConfig, Database, DocumentService};
use chrono::{Duration, Utc};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_OWNER: &str = "demo-user";

/// Initializes logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=billbook=trace` - Show trace for billbook crates only
/// - Default: INFO, DEBUG for billbook
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,billbook=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn demo_draft() -> DocumentDraft {
    let mut client = Party::new("Acme Traders Pvt Ltd", "accounts@acmetraders.in");
    client.address = "14 MG Road, Bengaluru 560001".to_string();
    client.pan_number = Some("ABCDE1234F".to_string());
    client.gst_number = Some("29ABCDE1234F1Z5".to_string());

    let mut issuer = Party::new("Billbook Studio", "billing@billbook.studio");
    issuer.address = "2 Residency Road, Bengaluru 560025".to_string();

    DocumentDraft {
        client,
        issuer,
        items: vec![
            LineItem::new("li-1", "Website redesign", 1, Money::from_major_minor(4500, 0)),
            LineItem::new("li-2", "Hosting (12 months)", 12, Money::from_major_minor(150, 0)),
        ],
        // intrastate: 9% CGST + 9% SGST
        taxes: TaxBreakdown::intrastate(Rate::from_bps(900), Rate::from_bps(900)),
        discount_rate: Rate::zero(),
        notes: "Payment due within 15 days.".to_string(),
        due_date: Some((Utc::now() + Duration::days(15)).date_naive()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Billbook Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: from config)");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = BillingConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }

    println!("Billbook Demo Seeder");
    println!("====================");
    println!("Database: {}", config.database_path().display());
    println!();

    if let Some(parent) = config.database_path().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    let service = DocumentService::new(
        Arc::new(db.documents()),
        DocumentCalculator::new(config.discount_policy()),
    );

    let quotation = service.create_quotation(DEMO_OWNER, demo_draft()).await?;
    println!("✓ Quotation {} created: {}", quotation.number, quotation.total());

    for next in [QuotationStatus::Sent, QuotationStatus::Accepted] {
        service
            .transition_quotation(DEMO_OWNER, &quotation.id, next)
            .await?;
        println!("  → {}", next);
    }

    let conversion = service.convert_quotation(DEMO_OWNER, &quotation.id).await?;
    let invoice = conversion.invoice;
    println!("✓ Converted to invoice {} ({})", invoice.number, invoice.status);

    let payment = PaymentRequest::new(PaymentMode::Upi).with_upi_id("acmetraders@okaxis");
    let paid = service
        .transition_invoice(DEMO_OWNER, &invoice.id, InvoiceStatus::Paid, Some(&payment))
        .await?;
    println!("✓ Invoice {} marked {}", paid.number, paid.status);

    let summary = service.summary(DEMO_OWNER).await?;
    println!();
    println!("Dashboard");
    println!("  Received:    {}", summary.received);
    println!("  Outstanding: {}", summary.outstanding);
    println!("  Invoices:    {}", summary.total_count());

    info!(owner = DEMO_OWNER, "Seed complete");
    db.close().await;

    println!();
    println!("✓ Seed complete!");
    Ok(())
}
