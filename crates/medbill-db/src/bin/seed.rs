//! # Seed Data Generator
//!
//! Populates a development database with demo invoices.
//!
//! ## Usage
//! ```bash
//! # Generate 200 invoices (default)
//! cargo run -p medbill-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p medbill-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p medbill-db --bin seed -- --db ./data/medbill.db
//! ```
//!
//! Each invoice bills one of a fixed set of demo patients for one to four
//! clinic services, with an occasional discount, tax or courier charge.
//! Invoices go through the normal `create_invoice` path, so they are numbered
//! and totalled exactly as the API would.

use chrono::{Duration, NaiveDate};
use medbill_core::{InvoiceDraft, LineItem, Money, NegativeTotalPolicy, PatientSnapshot};
use medbill_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::env;

/// Demo patients: (UHID, name, email)
const PATIENTS: &[(&str, &str, &str)] = &[
    ("UHID-0001", "Asha Rao", "asha.rao@example.com"),
    ("UHID-0002", "Ravi Kumar", "ravi.kumar@example.com"),
    ("UHID-0003", "Meera Iyer", ""),
    ("UHID-0004", "John Mathew", "john.m@example.com"),
    ("UHID-0005", "Fatima Sheikh", "fatima@example.com"),
    ("UHID-0006", "Karthik Nair", ""),
    ("UHID-0007", "Priya Sharma", "priya.s@example.com"),
    ("UHID-0008", "Arjun Reddy", "arjun.reddy@example.com"),
];

/// Clinic services: (description, unit price in paise)
const SERVICES: &[(&str, i64)] = &[
    ("General consultation", 50_000),
    ("Specialist consultation", 120_000),
    ("Complete blood count", 35_000),
    ("Lipid profile", 65_000),
    ("X-ray chest PA view", 45_000),
    ("ECG", 30_000),
    ("Dressing", 15_000),
    ("Injection administration", 8_000),
    ("Ultrasound abdomen", 150_000),
    ("Physiotherapy session", 60_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./medbill_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("MedBill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of invoices to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./medbill_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 MedBill Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Invoices: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.invoices().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} invoices", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating invoices...");

    let repo = db.invoices();
    let base_date = NaiveDate::from_ymd_opt(2026, 1, 1).ok_or("invalid base date")?;
    let mut generated = 0;
    let start = std::time::Instant::now();

    for seed in 0..count {
        let draft = generate_draft(seed, base_date);
        match repo.create_invoice(&draft, NegativeTotalPolicy::Allow).await {
            Ok(_) => generated += 1,
            Err(e) => eprintln!("Failed to create invoice {}: {}", seed, e),
        }

        if generated > 0 && generated % 50 == 0 {
            println!("  Generated {} invoices...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} invoices in {:?}", generated, elapsed);

    println!();
    println!("Verifying search...");
    let hits = repo.search("asha").await?;
    println!("  Search 'asha': {} results", hits.len());
    let hits = repo.search("example.com").await?;
    println!("  Search 'example.com': {} results", hits.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a deterministic demo draft.
fn generate_draft(seed: usize, base_date: NaiveDate) -> InvoiceDraft {
    let (patient_id, patient_name, email) = PATIENTS[seed % PATIENTS.len()];

    let line_count = 1 + seed % 4;
    let line_items = (0..line_count)
        .map(|n| {
            let (description, paise) = SERVICES[(seed * 7 + n * 3) % SERVICES.len()];
            let quantity = Decimal::from(1 + ((seed + n) % 3) as i64);
            LineItem::new(description, quantity, Money::from_minor(paise))
        })
        .collect();

    // Every fifth invoice gets a discount, every third a flat tax.
    let discount = if seed % 5 == 0 {
        Money::from_minor(5_000)
    } else {
        Money::zero()
    };
    let tax = if seed % 3 == 0 {
        Money::from_minor(2_500)
    } else {
        Money::zero()
    };
    let shipping = if seed % 11 == 0 {
        Money::from_minor(10_000)
    } else {
        Money::zero()
    };

    InvoiceDraft {
        patient: PatientSnapshot {
            patient_id: patient_id.to_string(),
            patient_name: patient_name.to_string(),
            address: format!("{} Hospital Road, Bengaluru", 10 + seed % 90),
            phone: format!("98450{:05}", seed % 100_000),
            email: email.to_string(),
        },
        date: Some(base_date + Duration::days((seed % 120) as i64)),
        line_items,
        discount,
        tax,
        shipping,
        remarks: if seed % 4 == 0 {
            "Follow-up visit recommended".to_string()
        } else {
            String::new()
        },
        total: None,
    }
}
