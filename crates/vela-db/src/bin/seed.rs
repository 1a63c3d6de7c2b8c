//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p vela-db --bin seed
//!
//! # Specify database path
//! cargo run -p vela-db --bin seed -- --db ./data/vela.db
//! ```
//!
//! Each product gets a retail and a wholesale price, a barcode and a stock
//! level; a few carry packaged variants with their own barcodes.

use chrono::Utc;
use std::env;
use uuid::Uuid;
use vela_core::{Product, ProductVariant};
use vela_db::{Database, DbConfig};

/// Demo products: (sku, name, retail cents, wholesale cents, stock, barcode).
const PRODUCTS: &[(&str, &str, i64, i64, i64, &str)] = &[
    ("WATER-500", "Mineral Water", 350, 280, 120, "7891000100103"),
    ("JUICE-OR", "Orange Juice", 890, 720, 48, "7891000100110"),
    ("COFFEE-250", "Ground Coffee 250g", 1590, 1290, 36, "7891000100127"),
    ("RICE-5KG", "White Rice 5kg", 2490, 2090, 60, "7891000100134"),
    ("OIL-OLIVE", "Olive Oil", 2500, 2000, 25, "7891000100141"),
    ("SOAP-BAR", "Bar Soap", 250, 190, 200, "7891000100158"),
    ("PASTA-500", "Spaghetti 500g", 620, 495, 90, "7891000100165"),
    ("SUGAR-1KG", "Sugar 1kg", 480, 390, 75, "7891000100172"),
];

/// Packaged variants: (product sku, label, price delta cents, barcode).
const VARIANTS: &[(&str, &str, i64, &str)] = &[
    ("WATER-500", "1.5L", 150, "7891000200100"),
    ("JUICE-OR", "Box of 6", 4200, "7891000200117"),
    ("OIL-OLIVE", "500ml", 300, "7891000200124"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./vela_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vela POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./vela_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Vela POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let now = Utc::now();
    let mut ids_by_sku: Vec<(String, String)> = Vec::new();

    for (sku, name, retail, wholesale, stock, barcode) in PRODUCTS {
        let id = Uuid::new_v4().to_string();
        db.products()
            .insert(&Product {
                id: id.clone(),
                sku: sku.to_string(),
                barcode: Some(barcode.to_string()),
                name: name.to_string(),
                description: None,
                retail_price_cents: *retail,
                wholesale_price_cents: *wholesale,
                current_stock: *stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
        ids_by_sku.push((sku.to_string(), id));
    }

    for (sku, label, delta, barcode) in VARIANTS {
        let product_id = ids_by_sku
            .iter()
            .find(|(s, _)| s == sku)
            .map(|(_, id)| id.clone())
            .expect("variant references a seeded product");

        db.products()
            .insert_variant(&ProductVariant {
                id: Uuid::new_v4().to_string(),
                product_id,
                label: label.to_string(),
                barcode: Some(barcode.to_string()),
                price_adjustment_cents: *delta,
            })
            .await?;
    }

    println!("✓ Seeded {} products, {} variants", PRODUCTS.len(), VARIANTS.len());
    println!();
    println!("Done.");

    Ok(())
}
