//! # Seed Data Generator
//!
//! Populates the database with a small demo catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p market-db --bin seed
//! cargo run -p market-db --bin seed -- --db ./data/market.db
//! ```

use std::env;

use market_db::{Database, DbConfig, NewProduct, NewVariant};

/// Demo catalog: (name, price_cents, description, tags, variants).
const CATALOG: &[(&str, i64, &str, &[&str], &[(&str, i64)])] = &[
    (
        "Sun-dried mango",
        180,
        "Chewy dried mango strips, no added sugar",
        &["snack", "fruit"],
        &[],
    ),
    (
        "Oolong tea",
        250,
        "High-mountain oolong, 150g",
        &["drink"],
        &[("loose leaf", 250), ("tea bags", 220)],
    ),
    (
        "Canvas tote",
        390,
        "Heavy cotton tote bag",
        &["goods"],
        &[("natural", 390), ("navy", 420), ("black", 420)],
    ),
    (
        "Peanut brittle",
        120,
        "Hand-cut, small batch",
        &["snack"],
        &[],
    ),
    (
        "Honey",
        450,
        "Longan honey, 700g jar",
        &["food"],
        &[],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut db_path = "./market.db".to_string();

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" => {
                i += 1;
                db_path = args
                    .get(i)
                    .cloned()
                    .ok_or("--db requires a path argument")?;
            }
            other => return Err(format!("Unknown argument: {}", other).into()),
        }
        i += 1;
    }

    println!("Seeding demo catalog into {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let products = db.products();

    for (name, price_cents, description, tags, variants) in CATALOG {
        let detail = products
            .create(NewProduct {
                name: name.to_string(),
                price_cents: *price_cents,
                is_active: true,
                image_url: String::new(),
                description: description.to_string(),
                tag_names: tags.iter().map(|t| t.to_string()).collect(),
                variants: variants
                    .iter()
                    .enumerate()
                    .map(|(idx, (vname, vprice))| NewVariant {
                        name: vname.to_string(),
                        price_cents: *vprice,
                        image_url: String::new(),
                        is_active: true,
                        sort_order: idx as i64,
                    })
                    .collect(),
            })
            .await?;

        println!(
            "  created #{} {} ({} variants)",
            detail.product.id,
            detail.product.name,
            detail.variants.len()
        );
    }

    println!("Done: {} products", CATALOG.len());
    Ok(())
}
