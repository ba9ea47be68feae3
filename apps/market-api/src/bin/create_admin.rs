//! # Admin Account Bootstrap
//!
//! Creates an admin user for the management surface.
//!
//! ## Usage
//! ```bash
//! cargo run -p market-api --bin create-admin -- <username> <password>
//! cargo run -p market-api --bin create-admin -- boss s3cret --db ./market.db
//! ```
//!
//! The password is argon2-hashed before storage; pick a strong one for
//! production.

use std::env;

use market_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut positional = Vec::new();
    let mut db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./market.db".to_string());

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
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let [username, password] = positional.as_slice() else {
        eprintln!("Usage: create-admin <username> <password> [--db <path>]");
        std::process::exit(2);
    };

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let created = db.admin_users().create(username, password).await?;

    println!("Created admin user '{}' (id {})", created.username, created.id);
    Ok(())
}
