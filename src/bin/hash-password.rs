//! Print a bcrypt hash for `ADMIN_PASSWORD_HASH`.
//!
//! Usage: hash-password <PASSWORD> [COST]

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let mut args = env::args().skip(1);
    let password = args.next().unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin hash-password <PASSWORD> [COST]");
        std::process::exit(1);
    });
    let cost = match args.next() {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            eprintln!("COST must be a number between 4 and 31, got '{}'", raw);
            std::process::exit(1);
        }),
        None => DEFAULT_COST,
    };

    match hash(&password, cost) {
        Ok(hashed) => {
            println!("Cost : {}", cost);
            println!("Hash : {}\n", hashed);
            println!("# Add this to your .env so the seeded admin uses it:");
            println!("ADMIN_PASSWORD_HASH={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
