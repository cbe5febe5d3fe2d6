use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin hash-password <PASSWORD> [COST]");
        std::process::exit(1);
    });

    let cost = match env::args().nth(2).map(|raw| raw.parse::<u32>()) {
        None => DEFAULT_COST,
        Some(Ok(cost)) => cost,
        Some(Err(_)) => {
            eprintln!("COST must be a whole number (bcrypt accepts 4 to 31)");
            std::process::exit(1);
        }
    };

    match hash(&password, cost) {
        Ok(hashed) => {
            println!("\nCost     : {}", cost);
            println!("Hash     : {}\n", hashed);
            println!("# Paste this into your .env (and drop ADMIN_PASSWORD):");
            println!("ADMIN_PASSWORD_HASH={}", hashed);
            println!("BCRYPT_COST={}", cost);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
