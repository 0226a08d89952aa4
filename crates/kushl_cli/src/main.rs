//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `kushl_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use kushl_core::db::open_db_in_memory;
use kushl_core::db::migrations::latest_version;

fn main() {
    println!("kushl_core version={}", kushl_core::core_version());
    println!("kushl_core schema_version={}", latest_version());

    match open_db_in_memory() {
        Ok(_) => println!("kushl_core store=ok"),
        Err(err) => {
            eprintln!("kushl_core store=error {err}");
            std::process::exit(1);
        }
    }
}
