//! Generate JSON Schema for the docshelf configuration
//!
//! This binary generates a JSON Schema from the Config struct using schemars,
//! for editors that validate config files.
//!
//! Usage:
//!   cargo run --features dev-bins --bin generate_schema > config-schema.json

use docshelf::config::Config;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(Config);
    let output = serde_json::to_string_pretty(&schema).expect("Failed to serialize schema");
    println!("{}", output);
}
