//! # Doctor Binary Entry Point
//!
//! Thin wrapper that binds the doctor's listener and accepts patient
//! connections forever.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin doctor
//! cargo run --bin doctor -- --config config/doctor.toml
//! ```
//!
//! Without a config file the doctor listens on port 9090 and stores
//! received files under `received_files/`.

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;
use std::sync::Arc;

use vital_relay::common::config::{load_config, DoctorConfig};
use vital_relay::doctor::{ConsoleSink, DoctorServer};

/// Command-line arguments for the doctor binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the doctor configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config: DoctorConfig = match args.config {
        Some(path) => load_config(&path)?,
        None => DoctorConfig::default(),
    };

    println!(
        "Doctor's Terminal Running on {}...",
        config.listen.address
    );

    let server = DoctorServer::bind(&config, Arc::new(ConsoleSink)).await?;
    server.run().await;

    Ok(())
}
