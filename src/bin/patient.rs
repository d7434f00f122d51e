//! # Patient Binary Entry Point
//!
//! Thin wrapper that connects to the doctor and runs the interactive
//! patient session.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin patient
//! cargo run --bin patient -- --config config/patient.toml
//! cargo run --bin patient -- --patient-id 204
//! ```
//!
//! Without a config file the patient connects to 127.0.0.1:9090 as
//! patient 101.

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

use vital_relay::common::config::{load_config, PatientConfig};
use vital_relay::patient::PatientSession;

/// Command-line arguments for the patient binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the patient configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Patient ID (overrides the value from the config file)
    #[arg(long)]
    patient_id: Option<u32>,
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
        .filter_level(LevelFilter::Warn)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let mut config: PatientConfig = match args.config {
        Some(path) => load_config(&path)?,
        None => PatientConfig::default(),
    };

    if let Some(id) = args.patient_id {
        config.patient.id = id;
    }

    let session = match PatientSession::connect(&config.doctor.address, config.patient.id).await {
        Ok(session) => session,
        Err(e) => {
            println!("Connection Error: {:#}", e);
            return Ok(());
        }
    };

    if let Err(e) = session.run().await {
        println!("Connection Error: {:#}", e);
    }

    Ok(())
}
