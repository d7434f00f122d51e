//! # Configuration Utilities
//!
//! TOML configuration structures and parsing for the doctor and patient
//! binaries. Both configs have defaults matching the fixed addresses of the
//! original deployment, so the binaries run without a config file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default port the doctor listens on.
pub const DEFAULT_PORT: u16 = 9090;

/// Load a TOML configuration file and deserialize it into the specified type.
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Complete doctor-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorConfig {
    /// Where the doctor listens for patient connections
    pub listen: ListenConfig,
    /// Where received files are stored
    pub storage: StorageConfig,
}

/// Listener address configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Address to bind the TCP listener to (e.g., "0.0.0.0:9090")
    pub address: String,
}

/// Storage location for received files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for received files; one `Patient_<id>` subdirectory
    /// is created per patient as files arrive.
    pub received_root: PathBuf,
}

impl Default for DoctorConfig {
    fn default() -> Self {
        Self {
            listen: ListenConfig {
                address: format!("0.0.0.0:{}", DEFAULT_PORT),
            },
            storage: StorageConfig {
                received_root: PathBuf::from("received_files"),
            },
        }
    }
}

/// Complete patient-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientConfig {
    /// Information about this patient
    pub patient: PatientInfo,
    /// How to reach the doctor
    pub doctor: DoctorAddress,
}

/// Identity of the patient running this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Patient identifier included in every message
    pub id: u32,
}

/// Network address of the doctor endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAddress {
    /// Host:port of the doctor's listener (e.g., "127.0.0.1:9090")
    pub address: String,
}

impl Default for PatientConfig {
    fn default() -> Self {
        Self {
            patient: PatientInfo { id: 101 },
            doctor: DoctorAddress {
                address: format!("127.0.0.1:{}", DEFAULT_PORT),
            },
        }
    }
}
