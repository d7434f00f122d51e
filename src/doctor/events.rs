//! # Dispatch Events
//!
//! Structured events emitted by each [`Dispatcher`](super::dispatcher::Dispatcher)
//! as it processes a patient's stream. The dispatcher reports *what happened*
//! through an [`EventSink`]; *how it is displayed* is the sink's business.
//! The doctor binary installs a [`ConsoleSink`]; tests install a recording
//! sink and assert on the events directly.

use std::path::PathBuf;

use log::{info, warn};

/// Which fixed threshold rule a vitals reading tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalsWarningKind {
    /// Heart rate above 100 bpm
    HighHeartRate,
    /// Oxygen saturation below 95%
    LowOxygen,
}

/// One observable outcome of processing a patient connection.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// A vitals reading arrived and was reported.
    VitalsReport {
        patient_id: u32,
        temperature: f64,
        heart_rate: u32,
        oxygen_level: u32,
        note: String,
    },
    /// A vitals reading tripped a threshold rule. Purely informational;
    /// the reading itself is still reported in full.
    VitalsWarning {
        patient_id: u32,
        warning: VitalsWarningKind,
    },
    /// A received file was written to disk.
    FileSaved {
        patient_id: u32,
        path: PathBuf,
        byte_len: u64,
        file_type: String,
        description: String,
    },
    /// Writing a received file failed; the message was dropped and the
    /// connection kept alive.
    FileSaveFailed {
        patient_id: u32,
        file_name: String,
        error: String,
    },
    /// The patient closed the connection cleanly.
    Disconnected,
    /// The stream produced bytes that could not be decoded as a message;
    /// the connection was dropped.
    DecodeFailed { error: String },
}

/// Destination for dispatch events, injected into each dispatcher.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DispatchEvent);
}

/// Renders events as the doctor's terminal report, in the style of the
/// original console output, and mirrors them into the log.
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: DispatchEvent) {
        match event {
            DispatchEvent::VitalsReport {
                patient_id,
                temperature,
                heart_rate,
                oxygen_level,
                note,
            } => {
                println!("------------------------------------------------");
                println!("PATIENT {} REPORT:", patient_id);
                println!("   Heart Rate:  {} bpm", heart_rate);
                println!("   Oxygen:      {}%", oxygen_level);
                println!("   Temperature: {:.1}°C", temperature);
                println!("   NOTE:        {}", note);
                println!("------------------------------------------------");
            }
            DispatchEvent::VitalsWarning { patient_id, warning } => {
                let text = match warning {
                    VitalsWarningKind::HighHeartRate => "High Heart Rate",
                    VitalsWarningKind::LowOxygen => "Low Oxygen",
                };
                println!("   *** WARNING: {} ***", text);
                warn!("patient {}: {}", patient_id, text);
            }
            DispatchEvent::FileSaved {
                patient_id,
                path,
                byte_len,
                file_type,
                description,
            } => {
                println!("------------------------------------------------");
                println!("PATIENT {} FILE RECEIVED:", patient_id);
                println!("   Saved to:    {}", path.display());
                println!("   Size:        {} bytes", byte_len);
                println!("   Type:        {}", file_type);
                println!("   Description: {}", description);
                println!("------------------------------------------------");
            }
            DispatchEvent::FileSaveFailed {
                patient_id,
                file_name,
                error,
            } => {
                println!(
                    "   *** ERROR: could not save '{}' from patient {}: {} ***",
                    file_name, patient_id, error
                );
                warn!(
                    "failed to save '{}' from patient {}: {}",
                    file_name, patient_id, error
                );
            }
            DispatchEvent::Disconnected => {
                println!("Patient disconnected.");
                info!("patient disconnected");
            }
            DispatchEvent::DecodeFailed { error } => {
                println!("Error reading from patient: {}", error);
                warn!("dropping connection after decode failure: {}", error);
            }
        }
    }
}
