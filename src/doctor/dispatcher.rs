//! # Per-Connection Dispatcher
//!
//! One dispatcher runs per accepted patient connection. It reads messages
//! off the connection in a loop, routes each by kind, and reports what it
//! sees through the injected [`EventSink`]. The loop ends when the patient
//! disconnects or the stream fails to decode; either way the socket is
//! released when the dispatcher drops its [`Connection`].
//!
//! Failures are scoped as narrowly as possible: a file that cannot be
//! written costs that one message, not the connection; a decode failure
//! costs the connection, never the process or any sibling connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::common::connection::Connection;
use crate::common::messages::Message;

use super::events::{DispatchEvent, EventSink, VitalsWarningKind};

/// Heart rate above this triggers a warning.
const HIGH_HEART_RATE_BPM: u32 = 100;
/// Oxygen saturation below this triggers a warning.
const LOW_OXYGEN_PERCENT: u32 = 95;

/// Evaluate the fixed vitals threshold rules.
///
/// Pure reporting: callers flag the returned warnings but never reject or
/// alter the reading because of them.
pub fn threshold_warnings(heart_rate: u32, oxygen_level: u32) -> Vec<VitalsWarningKind> {
    let mut warnings = Vec::new();
    if heart_rate > HIGH_HEART_RATE_BPM {
        warnings.push(VitalsWarningKind::HighHeartRate);
    }
    if oxygen_level < LOW_OXYGEN_PERCENT {
        warnings.push(VitalsWarningKind::LowOxygen);
    }
    warnings
}

/// Reads and routes every message on one patient connection.
pub struct Dispatcher {
    conn: Connection,
    received_root: PathBuf,
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(conn: Connection, received_root: PathBuf, sink: Arc<dyn EventSink>) -> Self {
        Self {
            conn,
            received_root,
            sink,
        }
    }

    /// Run the dispatch loop until the patient disconnects or the stream
    /// fails to decode. Never returns an error: both terminal conditions
    /// are reported as events and end only this connection.
    pub async fn run(mut self) {
        loop {
            match self.conn.read_message().await {
                Ok(Some(Message::Vitals {
                    patient_id,
                    temperature,
                    heart_rate,
                    oxygen_level,
                    note,
                })) => {
                    self.handle_vitals(patient_id, temperature, heart_rate, oxygen_level, note);
                }
                Ok(Some(Message::FileTransfer {
                    patient_id,
                    file_name,
                    content,
                    byte_len,
                    file_type,
                    description,
                })) => {
                    self.handle_file(patient_id, file_name, content, byte_len, file_type, description)
                        .await;
                }
                Ok(None) => {
                    self.sink.emit(DispatchEvent::Disconnected);
                    break;
                }
                Err(e) => {
                    self.sink.emit(DispatchEvent::DecodeFailed {
                        error: format!("{:#}", e),
                    });
                    break;
                }
            }
        }
        // Connection dropped here; the socket closes exactly once.
    }

    fn handle_vitals(
        &self,
        patient_id: u32,
        temperature: f64,
        heart_rate: u32,
        oxygen_level: u32,
        note: String,
    ) {
        debug!(
            "vitals from patient {}: hr={} spo2={} temp={:.1}",
            patient_id, heart_rate, oxygen_level, temperature
        );

        self.sink.emit(DispatchEvent::VitalsReport {
            patient_id,
            temperature,
            heart_rate,
            oxygen_level,
            note,
        });

        for warning in threshold_warnings(heart_rate, oxygen_level) {
            self.sink
                .emit(DispatchEvent::VitalsWarning { patient_id, warning });
        }
    }

    async fn handle_file(
        &self,
        patient_id: u32,
        file_name: String,
        content: Vec<u8>,
        byte_len: u64,
        file_type: String,
        description: String,
    ) {
        let path = patient_file_path(&self.received_root, patient_id, &file_name);

        match save_file(&path, &content).await {
            Ok(()) => {
                info!(
                    "saved {} bytes from patient {} to {}",
                    byte_len,
                    patient_id,
                    path.display()
                );
                self.sink.emit(DispatchEvent::FileSaved {
                    patient_id,
                    path,
                    byte_len,
                    file_type,
                    description,
                });
            }
            Err(e) => {
                // Drop this one message, keep the connection alive.
                self.sink.emit(DispatchEvent::FileSaveFailed {
                    patient_id,
                    file_name,
                    error: format!("{:#}", e),
                });
            }
        }
    }
}

/// Destination path for a received file: `<root>/Patient_<id>/<file_name>`.
///
/// An existing file at that path is overwritten without warning.
pub fn patient_file_path(received_root: &Path, patient_id: u32, file_name: &str) -> PathBuf {
    received_root
        .join(format!("Patient_{}", patient_id))
        .join(file_name)
}

async fn save_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}
