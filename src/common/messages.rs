//! # Message Protocol
//!
//! Defines the two message types a patient can send to the doctor:
//! - Vitals readings (structured telemetry plus an optional note)
//! - File transfers (a binary attachment plus descriptive metadata)
//!
//! Messages are serialized to JSON and sent over TCP with a 4-byte length
//! prefix. The externally-tagged JSON enum encoding makes the message kind
//! self-describing, so the receiver needs no prior negotiation to tell a
//! vitals record from a file payload.

use serde::{Deserialize, Serialize};

/// Core message enum for all patient-to-doctor communication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// **Vitals Reading**
    ///
    /// A single telemetry snapshot from a patient.
    ///
    /// # Fields
    /// - `patient_id`: Identifier of the patient sending the reading
    /// - `temperature`: Body temperature in degrees Celsius
    /// - `heart_rate`: Heart rate in beats per minute
    /// - `oxygen_level`: Blood oxygen saturation in percent
    /// - `note`: Free-text symptom note (may be empty)
    Vitals {
        patient_id: u32,
        temperature: f64,
        heart_rate: u32,
        oxygen_level: u32,
        note: String,
    },

    /// **File Transfer**
    ///
    /// A binary medical file (scan, lab report, ...) sent as a single message.
    ///
    /// # Fields
    /// - `patient_id`: Identifier of the patient sending the file
    /// - `file_name`: Original file name, used as the saved name on the doctor side
    /// - `content`: Raw file bytes
    /// - `byte_len`: Length of `content`; always equal to `content.len()`
    /// - `file_type`: Free-text category, e.g. "image", "lab_report", "xray"
    /// - `description`: Free-text description of the file
    FileTransfer {
        patient_id: u32,
        file_name: String,
        content: Vec<u8>,
        byte_len: u64,
        file_type: String,
        description: String,
    },
}

impl Message {
    /// Build a `FileTransfer` message, deriving `byte_len` from the content
    /// so the two can never disagree.
    pub fn file_transfer(
        patient_id: u32,
        file_name: String,
        content: Vec<u8>,
        file_type: String,
        description: String,
    ) -> Self {
        let byte_len = content.len() as u64;
        Message::FileTransfer {
            patient_id,
            file_name,
            content,
            byte_len,
            file_type,
            description,
        }
    }

    /// Serialize a message to JSON bytes for transmission over the network.
    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a message from JSON bytes received from the network.
    ///
    /// Fails on malformed JSON or an unknown message kind.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
