//! # vital-relay
//!
//! A minimal telemetry relay: patients periodically transmit vital-sign
//! readings and occasional binary file attachments to a central doctor
//! endpoint over a persistent TCP connection. One long-lived stream per
//! patient carries both message kinds; the doctor fans out one independent
//! dispatcher task per connected patient.

pub mod common;
pub mod doctor;
pub mod patient;

pub use common::messages::Message;
