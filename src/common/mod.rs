//! # Common Components
//!
//! Shared utilities and data structures used by both the patient and doctor
//! components.
//!
//! ## Modules
//!
//! - [`messages`]: Protocol message definitions for patient-to-doctor communication
//! - [`connection`]: TCP connection abstraction with message framing
//! - [`config`]: Configuration parsing utilities

pub mod config;
pub mod connection;
pub mod messages;
