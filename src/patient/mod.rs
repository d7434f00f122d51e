//! # Patient Components
//!
//! The sending side of the relay: an interactive session that builds vitals
//! and file-transfer messages and writes them onto one connection to the
//! doctor.

pub mod session;

pub use session::PatientSession;
