//! # Doctor Components
//!
//! The receiving side of the relay:
//!
//! - [`acceptor`]: listens for patient connections and spawns one
//!   dispatcher task per connection
//! - [`dispatcher`]: per-connection read-and-route loop
//! - [`events`]: structured dispatch events and the sinks that render them

pub mod acceptor;
pub mod dispatcher;
pub mod events;

pub use acceptor::DoctorServer;
pub use dispatcher::Dispatcher;
pub use events::{ConsoleSink, DispatchEvent, EventSink, VitalsWarningKind};
