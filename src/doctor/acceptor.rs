//! # Connection Acceptor
//!
//! Binds the doctor's TCP listener and accepts patient connections forever.
//! Each accepted connection gets its own tokio task running a fresh
//! [`Dispatcher`](super::dispatcher::Dispatcher); the accept loop never
//! waits on any dispatcher, so one slow patient cannot stall another's
//! connection from being accepted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};
use tokio::net::TcpListener;

use crate::common::config::DoctorConfig;
use crate::common::connection::Connection;

use super::dispatcher::Dispatcher;
use super::events::EventSink;

/// The doctor's listening endpoint.
pub struct DoctorServer {
    listener: TcpListener,
    received_root: PathBuf,
    sink: Arc<dyn EventSink>,
}

impl DoctorServer {
    /// Bind the listener. This is the only failure in the system that is
    /// fatal to the whole process.
    pub async fn bind(config: &DoctorConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen.address)
            .await
            .with_context(|| format!("failed to bind to {}", config.listen.address))?;

        info!("doctor's terminal listening on {}", config.listen.address);

        Ok(Self {
            listener,
            received_root: config.storage.received_root.clone(),
            sink,
        })
    }

    /// The address the listener actually bound to. Lets callers bind port 0
    /// and discover the assigned port.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, spawning one dispatcher task per patient.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    info!(">>> new patient connected from {}", addr);

                    let dispatcher = Dispatcher::new(
                        Connection::new(socket),
                        self.received_root.clone(),
                        Arc::clone(&self.sink),
                    );
                    tokio::spawn(dispatcher.run());
                }
                Err(e) => error!("accept error: {}", e),
            }
        }
    }
}
