// Serving loop supervisor — keeps the frame server running until shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::handler::{FrameServer, SharedSequencer};

pub struct Supervisor {
    sequencer: SharedSequencer,
    addr: SocketAddr,
    restart_delay: Duration,
}

impl Supervisor {
    pub fn new(sequencer: SharedSequencer, addr: SocketAddr, restart_delay: Duration) -> Self {
        Self {
            sequencer,
            addr,
            restart_delay,
        }
    }

    /// Run the server, restarting it whenever it stops or fails to bind,
    /// until `shutdown` is cancelled. Returns the number of restarts.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<u32> {
        let mut restarts = 0u32;

        loop {
            if shutdown.is_cancelled() {
                return Ok(restarts);
            }

            match FrameServer::start(self.sequencer.clone(), self.addr).await {
                Ok(mut server) => {
                    info!("frame server listening on {}", server.local_addr());
                    let exited = tokio::select! {
                        result = server.wait() => Some(result),
                        _ = shutdown.cancelled() => None,
                    };
                    match exited {
                        Some(Ok(())) => warn!("frame server exited unexpectedly, restarting"),
                        Some(Err(e)) => warn!("frame server died: {}, restarting", e),
                        None => {
                            debug!("shutdown requested, stopping frame server");
                            server.shutdown().await?;
                            return Ok(restarts);
                        }
                    }
                }
                Err(e) => warn!("cannot start frame server on {}: {}", self.addr, e),
            }

            restarts += 1;
            tokio::select! {
                _ = tokio::time::sleep(self.restart_delay) => {}
                _ = shutdown.cancelled() => return Ok(restarts),
            }
        }
    }
}
