use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::listener::award_listener;
use super::mailbox::AwardMailbox;

/// Owns the listener task and its stop signal.
pub struct ListenerController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ListenerController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Bind the socket and spawn the listener. The task also stops when `stop_signal`
    /// is cancelled. Returns the bound address.
    pub async fn start(
        &mut self,
        bind_addr: SocketAddr,
        mailbox: AwardMailbox,
        stop_signal: &CancellationToken,
    ) -> Result<SocketAddr> {
        if self.handle.is_some() {
            bail!("award listener already running");
        }

        let socket = UdpSocket::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind award socket on {bind_addr}"))?;
        let local_addr = socket
            .local_addr()
            .context("failed to read award socket address")?;
        info!("listening for awards on udp://{local_addr}");

        let cancel_token = stop_signal.child_token();
        let handle = tokio::spawn(award_listener(socket, mailbox, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Cancel the listener and wait for it, so the socket is closed on return.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("award listener task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for ListenerController {
    fn default() -> Self {
        Self::new()
    }
}
