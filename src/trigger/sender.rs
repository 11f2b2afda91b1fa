use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use tokio::net::{lookup_host, UdpSocket};

use crate::award::protocol::encode_award;

/// Where awards go when no host is configured.
pub const BROADCAST_FALLBACK: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 255);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Host(String),
    Broadcast,
}

impl Destination {
    pub fn from_host(host: Option<&str>) -> Self {
        match host {
            Some(host) => Destination::Host(host.to_string()),
            None => Destination::Broadcast,
        }
    }
}

/// Fire-and-forget award datagrams. No retries and no acknowledgement.
pub struct AwardSender {
    socket: UdpSocket,
    destination: Destination,
    port: u16,
}

impl AwardSender {
    pub async fn bind(destination: Destination, port: u16) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .await
            .context("failed to bind award sender socket")?;
        socket
            .set_broadcast(true)
            .context("failed to enable broadcast on award socket")?;

        Ok(Self {
            socket,
            destination,
            port,
        })
    }

    pub fn describe_destination(&self) -> String {
        match &self.destination {
            Destination::Host(host) => format!("{host}:{}", self.port),
            Destination::Broadcast => format!("broadcast {BROADCAST_FALLBACK}:{}", self.port),
        }
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        match &self.destination {
            Destination::Host(host) => lookup_host((host.as_str(), self.port))
                .await
                .with_context(|| format!("failed to resolve {host}"))?
                .next()
                .with_context(|| format!("{host} resolved to no addresses")),
            Destination::Broadcast => Ok(SocketAddr::from((BROADCAST_FALLBACK, self.port))),
        }
    }

    /// Send one award datagram and return the payload that went out.
    pub async fn send_award(&self, points: u32) -> Result<String> {
        let target = self.resolve().await?;
        let message = encode_award(points);
        self.socket
            .send_to(message.as_bytes(), target)
            .await
            .with_context(|| format!("failed to send award to {target}"))?;
        Ok(message)
    }
}
