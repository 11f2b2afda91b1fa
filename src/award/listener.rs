use std::net::SocketAddr;
use std::time::Instant;

use log::{debug, info, warn};
use tokio::net::UdpSocket;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::mailbox::AwardMailbox;
use super::protocol::{award_message, parse_award};

const MAX_DATAGRAM_BYTES: usize = 1024;
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Receive award datagrams until cancelled. Nothing a peer sends can end this loop.
pub async fn award_listener(
    socket: UdpSocket,
    mailbox: AwardMailbox,
    cancel_token: CancellationToken,
) {
    let mut buf = [0u8; MAX_DATAGRAM_BYTES];

    loop {
        tokio::select! {
            received = tokio::time::timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut buf)) => {
                match received {
                    Ok(Ok((len, peer))) => handle_datagram(&buf[..len], peer, &mailbox),
                    Ok(Err(err)) => {
                        warn!("award socket receive failed: {err}");
                        tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                    }
                    Err(_) => {}
                }
            }
            _ = cancel_token.cancelled() => {
                info!("award listener shutting down");
                break;
            }
        }
    }
}

fn handle_datagram(datagram: &[u8], peer: SocketAddr, mailbox: &AwardMailbox) {
    let Some(points) = parse_award(datagram) else {
        debug!("ignoring {} byte datagram from {peer}", datagram.len());
        return;
    };

    let message = award_message(points);
    info!("{message} (from {peer})");
    mailbox.publish(message, Instant::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn_listener() -> (SocketAddr, AwardMailbox, CancellationToken, tokio::task::JoinHandle<()>) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let mailbox = AwardMailbox::new();
        let token = CancellationToken::new();
        let handle = tokio::spawn(award_listener(socket, mailbox.clone(), token.clone()));
        (addr, mailbox, token, handle)
    }

    async fn wait_for_award(mailbox: &AwardMailbox) -> Option<String> {
        for _ in 0..100 {
            if let Some(notice) = mailbox.peek(Instant::now()) {
                return Some(notice.message);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn award_datagram_reaches_mailbox() {
        let (addr, mailbox, token, handle) = spawn_listener().await;
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        sender.send_to(b"AWARD 25", addr).await.unwrap();
        assert_eq!(wait_for_award(&mailbox).await.as_deref(), Some("25 points awarded"));

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_datagrams_do_not_stop_listener() {
        let (addr, mailbox, token, handle) = spawn_listener().await;
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        sender.send_to(b"\xff\xfe\xfd", addr).await.unwrap();
        sender.send_to(b"HELLO", addr).await.unwrap();
        sender.send_to(b"", addr).await.unwrap();
        sender.send_to(b"AWARD", addr).await.unwrap();

        assert_eq!(wait_for_award(&mailbox).await.as_deref(), Some("25 points awarded"));
        assert!(!handle.is_finished());

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_stops_idle_listener() {
        let (_addr, _mailbox, token, handle) = spawn_listener().await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}
