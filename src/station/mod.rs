pub mod capture;
pub mod journal;
pub mod render;
pub mod replay;
pub mod runner;

use anyhow::{bail, Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use crate::award::{AwardMailbox, ListenerController};
use crate::catalog::Catalog;
use crate::session::SessionMachine;
use crate::settings::StationSettings;

pub use capture::{Frame, FrameSource, SymbolDecoder};
pub use journal::EventJournal;
pub use render::{ConsoleRenderer, RenderControl, Renderer, Scene};
pub use runner::{CaptureLoop, StopReason};

/// Open the configured capture backend. Only scripted replay is built in, so a
/// plain camera index is a startup error.
pub fn open_capture(settings: &StationSettings) -> Result<(Box<dyn FrameSource>, Box<dyn SymbolDecoder>)> {
    let Some(path) = settings.replay_path.as_deref() else {
        bail!(
            "Cannot open camera {}: no capture backend available, set SCANWARD_REPLAY to a replay script",
            settings.camera_index
        );
    };

    let frames = replay::load_script(path)?;
    info!("replaying {} frames from {}", frames.len(), path.display());
    let (source, decoder) = replay::replay_pair(frames, settings.replay_frame_interval());
    Ok((Box::new(source), Box::new(decoder)))
}

/// Reader device entry point. Runs the capture loop on a blocking thread with
/// the award listener alongside, and always stops the listener before returning.
pub async fn run_station(settings: StationSettings, stop: CancellationToken) -> Result<StopReason> {
    let (source, decoder) = open_capture(&settings)?;
    run_with_capture(&settings, source, decoder, stop).await
}

/// Run the station over an already opened capture pair. The source is
/// dropped only after the listener has stopped.
pub async fn run_with_capture(
    settings: &StationSettings,
    mut source: Box<dyn FrameSource>,
    mut decoder: Box<dyn SymbolDecoder>,
    stop: CancellationToken,
) -> Result<StopReason> {
    let journal = settings
        .journal_path
        .as_deref()
        .map(EventJournal::open)
        .transpose()?;
    if let Some(journal) = &journal {
        info!("journaling events to {}", journal.path().display());
    }

    let mailbox = AwardMailbox::new();
    let mut listener = ListenerController::new();
    listener
        .start(settings.listen_addr(), mailbox.clone(), &stop)
        .await?;

    let mut capture_loop = CaptureLoop::new(SessionMachine::new(Catalog::builtin()), mailbox, journal);
    let loop_stop = stop.clone();
    info!("Enter {} or press Ctrl-C to quit.", render::QUIT_KEY);
    let outcome = tokio::task::spawn_blocking(move || {
        let mut renderer = ConsoleRenderer::new().with_stdin_quit();
        let reason = capture_loop.run(source.as_mut(), decoder.as_mut(), &mut renderer, &loop_stop);
        (reason, source)
    })
    .await
    .context("capture loop thread failed");

    stop.cancel();
    listener.stop().await?;

    // the capture device goes last, after the listener has let go of its socket
    let (reason, source) = outcome?;
    drop(source);
    info!("station stopped: {reason:?}");
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::UdpSocket;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Empty source that checks, when dropped, whether the listener port is free again.
    struct PortCheckingSource {
        port: u16,
        port_free_on_drop: Arc<AtomicBool>,
    }

    impl FrameSource for PortCheckingSource {
        fn read_frame(&mut self) -> Option<Frame> {
            None
        }
    }

    impl Drop for PortCheckingSource {
        fn drop(&mut self) {
            let free = UdpSocket::bind(("0.0.0.0", self.port)).is_ok();
            self.port_free_on_drop.store(free, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn capture_source_outlives_listener() {
        let port = UdpSocket::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let port_free_on_drop = Arc::new(AtomicBool::new(false));
        let source = PortCheckingSource {
            port,
            port_free_on_drop: Arc::clone(&port_free_on_drop),
        };
        let settings = StationSettings {
            udp_port: port,
            ..StationSettings::default()
        };

        let reason = run_with_capture(
            &settings,
            Box::new(source),
            Box::new(replay::ReplayDecoder::new(Vec::new())),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(reason, StopReason::SourceExhausted);
        assert!(port_free_on_drop.load(Ordering::SeqCst));
    }

    #[test]
    fn camera_without_backend_fails_fast() {
        let err = open_capture(&StationSettings::default()).err().unwrap();
        assert!(err.to_string().contains("Cannot open camera 0"));
    }

    #[tokio::test]
    async fn replay_session_runs_to_end_and_journals() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("frames.jsonl");
        fs::write(
            &script,
            concat!(
                "[{\"payload\":\"1234\",\"kind\":\"QR\"}]\n",
                "[{\"payload\":\"0838766101903\",\"kind\":\"OTHER_BARCODE\"}]\n",
                "[{\"payload\":\"0838766101903\",\"kind\":\"OTHER_BARCODE\"}]\n",
            ),
        )
        .unwrap();
        let journal: PathBuf = dir.path().join("events.jsonl");

        let settings = StationSettings {
            udp_port: 0,
            replay_path: Some(script),
            replay_frame_interval_ms: 0,
            journal_path: Some(journal.clone()),
            ..StationSettings::default()
        };

        let reason = run_station(settings, CancellationToken::new()).await.unwrap();
        assert_eq!(reason, StopReason::SourceExhausted);

        let lines = fs::read_to_string(&journal).unwrap();
        let events: Vec<serde_json::Value> = lines
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "login");
        assert_eq!(events[1]["itemName"], "VEGA Plant-based Protein Shake");
    }
}
