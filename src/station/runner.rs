use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::award::AwardMailbox;
use crate::session::SessionMachine;
use crate::symbols::DecodedSymbol;

use super::capture::{FrameSource, SymbolDecoder};
use super::journal::EventJournal;
use super::render::{RenderControl, Renderer, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SourceExhausted,
    QuitRequested,
    Cancelled,
}

/// The synchronous capture → decode → update → render loop.
pub struct CaptureLoop {
    machine: SessionMachine,
    mailbox: AwardMailbox,
    journal: Option<EventJournal>,
}

impl CaptureLoop {
    pub fn new(machine: SessionMachine, mailbox: AwardMailbox, journal: Option<EventJournal>) -> Self {
        Self {
            machine,
            mailbox,
            journal,
        }
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    /// Run until the source ends, the renderer asks to quit, or `stop` fires.
    /// A bad frame, decode or render never ends the loop by itself.
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        decoder: &mut dyn SymbolDecoder,
        renderer: &mut dyn Renderer,
        stop: &CancellationToken,
    ) -> StopReason {
        loop {
            if stop.is_cancelled() {
                return StopReason::Cancelled;
            }

            let Some(frame) = source.read_frame() else {
                info!("frame source ended");
                return StopReason::SourceExhausted;
            };

            let symbols = match decoder.decode(&frame) {
                Ok(symbols) => symbols,
                Err(err) => {
                    warn!("decode failed for frame {}: {err:#}", frame.sequence);
                    Vec::new()
                }
            };

            let scene = self.step(&symbols, Instant::now());
            match renderer.render(&scene) {
                Ok(RenderControl::Continue) => {}
                Ok(RenderControl::Quit) => {
                    info!("quit requested");
                    return StopReason::QuitRequested;
                }
                Err(err) => warn!("render failed for frame {}: {err:#}", frame.sequence),
            }
        }
    }

    /// Apply one frame's symbols and compose the scene to draw.
    pub fn step(&mut self, symbols: &[DecodedSymbol], now: Instant) -> Scene {
        let outcome = self.machine.process_frame(symbols, now, Utc::now());

        for event in &outcome.events {
            info!("{event}");
            if let Some(journal) = self.journal.as_mut() {
                if let Err(err) = journal.record(event) {
                    warn!("journal write failed: {err:#}");
                }
            }
        }

        Scene {
            view: self.machine.view(now),
            annotations: outcome.annotations,
            award: self.mailbox.peek(now).map(|notice| notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::session::{ItemLine, SessionPhase, ViewModel};
    use crate::station::capture::Frame;
    use crate::station::replay::replay_pair;
    use crate::symbols::{BoundingBox, SymbolKind};
    use anyhow::{anyhow, Result};
    use std::time::Duration;

    fn qr(payload: &str) -> DecodedSymbol {
        DecodedSymbol::new(payload, SymbolKind::Qr, BoundingBox::default())
    }

    fn barcode(payload: &str) -> DecodedSymbol {
        DecodedSymbol::new(payload, SymbolKind::OtherBarcode, BoundingBox::default())
    }

    #[derive(Default)]
    struct RecordingRenderer {
        scenes: Vec<Scene>,
        quit_after: Option<usize>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, scene: &Scene) -> Result<RenderControl> {
            self.scenes.push(scene.clone());
            match self.quit_after {
                Some(n) if self.scenes.len() >= n => Ok(RenderControl::Quit),
                _ => Ok(RenderControl::Continue),
            }
        }
    }

    struct FailingDecoder;

    impl SymbolDecoder for FailingDecoder {
        fn decode(&mut self, _frame: &Frame) -> Result<Vec<DecodedSymbol>> {
            Err(anyhow!("garbled frame"))
        }
    }

    fn capture_loop(mailbox: AwardMailbox) -> CaptureLoop {
        CaptureLoop::new(SessionMachine::new(Catalog::builtin()), mailbox, None)
    }

    #[test]
    fn checkout_with_award_between_frames() {
        let mailbox = AwardMailbox::new();
        let mut station = capture_loop(mailbox.clone());
        let t0 = Instant::now();

        let scene = station.step(&[qr("1234")], t0);
        assert_eq!(station.machine().phase(), SessionPhase::AwaitingItem);
        assert!(matches!(scene.view, ViewModel::Greeting { ref name, .. } if name == "Ryan"));

        let scene = station.step(&[barcode("0838766101903")], t0 + Duration::from_millis(100));
        assert!(matches!(
            scene.view,
            ViewModel::Greeting { item: ItemLine::Recent { ref name, .. }, .. }
                if name == "VEGA Plant-based Protein Shake"
        ));
        assert!(scene.award.is_none());

        mailbox.publish("25 points awarded", t0 + Duration::from_millis(150));

        let scanned_before = station.machine().state().last_scan().map(|(_, at)| at);
        let scene = station.step(&[barcode("0838766101903")], t0 + Duration::from_millis(200));
        assert_eq!(station.machine().state().last_scan().map(|(_, at)| at), scanned_before);
        assert_eq!(scene.award.as_deref(), Some("25 points awarded"));

        let scene = station.step(&[], t0 + Duration::from_millis(3150));
        assert!(scene.award.is_none());
    }

    #[test]
    fn every_symbol_gets_an_annotation() {
        let mut station = capture_loop(AwardMailbox::new());
        let scene = station.step(
            &[barcode("0838766101903"), qr("nobody"), barcode("x")],
            Instant::now(),
        );
        assert_eq!(scene.annotations.len(), 3);
        assert_eq!(scene.view, ViewModel::ScanIdentity);
    }

    #[test]
    fn runs_until_source_exhausted() {
        let (mut source, mut decoder) = replay_pair(
            vec![vec![qr("1234")], vec![], vec![barcode("0017082873590")]],
            Duration::ZERO,
        );
        let mut renderer = RecordingRenderer::default();
        let mut station = capture_loop(AwardMailbox::new());

        let reason = station.run(&mut source, &mut decoder, &mut renderer, &CancellationToken::new());
        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(renderer.scenes.len(), 3);
        assert_eq!(
            station.machine().state().last_scan().map(|(name, _)| name),
            Some("Jack Links Turkey Jerky (NON-RECYCLABLE)")
        );
    }

    #[test]
    fn quit_from_renderer_stops_loop() {
        let (mut source, mut decoder) = replay_pair(vec![vec![]; 10], Duration::ZERO);
        let mut renderer = RecordingRenderer {
            quit_after: Some(2),
            ..Default::default()
        };
        let reason = capture_loop(AwardMailbox::new()).run(
            &mut source,
            &mut decoder,
            &mut renderer,
            &CancellationToken::new(),
        );
        assert_eq!(reason, StopReason::QuitRequested);
        assert_eq!(renderer.scenes.len(), 2);
    }

    #[test]
    fn cancelled_before_first_frame() {
        let (mut source, mut decoder) = replay_pair(vec![vec![]; 3], Duration::ZERO);
        let mut renderer = RecordingRenderer::default();
        let stop = CancellationToken::new();
        stop.cancel();

        let reason = capture_loop(AwardMailbox::new()).run(&mut source, &mut decoder, &mut renderer, &stop);
        assert_eq!(reason, StopReason::Cancelled);
        assert!(renderer.scenes.is_empty());
    }

    #[test]
    fn decode_errors_do_not_end_loop() {
        let (mut source, _) = replay_pair(vec![vec![]; 4], Duration::ZERO);
        let mut renderer = RecordingRenderer::default();

        let reason = capture_loop(AwardMailbox::new()).run(
            &mut source,
            &mut FailingDecoder,
            &mut renderer,
            &CancellationToken::new(),
        );
        assert_eq!(reason, StopReason::SourceExhausted);
        assert_eq!(renderer.scenes.len(), 4);
    }
}
