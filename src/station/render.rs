use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use log::{info, warn};
use serde::Serialize;

use crate::session::{ItemLine, ViewModel};
use crate::symbols::Annotation;

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub view: ViewModel,
    pub annotations: Vec<Annotation>,
    /// Centred banner text while an award is fresh.
    pub award: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderControl {
    Continue,
    Quit,
}

pub trait Renderer: Send {
    fn render(&mut self, scene: &Scene) -> Result<RenderControl>;
}

pub const QUIT_KEY: &str = "q";

pub fn is_quit_line(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT_KEY)
}

/// Logs what a screen would show, once per change.
#[derive(Default)]
pub struct ConsoleRenderer {
    last_lines: Vec<String>,
    last_award: Option<String>,
    quit: Arc<AtomicBool>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Quit` once a line holding the quit key arrives on stdin.
    pub fn with_stdin_quit(self) -> Self {
        let quit = Arc::clone(&self.quit);
        let reader = thread::Builder::new().name("quit-key".into()).spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) if is_quit_line(&line) => {
                        quit.store(true, Ordering::SeqCst);
                        break;
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
        });
        if let Err(err) = reader {
            warn!("quit key unavailable: {err}");
        }
        self
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, scene: &Scene) -> Result<RenderControl> {
        // fading intensity changes every frame, so compare text only
        let lines = scene.view.lines();
        if lines != self.last_lines {
            info!("screen: {}", lines.join(" | "));
            self.last_lines = lines;
        }

        if scene.award != self.last_award {
            if let Some(award) = &scene.award {
                info!("banner: {award}");
            }
            self.last_award = scene.award.clone();
        }

        for annotation in &scene.annotations {
            log::trace!("{} at {:?}", annotation.label, annotation.bounding_box);
        }

        if let ViewModel::Greeting {
            item: ItemLine::Recent { intensity, .. },
            ..
        } = &scene.view
        {
            log::trace!("item label intensity {intensity:.2}");
        }

        if self.quit.load(Ordering::SeqCst) {
            return Ok(RenderControl::Quit);
        }
        Ok(RenderControl::Continue)
    }
}
