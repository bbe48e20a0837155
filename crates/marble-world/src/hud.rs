//! HUD output.

use crate::run::RunSummary;

/// Receiver of HUD text and end-of-run summaries.
pub trait HudSink: Send + Sync {
    /// Replaces the HUD line. An empty string clears it.
    fn update_hud(&self, text: &str);

    /// Shows the summary of a finished run.
    fn update_summary(&self, summary: &RunSummary);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHud;

impl HudSink for NullHud {
    fn update_hud(&self, _text: &str) {}

    fn update_summary(&self, _summary: &RunSummary) {}
}

/// Forwards HUD output to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHud;

impl HudSink for LogHud {
    fn update_hud(&self, text: &str) {
        tracing::trace!("[hud] {}", text);
    }

    fn update_summary(&self, summary: &RunSummary) {
        tracing::info!("[hud] {}", summary);
    }
}
