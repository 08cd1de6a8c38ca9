//! Progress bar utilities for transfer operations
//!
//! Provides consistent progress indication for object uploads and downloads.

use std::sync::Arc;

use indicatif::ProgressStyle;
use sc_core::ProgressCallback;

use super::OutputConfig;

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} {bytes} ({bytes_per_sec})";

/// Progress bar wrapper
///
/// Handles progress display based on output configuration.
/// In quiet or JSON mode, progress is suppressed.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a byte counter for a transfer
    ///
    /// With a known total a bar is drawn, otherwise a spinner with a running
    /// byte count.
    pub fn new(config: &OutputConfig, total: Option<u64>, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress {
            None
        } else {
            let bar = match total {
                Some(total) => {
                    let bar = indicatif::ProgressBar::new(total);
                    bar.set_style(style(BAR_TEMPLATE, ProgressStyle::default_bar()).progress_chars("#>-"));
                    bar
                }
                None => {
                    let bar = indicatif::ProgressBar::new_spinner();
                    bar.set_style(style(SPINNER_TEMPLATE, ProgressStyle::default_spinner()));
                    bar
                }
            };
            bar.set_message(message.to_string());
            Some(bar)
        };

        Self { bar }
    }

    /// A progress bar that never draws
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    /// Callback that advances this bar, for the transfer engine
    pub fn callback(&self) -> Option<ProgressCallback> {
        let bar = self.bar.clone()?;
        Some(Arc::new(move |delta| bar.inc(delta)))
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.as_ref().map_or(0, indicatif::ProgressBar::position)
    }

    /// Finish and clear the progress bar
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Check if progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    match ProgressStyle::with_template(template) {
        Ok(style) => style,
        Err(e) => {
            tracing::debug!(error = %e, "invalid progress template");
            fallback
        }
    }
}
