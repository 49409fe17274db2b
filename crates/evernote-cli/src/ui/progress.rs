//! Progress indicator for operations that wait on the network or the user.

use std::time::Duration;

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

use super::context::UiContext;

/// A spinner for indeterminate progress. Draws to stderr.
pub struct Spinner {
    bar: Option<IndicatifBar>,
}

impl Spinner {
    /// Create a new spinner with the given message.
    ///
    /// Without a TTY (or in JSON mode) the spinner is inert.
    pub fn new(ctx: &UiContext, message: &str) -> Self {
        let bar = if ctx.allows_animation() {
            let pb = IndicatifBar::new_spinner();
            let (template, ticks): (&str, &[&str]) = if ctx.unicode {
                (
                    "{spinner:.cyan} {msg}...",
                    &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", ""],
                )
            } else {
                ("{spinner} {msg}...", &["|", "/", "-", "\\", ""])
            };
            let style = ProgressStyle::default_spinner()
                .template(template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(ticks);
            pb.set_style(style);
            pb.set_message(message.to_string());
            Some(pb)
        } else {
            None
        };

        Self { bar }
    }

    /// Begin animating.
    pub fn start(&self) {
        if let Some(bar) = &self.bar {
            bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    /// Print a line above the spinner, or to stderr when inert.
    pub fn println(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.println(message),
            None => eprintln!("{}", message),
        }
    }


    /// Stop and erase the spinner line.
    pub fn clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    #[test]
    fn test_spinner_is_inert_without_tty() {
        let ctx = UiContext {
            is_tty: false,
            color: false,
            unicode: true,
            width: 80,
            mode: OutputMode::Plain,
        };
        let spinner = Spinner::new(&ctx, "Waiting");
        assert!(spinner.bar.is_none());
        spinner.start();
        spinner.clear();
    }
}
