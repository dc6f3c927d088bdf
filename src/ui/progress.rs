//! Download progress display.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::TransferProgress;

const BAR_TEMPLATE: &str =
    "Fetching: {msg} {percent:>3}% |{bar:30.cyan/dim}| {total_bytes} {bytes_per_sec} ETA {eta}";
const SPINNER_TEMPLATE: &str = "Fetching: {msg} {spinner:.cyan} {bytes} {bytes_per_sec}";

/// Byte progress bar for a single file.
///
/// Starts as a spinner and switches to a bar once the size is known.
pub struct TransferBar {
    bar: ProgressBar,
}

impl TransferBar {
    /// Create a bar labelled with the file name.
    pub fn new(name: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.set_message(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Create a bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl TransferProgress for TransferBar {
    fn set_length(&mut self, length: Option<u64>) {
        let Some(length) = length else {
            return;
        };
        self.bar.set_length(length);
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            self.bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.bar.inc(bytes);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

/// Format a byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_milliseconds() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn format_duration_seconds() {
        let d = Duration::from_secs_f64(5.3);
        assert_eq!(format_duration(d), "5.3s");
    }

    #[test]
    fn format_duration_minutes() {
        let d = Duration::from_secs(90);
        assert_eq!(format_duration(d), "1.5m");
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.50 KiB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.00 MiB");
    }

    #[test]
    fn hidden_bar_counts_bytes() {
        let mut bar = TransferBar::hidden();
        bar.set_length(Some(10));
        bar.advance(4);
        bar.advance(6);
        assert_eq!(bar.bar.position(), 10);
        bar.finish();
    }
}
