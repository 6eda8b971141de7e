use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crossterm::style::Stylize;
use cppenv_core::Reporter;

use super::theme::{ICON_ARROW, ICON_INFO, ICON_SUCCESS, ICON_WARNING, format_size};

/// Redraw step for downloads of unknown size.
const UNKNOWN_TOTAL_STEP: u64 = 1024 * 1024;

/// Console reporter. Progress and status go to stdout, warnings to stderr.
#[derive(Debug)]
pub struct Output {
    quiet: bool,
    /// Last progress value drawn: a percentage, or a byte count when the total is unknown.
    last_progress: AtomicU64,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            last_progress: AtomicU64::new(u64::MAX),
        }
    }

    /// A single indented line, e.g. a requirement being installed.
    pub fn item(&self, text: &str) {
        if !self.quiet {
            println!("  {} {text}", ICON_ARROW.dark_grey());
        }
    }

    /// Should `current` trigger a redraw?
    fn should_draw(&self, current: u64, total: Option<u64>) -> bool {
        let marker = match total {
            Some(total) if total > 0 => current * 100 / total,
            _ => current / UNKNOWN_TOTAL_STEP,
        };
        self.last_progress.swap(marker, Ordering::Relaxed) != marker
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if !self.quiet {
            println!();
            println!("{}", title.cyan().bold());
        }
    }

    fn downloading(&self, label: &str, current: u64, total: Option<u64>) {
        if self.quiet || !self.should_draw(current, total) {
            return;
        }
        let progress = match total {
            Some(total) if total > 0 => format!(
                "{} / {} ({}%)",
                format_size(current),
                format_size(total),
                current * 100 / total
            ),
            _ => format_size(current),
        };
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r  {} {label} {}", "↓".cyan(), progress.dark_grey());
        if total.is_some_and(|t| current >= t) {
            let _ = writeln!(stdout);
        }
        let _ = stdout.flush();
    }

    fn extracting(&self, label: &str) {
        if !self.quiet {
            println!("\n  {} Extracting {label}", ICON_INFO.dark_grey());
        }
    }

    fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", ICON_INFO.dark_grey());
        }
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", ICON_SUCCESS.green());
        }
    }

    fn warning(&self, msg: &str) {
        eprintln!("  {} {}", ICON_WARNING.yellow(), msg.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_throttled_by_percent() {
        let out = Output::new(true);
        assert!(out.should_draw(0, Some(1000)));
        assert!(!out.should_draw(5, Some(1000)));
        assert!(out.should_draw(10, Some(1000)));
        assert!(out.should_draw(1000, Some(1000)));
    }

    #[test]
    fn test_progress_unknown_total() {
        let out = Output::new(true);
        assert!(out.should_draw(10, None));
        assert!(!out.should_draw(20, None));
        assert!(out.should_draw(UNKNOWN_TOTAL_STEP, None));
    }
}
