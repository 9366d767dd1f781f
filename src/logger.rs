//! Logging utilities with colored output and progress display.
//!
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro gated by the global verbose flag
//! - `BuildProgress` for the unit counter of a full build
//! - `WatchStatus` for watch mode status messages

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// True while a progress line occupies the bottom of the terminal; plain
/// log lines must clear it first.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();

    if PROGRESS_ACTIVE.load(Ordering::SeqCst) {
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
        writeln!(stdout, "{prefix} {message}").ok();
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "zip" | "pack" => prefix.bright_cyan().bold().to_string(),
        "upload" => prefix.bright_magenta().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch Status (single-line status with overwrite)
// ============================================================================

/// Current time formatted as HH:MM:SS (UTC).
fn clock() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Single-line status display for watch mode.
///
/// Each message overwrites the previous one so a long editing session
/// does not scroll the terminal; errors expand to multiple lines and are
/// cleared by the next status the same way.
pub struct WatchStatus {
    /// Lines the previous message occupied.
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus { last_lines: 0 }));

impl WatchStatus {
    /// Success line: `[12:03:54] ✓ sizes/300x250/index.hbs`.
    fn success(&mut self, message: &str) {
        self.show(&format!("{}", "✓".green()), message);
    }

    /// Error line with the failure detail below it.
    fn error(&mut self, summary: &str, detail: &str) {
        if detail.is_empty() {
            self.show(&format!("{}", "✗".red()), summary);
        } else {
            self.show(&format!("{}", "✗".red()), &format!("{summary}\n{detail}"));
        }
    }

    fn show(&mut self, symbol: &str, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let up = self.last_lines as u16;
            execute!(stdout, cursor::MoveUp(up), Clear(ClearType::FromCursorDown)).ok();
        }

        let stamp = format!("[{}]", clock()).dimmed().to_string();
        writeln!(stdout, "{stamp} {symbol} {message}").ok();
        stdout.flush().ok();

        self.last_lines = message.matches('\n').count() + 1;
    }
}

/// Global watch status: success
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

/// Global watch status: error
pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Build Progress (unit counter)
// ============================================================================

/// In-place unit counter for the full build: `[build] units 3/12`.
///
/// Uses `try_lock` so a worker never blocks on the display; a skipped
/// repaint is corrected by the next one.
pub struct BuildProgress {
    total: usize,
    done: AtomicUsize,
    paint: Mutex<()>,
}

impl BuildProgress {
    pub fn new(total: usize) -> Self {
        PROGRESS_ACTIVE.store(true, Ordering::SeqCst);
        let progress = Self {
            total,
            done: AtomicUsize::new(0),
            paint: Mutex::new(()),
        };
        progress.repaint();
        progress
    }

    /// One more unit finished.
    pub fn tick(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if self.paint.try_lock().is_some() {
            self.repaint();
        }
    }

    fn line(&self) -> String {
        format!("units {}/{}", self.done.load(Ordering::Relaxed), self.total)
    }

    fn repaint(&self) {
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        write!(stdout, "{} {}", colorize_prefix("build"), self.line()).ok();
        stdout.flush().ok();
    }

    /// Keep the final count on screen and move to the next line.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);

        {
            let _guard = self.paint.lock();
            let mut stdout = stdout().lock();
            execute!(
                stdout,
                cursor::MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            )
            .ok();
            writeln!(stdout, "{} {}", colorize_prefix("build"), self.line()).ok();
            stdout.flush().ok();
        }

        std::mem::forget(self); // skip the Drop cleanup
    }
}

impl Drop for BuildProgress {
    fn drop(&mut self) {
        // Not finished properly: clear the dangling line
        PROGRESS_ACTIVE.store(false, Ordering::SeqCst);
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts() {
        let progress = BuildProgress::new(3);
        progress.tick();
        progress.tick();
        assert_eq!(progress.line(), "units 2/3");
        progress.finish();
        assert!(!PROGRESS_ACTIVE.load(Ordering::SeqCst));
    }

    #[test]
    fn test_status_line_count() {
        let message = "failed: sizes/300x250/index.hbs\nerror: unknown partial\n  --> line 5";
        assert_eq!(message.matches('\n').count() + 1, 3);
    }
}
