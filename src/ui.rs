/// Console status and diagnostics
///
/// Progress lines go to stdout with an "equipment: " prefix so they sit
/// next to tables and JSON. Warnings and errors go to stderr, with a
/// colored label unless colors were switched off on the command line.
use lazy_static::lazy_static;
use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

const STATUS_PREFIX: &str = "equipment: ";

static USE_COLORS: AtomicBool = AtomicBool::new(true);

lazy_static! {
    static ref OUTPUT_LOCK: Mutex<()> = Mutex::new(());
}

/// Enable or disable colored labels for the rest of the process
pub fn set_colors(enabled: bool) {
    USE_COLORS.store(enabled, Ordering::Relaxed);
}

fn colors_enabled() -> bool {
    USE_COLORS.load(Ordering::Relaxed)
}

/// Kind of diagnostic written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    fn color(self) -> term::color::Color {
        match self {
            Severity::Warning => term::color::BRIGHT_YELLOW,
            Severity::Error => term::color::BRIGHT_RED,
        }
    }
}

/// Plain-text form of a diagnostic, e.g. `warning: history is full`
pub fn format_message(severity: Severity, msg: &str) -> String {
    format!("{}: {}", severity.label(), msg)
}

/// Plain-text form of a status line
pub fn format_status(msg: &str) -> String {
    format!("{}{}", STATUS_PREFIX, msg)
}

/// Write the label in color on a terminal; false means nothing was written
fn write_colored_label(severity: Severity) -> bool {
    let Some(mut t) = term::stderr() else {
        return false;
    };
    if t.fg(severity.color()).is_err() {
        return false;
    }
    let _ = t.attr(term::Attr::Bold);
    let written = write!(t, "{}", severity.label()).is_ok();
    let _ = t.reset();
    written
}

fn diagnostic(severity: Severity, msg: &str) {
    let _guard = OUTPUT_LOCK.lock();
    if colors_enabled() && write_colored_label(severity) {
        eprintln!(": {}", msg);
    } else {
        eprintln!("{}", format_message(severity, msg));
    }
    let _ = io::stderr().flush();
}

/// Print a status line to stdout (serialized across threads)
pub fn status(msg: &str) {
    let _guard = OUTPUT_LOCK.lock();
    println!("{}", format_status(msg));
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    diagnostic(Severity::Warning, msg);
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    diagnostic(Severity::Error, msg);
}
