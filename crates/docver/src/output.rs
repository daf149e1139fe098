//! Colored terminal output utilities.

use std::fmt::Display;

use console::{Style, Term};

/// Width of the right-aligned status label.
const LABEL_WIDTH: usize = 12;

/// Status line printer.
///
/// Lines go to stderr as `    Building 2 versions`, with the label
/// right-aligned and colored. Stdout is left free for `--out -` JSON.
pub(crate) struct Output {
    term: Term,
    progress: Style,
    warning: Style,
    error: Style,
}

impl Output {
    /// Create a new output printer.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            progress: Style::new().green().bold(),
            warning: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
        }
    }

    /// Print a progress line with a green label.
    pub(crate) fn status(&self, label: &str, msg: impl Display) {
        self.line(&self.progress, label, msg);
    }

    /// Print a warning line with a yellow label.
    pub(crate) fn warning(&self, label: &str, msg: impl Display) {
        self.line(&self.warning, label, msg);
    }

    /// Print an error line.
    pub(crate) fn error(&self, msg: impl Display) {
        let _ = self
            .term
            .write_line(&format!("{} {msg}", self.error.apply_to("error:")));
    }

    fn line(&self, style: &Style, label: &str, msg: impl Display) {
        let label = style.apply_to(format!("{label:>LABEL_WIDTH$}"));
        let _ = self.term.write_line(&format!("{label} {msg}"));
    }
}
