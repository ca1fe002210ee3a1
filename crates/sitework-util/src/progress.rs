use std::io::Write;

use console::Style;

/// Width the status label is right-aligned to.
const LABEL_WIDTH: usize = 12;

/// Severity of a status line; picks the label colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Action,
    Info,
    Warn,
}

impl Tone {
    fn style(self) -> Style {
        let style = Style::new().bold();
        match self {
            Tone::Action => style.green(),
            Tone::Info => style.cyan(),
            Tone::Warn => style.yellow(),
        }
    }
}

/// Render a status line without writing it: `     Updated Foundation [B] 2025-06-11..2025-06-15`
pub fn format_status(tone: Tone, label: &str, message: &str) -> String {
    let label = format!("{label:>LABEL_WIDTH$}");
    format!("{} {message}", tone.style().apply_to(label))
}

fn emit(tone: Tone, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", format_status(tone, label, message));
}

/// Print a status line for something the command changed (bold green label).
pub fn status(label: &str, message: &str) {
    emit(Tone::Action, label, message);
}

/// Informational line that reports state without changing it.
pub fn status_info(label: &str, message: &str) {
    emit(Tone::Info, label, message);
}

/// Warning line (bold yellow label), used for conflicts.
pub fn status_warn(label: &str, message: &str) {
    emit(Tone::Warn, label, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_right_aligned() {
        let line = console::strip_ansi_codes(&format_status(Tone::Action, "Removed", "B1")).to_string();
        assert_eq!(line, "     Removed B1");
    }

    #[test]
    fn long_labels_are_not_truncated() {
        let line = format_status(Tone::Warn, "Rescheduling", "A");
        assert!(console::strip_ansi_codes(&line).starts_with("Rescheduling A"));
    }
}
