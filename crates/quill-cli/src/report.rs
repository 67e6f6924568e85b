//! Diagnostic rendering

use std::io::Write;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use quill_ast::{Diagnostic, Range, Severity};

/// Render `diagnostics` against `text` into `out`
pub fn render<W: Write>(
    name: &str,
    text: &str,
    diagnostics: &[Diagnostic],
    color: bool,
    out: &mut W,
) -> std::io::Result<()> {
    let name = name.to_string();
    for diagnostic in diagnostics {
        let (kind, label_color) = match diagnostic.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
            Severity::Hint => (ReportKind::Advice, Color::Blue),
        };
        let span = char_span(text, diagnostic.range);
        Report::build(kind, name.clone(), span.start)
            .with_config(Config::default().with_color(color))
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((name.clone(), span))
                    .with_message(&diagnostic.message)
                    .with_color(label_color),
            )
            .finish()
            .write((name.clone(), Source::from(text)), &mut *out)?;
    }
    Ok(())
}

/// Byte range to the char range ariadne expects
fn char_span(text: &str, range: Range) -> std::ops::Range<usize> {
    let chars = |byte: usize| {
        let byte = byte.min(text.len());
        text.get(..byte).map_or(byte, |prefix| prefix.chars().count())
    };
    chars(range.start)..chars(range.end)
}

/// Count of diagnostics at each severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub errors: usize,
    pub warnings: usize,
    pub hints: usize,
}

impl Tally {
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        let mut tally = Self::default();
        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => tally.errors += 1,
                Severity::Warning => tally.warnings += 1,
                Severity::Hint => tally.hints += 1,
            }
        }
        tally
    }

    pub fn add(&mut self, other: Tally) {
        self.errors += other.errors;
        self.warnings += other.warnings;
        self.hints += other.hints;
    }
}
