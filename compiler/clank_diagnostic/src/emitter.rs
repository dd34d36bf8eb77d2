//! Pretty text rendering of diagnostics.
//!
//! Produces the human-facing form: a `severity[code]: message` header, a
//! `--> file:line:col` pointer, an underlined source snippet when source
//! text is available, `help:` lines per hint and `note:` lines per related
//! location. The machine-facing form is plain serde serialization.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::Diagnostic;

/// Renders diagnostics against registered source texts.
#[derive(Default)]
pub struct TextEmitter {
    /// Source text per file name.
    sources: FxHashMap<String, String>,
    /// Source used for spans with no file name.
    default_source: Option<String>,
}

impl TextEmitter {
    pub fn new() -> Self {
        TextEmitter::default()
    }

    /// Register the source text of a named file.
    #[must_use]
    pub fn with_source(mut self, file: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(file.into(), source.into());
        self
    }

    /// Register the source for spans that carry no file name.
    #[must_use]
    pub fn with_default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = Some(source.into());
        self
    }

    /// Render one diagnostic.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}[{}]: {}",
            diagnostic.severity, diagnostic.code, diagnostic.message
        );

        if !diagnostic.location.is_dummy() {
            let _ = writeln!(out, "  --> {}", diagnostic.location);
            if let Some(line_text) = self.line_text(diagnostic) {
                let line_no = diagnostic.location.start.line;
                let gutter = line_no.to_string().len();
                let _ = writeln!(out, "{:gutter$} |", "");
                let _ = writeln!(out, "{line_no} | {line_text}");
                let start = diagnostic.location.start.col.saturating_sub(1) as usize;
                let end = if diagnostic.location.end.line == line_no {
                    (diagnostic.location.end.col as usize).max(start + 1)
                } else {
                    line_text.chars().count() + 1
                };
                let carets = "^".repeat(end.saturating_sub(start + 1).max(1));
                let _ = writeln!(out, "{:gutter$} | {:start$}{carets}", "", "");
            }
        }

        for hint in &diagnostic.hints {
            let _ = writeln!(out, "  = help: {}", hint.description);
            if let Some(template) = &hint.template {
                let _ = writeln!(out, "          {template}");
            }
        }
        for related in &diagnostic.related {
            let _ = writeln!(out, "  = note: {} ({})", related.message, related.location);
        }
        out
    }

    /// Render a batch, separated by blank lines.
    pub fn render_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.render(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line_text(&self, diagnostic: &Diagnostic) -> Option<&str> {
        let source = match &diagnostic.location.file {
            Some(file) => self.sources.get(file)?,
            None => self.default_source.as_ref()?,
        };
        let line = diagnostic.location.start.line.checked_sub(1)? as usize;
        source.lines().nth(line)
    }
}
