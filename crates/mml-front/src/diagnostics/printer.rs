//! Builder-pattern renderer for diagnostics.
//!
//! With a source attached, spans are converted from line/column form to
//! byte offsets and rendered as annotated snippets; without one, a plain
//! one-line-per-diagnostic format is used.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use mml_ast::{SrcPoint, SrcSpan};

use super::Diagnostics;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        if self.diagnostics.is_empty() {
            return Ok(());
        }

        let index = LineIndex::new(source);
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let mut first = true;
        for err in self.diagnostics.errors() {
            let message = err.to_string();
            let spans = err.spans();
            self.render_one(
                w,
                &renderer,
                source,
                &index,
                Level::ERROR,
                "error",
                &message,
                &spans,
                first,
            )?;
            first = false;
        }
        for warn in self.diagnostics.warnings() {
            let message = warn.to_string();
            let spans = vec![warn.span()];
            self.render_one(
                w,
                &renderer,
                source,
                &index,
                Level::WARNING,
                "warning",
                &message,
                &spans,
                first,
            )?;
            first = false;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_one(
        &self,
        w: &mut impl Write,
        renderer: &Renderer,
        source: &str,
        index: &LineIndex,
        level: Level<'static>,
        level_label: &'static str,
        message: &str,
        spans: &[SrcSpan],
        first: bool,
    ) -> std::fmt::Result {
        let ranges: Vec<std::ops::Range<usize>> = spans
            .iter()
            .filter(|s| s.is_valid())
            .map(|s| index.byte_range(*s))
            .collect();

        if !first {
            w.write_char('\n')?;
        }

        // Synthetic spans have nothing to annotate; fall back to one line.
        let Some(primary) = ranges.first().cloned() else {
            return write!(w, "{level_label}: {message}");
        };

        let mut snippet = Snippet::source(source)
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(primary).label(message));

        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }

        for range in ranges.iter().skip(1) {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(range.clone())
                    .label("also declared here"),
            );
        }

        let report: Vec<Group> = vec![level.primary_title(message).element(snippet)];
        write!(w, "{}", renderer.render(&report))
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        let mut first = true;
        for err in self.diagnostics.errors() {
            if !first {
                w.write_char('\n')?;
            }
            write!(w, "error at {}: {}", err.span(), err)?;
            first = false;
        }
        for warn in self.diagnostics.warnings() {
            if !first {
                w.write_char('\n')?;
            }
            write!(w, "warning at {}: {}", warn.span(), warn)?;
            first = false;
        }
        Ok(())
    }
}

/// Byte offsets of each line start, for line/col to offset conversion.
struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
    lines: Vec<String>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0usize];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        let lines = source.split('\n').map(str::to_owned).collect();
        Self {
            line_starts,
            len: source.len(),
            lines,
        }
    }

    fn offset(&self, point: SrcPoint) -> usize {
        let line_idx = (point.line as usize).saturating_sub(1);
        let Some(&line_start) = self.line_starts.get(line_idx) else {
            return self.len;
        };
        let line = self.lines.get(line_idx).map(String::as_str).unwrap_or("");
        let col_bytes: usize = line
            .chars()
            .take((point.col as usize).saturating_sub(1))
            .map(char::len_utf8)
            .sum();
        (line_start + col_bytes).min(self.len)
    }

    fn byte_range(&self, span: SrcSpan) -> std::ops::Range<usize> {
        let start = self.offset(span.start);
        let end = self.offset(span.end);
        if end > start {
            start..end
        } else {
            // Zero-width spans still need one highlighted column.
            start..(start + 1).min(self.len).max(start)
        }
    }
}
