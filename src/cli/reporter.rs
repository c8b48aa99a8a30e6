use colored::Colorize;

use declgraph_common::Diagnostic;

/// Renders composer diagnostics for a terminal.
///
/// ```text
/// App/User.swift - warning DG1001 [ambiguous-reference]: Ambiguous type Foo, found A.Foo, B.Foo. ...
///   candidates: A.Foo, B.Foo
/// ```
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        output.push_str(diagnostic.file.as_deref().unwrap_or("<unknown>"));
        output.push_str(" - ");
        output.push_str(&self.paint_warning("warning"));
        output.push(' ');
        output.push_str(&self.paint_dimmed(&format!("DG{}", diagnostic.code)));
        output.push_str(&format!(" [{}]: ", diagnostic.kind));
        output.push_str(&diagnostic.message);

        if !diagnostic.candidates.is_empty() {
            output.push('\n');
            output.push_str(&self.paint_dimmed("  candidates"));
            output.push_str(": ");
            output.push_str(&diagnostic.candidates.join(", "));
        }
        output
    }

    pub fn format_summary(&self, count: usize) -> String {
        let noun = if count == 1 { "warning" } else { "warnings" };
        let text = format!("Found {count} {noun}.");
        if self.color && count > 0 {
            text.yellow().bold().to_string()
        } else {
            text
        }
    }

    fn paint_warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_dimmed(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}
