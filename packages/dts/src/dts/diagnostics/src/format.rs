use ts::{Diagnostic, DiagnosticCategory};

fn category_name(category: DiagnosticCategory) -> &'static str {
    match category {
        DiagnosticCategory::Error => "error",
        DiagnosticCategory::Warning => "warning",
        DiagnosticCategory::Suggestion => "suggestion",
        DiagnosticCategory::Message => "message",
    }
}

/// Render diagnostics one per line, `<category> TS<code>: <message> (<file>:<start>)`.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for diag in diagnostics {
        let category = category_name(diag.category);
        let message = diag.message_text.flatten();
        match (&diag.file, diag.start) {
            (Some(file), Some(start)) => output.push_str(&format!(
                "{} TS{}: {} ({}:{})\n",
                category, diag.code, message, file, start
            )),
            (Some(file), None) => output.push_str(&format!(
                "{} TS{}: {} ({})\n",
                category, diag.code, message, file
            )),
            _ => output.push_str(&format!("{} TS{}: {}\n", category, diag.code, message)),
        }
    }
    output
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}
