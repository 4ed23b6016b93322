//! Per-file lowering state: options and collected diagnostics.

use tslua_ast::Span;
use tslua_common::{Diagnostic, DiagnosticMessage};

use crate::options::TranspileOptions;

pub struct EmitContext {
    pub options: TranspileOptions,
    file_name: String,
    diagnostics: Vec<Diagnostic>,
}

impl EmitContext {
    pub fn new(options: TranspileOptions) -> Self {
        Self {
            options,
            file_name: String::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn set_file_name(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
    }

    /// Record a diagnostic at `span`. Lowering continues afterwards.
    pub fn report(&mut self, span: Span, message: &DiagnosticMessage, args: &[&str]) {
        tracing::debug!(
            code = message.code,
            start = span.start,
            "[lowering] diagnostic: {}",
            message.message
        );
        self.diagnostics.push(Diagnostic::from_message(
            self.file_name.clone(),
            span.start,
            span.len(),
            message,
            args,
        ));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
