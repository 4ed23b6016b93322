//! Diagnostic types and message lookup for the emitter.
//!
//! Lowering never aborts on a bad node. It records a `Diagnostic` and keeps
//! going, so callers get a complete Lua chunk plus the list of problems.

use serde::Serialize;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const UNSUPPORTED_SYNTAX: u32 = 100_001;
    pub const INVALID_DELETE_OPERAND: u32 = 100_002;
    pub const UNSUPPORTED_LENGTH_ASSIGNMENT: u32 = 100_003;
    pub const UNSUPPORTED_ARRAY_METHOD: u32 = 100_004;
    pub const MAX_DEPTH_EXCEEDED: u32 = 100_005;
    pub const INVALID_ASSIGNMENT_TARGET: u32 = 100_006;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const UNSUPPORTED_SYNTAX: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_SYNTAX,
        category: DiagnosticCategory::Error,
        message: "Unsupported syntax: {0}.",
    };
    pub const INVALID_DELETE_OPERAND: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INVALID_DELETE_OPERAND,
        category: DiagnosticCategory::Error,
        message: "The operand of a 'delete' operator must be a property reference.",
    };
    pub const UNSUPPORTED_LENGTH_ASSIGNMENT: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_LENGTH_ASSIGNMENT,
        category: DiagnosticCategory::Error,
        message: "Assigning to the 'length' of an array is not supported.",
    };
    pub const UNSUPPORTED_ARRAY_METHOD: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNSUPPORTED_ARRAY_METHOD,
        category: DiagnosticCategory::Warning,
        message: "Array method '{0}' has no Lua lowering; emitting a plain call.",
    };
    pub const MAX_DEPTH_EXCEEDED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::MAX_DEPTH_EXCEEDED,
        category: DiagnosticCategory::Error,
        message: "Expression is nested too deeply to lower.",
    };
    pub const INVALID_ASSIGNMENT_TARGET: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INVALID_ASSIGNMENT_TARGET,
        category: DiagnosticCategory::Error,
        message: "The left-hand side of an assignment must be a variable or a property access.",
    };

    pub const ALL: &[DiagnosticMessage] = &[
        UNSUPPORTED_SYNTAX,
        INVALID_DELETE_OPERAND,
        UNSUPPORTED_LENGTH_ASSIGNMENT,
        UNSUPPORTED_ARRAY_METHOD,
        MAX_DEPTH_EXCEEDED,
        INVALID_ASSIGNMENT_TARGET,
    ];
}

/// An emitter diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic from a message template, substituting `{0}`, `{1}`, ...
    #[must_use]
    pub fn from_message(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            message_text: format_message(message.message, args),
            category: message.category,
            code: message.code,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

pub fn get_message_template(code: u32) -> Option<&'static str> {
    diagnostic_messages::ALL
        .iter()
        .find(|m| m.code == code)
        .map(|m| m.message)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
