//! Common types and utilities for the tslua compiler.
//!
//! This crate provides foundational types used across all tslua crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, codes and message templates)
//! - Common enums (`NewLineKind`)
//! - Compiler limits and thresholds

// Common types - Shared constants to break circular dependencies
pub mod common;
pub use common::NewLineKind;

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, diagnostic_codes, diagnostic_messages,
    format_message, get_message_template,
};

// Centralized limits and thresholds
pub mod limits;
