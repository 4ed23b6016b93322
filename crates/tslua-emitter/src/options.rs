//! Transpile options and their tsconfig loader.
//!
//! Options live under a `"tstl"` key next to `compilerOptions`:
//!
//! ```json
//! {
//!     "compilerOptions": { "strict": true },
//!     "tstl": { "foldConstantIndices": "false", "newLine": "crlf" }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use tslua_common::NewLineKind;
use tslua_lua::PrinterOptions;

/// Accepts `true` as well as `"true"`, since hand-written tsconfig files use both.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranspileOptions {
    /// Emit `arr[2]` for `arr[1]` instead of `arr[1 + 1]`.
    #[serde(deserialize_with = "deserialize_bool_or_string")]
    pub fold_constant_indices: bool,
    pub new_line: NewLineKind,
    pub indent_width: usize,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            fold_constant_indices: true,
            new_line: NewLineKind::Lf,
            indent_width: 4,
        }
    }
}

#[derive(Deserialize, Default)]
struct TsConfigDocument {
    #[serde(default)]
    tstl: Option<TranspileOptions>,
}

impl TranspileOptions {
    /// Read the `"tstl"` section of a tsconfig document. Comments and trailing
    /// commas are accepted; a missing section yields the defaults.
    pub fn from_tsconfig_str(source: &str) -> Result<Self> {
        let normalized = remove_trailing_commas(&strip_jsonc(source));
        let document: TsConfigDocument =
            serde_json::from_str(&normalized).context("failed to parse tsconfig JSON")?;
        Ok(document.tstl.unwrap_or_default())
    }

    pub fn from_tsconfig_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tsconfig: {}", path.display()))?;
        Self::from_tsconfig_str(&source)
            .with_context(|| format!("failed to parse tsconfig: {}", path.display()))
    }

    pub const fn printer_options(&self) -> PrinterOptions {
        PrinterOptions {
            new_line: self.new_line,
            indent_width: self.indent_width,
        }
    }
}

/// Drop `//` and `/* */` comments, leaving string contents untouched. Newlines inside comments are kept so serde_json error
/// positions still match the source.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Drop commas followed only by whitespace and a closing `}` or `]`. Runs
/// after [`strip_jsonc`], so a comment between the comma and the closer is
/// already gone.
fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let trailing = chars
                    .clone()
                    .find(|c| !c.is_whitespace())
                    .is_some_and(|c| c == '}' || c == ']');
                if !trailing {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;
