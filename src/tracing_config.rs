//! Log output for lowering and dispatch decisions.
//!
//! `TSLUA_LOG` takes an `EnvFilter` directive (falling back to `RUST_LOG`);
//! `TSLUA_LOG_FORMAT` picks `text` (default), `tree` or `json`. The end-to-end
//! suites install the subscriber from their shared helpers, so:
//!
//! ```bash
//! TSLUA_LOG=debug TSLUA_LOG_FORMAT=tree cargo test --test array_semantics
//! TSLUA_LOG="tslua_emitter::dispatcher=trace" cargo test --test array_delete
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Indented span tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// Unknown values select `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// What to install, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// `None` when logging was not asked for. `tslua_log` wins over `rust_log`.
    pub fn resolve(
        tslua_log: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
    ) -> Option<Self> {
        let directives = tslua_log.or(rust_log)?;
        Some(Self {
            directives,
            format: format.as_deref().map_or(LogFormat::Text, LogFormat::parse),
        })
    }

    pub fn from_env() -> Option<Self> {
        let var = |name| std::env::var(name).ok();
        Self::resolve(var("TSLUA_LOG"), var("RUST_LOG"), var("TSLUA_LOG_FORMAT"))
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.directives)
    }
}

/// Install the global subscriber if `TSLUA_LOG` or `RUST_LOG` is set.
/// Safe to call repeatedly; only the first call installs anything. Output
/// goes to stderr.
pub fn init_tracing() {
    let Some(settings) = LogSettings::from_env() else {
        return;
    };
    let filter = settings.filter();
    let installed = match settings.format {
        LogFormat::Tree => {
            let tree = tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree).try_init()
        }
        LogFormat::Json => {
            let json = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json).try_init()
        }
        LogFormat::Text => {
            let text = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text).try_init()
        }
    };
    if installed.is_ok() {
        tracing::debug!(format = ?settings.format, directives = %settings.directives, "tracing enabled");
    }
}
