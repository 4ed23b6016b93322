//! tslua: lowering of TypeScript array and collection semantics to Lua.
//!
//! The compiler is split into crates; this facade re-exports them:
//! - `tslua_common`: diagnostics, limits, shared enums
//! - `tslua_ast`: the source node arena the front end fills in
//! - `tslua_types`: type arena and shape classification
//! - `tslua_lua`: Lua IR and printer
//! - `tslua_emitter`: host lowering and the array-semantics dispatcher

use std::path::Path;

pub use tslua_ast as ast;
pub use tslua_common as common;
pub use tslua_emitter as emitter;
pub use tslua_lua as lua;
pub use tslua_types as types;

pub use tslua_common::{Diagnostic, DiagnosticCategory};
pub use tslua_emitter::{
    ExpressionTypes, NodeTypeTable, TranspileOptions, TranspileOutput, transpile,
};

use tslua_ast::{NodeArena, NodeIndex};
use tslua_types::TypeDatabase;

pub mod tracing_config;

/// Load options from the `tstl` block of the tsconfig at `config_path`, then
/// lower the file at `root`.
pub fn transpile_with_config(
    config_path: &Path,
    arena: &NodeArena,
    root: NodeIndex,
    db: &dyn TypeDatabase,
    types: &dyn ExpressionTypes,
) -> anyhow::Result<TranspileOutput> {
    let options = TranspileOptions::from_tsconfig_path(config_path)?;
    tracing::debug!(config = %config_path.display(), ?options, "[lowering] loaded options");
    Ok(transpile(arena, root, db, types, &options))
}
