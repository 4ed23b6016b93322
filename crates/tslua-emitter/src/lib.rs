//! TypeScript to Lua lowering for the tslua compiler.
//!
//! This crate turns a type-checked source AST into Lua IR and Lua text:
//! - Host lowering (`LuaLowering`) for statements and general expressions
//! - Array-semantics dispatch (`ArrayDispatcher`): 0-based to 1-based
//!   indices, `delete` as holes, hybrid array/record literals, `.length`
//! - Options (`TranspileOptions`) loaded from the `tstl` block of a tsconfig

// Array-semantics components
pub mod aggregate_literal;
pub mod delete_lowering;
pub mod dispatcher;
pub mod index_translator;
pub mod shape_query;

pub use dispatcher::{
    AccessKey, AccessNode, ArrayDispatch, ArrayDispatcher, AssignTarget, DeleteNode,
    ValuePosition,
};

// Host lowering and its inputs
pub mod emit_context;
pub mod lowering;
pub mod node_types;
pub mod options;

pub use emit_context::EmitContext;
pub use lowering::LuaLowering;
pub use node_types::{ExpressionTypes, NodeTypeTable};
pub use options::TranspileOptions;

use tslua_ast::{NodeArena, NodeIndex};
use tslua_common::Diagnostic;
use tslua_lua::{LuaNode, LuaPrinter};
use tslua_types::TypeDatabase;

/// Result of lowering one source file.
#[derive(Clone, Debug)]
pub struct TranspileOutput {
    /// Printed Lua chunk
    pub lua: String,
    pub chunk: Vec<LuaNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TranspileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Lower and print the source file at `root`.
///
/// Unsupported constructs are reported in `diagnostics`; the rest of the
/// file is still lowered.
#[tracing::instrument(level = "debug", skip_all)]
pub fn transpile(
    arena: &NodeArena,
    root: NodeIndex,
    db: &dyn TypeDatabase,
    types: &dyn ExpressionTypes,
    options: &TranspileOptions,
) -> TranspileOutput {
    let mut ctx = EmitContext::new(options.clone());
    let chunk = LuaLowering::new(arena, db, types, &mut ctx).lower_source_file(root);
    let lua = LuaPrinter::new(options.printer_options()).print_chunk(&chunk);
    tracing::debug!(
        file = %ctx.file_name(),
        statements = chunk.len(),
        diagnostics = ctx.diagnostics().len(),
        "[lowering] transpiled"
    );
    TranspileOutput {
        lua,
        chunk,
        diagnostics: ctx.into_diagnostics(),
    }
}
