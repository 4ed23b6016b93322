//! Lua target representation.
//!
//! Lowering produces `LuaNode` trees; `LuaPrinter` turns them into Lua
//! source. With the `interp` feature the crate also ships a small reference
//! interpreter over the same trees, which the emitter test suites use to check
//! that lowered programs behave like their sources.

pub mod ir;
pub use ir::{LuaBinaryOp, LuaNode, LuaUnaryOp, TableField, is_lua_keyword, is_valid_lua_identifier};

mod printer;
pub use printer::{LuaPrinter, PrinterOptions};

#[cfg(any(test, feature = "interp"))]
pub mod interp;
