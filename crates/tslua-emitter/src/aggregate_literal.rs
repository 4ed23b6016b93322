//! Array and hybrid literal construction.
//!
//! `[e0, e1, e2]` becomes the positional constructor `{e0, e1, e2}`: slot
//! `k + 1` holds `ek`. A record literal whose contextual type is array-like
//! (`{ 0: 3, name: "array" }` typed as an interface extending `Array`)
//! becomes a single table holding both the shifted numeric slots and the
//! named fields.

use tslua_lua::{LuaNode, TableField};

use crate::index_translator::translate_index;

/// One field of a hybrid array/record literal.
#[derive(Clone, Debug, PartialEq)]
pub enum HybridField {
    /// Numeric key in source (0-based) terms: `{ 0: value }`, `{ [i]: value }`.
    Slot(LuaNode, LuaNode),
    /// `{ name: value }`
    Named(String, LuaNode),
    /// Any other computed key, kept as-is.
    Keyed(LuaNode, LuaNode),
}

pub fn lower_array_literal(elements: Vec<LuaNode>) -> LuaNode {
    LuaNode::table(elements.into_iter().map(TableField::Positional).collect())
}

pub fn lower_hybrid_literal(fields: Vec<HybridField>, fold: bool) -> LuaNode {
    let fields = fields
        .into_iter()
        .map(|field| match field {
            HybridField::Slot(index, value) => {
                TableField::Keyed(translate_index(index, fold), value)
            }
            HybridField::Named(name, value) => TableField::Named(name, value),
            HybridField::Keyed(key, value) => TableField::Keyed(key, value),
        })
        .collect();
    LuaNode::table(fields)
}

/// Whether a string property key names an array slot (`"0"`, `"12"`, not `"01"`).
pub fn is_canonical_index_key(key: &str) -> bool {
    match key.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.len() < 16 && bytes.iter().all(u8::is_ascii_digit),
    }
}

#[cfg(test)]
#[path = "../tests/aggregate_literal_tests.rs"]
mod aggregate_literal_tests;
