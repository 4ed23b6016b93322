//! Base-offset correction for array indices.
//!
//! TypeScript arrays start at 0, Lua sequences at 1. Every index into an
//! array-like receiver goes through [`translate_index`], at reads, writes,
//! compound updates and deletes alike, so a write to `arr[k]` and a later read
//! of `arr[k]` always land on the same table slot.

use tslua_lua::LuaNode;

/// `index + 1`, folded at compile time when `index` is a non-negative integer
/// literal and `fold` is set. Negative, fractional and computed indices stay
/// runtime additions so the source's own semantics for them are untouched.
pub fn translate_index(index: LuaNode, fold: bool) -> LuaNode {
    if fold
        && let Some(value) = index.as_non_negative_integer()
        && let Some(shifted) = value.checked_add(1)
    {
        return LuaNode::integer(shifted);
    }
    LuaNode::add(index, LuaNode::integer(1))
}

/// `receiver[translate_index(index)]`
pub fn array_slot(receiver: LuaNode, index: LuaNode, fold: bool) -> LuaNode {
    LuaNode::index(receiver, translate_index(index, fold))
}

#[cfg(test)]
#[path = "../tests/index_translator_tests.rs"]
mod index_translator_tests;
