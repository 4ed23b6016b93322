//! `delete receiver[index]` lowering.
//!
//! Deleting leaves a hole: the slot is assigned `nil`, later elements do not
//! move. For a property reference `delete` always reports `true`, so when the
//! value is used the assignment is wrapped in a function that returns `true`.
//! The receiver and index are evaluated once, in source order, either way.

use tslua_lua::LuaNode;

/// `slot = nil` when the value is unused, otherwise
/// `(function() slot = nil; return true end)()`.
///
/// `slot` is already offset-corrected for array receivers.
pub fn lower_delete(slot: LuaNode, value_used: bool) -> LuaNode {
    let clear = LuaNode::assign(slot, LuaNode::Nil);
    if !value_used {
        return clear;
    }
    LuaNode::iife(vec![clear, LuaNode::ret(Some(LuaNode::BooleanLiteral(true)))])
}

/// Value of a `delete` whose operand is not a property reference.
pub const fn invalid_delete_value() -> LuaNode {
    LuaNode::BooleanLiteral(true)
}

#[cfg(test)]
#[path = "../tests/delete_lowering_tests.rs"]
mod delete_lowering_tests;
