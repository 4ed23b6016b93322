use super::*;

use tslua_lua::interp::{Value, run_chunk};
use tslua_lua::{LuaPrinter, TableField};

use crate::index_translator::array_slot;

fn four_element_array() -> LuaNode {
    LuaNode::local(
        "arr",
        Some(LuaNode::table(
            ["1", "2", "3", "4"]
                .into_iter()
                .map(|n| TableField::Positional(LuaNode::number(n)))
                .collect(),
        )),
    )
}

#[test]
fn test_unused_delete_is_a_nil_assignment() {
    let slot = array_slot(LuaNode::id("arr"), LuaNode::number("2"), true);
    let lowered = lower_delete(slot, false);
    assert_eq!(LuaPrinter::emit_to_string(&lowered), "arr[3] = nil");
}

#[test]
fn test_used_delete_yields_true() {
    let slot = array_slot(LuaNode::id("arr"), LuaNode::number("2"), true);
    let lowered = lower_delete(slot, true);
    assert_eq!(
        LuaPrinter::emit_to_string(&lowered),
        "(function()\n    arr[3] = nil\n    return true\nend)()"
    );
}

#[test]
fn test_delete_leaves_a_hole_without_shifting() {
    let slot = array_slot(LuaNode::id("arr"), LuaNode::number("2"), true);
    let chunk = vec![
        four_element_array(),
        LuaNode::local("exists", Some(lower_delete(slot, true))),
        LuaNode::ret(Some(LuaNode::id("arr"))),
    ];
    let value = run_chunk(&chunk).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.get_index(1), Value::Number(1.0));
    assert_eq!(table.get_index(2), Value::Number(2.0));
    assert!(table.get_index(3).is_nil());
    assert_eq!(table.get_index(4), Value::Number(4.0));
}

#[test]
fn test_delete_past_the_end_still_reports_true() {
    let slot = array_slot(LuaNode::id("arr"), LuaNode::number("4"), true);
    let chunk = vec![
        four_element_array(),
        LuaNode::ret(Some(lower_delete(slot, true))),
    ];
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Boolean(true));
}

#[test]
fn test_record_delete_has_no_offset() {
    let slot = LuaNode::member(LuaNode::id("obj"), "foo");
    assert_eq!(
        LuaPrinter::emit_to_string(&lower_delete(slot, false)),
        "obj.foo = nil"
    );
}
