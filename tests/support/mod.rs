//! Shared helpers for the end-to-end suites: build a program, lower it, and
//! run the emitted chunk on the reference interpreter.

#![allow(dead_code)]

use tslua::{NodeTypeTable, TranspileOptions, TranspileOutput, tracing_config, transpile};
use tslua_ast::{NodeArena, NodeIndex, TemplateSpan};
use tslua_lua::LuaNode;
use tslua_lua::interp::{Value, run_chunk};
use tslua_types::TypeInterner;

/// `name[index]` with a numeric literal index.
pub fn element(arena: &mut NodeArena, name: &str, index: &str) -> NodeIndex {
    let receiver = arena.identifier(name);
    let index = arena.number(index);
    arena.element_access(receiver, index)
}

/// `name.member`
pub fn member(arena: &mut NodeArena, name: &str, member: &str) -> NodeIndex {
    let receiver = arena.identifier(name);
    arena.property_access(receiver, member)
}

/// `head${e0}l0${e1}l1...`
pub fn template(arena: &mut NodeArena, head: &str, parts: Vec<(NodeIndex, &str)>) -> NodeIndex {
    let spans = parts
        .into_iter()
        .map(|(expression, literal)| TemplateSpan::new(expression, literal))
        .collect();
    arena.template(head, spans)
}

/// `` `${name[0]},${name[1]},...` `` over the first `count` slots.
pub fn joined_slots(arena: &mut NodeArena, name: &str, count: usize) -> NodeIndex {
    let parts = (0..count)
        .map(|i| {
            let read = element(arena, name, &i.to_string());
            (read, if i + 1 == count { "" } else { "," })
        })
        .collect();
    template(arena, "", parts)
}

/// Lower with default options; the program must lower without diagnostics.
/// Honors `TSLUA_LOG` / `TSLUA_LOG_FORMAT`.
pub fn lower(
    arena: &NodeArena,
    root: NodeIndex,
    db: &TypeInterner,
    types: &NodeTypeTable<'_>,
) -> TranspileOutput {
    tracing_config::init_tracing();
    let output = transpile(arena, root, db, types, &TranspileOptions::default());
    assert!(
        output.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );
    output
}

/// Lower, then execute the chunk and return its result.
pub fn run(
    arena: &NodeArena,
    root: NodeIndex,
    db: &TypeInterner,
    types: &NodeTypeTable<'_>,
) -> (String, Value) {
    let output = lower(arena, root, db, types);
    let value = run_chunk(&output.chunk)
        .unwrap_or_else(|err| panic!("{err}\n--- emitted ---\n{}", output.lua));
    (output.lua, value)
}

/// Like [`run`], with `host` statements executed before the lowered chunk.
/// Stands in for Lua values an ambient declaration refers to.
pub fn run_after(
    host: Vec<LuaNode>,
    arena: &NodeArena,
    root: NodeIndex,
    db: &TypeInterner,
    types: &NodeTypeTable<'_>,
) -> (String, Value) {
    let output = lower(arena, root, db, types);
    let mut chunk = host;
    chunk.extend(output.chunk);
    let value = run_chunk(&chunk)
        .unwrap_or_else(|err| panic!("{err}\n--- emitted ---\n{}", output.lua));
    (output.lua, value)
}

/// Slots `1..=count` of a returned table, as Lua numbers.
pub fn slots(value: &Value, count: i64) -> Vec<Option<f64>> {
    let table = value.as_table().expect("chunk should return a table");
    (1..=count).map(|i| table.get_index(i).as_number()).collect()
}
