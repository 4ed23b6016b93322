use super::*;

use tslua_common::{Diagnostic, diagnostic_codes};
use tslua_lua::interp::{Value, run_chunk};
use tslua_lua::{LuaPrinter, PrinterOptions};
use tslua_types::{PropertyInfo, TypeInterner};

use crate::node_types::NodeTypeTable;
use crate::options::TranspileOptions;

fn lower(
    arena: &NodeArena,
    root: NodeIndex,
    db: &TypeInterner,
    types: &NodeTypeTable<'_>,
) -> (Vec<LuaNode>, Vec<Diagnostic>) {
    let mut ctx = EmitContext::new(TranspileOptions::default());
    let chunk = LuaLowering::new(arena, db, types, &mut ctx).lower_source_file(root);
    (chunk, ctx.into_diagnostics())
}

fn print(chunk: &[LuaNode]) -> String {
    LuaPrinter::new(PrinterOptions::default()).print_chunk(chunk)
}

fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

/// `const arr = [values...]` as the first statement.
fn declare_array(arena: &mut NodeArena, values: &[&str]) -> NodeIndex {
    let literal = arena.number_array(values);
    arena.var_decl("arr", Some(literal))
}

fn custom_array(db: &TypeInterner) -> TypeId {
    let first_element = db.function(vec![], TypeId::NUMBER);
    db.interface(
        "CustomArray",
        vec![db.array(TypeId::NUMBER)],
        vec![
            PropertyInfo::new("name", TypeId::STRING),
            PropertyInfo::method("firstElement", first_element),
        ],
    )
}

#[test]
fn test_element_read_is_offset() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["3", "5", "1"]);
    let arr = arena.identifier("arr");
    let zero = arena.number("0");
    let read = arena.element_access(arr, zero);
    let ret = arena.ret(Some(read));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(diagnostics.is_empty());
    assert_eq!(print(&chunk), "local arr = {3, 5, 1}\nreturn arr[1]\n");
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Number(3.0));
}

#[test]
fn test_length_is_border() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["3", "5", "1"]);
    let arr = arena.identifier("arr");
    let length = arena.property_access(arr, "length");
    let ret = arena.ret(Some(length));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "local arr = {3, 5, 1}\nreturn #arr\n");
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Number(3.0));
}

#[test]
fn test_delete_statement_leaves_hole() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["1", "2", "3", "4"]);
    let arr = arena.identifier("arr");
    let two = arena.number("2");
    let slot = arena.element_access(arr, two);
    let delete = arena.delete(slot);
    let delete_stmt = arena.expr_stmt(delete);
    let arr_again = arena.identifier("arr");
    let ret = arena.ret(Some(arr_again));
    let root = arena.source_file("main.ts", vec![decl, delete_stmt, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(
        print(&chunk),
        "local arr = {1, 2, 3, 4}\narr[3] = nil\nreturn arr\n"
    );
    let result = run_chunk(&chunk).unwrap();
    let table = result.as_table().unwrap();
    assert_eq!(table.get_index(2), Value::Number(2.0));
    assert!(table.get_index(3).is_nil());
    assert_eq!(table.get_index(4), Value::Number(4.0));
}

#[test]
fn test_delete_value_is_true() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["1", "2"]);
    let arr = arena.identifier("arr");
    let one = arena.number("1");
    let slot = arena.element_access(arr, one);
    let delete = arena.delete(slot);
    let ret = arena.ret(Some(delete));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Boolean(true));
}

#[test]
fn test_record_access_has_no_offset() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("obj", db.object(vec![PropertyInfo::new("foo", TypeId::STRING)]));

    let mut arena = NodeArena::new();
    let obj = arena.identifier("obj");
    let zero = arena.number("0");
    let by_index = arena.element_access(obj, zero);
    let a = arena.var_decl("a", Some(by_index));
    let obj = arena.identifier("obj");
    let by_name = arena.property_access(obj, "foo");
    let b = arena.var_decl("b", Some(by_name));
    let root = arena.source_file("main.ts", vec![a, b]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(diagnostics.is_empty());
    assert_eq!(print(&chunk), "local a = obj[0]\nlocal b = obj.foo\n");
}

#[test]
fn test_length_assignment_is_reported() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let arr = arena.identifier("arr");
    let length = arena.property_access(arr, "length");
    let zero = arena.number("0");
    let assign = arena.assign(length, zero);
    let stmt = arena.expr_stmt(assign);
    let root = arena.source_file("main.ts", vec![stmt]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::UNSUPPORTED_LENGTH_ASSIGNMENT]
    );
    assert_eq!(diagnostics[0].file, "main.ts");
    assert!(chunk.is_empty());
}

#[test]
fn test_delete_of_non_access_is_reported() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let x = arena.identifier("x");
    let delete = arena.delete(x);
    let stmt = arena.expr_stmt(delete);
    let y = arena.identifier("y");
    let delete_value = arena.delete(y);
    let ret = arena.ret(Some(delete_value));
    let root = arena.source_file("main.ts", vec![stmt, ret]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert_eq!(
        codes(&diagnostics),
        vec![
            diagnostic_codes::INVALID_DELETE_OPERAND,
            diagnostic_codes::INVALID_DELETE_OPERAND
        ]
    );
    assert_eq!(print(&chunk), "return true\n");
}

#[test]
fn test_object_literal_with_array_context_is_hybrid() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", custom_array(&db));

    let mut arena = NodeArena::new();
    let three = arena.number("3");
    let name = arena.string("array");
    let literal = arena.object_literal(vec![
        PropertyName::numeric("0", three),
        PropertyName::named("name", name),
    ]);
    let decl = arena.var_decl("arr", Some(literal));
    let arr = arena.identifier("arr");
    let name_read = arena.property_access(arr, "name");
    let ret = arena.ret(Some(name_read));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(
        print(&chunk),
        "local arr = {[1] = 3, name = \"array\"}\nreturn arr.name\n"
    );
    assert_eq!(run_chunk(&chunk).unwrap(), Value::string("array"));
}

#[test]
fn test_object_literal_without_array_context_keeps_keys() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let three = arena.number("3");
    let literal = arena.object_literal(vec![PropertyName::numeric("0", three)]);
    let decl = arena.var_decl("obj", Some(literal));
    let root = arena.source_file("main.ts", vec![decl]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "local obj = {[0] = 3}\n");
}

#[test]
fn test_method_member_uses_colon_call() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", custom_array(&db));

    let mut arena = NodeArena::new();
    let arr = arena.identifier("arr");
    let callee = arena.property_access(arr, "firstElement");
    let call = arena.call(callee, vec![]);
    let ret = arena.ret(Some(call));
    let root = arena.source_file("main.ts", vec![ret]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(diagnostics.is_empty());
    assert_eq!(print(&chunk), "return arr:firstElement()\n");
}

#[test]
fn test_unknown_array_method_is_reported() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let arr = arena.identifier("arr");
    let callee = arena.property_access(arr, "push");
    let four = arena.number("4");
    let call = arena.call(callee, vec![four]);
    let stmt = arena.expr_stmt(call);
    let root = arena.source_file("main.ts", vec![stmt]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::UNSUPPORTED_ARRAY_METHOD]
    );
    assert_eq!(print(&chunk), "arr.push(4)\n");
}

#[test]
fn test_postfix_increment_in_value_position() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["5"]);
    let arr = arena.identifier("arr");
    let zero = arena.number("0");
    let slot = arena.element_access(arr, zero);
    let increment = arena.update(UpdateOperator::Increment, false, slot);
    let old = arena.var_decl("old", Some(increment));
    let old_read = arena.identifier("old");
    let arr = arena.identifier("arr");
    let zero = arena.number("0");
    let current = arena.element_access(arr, zero);
    let pair = arena.array_literal(vec![old_read, current]);
    let ret = arena.ret(Some(pair));
    let root = arena.source_file("main.ts", vec![decl, old, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    let result = run_chunk(&chunk).unwrap();
    let table = result.as_table().unwrap();
    assert_eq!(table.get_index(1), Value::Number(5.0));
    assert_eq!(table.get_index(2), Value::Number(6.0));
}

#[test]
fn test_template_converts_substitutions() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["7"]);
    let arr = arena.identifier("arr");
    let zero = arena.number("0");
    let read = arena.element_access(arr, zero);
    let template = arena.template("n=", vec![TemplateSpan::new(read, "")]);
    let ret = arena.ret(Some(template));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(
        print(&chunk),
        "local arr = {7}\nreturn \"n=\" .. tostring(arr[1])\n"
    );
    assert_eq!(run_chunk(&chunk).unwrap(), Value::string("n=7"));
}

#[test]
fn test_string_addition_concatenates() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let a = arena.string("a");
    let one = arena.number("1");
    let with_number = arena.binary(a, BinaryOperator::Add, one);
    let x = arena.var_decl("x", Some(with_number));
    let b = arena.string("b");
    let yes = arena.boolean(true);
    let with_boolean = arena.binary(b, BinaryOperator::Add, yes);
    let y = arena.var_decl("y", Some(with_boolean));
    let root = arena.source_file("main.ts", vec![x, y]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(
        print(&chunk),
        "local x = \"a\" .. 1\nlocal y = \"b\" .. tostring(true)\n"
    );
}

#[test]
fn test_string_compound_addition_concatenates() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("s", TypeId::STRING);

    let mut arena = NodeArena::new();
    let s = arena.identifier("s");
    let x = arena.string("x");
    let assign = arena.compound_assign(s, AssignmentOperator::AddAssign, x);
    let stmt = arena.expr_stmt(assign);
    let root = arena.source_file("main.ts", vec![stmt]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "s = s .. \"x\"\n");
}

#[test]
fn test_lua_keywords_are_renamed() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let one = arena.number("1");
    let decl = arena.var_decl("end", Some(one));
    let read = arena.identifier("end");
    let ret = arena.ret(Some(read));
    let root = arena.source_file("main.ts", vec![decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "local ____end = 1\nreturn ____end\n");
}

#[test]
fn test_numeric_literals_are_normalized() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let binary = arena.number("0b101");
    let a = arena.var_decl("a", Some(binary));
    let separated = arena.number("1_000");
    let b = arena.var_decl("b", Some(separated));
    let root = arena.source_file("main.ts", vec![a, b]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "local a = 5\nlocal b = 1000\n");
}

#[test]
fn test_return_before_last_statement_is_wrapped() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let one = arena.number("1");
    let first = arena.ret(Some(one));
    let two = arena.number("2");
    let second = arena.ret(Some(two));
    let root = arena.source_file("main.ts", vec![first, second]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "do\n    return 1\nend\nreturn 2\n");
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Number(1.0));
}

#[test]
fn test_ambient_declaration_emits_nothing() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let decl = arena.ambient_var("arr");
    let root = arena.source_file("main.ts", vec![decl]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(chunk.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_discarded_expression_is_bound() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let arr = arena.identifier("arr");
    let zero = arena.number("0");
    let read = arena.element_access(arr, zero);
    let stmt = arena.expr_stmt(read);
    let root = arena.source_file("main.ts", vec![stmt]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "local ____ = arr[1]\n");
}

#[test]
fn test_function_parameter_types_drive_offsets() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));
    types.declare("xs", db.array(TypeId::NUMBER));
    types.declare("first", db.function(vec![db.array(TypeId::NUMBER)], TypeId::NUMBER));

    let mut arena = NodeArena::new();
    let xs = arena.identifier("xs");
    let zero = arena.number("0");
    let read = arena.element_access(xs, zero);
    let body = arena.ret(Some(read));
    let function = arena.function_decl("first", vec!["xs".to_string()], vec![body]);
    let decl = declare_array(&mut arena, &["8", "9"]);
    let callee = arena.identifier("first");
    let arr = arena.identifier("arr");
    let call = arena.call(callee, vec![arr]);
    let ret = arena.ret(Some(call));
    let root = arena.source_file("main.ts", vec![function, decl, ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(
        print(&chunk),
        "local function first(xs)\n    return xs[1]\nend\nlocal arr = {8, 9}\nreturn first(arr)\n"
    );
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Number(8.0));
}

#[test]
fn test_as_expression_supplies_receiver_type() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let obj = arena.identifier("obj");
    let cast = arena.as_expr(obj, db.array(TypeId::NUMBER));
    let zero = arena.number("0");
    let read = arena.element_access(cast, zero);
    let ret = arena.ret(Some(read));
    let root = arena.source_file("main.ts", vec![ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "return obj[1]\n");
}

#[test]
fn test_invalid_assignment_target_is_reported() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let one = arena.number("1");
    let two = arena.number("2");
    let assign = arena.assign(one, two);
    let stmt = arena.expr_stmt(assign);
    let root = arena.source_file("main.ts", vec![stmt]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert_eq!(
        codes(&diagnostics),
        vec![diagnostic_codes::INVALID_ASSIGNMENT_TARGET]
    );
    assert!(chunk.is_empty());
}

#[test]
fn test_deep_nesting_reports_once() {
    // Deep recursion; run with a known stack size.
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(|| {
            let db = TypeInterner::new();
            let types = NodeTypeTable::new(&db);

            let mut arena = NodeArena::new();
            let mut expr = arena.number("1");
            for _ in 0..(MAX_LOWERING_DEPTH + 20) {
                expr = arena.prefix_unary(UnaryOperator::Minus, expr);
            }
            let ret = arena.ret(Some(expr));
            let root = arena.source_file("main.ts", vec![ret]);

            let (_, diagnostics) = lower(&arena, root, &db, &types);
            codes(&diagnostics)
        })
        .unwrap();
    assert_eq!(
        handle.join().unwrap(),
        vec![diagnostic_codes::MAX_DEPTH_EXCEEDED]
    );
}

#[test]
fn test_string_keyed_method_call_binds_self() {
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", custom_array(&db));

    let mut arena = NodeArena::new();
    let arr = arena.identifier("arr");
    let key = arena.string("firstElement");
    let callee = arena.element_access(arr, key);
    let call = arena.call(callee, vec![]);
    let ret = arena.ret(Some(call));
    let root = arena.source_file("main.ts", vec![ret]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(diagnostics.is_empty());
    assert_eq!(print(&chunk), "return arr:firstElement()\n");
}

#[test]
fn test_string_keyed_property_call_is_plain() {
    let db = TypeInterner::new();
    let callback = db.function(vec![], TypeId::NUMBER);
    let mut types = NodeTypeTable::new(&db);
    types.declare("obj", db.object(vec![PropertyInfo::new("run", callback)]));

    let mut arena = NodeArena::new();
    let obj = arena.identifier("obj");
    let key = arena.string("run");
    let callee = arena.element_access(obj, key);
    let call = arena.call(callee, vec![]);
    let ret = arena.ret(Some(call));
    let root = arena.source_file("main.ts", vec![ret]);

    let (chunk, _) = lower(&arena, root, &db, &types);
    assert_eq!(print(&chunk), "return obj.run()\n");
}

#[test]
fn test_assignment_value_cannot_move_the_written_slot() {
    // const x = (arr[i] = (i = 1)) writes arr[0].
    let db = TypeInterner::new();
    let mut types = NodeTypeTable::new(&db);
    types.declare("arr", db.array(TypeId::NUMBER));
    types.declare("i", TypeId::NUMBER);
    types.declare("x", TypeId::NUMBER);

    let mut arena = NodeArena::new();
    let decl = declare_array(&mut arena, &["9", "9"]);
    let zero = arena.number("0");
    let index_decl = arena.var_decl("i", Some(zero));
    let i = arena.identifier("i");
    let one = arena.number("1");
    let rebind = arena.assign(i, one);
    let rebind = arena.paren(rebind);
    let arr = arena.identifier("arr");
    let i = arena.identifier("i");
    let slot = arena.element_access(arr, i);
    let write = arena.assign(slot, rebind);
    let x = arena.var_decl("x", Some(write));
    let arr = arena.identifier("arr");
    let ret = arena.ret(Some(arr));
    let root = arena.source_file("main.ts", vec![decl, index_decl, x, ret]);

    let (chunk, diagnostics) = lower(&arena, root, &db, &types);
    assert!(diagnostics.is_empty());
    assert!(print(&chunk).contains("local ____index = i + 1\n"), "{}", print(&chunk));
    let result = run_chunk(&chunk).unwrap();
    let table = result.as_table().unwrap();
    assert_eq!(table.get_index(1), Value::Number(1.0));
    assert_eq!(table.get_index(2), Value::Number(9.0));
}

#[test]
fn test_computed_key_is_lowered_before_value() {
    let db = TypeInterner::new();
    let types = NodeTypeTable::new(&db);

    let mut arena = NodeArena::new();
    let x = arena.identifier("x");
    let key = arena.delete(x);
    let one = arena.number("1");
    let two = arena.number("2");
    let value = arena.assign(one, two);
    let literal = arena.object_literal(vec![PropertyName::computed(key, value)]);
    let decl = arena.var_decl("obj", Some(literal));
    let root = arena.source_file("main.ts", vec![decl]);

    let (_, diagnostics) = lower(&arena, root, &db, &types);
    assert_eq!(
        codes(&diagnostics),
        vec![
            diagnostic_codes::INVALID_DELETE_OPERAND,
            diagnostic_codes::INVALID_ASSIGNMENT_TARGET
        ]
    );
}
