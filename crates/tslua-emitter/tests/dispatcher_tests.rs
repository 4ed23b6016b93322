use super::*;

use tslua_lua::interp::{Value, run_chunk};
use tslua_lua::{LuaPrinter, TableField};
use tslua_types::TypeInterner;

fn print(node: &LuaNode) -> String {
    LuaPrinter::emit_to_string(node)
}

fn lowered(dispatch: ArrayDispatch) -> LuaNode {
    match dispatch {
        ArrayDispatch::Lowered(node) => node,
        ArrayDispatch::Fallback => panic!("expected the access to be lowered"),
    }
}

fn element(db: &TypeInterner, receiver: &str, index: LuaNode, receiver_type: TypeId) -> AccessNode {
    let index_type = match index {
        LuaNode::NumericLiteral(_) => TypeId::NUMBER,
        LuaNode::StringLiteral(_) => TypeId::STRING,
        _ => TypeId::UNKNOWN,
    };
    AccessNode::new(
        db,
        LuaNode::id(receiver),
        AccessKey::Element { index, index_type },
        receiver_type,
    )
}

fn named(db: &TypeInterner, receiver: &str, name: &str, receiver_type: TypeId) -> AccessNode {
    AccessNode::new(
        db,
        LuaNode::id(receiver),
        AccessKey::Named(name.to_string()),
        receiver_type,
    )
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
fn test_array_read_is_offset() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::number("1"), db.array(TypeId::NUMBER));
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr[2]");

    let access = element(&db, "arr", LuaNode::id("i"), db.array(TypeId::NUMBER));
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr[i + 1]");
}

#[test]
fn test_union_of_arrays_is_offset() {
    let db = TypeInterner::new();
    let union = db.union(vec![db.array(TypeId::NUMBER), db.array(TypeId::STRING)]);
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::number("1"), union);
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr[2]");
}

#[test]
fn test_record_and_unknown_receivers_fall_back() {
    let db = TypeInterner::new();
    let record = db.object(vec![PropertyInfo::new("foo", TypeId::STRING)]);
    let dispatcher = ArrayDispatcher::new(&db, true);

    let access = element(&db, "obj", LuaNode::number("0"), record);
    assert_eq!(dispatcher.read(&access), ArrayDispatch::Fallback);

    let access = element(&db, "obj", LuaNode::number("0"), TypeId::UNKNOWN);
    assert_eq!(dispatcher.read(&access), ArrayDispatch::Fallback);
    assert_eq!(print(&access.generic_target().node()), "obj[0]");

    let access = element(&db, "obj", LuaNode::number("0"), TypeId::ANY);
    assert_eq!(dispatcher.read(&access), ArrayDispatch::Fallback);
}

#[test]
fn test_mixed_named_members_are_fields() {
    let db = TypeInterner::new();
    let intersection = db.intersection(vec![
        db.array(TypeId::NUMBER),
        db.object(vec![PropertyInfo::new("foo", TypeId::STRING)]),
    ]);
    let dispatcher = ArrayDispatcher::new(&db, true);

    let access = named(&db, "arr", "foo", intersection);
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr.foo");

    let by_string = element(&db, "arr", LuaNode::string("foo"), intersection);
    assert_eq!(print(&lowered(dispatcher.read(&by_string))), "arr.foo");

    let by_index_string = element(&db, "arr", LuaNode::string("0"), intersection);
    assert_eq!(print(&lowered(dispatcher.read(&by_index_string))), "arr[1]");
}

#[test]
fn test_computed_string_key_on_mixed_has_no_offset() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = AccessNode::new(
        &db,
        LuaNode::id("arr"),
        AccessKey::Element {
            index: LuaNode::id("key"),
            index_type: TypeId::STRING,
        },
        custom_array(&db),
    );
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr[key]");
}

#[test]
fn test_length_reads_border() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = named(&db, "arr", "length", custom_array(&db));
    assert_eq!(print(&lowered(dispatcher.read(&access))), "#arr");
    assert!(dispatcher.is_length_write(&access));

    let name = named(&db, "arr", "name", custom_array(&db));
    assert!(!dispatcher.is_length_write(&name));
}

#[test]
fn test_unknown_member_of_array_falls_back() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = named(&db, "arr", "push", db.array(TypeId::NUMBER));
    assert_eq!(dispatcher.read(&access), ArrayDispatch::Fallback);
    assert_eq!(
        dispatcher.method_call(&access, &[LuaNode::number("1")]),
        ArrayDispatch::Fallback
    );
}

#[test]
fn test_method_member_uses_colon_call() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = named(&db, "arr", "firstElement", custom_array(&db));
    let call = lowered(dispatcher.method_call(&access, &[]));
    assert_eq!(print(&call), "arr:firstElement()");
}

#[test]
fn test_call_member_variants() {
    let method = PropertyInfo::method("end", TypeId::UNKNOWN);
    let property = PropertyInfo::new("run", TypeId::UNKNOWN);

    let plain = call_member(LuaNode::id("obj"), "run", Some(&property), vec![]);
    assert_eq!(print(&plain), "obj.run()");

    let keyword = call_member(LuaNode::id("obj"), "end", Some(&method), vec![LuaNode::number("1")]);
    assert_eq!(print(&keyword), "obj[\"end\"](obj, 1)");

    let impure = call_member(
        LuaNode::call(LuaNode::id("get"), vec![]),
        "end",
        Some(&method),
        vec![],
    );
    assert_eq!(
        print(&impure),
        "(function()\n    local ____obj = get()\n    return ____obj[\"end\"](____obj)\nend)()"
    );
}

#[test]
fn test_write_uses_same_offset_as_read() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::number("0"), custom_array(&db));
    let write = lower_assignment(
        dispatcher.write_target(&access).unwrap(),
        None,
        LuaNode::number("3"),
        ValuePosition::Statement,
    );
    assert_eq!(print(&write), "arr[1] = 3");
}

#[test]
fn test_compound_write_on_pure_receiver() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::id("i"), db.array(TypeId::NUMBER));
    let write = lower_assignment(
        dispatcher.write_target(&access).unwrap(),
        Some(LuaBinaryOp::Add),
        LuaNode::number("2"),
        ValuePosition::Statement,
    );
    assert_eq!(print(&write), "arr[i + 1] = arr[i + 1] + 2");
}

#[test]
fn test_compound_write_caches_impure_receiver_and_index() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = AccessNode::new(
        &db,
        LuaNode::call(LuaNode::id("getArray"), vec![]),
        AccessKey::Element {
            index: LuaNode::call(LuaNode::id("next"), vec![]),
            index_type: TypeId::NUMBER,
        },
        db.array(TypeId::NUMBER),
    );
    let write = lower_assignment(
        dispatcher.write_target(&access).unwrap(),
        Some(LuaBinaryOp::Mul),
        LuaNode::number("2"),
        ValuePosition::Statement,
    );
    assert_eq!(
        print(&write),
        "do\n    local ____obj = getArray()\n    local ____index = next() + 1\n    ____obj[____index] = ____obj[____index] * 2\nend"
    );
}

#[test]
fn test_postfix_increment_value_is_old_value() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::number("0"), db.array(TypeId::NUMBER));
    let old = lower_update(
        dispatcher.write_target(&access).unwrap(),
        LuaBinaryOp::Add,
        UpdateValue::Old,
        ValuePosition::Value,
    );
    let chunk = vec![
        LuaNode::local("arr", Some(LuaNode::table(vec![TableField::Positional(
            LuaNode::number("5"),
        )]))),
        LuaNode::local("old", Some(old)),
        LuaNode::ret(Some(LuaNode::table(vec![
            TableField::Positional(LuaNode::id("old")),
            TableField::Positional(LuaNode::index(LuaNode::id("arr"), LuaNode::number("1"))),
        ]))),
    ];
    let value = run_chunk(&chunk).unwrap();
    let result = value.as_table().unwrap();
    assert_eq!(result.get_index(1), Value::Number(5.0));
    assert_eq!(result.get_index(2), Value::Number(6.0));
}

#[test]
fn test_prefix_decrement_statement() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "arr", LuaNode::number("2"), db.array(TypeId::NUMBER));
    let stmt = lower_update(
        dispatcher.write_target(&access).unwrap(),
        LuaBinaryOp::Sub,
        UpdateValue::New,
        ValuePosition::Statement,
    );
    assert_eq!(print(&stmt), "arr[3] = arr[3] - 1");
}

#[test]
fn test_assignment_in_value_position_yields_value() {
    let target = AssignTarget::keyed(LuaNode::id("arr"), LuaNode::integer(1));
    let chunk = vec![
        LuaNode::local("arr", Some(LuaNode::table(vec![]))),
        LuaNode::ret(Some(lower_assignment(
            target,
            None,
            LuaNode::number("9"),
            ValuePosition::Value,
        ))),
    ];
    assert_eq!(run_chunk(&chunk).unwrap(), Value::Number(9.0));
}

#[test]
fn test_delete_on_array_and_fallback() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, true);
    let delete = DeleteNode {
        access: element(&db, "arr", LuaNode::number("2"), db.array(TypeId::NUMBER)),
        value_used: false,
    };
    assert_eq!(print(&lowered(dispatcher.delete(&delete))), "arr[3] = nil");

    let record = DeleteNode {
        access: named(&db, "obj", "foo", db.object(vec![PropertyInfo::new("foo", TypeId::STRING)])),
        value_used: true,
    };
    assert_eq!(dispatcher.delete(&record), ArrayDispatch::Fallback);
}

#[test]
fn test_fold_disabled() {
    let db = TypeInterner::new();
    let dispatcher = ArrayDispatcher::new(&db, false);
    let access = element(&db, "arr", LuaNode::number("1"), db.array(TypeId::NUMBER));
    assert_eq!(print(&lowered(dispatcher.read(&access))), "arr[1 + 1]");
}

#[test]
fn test_type_parameter_with_array_constraint() {
    let db = TypeInterner::new();
    let t = db.type_param("T", Some(db.array(TypeId::NUMBER)));
    let dispatcher = ArrayDispatcher::new(&db, true);
    let access = element(&db, "xs", LuaNode::number("0"), t);
    assert_eq!(print(&lowered(dispatcher.read(&access))), "xs[1]");
}
