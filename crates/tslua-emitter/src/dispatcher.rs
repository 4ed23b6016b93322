//! Codegen dispatch for accesses on array-shaped receivers.
//!
//! The host lowering builds an [`AccessNode`] for every `obj.name` and
//! `obj[index]` it meets, with its operands already lowered, and asks the
//! [`ArrayDispatcher`] to handle it. Receivers whose shape is `ArrayLike` or
//! `Mixed` are lowered here: numeric indices go through the index translator,
//! named members of a hybrid become plain fields, `.length` becomes `#`.
//! Anything else comes back as [`ArrayDispatch::Fallback`] (or no write
//! target) and the host uses generic record access.
//!
//! Writes (`=`, compound assignment, `++`/`--`) share one lowering over an
//! [`AssignTarget`]. When the written value is used, or a compound write
//! would evaluate an impure receiver or index twice, those are bound to
//! `____obj` / `____index` locals first:
//!
//! ```lua
//! -- statement position: getArray()[i] += 1
//! do
//!     local ____obj = getArray()
//!     ____obj[i + 1] = ____obj[i + 1] + 1
//! end
//! -- value position: const x = arr[0]++
//! local x = (function()
//!     local ____value = arr[1]
//!     arr[1] = ____value + 1
//!     return ____value
//! end)()
//! ```

use tslua_lua::{LuaBinaryOp, LuaNode, is_valid_lua_identifier};
use tslua_types::{PropertyInfo, ShapeClassification, TypeDatabase, TypeId, is_string_like};

use crate::aggregate_literal::is_canonical_index_key;
use crate::delete_lowering::lower_delete;
use crate::index_translator::translate_index;
use crate::shape_query::classify_receiver;

const OBJECT_TEMP: &str = "____obj";
const INDEX_TEMP: &str = "____index";
const VALUE_TEMP: &str = "____value";

#[derive(Clone, Debug, PartialEq)]
pub enum ArrayDispatch {
    Lowered(LuaNode),
    /// Not an array access; the caller lowers it as a generic record access.
    Fallback,
}

/// Whether the enclosing context uses the value of the lowered expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValuePosition {
    Statement,
    Value,
}

/// Which value an update expression yields: `x++` the old, `++x` the new.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateValue {
    Old,
    New,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AccessKey {
    /// `receiver[index]`; `index_type` is the checker's type of the index.
    Element { index: LuaNode, index_type: TypeId },
    /// `receiver.name`
    Named(String),
}

/// One receiver-and-key access, operands already lowered.
#[derive(Clone, Debug)]
pub struct AccessNode {
    pub receiver: LuaNode,
    pub key: AccessKey,
    pub receiver_type: TypeId,
    pub shape: ShapeClassification,
}

impl AccessNode {
    pub fn new(
        db: &dyn TypeDatabase,
        receiver: LuaNode,
        key: AccessKey,
        receiver_type: TypeId,
    ) -> Self {
        Self {
            receiver,
            key,
            receiver_type,
            shape: classify_receiver(db, receiver_type),
        }
    }

    /// The named member this access resolves to on the receiver's shape.
    pub fn member(&self) -> Option<&PropertyInfo> {
        match &self.key {
            AccessKey::Named(name) => self.shape.member(name),
            AccessKey::Element {
                index: LuaNode::StringLiteral(name),
                ..
            } => self.shape.member(name),
            AccessKey::Element { .. } => None,
        }
    }

    /// The same access with no shape-specific lowering: `obj.name` / `obj[index]`.
    pub fn generic_target(&self) -> AssignTarget {
        match &self.key {
            AccessKey::Named(name) => AssignTarget::field(self.receiver.clone(), name.clone()),
            AccessKey::Element { index, .. } => {
                AssignTarget::keyed(self.receiver.clone(), index.clone())
            }
        }
    }
}

/// `delete receiver[index]`
#[derive(Clone, Debug)]
pub struct DeleteNode {
    pub access: AccessNode,
    pub value_used: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SlotKey {
    /// `table.name`
    Field(String),
    /// `table[key]`
    Key(LuaNode),
}

/// Left-hand side of a lowered write.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Variable(String),
    Slot { table: LuaNode, key: SlotKey },
}

impl AssignTarget {
    pub fn field(table: LuaNode, name: impl Into<String>) -> Self {
        Self::Slot {
            table,
            key: SlotKey::Field(name.into()),
        }
    }

    pub const fn keyed(table: LuaNode, key: LuaNode) -> Self {
        Self::Slot {
            table,
            key: SlotKey::Key(key),
        }
    }

    /// The target as an expression, for reading or assigning.
    pub fn node(&self) -> LuaNode {
        match self {
            Self::Variable(name) => LuaNode::id(name.clone()),
            Self::Slot {
                table,
                key: SlotKey::Field(name),
            } => LuaNode::member(table.clone(), name.clone()),
            Self::Slot {
                table,
                key: SlotKey::Key(key),
            } => LuaNode::index(table.clone(), key.clone()),
        }
    }

    /// Bind an impure table or key to locals so the target can be read and
    /// written without evaluating them twice. With `pin` set, any table or
    /// key that is not a literal is bound too, fixing the slot before a later
    /// operand can rebind the variables it reads. Returns the `local`
    /// statements and the rewritten target.
    fn cached(self, pin: bool) -> (Vec<LuaNode>, Self) {
        let Self::Slot { table, key } = self else {
            return (Vec::new(), self);
        };
        let needs_temp = |node: &LuaNode| {
            !node.is_side_effect_free() || (pin && !node.is_literal())
        };
        let mut prelude = Vec::new();
        let table = if needs_temp(&table) {
            prelude.push(LuaNode::local(OBJECT_TEMP, Some(table)));
            LuaNode::id(OBJECT_TEMP)
        } else {
            table
        };
        let key = match key {
            SlotKey::Key(key) if needs_temp(&key) => {
                prelude.push(LuaNode::local(INDEX_TEMP, Some(key)));
                SlotKey::Key(LuaNode::id(INDEX_TEMP))
            }
            key => key,
        };
        (prelude, Self::Slot { table, key })
    }
}

/// Lower `target = value` or `target op= value`.
///
/// In statement position this is an assignment (wrapped in `do ... end` when
/// a compound write needs temps). In value position it is a function call
/// yielding the assigned value.
pub fn lower_assignment(
    target: AssignTarget,
    operator: Option<LuaBinaryOp>,
    value: LuaNode,
    position: ValuePosition,
) -> LuaNode {
    match (operator, position) {
        (None, ValuePosition::Statement) => LuaNode::assign(target.node(), value),
        (Some(operator), ValuePosition::Statement) => {
            let (mut body, target) = target.cached(false);
            let updated = LuaNode::binary(target.node(), operator, value);
            let write = LuaNode::assign(target.node(), updated);
            if body.is_empty() {
                return write;
            }
            body.push(write);
            LuaNode::do_block(body)
        }
        (operator, ValuePosition::Value) => {
            let (mut body, target) = target.cached(!value.is_side_effect_free());
            let new_value = match operator {
                Some(operator) => LuaNode::binary(target.node(), operator, value),
                None => value,
            };
            body.push(LuaNode::local(VALUE_TEMP, Some(new_value)));
            body.push(LuaNode::assign(target.node(), LuaNode::id(VALUE_TEMP)));
            body.push(LuaNode::ret(Some(LuaNode::id(VALUE_TEMP))));
            LuaNode::iife(body)
        }
    }
}

/// Lower `++`/`--`; `operator` is `Add` or `Sub`.
pub fn lower_update(
    target: AssignTarget,
    operator: LuaBinaryOp,
    result: UpdateValue,
    position: ValuePosition,
) -> LuaNode {
    let one = LuaNode::integer(1);
    if position == ValuePosition::Statement || result == UpdateValue::New {
        return lower_assignment(target, Some(operator), one, position);
    }
    let (mut body, target) = target.cached(false);
    body.push(LuaNode::local(VALUE_TEMP, Some(target.node())));
    body.push(LuaNode::assign(
        target.node(),
        LuaNode::binary(LuaNode::id(VALUE_TEMP), operator, one),
    ));
    body.push(LuaNode::ret(Some(LuaNode::id(VALUE_TEMP))));
    LuaNode::iife(body)
}

/// Call the member `name` of `receiver`.
///
/// Members declared with method syntax receive the receiver as `self`
/// (`obj:name(...)`); function-valued properties and members the checker
/// knows nothing about are plain calls (`obj.name(...)`).
pub fn call_member(
    receiver: LuaNode,
    name: &str,
    member: Option<&PropertyInfo>,
    arguments: Vec<LuaNode>,
) -> LuaNode {
    let is_method = member.is_some_and(|m| m.is_method);
    if !is_method {
        return LuaNode::call(LuaNode::member(receiver, name), arguments);
    }
    if is_valid_lua_identifier(name) {
        return LuaNode::method_call(receiver, name, arguments);
    }
    // No colon syntax for `obj["end"]`; pass `self` by hand.
    if receiver.is_side_effect_free() {
        let mut args = vec![receiver.clone()];
        args.extend(arguments);
        return LuaNode::call(LuaNode::member(receiver, name), args);
    }
    let mut args = vec![LuaNode::id(OBJECT_TEMP)];
    args.extend(arguments);
    LuaNode::iife(vec![
        LuaNode::local(OBJECT_TEMP, Some(receiver)),
        LuaNode::ret(Some(LuaNode::call(
            LuaNode::member(LuaNode::id(OBJECT_TEMP), name),
            args,
        ))),
    ])
}

/// Where an array-shaped access lands.
enum Route {
    Slot(AssignTarget),
    Length,
}

pub struct ArrayDispatcher<'a> {
    db: &'a dyn TypeDatabase,
    fold: bool,
}

impl<'a> ArrayDispatcher<'a> {
    pub fn new(db: &'a dyn TypeDatabase, fold: bool) -> Self {
        Self { db, fold }
    }

    fn route(&self, access: &AccessNode) -> Option<Route> {
        if !access.shape.is_array_like() {
            return None;
        }
        let receiver = access.receiver.clone();
        match &access.key {
            AccessKey::Named(name) => {
                if access.shape.member(name).is_some() {
                    Some(Route::Slot(AssignTarget::field(receiver, name.clone())))
                } else if name == "length" {
                    Some(Route::Length)
                } else {
                    None
                }
            }
            AccessKey::Element { index, index_type } => {
                if let LuaNode::StringLiteral(name) = index {
                    if is_canonical_index_key(name) {
                        let slot = translate_index(LuaNode::number(name.clone()), self.fold);
                        return Some(Route::Slot(AssignTarget::keyed(receiver, slot)));
                    }
                    if name == "length" && access.shape.member(name).is_none() {
                        return Some(Route::Length);
                    }
                    return Some(Route::Slot(AssignTarget::field(receiver, name.clone())));
                }
                if is_string_like(self.db, *index_type) {
                    // Named member looked up by a computed string.
                    return Some(Route::Slot(AssignTarget::keyed(receiver, index.clone())));
                }
                let slot = translate_index(index.clone(), self.fold);
                Some(Route::Slot(AssignTarget::keyed(receiver, slot)))
            }
        }
    }

    pub fn read(&self, access: &AccessNode) -> ArrayDispatch {
        match self.route(access) {
            Some(Route::Slot(target)) => {
                tracing::trace!(kind = "read", "[dispatch] array slot");
                ArrayDispatch::Lowered(target.node())
            }
            Some(Route::Length) => {
                ArrayDispatch::Lowered(LuaNode::length_of(access.receiver.clone()))
            }
            None => ArrayDispatch::Fallback,
        }
    }

    /// `arr.length = n`, which has no Lua equivalent.
    pub fn is_length_write(&self, access: &AccessNode) -> bool {
        matches!(self.route(access), Some(Route::Length))
    }

    /// Where a write through `access` lands, or `None` for a generic record
    /// write. `.length` has no write target; check [`Self::is_length_write`].
    pub fn write_target(&self, access: &AccessNode) -> Option<AssignTarget> {
        match self.route(access) {
            Some(Route::Slot(target)) => {
                tracing::trace!(kind = "write", "[dispatch] array slot");
                Some(target)
            }
            Some(Route::Length) | None => None,
        }
    }

    pub fn delete(&self, delete: &DeleteNode) -> ArrayDispatch {
        match self.route(&delete.access) {
            Some(Route::Slot(target)) => {
                tracing::trace!(value_used = delete.value_used, "[dispatch] array delete");
                ArrayDispatch::Lowered(lower_delete(target.node(), delete.value_used))
            }
            Some(Route::Length) | None => ArrayDispatch::Fallback,
        }
    }

    /// `receiver.name(args)` where `name` is a declared member of a hybrid.
    pub fn method_call(&self, access: &AccessNode, arguments: &[LuaNode]) -> ArrayDispatch {
        if !access.shape.is_array_like() {
            return ArrayDispatch::Fallback;
        }
        let AccessKey::Named(name) = &access.key else {
            return ArrayDispatch::Fallback;
        };
        match access.shape.member(name) {
            Some(member) => ArrayDispatch::Lowered(call_member(
                access.receiver.clone(),
                name,
                Some(member),
                arguments.to_vec(),
            )),
            None => ArrayDispatch::Fallback,
        }
    }
}

#[cfg(test)]
#[path = "../tests/dispatcher_tests.rs"]
mod dispatcher_tests;
