//! Host lowering: source AST to Lua IR.
//!
//! `LuaLowering` walks a source file in textual order and lowers each
//! statement and expression. General constructs are handled here directly.
//! Every property access, element access, assignment target and `delete`
//! operand is turned into an [`AccessNode`] and offered to the
//! [`ArrayDispatcher`] first; only when it falls back does the generic record
//! lowering apply.
//!
//! ```typescript
//! const arr: number[] = [3, 5, 1];
//! delete arr[2];
//! return `${arr[0]}`;
//! ```
//!
//! ```lua
//! local arr = {3, 5, 1}
//! arr[3] = nil
//! return tostring(arr[1])
//! ```

#[path = "lowering_helpers.rs"]
mod lowering_helpers;

use smallvec::SmallVec;

use tslua_ast::{
    AssignmentOperator, BinaryOperator, Node, NodeArena, NodeIndex, PropertyKey, PropertyName,
    TemplateSpan, UnaryOperator, UpdateOperator,
};
use tslua_common::DiagnosticMessage;
use tslua_common::diagnostic_messages;
use tslua_common::limits::MAX_LOWERING_DEPTH;
use tslua_lua::{LuaBinaryOp, LuaNode, LuaUnaryOp, TableField};
use tslua_types::{TypeDatabase, TypeId, classify_shape, is_number_like, is_string_like};

use crate::aggregate_literal::{
    HybridField, is_canonical_index_key, lower_array_literal, lower_hybrid_literal,
};
use crate::delete_lowering::{invalid_delete_value, lower_delete};
use crate::dispatcher::{
    AccessKey, AccessNode, ArrayDispatch, ArrayDispatcher, AssignTarget, DeleteNode,
    UpdateValue, ValuePosition, call_member, lower_assignment, lower_update,
};
use crate::emit_context::EmitContext;
use crate::node_types::ExpressionTypes;
use lowering_helpers::{
    concat_parts, is_call, lua_binary_operator, lua_identifier, normalize_numeric_literal,
    tostring,
};

/// Name bound by `local ____ = expr` for expressions used as statements.
const DISCARD_NAME: &str = "____";

pub struct LuaLowering<'a> {
    arena: &'a NodeArena,
    db: &'a dyn TypeDatabase,
    types: &'a dyn ExpressionTypes,
    ctx: &'a mut EmitContext,
    /// Current expression nesting, guarded by `MAX_LOWERING_DEPTH`
    depth: u32,
    depth_reported: bool,
}

impl<'a> LuaLowering<'a> {
    pub fn new(
        arena: &'a NodeArena,
        db: &'a dyn TypeDatabase,
        types: &'a dyn ExpressionTypes,
        ctx: &'a mut EmitContext,
    ) -> Self {
        Self {
            arena,
            db,
            types,
            ctx,
            depth: 0,
            depth_reported: false,
        }
    }

    /// Lower the tree rooted at `root` (normally a `SourceFile`) to a chunk.
    pub fn lower_source_file(&mut self, root: NodeIndex) -> Vec<LuaNode> {
        match self.node(root) {
            Some(Node::SourceFile {
                file_name,
                statements,
            }) => {
                self.ctx.set_file_name(file_name.clone());
                tracing::debug!(
                    file = %file_name,
                    statements = statements.len(),
                    "[lowering] source file"
                );
                self.lower_statements(statements)
            }
            Some(_) => self.lower_statement(root),
            None => Vec::new(),
        }
    }

    fn node(&self, index: NodeIndex) -> Option<&'a Node> {
        self.arena.get(index)
    }

    fn dispatcher(&self) -> ArrayDispatcher<'a> {
        ArrayDispatcher::new(self.db, self.ctx.options.fold_constant_indices)
    }

    fn type_of(&self, index: NodeIndex) -> TypeId {
        self.types.expression_type(self.arena, index)
    }

    fn report(&mut self, index: NodeIndex, message: &DiagnosticMessage, args: &[&str]) {
        let span = self.arena.span(index);
        self.ctx.report(span, message, args);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn lower_statements(&mut self, statements: &[NodeIndex]) -> Vec<LuaNode> {
        let mut out = Vec::with_capacity(statements.len());
        for &statement in statements {
            out.extend(self.lower_statement(statement));
        }
        // Lua only allows `return` as the last statement of a block.
        let last = out.len().saturating_sub(1);
        for (i, stmt) in out.iter_mut().enumerate() {
            if i != last && matches!(stmt, LuaNode::Return(_)) {
                let ret = std::mem::replace(stmt, LuaNode::Nil);
                *stmt = LuaNode::do_block(vec![ret]);
            }
        }
        out
    }

    fn lower_statement(&mut self, index: NodeIndex) -> Vec<LuaNode> {
        let Some(node) = self.node(index) else {
            return Vec::new();
        };
        match node {
            Node::VariableStatement {
                name,
                initializer,
                ambient,
            } => {
                if *ambient {
                    tracing::trace!(name = %name, "[lowering] ambient declaration, no output");
                    return Vec::new();
                }
                let value = initializer.map(|init| {
                    let contextual = self.types.declared_type(name);
                    self.lower_expression_with_context(init, contextual)
                });
                vec![LuaNode::local(lua_identifier(name), value)]
            }
            Node::FunctionDeclaration {
                name,
                parameters,
                body,
            } => {
                let parameters = parameters.iter().map(|p| lua_identifier(p.as_str())).collect();
                let body = self.lower_statements(body);
                vec![LuaNode::local_function(
                    lua_identifier(name),
                    parameters,
                    body,
                )]
            }
            Node::Block(statements) => vec![LuaNode::do_block(self.lower_statements(statements))],
            Node::ExpressionStatement(expression) => self.lower_expression_statement(*expression),
            Node::Return(expression) => {
                let value = expression.map(|e| self.lower_expression(e));
                vec![LuaNode::ret(value)]
            }
            Node::SourceFile { statements, .. } => self.lower_statements(statements),
            _ => {
                self.report(
                    index,
                    &diagnostic_messages::UNSUPPORTED_SYNTAX,
                    &["expression in statement position"],
                );
                Vec::new()
            }
        }
    }

    fn lower_expression_statement(&mut self, expression: NodeIndex) -> Vec<LuaNode> {
        let inner = self.arena.skip_outer_expressions(expression);
        let statement = match self.node(inner) {
            Some(Node::Assignment {
                target,
                operator,
                value,
            }) => self.lower_assignment_expression(
                inner,
                *target,
                *operator,
                *value,
                ValuePosition::Statement,
            ),
            Some(Node::Update {
                operator,
                prefix,
                operand,
            }) => self.lower_update_expression(
                *operand,
                *operator,
                *prefix,
                ValuePosition::Statement,
            ),
            Some(Node::Delete(operand)) => {
                self.lower_delete_expression(inner, *operand, ValuePosition::Statement)
            }
            Some(_) => {
                let value = self.lower_expression(inner);
                if is_call(&value) {
                    Some(LuaNode::expr_stmt(value))
                } else {
                    Some(LuaNode::local(DISCARD_NAME, Some(value)))
                }
            }
            None => None,
        };
        statement.into_iter().collect()
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn lower_expression(&mut self, index: NodeIndex) -> LuaNode {
        if self.depth >= MAX_LOWERING_DEPTH {
            if !self.depth_reported {
                self.depth_reported = true;
                self.report(index, &diagnostic_messages::MAX_DEPTH_EXCEEDED, &[]);
            }
            return LuaNode::Nil;
        }
        self.depth += 1;
        let lowered = self.lower_expression_inner(index);
        self.depth -= 1;
        lowered
    }

    /// Lower `index` where `contextual` is the type it is assigned to. Only
    /// object literals care: an array-shaped context makes them hybrids.
    fn lower_expression_with_context(&mut self, index: NodeIndex, contextual: TypeId) -> LuaNode {
        match self.node(index) {
            Some(Node::ObjectLiteral(properties)) if contextual != TypeId::UNKNOWN => {
                self.lower_object_literal(properties, contextual)
            }
            Some(Node::Parenthesized(inner)) => self.lower_expression_with_context(*inner, contextual),
            _ => self.lower_expression(index),
        }
    }

    fn lower_expression_inner(&mut self, index: NodeIndex) -> LuaNode {
        let Some(node) = self.node(index) else {
            return LuaNode::Nil;
        };
        match node {
            Node::NumericLiteral(text) => LuaNode::number(normalize_numeric_literal(text)),
            Node::StringLiteral(value) => LuaNode::string(value.clone()),
            Node::BooleanLiteral(value) => LuaNode::BooleanLiteral(*value),
            Node::NullLiteral | Node::Undefined => LuaNode::Nil,
            Node::Identifier(name) => LuaNode::id(lua_identifier(name)),
            Node::ArrayLiteral(elements) => {
                let elements = elements.iter().map(|&e| self.lower_expression(e)).collect();
                lower_array_literal(elements)
            }
            Node::ObjectLiteral(properties) => {
                let contextual = self.type_of(index);
                self.lower_object_literal(properties, contextual)
            }
            Node::PropertyAccess { expression, name } => {
                let access = self.named_access(*expression, name);
                self.read_access(access)
            }
            Node::ElementAccess {
                expression,
                argument,
            } => {
                let access = self.element_access(*expression, *argument);
                self.read_access(access)
            }
            Node::Call { callee, arguments } => self.lower_call(*callee, arguments),
            Node::Binary {
                left,
                operator,
                right,
            } => self.lower_binary(*left, *operator, *right),
            Node::Assignment {
                target,
                operator,
                value,
            } => self
                .lower_assignment_expression(
                    index,
                    *target,
                    *operator,
                    *value,
                    ValuePosition::Value,
                )
                .unwrap_or(LuaNode::Nil),
            Node::PrefixUnary { operator, operand } => {
                let operand = self.lower_expression(*operand);
                let operator = match operator {
                    UnaryOperator::Minus => LuaUnaryOp::Neg,
                    UnaryOperator::Not => LuaUnaryOp::Not,
                };
                LuaNode::unary(operator, operand)
            }
            Node::Update {
                operator,
                prefix,
                operand,
            } => self
                .lower_update_expression(*operand, *operator, *prefix, ValuePosition::Value)
                .unwrap_or(LuaNode::Nil),
            Node::Delete(operand) => self
                .lower_delete_expression(index, *operand, ValuePosition::Value)
                .unwrap_or_else(invalid_delete_value),
            Node::Template { head, spans } => self.lower_template(head, spans),
            Node::As { expression, ty } => self.lower_expression_with_context(*expression, *ty),
            Node::Parenthesized(inner) => self.lower_expression(*inner),
            Node::VariableStatement { .. }
            | Node::ExpressionStatement(_)
            | Node::Return(_)
            | Node::Block(_)
            | Node::FunctionDeclaration { .. }
            | Node::SourceFile { .. } => {
                self.report(
                    index,
                    &diagnostic_messages::UNSUPPORTED_SYNTAX,
                    &["statement in expression position"],
                );
                LuaNode::Nil
            }
        }
    }

    fn lower_arguments(&mut self, arguments: &[NodeIndex]) -> Vec<LuaNode> {
        arguments.iter().map(|&a| self.lower_expression(a)).collect()
    }

    fn lower_object_literal(&mut self, properties: &[PropertyName], contextual: TypeId) -> LuaNode {
        if classify_shape(self.db, contextual).is_array_like() {
            tracing::debug!(?contextual, "[lowering] object literal with array shape");
            let fields = properties
                .iter()
                .map(|prop| self.hybrid_field(prop))
                .collect();
            return lower_hybrid_literal(fields, self.ctx.options.fold_constant_indices);
        }

        let fields = properties
            .iter()
            .map(|prop| match &prop.key {
                PropertyKey::Identifier(name) | PropertyKey::StringLiteral(name) => {
                    TableField::Named(name.clone(), self.lower_expression(prop.value))
                }
                PropertyKey::NumericLiteral(text) => TableField::Keyed(
                    LuaNode::number(normalize_numeric_literal(text)),
                    self.lower_expression(prop.value),
                ),
                PropertyKey::Computed(key) => {
                    // Key before value, as in source.
                    let key = self.lower_expression(*key);
                    TableField::Keyed(key, self.lower_expression(prop.value))
                }
            })
            .collect();
        LuaNode::table(fields)
    }

    fn hybrid_field(&mut self, prop: &PropertyName) -> HybridField {
        match &prop.key {
            PropertyKey::NumericLiteral(text) => {
                let key = LuaNode::number(normalize_numeric_literal(text));
                HybridField::Slot(key, self.lower_expression(prop.value))
            }
            PropertyKey::StringLiteral(name) if is_canonical_index_key(name) => {
                let key = LuaNode::number(name.clone());
                HybridField::Slot(key, self.lower_expression(prop.value))
            }
            PropertyKey::Identifier(name) | PropertyKey::StringLiteral(name) => {
                HybridField::Named(name.clone(), self.lower_expression(prop.value))
            }
            PropertyKey::Computed(key_index) => {
                let key_type = self.type_of(*key_index);
                let key = self.lower_expression(*key_index);
                let value = self.lower_expression(prop.value);
                if is_number_like(self.db, key_type) {
                    HybridField::Slot(key, value)
                } else {
                    HybridField::Keyed(key, value)
                }
            }
        }
    }

    fn lower_template(&mut self, head: &str, spans: &[TemplateSpan]) -> LuaNode {
        let mut parts: SmallVec<[LuaNode; 8]> = SmallVec::new();
        parts.push(LuaNode::string(head));
        for span in spans {
            parts.push(tostring(self.lower_expression(span.expression)));
            parts.push(LuaNode::string(span.literal.clone()));
        }
        concat_parts(parts)
    }

    fn lower_binary(
        &mut self,
        left: NodeIndex,
        operator: BinaryOperator,
        right: NodeIndex,
    ) -> LuaNode {
        if operator == BinaryOperator::Add {
            let left_type = self.type_of(left);
            let right_type = self.type_of(right);
            if is_string_like(self.db, left_type) || is_string_like(self.db, right_type) {
                let left = self.concat_operand(left, left_type);
                let right = self.concat_operand(right, right_type);
                return LuaNode::concat(left, right);
            }
        }
        let left = self.lower_expression(left);
        let right = self.lower_expression(right);
        LuaNode::binary(left, lua_binary_operator(operator), right)
    }

    /// `..` accepts strings and numbers; anything else goes through `tostring`.
    fn concat_operand(&mut self, index: NodeIndex, type_id: TypeId) -> LuaNode {
        let value = self.lower_expression(index);
        if is_string_like(self.db, type_id) || is_number_like(self.db, type_id) {
            value
        } else {
            tostring(value)
        }
    }

    /// The Lua operator a compound assignment applies; `+=` on strings concatenates.
    fn compound_operator(
        &self,
        operator: AssignmentOperator,
        target: NodeIndex,
        value: NodeIndex,
    ) -> Option<LuaBinaryOp> {
        let operator = operator.binary_operator()?;
        if operator == BinaryOperator::Add
            && (is_string_like(self.db, self.type_of(target))
                || is_string_like(self.db, self.type_of(value)))
        {
            return Some(LuaBinaryOp::Concat);
        }
        Some(lua_binary_operator(operator))
    }

    // =========================================================================
    // Accesses
    // =========================================================================

    fn named_access(&mut self, expression: NodeIndex, name: &str) -> AccessNode {
        let receiver_type = self.type_of(expression);
        let receiver = self.lower_expression(expression);
        AccessNode::new(
            self.db,
            receiver,
            AccessKey::Named(name.to_string()),
            receiver_type,
        )
    }

    fn element_access(&mut self, expression: NodeIndex, argument: NodeIndex) -> AccessNode {
        let receiver_type = self.type_of(expression);
        let receiver = self.lower_expression(expression);
        let index_type = self.type_of(argument);
        let index = self.lower_expression(argument);
        AccessNode::new(
            self.db,
            receiver,
            AccessKey::Element { index, index_type },
            receiver_type,
        )
    }

    /// The access an assignment target or `delete` operand denotes, if any.
    fn access_of(&mut self, index: NodeIndex) -> Option<AccessNode> {
        match self.node(index)? {
            Node::PropertyAccess { expression, name } => Some(self.named_access(*expression, name)),
            Node::ElementAccess {
                expression,
                argument,
            } => Some(self.element_access(*expression, *argument)),
            _ => None,
        }
    }

    fn read_access(&mut self, access: AccessNode) -> LuaNode {
        match self.dispatcher().read(&access) {
            ArrayDispatch::Lowered(node) => node,
            ArrayDispatch::Fallback => {
                tracing::trace!(receiver_type = ?access.receiver_type, "[dispatch] fallback to record access");
                access.generic_target().node()
            }
        }
    }

    fn lower_call(&mut self, callee: NodeIndex, arguments: &[NodeIndex]) -> LuaNode {
        let callee_inner = self.arena.skip_outer_expressions(callee);
        if let Some(Node::PropertyAccess { expression, name }) = self.node(callee_inner) {
            let access = self.named_access(*expression, name);
            let arguments = self.lower_arguments(arguments);
            if let ArrayDispatch::Lowered(call) = self.dispatcher().method_call(&access, &arguments)
            {
                return call;
            }
            let member = access.member().cloned();
            if access.shape.is_array_like() && member.is_none() {
                self.report(
                    callee_inner,
                    &diagnostic_messages::UNSUPPORTED_ARRAY_METHOD,
                    &[name.as_str()],
                );
            }
            return call_member(access.receiver, name, member.as_ref(), arguments);
        }
        if let Some(Node::ElementAccess {
            expression,
            argument,
        }) = self.node(callee_inner)
            && let Some(Node::StringLiteral(name)) = self.node(*argument)
        {
            // `obj["name"](...)` calls the same member as `obj.name(...)`.
            let access = self.element_access(*expression, *argument);
            if let Some(member) = access.member().cloned() {
                let arguments = self.lower_arguments(arguments);
                return call_member(access.receiver, name, Some(&member), arguments);
            }
            let callee = self.read_access(access);
            let arguments = self.lower_arguments(arguments);
            return LuaNode::call(callee, arguments);
        }
        let callee = self.lower_expression(callee);
        let arguments = self.lower_arguments(arguments);
        LuaNode::call(callee, arguments)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Resolve an assignment target. Reports and returns `None` for targets
    /// that cannot be written.
    fn assign_target(&mut self, node: NodeIndex, target: NodeIndex) -> Option<AssignTarget> {
        let target = self.arena.skip_outer_expressions(target);
        if let Some(Node::Identifier(name)) = self.node(target) {
            return Some(AssignTarget::Variable(lua_identifier(name)));
        }
        let Some(access) = self.access_of(target) else {
            self.report(node, &diagnostic_messages::INVALID_ASSIGNMENT_TARGET, &[]);
            return None;
        };
        let dispatcher = self.dispatcher();
        if dispatcher.is_length_write(&access) {
            self.report(node, &diagnostic_messages::UNSUPPORTED_LENGTH_ASSIGNMENT, &[]);
            return None;
        }
        Some(
            dispatcher
                .write_target(&access)
                .unwrap_or_else(|| access.generic_target()),
        )
    }

    fn lower_assignment_expression(
        &mut self,
        node: NodeIndex,
        target: NodeIndex,
        operator: AssignmentOperator,
        value: NodeIndex,
        position: ValuePosition,
    ) -> Option<LuaNode> {
        let lua_operator = self.compound_operator(operator, target, value);
        let Some(assign_target) = self.assign_target(node, target) else {
            // Keep the value's side effects and result.
            let value = self.lower_expression(value);
            return match position {
                ValuePosition::Value => Some(value),
                ValuePosition::Statement if is_call(&value) => Some(LuaNode::expr_stmt(value)),
                ValuePosition::Statement => None,
            };
        };
        let value = self.lower_expression(value);
        Some(lower_assignment(assign_target, lua_operator, value, position))
    }

    fn lower_update_expression(
        &mut self,
        operand: NodeIndex,
        operator: UpdateOperator,
        prefix: bool,
        position: ValuePosition,
    ) -> Option<LuaNode> {
        let target = self.assign_target(operand, operand)?;
        let operator = match operator {
            UpdateOperator::Increment => LuaBinaryOp::Add,
            UpdateOperator::Decrement => LuaBinaryOp::Sub,
        };
        let result = if prefix {
            UpdateValue::New
        } else {
            UpdateValue::Old
        };
        Some(lower_update(target, operator, result, position))
    }

    /// `None` when there is nothing to emit (an invalid operand in statement
    /// position).
    fn lower_delete_expression(
        &mut self,
        node: NodeIndex,
        operand: NodeIndex,
        position: ValuePosition,
    ) -> Option<LuaNode> {
        let operand = self.arena.skip_outer_expressions(operand);
        let value_used = position == ValuePosition::Value;
        let Some(access) = self.access_of(operand) else {
            self.report(node, &diagnostic_messages::INVALID_DELETE_OPERAND, &[]);
            return value_used.then(invalid_delete_value);
        };
        let delete = DeleteNode { access, value_used };
        Some(match self.dispatcher().delete(&delete) {
            ArrayDispatch::Lowered(lowered) => lowered,
            ArrayDispatch::Fallback => {
                lower_delete(delete.access.generic_target().node(), value_used)
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/lowering_tests.rs"]
mod lowering_tests;
