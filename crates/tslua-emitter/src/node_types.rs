//! Expression type queries.
//!
//! The checker resolves types; the emitter only asks for them through
//! [`ExpressionTypes`]. [`NodeTypeTable`] is the table-backed implementation
//! the driver fills in from checker results. Nodes the checker did not record
//! fall back to what the syntax alone says (literal kinds, `as` assertions,
//! call return types, member types on known shapes), and finally to
//! `TypeId::UNKNOWN`. Array and object literals are not inferred: building
//! their types needs the interner, which stays with the checker.

use rustc_hash::FxHashMap;

use tslua_ast::{BinaryOperator, Node, NodeArena, NodeIndex, UnaryOperator};
use tslua_common::limits::MAX_LOWERING_DEPTH;
use tslua_types::{TypeData, TypeDatabase, TypeId, classify_shape, is_string_like};

pub trait ExpressionTypes {
    /// Resolved type of the expression at `node`.
    fn expression_type(&self, arena: &NodeArena, node: NodeIndex) -> TypeId;

    /// Declared type of a variable, used as the contextual type of its
    /// initializer.
    fn declared_type(&self, _name: &str) -> TypeId {
        TypeId::UNKNOWN
    }
}

pub struct NodeTypeTable<'db> {
    db: &'db dyn TypeDatabase,
    by_node: FxHashMap<NodeIndex, TypeId>,
    by_name: FxHashMap<String, TypeId>,
}

impl<'db> NodeTypeTable<'db> {
    pub fn new(db: &'db dyn TypeDatabase) -> Self {
        Self {
            db,
            by_node: FxHashMap::default(),
            by_name: FxHashMap::default(),
        }
    }

    /// Record the checker's type for one node.
    pub fn set_node_type(&mut self, node: NodeIndex, type_id: TypeId) {
        self.by_node.insert(node, type_id);
    }

    /// Record the declared type of a variable or function name.
    pub fn declare(&mut self, name: impl Into<String>, type_id: TypeId) {
        self.by_name.insert(name.into(), type_id);
    }

    fn infer(&self, arena: &NodeArena, node: NodeIndex, depth: u32) -> TypeId {
        if let Some(&type_id) = self.by_node.get(&node) {
            return type_id;
        }
        if depth >= MAX_LOWERING_DEPTH {
            return TypeId::UNKNOWN;
        }
        let Some(data) = arena.get(node) else {
            return TypeId::UNKNOWN;
        };
        let depth = depth + 1;

        match data {
            Node::NumericLiteral(_) | Node::Update { .. } => TypeId::NUMBER,
            Node::StringLiteral(_) | Node::Template { .. } => TypeId::STRING,
            Node::BooleanLiteral(_) | Node::Delete(_) => TypeId::BOOLEAN,
            Node::NullLiteral | Node::Undefined => TypeId::NIL,
            Node::Identifier(name) => self.by_name.get(name).copied().unwrap_or(TypeId::UNKNOWN),
            Node::As { ty, .. } => *ty,
            Node::Parenthesized(inner) => self.infer(arena, *inner, depth),
            Node::Assignment { value, .. } => self.infer(arena, *value, depth),
            Node::PrefixUnary { operator, .. } => match operator {
                UnaryOperator::Minus => TypeId::NUMBER,
                UnaryOperator::Not => TypeId::BOOLEAN,
            },
            Node::Binary {
                left,
                operator,
                right,
            } => self.infer_binary(arena, *left, *operator, *right, depth),
            Node::Call { callee, .. } => {
                let callee_type = self.infer(arena, *callee, depth);
                match self.db.lookup(callee_type) {
                    Some(TypeData::Function { return_type, .. }) => return_type,
                    _ => TypeId::UNKNOWN,
                }
            }
            Node::PropertyAccess { expression, name } => {
                let shape = classify_shape(self.db, self.infer(arena, *expression, depth));
                match shape.member(name) {
                    Some(prop) => prop.type_id,
                    None if name == "length" && shape.is_array_like() => TypeId::NUMBER,
                    None => TypeId::UNKNOWN,
                }
            }
            Node::ElementAccess {
                expression,
                argument,
            } => {
                let shape = classify_shape(self.db, self.infer(arena, *expression, depth));
                if let Some(Node::StringLiteral(key)) = arena.get(*argument)
                    && let Some(prop) = shape.member(key)
                {
                    return prop.type_id;
                }
                shape.element_type().unwrap_or(TypeId::UNKNOWN)
            }
            Node::ArrayLiteral(_)
            | Node::ObjectLiteral(_)
            | Node::VariableStatement { .. }
            | Node::ExpressionStatement(_)
            | Node::Return(_)
            | Node::Block(_)
            | Node::FunctionDeclaration { .. }
            | Node::SourceFile { .. } => TypeId::UNKNOWN,
        }
    }

    fn infer_binary(
        &self,
        arena: &NodeArena,
        left: NodeIndex,
        operator: BinaryOperator,
        right: NodeIndex,
        depth: u32,
    ) -> TypeId {
        match operator {
            BinaryOperator::Add => {
                let left = self.infer(arena, left, depth);
                let right = self.infer(arena, right, depth);
                if is_string_like(self.db, left) || is_string_like(self.db, right) {
                    TypeId::STRING
                } else if left == TypeId::UNKNOWN || right == TypeId::UNKNOWN {
                    TypeId::UNKNOWN
                } else {
                    TypeId::NUMBER
                }
            }
            BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo => TypeId::NUMBER,
            BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual
            | BinaryOperator::StrictEqual
            | BinaryOperator::StrictNotEqual => TypeId::BOOLEAN,
            BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr => {
                let left = self.infer(arena, left, depth);
                let right = self.infer(arena, right, depth);
                self.db.union(vec![left, right])
            }
        }
    }
}

impl ExpressionTypes for NodeTypeTable<'_> {
    fn expression_type(&self, arena: &NodeArena, node: NodeIndex) -> TypeId {
        self.infer(arena, node, 0)
    }

    fn declared_type(&self, name: &str) -> TypeId {
        self.by_name.get(name).copied().unwrap_or(TypeId::UNKNOWN)
    }
}

#[cfg(test)]
#[path = "../tests/node_types_tests.rs"]
mod node_types_tests;
