//! Flat storage for source nodes.
//!
//! The parser pushes children before parents, so a `NodeIndex` always points
//! at an earlier slot than the node referring to it. The builder methods
//! below are what the front end (and the emitter's tests) use to assemble a
//! tree.

use tslua_types::TypeId;

use crate::node::{
    AssignmentOperator, BinaryOperator, Node, NodeIndex, PropertyKey, PropertyName,
    TemplateSpan, UnaryOperator, UpdateOperator,
};

/// Byte range of a node in its source file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    spans: Vec<Span>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        self.spans.push(Span::default());
        index
    }

    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0 as usize)
    }

    pub fn span(&self, index: NodeIndex) -> Span {
        self.spans
            .get(index.0 as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_span(&mut self, index: NodeIndex, span: Span) {
        if let Some(slot) = self.spans.get_mut(index.0 as usize) {
            *slot = span;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strip parentheses and `as` assertions.
    pub fn skip_outer_expressions(&self, mut index: NodeIndex) -> NodeIndex {
        loop {
            match self.get(index) {
                Some(Node::Parenthesized(inner)) => index = *inner,
                Some(Node::As { expression, .. }) => index = *expression,
                _ => return index,
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub fn number(&mut self, text: impl Into<String>) -> NodeIndex {
        self.add(Node::NumericLiteral(text.into()))
    }

    pub fn string(&mut self, value: impl Into<String>) -> NodeIndex {
        self.add(Node::StringLiteral(value.into()))
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        self.add(Node::BooleanLiteral(value))
    }

    pub fn null(&mut self) -> NodeIndex {
        self.add(Node::NullLiteral)
    }

    pub fn undefined(&mut self) -> NodeIndex {
        self.add(Node::Undefined)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn identifier(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(Node::Identifier(name.into()))
    }

    pub fn array_literal(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.add(Node::ArrayLiteral(elements))
    }

    /// Number literals `[3, 5, 1]` in one call.
    pub fn number_array(&mut self, values: &[&str]) -> NodeIndex {
        let elements = values.iter().map(|v| self.number(*v)).collect();
        self.array_literal(elements)
    }

    pub fn object_literal(&mut self, properties: Vec<PropertyName>) -> NodeIndex {
        self.add(Node::ObjectLiteral(properties))
    }

    pub fn property_access(&mut self, expression: NodeIndex, name: impl Into<String>) -> NodeIndex {
        self.add(Node::PropertyAccess {
            expression,
            name: name.into(),
        })
    }

    pub fn element_access(&mut self, expression: NodeIndex, argument: NodeIndex) -> NodeIndex {
        self.add(Node::ElementAccess {
            expression,
            argument,
        })
    }

    pub fn call(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(Node::Call { callee, arguments })
    }

    pub fn binary(
        &mut self,
        left: NodeIndex,
        operator: BinaryOperator,
        right: NodeIndex,
    ) -> NodeIndex {
        self.add(Node::Binary {
            left,
            operator,
            right,
        })
    }

    pub fn assign(&mut self, target: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.compound_assign(target, AssignmentOperator::Assign, value)
    }

    pub fn compound_assign(
        &mut self,
        target: NodeIndex,
        operator: AssignmentOperator,
        value: NodeIndex,
    ) -> NodeIndex {
        self.add(Node::Assignment {
            target,
            operator,
            value,
        })
    }

    pub fn prefix_unary(&mut self, operator: UnaryOperator, operand: NodeIndex) -> NodeIndex {
        self.add(Node::PrefixUnary { operator, operand })
    }

    pub fn update(&mut self, operator: UpdateOperator, prefix: bool, operand: NodeIndex) -> NodeIndex {
        self.add(Node::Update {
            operator,
            prefix,
            operand,
        })
    }

    pub fn delete(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(Node::Delete(expression))
    }

    pub fn template(&mut self, head: impl Into<String>, spans: Vec<TemplateSpan>) -> NodeIndex {
        self.add(Node::Template {
            head: head.into(),
            spans,
        })
    }

    pub fn as_expr(&mut self, expression: NodeIndex, ty: TypeId) -> NodeIndex {
        self.add(Node::As { expression, ty })
    }

    pub fn paren(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(Node::Parenthesized(expression))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn var_decl(&mut self, name: impl Into<String>, initializer: Option<NodeIndex>) -> NodeIndex {
        self.add(Node::VariableStatement {
            name: name.into(),
            initializer,
            ambient: false,
        })
    }

    /// `declare const name: T;`
    pub fn ambient_var(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(Node::VariableStatement {
            name: name.into(),
            initializer: None,
            ambient: true,
        })
    }

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(Node::ExpressionStatement(expression))
    }

    pub fn ret(&mut self, expression: Option<NodeIndex>) -> NodeIndex {
        self.add(Node::Return(expression))
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(Node::Block(statements))
    }

    pub fn function_decl(
        &mut self,
        name: impl Into<String>,
        parameters: Vec<String>,
        body: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.add(Node::FunctionDeclaration {
            name: name.into(),
            parameters,
            body,
        })
    }

    pub fn source_file(&mut self, file_name: impl Into<String>, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(Node::SourceFile {
            file_name: file_name.into(),
            statements,
        })
    }
}

impl PropertyName {
    pub fn named(name: impl Into<String>, value: NodeIndex) -> Self {
        Self {
            key: PropertyKey::Identifier(name.into()),
            value,
        }
    }

    pub fn numeric(text: impl Into<String>, value: NodeIndex) -> Self {
        Self {
            key: PropertyKey::NumericLiteral(text.into()),
            value,
        }
    }

    pub fn computed(key: NodeIndex, value: NodeIndex) -> Self {
        Self {
            key: PropertyKey::Computed(key),
            value,
        }
    }
}

impl TemplateSpan {
    pub fn new(expression: NodeIndex, literal: impl Into<String>) -> Self {
        Self {
            expression,
            literal: literal.into(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/node_arena_tests.rs"]
mod node_arena_tests;
