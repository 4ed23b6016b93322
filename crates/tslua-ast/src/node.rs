//! Node kinds.

use tslua_types::TypeId;

/// Index of a node inside its `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    StrictEqual,
    StrictNotEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }
}

/// `=` and the arithmetic compound assignments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub const fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideAssign => Some(BinaryOperator::Divide),
            AssignmentOperator::ModuloAssign => Some(BinaryOperator::Modulo),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Not,
}

/// `++` / `--`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

/// Key of an object literal property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKey {
    Identifier(String),
    StringLiteral(String),
    /// `{ 0: value }`, kept as source text
    NumericLiteral(String),
    Computed(NodeIndex),
}

/// `name: value` inside an object literal.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyName {
    pub key: PropertyKey,
    pub value: NodeIndex,
}

/// `${expression}literal` part of a template expression.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateSpan {
    pub expression: NodeIndex,
    pub literal: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal, kept as source text: `42`, `0x1F`, `1.5`
    NumericLiteral(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    /// The `undefined` identifier
    Undefined,

    // =========================================================================
    // Expressions
    // =========================================================================
    Identifier(String),
    /// `[a, b, c]`
    ArrayLiteral(Vec<NodeIndex>),
    /// `{ key: value, ... }`
    ObjectLiteral(Vec<PropertyName>),
    /// `object.name`
    PropertyAccess { expression: NodeIndex, name: String },
    /// `object[argument]`
    ElementAccess {
        expression: NodeIndex,
        argument: NodeIndex,
    },
    Call {
        callee: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    Binary {
        left: NodeIndex,
        operator: BinaryOperator,
        right: NodeIndex,
    },
    Assignment {
        target: NodeIndex,
        operator: AssignmentOperator,
        value: NodeIndex,
    },
    PrefixUnary {
        operator: UnaryOperator,
        operand: NodeIndex,
    },
    /// `++x` / `--x` when `prefix`, `x++` / `x--` otherwise
    Update {
        operator: UpdateOperator,
        prefix: bool,
        operand: NodeIndex,
    },
    /// `delete expression`
    Delete(NodeIndex),
    /// `` `head${a}mid${b}tail` ``
    Template {
        head: String,
        spans: Vec<TemplateSpan>,
    },
    /// `expression as T`; `ty` is the asserted type as resolved by the checker
    As { expression: NodeIndex, ty: TypeId },
    Parenthesized(NodeIndex),

    // =========================================================================
    // Statements
    // =========================================================================
    /// `const name = initializer;`, `declare const name: T;` when `ambient`
    VariableStatement {
        name: String,
        initializer: Option<NodeIndex>,
        ambient: bool,
    },
    ExpressionStatement(NodeIndex),
    Return(Option<NodeIndex>),
    Block(Vec<NodeIndex>),
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Vec<NodeIndex>,
    },
    SourceFile {
        file_name: String,
        statements: Vec<NodeIndex>,
    },
}

impl Node {
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Node::VariableStatement { .. }
                | Node::ExpressionStatement(_)
                | Node::Return(_)
                | Node::Block(_)
                | Node::FunctionDeclaration { .. }
                | Node::SourceFile { .. }
        )
    }
}
