//! Lua IR produced by lowering.
//!
//! The IR is a tree of `LuaNode` variants, one per Lua construct the emitter
//! needs. Nodes are built once and handed to the printer; nothing rewrites
//! them afterwards.
//!
//! Tables are Lua's only aggregate: positional fields fill slots `1..n`,
//! keyed and named fields share the same table, and assigning `nil` to a
//! slot removes it.

/// Lua binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LuaBinaryOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl LuaBinaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            LuaBinaryOp::Or => "or",
            LuaBinaryOp::And => "and",
            LuaBinaryOp::Lt => "<",
            LuaBinaryOp::Gt => ">",
            LuaBinaryOp::Le => "<=",
            LuaBinaryOp::Ge => ">=",
            LuaBinaryOp::Ne => "~=",
            LuaBinaryOp::Eq => "==",
            LuaBinaryOp::Concat => "..",
            LuaBinaryOp::Add => "+",
            LuaBinaryOp::Sub => "-",
            LuaBinaryOp::Mul => "*",
            LuaBinaryOp::Div => "/",
            LuaBinaryOp::Mod => "%",
            LuaBinaryOp::Pow => "^",
        }
    }

    /// Binding strength, per the Lua 5.x reference manual (bitwise operators omitted).
    pub const fn precedence(self) -> u8 {
        match self {
            LuaBinaryOp::Or => 1,
            LuaBinaryOp::And => 2,
            LuaBinaryOp::Lt
            | LuaBinaryOp::Gt
            | LuaBinaryOp::Le
            | LuaBinaryOp::Ge
            | LuaBinaryOp::Ne
            | LuaBinaryOp::Eq => 3,
            LuaBinaryOp::Concat => 9,
            LuaBinaryOp::Add | LuaBinaryOp::Sub => 10,
            LuaBinaryOp::Mul | LuaBinaryOp::Div | LuaBinaryOp::Mod => 11,
            LuaBinaryOp::Pow => 14,
        }
    }

    pub const fn is_right_associative(self) -> bool {
        matches!(self, LuaBinaryOp::Concat | LuaBinaryOp::Pow)
    }
}

/// Lua unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LuaUnaryOp {
    Not,
    Neg,
    /// `#t`
    Len,
}

impl LuaUnaryOp {
    pub const PRECEDENCE: u8 = 12;

    pub const fn as_str(self) -> &'static str {
        match self {
            LuaUnaryOp::Not => "not ",
            LuaUnaryOp::Neg => "-",
            LuaUnaryOp::Len => "#",
        }
    }
}

/// Field of a table constructor.
#[derive(Clone, Debug, PartialEq)]
pub enum TableField {
    /// Next positional slot: `{ value }`
    Positional(LuaNode),
    /// `{ name = value }`
    Named(String, LuaNode),
    /// `{ [key] = value }`
    Keyed(LuaNode, LuaNode),
}

#[derive(Clone, Debug, PartialEq)]
pub enum LuaNode {
    // =========================================================================
    // Literals
    // =========================================================================
    /// `nil`, the absence sentinel
    Nil,
    BooleanLiteral(bool),
    /// Numeric literal text, already valid Lua: `42`, `0x1F`, `1.5`
    NumericLiteral(String),
    StringLiteral(String),

    // =========================================================================
    // Expressions
    // =========================================================================
    Identifier(String),
    /// `table[key]`
    Index { table: Box<Self>, key: Box<Self> },
    /// `table.name`
    Member { table: Box<Self>, name: String },
    /// `callee(args)`
    Call {
        callee: Box<Self>,
        arguments: Vec<Self>,
    },
    /// `receiver:method(args)`
    MethodCall {
        receiver: Box<Self>,
        method: String,
        arguments: Vec<Self>,
    },
    Binary {
        left: Box<Self>,
        operator: LuaBinaryOp,
        right: Box<Self>,
    },
    Unary {
        operator: LuaUnaryOp,
        operand: Box<Self>,
    },
    /// `{ ... }`
    Table(Vec<TableField>),
    /// `function(params) body end`
    Function {
        parameters: Vec<String>,
        body: Vec<Self>,
    },
    Parenthesized(Box<Self>),

    // =========================================================================
    // Statements
    // =========================================================================
    /// `local a, b = x, y`
    Local {
        names: Vec<String>,
        values: Vec<Self>,
    },
    /// `local function name(params) body end`
    LocalFunction {
        name: String,
        parameters: Vec<String>,
        body: Vec<Self>,
    },
    /// `a, b = x, y`
    Assignment {
        targets: Vec<Self>,
        values: Vec<Self>,
    },
    /// A call used as a statement.
    ExpressionStatement(Box<Self>),
    /// `return a, b`
    Return(Vec<Self>),
    /// `do body end`
    Do(Vec<Self>),
}

// =========================================================================
// Builder helpers for IR construction
// =========================================================================

impl LuaNode {
    pub fn id(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    pub fn number(text: impl Into<String>) -> Self {
        Self::NumericLiteral(text.into())
    }

    pub fn integer(value: i64) -> Self {
        Self::NumericLiteral(value.to_string())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral(value.into())
    }

    pub fn index(table: Self, key: Self) -> Self {
        Self::Index {
            table: Box::new(table),
            key: Box::new(key),
        }
    }

    pub fn member(table: Self, name: impl Into<String>) -> Self {
        Self::Member {
            table: Box::new(table),
            name: name.into(),
        }
    }

    pub fn call(callee: Self, arguments: Vec<Self>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn method_call(receiver: Self, method: impl Into<String>, arguments: Vec<Self>) -> Self {
        Self::MethodCall {
            receiver: Box::new(receiver),
            method: method.into(),
            arguments,
        }
    }

    pub fn binary(left: Self, operator: LuaBinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn add(left: Self, right: Self) -> Self {
        Self::binary(left, LuaBinaryOp::Add, right)
    }

    pub fn concat(left: Self, right: Self) -> Self {
        Self::binary(left, LuaBinaryOp::Concat, right)
    }

    pub fn unary(operator: LuaUnaryOp, operand: Self) -> Self {
        Self::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    /// `#operand`
    pub fn length_of(operand: Self) -> Self {
        Self::unary(LuaUnaryOp::Len, operand)
    }

    pub const fn table(fields: Vec<TableField>) -> Self {
        Self::Table(fields)
    }

    pub const fn function(parameters: Vec<String>, body: Vec<Self>) -> Self {
        Self::Function { parameters, body }
    }

    /// `(function() body end)()`
    pub fn iife(body: Vec<Self>) -> Self {
        Self::call(Self::function(Vec::new(), body), Vec::new())
    }

    pub fn paren(self) -> Self {
        Self::Parenthesized(Box::new(self))
    }

    pub fn local(name: impl Into<String>, value: Option<Self>) -> Self {
        Self::Local {
            names: vec![name.into()],
            values: value.into_iter().collect(),
        }
    }

    pub fn assign(target: Self, value: Self) -> Self {
        Self::Assignment {
            targets: vec![target],
            values: vec![value],
        }
    }

    pub fn expr_stmt(expression: Self) -> Self {
        Self::ExpressionStatement(Box::new(expression))
    }

    pub fn ret(value: Option<Self>) -> Self {
        Self::Return(value.into_iter().collect())
    }

    pub const fn do_block(body: Vec<Self>) -> Self {
        Self::Do(body)
    }

    pub fn local_function(
        name: impl Into<String>,
        parameters: Vec<String>,
        body: Vec<Self>,
    ) -> Self {
        Self::LocalFunction {
            name: name.into(),
            parameters,
            body,
        }
    }

    /// Integer value of a non-negative integer literal (`7`, `0x1F`).
    pub fn as_non_negative_integer(&self) -> Option<i64> {
        let Self::NumericLiteral(text) = self else {
            return None;
        };
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return i64::from_str_radix(hex, 16).ok();
        }
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            return text.parse().ok();
        }
        None
    }

    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Nil | Self::BooleanLiteral(_) | Self::NumericLiteral(_) | Self::StringLiteral(_)
        )
    }

    /// Whether evaluating this node twice is indistinguishable from once.
    pub fn is_side_effect_free(&self) -> bool {
        match self {
            Self::Nil
            | Self::BooleanLiteral(_)
            | Self::NumericLiteral(_)
            | Self::StringLiteral(_)
            | Self::Identifier(_) => true,
            Self::Member { table, .. } => table.is_side_effect_free(),
            Self::Index { table, key } => table.is_side_effect_free() && key.is_side_effect_free(),
            Self::Binary { left, right, .. } => {
                left.is_side_effect_free() && right.is_side_effect_free()
            }
            Self::Unary { operand, .. } => operand.is_side_effect_free(),
            Self::Parenthesized(inner) => inner.is_side_effect_free(),
            _ => false,
        }
    }
}

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

pub fn is_lua_keyword(name: &str) -> bool {
    LUA_KEYWORDS.contains(&name)
}

/// `[A-Za-z_][A-Za-z0-9_]*` and not a keyword.
pub fn is_valid_lua_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_lua_keyword(name)
}
