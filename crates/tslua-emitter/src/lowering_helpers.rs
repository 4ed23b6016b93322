use smallvec::SmallVec;

use tslua_ast::BinaryOperator;
use tslua_lua::{LuaBinaryOp, LuaNode, is_lua_keyword};

/// Make a TypeScript identifier safe as a Lua name: keywords get a `____`
/// prefix, characters Lua does not allow (`$`, non-ASCII) become `_XX` hex.
pub(crate) fn lua_identifier(name: &str) -> String {
    if is_lua_keyword(name) {
        return format!("____{name}");
    }
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 8);
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("_{:X}", c as u32));
        }
    }
    out
}

/// TypeScript numeric literal text as Lua numeric literal text. Separators
/// are dropped; binary and octal literals become decimal.
pub(crate) fn normalize_numeric_literal(text: &str) -> String {
    let text: String = text.chars().filter(|&c| c != '_').collect();
    let radix = match text.get(..2) {
        Some("0b" | "0B") => Some(2),
        Some("0o" | "0O") => Some(8),
        _ => None,
    };
    if let Some(radix) = radix
        && let Ok(value) = u64::from_str_radix(&text[2..], radix)
    {
        return value.to_string();
    }
    text
}

pub(crate) const fn lua_binary_operator(operator: BinaryOperator) -> LuaBinaryOp {
    match operator {
        BinaryOperator::Add => LuaBinaryOp::Add,
        BinaryOperator::Subtract => LuaBinaryOp::Sub,
        BinaryOperator::Multiply => LuaBinaryOp::Mul,
        BinaryOperator::Divide => LuaBinaryOp::Div,
        BinaryOperator::Modulo => LuaBinaryOp::Mod,
        BinaryOperator::Less => LuaBinaryOp::Lt,
        BinaryOperator::LessEqual => LuaBinaryOp::Le,
        BinaryOperator::Greater => LuaBinaryOp::Gt,
        BinaryOperator::GreaterEqual => LuaBinaryOp::Ge,
        BinaryOperator::StrictEqual => LuaBinaryOp::Eq,
        BinaryOperator::StrictNotEqual => LuaBinaryOp::Ne,
        BinaryOperator::LogicalAnd => LuaBinaryOp::And,
        BinaryOperator::LogicalOr => LuaBinaryOp::Or,
    }
}

pub(crate) fn tostring(value: LuaNode) -> LuaNode {
    LuaNode::call(LuaNode::id("tostring"), vec![value])
}

/// Join template parts with `..`, skipping empty literal text. Folds to the
/// right so the printer needs no parentheses.
pub(crate) fn concat_parts(parts: SmallVec<[LuaNode; 8]>) -> LuaNode {
    let mut parts: SmallVec<[LuaNode; 8]> = parts
        .into_iter()
        .filter(|part| !matches!(part, LuaNode::StringLiteral(s) if s.is_empty()))
        .collect();
    let Some(mut result) = parts.pop() else {
        return LuaNode::string("");
    };
    while let Some(part) = parts.pop() {
        result = LuaNode::concat(part, result);
    }
    result
}

pub(crate) const fn is_call(node: &LuaNode) -> bool {
    matches!(node, LuaNode::Call { .. } | LuaNode::MethodCall { .. })
}
