//! Lua printer.
//!
//! Walks `LuaNode` trees and writes Lua source. Parentheses are inserted from
//! operator precedence, and non-prefix expressions in call/index position are
//! wrapped, so lowering can build trees without thinking about either.

use tslua_common::NewLineKind;

use crate::ir::{LuaBinaryOp, LuaNode, LuaUnaryOp, TableField, is_valid_lua_identifier};

/// Precedence of anything that is not an operator expression.
const PRIMARY_PRECEDENCE: u8 = u8::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrinterOptions {
    pub new_line: NewLineKind,
    pub indent_width: usize,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            new_line: NewLineKind::Lf,
            indent_width: 4,
        }
    }
}

pub struct LuaPrinter {
    output: String,
    indent_level: usize,
    options: PrinterOptions,
}

impl LuaPrinter {
    pub fn new(options: PrinterOptions) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            options,
        }
    }

    /// Print a single node with default options.
    pub fn emit_to_string(node: &LuaNode) -> String {
        let mut printer = Self::new(PrinterOptions::default());
        printer.emit_node(node);
        printer.output
    }

    /// Print a chunk: one statement per line, trailing newline.
    pub fn print_chunk(&mut self, statements: &[LuaNode]) -> String {
        self.output.clear();
        self.indent_level = 0;
        for stmt in statements {
            self.emit_statement(stmt);
            self.write_line();
        }
        std::mem::take(&mut self.output)
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self) {
        self.output.push_str(self.options.new_line.as_str());
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level * self.options.indent_width {
            self.output.push(' ');
        }
    }

    fn emit_statement(&mut self, node: &LuaNode) {
        if let LuaNode::ExpressionStatement(expr) = node {
            // `f()\n(g)()` would parse as `f()(g)()`.
            if self.starts_with_paren(expr) {
                self.write(";");
            }
        }
        self.emit_node(node);
    }

    fn emit_block(&mut self, body: &[LuaNode]) {
        self.indent_level += 1;
        for stmt in body {
            self.write_line();
            self.write_indent();
            self.emit_statement(stmt);
        }
        self.indent_level -= 1;
        self.write_line();
        self.write_indent();
    }

    pub fn emit_node(&mut self, node: &LuaNode) {
        match node {
            LuaNode::Nil => self.write("nil"),
            LuaNode::BooleanLiteral(value) => self.write(if *value { "true" } else { "false" }),
            LuaNode::NumericLiteral(text) => self.write(text),
            LuaNode::StringLiteral(value) => self.emit_string(value),
            LuaNode::Identifier(name) => self.write(name),
            LuaNode::Index { table, key } => {
                self.emit_prefix(table);
                self.write("[");
                self.emit_node(key);
                self.write("]");
            }
            LuaNode::Member { table, name } => {
                self.emit_prefix(table);
                if is_valid_lua_identifier(name) {
                    self.write(".");
                    self.write(name);
                } else {
                    self.write("[");
                    self.emit_string(name);
                    self.write("]");
                }
            }
            LuaNode::Call { callee, arguments } => {
                self.emit_prefix(callee);
                self.emit_arguments(arguments);
            }
            LuaNode::MethodCall {
                receiver,
                method,
                arguments,
            } => {
                self.emit_prefix(receiver);
                self.write(":");
                self.write(method);
                self.emit_arguments(arguments);
            }
            LuaNode::Binary {
                left,
                operator,
                right,
            } => self.emit_binary(left, *operator, right),
            LuaNode::Unary { operator, operand } => {
                self.write(operator.as_str());
                let needs_parens = precedence(operand) < LuaUnaryOp::PRECEDENCE
                    // `- -x` must not print as the comment `--x`
                    || (*operator == LuaUnaryOp::Neg && self.starts_with_minus(operand));
                self.emit_with_parens(operand, needs_parens);
            }
            LuaNode::Table(fields) => self.emit_table(fields),
            LuaNode::Function { parameters, body } => {
                self.write("function(");
                self.write(&parameters.join(", "));
                self.write(")");
                self.emit_function_body(body);
            }
            LuaNode::Parenthesized(inner) => {
                self.write("(");
                self.emit_node(inner);
                self.write(")");
            }
            LuaNode::Local { names, values } => {
                self.write("local ");
                self.write(&names.join(", "));
                if !values.is_empty() {
                    self.write(" = ");
                    self.emit_comma_separated(values);
                }
            }
            LuaNode::LocalFunction {
                name,
                parameters,
                body,
            } => {
                self.write("local function ");
                self.write(name);
                self.write("(");
                self.write(&parameters.join(", "));
                self.write(")");
                self.emit_function_body(body);
            }
            LuaNode::Assignment { targets, values } => {
                self.emit_comma_separated(targets);
                self.write(" = ");
                self.emit_comma_separated(values);
            }
            LuaNode::ExpressionStatement(expr) => self.emit_node(expr),
            LuaNode::Return(values) => {
                self.write("return");
                if !values.is_empty() {
                    self.write(" ");
                    self.emit_comma_separated(values);
                }
            }
            LuaNode::Do(body) => {
                self.write("do");
                self.emit_block(body);
                self.write("end");
            }
        }
    }

    fn emit_function_body(&mut self, body: &[LuaNode]) {
        if body.is_empty() {
            self.write(" end");
            return;
        }
        self.emit_block(body);
        self.write("end");
    }

    fn emit_binary(&mut self, left: &LuaNode, operator: LuaBinaryOp, right: &LuaNode) {
        let prec = operator.precedence();
        let right_assoc = operator.is_right_associative();

        let left_prec = precedence(left);
        let left_parens = left_prec < prec || (left_prec == prec && right_assoc);
        self.emit_with_parens(left, left_parens);

        self.write(" ");
        self.write(operator.as_str());
        self.write(" ");

        let right_prec = precedence(right);
        let right_parens = right_prec < prec || (right_prec == prec && !right_assoc);
        self.emit_with_parens(right, right_parens);
    }

    fn emit_with_parens(&mut self, node: &LuaNode, parens: bool) {
        if parens {
            self.write("(");
            self.emit_node(node);
            self.write(")");
        } else {
            self.emit_node(node);
        }
    }

    /// Callee, indexed table, or method receiver: must be a Lua prefixexp.
    fn emit_prefix(&mut self, node: &LuaNode) {
        let is_prefix = matches!(
            node,
            LuaNode::Identifier(_)
                | LuaNode::Index { .. }
                | LuaNode::Member { .. }
                | LuaNode::Call { .. }
                | LuaNode::MethodCall { .. }
                | LuaNode::Parenthesized(_)
        );
        self.emit_with_parens(node, !is_prefix);
    }

    fn emit_arguments(&mut self, arguments: &[LuaNode]) {
        self.write("(");
        self.emit_comma_separated(arguments);
        self.write(")");
    }

    fn emit_comma_separated(&mut self, nodes: &[LuaNode]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_node(node);
        }
    }

    fn emit_table(&mut self, fields: &[TableField]) {
        if fields.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match field {
                TableField::Positional(value) => self.emit_node(value),
                TableField::Named(name, value) => {
                    if is_valid_lua_identifier(name) {
                        self.write(name);
                    } else {
                        self.write("[");
                        self.emit_string(name);
                        self.write("]");
                    }
                    self.write(" = ");
                    self.emit_node(value);
                }
                TableField::Keyed(key, value) => {
                    self.write("[");
                    self.emit_node(key);
                    self.write("] = ");
                    self.emit_node(value);
                }
            }
        }
        self.write("}");
    }

    fn emit_string(&mut self, value: &str) {
        self.output.push('"');
        for ch in value.chars() {
            match ch {
                '\\' => self.output.push_str("\\\\"),
                '"' => self.output.push_str("\\\""),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                '\0' => self.output.push_str("\\0"),
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn starts_with_paren(&self, node: &LuaNode) -> bool {
        match node {
            LuaNode::Parenthesized(_) => true,
            LuaNode::Call { callee: inner, .. }
            | LuaNode::MethodCall {
                receiver: inner, ..
            }
            | LuaNode::Index { table: inner, .. }
            | LuaNode::Member { table: inner, .. } => {
                !matches!(
                    inner.as_ref(),
                    LuaNode::Identifier(_)
                        | LuaNode::Index { .. }
                        | LuaNode::Member { .. }
                        | LuaNode::Call { .. }
                        | LuaNode::MethodCall { .. }
                ) || self.starts_with_paren(inner)
            }
            _ => false,
        }
    }

    fn starts_with_minus(&self, node: &LuaNode) -> bool {
        match node {
            LuaNode::Unary {
                operator: LuaUnaryOp::Neg,
                ..
            } => true,
            LuaNode::NumericLiteral(text) => text.starts_with('-'),
            _ => false,
        }
    }
}

fn precedence(node: &LuaNode) -> u8 {
    match node {
        LuaNode::Binary { operator, .. } => operator.precedence(),
        LuaNode::Unary { .. } => LuaUnaryOp::PRECEDENCE,
        _ => PRIMARY_PRECEDENCE,
    }
}

#[cfg(test)]
#[path = "../tests/printer_tests.rs"]
mod printer_tests;
