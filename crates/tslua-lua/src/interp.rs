//! Reference interpreter for Lua IR trees.
//!
//! Executes `LuaNode` chunks directly, without printing and re-parsing. It
//! covers the subset the emitter produces: locals and closures, tables with
//! integer and string keys, method calls with `self`, the arithmetic,
//! comparison, logical and concat operators, `#`, and the `tostring`/`type`
//! builtins. Numbers follow Lua 5.1 semantics (one float type, integral
//! values print without a fractional part).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ir::{LuaBinaryOp, LuaNode, LuaUnaryOp, TableField};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lua runtime error: {}", self.message)
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T> = Result<T, EvalError>;

pub type Builtin = fn(&[Value]) -> EvalResult<Value>;

#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Table(TableRef),
    Function(Rc<Closure>),
    Builtin(&'static str, Builtin),
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub const fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
            Value::Function(_) | Value::Builtin(..) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Lua's `tostring`.
    pub fn to_lua_string(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Table(t) => format!("table: {:p}", Rc::as_ptr(&t.0)),
            Value::Function(f) => format!("function: {:p}", Rc::as_ptr(f)),
            Value::Builtin(name, _) => format!("builtin: {name}"),
        }
    }

    fn raw_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => Rc::ptr_eq(&a.0, &b.0),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a, _), Value::Builtin(b, _)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.to_lua_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.raw_equals(other)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Key {
    Int(i64),
    Float(u64),
    Str(Rc<str>),
    Bool(bool),
    Ref(usize),
}

impl Key {
    fn from_value(value: &Value) -> EvalResult<Self> {
        Ok(match value {
            Value::Nil => return Err(EvalError::new("table index is nil")),
            Value::Number(n) if n.is_nan() => return Err(EvalError::new("table index is NaN")),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Key::Int(*n as i64),
            Value::Number(n) => Key::Float(n.to_bits()),
            Value::String(s) => Key::Str(s.clone()),
            Value::Boolean(b) => Key::Bool(*b),
            Value::Table(t) => Key::Ref(Rc::as_ptr(&t.0) as *const () as usize),
            Value::Function(f) => Key::Ref(Rc::as_ptr(f) as *const () as usize),
            Value::Builtin(name, _) => Key::Str(Rc::from(format!("builtin:{name}").as_str())),
        })
    }
}

#[derive(Default)]
pub struct Table {
    entries: FxHashMap<Key, Value>,
}

/// Shared, mutable table handle. Equality is identity.
#[derive(Clone)]
pub struct TableRef(Rc<RefCell<Table>>);

impl TableRef {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Table::default())))
    }

    pub fn get(&self, key: &Value) -> Value {
        match Key::from_value(key) {
            Ok(key) => self.0.borrow().entries.get(&key).cloned().unwrap_or(Value::Nil),
            Err(_) => Value::Nil,
        }
    }

    pub fn get_field(&self, name: &str) -> Value {
        self.get(&Value::string(name))
    }

    pub fn get_index(&self, index: i64) -> Value {
        self.get(&Value::Number(index as f64))
    }

    pub fn set(&self, key: &Value, value: Value) -> EvalResult<()> {
        let key = Key::from_value(key)?;
        let mut table = self.0.borrow_mut();
        if value.is_nil() {
            table.entries.remove(&key);
        } else {
            table.entries.insert(key, value);
        }
        Ok(())
    }

    /// The `#` border: the largest `n` such that slots `1..=n` are all non-nil.
    pub fn border(&self) -> i64 {
        let table = self.0.borrow();
        let mut n = 0;
        while table.entries.contains_key(&Key::Int(n + 1)) {
            n += 1;
        }
        n
    }

    /// Number of entries, integer-keyed and named alike.
    pub fn entry_count(&self) -> usize {
        self.0.borrow().entries.len()
    }
}

impl Default for TableRef {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Closure {
    parameters: Vec<String>,
    body: Rc<[LuaNode]>,
    env: Env,
}

struct Scope {
    vars: FxHashMap<String, Value>,
    parent: Option<Env>,
}

type Env = Rc<RefCell<Scope>>;

fn child_scope(parent: &Env) -> Env {
    Rc::new(RefCell::new(Scope {
        vars: FxHashMap::default(),
        parent: Some(parent.clone()),
    }))
}

fn lookup_var(env: &Env, name: &str) -> Option<Value> {
    let scope = env.borrow();
    if let Some(value) = scope.vars.get(name) {
        return Some(value.clone());
    }
    scope.parent.as_ref().and_then(|p| lookup_var(p, name))
}

/// Assign to the nearest scope declaring `name`. Returns false if none does.
fn assign_var(env: &Env, name: &str, value: Value) -> bool {
    let mut scope = env.borrow_mut();
    if let Some(slot) = scope.vars.get_mut(name) {
        *slot = value;
        return true;
    }
    match scope.parent.clone() {
        Some(parent) => {
            drop(scope);
            assign_var(&parent, name, value)
        }
        None => false,
    }
}

fn declare(env: &Env, name: &str, value: Value) {
    env.borrow_mut().vars.insert(name.to_string(), value);
}

enum Flow {
    Normal,
    Return(Value),
}

/// Maximum Lua call depth before the interpreter reports a stack overflow.
const MAX_CALL_DEPTH: u32 = 200;

pub struct Interpreter {
    globals: Env,
    call_depth: u32,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent: None,
        }));
        let interp = Self {
            globals,
            call_depth: 0,
        };
        interp.set_global("tostring", Value::Builtin("tostring", builtin_tostring));
        interp.set_global("type", Value::Builtin("type", builtin_type));
        interp
    }

    pub fn set_global(&self, name: &str, value: Value) {
        declare(&self.globals, name, value);
    }

    pub fn global(&self, name: &str) -> Value {
        lookup_var(&self.globals, name).unwrap_or(Value::Nil)
    }

    /// Run a chunk and return the value of its top-level `return`, or `nil`.
    pub fn exec_chunk(&mut self, chunk: &[LuaNode]) -> EvalResult<Value> {
        let env = child_scope(&self.globals);
        match self.exec_block(chunk, &env)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    fn exec_block(&mut self, body: &[LuaNode], env: &Env) -> EvalResult<Flow> {
        for stmt in body {
            if let Flow::Return(value) = self.exec_statement(stmt, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_statement(&mut self, stmt: &LuaNode, env: &Env) -> EvalResult<Flow> {
        match stmt {
            LuaNode::Local { names, values } => {
                let values = self.eval_list(values, env)?;
                for (i, name) in names.iter().enumerate() {
                    declare(env, name, values.get(i).cloned().unwrap_or(Value::Nil));
                }
            }
            LuaNode::LocalFunction {
                name,
                parameters,
                body,
            } => {
                // Declared before the closure is built so it can recurse.
                declare(env, name, Value::Nil);
                let closure = self.make_closure(parameters, body, env);
                declare(env, name, closure);
            }
            LuaNode::Assignment { targets, values } => {
                // Lua evaluates every right-hand side before assigning.
                let places = targets
                    .iter()
                    .map(|target| self.eval_place(target, env))
                    .collect::<EvalResult<Vec<_>>>()?;
                let values = self.eval_list(values, env)?;
                for (i, place) in places.into_iter().enumerate() {
                    let value = values.get(i).cloned().unwrap_or(Value::Nil);
                    self.store(place, value, env)?;
                }
            }
            LuaNode::ExpressionStatement(expr) => {
                self.eval(expr, env)?;
            }
            LuaNode::Return(values) => {
                let value = match values.first() {
                    Some(first) => self.eval(first, env)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }
            LuaNode::Do(body) => {
                let scope = child_scope(env);
                return self.exec_block(body, &scope);
            }
            other => {
                return Err(EvalError::new(format!(
                    "expression used as a statement: {other:?}"
                )));
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_list(&mut self, nodes: &[LuaNode], env: &Env) -> EvalResult<Vec<Value>> {
        nodes.iter().map(|node| self.eval(node, env)).collect()
    }

    fn make_closure(&self, parameters: &[String], body: &[LuaNode], env: &Env) -> Value {
        Value::Function(Rc::new(Closure {
            parameters: parameters.to_vec(),
            body: Rc::from(body),
            env: env.clone(),
        }))
    }

    fn eval(&mut self, node: &LuaNode, env: &Env) -> EvalResult<Value> {
        match node {
            LuaNode::Nil => Ok(Value::Nil),
            LuaNode::BooleanLiteral(b) => Ok(Value::Boolean(*b)),
            LuaNode::NumericLiteral(text) => parse_number(text)
                .map(Value::Number)
                .ok_or_else(|| EvalError::new(format!("malformed number '{text}'"))),
            LuaNode::StringLiteral(s) => Ok(Value::string(s)),
            LuaNode::Identifier(name) => Ok(lookup_var(env, name).unwrap_or(Value::Nil)),
            LuaNode::Index { table, key } => {
                let table = self.eval(table, env)?;
                let key = self.eval(key, env)?;
                index_value(&table, &key)
            }
            LuaNode::Member { table, name } => {
                let table = self.eval(table, env)?;
                index_value(&table, &Value::string(name))
            }
            LuaNode::Call { callee, arguments } => {
                let callee = self.eval(callee, env)?;
                let args = self.eval_list(arguments, env)?;
                self.call(&callee, &args)
            }
            LuaNode::MethodCall {
                receiver,
                method,
                arguments,
            } => {
                let receiver = self.eval(receiver, env)?;
                let function = index_value(&receiver, &Value::string(method))?;
                let mut args = vec![receiver];
                args.extend(self.eval_list(arguments, env)?);
                self.call(&function, &args)
            }
            LuaNode::Binary {
                left,
                operator,
                right,
            } => self.eval_binary(left, *operator, right, env),
            LuaNode::Unary { operator, operand } => {
                let value = self.eval(operand, env)?;
                match operator {
                    LuaUnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
                    LuaUnaryOp::Neg => value
                        .as_number()
                        .map(|n| Value::Number(-n))
                        .ok_or_else(|| arith_error(&value)),
                    LuaUnaryOp::Len => match &value {
                        Value::Table(t) => Ok(Value::Number(t.border() as f64)),
                        Value::String(s) => Ok(Value::Number(s.len() as f64)),
                        other => Err(EvalError::new(format!(
                            "attempt to get length of a {} value",
                            other.type_name()
                        ))),
                    },
                }
            }
            LuaNode::Table(fields) => {
                let table = TableRef::new();
                let mut next_slot = 1i64;
                for field in fields {
                    match field {
                        TableField::Positional(value) => {
                            let value = self.eval(value, env)?;
                            table.set(&Value::Number(next_slot as f64), value)?;
                            next_slot += 1;
                        }
                        TableField::Named(name, value) => {
                            let value = self.eval(value, env)?;
                            table.set(&Value::string(name), value)?;
                        }
                        TableField::Keyed(key, value) => {
                            let key = self.eval(key, env)?;
                            let value = self.eval(value, env)?;
                            table.set(&key, value)?;
                        }
                    }
                }
                Ok(Value::Table(table))
            }
            LuaNode::Function { parameters, body } => Ok(self.make_closure(parameters, body, env)),
            LuaNode::Parenthesized(inner) => self.eval(inner, env),
            other => Err(EvalError::new(format!(
                "statement used as an expression: {other:?}"
            ))),
        }
    }

    fn eval_binary(
        &mut self,
        left: &LuaNode,
        operator: LuaBinaryOp,
        right: &LuaNode,
        env: &Env,
    ) -> EvalResult<Value> {
        let lhs = self.eval(left, env)?;
        match operator {
            LuaBinaryOp::And => {
                return if lhs.is_truthy() {
                    self.eval(right, env)
                } else {
                    Ok(lhs)
                };
            }
            LuaBinaryOp::Or => {
                return if lhs.is_truthy() {
                    Ok(lhs)
                } else {
                    self.eval(right, env)
                };
            }
            _ => {}
        }
        let rhs = self.eval(right, env)?;
        match operator {
            LuaBinaryOp::Eq => Ok(Value::Boolean(lhs.raw_equals(&rhs))),
            LuaBinaryOp::Ne => Ok(Value::Boolean(!lhs.raw_equals(&rhs))),
            LuaBinaryOp::Lt | LuaBinaryOp::Le | LuaBinaryOp::Gt | LuaBinaryOp::Ge => {
                compare(&lhs, operator, &rhs)
            }
            LuaBinaryOp::Concat => {
                let part = |v: &Value| match v {
                    Value::String(s) => Ok(s.to_string()),
                    Value::Number(n) => Ok(format_number(*n)),
                    other => Err(EvalError::new(format!(
                        "attempt to concatenate a {} value",
                        other.type_name()
                    ))),
                };
                Ok(Value::string(&(part(&lhs)? + &part(&rhs)?)))
            }
            _ => {
                let a = lhs.as_number().ok_or_else(|| arith_error(&lhs))?;
                let b = rhs.as_number().ok_or_else(|| arith_error(&rhs))?;
                let result = match operator {
                    LuaBinaryOp::Add => a + b,
                    LuaBinaryOp::Sub => a - b,
                    LuaBinaryOp::Mul => a * b,
                    LuaBinaryOp::Div => a / b,
                    LuaBinaryOp::Mod => a - (a / b).floor() * b,
                    LuaBinaryOp::Pow => a.powf(b),
                    _ => unreachable!("non-arithmetic operators handled above"),
                };
                Ok(Value::Number(result))
            }
        }
    }

    pub fn call(&mut self, function: &Value, args: &[Value]) -> EvalResult<Value> {
        match function {
            Value::Builtin(_, builtin) => builtin(args),
            Value::Function(closure) => {
                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(EvalError::new("stack overflow"));
                }
                let scope = child_scope(&closure.env);
                for (i, param) in closure.parameters.iter().enumerate() {
                    declare(&scope, param, args.get(i).cloned().unwrap_or(Value::Nil));
                }
                let body = closure.body.clone();
                self.call_depth += 1;
                let flow = self.exec_block(&body, &scope);
                self.call_depth -= 1;
                match flow? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
            other => Err(EvalError::new(format!(
                "attempt to call a {} value",
                other.type_name()
            ))),
        }
    }

    fn eval_place(&mut self, target: &LuaNode, env: &Env) -> EvalResult<Place> {
        match target {
            LuaNode::Identifier(name) => Ok(Place::Variable(name.clone())),
            LuaNode::Index { table, key } => {
                let table = self.eval(table, env)?;
                let key = self.eval(key, env)?;
                Ok(Place::Slot(table, key))
            }
            LuaNode::Member { table, name } => {
                let table = self.eval(table, env)?;
                Ok(Place::Slot(table, Value::string(name)))
            }
            other => Err(EvalError::new(format!("cannot assign to {other:?}"))),
        }
    }

    fn store(&mut self, place: Place, value: Value, env: &Env) -> EvalResult<()> {
        match place {
            Place::Variable(name) => {
                if !assign_var(env, &name, value.clone()) {
                    declare(&self.globals, &name, value);
                }
                Ok(())
            }
            Place::Slot(Value::Table(table), key) => table.set(&key, value),
            Place::Slot(other, _) => Err(EvalError::new(format!(
                "attempt to index a {} value",
                other.type_name()
            ))),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

enum Place {
    Variable(String),
    Slot(Value, Value),
}

/// Run `chunk` in a fresh interpreter.
pub fn run_chunk(chunk: &[LuaNode]) -> EvalResult<Value> {
    Interpreter::new().exec_chunk(chunk)
}

fn index_value(target: &Value, key: &Value) -> EvalResult<Value> {
    match target {
        Value::Table(table) => Ok(table.get(key)),
        other => Err(EvalError::new(format!(
            "attempt to index a {} value",
            other.type_name()
        ))),
    }
}

fn compare(lhs: &Value, operator: LuaBinaryOp, rhs: &Value) -> EvalResult<Value> {
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(EvalError::new(format!(
                "attempt to compare {} with {}",
                lhs.type_name(),
                rhs.type_name()
            )));
        }
    };
    let Some(ordering) = ordering else {
        return Ok(Value::Boolean(false));
    };
    let result = match operator {
        LuaBinaryOp::Lt => ordering.is_lt(),
        LuaBinaryOp::Le => ordering.is_le(),
        LuaBinaryOp::Gt => ordering.is_gt(),
        LuaBinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!("compare called with a non-comparison operator"),
    };
    Ok(Value::Boolean(result))
}

fn arith_error(value: &Value) -> EvalError {
    EvalError::new(format!(
        "attempt to perform arithmetic on a {} value",
        value.type_name()
    ))
}

fn parse_number(text: &str) -> Option<f64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    text.parse().ok()
}

fn builtin_tostring(args: &[Value]) -> EvalResult<Value> {
    let value = args.first().cloned().unwrap_or(Value::Nil);
    Ok(Value::string(&value.to_lua_string()))
}

fn builtin_type(args: &[Value]) -> EvalResult<Value> {
    let value = args.first().cloned().unwrap_or(Value::Nil);
    Ok(Value::string(value.type_name()))
}

#[cfg(test)]
#[path = "../tests/interp_tests.rs"]
mod interp_tests;
