//! Source AST for the tslua emitter.
//!
//! Parsing belongs to the front end. This crate holds the arena the parser
//! fills in and the emitter reads: nodes are stored flat in a `NodeArena` and
//! refer to each other by `NodeIndex`.

pub mod node;
pub mod node_arena;

pub use node::{
    AssignmentOperator, BinaryOperator, Node, NodeIndex, PropertyKey, PropertyName,
    TemplateSpan, UnaryOperator, UpdateOperator,
};
pub use node_arena::{NodeArena, Span};
