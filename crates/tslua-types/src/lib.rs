//! Resolved types and the array shape resolver.
//!
//! The front end's type checker owns inference. This crate only stores the
//! types it resolved (`TypeInterner`, behind the `TypeDatabase` seam) and
//! answers one question for the emitter: how does a receiver of this type
//! behave under indexing? See [`classify_shape`].
//!
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Unions and intersections are flattened and deduplicated at construction
mod db;
mod intern;
pub mod shape;
pub mod type_queries;
pub mod types;

pub use db::TypeDatabase;
pub use intern::TypeInterner;
pub use shape::{RecordMembers, ShapeClassification, classify_shape};
pub use type_queries::{is_number_like, is_string_like};
pub use types::{IntrinsicKind, PropertyInfo, TypeData, TypeId};
