use crate::types::{TypeData, TypeId};

/// Read access to resolved types, plus the one constructor classification
/// needs (joining element types into a union).
pub trait TypeDatabase {
    fn lookup(&self, type_id: TypeId) -> Option<TypeData>;

    /// Build the normalized union of `members`.
    fn union(&self, members: Vec<TypeId>) -> TypeId;
}
