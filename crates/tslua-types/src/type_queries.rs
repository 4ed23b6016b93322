//! Small structural queries the emitter needs besides shape classification.

use crate::db::TypeDatabase;
use crate::types::{IntrinsicKind, TypeData, TypeId};

/// `string`, a string literal, or a union made only of those.
pub fn is_string_like(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    match db.lookup(type_id) {
        Some(TypeData::Intrinsic(IntrinsicKind::String) | TypeData::StringLiteral(_)) => true,
        Some(TypeData::Union(members)) => {
            !members.is_empty() && members.iter().all(|&m| is_string_like(db, m))
        }
        Some(TypeData::TypeParameter {
            constraint: Some(constraint),
            ..
        }) => is_string_like(db, constraint),
        _ => false,
    }
}

/// `number`, a numeric literal, or a union made only of those.
pub fn is_number_like(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    match db.lookup(type_id) {
        Some(TypeData::Intrinsic(IntrinsicKind::Number) | TypeData::NumberLiteral(_)) => true,
        Some(TypeData::Union(members)) => {
            !members.is_empty() && members.iter().all(|&m| is_number_like(db, m))
        }
        Some(TypeData::TypeParameter {
            constraint: Some(constraint),
            ..
        }) => is_number_like(db, constraint),
        _ => false,
    }
}
