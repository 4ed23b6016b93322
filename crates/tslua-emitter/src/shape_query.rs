//! Receiver shape lookup for the dispatcher.

use tslua_types::{ShapeClassification, TypeDatabase, TypeId, classify_shape};

/// Classify a receiver type, logging the degraded paths: an unresolved type
/// (generic access, no offset) and an array-like shape without a usable
/// element type (offset only).
pub fn classify_receiver(db: &dyn TypeDatabase, receiver_type: TypeId) -> ShapeClassification {
    let shape = classify_shape(db, receiver_type);
    match &shape {
        ShapeClassification::Unrelated if is_unresolved(db, receiver_type) => {
            tracing::debug!(
                ?receiver_type,
                "[dispatch] unresolved receiver type, using generic member access"
            );
        }
        shape if shape.element_type() == Some(TypeId::UNKNOWN) => {
            tracing::debug!(
                ?receiver_type,
                "[dispatch] array-like receiver without element type, applying offset only"
            );
        }
        _ => {}
    }
    shape
}

fn is_unresolved(db: &dyn TypeDatabase, type_id: TypeId) -> bool {
    type_id == TypeId::UNKNOWN || type_id == TypeId::ANY || db.lookup(type_id).is_none()
}
