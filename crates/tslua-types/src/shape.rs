//! Array shape classification.
//!
//! The emitter asks one question of a receiver's type: does indexing it hit
//! 1-based Lua table slots, named table fields, or neither? The answer is a
//! closed [`ShapeClassification`] so the dispatcher matches exhaustively.
//!
//! ```typescript
//! declare const a: number[];                        // ArrayLike(number)
//! declare const b: number[] | string[];             // ArrayLike(number | string)
//! declare const c: number[] & { foo: string };      // Mixed(number, { foo })
//! interface CustomArray<T> extends Array<T> {       // Mixed(T, { name })
//!     name: string;
//! }
//! declare const d: { foo: string };                 // RecordLike({ foo })
//! declare const e: any;                             // Unrelated
//! ```

use indexmap::IndexMap;
use tracing::trace;

use tslua_common::limits::MAX_SHAPE_DEPTH;

use crate::db::TypeDatabase;
use crate::types::{IntrinsicKind, PropertyInfo, TypeData, TypeId};

/// Named members reachable on a receiver, in declaration order.
pub type RecordMembers = IndexMap<String, PropertyInfo>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeClassification {
    /// Numeric slots only. The element type is `TypeId::UNKNOWN` when the
    /// checker gave us nothing usable (an empty union, an empty tuple).
    ArrayLike(TypeId),
    /// Named members only.
    RecordLike(RecordMembers),
    /// Numeric slots and named members on the same table.
    Mixed {
        element: TypeId,
        members: RecordMembers,
    },
    /// Not indexable as an array: primitives, functions, `any`, unresolved.
    Unrelated,
}

impl ShapeClassification {
    /// Whether element access on this shape takes the base-offset correction.
    pub fn is_array_like(&self) -> bool {
        matches!(
            self,
            ShapeClassification::ArrayLike(_) | ShapeClassification::Mixed { .. }
        )
    }

    pub fn element_type(&self) -> Option<TypeId> {
        match self {
            ShapeClassification::ArrayLike(element)
            | ShapeClassification::Mixed { element, .. } => Some(*element),
            _ => None,
        }
    }

    pub fn members(&self) -> Option<&RecordMembers> {
        match self {
            ShapeClassification::RecordLike(members)
            | ShapeClassification::Mixed { members, .. } => Some(members),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&PropertyInfo> {
        self.members().and_then(|members| members.get(name))
    }
}

/// Classify `type_id` for indexing purposes.
///
/// Pure: the only write is interning the joined element union.
pub fn classify_shape(db: &dyn TypeDatabase, type_id: TypeId) -> ShapeClassification {
    let shape = ShapeClassifier { db, depth: 0 }.classify(type_id);
    trace!(?type_id, ?shape, "classified receiver shape");
    shape
}

struct ShapeClassifier<'db> {
    db: &'db dyn TypeDatabase,
    depth: u32,
}

impl ShapeClassifier<'_> {
    fn classify(&mut self, type_id: TypeId) -> ShapeClassification {
        if self.depth >= MAX_SHAPE_DEPTH {
            trace!(?type_id, "shape classification depth exceeded");
            return ShapeClassification::Unrelated;
        }
        self.depth += 1;
        let shape = self.classify_inner(type_id);
        self.depth -= 1;
        shape
    }

    fn classify_inner(&mut self, type_id: TypeId) -> ShapeClassification {
        let Some(data) = self.db.lookup(type_id) else {
            return ShapeClassification::Unrelated;
        };
        match data {
            TypeData::Array(element) => ShapeClassification::ArrayLike(element),
            TypeData::Tuple(elements) => {
                let element = if elements.is_empty() {
                    TypeId::UNKNOWN
                } else {
                    self.db.union(elements)
                };
                ShapeClassification::ArrayLike(element)
            }
            TypeData::Object(properties) => {
                ShapeClassification::RecordLike(collect_members(properties))
            }
            TypeData::Union(members) => self.classify_union(&members),
            TypeData::Intersection(members) => self.classify_intersection(&members),
            TypeData::Interface {
                extends,
                properties,
                ..
            } => self.classify_interface(&extends, properties),
            TypeData::TypeParameter { constraint, .. } => match constraint {
                Some(constraint) => self.classify(constraint),
                None => ShapeClassification::Unrelated,
            },
            TypeData::Intrinsic(
                IntrinsicKind::Unknown
                | IntrinsicKind::Any
                | IntrinsicKind::Never
                | IntrinsicKind::Number
                | IntrinsicKind::String
                | IntrinsicKind::Boolean
                | IntrinsicKind::Nil,
            )
            | TypeData::StringLiteral(_)
            | TypeData::NumberLiteral(_)
            | TypeData::Function { .. } => ShapeClassification::Unrelated,
        }
    }

    /// Every member must be array-like for the union to index like an array.
    /// Named members survive only if every member carries them.
    fn classify_union(&mut self, members: &[TypeId]) -> ShapeClassification {
        let shapes: Vec<_> = members.iter().map(|&m| self.classify(m)).collect();

        if shapes.iter().all(ShapeClassification::is_array_like) {
            let elements: Vec<_> = shapes.iter().filter_map(|s| s.element_type()).collect();
            let element = self.join(elements);
            let common = common_members(&shapes);
            return array_or_mixed(element, common);
        }

        if shapes
            .iter()
            .all(|s| matches!(s, ShapeClassification::RecordLike(_)))
        {
            return ShapeClassification::RecordLike(common_members(&shapes));
        }

        ShapeClassification::Unrelated
    }

    /// Array-like members contribute element types (widened, never narrowed);
    /// every other member contributes its named members.
    fn classify_intersection(&mut self, members: &[TypeId]) -> ShapeClassification {
        let mut elements = Vec::new();
        let mut merged = RecordMembers::new();
        let mut saw_record = false;

        for &member in members {
            match self.classify(member) {
                ShapeClassification::ArrayLike(element) => elements.push(element),
                ShapeClassification::Mixed { element, members } => {
                    elements.push(element);
                    merged.extend(members);
                }
                ShapeClassification::RecordLike(members) => {
                    saw_record = true;
                    merged.extend(members);
                }
                ShapeClassification::Unrelated => {}
            }
        }

        if !elements.is_empty() {
            let element = self.join(elements);
            return array_or_mixed(element, merged);
        }
        if saw_record {
            return ShapeClassification::RecordLike(merged);
        }
        ShapeClassification::Unrelated
    }

    /// An interface extending an array type is a hybrid: its own members and
    /// the numeric slots live on the same table.
    fn classify_interface(
        &mut self,
        extends: &[TypeId],
        properties: Vec<PropertyInfo>,
    ) -> ShapeClassification {
        let mut elements = Vec::new();
        let mut merged = RecordMembers::new();

        for &base in extends {
            match self.classify(base) {
                ShapeClassification::ArrayLike(element) => elements.push(element),
                ShapeClassification::Mixed { element, members } => {
                    elements.push(element);
                    merged.extend(members);
                }
                ShapeClassification::RecordLike(members) => merged.extend(members),
                ShapeClassification::Unrelated => {}
            }
        }
        // Own declarations override inherited ones.
        merged.extend(collect_members(properties));

        if elements.is_empty() {
            return ShapeClassification::RecordLike(merged);
        }
        let element = self.join(elements);
        array_or_mixed(element, merged)
    }

    fn join(&self, elements: Vec<TypeId>) -> TypeId {
        match elements.len() {
            0 => TypeId::UNKNOWN,
            1 => elements[0],
            _ => self.db.union(elements),
        }
    }
}

fn array_or_mixed(element: TypeId, members: RecordMembers) -> ShapeClassification {
    if members.is_empty() {
        ShapeClassification::ArrayLike(element)
    } else {
        ShapeClassification::Mixed { element, members }
    }
}

fn collect_members(properties: Vec<PropertyInfo>) -> RecordMembers {
    properties
        .into_iter()
        .map(|prop| (prop.name.clone(), prop))
        .collect()
}

/// Members present on every shape, taken from the first shape.
fn common_members(shapes: &[ShapeClassification]) -> RecordMembers {
    let Some((first, rest)) = shapes.split_first() else {
        return RecordMembers::new();
    };
    let Some(first_members) = first.members() else {
        return RecordMembers::new();
    };
    first_members
        .iter()
        .filter(|(name, _)| rest.iter().all(|shape| shape.member(name).is_some()))
        .map(|(name, prop)| (name.clone(), prop.clone()))
        .collect()
}

#[cfg(test)]
#[path = "tests/shape_tests.rs"]
mod shape_tests;
