//! Type interning.
//!
//! Types are interned once and referred to by `TypeId` afterwards. The
//! interner takes `&self` everywhere so shape classification can join element
//! types while only holding a shared `&dyn TypeDatabase`.

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::db::TypeDatabase;
use crate::types::{IntrinsicKind, PropertyInfo, TypeData, TypeId};

pub struct TypeInterner {
    types: RefCell<Vec<TypeData>>,
    ids: RefCell<FxHashMap<TypeData, TypeId>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let interner = Self {
            types: RefCell::new(Vec::new()),
            ids: RefCell::new(FxHashMap::default()),
        };
        // Registration order must line up with the `TypeId` constants.
        for kind in IntrinsicKind::ALL {
            interner.intern(TypeData::Intrinsic(kind));
        }
        interner
    }

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(&id) = self.ids.borrow().get(&data) {
            return id;
        }
        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        types.push(data.clone());
        self.ids.borrow_mut().insert(data, id);
        id
    }

    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn literal_string(&self, value: impl Into<String>) -> TypeId {
        self.intern(TypeData::StringLiteral(value.into()))
    }

    pub fn literal_number(&self, text: impl Into<String>) -> TypeId {
        self.intern(TypeData::NumberLiteral(text.into()))
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Tuple(elements))
    }

    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.intern(TypeData::Object(properties))
    }

    pub fn interface(
        &self,
        name: impl Into<String>,
        extends: Vec<TypeId>,
        properties: Vec<PropertyInfo>,
    ) -> TypeId {
        self.intern(TypeData::Interface {
            name: name.into(),
            extends,
            properties,
        })
    }

    pub fn type_param(&self, name: impl Into<String>, constraint: Option<TypeId>) -> TypeId {
        self.intern(TypeData::TypeParameter {
            name: name.into(),
            constraint,
        })
    }

    pub fn function(&self, params: Vec<TypeId>, return_type: TypeId) -> TypeId {
        self.intern(TypeData::Function {
            params,
            return_type,
        })
    }

    /// Normalized union: nested unions are flattened, `never` dropped,
    /// `any`/`unknown` absorb everything, a single member is returned as-is
    /// and the empty union is `never`.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; 8]> = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(inner)) => flat.extend(inner),
                _ => flat.push(member),
            }
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|id| *id != TypeId::NEVER);
        flat.sort_unstable();
        flat.dedup();
        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => self.intern(TypeData::Union(flat.into_vec())),
        }
    }

    /// Union without normalization. The checker produces these for
    /// degenerate declarations (an empty union written through a type alias,
    /// for instance) and the shape resolver has to cope with them.
    pub fn union_raw(&self, members: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Union(members))
    }

    /// Normalized intersection: nested intersections are flattened and
    /// deduplicated, a single member is returned as-is.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; 8]> = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Intersection(inner)) => flat.extend(inner),
                _ => flat.push(member),
            }
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        flat.sort_unstable();
        flat.dedup();
        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => self.intern(TypeData::Intersection(flat.into_vec())),
        }
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, type_id: TypeId) -> Option<TypeData> {
        self.types.borrow().get(type_id.0 as usize).cloned()
    }

    fn union(&self, members: Vec<TypeId>) -> TypeId {
        TypeInterner::union(self, members)
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod intern_tests;
