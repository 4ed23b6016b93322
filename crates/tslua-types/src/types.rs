//! Type representation consumed by the emitter.

/// Interned type handle. Equal structure means equal id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The checker could not resolve this expression.
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const ANY: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const NUMBER: TypeId = TypeId(3);
    pub const STRING: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);
    /// `null` and `undefined` share Lua's `nil`.
    pub const NIL: TypeId = TypeId(6);

    pub const fn is_intrinsic(self) -> bool {
        self.0 <= Self::NIL.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Unknown,
    Any,
    Never,
    Number,
    String,
    Boolean,
    Nil,
}

impl IntrinsicKind {
    pub(crate) const ALL: [IntrinsicKind; 7] = [
        IntrinsicKind::Unknown,
        IntrinsicKind::Any,
        IntrinsicKind::Never,
        IntrinsicKind::Number,
        IntrinsicKind::String,
        IntrinsicKind::Boolean,
        IntrinsicKind::Nil,
    ];
}

/// A named member of a record-like type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
    /// Declared with method syntax (`firstElement(): number`), so calls
    /// through it bind the receiver as `self`.
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            optional: false,
            is_method: false,
        }
    }

    pub fn method(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            is_method: true,
            ..Self::new(name, type_id)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Structural type data stored behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    StringLiteral(String),
    /// Numeric literal type, kept as source text.
    NumberLiteral(String),
    /// `T[]` / `Array<T>` / `ReadonlyArray<T>`
    Array(TypeId),
    /// `[A, B, C]`
    Tuple(Vec<TypeId>),
    /// `A | B`, members sorted and deduplicated
    Union(Vec<TypeId>),
    /// `A & B`, members sorted and deduplicated
    Intersection(Vec<TypeId>),
    /// `{ foo: string }`
    Object(Vec<PropertyInfo>),
    /// `interface Name extends Base1, Base2 { ... }` after instantiation
    Interface {
        name: String,
        extends: Vec<TypeId>,
        properties: Vec<PropertyInfo>,
    },
    /// Generic parameter; indexing follows its constraint.
    TypeParameter {
        name: String,
        constraint: Option<TypeId>,
    },
    Function {
        params: Vec<TypeId>,
        return_type: TypeId,
    },
}
