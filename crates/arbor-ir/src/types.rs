//! Resolved types handed over by the type checker.
//!
//! The tree treats a `TypeRef` as an opaque token: it is fixed at node
//! construction and only ever compared by identity. `TypeData` exists so the
//! checker has somewhere to intern its results and the printer has something
//! to render.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::refs::TypeRef;
use crate::symbol::Symbol;

/// Data for a single interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub name: Symbol,
    pub args: SmallVec<[TypeRef; 2]>,
    pub nullable: bool,
}

/// Builder for `TypeData`. Defaults to no type arguments and non-nullable.
pub struct TypeDataBuilder {
    name: Symbol,
    args: SmallVec<[TypeRef; 2]>,
    nullable: bool,
}

impl TypeDataBuilder {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self {
            name: name.into(),
            args: SmallVec::new(),
            nullable: false,
        }
    }

    pub fn arg(mut self, ty: TypeRef) -> Self {
        self.args.push(ty);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn build(self) -> TypeData {
        TypeData {
            name: self.name,
            args: self.args,
            nullable: self.nullable,
        }
    }
}

/// Deduplicating type interner. Same `TypeData` always yields the same `TypeRef`.
pub struct TypeInterner {
    types: PrimaryMap<TypeRef, TypeData>,
    dedup: HashMap<TypeData, TypeRef>,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self {
            types: PrimaryMap::new(),
            dedup: HashMap::default(),
        }
    }

    /// Intern a type, returning an existing ref if the data matches.
    pub fn intern(&mut self, data: TypeData) -> TypeRef {
        if let Some(&existing) = self.dedup.get(&data) {
            return existing;
        }
        let r = self.types.push(data.clone());
        self.dedup.insert(data, r);
        r
    }

    /// Shorthand for interning a type with no arguments.
    pub fn named(&mut self, name: impl Into<Symbol>) -> TypeRef {
        self.intern(TypeDataBuilder::new(name).build())
    }

    /// Look up type data by reference.
    pub fn get(&self, r: TypeRef) -> &TypeData {
        &self.types[r]
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}
