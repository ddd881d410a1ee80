//! Arena-backed container snapshots.
//!
//! A [`Container`] owns its declarations in an arena that is never reordered; the sibling list
//! holds [`DeclId`]s plus per-position decoration. Rewrites clone the sibling list and share the
//! arena, so finding a moved declaration in the new snapshot is an index lookup.

use crate::decor::Decoration;
use crate::model::{Declaration, Location, normalize_attribute};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Arena index of a declaration, stable across rewrites of the same container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DeclId(pub u32);

impl std::fmt::Display for DeclId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    #[default]
    Class,
    Struct,
    Record,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseKind {
    Class,
    Interface,
}

/// Entry of a container's base list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseType {
    pub name: String,
    pub kind: BaseKind,
}

impl BaseType {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BaseKind::Class,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: BaseKind::Interface,
        }
    }

    /// Name without namespace or generic arguments (`System.IComparable<T>` -> `IComparable`).
    pub fn simple_name(&self) -> &str {
        let without_generics = self.name.split('<').next().unwrap_or(&self.name);
        without_generics
            .rsplit('.')
            .next()
            .unwrap_or(without_generics)
            .trim()
    }
}

/// A declaration at its current position, with the decoration it carries there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sibling {
    pub id: DeclId,
    pub decor: Decoration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub kind: ContainerKind,
    pub location: Location,
    pub attributes: Vec<String>,
    pub base_list: Vec<BaseType>,
    arena: Vec<Arc<Declaration>>,
    siblings: Vec<Sibling>,
}

impl Container {
    pub fn new(name: impl Into<String>, kind: ContainerKind, location: Location) -> Self {
        Self {
            name: name.into(),
            kind,
            location,
            attributes: Vec::new(),
            base_list: Vec::new(),
            arena: Vec::new(),
            siblings: Vec::new(),
        }
    }

    /// Append a declaration at the end of the sibling list.
    pub fn push(&mut self, decl: Declaration, decor: Decoration) -> DeclId {
        let id = DeclId(self.arena.len() as u32);
        self.arena.push(Arc::new(decl));
        self.siblings.push(Sibling { id, decor });
        id
    }

    pub fn decl(&self, id: DeclId) -> Option<&Declaration> {
        self.arena.get(id.0 as usize).map(Arc::as_ref)
    }

    pub fn siblings(&self) -> &[Sibling] {
        &self.siblings
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    pub fn position(&self, id: DeclId) -> Option<usize> {
        self.siblings.iter().position(|s| s.id == id)
    }

    /// Declaration at sibling position `pos`.
    pub fn decl_at(&self, pos: usize) -> Option<&Declaration> {
        self.siblings.get(pos).and_then(|s| self.decl(s.id))
    }

    /// Declarations in current sibling order.
    pub fn members(&self) -> impl Iterator<Item = (usize, DeclId, &Declaration)> {
        self.siblings
            .iter()
            .enumerate()
            .filter_map(|(pos, s)| self.decl(s.id).map(|d| (pos, s.id, d)))
    }

    pub fn decoration(&self, id: DeclId) -> Option<&Decoration> {
        self.siblings.iter().find(|s| s.id == id).map(|s| &s.decor)
    }

    /// New snapshot with a different sibling order, sharing the declaration arena.
    ///
    /// Every id must already belong to this container's arena.
    pub fn with_siblings(&self, siblings: Vec<Sibling>) -> Container {
        debug_assert!(
            siblings
                .iter()
                .all(|s| (s.id.0 as usize) < self.arena.len())
        );
        Container {
            siblings,
            ..self.clone_header()
        }
    }

    pub fn with_base_list(&self, base_list: Vec<BaseType>) -> Container {
        Container {
            base_list,
            siblings: self.siblings.clone(),
            ..self.clone_header()
        }
    }

    fn clone_header(&self) -> Container {
        Container {
            name: self.name.clone(),
            kind: self.kind,
            location: self.location.clone(),
            attributes: self.attributes.clone(),
            base_list: self.base_list.clone(),
            arena: self.arena.clone(),
            siblings: Vec::new(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| normalize_attribute(a) == name)
    }

    /// Signatures in current sibling order.
    pub fn signatures(&self) -> Vec<String> {
        self.members().map(|(_, _, d)| d.signature()).collect()
    }
}
