// src/core/collection_store.rs
//! Ordered in-memory collection keyed by entity id

use std::fmt::Debug;
use std::hash::Hash;

/// A record with a stable identity for its whole lifetime.
pub trait Entity: Clone + Debug {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;
}

/// The closed set of transitions a collection accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction<E: Entity> {
    ReplaceAll(Vec<E>),
    Add(E),
    Update(E),
    Remove(E::Id),
}

/// Local copy of a remote collection.
///
/// Holds at most one entry per id. `add` is dedup-by-id: adding an entity
/// whose id is already present leaves the collection untouched. Entries keep
/// insertion order; `update` replaces in place.
#[derive(Debug, Clone)]
pub struct CollectionStore<E: Entity> {
    items: Vec<E>,
}

impl<E: Entity> CollectionStore<E> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn apply(&mut self, action: CollectionAction<E>) {
        match action {
            CollectionAction::ReplaceAll(entities) => self.replace_all(entities),
            CollectionAction::Add(entity) => self.add(entity),
            CollectionAction::Update(entity) => self.update(entity),
            CollectionAction::Remove(id) => self.remove(&id),
        }
    }

    /// Overwrite the whole collection. Later duplicates of an id are dropped.
    pub fn replace_all(&mut self, entities: Vec<E>) {
        self.items.clear();
        for entity in entities {
            self.add(entity);
        }
    }

    pub fn add(&mut self, entity: E) {
        if !self.contains(&entity.id()) {
            self.items.push(entity);
        }
    }

    pub fn update(&mut self, entity: E) {
        let id = entity.id();
        if let Some(slot) = self.items.iter_mut().find(|e| e.id() == id) {
            *slot = entity;
        }
    }

    pub fn remove(&mut self, id: &E::Id) {
        self.items.retain(|e| &e.id() != id);
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.items.iter().any(|e| &e.id() == id)
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.iter().find(|e| &e.id() == id)
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn snapshot(&self) -> Vec<E> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<E: Entity> Default for CollectionStore<E> {
    fn default() -> Self {
        Self::new()
    }
}
