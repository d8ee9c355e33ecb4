#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity registry for Crossing.
//!
//! [`Objects`] is the global registry: every live entity in insertion order,
//! which is also the order collision checks scan. Controllers never own
//! entities directly; they hold a [`Scope`] that records the ids they created
//! and forwards creation and destruction to the global registry, so an entity
//! is either present in both or in neither.

mod entity;

use std::time::Duration;

use thiserror::Error;
use tracing::trace;

pub use entity::{
    Appearance, Drawable, Entity, EntityId, EntityKind, EntitySpec, Motion, TextStyle, Wrap,
};

/// Registry invariant violations. These indicate controller bugs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The entity is not tracked by the global registry.
    #[error("entity {0:?} is not present in the global registry")]
    UnknownEntity(EntityId),
    /// The entity was not created through this scope.
    #[error("entity {0:?} is not owned by this scope")]
    NotInScope(EntityId),
}

/// Global, ordered registry of live entities.
#[derive(Debug, Default)]
pub struct Objects {
    entities: Vec<Entity>,
    next_id: u64,
}

impl Objects {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` when no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterator over live entities in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Looks up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    /// Looks up an entity for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    /// Returns `true` when the entity is alive.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    /// Stable sort by draw-order index; equal indices keep registry order.
    pub fn sort_by_draw_order(&mut self) {
        self.entities.sort_by_key(Entity::z);
    }

    /// Earliest-created collidable entity whose rectangle overlaps
    /// `subject`'s with non-zero area.
    ///
    /// Ids grow with creation, so the smallest id is the first in insertion
    /// order even after [`Objects::sort_by_draw_order`]. The subject itself
    /// and non-collidable entities are skipped. Returns `None` when nothing
    /// overlaps or when the subject is not alive.
    #[must_use]
    pub fn collision(&self, subject: EntityId) -> Option<&Entity> {
        let subject_rect = self.get(subject)?.rect();
        self.entities
            .iter()
            .filter(|entity| {
                entity.id() != subject
                    && entity.is_collidable()
                    && entity.rect().intersects(&subject_rect)
            })
            .min_by_key(|entity| entity.id())
    }

    fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        let entity = spec.build(id);
        trace!(entity = id.get(), kind = ?entity.kind(), "entity created");
        self.entities.push(entity);
        id
    }

    fn tick_entity(&mut self, id: EntityId, dt: Duration) -> Result<(), RegistryError> {
        let entity = self.get_mut(id).ok_or(RegistryError::UnknownEntity(id))?;
        entity.tick(dt);
        Ok(())
    }

    fn destroy(&mut self, id: EntityId) -> Result<Entity, RegistryError> {
        let index = self.position(id).ok_or(RegistryError::UnknownEntity(id))?;
        self.entities[index].teardown();
        let entity = self.entities.remove(index);
        trace!(entity = id.get(), kind = ?entity.kind(), "entity destroyed");
        Ok(entity)
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id() == id)
    }
}

/// Controller-local view of the registry.
///
/// Every operation takes the global [`Objects`] as the parent scope so the
/// local list and the global list never disagree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scope {
    owned: Vec<EntityId>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities created through this scope, in creation order.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.owned
    }

    /// Number of entities owned by this scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owned.len()
    }

    /// Returns `true` when the scope owns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Returns `true` when the scope owns the entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.owned.contains(&id)
    }

    /// Builds an entity, registers it globally and locally, and returns its id.
    pub fn create(&mut self, objects: &mut Objects, spec: EntitySpec) -> EntityId {
        let id = objects.spawn(spec);
        self.owned.push(id);
        id
    }

    /// Runs the entity's teardown hook and removes it from both lists.
    pub fn destroy(&mut self, objects: &mut Objects, id: EntityId) -> Result<(), RegistryError> {
        let index = self
            .owned
            .iter()
            .position(|owned| *owned == id)
            .ok_or(RegistryError::NotInScope(id))?;
        let _ = objects.destroy(id)?;
        let _ = self.owned.remove(index);
        Ok(())
    }

    /// Destroys every owned entity, or only those of the `filter` kind.
    ///
    /// Iterates over a snapshot of the owned ids so removal never skips an
    /// entry. Returns the number of destroyed entities.
    pub fn purge(
        &mut self,
        objects: &mut Objects,
        filter: Option<EntityKind>,
    ) -> Result<usize, RegistryError> {
        let snapshot = self.owned.clone();
        let mut destroyed = 0;
        for id in snapshot {
            let matches = match filter {
                None => true,
                Some(kind) => objects
                    .get(id)
                    .map(|entity| entity.kind() == kind)
                    .ok_or(RegistryError::UnknownEntity(id))?,
            };
            if matches {
                self.destroy(objects, id)?;
                destroyed += 1;
            }
        }
        Ok(destroyed)
    }

    /// Ticks every owned entity in creation order.
    pub fn tick(&self, objects: &mut Objects, dt: Duration) -> Result<(), RegistryError> {
        for id in &self.owned {
            objects.tick_entity(*id, dt)?;
        }
        Ok(())
    }
}
