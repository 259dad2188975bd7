//! Normalized entity collections, the shape cached query data is kept in.

use blogdeck_common::model::{
    Id,
    post::{Post, PostMarker},
    user::{User, UserMarker},
};
use std::collections::HashMap;

pub trait Entity {
    type Marker;

    fn id(&self) -> Id<Self::Marker>;
}

impl Entity for Post {
    type Marker = PostMarker;

    fn id(&self) -> Id<PostMarker> {
        self.id
    }
}

impl Entity for User {
    type Marker = UserMarker;

    fn id(&self) -> Id<UserMarker> {
        self.id
    }
}

/// Entities keyed by id, plus the order the ids were received in.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EntityCollection<T: Entity> {
    ids: Vec<Id<T::Marker>>,
    entities: HashMap<Id<T::Marker>, T>,
}

impl<T: Entity> Default for EntityCollection<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            entities: HashMap::new(),
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    #[must_use]
    pub fn ids(&self) -> &[Id<T::Marker>] {
        &self.ids
    }

    #[must_use]
    pub fn get(&self, id: Id<T::Marker>) -> Option<&T> {
        self.entities.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    /// Inserts or replaces an entity. A new id is appended, a known id keeps its position.
    pub fn upsert(&mut self, entity: T) {
        let id = entity.id();
        if self.entities.insert(id, entity).is_none() {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: Id<T::Marker>) -> Option<T> {
        let removed = self.entities.remove(&id)?;
        self.ids.retain(|known| *known != id);
        Some(removed)
    }
}

impl<T: Entity> FromIterator<T> for EntityCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::default();
        for entity in iter {
            collection.upsert(entity);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use crate::collection::EntityCollection;
    use blogdeck_common::model::{
        Id,
        user::{User, UserMarker, UserName},
    };

    fn ids(raw: &[u64]) -> Vec<Id<UserMarker>> {
        raw.iter().copied().map(Id::new).collect()
    }

    fn user(id: u64, name: &str) -> User {
        User {
            id: Id::new(id),
            name: UserName::new(name.to_owned()).unwrap(),
        }
    }

    #[test]
    fn keeps_server_order() {
        let users: EntityCollection<User> =
            [user(3, "c"), user(1, "a"), user(2, "b")].into_iter().collect();

        assert_eq!(users.ids(), ids(&[3, 1, 2]));
        let names: Vec<&str> = users.iter().map(|user| user.name.get()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn upsert_and_remove() {
        let mut users: EntityCollection<User> =
            [user(1, "a"), user(2, "b")].into_iter().collect();

        users.upsert(user(1, "renamed"));
        assert_eq!(users.ids(), ids(&[1, 2]));
        assert_eq!(users.get(Id::new(1)).unwrap().name.get(), "renamed");

        users.upsert(user(7, "new"));
        assert_eq!(users.ids(), ids(&[1, 2, 7]));

        assert_eq!(users.remove(Id::new(2)), Some(user(2, "b")));
        assert_eq!(users.remove(Id::new(2)), None);
        assert_eq!(users.ids(), ids(&[1, 7]));
        assert_eq!(users.len(), 2);
    }
}
