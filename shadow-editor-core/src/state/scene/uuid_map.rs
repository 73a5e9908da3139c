//! Glue between object uuids and `id_tree::NodeId`s. Tree ids are not stable across clones and
//! removals, uuids are.

use hashbrown::hash_map::Entry;

#[derive(Default, Debug)]
pub(super) struct UuidMap {
    uuid_to_id: hashbrown::HashMap<uuid::Uuid, id_tree::NodeId>,
    id_to_uuid: hashbrown::HashMap<id_tree::NodeId, uuid::Uuid>,
}
impl UuidMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uuid_to_id: hashbrown::HashMap::with_capacity(capacity),
            id_to_uuid: hashbrown::HashMap::with_capacity(capacity),
        }
    }
    pub fn len(&self) -> usize {
        self.uuid_to_id.len()
    }
    pub fn contains(&self, uuid: &uuid::Uuid) -> bool {
        self.uuid_to_id.contains_key(uuid)
    }
    pub fn tree_id<'s>(&'s self, uuid: &'_ uuid::Uuid) -> Option<&'s id_tree::NodeId> {
        self.uuid_to_id.get(uuid)
    }
    pub fn uuid_of(&self, tree: &id_tree::NodeId) -> Option<uuid::Uuid> {
        self.id_to_uuid.get(tree).copied()
    }
    /// Insert a correlation between tree id and uuid. Returns false, changing nothing,
    /// if the uuid is already taken.
    pub fn insert_pair(&mut self, tree: id_tree::NodeId, uuid: uuid::Uuid) -> bool {
        match self.uuid_to_id.entry(uuid) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(tree.clone());
                self.id_to_uuid.insert(tree, uuid);
                true
            }
        }
    }
    pub fn erase_uuid(&mut self, uuid: &uuid::Uuid) -> Option<id_tree::NodeId> {
        let tree = self.uuid_to_id.remove(uuid)?;
        let _ = self.id_to_uuid.remove(&tree);
        Some(tree)
    }
    /// Re-key a node. Returns false, changing nothing, if `old` is absent or `new` is taken.
    pub fn rename(&mut self, old: &uuid::Uuid, new: uuid::Uuid) -> bool {
        if self.uuid_to_id.contains_key(&new) {
            return false;
        }
        let Some(tree) = self.erase_uuid(old) else {
            return false;
        };
        self.insert_pair(tree, new)
    }
}
