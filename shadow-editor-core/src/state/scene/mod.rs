//! # Scene
//!
//! The objects of the document form an ordered tree, rooted at an object of kind
//! [`ObjectKind::Scene`](super::object::ObjectKind). Objects are addressed by uuid, which is
//! unique within the tree.

mod uuid_map;

use super::object::{Object3D, ObjectKind, ObjectSnapshot};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("object {0} not found")]
    NotFound(uuid::Uuid),
    #[error("parent {0} not found")]
    ParentNotFound(uuid::Uuid),
    #[error("uuid {0} is already in use")]
    DuplicateUuid(uuid::Uuid),
    #[error("the scene root can't be detached or moved")]
    IsRoot,
    #[error("can't move an object into its own subtree")]
    WouldCycle,
}

pub struct Scene {
    tree: id_tree::Tree<Object3D>,
    ids: uuid_map::UuidMap,
}
impl Default for Scene {
    fn default() -> Self {
        Self::new(Object3D::new(ObjectKind::Scene).with_name("Scene"))
    }
}
impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.to_snapshot())
            .finish_non_exhaustive()
    }
}
impl Scene {
    /// An empty scene with the given root object.
    #[must_use]
    pub fn new(root: Object3D) -> Self {
        let uuid = root.uuid();
        let tree = id_tree::TreeBuilder::new()
            .with_root(id_tree::Node::new(root))
            .build();
        let mut ids = uuid_map::UuidMap::default();
        if let Some(root_id) = tree.root_node_id() {
            ids.insert_pair(root_id.clone(), uuid);
        }
        Self { tree, ids }
    }
    /// Rebuild a scene from a whole-tree snapshot, such as one from [`Scene::to_snapshot`].
    pub fn from_snapshot(snapshot: ObjectSnapshot) -> Result<Self, SceneError> {
        check_unique(&snapshot, |_| false)?;
        let ObjectSnapshot { object, children } = snapshot;
        let mut scene = Self::new(object);
        let root_id = scene.root_id().clone();
        for child in children {
            scene
                .insert_subtree(child, &root_id)
                .map_err(|_| SceneError::ParentNotFound(scene.root_uuid()))?;
        }
        Ok(scene)
    }
    /// The whole tree, root included.
    #[must_use]
    pub fn to_snapshot(&self) -> ObjectSnapshot {
        // Root is always present.
        self.snapshot_of(self.root_id())
            .unwrap_or_else(|| ObjectSnapshot::new(self.root().clone()))
    }
    fn root_id(&self) -> &id_tree::NodeId {
        // unwrap ok - a scene is always built with a root, and the root can never be detached.
        self.tree.root_node_id().unwrap()
    }
    #[must_use]
    pub fn root(&self) -> &Object3D {
        // unwrap ok - root id is always valid.
        self.tree.get(self.root_id()).unwrap().data()
    }
    #[must_use]
    pub fn root_uuid(&self) -> uuid::Uuid {
        self.root().uuid()
    }
    /// Number of objects, including the root.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.ids.len()
    }
    #[must_use]
    pub fn contains(&self, uuid: uuid::Uuid) -> bool {
        self.ids.contains(&uuid)
    }
    #[must_use]
    pub fn get(&self, uuid: uuid::Uuid) -> Option<&Object3D> {
        let tree_id = self.ids.tree_id(&uuid)?;
        self.tree.get(tree_id).ok().map(id_tree::Node::data)
    }
    /// Mutable access to an object. The object's uuid can only be changed through
    /// [`Scene::set_uuid`].
    pub fn get_mut(&mut self, uuid: uuid::Uuid) -> Option<&mut Object3D> {
        let tree_id = self.ids.tree_id(&uuid)?;
        self.tree.get_mut(tree_id).ok().map(id_tree::Node::data_mut)
    }
    /// Parent uuid and index within the parent. `None` for the root and for unknown objects.
    #[must_use]
    pub fn location_of(&self, uuid: uuid::Uuid) -> Option<(uuid::Uuid, usize)> {
        let tree_id = self.ids.tree_id(&uuid)?;
        let parent = self.tree.get(tree_id).ok()?.parent()?;
        let index = self
            .tree
            .children_ids(parent)
            .ok()?
            .position(|child| child == tree_id)?;
        Some((self.ids.uuid_of(parent)?, index))
    }
    #[must_use]
    pub fn parent_of(&self, uuid: uuid::Uuid) -> Option<uuid::Uuid> {
        self.location_of(uuid).map(|(parent, _)| parent)
    }
    /// Iterate the direct children of an object, in order.
    #[must_use]
    pub fn children_of(&self, uuid: uuid::Uuid) -> Option<impl Iterator<Item = &Object3D> + '_> {
        let tree_id = self.ids.tree_id(&uuid)?;
        Some(
            self.tree
                .children_ids(tree_id)
                .ok()?
                .filter_map(|child| self.tree.get(child).ok().map(id_tree::Node::data)),
        )
    }
    /// Iterate every object, root first, in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Object3D> + '_ {
        self.tree
            .traverse_pre_order_ids(self.root_id())
            .into_iter()
            .flatten()
            .filter_map(|tree_id| self.tree.get(&tree_id).ok().map(id_tree::Node::data))
    }
    /// Copy out the subtree rooted at `uuid`.
    #[must_use]
    pub fn snapshot(&self, uuid: uuid::Uuid) -> Option<ObjectSnapshot> {
        self.snapshot_of(self.ids.tree_id(&uuid)?)
    }
    fn snapshot_of(&self, tree_id: &id_tree::NodeId) -> Option<ObjectSnapshot> {
        let node = self.tree.get(tree_id).ok()?;
        Some(ObjectSnapshot {
            object: node.data().clone(),
            children: node
                .children()
                .iter()
                .filter_map(|child| self.snapshot_of(child))
                .collect(),
        })
    }
    /// Insert a subtree as the `index`th child of `parent`, or as the last child if `None`.
    ///
    /// An index too large is clamped to the last position.
    pub fn attach(
        &mut self,
        snapshot: ObjectSnapshot,
        parent: uuid::Uuid,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        let parent_id = self
            .ids
            .tree_id(&parent)
            .ok_or(SceneError::ParentNotFound(parent))?
            .clone();
        check_unique(&snapshot, |uuid| self.ids.contains(&uuid))?;

        let new_id = self
            .insert_subtree(snapshot, &parent_id)
            .map_err(|_| SceneError::ParentNotFound(parent))?;
        if let Some(index) = index {
            self.place_nth(&new_id, index);
        }
        Ok(())
    }
    /// Remove an object and its descendants, returning them.
    pub fn detach(&mut self, uuid: uuid::Uuid) -> Result<ObjectSnapshot, SceneError> {
        let tree_id = self
            .ids
            .tree_id(&uuid)
            .ok_or(SceneError::NotFound(uuid))?
            .clone();
        if &tree_id == self.root_id() {
            return Err(SceneError::IsRoot);
        }
        let snapshot = self.snapshot_of(&tree_id).ok_or(SceneError::NotFound(uuid))?;
        self.tree
            .remove_node(tree_id, id_tree::RemoveBehavior::DropChildren)
            .map_err(|_| SceneError::NotFound(uuid))?;
        for removed in snapshot.uuids() {
            self.ids.erase_uuid(&removed);
        }
        Ok(snapshot)
    }
    /// Reparent an object to be the `index`th child of `parent`, bringing its children along.
    ///
    /// An index too large is clamped to the last position.
    pub fn move_to(
        &mut self,
        uuid: uuid::Uuid,
        parent: uuid::Uuid,
        index: usize,
    ) -> Result<(), SceneError> {
        let target_id = self
            .ids
            .tree_id(&uuid)
            .ok_or(SceneError::NotFound(uuid))?
            .clone();
        if &target_id == self.root_id() {
            return Err(SceneError::IsRoot);
        }
        let parent_id = self
            .ids
            .tree_id(&parent)
            .ok_or(SceneError::ParentNotFound(parent))?
            .clone();
        // Are we trying to move into the target itself or one of its descendants?
        if std::iter::once(&parent_id)
            .chain(
                self.tree
                    .ancestor_ids(&parent_id)
                    .map_err(|_| SceneError::ParentNotFound(parent))?,
            )
            .any(|ancestor| ancestor == &target_id)
        {
            return Err(SceneError::WouldCycle);
        }
        self.tree
            .move_node(&target_id, id_tree::MoveBehavior::ToParent(&parent_id))
            .map_err(|_| SceneError::NotFound(uuid))?;
        self.place_nth(&target_id, index);
        Ok(())
    }
    /// Change an object's identity.
    pub fn set_uuid(&mut self, old: uuid::Uuid, new: uuid::Uuid) -> Result<(), SceneError> {
        if !self.ids.contains(&old) {
            return Err(SceneError::NotFound(old));
        }
        if old == new {
            return Ok(());
        }
        if !self.ids.rename(&old, new) {
            return Err(SceneError::DuplicateUuid(new));
        }
        if let Some(object) = self.get_mut(new) {
            object.set_uuid(new);
        }
        Ok(())
    }
    fn insert_subtree(
        &mut self,
        snapshot: ObjectSnapshot,
        parent: &id_tree::NodeId,
    ) -> Result<id_tree::NodeId, id_tree::NodeIdError> {
        let ObjectSnapshot { object, children } = snapshot;
        let uuid = object.uuid();
        let tree_id = self.tree.insert(
            id_tree::Node::new(object),
            id_tree::InsertBehavior::UnderNode(parent),
        )?;
        self.ids.insert_pair(tree_id.clone(), uuid);
        for child in children {
            self.insert_subtree(child, &tree_id)?;
        }
        Ok(tree_id)
    }
    /// Move an already-parented node to the given index among its siblings, clamped.
    fn place_nth(&mut self, tree_id: &id_tree::NodeId, index: usize) {
        let siblings = self
            .tree
            .get(tree_id)
            .ok()
            .and_then(id_tree::Node::parent)
            .and_then(|parent| self.tree.get(parent).ok())
            .map_or(0, |parent| parent.children().len());
        if siblings == 0 {
            return;
        }
        // Ok - node is a child of the parent, so it's present.
        let _ = self
            .tree
            .make_nth_sibling(tree_id, index.min(siblings - 1));
    }
}

/// Fails with the first uuid that either repeats within the snapshot or is `taken`.
fn check_unique(
    snapshot: &ObjectSnapshot,
    taken: impl Fn(uuid::Uuid) -> bool,
) -> Result<(), SceneError> {
    let mut seen = hashbrown::HashSet::new();
    for uuid in snapshot.uuids() {
        if taken(uuid) || !seen.insert(uuid) {
            return Err(SceneError::DuplicateUuid(uuid));
        }
    }
    Ok(())
}

/// Very expensive clone impl!
impl Clone for Scene {
    fn clone(&self) -> Self {
        let tree = self.tree.clone();
        let mut ids = uuid_map::UuidMap::with_capacity(self.ids.len());

        // id_tree's NodeIds get scrambled when cloning. Each object knows its own uuid, re-pair them.
        if let Some(root) = tree.root_node_id() {
            for tree_id in tree.traverse_pre_order_ids(root).into_iter().flatten() {
                if let Ok(node) = tree.get(&tree_id) {
                    ids.insert_pair(tree_id, node.data().uuid());
                }
            }
        }
        Self { tree, ids }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    fn group(name: &str) -> Object3D {
        Object3D::new(ObjectKind::Group).with_name(name)
    }
    fn names(scene: &Scene, of: uuid::Uuid) -> Vec<String> {
        scene
            .children_of(of)
            .unwrap()
            .map(|o| o.name.clone())
            .collect()
    }
    #[test]
    fn attach_at_index_clamps() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        scene.attach(group("a").into(), root, None).unwrap();
        scene.attach(group("b").into(), root, Some(0)).unwrap();
        scene.attach(group("c").into(), root, Some(99)).unwrap();
        assert_eq!(names(&scene, root), ["b", "a", "c"]);
        assert_eq!(scene.object_count(), 4);
    }
    #[test]
    fn detach_returns_subtree() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let parent = group("parent");
        let child = group("child");
        let (parent_id, child_id) = (parent.uuid(), child.uuid());
        scene
            .attach(ObjectSnapshot::new(parent).with_child(child), root, None)
            .unwrap();
        assert_eq!(scene.location_of(child_id), Some((parent_id, 0)));

        let snapshot = scene.detach(parent_id).unwrap();
        assert_eq!(snapshot.uuids(), [parent_id, child_id]);
        assert!(!scene.contains(child_id));
        assert_eq!(scene.object_count(), 1);

        // Reinsert in the same place.
        scene.attach(snapshot, root, Some(0)).unwrap();
        assert_eq!(scene.location_of(child_id), Some((parent_id, 0)));
    }
    #[test]
    fn duplicate_uuids_rejected() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let a = group("a");
        let copy = a.clone();
        scene.attach(a.into(), root, None).unwrap();
        assert_eq!(
            scene.attach(copy.clone().into(), root, None),
            Err(SceneError::DuplicateUuid(copy.uuid()))
        );
        assert_eq!(scene.object_count(), 2);
    }
    #[test]
    fn root_is_fixed() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        assert_eq!(scene.detach(root), Err(SceneError::IsRoot));
        assert_eq!(scene.move_to(root, root, 0), Err(SceneError::IsRoot));
        assert_eq!(scene.location_of(root), None);
    }
    #[test]
    fn move_rejects_cycles() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let outer = group("outer");
        let inner = group("inner");
        let (outer_id, inner_id) = (outer.uuid(), inner.uuid());
        scene
            .attach(ObjectSnapshot::new(outer).with_child(inner), root, None)
            .unwrap();
        assert_eq!(scene.move_to(outer_id, inner_id, 0), Err(SceneError::WouldCycle));
        assert_eq!(scene.move_to(outer_id, outer_id, 0), Err(SceneError::WouldCycle));

        scene.attach(group("other").into(), root, None).unwrap();
        scene.move_to(inner_id, root, 0).unwrap();
        assert_eq!(names(&scene, root), ["inner", "outer", "other"]);
        // Within the same parent.
        scene.move_to(inner_id, root, 2).unwrap();
        assert_eq!(names(&scene, root), ["outer", "other", "inner"]);
    }
    #[test]
    fn set_uuid_reindexes() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let a = group("a");
        let b = group("b");
        let (a_id, b_id) = (a.uuid(), b.uuid());
        scene.attach(a.into(), root, None).unwrap();
        scene.attach(b.into(), root, None).unwrap();

        let fresh = uuid::Uuid::new_v4();
        scene.set_uuid(a_id, fresh).unwrap();
        assert!(!scene.contains(a_id));
        assert_eq!(scene.get(fresh).map(|o| o.name.as_str()), Some("a"));
        assert_eq!(scene.get(fresh).map(Object3D::uuid), Some(fresh));
        assert_eq!(scene.set_uuid(fresh, b_id), Err(SceneError::DuplicateUuid(b_id)));
        assert_eq!(scene.set_uuid(a_id, fresh), Err(SceneError::NotFound(a_id)));
    }
    #[test]
    fn clone_preserves_uuids() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let a = group("a");
        let a_id = a.uuid();
        scene.attach(a.into(), root, None).unwrap();

        let mut copy = scene.clone();
        assert_eq!(copy.location_of(a_id), Some((root, 0)));
        copy.get_mut(a_id).unwrap().name = "changed".to_owned();
        assert_eq!(scene.get(a_id).unwrap().name, "a");
        assert_eq!(copy.to_snapshot().uuids(), scene.to_snapshot().uuids());
    }
    #[test]
    fn snapshot_round_trip() {
        let mut scene = Scene::default();
        let root = scene.root_uuid();
        let a = group("a");
        let a_id = a.uuid();
        scene
            .attach(ObjectSnapshot::new(a).with_child(group("a.0")), root, None)
            .unwrap();
        scene.attach(group("b").into(), root, None).unwrap();

        let rebuilt = Scene::from_snapshot(scene.to_snapshot()).unwrap();
        assert_eq!(rebuilt.to_snapshot(), scene.to_snapshot());
        assert_eq!(rebuilt.iter().count(), 4);
        assert_eq!(rebuilt.location_of(a_id), Some((root, 0)));

        let duplicated = ObjectSnapshot::new(group("root"))
            .with_child(group("x").with_uuid(a_id))
            .with_child(group("y").with_uuid(a_id));
        assert_eq!(
            Scene::from_snapshot(duplicated).err(),
            Some(SceneError::DuplicateUuid(a_id))
        );
    }
}
