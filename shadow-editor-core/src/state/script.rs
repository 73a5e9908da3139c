use hashbrown::HashMap;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ScriptKind {
    Javascript,
    VertexShader,
    FragmentShader,
    ProgramInfo,
}

/// The writable attributes of a [`Script`].
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ScriptAttribute {
    Name,
    Source,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    pub uuid: uuid::Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ScriptKind,
    pub source: String,
}

impl Script {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ScriptKind, source: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4(),
            name: name.into(),
            kind,
            source: source.into(),
        }
    }
    #[must_use]
    pub fn attribute(&self, attribute: ScriptAttribute) -> &str {
        match attribute {
            ScriptAttribute::Name => &self.name,
            ScriptAttribute::Source => &self.source,
        }
    }
    pub fn set_attribute(&mut self, attribute: ScriptAttribute, value: String) {
        match attribute {
            ScriptAttribute::Name => self.name = value,
            ScriptAttribute::Source => self.source = value,
        }
    }
}

/// Scripts attached to each object, in attachment order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ScriptLibrary(HashMap<uuid::Uuid, Vec<Script>>);

impl ScriptLibrary {
    #[must_use]
    pub fn scripts_of(&self, object: uuid::Uuid) -> &[Script] {
        self.0.get(&object).map_or(&[], Vec::as_slice)
    }
    #[must_use]
    pub fn get(&self, object: uuid::Uuid, script: uuid::Uuid) -> Option<&Script> {
        self.scripts_of(object).iter().find(|s| s.uuid == script)
    }
    pub fn get_mut(&mut self, object: uuid::Uuid, script: uuid::Uuid) -> Option<&mut Script> {
        self.0
            .get_mut(&object)?
            .iter_mut()
            .find(|s| s.uuid == script)
    }
    #[must_use]
    pub fn index_of(&self, object: uuid::Uuid, script: uuid::Uuid) -> Option<usize> {
        self.scripts_of(object).iter().position(|s| s.uuid == script)
    }
    /// Find which object a script is attached to.
    #[must_use]
    pub fn owner_of(&self, script: uuid::Uuid) -> Option<uuid::Uuid> {
        self.0
            .iter()
            .find_map(|(object, scripts)| scripts.iter().any(|s| s.uuid == script).then_some(*object))
    }
    /// Insert at `index`, clamped to the end of the object's list.
    pub fn insert(&mut self, object: uuid::Uuid, index: usize, script: Script) {
        let scripts = self.0.entry(object).or_default();
        scripts.insert(index.min(scripts.len()), script);
    }
    /// Remove a script, returning where it was.
    pub fn remove(&mut self, object: uuid::Uuid, script: uuid::Uuid) -> Option<(usize, Script)> {
        let hashbrown::hash_map::Entry::Occupied(mut entry) = self.0.entry(object) else {
            return None;
        };
        let index = entry.get().iter().position(|s| s.uuid == script)?;
        let removed = entry.get_mut().remove(index);
        if entry.get().is_empty() {
            entry.remove();
        }
        Some((index, removed))
    }
    /// Move an object's scripts to a new uuid, following an identity change.
    pub fn rekey(&mut self, old: uuid::Uuid, new: uuid::Uuid) {
        if let Some(scripts) = self.0.remove(&old) {
            self.0.insert(new, scripts);
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (uuid::Uuid, &[Script])> + '_ {
        self.0.iter().map(|(object, scripts)| (*object, scripts.as_slice()))
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn insert_remove_keeps_order() {
        let object = uuid::Uuid::new_v4();
        let mut library = ScriptLibrary::default();
        let a = Script::new("a", ScriptKind::Javascript, "");
        let b = Script::new("b", ScriptKind::Javascript, "");
        let (a_id, b_id) = (a.uuid, b.uuid);
        library.insert(object, 0, a);
        // Clamped to the end.
        library.insert(object, 10, b);
        assert_eq!(library.index_of(object, b_id), Some(1));
        assert_eq!(library.owner_of(a_id), Some(object));

        let (index, removed) = library.remove(object, a_id).unwrap();
        assert_eq!((index, removed.name.as_str()), (0, "a"));
        assert_eq!(library.index_of(object, b_id), Some(0));
        library.remove(object, b_id).unwrap();
        // Empty lists are dropped.
        assert!(library.is_empty());
        assert!(library.remove(object, b_id).is_none());
    }
    #[test]
    fn keyed_by_uuid_string() {
        let object = uuid::Uuid::new_v4();
        let mut library = ScriptLibrary::default();
        library.insert(object, 0, Script::new("s", ScriptKind::Javascript, "let a = 1;"));
        let json = serde_json::to_value(&library).unwrap();
        assert!(json.get(object.to_string()).is_some());
        let back: ScriptLibrary = serde_json::from_value(json).unwrap();
        assert_eq!(back, library);
    }
}
