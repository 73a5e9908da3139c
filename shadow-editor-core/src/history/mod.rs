//! # History
//!
//! The undo and redo stacks of an editing session. Every successful [`Command`] is pushed onto
//! the undo stack, unless it can be folded into the command on top of it. Undoing moves the top
//! entry onto the redo stack, and executing anything new discards the redo stack.
//!
//! Entries loaded from a saved document are kept in their persisted form until they are first
//! undone or redone, at which point they're read back through a [`CommandRegistry`] against the
//! state as it is at that moment.

mod state;

pub use state::EditorState;

use std::time::{Duration, Instant};

use crate::{
    commands::{Command, CommandConsumer, CommandError, CommandRegistry, DeserializeError, DoUndo},
    signal::Signal,
};

/// Identifies an entry of the history. Counts up from 1 within a session.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CommandId(u64);
impl CommandId {
    #[must_use]
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}
impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Updatable commands executed within this many milliseconds of the previous one merge into it.
    pub merge_window_ms: u64,
    /// Whether the history is saved along with the document.
    pub persistent: bool,
}
impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            merge_window_ms: 500,
            persistent: false,
        }
    }
}
impl HistorySettings {
    #[must_use]
    pub fn merge_window(&self) -> Duration {
        Duration::from_millis(self.merge_window_ms)
    }
}

/// Persisted form of the history, each entry being a command as written by [`Command::to_json`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistoryJson {
    #[serde(default)]
    pub undos: Vec<serde_json::Value>,
    #[serde(default)]
    pub redos: Vec<serde_json::Value>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stack {
    Undos,
    Redos,
}

/// A persisted entry that couldn't be loaded, and was left out of the history.
#[derive(thiserror::Error, Debug)]
#[error("skipped {stack} entry {index}: {source}")]
pub struct EntryError {
    pub stack: Stack,
    pub index: usize,
    #[source]
    pub source: DeserializeError,
}

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("command could not be applied: {0}")]
    Execute(#[source] CommandError),
    #[error("command {id} could not be applied: {source}")]
    Command {
        id: CommandId,
        #[source]
        source: CommandError,
    },
    #[error("command {id} could not be read: {source}")]
    Deserialize {
        id: CommandId,
        #[source]
        source: DeserializeError,
    },
    #[error("no command {0} in the history")]
    UnknownState(CommandId),
    #[error("history is suspended")]
    Suspended,
}

/// The outcome of a successful step of the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// The entry that was executed, undone or redone.
    pub id: CommandId,
    pub signal: Signal,
    /// The command was folded into the entry `id` rather than pushed.
    pub merged: bool,
}

#[derive(Debug)]
enum Body {
    Live(Command),
    /// Not read back yet.
    Persisted(serde_json::Value),
}

#[derive(Debug)]
struct Entry {
    id: CommandId,
    name: String,
    body: Body,
}
impl Entry {
    /// Read a persisted entry without resolving its command, which waits until it's needed.
    fn restore(registry: &CommandRegistry, json: &serde_json::Value) -> Result<Self, DeserializeError> {
        let header = registry.validate(json)?;
        let id = u64::try_from(header.id)
            .ok()
            .and_then(CommandId::new)
            .ok_or(DeserializeError::InvalidId(header.id))?;
        Ok(Self {
            id,
            name: header.name,
            body: Body::Persisted(json.clone()),
        })
    }
    fn live(
        &mut self,
        state: &EditorState,
        registry: &CommandRegistry,
    ) -> Result<&Command, DeserializeError> {
        if let Body::Persisted(json) = &self.body {
            let command = registry.deserialize(state, json)?;
            log::trace!("read back command {}", self.id);
            self.body = Body::Live(command);
        }
        match &self.body {
            Body::Live(command) => Ok(command),
            Body::Persisted(_) => unreachable!(),
        }
    }
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match &self.body {
            Body::Live(command) => {
                let id = i64::try_from(self.id.get()).unwrap_or(i64::MAX);
                command.to_json(id, &self.name)
            }
            Body::Persisted(json) => Ok(json.clone()),
        }
    }
    /// Undo or redo this entry.
    fn step(
        &mut self,
        state: &mut EditorState,
        registry: &CommandRegistry,
        undo: bool,
    ) -> Result<Signal, HistoryError> {
        let id = self.id;
        let command = self
            .live(state, registry)
            .map_err(|source| HistoryError::Deserialize { id, source })?;
        let action = if undo {
            DoUndo::Undo(command)
        } else {
            DoUndo::Do(command)
        };
        state
            .apply(action)
            .map_err(|source| HistoryError::Command { id, source })
    }
}

#[derive(Debug, Default)]
pub struct History {
    /// Oldest first.
    undos: Vec<Entry>,
    /// Next to redo last.
    redos: Vec<Entry>,
    id_counter: u64,
    /// When the last command was executed. `None` once anything else touched the stacks,
    /// so nothing merges across an undo or redo.
    last_execute: Option<Instant>,
    settings: HistorySettings,
    suspended: bool,
}

impl History {
    #[must_use]
    pub fn new(settings: HistorySettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn settings(&self) -> &HistorySettings {
        &self.settings
    }
    pub fn set_settings(&mut self, settings: HistorySettings) {
        self.settings = settings;
    }
    /// Apply a command and record it, named `name` or its default label.
    ///
    /// If the state rejects the command, nothing is recorded and the redo stack is kept.
    pub fn execute(
        &mut self,
        state: &mut EditorState,
        command: Command,
        name: Option<String>,
    ) -> Result<Applied, HistoryError> {
        let now = Instant::now();
        let mergeable = self.last_execute.is_some_and(|last| {
            command.ignores_merge_window() || now.duration_since(last) < self.settings.merge_window()
        });
        let signal = state
            .apply(DoUndo::Do(&command))
            .map_err(HistoryError::Execute)?;
        self.redos.clear();
        self.last_execute = Some(now);

        if mergeable {
            if let Some(Entry {
                id,
                name: top_name,
                body: Body::Live(top),
            }) = self.undos.last_mut()
            {
                if top.update(&command) {
                    log::debug!("merged {} into command {id}", command.ty());
                    if let Some(name) = name {
                        *top_name = name;
                    }
                    return Ok(Applied {
                        id: *id,
                        signal,
                        merged: true,
                    });
                }
            }
        }

        self.id_counter += 1;
        let id = CommandId(self.id_counter);
        log::trace!("wrote command {id}: {command:?}");
        self.undos.push(Entry {
            id,
            name: name.unwrap_or_else(|| command.label()),
            body: Body::Live(command),
        });
        Ok(Applied {
            id,
            signal,
            merged: false,
        })
    }
    /// Undo the most recent entry. `Ok(None)` if there is nothing to undo.
    ///
    /// If the entry can't be read or applied it stays on the undo stack.
    pub fn undo(
        &mut self,
        state: &mut EditorState,
        registry: &CommandRegistry,
    ) -> Result<Option<Applied>, HistoryError> {
        if self.suspended {
            return Err(HistoryError::Suspended);
        }
        self.last_execute = None;
        let Some(mut entry) = self.undos.pop() else {
            return Ok(None);
        };
        match entry.step(state, registry, true) {
            Ok(signal) => {
                let id = entry.id;
                log::debug!("undid command {id}");
                self.redos.push(entry);
                Ok(Some(Applied {
                    id,
                    signal,
                    merged: false,
                }))
            }
            Err(err) => {
                self.undos.push(entry);
                Err(err)
            }
        }
    }
    /// Redo the most recently undone entry. `Ok(None)` if there is nothing to redo.
    ///
    /// If the entry can't be read or applied it stays on the redo stack.
    pub fn redo(
        &mut self,
        state: &mut EditorState,
        registry: &CommandRegistry,
    ) -> Result<Option<Applied>, HistoryError> {
        if self.suspended {
            return Err(HistoryError::Suspended);
        }
        self.last_execute = None;
        let Some(mut entry) = self.redos.pop() else {
            return Ok(None);
        };
        match entry.step(state, registry, false) {
            Ok(signal) => {
                let id = entry.id;
                log::debug!("redid command {id}");
                self.undos.push(entry);
                Ok(Some(Applied {
                    id,
                    signal,
                    merged: false,
                }))
            }
            Err(err) => {
                self.redos.push(entry);
                Err(err)
            }
        }
    }
    /// Undo or redo until `target` is the most recent entry, or until nothing is left to undo if `None`.
    /// `on_step` sees every entry passed along the way.
    ///
    /// Stops at the first entry that fails, leaving the history at that point.
    pub fn go_to_state(
        &mut self,
        state: &mut EditorState,
        registry: &CommandRegistry,
        target: Option<CommandId>,
        mut on_step: impl FnMut(Applied),
    ) -> Result<(), HistoryError> {
        if self.suspended {
            return Err(HistoryError::Suspended);
        }
        let forward = match target {
            None => false,
            Some(id) if self.undos.iter().any(|entry| entry.id == id) => false,
            Some(id) if self.redos.iter().any(|entry| entry.id == id) => true,
            Some(id) => return Err(HistoryError::UnknownState(id)),
        };
        log::debug!(
            "going to state {}",
            target.map_or_else(|| "start".to_owned(), |id| id.to_string())
        );
        while self.current_id() != target {
            let applied = if forward {
                self.redo(state, registry)?
            } else {
                self.undo(state, registry)?
            };
            let Some(applied) = applied else {
                break;
            };
            on_step(applied);
        }
        Ok(())
    }
    /// Forget every entry, and start counting ids from the beginning.
    pub fn clear(&mut self) {
        log::debug!(
            "cleared history of {} entries",
            self.undos.len() + self.redos.len()
        );
        self.undos.clear();
        self.redos.clear();
        self.id_counter = 0;
        self.last_execute = None;
    }
    /// Temporarily disallow stepping through the history, for example while the scene is playing.
    pub fn suspend(&mut self) {
        self.suspended = true;
    }
    pub fn resume(&mut self) {
        self.suspended = false;
    }
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undos.len()
    }
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redos.len()
    }
    /// Ids and names of the undo stack, oldest first.
    pub fn iter_undos(&self) -> impl DoubleEndedIterator<Item = (CommandId, &str)> + '_ {
        self.undos.iter().map(|entry| (entry.id, entry.name.as_str()))
    }
    /// Ids and names of the redo stack, next to redo first.
    pub fn iter_redos(&self) -> impl DoubleEndedIterator<Item = (CommandId, &str)> + '_ {
        self.redos
            .iter()
            .rev()
            .map(|entry| (entry.id, entry.name.as_str()))
    }
    /// The most recent entry on the undo stack.
    #[must_use]
    pub fn current_id(&self) -> Option<CommandId> {
        self.undos.last().map(|entry| entry.id)
    }
    pub fn to_json(&self) -> Result<HistoryJson, serde_json::Error> {
        Ok(HistoryJson {
            undos: self
                .undos
                .iter()
                .map(Entry::to_json)
                .collect::<Result<_, _>>()?,
            redos: self
                .redos
                .iter()
                .map(Entry::to_json)
                .collect::<Result<_, _>>()?,
        })
    }
    /// Load a persisted history. Entries with a bad header, an unknown type or a repeated id
    /// are reported and left out, the rest load.
    #[must_use]
    pub fn from_json(
        json: &HistoryJson,
        registry: &CommandRegistry,
        settings: HistorySettings,
    ) -> (Self, Vec<EntryError>) {
        let mut errors = Vec::new();
        let mut seen = hashbrown::HashSet::new();
        let mut load = |stack: Stack, entries: &[serde_json::Value]| -> Vec<Entry> {
            entries
                .iter()
                .enumerate()
                .filter_map(|(index, json)| {
                    let entry = Entry::restore(registry, json).and_then(|entry| {
                        if seen.insert(entry.id) {
                            Ok(entry)
                        } else {
                            Err(DeserializeError::InvalidId(
                                i64::try_from(entry.id.get()).unwrap_or(i64::MAX),
                            ))
                        }
                    });
                    match entry {
                        Ok(entry) => Some(entry),
                        Err(source) => {
                            log::warn!("skipped {stack} entry {index}: {source}");
                            errors.push(EntryError {
                                stack,
                                index,
                                source,
                            });
                            None
                        }
                    }
                })
                .collect()
        };
        let undos = load(Stack::Undos, &json.undos);
        let redos = load(Stack::Redos, &json.redos);
        let id_counter = undos
            .iter()
            .chain(&redos)
            .map(|entry| entry.id.get())
            .max()
            .unwrap_or(0);
        (
            Self {
                undos,
                redos,
                id_counter,
                last_execute: None,
                settings,
                suspended: false,
            },
            errors,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        commands::{ObjectCommand, ScriptCommand},
        state::{Object3D, ObjectKind, Scene, Script, ScriptAttribute, ScriptKind, ScriptLibrary, Value, Vector3},
    };

    fn state_with_box() -> (EditorState, uuid::Uuid) {
        let mut scene = Scene::default();
        let object = Object3D::new(ObjectKind::Mesh).with_name("Box");
        let uuid = object.uuid();
        scene.attach(object.into(), scene.root_uuid(), None).unwrap();
        (EditorState::new(scene, ScriptLibrary::default()), uuid)
    }
    fn position(state: &EditorState, uuid: uuid::Uuid) -> Vector3 {
        state.scene().get(uuid).unwrap().position
    }
    fn name(state: &EditorState, uuid: uuid::Uuid) -> Value {
        state.scene().get(uuid).unwrap().attribute("name")
    }
    /// A history that never merges by time.
    fn unmerging() -> History {
        History::new(HistorySettings {
            merge_window_ms: 0,
            persistent: false,
        })
    }

    #[test]
    fn set_position_round_trip() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        let applied = history.execute(&mut state, command.into(), None).unwrap();
        assert_eq!(applied.id.get(), 1);
        assert_eq!(applied.signal, Signal::ObjectChanged(uuid));
        assert_eq!(position(&state, uuid), Vector3::new(1.0, 2.0, 3.0));

        history.undo(&mut state, &registry).unwrap();
        assert_eq!(position(&state, uuid), Vector3::ZERO);
        history.redo(&mut state, &registry).unwrap();
        assert_eq!(position(&state, uuid), Vector3::new(1.0, 2.0, 3.0));
    }
    #[test]
    fn undo_n_moves_n() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = unmerging();
        for i in 1..=5u8 {
            let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::splat(f32::from(i))).unwrap();
            history.execute(&mut state, command.into(), None).unwrap();
        }
        assert_eq!(history.undo_count(), 5);
        for _ in 0..3 {
            history.undo(&mut state, &registry).unwrap();
        }
        assert_eq!(history.undo_count(), 2);
        assert_eq!(history.redo_count(), 3);
        assert_eq!(position(&state, uuid), Vector3::splat(2.0));

        // Executing anything discards the redo stack.
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "x").unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        assert!(!history.can_redo());
    }
    #[test]
    fn empty_undo_is_noop() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        assert!(history.undo(&mut state, &registry).unwrap().is_none());

        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "x").unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        history.undo(&mut state, &registry).unwrap();
        assert!(history.undo(&mut state, &registry).unwrap().is_none());
        assert_eq!(history.redo_count(), 1);
    }
    #[test]
    fn merges_within_window() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::new(HistorySettings {
            merge_window_ms: 60_000,
            persistent: false,
        });
        for new in ["a", "b"] {
            let command = ObjectCommand::set_value(state.scene(), uuid, "name", new).unwrap();
            history.execute(&mut state, command.into(), None).unwrap();
        }
        assert_eq!(history.undo_count(), 1);
        assert_eq!(name(&state, uuid), Value::from("b"));
        history.undo(&mut state, &registry).unwrap();
        assert_eq!(name(&state, uuid), Value::from("Box"));

        // No merging across an undo.
        history.redo(&mut state, &registry).unwrap();
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "c").unwrap();
        let applied = history.execute(&mut state, command.into(), None).unwrap();
        assert!(!applied.merged);
        assert_eq!(history.undo_count(), 2);
    }
    #[test]
    fn merge_takes_newer_name() {
        let (mut state, uuid) = state_with_box();
        let mut history = History::new(HistorySettings {
            merge_window_ms: 60_000,
            persistent: false,
        });
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::ONE).unwrap();
        history.execute(&mut state, command.into(), Some("Drag".to_owned())).unwrap();
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::splat(2.0)).unwrap();
        let applied = history.execute(&mut state, command.into(), Some("Drop".to_owned())).unwrap();
        assert!(applied.merged);
        // Unnamed, the merged entry keeps its name.
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::splat(3.0)).unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.iter_undos().next(), Some((applied.id, "Drop")));
    }
    #[test]
    fn zero_window_merges_only_scripts() {
        let (mut state, uuid) = state_with_box();
        let mut history = unmerging();
        for new in ["a", "b"] {
            let command = ObjectCommand::set_value(state.scene(), uuid, "name", new).unwrap();
            history.execute(&mut state, command.into(), None).unwrap();
        }
        assert_eq!(history.undo_count(), 2);

        let script = Script::new("s", ScriptKind::Javascript, "");
        let add = ScriptCommand::add(state.scripts(), uuid, script.clone());
        history.execute(&mut state, add.into(), None).unwrap();
        for source in ["let a;", "let ab;"] {
            let command =
                ScriptCommand::set_value(state.scripts(), uuid, script.uuid, ScriptAttribute::Source, source)
                    .unwrap();
            history.execute(&mut state, command.into(), None).unwrap();
        }
        // Add, then one merged edit.
        assert_eq!(history.undo_count(), 4);
        let names = history.iter_undos().map(|(_, name)| name).collect::<Vec<_>>();
        assert_eq!(names, ["Set name", "Set name", "Add Script", "Set Script.source"]);
    }
    #[test]
    fn failed_execute_records_nothing() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "x").unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        history.undo(&mut state, &registry).unwrap();

        let missing = uuid::Uuid::new_v4();
        let bad = ObjectCommand::set_position_from(missing, Vector3::ZERO, Vector3::ONE);
        assert!(matches!(
            history.execute(&mut state, bad.into(), None),
            Err(HistoryError::Execute(CommandError::UnknownObject(_)))
        ));
        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 1);
    }
    #[test]
    fn failed_undo_keeps_entry() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::ONE).unwrap();
        history.execute(&mut state, command.into(), None).unwrap();

        // Pull the object out from under the history.
        let mut broken = EditorState::default();
        assert!(matches!(
            history.undo(&mut broken, &registry),
            Err(HistoryError::Command { .. })
        ));
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
        history.undo(&mut state, &registry).unwrap();
        assert_eq!(position(&state, uuid), Vector3::ZERO);
    }
    #[test]
    fn add_remove_restores_place() {
        let (mut state, first) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        let root = state.scene().root_uuid();
        let object = Object3D::new(ObjectKind::Group);
        let uuid = object.uuid();
        let add: Command = ObjectCommand::add(state.scene(), object).into();
        history.execute(&mut state, add, None).unwrap();
        let remove = ObjectCommand::remove(state.scene(), first).unwrap();
        history.execute(&mut state, remove.into(), None).unwrap();
        assert_eq!(state.scene().location_of(uuid), Some((root, 0)));

        history.undo(&mut state, &registry).unwrap();
        assert_eq!(state.scene().location_of(first), Some((root, 0)));
        assert_eq!(state.scene().location_of(uuid), Some((root, 1)));
        history.undo(&mut state, &registry).unwrap();
        assert!(!state.scene().contains(uuid));
        assert_eq!(state.scene().location_of(first), Some((root, 0)));
    }
    #[test]
    fn uuid_change_then_edit() {
        let (mut state, old) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = unmerging();
        let new = uuid::Uuid::new_v4();
        let rename = ObjectCommand::set_uuid(state.scene(), old, new).unwrap();
        history.execute(&mut state, rename.into(), None).unwrap();
        let edit = ObjectCommand::set_position(state.scene(), new, Vector3::ONE).unwrap();
        history.execute(&mut state, edit.into(), None).unwrap();

        history.undo(&mut state, &registry).unwrap();
        history.undo(&mut state, &registry).unwrap();
        assert!(state.scene().contains(old));
        assert!(!state.scene().contains(new));
        assert_eq!(position(&state, old), Vector3::ZERO);
        history.redo(&mut state, &registry).unwrap();
        history.redo(&mut state, &registry).unwrap();
        assert_eq!(position(&state, new), Vector3::ONE);
    }
    #[test]
    fn go_to_state_both_ways() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = unmerging();
        let mut ids = Vec::new();
        for i in 1..=4u8 {
            let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::splat(f32::from(i))).unwrap();
            ids.push(history.execute(&mut state, command.into(), None).unwrap().id);
        }
        let mut steps = 0;
        history
            .go_to_state(&mut state, &registry, Some(ids[1]), |_| steps += 1)
            .unwrap();
        assert_eq!(steps, 2);
        assert_eq!(history.current_id(), Some(ids[1]));
        assert_eq!(position(&state, uuid), Vector3::splat(2.0));

        history
            .go_to_state(&mut state, &registry, Some(ids[3]), |_| ())
            .unwrap();
        assert_eq!(position(&state, uuid), Vector3::splat(4.0));

        history.go_to_state(&mut state, &registry, None, |_| ()).unwrap();
        assert_eq!(history.current_id(), None);
        assert_eq!(position(&state, uuid), Vector3::ZERO);

        let bogus = CommandId::new(99).unwrap();
        assert!(matches!(
            history.go_to_state(&mut state, &registry, Some(bogus), |_| ()),
            Err(HistoryError::UnknownState(id)) if id == bogus
        ));
    }
    #[test]
    fn suspended_refuses_navigation() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = History::default();
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "x").unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        history.suspend();
        assert!(matches!(
            history.undo(&mut state, &registry),
            Err(HistoryError::Suspended)
        ));
        history.resume();
        assert!(history.undo(&mut state, &registry).unwrap().is_some());
    }
    #[test]
    fn clear_resets_ids() {
        let (mut state, uuid) = state_with_box();
        let mut history = unmerging();
        for new in ["a", "b"] {
            let command = ObjectCommand::set_value(state.scene(), uuid, "name", new).unwrap();
            history.execute(&mut state, command.into(), None).unwrap();
        }
        history.clear();
        assert!(!history.can_undo());
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "c").unwrap();
        let applied = history.execute(&mut state, command.into(), Some("Rename".to_owned())).unwrap();
        assert_eq!(applied.id.get(), 1);
        assert_eq!(history.iter_undos().next(), Some((applied.id, "Rename")));
    }
    #[test]
    fn lazy_reload() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = unmerging();
        let object = Object3D::new(ObjectKind::Group).with_name("Added");
        let added = object.uuid();
        let add: Command = ObjectCommand::add(state.scene(), object).into();
        history.execute(&mut state, add, None).unwrap();
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::ONE).unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        let command = ObjectCommand::set_value(state.scene(), uuid, "name", "Renamed").unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        history.undo(&mut state, &registry).unwrap();

        // Through text, as a saved document would be.
        let text = serde_json::to_string(&history.to_json().unwrap()).unwrap();
        let json: HistoryJson = serde_json::from_str(&text).unwrap();
        let (mut reloaded, errors) = History::from_json(&json, &registry, HistorySettings::default());
        assert!(errors.is_empty());
        assert_eq!(reloaded.undo_count(), 2);
        assert_eq!(reloaded.redo_count(), 1);
        assert_eq!(reloaded.current_id(), history.current_id());

        let mut fresh = state.clone();
        reloaded.undo(&mut fresh, &registry).unwrap();
        reloaded.undo(&mut fresh, &registry).unwrap();
        assert_eq!(position(&fresh, uuid), Vector3::ZERO);
        assert!(!fresh.scene().contains(added));
        reloaded.redo(&mut fresh, &registry).unwrap();
        assert!(fresh.scene().contains(added));
        reloaded
            .go_to_state(&mut fresh, &registry, Some(CommandId(3)), |_| ())
            .unwrap();
        assert_eq!(name(&fresh, uuid), Value::from("Renamed"));

        // Ids continue after the loaded ones.
        let command = ObjectCommand::set_value(fresh.scene(), uuid, "name", "Again").unwrap();
        let applied = reloaded.execute(&mut fresh, command.into(), None).unwrap();
        assert_eq!(applied.id.get(), 4);
    }
    #[test]
    fn bad_entries_skipped() {
        let (mut state, uuid) = state_with_box();
        let registry = CommandRegistry::builtin();
        let mut history = unmerging();
        let command = ObjectCommand::set_position(state.scene(), uuid, Vector3::ONE).unwrap();
        history.execute(&mut state, command.into(), None).unwrap();
        let mut json = history.to_json().unwrap();
        json.undos.insert(
            0,
            serde_json::json!({ "type": "TeleportCommand", "id": 7, "name": "Teleport" }),
        );
        json.undos.push(serde_json::json!({ "type": "SetValueCommand", "id": 1, "name": "Repeat" }));

        let (mut reloaded, errors) = History::from_json(&json, &registry, HistorySettings::default());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].stack, Stack::Undos);
        assert_eq!(errors[0].index, 0);
        assert!(matches!(errors[0].source, DeserializeError::UnknownType(_)));
        assert!(matches!(errors[1].source, DeserializeError::InvalidId(1)));
        assert_eq!(reloaded.undo_count(), 1);
        reloaded.undo(&mut state, &registry).unwrap();
        assert_eq!(position(&state, uuid), Vector3::ZERO);
    }
}
