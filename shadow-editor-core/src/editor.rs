//! The editing session: state, history and registry behind one handle, reporting every change
//! to a [`Notifier`].

use crate::{
    commands::{Command, CommandRegistry, DeserializeError},
    history::{CommandId, EditorState, EntryError, History, HistoryError, HistoryJson, HistorySettings},
    signal::{Notifier, Signal},
    state::{ObjectSnapshot, Scene},
};

/// The state is only handed out shared, commands are the one way to change it.
pub struct Editor<N: Notifier = Vec<Signal>> {
    state: EditorState,
    history: History,
    registry: CommandRegistry,
    notifier: N,
}

impl<N: Notifier + Default> Default for Editor<N> {
    fn default() -> Self {
        Self::with_notifier(EditorState::default(), HistorySettings::default(), N::default())
    }
}

impl Editor {
    /// An editor collecting its signals into a `Vec`.
    #[must_use]
    pub fn new(state: EditorState, settings: HistorySettings) -> Self {
        Self::with_notifier(state, settings, Vec::new())
    }
}

impl<N: Notifier> Editor<N> {
    #[must_use]
    pub fn with_notifier(state: EditorState, settings: HistorySettings, notifier: N) -> Self {
        Self {
            state,
            history: History::new(settings),
            registry: CommandRegistry::builtin(),
            notifier,
        }
    }
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.state.scene()
    }
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
    /// Register further command types before loading a history that uses them.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }
    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }
    pub fn set_history_settings(&mut self, settings: HistorySettings) {
        self.history.set_settings(settings);
    }
    pub fn execute(&mut self, command: Command) -> Result<CommandId, HistoryError> {
        let result = self.history.execute(&mut self.state, command, None);
        self.finish(result)
    }
    /// Execute, naming the history entry `name` instead of the command's own label.
    pub fn execute_named(&mut self, command: Command, name: impl Into<String>) -> Result<CommandId, HistoryError> {
        let result = self.history.execute(&mut self.state, command, Some(name.into()));
        self.finish(result)
    }
    /// Import a whole scene over the current one, as a single undoable step.
    pub fn set_scene(&mut self, imported: ObjectSnapshot) -> Result<CommandId, HistoryError> {
        let command = Command::set_scene(&self.state, imported);
        self.execute(command)
    }
    /// Undo the most recent entry, returning its id, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<Option<CommandId>, HistoryError> {
        let result = self.history.undo(&mut self.state, &self.registry);
        self.finish_step(result)
    }
    pub fn redo(&mut self) -> Result<Option<CommandId>, HistoryError> {
        let result = self.history.redo(&mut self.state, &self.registry);
        self.finish_step(result)
    }
    /// Step through the history until `id` is the most recent entry, or to the very start if `None`.
    pub fn go_to_state(&mut self, id: Option<CommandId>) -> Result<(), HistoryError> {
        let notifier = &mut self.notifier;
        let result = self
            .history
            .go_to_state(&mut self.state, &self.registry, id, |applied| {
                notifier.notify(applied.signal);
            });
        match result {
            Ok(()) => {
                self.notify_history();
                Ok(())
            }
            Err(err) => {
                // Some steps may have been taken before the failure.
                self.notify_history();
                Err(self.fail(err))
            }
        }
    }
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.notify_history();
    }
    /// Swap in a new state, such as a freshly opened scene. The history is cleared.
    pub fn load_state(&mut self, state: EditorState) {
        self.state = state;
        self.history.clear();
        self.notifier.notify(Signal::SceneGraphChanged);
        self.notify_history();
    }
    pub fn select(&mut self, uuid: Option<uuid::Uuid>) -> bool {
        self.state.select(uuid)
    }
    pub fn suspend(&mut self) {
        self.history.suspend();
    }
    pub fn resume(&mut self) {
        self.history.resume();
    }
    pub fn history_json(&self) -> Result<HistoryJson, serde_json::Error> {
        self.history.to_json()
    }
    /// Replace the history with a persisted one. The entries that couldn't be loaded are returned.
    pub fn load_history(&mut self, json: &HistoryJson) -> Vec<EntryError> {
        let (history, errors) = History::from_json(json, &self.registry, self.history.settings().clone());
        self.history = history;
        self.notify_history();
        errors
    }
    /// Read a single command against the current state, such as one received from elsewhere.
    pub fn command_from_json(&self, json: &serde_json::Value) -> Result<Command, DeserializeError> {
        self.registry.deserialize(&self.state, json)
    }

    fn notify_history(&mut self) {
        self.notifier
            .notify(Signal::HistoryChanged(self.history.current_id()));
    }
    fn fail(&mut self, err: HistoryError) -> HistoryError {
        log::error!("{err}");
        self.notifier.notify(Signal::Failed(err.to_string()));
        err
    }
    fn finish(&mut self, result: Result<crate::history::Applied, HistoryError>) -> Result<CommandId, HistoryError> {
        match result {
            Ok(applied) => {
                self.notifier.notify(applied.signal);
                self.notify_history();
                Ok(applied.id)
            }
            Err(err) => Err(self.fail(err)),
        }
    }
    fn finish_step(
        &mut self,
        result: Result<Option<crate::history::Applied>, HistoryError>,
    ) -> Result<Option<CommandId>, HistoryError> {
        match result {
            Ok(Some(applied)) => self.finish(Ok(applied)).map(Some),
            Ok(None) => Ok(None),
            Err(err) => Err(self.fail(err)),
        }
    }
}
