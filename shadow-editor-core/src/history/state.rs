use crate::{
    commands::{Command, CommandConsumer, CommandError, DoUndo, ObjectCommand},
    signal::Signal,
    state::{Scene, ScriptLibrary},
};

/// Everything commands act on.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
    scene: Scene,
    scripts: ScriptLibrary,
    selected: Option<uuid::Uuid>,
}

impl EditorState {
    #[must_use]
    pub fn new(scene: Scene, scripts: ScriptLibrary) -> Self {
        Self {
            scene,
            scripts,
            selected: None,
        }
    }
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
    #[must_use]
    pub fn scripts(&self) -> &ScriptLibrary {
        &self.scripts
    }
    #[must_use]
    pub fn selected(&self) -> Option<uuid::Uuid> {
        self.selected
    }
    /// Select an object in the scene, or nothing. Returns false if the object isn't in the scene.
    pub fn select(&mut self, uuid: Option<uuid::Uuid>) -> bool {
        if uuid.is_some_and(|uuid| !self.scene.contains(uuid)) {
            return false;
        }
        self.selected = uuid;
        true
    }
    /// Keep the selection and the script owners in step with a tree change that just succeeded.
    fn follow_object(&mut self, action: DoUndo<'_, ObjectCommand>) {
        match action {
            DoUndo::Do(ObjectCommand::Added { object, .. })
            | DoUndo::Undo(ObjectCommand::Removed { object, .. }) => {
                self.selected = Some(object.uuid());
            }
            DoUndo::Undo(ObjectCommand::Added { .. }) => self.selected = None,
            DoUndo::Do(ObjectCommand::Removed { parent, .. }) => self.selected = Some(*parent),
            DoUndo::Do(ObjectCommand::UuidChanged { old, new })
            | DoUndo::Undo(ObjectCommand::UuidChanged { old: new, new: old }) => {
                if self.selected == Some(*old) {
                    self.selected = Some(*new);
                }
                self.scripts.rekey(*old, *new);
            }
            _ => (),
        }
        if self.selected.is_some_and(|selected| !self.scene.contains(selected)) {
            self.selected = None;
        }
    }
    /// Apply every step in order. If one fails, the ones before it are reverted in reverse order.
    fn apply_all<'c>(
        &mut self,
        steps: impl Iterator<Item = DoUndo<'c, Command>>,
    ) -> Result<(), CommandError> {
        let mut done = smallvec::SmallVec::<[DoUndo<'c, Command>; 8]>::new();
        for step in steps {
            if let Err(err) = self.apply(step) {
                for step in done.into_iter().rev() {
                    if let Err(rollback) = self.apply(step.inverse()) {
                        // Every step was just applied, so reverting it should never fail.
                        log::error!("failed to roll back {}: {rollback}", step.inner().ty());
                    }
                }
                return Err(err);
            }
            done.push(step);
        }
        Ok(())
    }
}

impl CommandConsumer<Command> for EditorState {
    fn apply(&mut self, action: DoUndo<'_, Command>) -> Result<Signal, CommandError> {
        match action.inner() {
            Command::Object(command) => {
                let action = action.rewrap(command);
                if let DoUndo::Do(ObjectCommand::UuidChanged { old, new })
                | DoUndo::Undo(ObjectCommand::UuidChanged { old: new, new: old }) = action
                {
                    // A removed object's scripts still hold its uuid, for when the removal is undone.
                    if old != new && !self.scripts.scripts_of(*new).is_empty() {
                        return Err(CommandError::MismatchedState);
                    }
                }
                let signal = self.scene.apply(action)?;
                self.follow_object(action);
                Ok(signal)
            }
            Command::Material(command) => self.scene.apply(action.rewrap(command)),
            Command::Geometry(command) => self.scene.apply(action.rewrap(command)),
            Command::Script(command) => {
                let target = command.target();
                if !self.scene.contains(target) {
                    return Err(CommandError::UnknownObject(target));
                }
                self.scripts.apply(action.rewrap(command))
            }
            Command::Scope(_, commands) => {
                let steps = commands.iter().map(|command| action.rewrap(command));
                match action {
                    DoUndo::Do(_) => self.apply_all(steps)?,
                    DoUndo::Undo(_) => self.apply_all(steps.rev())?,
                }
                Ok(Signal::SceneGraphChanged)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        commands::ScriptCommand,
        state::{Object3D, ObjectKind, Script, ScriptKind, Value, Vector3},
    };

    fn state_with(objects: &[Object3D]) -> EditorState {
        let mut scene = Scene::default();
        for object in objects {
            scene
                .attach(object.clone().into(), scene.root_uuid(), None)
                .unwrap();
        }
        EditorState::new(scene, ScriptLibrary::default())
    }

    #[test]
    fn selection_follows_add_remove() {
        let mut state = EditorState::default();
        let root = state.scene().root_uuid();
        let object = Object3D::new(ObjectKind::Group);
        let uuid = object.uuid();
        let add: Command = ObjectCommand::add(state.scene(), object).into();
        state.apply(DoUndo::Do(&add)).unwrap();
        assert_eq!(state.selected(), Some(uuid));

        let remove: Command = ObjectCommand::remove(state.scene(), uuid).unwrap().into();
        state.apply(DoUndo::Do(&remove)).unwrap();
        assert_eq!(state.selected(), Some(root));
        state.apply(DoUndo::Undo(&remove)).unwrap();
        assert_eq!(state.selected(), Some(uuid));
        state.apply(DoUndo::Undo(&add)).unwrap();
        assert_eq!(state.selected(), None);
        assert!(!state.select(Some(uuid)));
    }
    #[test]
    fn scope_order_and_reverse() {
        let object = Object3D::new(ObjectKind::Mesh);
        let uuid = object.uuid();
        let mut state = state_with(&[object]);
        let scope = Command::multiple([
            ObjectCommand::set_position_from(uuid, Vector3::ZERO, Vector3::ONE).into(),
            ObjectCommand::set_position_from(uuid, Vector3::ONE, Vector3::splat(2.0)).into(),
        ]);
        assert_eq!(state.apply(DoUndo::Do(&scope)), Ok(Signal::SceneGraphChanged));
        assert_eq!(state.scene().get(uuid).unwrap().position, Vector3::splat(2.0));
        // Undone in reverse, the first command's old value is the last written.
        state.apply(DoUndo::Undo(&scope)).unwrap();
        assert_eq!(state.scene().get(uuid).unwrap().position, Vector3::ZERO);
    }
    #[test]
    fn scope_rolls_back() {
        let object = Object3D::new(ObjectKind::Mesh).with_name("before");
        let uuid = object.uuid();
        let mut state = state_with(&[object]);
        let missing = uuid::Uuid::new_v4();
        let scope = Command::multiple([
            ObjectCommand::set_value(state.scene(), uuid, "name", "after")
                .unwrap()
                .into(),
            ObjectCommand::set_position_from(missing, Vector3::ZERO, Vector3::ONE).into(),
        ]);
        assert_eq!(
            state.apply(DoUndo::Do(&scope)),
            Err(CommandError::UnknownObject(missing))
        );
        assert_eq!(
            state.scene().get(uuid).unwrap().attribute("name"),
            Value::String("before".to_owned())
        );
    }
    #[test]
    fn uuid_change_carries_scripts() {
        let object = Object3D::new(ObjectKind::Group);
        let old = object.uuid();
        let mut state = state_with(&[object]);
        let script = Script::new("spin", ScriptKind::Javascript, "");
        let add: Command = ScriptCommand::add(state.scripts(), old, script.clone()).into();
        state.apply(DoUndo::Do(&add)).unwrap();
        state.select(Some(old));

        let new = uuid::Uuid::new_v4();
        let rename: Command = ObjectCommand::set_uuid(state.scene(), old, new).unwrap().into();
        state.apply(DoUndo::Do(&rename)).unwrap();
        assert_eq!(state.selected(), Some(new));
        assert_eq!(state.scripts().scripts_of(new), [script.clone()]);
        assert!(state.scripts().scripts_of(old).is_empty());

        state.apply(DoUndo::Undo(&rename)).unwrap();
        assert_eq!(state.selected(), Some(old));
        assert_eq!(state.scripts().scripts_of(old), [script]);
    }
    #[test]
    fn uuid_of_removed_owner_is_kept() {
        let first = Object3D::new(ObjectKind::Group);
        let second = Object3D::new(ObjectKind::Group);
        let (first_id, second_id) = (first.uuid(), second.uuid());
        let mut state = state_with(&[first, second]);
        let script = Script::new("spin", ScriptKind::Javascript, "");
        let add: Command = ScriptCommand::add(state.scripts(), first_id, script.clone()).into();
        state.apply(DoUndo::Do(&add)).unwrap();
        let remove: Command = ObjectCommand::remove(state.scene(), first_id).unwrap().into();
        state.apply(DoUndo::Do(&remove)).unwrap();

        // The scene no longer has the removed uuid, but its scripts are waiting for it.
        let rename: Command = ObjectCommand::set_uuid(state.scene(), second_id, first_id)
            .unwrap()
            .into();
        assert_eq!(
            state.apply(DoUndo::Do(&rename)),
            Err(CommandError::MismatchedState)
        );
        assert!(state.scene().contains(second_id));
        assert!(state.scripts().scripts_of(second_id).is_empty());

        state.apply(DoUndo::Undo(&remove)).unwrap();
        assert_eq!(state.scripts().scripts_of(first_id), [script]);
        assert!(state.scripts().scripts_of(second_id).is_empty());
    }
    #[test]
    fn scripts_need_live_owner() {
        let mut state = EditorState::default();
        let orphan = uuid::Uuid::new_v4();
        let add: Command = ScriptCommand::add(
            state.scripts(),
            orphan,
            Script::new("s", ScriptKind::Javascript, ""),
        )
        .into();
        assert_eq!(
            state.apply(DoUndo::Do(&add)),
            Err(CommandError::UnknownObject(orphan))
        );
        assert!(state.scripts().is_empty());
    }
}
