//! # Commands
//!
//! Commands are the way the state of the editor is modified. Every change the user can undo is
//! a command, carrying its target by uuid along with the value before and after the change.
//! Commands are applied through a [`CommandConsumer`], which either applies them fully or
//! leaves the state untouched.

pub mod geometry;
mod json;
pub mod material;
pub mod object;
pub mod script;

pub use geometry::Command as GeometryCommand;
pub use json::{
    CommandFactory, CommandHeader, CommandRegistry, DeserializeError, ReferenceError, Resolver, UNASSIGNED_ID,
};
pub use material::Command as MaterialCommand;
pub use object::Command as ObjectCommand;
pub use script::Command as ScriptCommand;

use crate::{
    signal::Signal,
    state::{AttributeError, ObjectSnapshot, SceneError, Value},
    EditorState,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("command constructed for a state that does not match the current state")]
    MismatchedState,
    #[error("object {0} is not in the scene")]
    UnknownObject(uuid::Uuid),
    #[error("script {0} not found")]
    UnknownScript(uuid::Uuid),
    #[error("object {0} has no material")]
    MissingMaterial(uuid::Uuid),
    #[error("object {0} has no geometry")]
    MissingGeometry(uuid::Uuid),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Scene(SceneError),
}
impl From<SceneError> for CommandError {
    fn from(value: SceneError) -> Self {
        match value {
            SceneError::NotFound(uuid) => Self::UnknownObject(uuid),
            other => Self::Scene(other),
        }
    }
}

pub trait CommandConsumer<C> {
    /// Apply a single command, returning the notification describing the change.
    /// If this generates an error, the state of `self` should *not* be observably changed.
    fn apply(&mut self, command: DoUndo<'_, C>) -> Result<Signal, CommandError>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScopeType {
    /// Several changes made as one user action.
    Multiple,
    /// A whole scene was imported over the current one.
    SetScene,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Object(ObjectCommand),
    Material(MaterialCommand),
    Geometry(GeometryCommand),
    Script(ScriptCommand),
    /// Bundle many commands into one group. Can be nested.
    /// Applied in order, undone in reverse, and treated as a single command as far as the user can tell.
    Scope(ScopeType, Box<[Command]>),
}
impl From<ObjectCommand> for Command {
    fn from(value: ObjectCommand) -> Self {
        Self::Object(value)
    }
}
impl From<MaterialCommand> for Command {
    fn from(value: MaterialCommand) -> Self {
        Self::Material(value)
    }
}
impl From<GeometryCommand> for Command {
    fn from(value: GeometryCommand) -> Self {
        Self::Geometry(value)
    }
}
impl From<ScriptCommand> for Command {
    fn from(value: ScriptCommand) -> Self {
        Self::Script(value)
    }
}

/// Type tag of a command, as persisted.
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
    strum::EnumIter,
)]
pub enum CommandType {
    #[strum(serialize = "SetValueCommand")]
    SetValue,
    #[strum(serialize = "SetPositionCommand")]
    SetPosition,
    #[strum(serialize = "SetRotationCommand")]
    SetRotation,
    #[strum(serialize = "SetScaleCommand")]
    SetScale,
    #[strum(serialize = "SetColorCommand")]
    SetColor,
    #[strum(serialize = "SetUuidCommand")]
    SetUuid,
    #[strum(serialize = "AddObjectCommand")]
    AddObject,
    #[strum(serialize = "RemoveObjectCommand")]
    RemoveObject,
    #[strum(serialize = "MoveObjectCommand")]
    MoveObject,
    #[strum(serialize = "SetMaterialCommand")]
    SetMaterial,
    #[strum(serialize = "SetMaterialValueCommand")]
    SetMaterialValue,
    #[strum(serialize = "SetMaterialColorCommand")]
    SetMaterialColor,
    #[strum(serialize = "SetMaterialMapCommand")]
    SetMaterialMap,
    #[strum(serialize = "SetGeometryCommand")]
    SetGeometry,
    #[strum(serialize = "SetGeometryValueCommand")]
    SetGeometryValue,
    #[strum(serialize = "AddScriptCommand")]
    AddScript,
    #[strum(serialize = "RemoveScriptCommand")]
    RemoveScript,
    #[strum(serialize = "SetScriptValueCommand")]
    SetScriptValue,
    #[strum(serialize = "MultiCmdsCommand")]
    MultiCmds,
    #[strum(serialize = "SetSceneCommand")]
    SetScene,
}

/// Two commands with equal keys act on the same thing, and the later may be folded into the earlier.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MergeKey<'c> {
    pub ty: CommandType,
    pub target: uuid::Uuid,
    pub attribute: Option<&'c str>,
    pub script: Option<uuid::Uuid>,
}

impl Command {
    #[must_use]
    pub fn object(&self) -> Option<&ObjectCommand> {
        match self {
            Self::Object(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn material(&self) -> Option<&MaterialCommand> {
        match self {
            Self::Material(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn geometry(&self) -> Option<&GeometryCommand> {
        match self {
            Self::Geometry(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn script(&self) -> Option<&ScriptCommand> {
        match self {
            Self::Script(c) => Some(c),
            _ => None,
        }
    }
    #[must_use]
    pub fn scope(&self) -> Option<(ScopeType, &[Command])> {
        match self {
            Self::Scope(ty, commands) => Some((*ty, &commands[..])),
            _ => None,
        }
    }
    /// Group several commands into one undo step.
    #[must_use]
    pub fn multiple(commands: impl IntoIterator<Item = Command>) -> Self {
        Self::Scope(ScopeType::Multiple, commands.into_iter().collect())
    }
    /// Replace the contents of the scene with an imported one.
    ///
    /// The current root takes on the imported root's uuid, name and user data, then each
    /// imported child is added in order. Objects already in the scene are kept.
    #[must_use]
    pub fn set_scene(state: &EditorState, imported: ObjectSnapshot) -> Self {
        let root = state.scene().root();
        let ObjectSnapshot { object, children } = imported;
        let new_root = object.uuid();
        let mut commands: Vec<Command> = Vec::with_capacity(children.len() + 3);
        if new_root != root.uuid() {
            commands.push(
                ObjectCommand::UuidChanged {
                    old: root.uuid(),
                    new: new_root,
                }
                .into(),
            );
        }
        // Runs after the uuid change, so these already address the new uuid.
        commands.push(
            ObjectCommand::ValueChanged {
                target: new_root,
                attribute: "name".to_owned(),
                old: Value::String(root.name.clone()),
                new: Value::String(object.name),
            }
            .into(),
        );
        commands.push(
            ObjectCommand::ValueChanged {
                target: new_root,
                attribute: "userData".to_owned(),
                old: Value::Json(root.user_data.clone()),
                new: Value::Json(object.user_data),
            }
            .into(),
        );
        commands.extend(children.into_iter().map(|child| {
            Command::from(ObjectCommand::Added {
                object: child,
                parent: new_root,
                index: None,
            })
        }));
        Self::Scope(ScopeType::SetScene, commands.into())
    }
    #[must_use]
    pub fn ty(&self) -> CommandType {
        match self {
            Self::Object(c) => c.ty(),
            Self::Material(c) => c.ty(),
            Self::Geometry(c) => c.ty(),
            Self::Script(c) => c.ty(),
            Self::Scope(ScopeType::Multiple, _) => CommandType::MultiCmds,
            Self::Scope(ScopeType::SetScene, _) => CommandType::SetScene,
        }
    }
    /// Default human-readable name.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Object(c) => c.label(),
            Self::Material(c) => c.label(),
            Self::Geometry(c) => c.label(),
            Self::Script(c) => c.label(),
            Self::Scope(ScopeType::Multiple, _) => "Multiple Changes".to_owned(),
            Self::Scope(ScopeType::SetScene, _) => "Set Scene".to_owned(),
        }
    }
    #[must_use]
    pub fn merge_key(&self) -> Option<MergeKey<'_>> {
        match self {
            Self::Object(c) => c.merge_key(),
            Self::Material(c) => c.merge_key(),
            Self::Geometry(c) => c.merge_key(),
            Self::Script(c) => c.merge_key(),
            Self::Scope(..) => None,
        }
    }
    /// Whether this command may be merged with its predecessor.
    #[must_use]
    pub fn is_updatable(&self) -> bool {
        self.merge_key().is_some()
    }
    /// Script edits merge no matter how long ago the previous one was.
    #[must_use]
    pub fn ignores_merge_window(&self) -> bool {
        self.ty() == CommandType::SetScriptValue
    }
    #[must_use]
    pub fn can_merge(&self, newer: &Self) -> bool {
        match (self.merge_key(), newer.merge_key()) {
            (Some(this), Some(newer)) => this == newer,
            _ => false,
        }
    }
    /// Fold a newer command of the same key into this one, so that this command goes from its
    /// own old value to `newer`'s new value. Returns false, changing nothing, if the two can't merge.
    pub fn update(&mut self, newer: &Self) -> bool {
        if !self.can_merge(newer) {
            return false;
        }
        match (self, newer) {
            (Self::Object(this), Self::Object(newer)) => this.update(newer),
            (Self::Material(this), Self::Material(newer)) => this.update(newer),
            (Self::Geometry(this), Self::Geometry(newer)) => this.update(newer),
            (Self::Script(this), Self::Script(newer)) => this.update(newer),
            _ => false,
        }
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum DoUndo<'c, T> {
    Do(&'c T),
    Undo(&'c T),
}
// Derive would needlessly require `T: Copy`.
impl<T> Clone for DoUndo<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for DoUndo<'_, T> {}
impl<'c, T> DoUndo<'c, T> {
    /// Apply a closure to the inner type T, maintaining the
    /// Do or Undo status. Returns None if the closure returns None.
    pub fn filter_map<Func, Return>(&self, f: Func) -> Option<DoUndo<'c, Return>>
    where
        Func: FnOnce(&'c T) -> Option<&'c Return>,
        Return: 'c,
    {
        match self {
            Self::Do(c) => Some(DoUndo::Do(f(c)?)),
            Self::Undo(c) => Some(DoUndo::Undo(f(c)?)),
        }
    }
    /// The same direction, applied to another command.
    #[must_use]
    pub fn rewrap<Other>(&self, other: &'c Other) -> DoUndo<'c, Other> {
        match self {
            Self::Do(_) => DoUndo::Do(other),
            Self::Undo(_) => DoUndo::Undo(other),
        }
    }
    /// The opposite direction, which reverts `self`.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Do(c) => Self::Undo(c),
            Self::Undo(c) => Self::Do(c),
        }
    }
    #[must_use]
    pub fn inner(&self) -> &'c T {
        match self {
            Self::Do(c) | Self::Undo(c) => c,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::{Object3D, ObjectKind, Vector3};

    #[test]
    fn type_tags() {
        assert_eq!(CommandType::SetPosition.to_string(), "SetPositionCommand");
        assert_eq!(
            "MultiCmdsCommand".parse::<CommandType>().ok(),
            Some(CommandType::MultiCmds)
        );
        assert!("SetNothingCommand".parse::<CommandType>().is_err());
    }
    #[test]
    fn update_only_same_key() {
        let target = uuid::Uuid::new_v4();
        let mut first: Command = ObjectCommand::set_position_from(target, Vector3::ZERO, Vector3::ONE).into();
        let second: Command = ObjectCommand::set_position_from(target, Vector3::ONE, Vector3::splat(2.0)).into();
        let other: Command =
            ObjectCommand::set_position_from(uuid::Uuid::new_v4(), Vector3::ZERO, Vector3::ONE).into();
        assert!(!first.update(&other));
        assert!(first.update(&second));
        assert_eq!(
            first,
            Command::from(ObjectCommand::set_position_from(
                target,
                Vector3::ZERO,
                Vector3::splat(2.0)
            ))
        );
        assert!(!Command::multiple([first.clone()]).is_updatable());
    }
    #[test]
    fn set_scene_expansion() {
        let state = EditorState::default();
        let imported_root = Object3D::new(ObjectKind::Scene).with_name("Imported");
        let child_a = Object3D::new(ObjectKind::Group).with_name("a");
        let child_b = Object3D::new(ObjectKind::Group).with_name("b");
        let (a, b) = (child_a.uuid(), child_b.uuid());
        let command = Command::set_scene(
            &state,
            ObjectSnapshot::new(imported_root)
                .with_child(child_a)
                .with_child(child_b),
        );
        assert_eq!(command.label(), "Set Scene");
        let (ty, commands) = command.scope().unwrap();
        assert_eq!(ty, ScopeType::SetScene);
        let types = commands.iter().map(Command::ty).collect::<Vec<_>>();
        assert_eq!(
            types,
            [
                CommandType::SetUuid,
                CommandType::SetValue,
                CommandType::SetValue,
                CommandType::AddObject,
                CommandType::AddObject
            ]
        );
        // Children keep their order.
        let added = commands[3..]
            .iter()
            .filter_map(Command::object)
            .map(ObjectCommand::target)
            .collect::<Vec<_>>();
        assert_eq!(added, [a, b]);
    }
}
