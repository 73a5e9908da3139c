use super::{CommandConsumer, CommandError, CommandType, DoUndo, MergeKey};
use crate::{
    signal::Signal,
    state::{Script, ScriptAttribute, ScriptLibrary},
};

/// Commands on the scripts attached to an object. `target` is the owning object.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Added {
        target: uuid::Uuid,
        script: Script,
        index: usize,
    },
    Removed {
        target: uuid::Uuid,
        script: Script,
        index: usize,
    },
    ValueChanged {
        target: uuid::Uuid,
        script: uuid::Uuid,
        attribute: ScriptAttribute,
        old: String,
        new: String,
    },
}

impl Command {
    /// Attach a script after the object's existing ones.
    #[must_use]
    pub fn add(scripts: &ScriptLibrary, target: uuid::Uuid, script: Script) -> Self {
        Self::Added {
            target,
            index: scripts.scripts_of(target).len(),
            script,
        }
    }
    pub fn remove(scripts: &ScriptLibrary, target: uuid::Uuid, script: uuid::Uuid) -> Result<Self, CommandError> {
        let index = scripts
            .index_of(target, script)
            .ok_or(CommandError::UnknownScript(script))?;
        Ok(Self::Removed {
            target,
            script: scripts.scripts_of(target)[index].clone(),
            index,
        })
    }
    pub fn set_value(
        scripts: &ScriptLibrary,
        target: uuid::Uuid,
        script: uuid::Uuid,
        attribute: ScriptAttribute,
        new: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let old = scripts
            .get(target, script)
            .ok_or(CommandError::UnknownScript(script))?
            .attribute(attribute)
            .to_owned();
        Ok(Self::ValueChanged {
            target,
            script,
            attribute,
            old,
            new: new.into(),
        })
    }
    #[must_use]
    pub fn ty(&self) -> CommandType {
        match self {
            Self::Added { .. } => CommandType::AddScript,
            Self::Removed { .. } => CommandType::RemoveScript,
            Self::ValueChanged { .. } => CommandType::SetScriptValue,
        }
    }
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Added { .. } => "Add Script".to_owned(),
            Self::Removed { .. } => "Remove Script".to_owned(),
            Self::ValueChanged { attribute, .. } => format!("Set Script.{attribute}"),
        }
    }
    #[must_use]
    pub fn target(&self) -> uuid::Uuid {
        match self {
            Self::Added { target, .. } | Self::Removed { target, .. } | Self::ValueChanged { target, .. } => {
                *target
            }
        }
    }
    #[must_use]
    pub fn merge_key(&self) -> Option<MergeKey<'_>> {
        match self {
            Self::ValueChanged {
                target,
                script,
                attribute,
                ..
            } => {
                let attribute: &'static str = (*attribute).into();
                Some(MergeKey {
                    ty: self.ty(),
                    target: *target,
                    attribute: Some(attribute),
                    script: Some(*script),
                })
            }
            Self::Added { .. } | Self::Removed { .. } => None,
        }
    }
    pub(super) fn update(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::ValueChanged { new, .. }, Self::ValueChanged { new: newer, .. }) => {
                new.clone_from(newer);
                true
            }
            _ => false,
        }
    }
}

impl CommandConsumer<Command> for ScriptLibrary {
    fn apply(&mut self, command: DoUndo<'_, Command>) -> Result<Signal, CommandError> {
        match command {
            DoUndo::Do(Command::Added {
                target,
                script,
                index,
            })
            | DoUndo::Undo(Command::Removed {
                target,
                script,
                index,
            }) => {
                if self.owner_of(script.uuid).is_some() {
                    return Err(CommandError::MismatchedState);
                }
                self.insert(*target, *index, script.clone());
                Ok(Signal::ScriptAdded {
                    object: *target,
                    script: script.uuid,
                })
            }
            DoUndo::Undo(Command::Added {
                target,
                script,
                index,
            })
            | DoUndo::Do(Command::Removed {
                target,
                script,
                index,
            }) => {
                if self.index_of(*target, script.uuid) != Some(*index) {
                    return Err(CommandError::MismatchedState);
                }
                self.remove(*target, script.uuid);
                Ok(Signal::ScriptRemoved {
                    object: *target,
                    script: script.uuid,
                })
            }
            DoUndo::Do(Command::ValueChanged {
                target,
                script,
                attribute,
                new,
                ..
            })
            | DoUndo::Undo(Command::ValueChanged {
                target,
                script,
                attribute,
                old: new,
                ..
            }) => {
                self.get_mut(*target, *script)
                    .ok_or(CommandError::UnknownScript(*script))?
                    .set_attribute(*attribute, new.clone());
                Ok(Signal::ScriptChanged {
                    object: *target,
                    script: *script,
                })
            }
        }
    }
}
