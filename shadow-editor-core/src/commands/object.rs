use super::{CommandConsumer, CommandError, CommandType, DoUndo, MergeKey};
use crate::{
    color::Color,
    signal::Signal,
    state::{Euler, Object3D, ObjectSnapshot, Scene, Value, Vector3},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Any attribute by name.
    ValueChanged {
        target: uuid::Uuid,
        attribute: String,
        old: Value,
        new: Value,
    },
    PositionChanged {
        target: uuid::Uuid,
        old: Vector3,
        new: Vector3,
    },
    RotationChanged {
        target: uuid::Uuid,
        old: Euler,
        new: Euler,
    },
    ScaleChanged {
        target: uuid::Uuid,
        old: Vector3,
        new: Vector3,
    },
    /// A color attribute, such as a light's `color`.
    ColorChanged {
        target: uuid::Uuid,
        attribute: String,
        old: Color,
        new: Color,
    },
    UuidChanged {
        old: uuid::Uuid,
        new: uuid::Uuid,
    },
    /// The subtree was inserted under `parent`, at `index` or last.
    Added {
        object: ObjectSnapshot,
        parent: uuid::Uuid,
        index: Option<usize>,
    },
    /// The subtree was detached from the `index`th child of `parent`.
    Removed {
        object: ObjectSnapshot,
        parent: uuid::Uuid,
        index: usize,
    },
    /// Indices are positions among siblings after the move, such that
    /// moving back to `old_parent` at `old_index` restores the original order.
    Moved {
        target: uuid::Uuid,
        old_parent: uuid::Uuid,
        old_index: usize,
        new_parent: uuid::Uuid,
        new_index: usize,
    },
}

fn lookup(scene: &Scene, target: uuid::Uuid) -> Result<&Object3D, CommandError> {
    scene.get(target).ok_or(CommandError::UnknownObject(target))
}
fn lookup_mut(scene: &mut Scene, target: uuid::Uuid) -> Result<&mut Object3D, CommandError> {
    scene
        .get_mut(target)
        .ok_or(CommandError::UnknownObject(target))
}

impl Command {
    /// Set an attribute by name, capturing its current value as the old one.
    pub fn set_value(
        scene: &Scene,
        target: uuid::Uuid,
        attribute: impl Into<String>,
        new: impl Into<Value>,
    ) -> Result<Self, CommandError> {
        let attribute = attribute.into();
        let new = new.into();
        let object = lookup(scene, target)?;
        Object3D::check_attribute(&attribute, &new)?;
        Ok(Self::ValueChanged {
            target,
            old: object.attribute(&attribute),
            attribute,
            new,
        })
    }
    pub fn set_position(scene: &Scene, target: uuid::Uuid, new: Vector3) -> Result<Self, CommandError> {
        let old = lookup(scene, target)?.position;
        Ok(Self::PositionChanged { target, old, new })
    }
    /// Set the position, with an explicit previous value. Used when the object was already
    /// moved live, e.g. by a gizmo, before the command was created.
    #[must_use]
    pub fn set_position_from(target: uuid::Uuid, old: Vector3, new: Vector3) -> Self {
        Self::PositionChanged { target, old, new }
    }
    pub fn set_rotation(scene: &Scene, target: uuid::Uuid, new: Euler) -> Result<Self, CommandError> {
        let old = lookup(scene, target)?.rotation;
        Ok(Self::RotationChanged { target, old, new })
    }
    #[must_use]
    pub fn set_rotation_from(target: uuid::Uuid, old: Euler, new: Euler) -> Self {
        Self::RotationChanged { target, old, new }
    }
    pub fn set_scale(scene: &Scene, target: uuid::Uuid, new: Vector3) -> Result<Self, CommandError> {
        let old = lookup(scene, target)?.scale;
        Ok(Self::ScaleChanged { target, old, new })
    }
    #[must_use]
    pub fn set_scale_from(target: uuid::Uuid, old: Vector3, new: Vector3) -> Self {
        Self::ScaleChanged { target, old, new }
    }
    pub fn set_color(
        scene: &Scene,
        target: uuid::Uuid,
        attribute: impl Into<String>,
        new: Color,
    ) -> Result<Self, CommandError> {
        let attribute = attribute.into();
        let old = lookup(scene, target)?.color(&attribute)?;
        Ok(Self::ColorChanged {
            target,
            attribute,
            old,
            new,
        })
    }
    pub fn set_uuid(scene: &Scene, target: uuid::Uuid, new: uuid::Uuid) -> Result<Self, CommandError> {
        lookup(scene, target)?;
        if target != new && scene.contains(new) {
            return Err(crate::state::SceneError::DuplicateUuid(new).into());
        }
        Ok(Self::UuidChanged { old: target, new })
    }
    /// Add a subtree as the last child of the scene root.
    #[must_use]
    pub fn add(scene: &Scene, object: impl Into<ObjectSnapshot>) -> Self {
        Self::Added {
            object: object.into(),
            parent: scene.root_uuid(),
            index: None,
        }
    }
    /// Add a subtree under a specific parent, at `index` or last.
    pub fn add_to(
        scene: &Scene,
        object: impl Into<ObjectSnapshot>,
        parent: uuid::Uuid,
        index: Option<usize>,
    ) -> Result<Self, CommandError> {
        lookup(scene, parent)?;
        Ok(Self::Added {
            object: object.into(),
            parent,
            index,
        })
    }
    /// Remove an object and its descendants from the scene.
    pub fn remove(scene: &Scene, target: uuid::Uuid) -> Result<Self, CommandError> {
        let object = scene
            .snapshot(target)
            .ok_or(CommandError::UnknownObject(target))?;
        let (parent, index) = scene
            .location_of(target)
            .ok_or(crate::state::SceneError::IsRoot)?;
        Ok(Self::Removed {
            object,
            parent,
            index,
        })
    }
    /// Move an object under `new_parent`, before the sibling `before` or last.
    pub fn move_to(
        scene: &Scene,
        target: uuid::Uuid,
        new_parent: uuid::Uuid,
        before: Option<uuid::Uuid>,
    ) -> Result<Self, CommandError> {
        let (old_parent, old_index) = scene.location_of(target).ok_or_else(|| {
            if scene.contains(target) {
                CommandError::from(crate::state::SceneError::IsRoot)
            } else {
                CommandError::UnknownObject(target)
            }
        })?;
        let siblings = scene
            .children_of(new_parent)
            .ok_or(CommandError::UnknownObject(new_parent))?
            .map(Object3D::uuid)
            .collect::<Vec<_>>();
        let mut new_index = match before {
            Some(before) => siblings
                .iter()
                .position(|sibling| *sibling == before)
                .ok_or(CommandError::MismatchedState)?,
            None => siblings.len(),
        };
        // The target itself is counted among the siblings, but won't be once moved.
        if old_parent == new_parent && new_index > old_index {
            new_index -= 1;
        }
        Ok(Self::Moved {
            target,
            old_parent,
            old_index,
            new_parent,
            new_index,
        })
    }
    #[must_use]
    pub fn ty(&self) -> CommandType {
        match self {
            Self::ValueChanged { .. } => CommandType::SetValue,
            Self::PositionChanged { .. } => CommandType::SetPosition,
            Self::RotationChanged { .. } => CommandType::SetRotation,
            Self::ScaleChanged { .. } => CommandType::SetScale,
            Self::ColorChanged { .. } => CommandType::SetColor,
            Self::UuidChanged { .. } => CommandType::SetUuid,
            Self::Added { .. } => CommandType::AddObject,
            Self::Removed { .. } => CommandType::RemoveObject,
            Self::Moved { .. } => CommandType::MoveObject,
        }
    }
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::ValueChanged { attribute, .. } | Self::ColorChanged { attribute, .. } => {
                format!("Set {attribute}")
            }
            Self::PositionChanged { .. } => "Set Position".to_owned(),
            Self::RotationChanged { .. } => "Set Rotation".to_owned(),
            Self::ScaleChanged { .. } => "Set Scale".to_owned(),
            Self::UuidChanged { .. } => "Update UUID".to_owned(),
            Self::Added { object, .. } => format!("Add Object: {}", object.object.name),
            Self::Removed { .. } => "Remove Object".to_owned(),
            Self::Moved { .. } => "Move Object".to_owned(),
        }
    }
    /// The object this command is about, as of before it executes.
    #[must_use]
    pub fn target(&self) -> uuid::Uuid {
        match self {
            Self::ValueChanged { target, .. }
            | Self::PositionChanged { target, .. }
            | Self::RotationChanged { target, .. }
            | Self::ScaleChanged { target, .. }
            | Self::ColorChanged { target, .. }
            | Self::Moved { target, .. } => *target,
            Self::UuidChanged { old, .. } => *old,
            Self::Added { object, .. } | Self::Removed { object, .. } => object.uuid(),
        }
    }
    #[must_use]
    pub fn merge_key(&self) -> Option<MergeKey<'_>> {
        let attribute = match self {
            Self::ValueChanged { attribute, .. } | Self::ColorChanged { attribute, .. } => {
                Some(attribute.as_str())
            }
            Self::PositionChanged { .. } | Self::RotationChanged { .. } | Self::ScaleChanged { .. } => None,
            Self::UuidChanged { .. } | Self::Added { .. } | Self::Removed { .. } | Self::Moved { .. } => {
                return None
            }
        };
        Some(MergeKey {
            ty: self.ty(),
            target: self.target(),
            attribute,
            script: None,
        })
    }
    /// Take the new value of `newer`. The old value stays, so undo reverts both.
    pub(super) fn update(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::ValueChanged { new, .. }, Self::ValueChanged { new: newer, .. }) => {
                new.clone_from(newer);
            }
            (Self::PositionChanged { new, .. }, Self::PositionChanged { new: newer, .. })
            | (Self::ScaleChanged { new, .. }, Self::ScaleChanged { new: newer, .. }) => {
                *new = *newer;
            }
            (Self::RotationChanged { new, .. }, Self::RotationChanged { new: newer, .. }) => {
                *new = *newer;
            }
            (Self::ColorChanged { new, .. }, Self::ColorChanged { new: newer, .. }) => {
                *new = *newer;
            }
            _ => return false,
        }
        true
    }
}

impl CommandConsumer<Command> for Scene {
    fn apply(&mut self, command: DoUndo<'_, Command>) -> Result<Signal, CommandError> {
        match command {
            DoUndo::Do(Command::ValueChanged {
                target,
                attribute,
                new,
                ..
            })
            | DoUndo::Undo(Command::ValueChanged {
                target,
                attribute,
                old: new,
                ..
            }) => {
                lookup_mut(self, *target)?.set_attribute(attribute, new.clone())?;
                Ok(Signal::ObjectChanged(*target))
            }
            DoUndo::Do(Command::PositionChanged { target, new, .. })
            | DoUndo::Undo(Command::PositionChanged {
                target, old: new, ..
            }) => {
                lookup_mut(self, *target)?.position = *new;
                Ok(Signal::ObjectChanged(*target))
            }
            DoUndo::Do(Command::RotationChanged { target, new, .. })
            | DoUndo::Undo(Command::RotationChanged {
                target, old: new, ..
            }) => {
                lookup_mut(self, *target)?.rotation = *new;
                Ok(Signal::ObjectChanged(*target))
            }
            DoUndo::Do(Command::ScaleChanged { target, new, .. })
            | DoUndo::Undo(Command::ScaleChanged {
                target, old: new, ..
            }) => {
                lookup_mut(self, *target)?.scale = *new;
                Ok(Signal::ObjectChanged(*target))
            }
            DoUndo::Do(Command::ColorChanged {
                target,
                attribute,
                new,
                ..
            })
            | DoUndo::Undo(Command::ColorChanged {
                target,
                attribute,
                old: new,
                ..
            }) => {
                let object = lookup_mut(self, *target)?;
                // Only ever replaces a color with a color.
                object.color(attribute)?;
                object.set_attribute(attribute, Value::from(*new))?;
                Ok(Signal::ObjectChanged(*target))
            }
            DoUndo::Do(Command::UuidChanged { old, new })
            | DoUndo::Undo(Command::UuidChanged { old: new, new: old }) => {
                self.set_uuid(*old, *new)?;
                Ok(Signal::ObjectChanged(*new))
            }
            DoUndo::Do(Command::Added {
                object,
                parent,
                index,
            }) => {
                self.attach(object.clone(), *parent, *index)?;
                Ok(Signal::ObjectAdded(object.uuid()))
            }
            DoUndo::Undo(Command::Added { object, parent, .. }) => {
                if self.parent_of(object.uuid()) != Some(*parent) {
                    return Err(CommandError::MismatchedState);
                }
                self.detach(object.uuid())?;
                Ok(Signal::ObjectRemoved(object.uuid()))
            }
            DoUndo::Do(Command::Removed {
                object,
                parent,
                index,
            }) => {
                if self.location_of(object.uuid()) != Some((*parent, *index)) {
                    return Err(CommandError::MismatchedState);
                }
                self.detach(object.uuid())?;
                Ok(Signal::ObjectRemoved(object.uuid()))
            }
            DoUndo::Undo(Command::Removed {
                object,
                parent,
                index,
            }) => {
                self.attach(object.clone(), *parent, Some(*index))?;
                Ok(Signal::ObjectAdded(object.uuid()))
            }
            DoUndo::Do(Command::Moved {
                target,
                old_parent,
                old_index,
                new_parent,
                new_index,
            })
            | DoUndo::Undo(Command::Moved {
                target,
                old_parent: new_parent,
                old_index: new_index,
                new_parent: old_parent,
                new_index: old_index,
            }) => {
                if self.location_of(*target) != Some((*old_parent, *old_index)) {
                    return Err(CommandError::MismatchedState);
                }
                self.move_to(*target, *new_parent, *new_index)?;
                Ok(Signal::SceneGraphChanged)
            }
        }
    }
}
