use super::{CommandConsumer, CommandError, CommandType, DoUndo, MergeKey};
use crate::{
    signal::Signal,
    state::{Geometry, Scene, Value},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Replaced {
        target: uuid::Uuid,
        old: Option<Geometry>,
        new: Option<Geometry>,
    },
    /// A generator parameter changed.
    ValueChanged {
        target: uuid::Uuid,
        attribute: String,
        old: Value,
        new: Value,
    },
}

impl Command {
    pub fn set_geometry(scene: &Scene, target: uuid::Uuid, new: Geometry) -> Result<Self, CommandError> {
        let old = scene
            .get(target)
            .ok_or(CommandError::UnknownObject(target))?
            .geometry
            .clone();
        Ok(Self::Replaced {
            target,
            old,
            new: Some(new),
        })
    }
    pub fn set_value(
        scene: &Scene,
        target: uuid::Uuid,
        attribute: impl Into<String>,
        new: impl Into<Value>,
    ) -> Result<Self, CommandError> {
        let attribute = attribute.into();
        let new = new.into();
        let geometry = scene
            .get(target)
            .ok_or(CommandError::UnknownObject(target))?
            .geometry
            .as_ref()
            .ok_or(CommandError::MissingGeometry(target))?;
        geometry.clone().set(&attribute, new.clone())?;
        Ok(Self::ValueChanged {
            target,
            old: geometry.get(&attribute),
            attribute,
            new,
        })
    }
    #[must_use]
    pub fn ty(&self) -> CommandType {
        match self {
            Self::Replaced { .. } => CommandType::SetGeometry,
            Self::ValueChanged { .. } => CommandType::SetGeometryValue,
        }
    }
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Replaced { .. } => "Set Geometry".to_owned(),
            Self::ValueChanged { attribute, .. } => format!("Set Geometry.{attribute}"),
        }
    }
    #[must_use]
    pub fn target(&self) -> uuid::Uuid {
        match self {
            Self::Replaced { target, .. } | Self::ValueChanged { target, .. } => *target,
        }
    }
    /// Only whole-geometry swaps merge, as when dragging a generator slider rebuilds the shape.
    #[must_use]
    pub fn merge_key(&self) -> Option<MergeKey<'_>> {
        match self {
            Self::Replaced { target, .. } => Some(MergeKey {
                ty: self.ty(),
                target: *target,
                attribute: None,
                script: None,
            }),
            Self::ValueChanged { .. } => None,
        }
    }
    pub(super) fn update(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Replaced { new, .. }, Self::Replaced { new: newer, .. }) => {
                new.clone_from(newer);
                true
            }
            _ => false,
        }
    }
}

impl CommandConsumer<Command> for Scene {
    fn apply(&mut self, command: DoUndo<'_, Command>) -> Result<Signal, CommandError> {
        match command {
            DoUndo::Do(Command::Replaced { target, new, .. })
            | DoUndo::Undo(Command::Replaced {
                target, old: new, ..
            }) => {
                self.get_mut(*target)
                    .ok_or(CommandError::UnknownObject(*target))?
                    .geometry
                    .clone_from(new);
                Ok(Signal::GeometryChanged(*target))
            }
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
                self.get_mut(*target)
                    .ok_or(CommandError::UnknownObject(*target))?
                    .geometry
                    .as_mut()
                    .ok_or(CommandError::MissingGeometry(*target))?
                    .set(attribute, new.clone())?;
                Ok(Signal::GeometryChanged(*target))
            }
        }
    }
}
