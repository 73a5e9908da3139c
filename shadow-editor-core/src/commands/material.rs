use super::{CommandConsumer, CommandError, CommandType, DoUndo, MergeKey};
use crate::{
    color::Color,
    signal::Signal,
    state::{material, Material, Scene, Texture, Value},
};

/// Commands on the material of a mesh. `target` is always the object owning the material.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// The whole material was swapped out.
    Replaced {
        target: uuid::Uuid,
        old: Option<Material>,
        new: Option<Material>,
    },
    ValueChanged {
        target: uuid::Uuid,
        attribute: String,
        old: Value,
        new: Value,
    },
    ColorChanged {
        target: uuid::Uuid,
        attribute: String,
        old: Color,
        new: Color,
    },
    /// A texture slot was filled, emptied or swapped. `None` is an empty slot.
    MapChanged {
        target: uuid::Uuid,
        slot: String,
        old: Option<Texture>,
        new: Option<Texture>,
    },
}

fn material_of(scene: &Scene, target: uuid::Uuid) -> Result<&Material, CommandError> {
    scene
        .get(target)
        .ok_or(CommandError::UnknownObject(target))?
        .material
        .as_ref()
        .ok_or(CommandError::MissingMaterial(target))
}
fn material_of_mut(scene: &mut Scene, target: uuid::Uuid) -> Result<&mut Material, CommandError> {
    scene
        .get_mut(target)
        .ok_or(CommandError::UnknownObject(target))?
        .material
        .as_mut()
        .ok_or(CommandError::MissingMaterial(target))
}

impl Command {
    /// Replace the object's material. The object need not have one yet.
    pub fn set_material(scene: &Scene, target: uuid::Uuid, new: Material) -> Result<Self, CommandError> {
        let old = scene
            .get(target)
            .ok_or(CommandError::UnknownObject(target))?
            .material
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
        let material = material_of(scene, target)?;
        let new = new.into();
        // Dry run on a copy, surfacing read-only or mistyped writes now rather than at execute.
        material.clone().set(&attribute, new.clone())?;
        Ok(Self::ValueChanged {
            target,
            old: material.get(&attribute),
            attribute,
            new,
        })
    }
    pub fn set_color(
        scene: &Scene,
        target: uuid::Uuid,
        attribute: impl Into<String>,
        new: Color,
    ) -> Result<Self, CommandError> {
        let attribute = attribute.into();
        let old = material_of(scene, target)?.color(&attribute)?;
        Ok(Self::ColorChanged {
            target,
            attribute,
            old,
            new,
        })
    }
    pub fn set_map(
        scene: &Scene,
        target: uuid::Uuid,
        slot: impl Into<String>,
        new: Option<Texture>,
    ) -> Result<Self, CommandError> {
        let slot = slot.into();
        material::check_slot(&slot)?;
        let old = material_of(scene, target)?.map(&slot).cloned();
        Ok(Self::MapChanged {
            target,
            slot,
            old,
            new,
        })
    }
    #[must_use]
    pub fn ty(&self) -> CommandType {
        match self {
            Self::Replaced { .. } => CommandType::SetMaterial,
            Self::ValueChanged { .. } => CommandType::SetMaterialValue,
            Self::ColorChanged { .. } => CommandType::SetMaterialColor,
            Self::MapChanged { .. } => CommandType::SetMaterialMap,
        }
    }
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Replaced { .. } => "New Material".to_owned(),
            Self::ValueChanged { attribute, .. } | Self::ColorChanged { attribute, .. } => {
                format!("Set Material.{attribute}")
            }
            Self::MapChanged { slot, .. } => format!("Set Material.{slot}"),
        }
    }
    #[must_use]
    pub fn target(&self) -> uuid::Uuid {
        match self {
            Self::Replaced { target, .. }
            | Self::ValueChanged { target, .. }
            | Self::ColorChanged { target, .. }
            | Self::MapChanged { target, .. } => *target,
        }
    }
    #[must_use]
    pub fn merge_key(&self) -> Option<MergeKey<'_>> {
        match self {
            Self::ValueChanged { target, attribute, .. } | Self::ColorChanged { target, attribute, .. } => {
                Some(MergeKey {
                    ty: self.ty(),
                    target: *target,
                    attribute: Some(attribute.as_str()),
                    script: None,
                })
            }
            Self::Replaced { .. } | Self::MapChanged { .. } => None,
        }
    }
    pub(super) fn update(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::ValueChanged { new, .. }, Self::ValueChanged { new: newer, .. }) => {
                new.clone_from(newer);
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
            DoUndo::Do(Command::Replaced { target, new, .. })
            | DoUndo::Undo(Command::Replaced {
                target, old: new, ..
            }) => {
                let object = self.get_mut(*target).ok_or(CommandError::UnknownObject(*target))?;
                let version = object.material.as_ref().map_or(0, Material::version);
                object.material.clone_from(new);
                if let Some(material) = object.material.as_mut() {
                    material.supersede(version);
                }
                Ok(Signal::MaterialChanged(*target))
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
                material_of_mut(self, *target)?.set(attribute, new.clone())?;
                Ok(Signal::MaterialChanged(*target))
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
                let material = material_of_mut(self, *target)?;
                material.color(attribute)?;
                material.set(attribute, Value::from(*new))?;
                Ok(Signal::MaterialChanged(*target))
            }
            DoUndo::Do(Command::MapChanged {
                target, slot, new, ..
            })
            | DoUndo::Undo(Command::MapChanged {
                target,
                slot,
                old: new,
                ..
            }) => {
                material_of_mut(self, *target)?.set_map(slot, new.clone())?;
                Ok(Signal::MaterialChanged(*target))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::state::{Geometry, MaterialKind, Object3D, ObjectKind};

    fn scene_with_mesh() -> (Scene, uuid::Uuid) {
        let mut scene = Scene::default();
        let mesh = Object3D::mesh(
            Geometry::unit_box(),
            Material::new(MaterialKind::MeshStandardMaterial),
        );
        let uuid = mesh.uuid();
        scene.attach(mesh.into(), scene.root_uuid(), None).unwrap();
        (scene, uuid)
    }

    #[test]
    fn value_bumps_version_and_undoes() {
        let (mut scene, mesh) = scene_with_mesh();
        let command = Command::set_value(&scene, mesh, "opacity", 0.25).unwrap();
        assert_eq!(command.label(), "Set Material.opacity");
        scene.apply(DoUndo::Do(&command)).unwrap();
        let material = scene.get(mesh).unwrap().material.as_ref().unwrap();
        assert_eq!(material.get("opacity"), Value::Number(0.25));
        let version = material.version();

        scene.apply(DoUndo::Undo(&command)).unwrap();
        let material = scene.get(mesh).unwrap().material.as_ref().unwrap();
        assert_eq!(material.get("opacity"), Value::Number(1.0));
        assert!(material.version() > version);
    }
    #[test]
    fn read_only_rejected_up_front() {
        let (scene, mesh) = scene_with_mesh();
        assert!(Command::set_value(&scene, mesh, "type", "x").is_err());
        let bare = Object3D::new(ObjectKind::Group);
        let mut scene = scene;
        let bare_id = bare.uuid();
        scene.attach(bare.into(), scene.root_uuid(), None).unwrap();
        assert_eq!(
            Command::set_value(&scene, bare_id, "opacity", 1.0),
            Err(CommandError::MissingMaterial(bare_id))
        );
    }
    #[test]
    fn map_slot_null_allowed() {
        let (mut scene, mesh) = scene_with_mesh();
        let texture = Texture::new("wood.jpg");
        let fill = Command::set_map(&scene, mesh, "map", Some(texture.clone())).unwrap();
        scene.apply(DoUndo::Do(&fill)).unwrap();
        let empty = Command::set_map(&scene, mesh, "map", None).unwrap();
        assert_eq!(empty.label(), "Set Material.map");
        scene.apply(DoUndo::Do(&empty)).unwrap();
        assert!(scene.get(mesh).unwrap().material.as_ref().unwrap().map("map").is_none());

        scene.apply(DoUndo::Undo(&empty)).unwrap();
        assert_eq!(
            scene.get(mesh).unwrap().material.as_ref().unwrap().map("map"),
            Some(&texture)
        );
        assert!(Command::set_map(&scene, mesh, "bogusMap", None).is_err());
    }
    #[test]
    fn replace_whole_material() {
        let (mut scene, mesh) = scene_with_mesh();
        let before = scene.get(mesh).unwrap().material.clone();
        let phong = Material::new(MaterialKind::MeshPhongMaterial);
        let command = Command::set_material(&scene, mesh, phong.clone()).unwrap();
        assert_eq!(command.label(), "New Material");
        scene.apply(DoUndo::Do(&command)).unwrap();
        let material = |scene: &Scene| scene.get(mesh).unwrap().material.clone().unwrap();
        assert_eq!(material(&scene).kind(), MaterialKind::MeshPhongMaterial);
        assert_eq!(material(&scene).uuid(), phong.uuid());
        let replaced = material(&scene).version();
        assert!(replaced > before.as_ref().unwrap().version());

        // Undoing still moves the version forward.
        scene.apply(DoUndo::Undo(&command)).unwrap();
        let restored = material(&scene);
        assert_eq!(restored.uuid(), before.as_ref().unwrap().uuid());
        assert_eq!(restored.get("color"), before.as_ref().unwrap().get("color"));
        assert!(restored.version() > replaced);
    }
    #[test]
    fn color_merges_by_attribute() {
        let (scene, mesh) = scene_with_mesh();
        let mut first = Command::set_color(&scene, mesh, "color", Color::BLACK).unwrap();
        let second = Command::set_color(&scene, mesh, "color", Color::from_hex(0x12_3456)).unwrap();
        assert_eq!(first.merge_key(), second.merge_key());
        assert!(first.update(&second));
        assert!(matches!(
            first,
            Command::ColorChanged { old, new, .. } if old == Color::WHITE && new == Color::from_hex(0x12_3456)
        ));
    }
}
