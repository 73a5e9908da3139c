//! Persisted form of commands.
//!
//! A command is stored as a flat JSON object: a header of `type`, `id` and `name`, followed by
//! the fields of its variant. Reading one back goes through a [`CommandRegistry`], which maps the
//! `type` tag to a factory and resolves the uuids the command refers to against the live state.

use serde::Deserialize;
use strum::IntoEnumIterator;

use super::{Command, CommandType, GeometryCommand, MaterialCommand, ObjectCommand, ScopeType, ScriptCommand};
use crate::{
    color::Color,
    state::{Euler, Geometry, Material, ObjectSnapshot, Script, ScriptAttribute, Texture, Value, Vector3},
    EditorState,
};

/// Id carried by commands that are not history entries of their own, such as the parts of a scope.
pub const UNASSIGNED_ID: i64 = -1;

fn unassigned() -> i64 {
    UNASSIGNED_ID
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommandHeader {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default = "unassigned")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("object {0} could not be resolved")]
    Object(uuid::Uuid),
    #[error("script {0} could not be resolved")]
    Script(uuid::Uuid),
}

#[derive(thiserror::Error, Debug)]
pub enum DeserializeError {
    #[error("command has no valid header: {0}")]
    Header(#[source] serde_json::Error),
    #[error("command id {0} is not a valid history id")]
    InvalidId(i64),
    #[error("no command registered for type {0:?}")]
    UnknownType(String),
    #[error("malformed {ty}: {source}")]
    Malformed {
        ty: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Resolves the references of a command being read against the state it will apply to.
#[derive(Copy, Clone)]
pub struct Resolver<'s> {
    state: &'s EditorState,
    /// Parts of a scope apply to intermediate states that don't exist yet, so their
    /// references are checked when the scope is applied instead.
    strict: bool,
}
impl<'s> Resolver<'s> {
    #[must_use]
    pub fn new(state: &'s EditorState) -> Self {
        Self { state, strict: true }
    }
    #[must_use]
    pub fn state(&self) -> &'s EditorState {
        self.state
    }
    /// A resolver for the parts of a scope.
    #[must_use]
    pub fn nested(self) -> Self {
        Self {
            strict: false,
            ..self
        }
    }
    pub fn object(&self, uuid: uuid::Uuid) -> Result<uuid::Uuid, ReferenceError> {
        if !self.strict || self.state.scene().contains(uuid) {
            Ok(uuid)
        } else {
            Err(ReferenceError::Object(uuid))
        }
    }
    /// The given parent if it resolves, else the scene root.
    #[must_use]
    pub fn parent_or_root(&self, parent: Option<uuid::Uuid>) -> uuid::Uuid {
        match parent {
            Some(parent) if !self.strict || self.state.scene().contains(parent) => parent,
            _ => self.state.scene().root_uuid(),
        }
    }
    pub fn script(&self, object: uuid::Uuid, script: uuid::Uuid) -> Result<uuid::Uuid, ReferenceError> {
        if !self.strict || self.state.scripts().get(object, script).is_some() {
            Ok(script)
        } else {
            Err(ReferenceError::Script(script))
        }
    }
    /// The live subtree if the snapshot's object is in the scene, else the snapshot itself.
    pub fn snapshot(&self, raw: &serde_json::Value) -> Result<ObjectSnapshot, ReferenceError> {
        let uuid = raw
            .pointer("/object/uuid")
            .and_then(serde_json::Value::as_str)
            .and_then(|uuid| uuid.parse::<uuid::Uuid>().ok());
        if let Some(live) = uuid.and_then(|uuid| self.state.scene().snapshot(uuid)) {
            return Ok(live);
        }
        ObjectSnapshot::deserialize(raw).map_err(|_| ReferenceError::Object(uuid.unwrap_or_default()))
    }
}

/// Builds a command from its persisted form.
pub type CommandFactory =
    fn(&CommandRegistry, Resolver<'_>, &serde_json::Value) -> Result<Command, DeserializeError>;

/// Explicit map from persisted type tag to the factory reading it back.
#[derive(Clone)]
pub struct CommandRegistry {
    factories: hashbrown::HashMap<String, CommandFactory>,
}
impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
impl CommandRegistry {
    /// A registry that knows no commands.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: hashbrown::HashMap::new(),
        }
    }
    /// A registry that knows every built-in command.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for ty in CommandType::iter() {
            registry.register(ty.to_string(), factory(ty));
        }
        registry
    }
    /// Register a factory for a type tag, returning the one it replaced.
    pub fn register(&mut self, ty: impl Into<String>, factory: CommandFactory) -> Option<CommandFactory> {
        self.factories.insert(ty.into(), factory)
    }
    #[must_use]
    pub fn contains(&self, ty: &str) -> bool {
        self.factories.contains_key(ty)
    }
    pub fn header(json: &serde_json::Value) -> Result<CommandHeader, DeserializeError> {
        CommandHeader::deserialize(json).map_err(DeserializeError::Header)
    }
    /// Check the header of a persisted command, and that its type is known. Its fields are not read.
    pub fn validate(&self, json: &serde_json::Value) -> Result<CommandHeader, DeserializeError> {
        let header = Self::header(json)?;
        if self.contains(&header.ty) {
            Ok(header)
        } else {
            Err(DeserializeError::UnknownType(header.ty))
        }
    }
    /// Read a command, resolving its references against `state`.
    pub fn deserialize(&self, state: &EditorState, json: &serde_json::Value) -> Result<Command, DeserializeError> {
        self.deserialize_with(Resolver::new(state), json)
    }
    pub fn deserialize_with(
        &self,
        resolver: Resolver<'_>,
        json: &serde_json::Value,
    ) -> Result<Command, DeserializeError> {
        let header = Self::header(json)?;
        let factory = self
            .factories
            .get(&header.ty)
            .ok_or(DeserializeError::UnknownType(header.ty))?;
        factory(self, resolver, json)
    }
}

impl Command {
    /// The persisted form of this command, with the given history id and display name.
    pub fn to_json(&self, id: i64, name: &str) -> Result<serde_json::Value, serde_json::Error> {
        let mut json = payload(self)?;
        let header = serde_json::to_value(CommandHeader {
            ty: self.ty().to_string(),
            id,
            name: name.to_owned(),
        })?;
        if let (serde_json::Value::Object(body), serde_json::Value::Object(header)) = (&mut json, header) {
            body.extend(header);
        }
        Ok(json)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValuePayload {
    object_uuid: uuid::Uuid,
    attribute_name: String,
    #[serde(default)]
    old_value: Value,
    #[serde(default)]
    new_value: Value,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorPayload {
    object_uuid: uuid::Uuid,
    attribute_name: String,
    old_value: Color,
    new_value: Color,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionPayload {
    object_uuid: uuid::Uuid,
    old_position: Vector3,
    new_position: Vector3,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RotationPayload {
    object_uuid: uuid::Uuid,
    old_rotation: Euler,
    new_rotation: Euler,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScalePayload {
    object_uuid: uuid::Uuid,
    old_scale: Vector3,
    new_scale: Vector3,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UuidPayload {
    old_uuid: uuid::Uuid,
    new_uuid: uuid::Uuid,
}
/// `object` is kept raw, it is only parsed when the object isn't live.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddPayload {
    object: serde_json::Value,
    #[serde(default)]
    parent_uuid: Option<uuid::Uuid>,
    #[serde(default)]
    index: Option<usize>,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemovePayload {
    object: serde_json::Value,
    #[serde(default)]
    parent_uuid: Option<uuid::Uuid>,
    index: usize,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovePayload {
    object_uuid: uuid::Uuid,
    #[serde(default)]
    old_parent_uuid: Option<uuid::Uuid>,
    old_index: usize,
    #[serde(default)]
    new_parent_uuid: Option<uuid::Uuid>,
    new_index: usize,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialPayload {
    object_uuid: uuid::Uuid,
    #[serde(default)]
    old_material: Option<Material>,
    #[serde(default)]
    new_material: Option<Material>,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapPayload {
    object_uuid: uuid::Uuid,
    map_name: String,
    #[serde(default)]
    old_map: Option<Texture>,
    #[serde(default)]
    new_map: Option<Texture>,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeometryPayload {
    object_uuid: uuid::Uuid,
    #[serde(default)]
    old_geometry: Option<Geometry>,
    #[serde(default)]
    new_geometry: Option<Geometry>,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptPayload {
    object_uuid: uuid::Uuid,
    script: Script,
    index: usize,
}
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptValuePayload {
    object_uuid: uuid::Uuid,
    script_uuid: uuid::Uuid,
    attribute_name: ScriptAttribute,
    old_value: String,
    new_value: String,
}
#[derive(serde::Serialize, serde::Deserialize)]
struct ScopePayload {
    cmds: Vec<serde_json::Value>,
}

/// The variant fields of a command.
fn payload(command: &Command) -> Result<serde_json::Value, serde_json::Error> {
    use serde_json::to_value;
    match command {
        Command::Object(ObjectCommand::ValueChanged {
            target,
            attribute,
            old,
            new,
        })
        | Command::Material(MaterialCommand::ValueChanged {
            target,
            attribute,
            old,
            new,
        })
        | Command::Geometry(GeometryCommand::ValueChanged {
            target,
            attribute,
            old,
            new,
        }) => to_value(ValuePayload {
            object_uuid: *target,
            attribute_name: attribute.clone(),
            old_value: old.clone(),
            new_value: new.clone(),
        }),
        Command::Object(ObjectCommand::ColorChanged {
            target,
            attribute,
            old,
            new,
        })
        | Command::Material(MaterialCommand::ColorChanged {
            target,
            attribute,
            old,
            new,
        }) => to_value(ColorPayload {
            object_uuid: *target,
            attribute_name: attribute.clone(),
            old_value: *old,
            new_value: *new,
        }),
        Command::Object(ObjectCommand::PositionChanged { target, old, new }) => to_value(PositionPayload {
            object_uuid: *target,
            old_position: *old,
            new_position: *new,
        }),
        Command::Object(ObjectCommand::RotationChanged { target, old, new }) => to_value(RotationPayload {
            object_uuid: *target,
            old_rotation: *old,
            new_rotation: *new,
        }),
        Command::Object(ObjectCommand::ScaleChanged { target, old, new }) => to_value(ScalePayload {
            object_uuid: *target,
            old_scale: *old,
            new_scale: *new,
        }),
        Command::Object(ObjectCommand::UuidChanged { old, new }) => to_value(UuidPayload {
            old_uuid: *old,
            new_uuid: *new,
        }),
        Command::Object(ObjectCommand::Added {
            object,
            parent,
            index,
        }) => to_value(AddPayload {
            object: to_value(object)?,
            parent_uuid: Some(*parent),
            index: *index,
        }),
        Command::Object(ObjectCommand::Removed {
            object,
            parent,
            index,
        }) => to_value(RemovePayload {
            object: to_value(object)?,
            parent_uuid: Some(*parent),
            index: *index,
        }),
        Command::Object(ObjectCommand::Moved {
            target,
            old_parent,
            old_index,
            new_parent,
            new_index,
        }) => to_value(MovePayload {
            object_uuid: *target,
            old_parent_uuid: Some(*old_parent),
            old_index: *old_index,
            new_parent_uuid: Some(*new_parent),
            new_index: *new_index,
        }),
        Command::Material(MaterialCommand::Replaced { target, old, new }) => to_value(MaterialPayload {
            object_uuid: *target,
            old_material: old.clone(),
            new_material: new.clone(),
        }),
        Command::Material(MaterialCommand::MapChanged {
            target,
            slot,
            old,
            new,
        }) => to_value(MapPayload {
            object_uuid: *target,
            map_name: slot.clone(),
            old_map: old.clone(),
            new_map: new.clone(),
        }),
        Command::Geometry(GeometryCommand::Replaced { target, old, new }) => to_value(GeometryPayload {
            object_uuid: *target,
            old_geometry: old.clone(),
            new_geometry: new.clone(),
        }),
        Command::Script(
            ScriptCommand::Added {
                target,
                script,
                index,
            }
            | ScriptCommand::Removed {
                target,
                script,
                index,
            },
        ) => to_value(ScriptPayload {
            object_uuid: *target,
            script: script.clone(),
            index: *index,
        }),
        Command::Script(ScriptCommand::ValueChanged {
            target,
            script,
            attribute,
            old,
            new,
        }) => to_value(ScriptValuePayload {
            object_uuid: *target,
            script_uuid: *script,
            attribute_name: *attribute,
            old_value: old.clone(),
            new_value: new.clone(),
        }),
        Command::Scope(_, commands) => to_value(ScopePayload {
            cmds: commands
                .iter()
                .map(|command| command.to_json(UNASSIGNED_ID, &command.label()))
                .collect::<Result<_, _>>()?,
        }),
    }
}

fn parse<P: serde::de::DeserializeOwned>(ty: CommandType, json: &serde_json::Value) -> Result<P, DeserializeError> {
    P::deserialize(json).map_err(|source| DeserializeError::Malformed {
        ty: ty.to_string(),
        source,
    })
}

fn factory(ty: CommandType) -> CommandFactory {
    match ty {
        CommandType::SetValue => read_set_value,
        CommandType::SetPosition => read_set_position,
        CommandType::SetRotation => read_set_rotation,
        CommandType::SetScale => read_set_scale,
        CommandType::SetColor => read_set_color,
        CommandType::SetUuid => read_set_uuid,
        CommandType::AddObject => read_add_object,
        CommandType::RemoveObject => read_remove_object,
        CommandType::MoveObject => read_move_object,
        CommandType::SetMaterial => read_set_material,
        CommandType::SetMaterialValue => read_set_material_value,
        CommandType::SetMaterialColor => read_set_material_color,
        CommandType::SetMaterialMap => read_set_material_map,
        CommandType::SetGeometry => read_set_geometry,
        CommandType::SetGeometryValue => read_set_geometry_value,
        CommandType::AddScript => read_add_script,
        CommandType::RemoveScript => read_remove_script,
        CommandType::SetScriptValue => read_set_script_value,
        CommandType::MultiCmds => read_multi_cmds,
        CommandType::SetScene => read_set_scene,
    }
}

fn read_set_value(_: &CommandRegistry, resolver: Resolver<'_>, json: &serde_json::Value) -> Result<Command, DeserializeError> {
    let p: ValuePayload = parse(CommandType::SetValue, json)?;
    Ok(ObjectCommand::ValueChanged {
        target: resolver.object(p.object_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
fn read_set_position(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: PositionPayload = parse(CommandType::SetPosition, json)?;
    Ok(ObjectCommand::PositionChanged {
        target: resolver.object(p.object_uuid)?,
        old: p.old_position,
        new: p.new_position,
    }
    .into())
}
fn read_set_rotation(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: RotationPayload = parse(CommandType::SetRotation, json)?;
    Ok(ObjectCommand::RotationChanged {
        target: resolver.object(p.object_uuid)?,
        old: p.old_rotation,
        new: p.new_rotation,
    }
    .into())
}
fn read_set_scale(_: &CommandRegistry, resolver: Resolver<'_>, json: &serde_json::Value) -> Result<Command, DeserializeError> {
    let p: ScalePayload = parse(CommandType::SetScale, json)?;
    Ok(ObjectCommand::ScaleChanged {
        target: resolver.object(p.object_uuid)?,
        old: p.old_scale,
        new: p.new_scale,
    }
    .into())
}
fn read_set_color(_: &CommandRegistry, resolver: Resolver<'_>, json: &serde_json::Value) -> Result<Command, DeserializeError> {
    let p: ColorPayload = parse(CommandType::SetColor, json)?;
    Ok(ObjectCommand::ColorChanged {
        target: resolver.object(p.object_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
/// Resolves whichever of the two uuids the object currently has.
fn read_set_uuid(_: &CommandRegistry, resolver: Resolver<'_>, json: &serde_json::Value) -> Result<Command, DeserializeError> {
    let p: UuidPayload = parse(CommandType::SetUuid, json)?;
    resolver
        .object(p.old_uuid)
        .or_else(|_| resolver.object(p.new_uuid))?;
    Ok(ObjectCommand::UuidChanged {
        old: p.old_uuid,
        new: p.new_uuid,
    }
    .into())
}
fn read_add_object(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: AddPayload = parse(CommandType::AddObject, json)?;
    Ok(ObjectCommand::Added {
        object: resolver.snapshot(&p.object)?,
        parent: resolver.parent_or_root(p.parent_uuid),
        index: p.index,
    }
    .into())
}
fn read_remove_object(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: RemovePayload = parse(CommandType::RemoveObject, json)?;
    Ok(ObjectCommand::Removed {
        object: resolver.snapshot(&p.object)?,
        parent: resolver.parent_or_root(p.parent_uuid),
        index: p.index,
    }
    .into())
}
fn read_move_object(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: MovePayload = parse(CommandType::MoveObject, json)?;
    Ok(ObjectCommand::Moved {
        target: resolver.object(p.object_uuid)?,
        old_parent: resolver.parent_or_root(p.old_parent_uuid),
        old_index: p.old_index,
        new_parent: resolver.parent_or_root(p.new_parent_uuid),
        new_index: p.new_index,
    }
    .into())
}
fn read_set_material(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: MaterialPayload = parse(CommandType::SetMaterial, json)?;
    Ok(MaterialCommand::Replaced {
        target: resolver.object(p.object_uuid)?,
        old: p.old_material,
        new: p.new_material,
    }
    .into())
}
fn read_set_material_value(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ValuePayload = parse(CommandType::SetMaterialValue, json)?;
    Ok(MaterialCommand::ValueChanged {
        target: resolver.object(p.object_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
fn read_set_material_color(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ColorPayload = parse(CommandType::SetMaterialColor, json)?;
    Ok(MaterialCommand::ColorChanged {
        target: resolver.object(p.object_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
fn read_set_material_map(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: MapPayload = parse(CommandType::SetMaterialMap, json)?;
    Ok(MaterialCommand::MapChanged {
        target: resolver.object(p.object_uuid)?,
        slot: p.map_name,
        old: p.old_map,
        new: p.new_map,
    }
    .into())
}
fn read_set_geometry(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: GeometryPayload = parse(CommandType::SetGeometry, json)?;
    Ok(GeometryCommand::Replaced {
        target: resolver.object(p.object_uuid)?,
        old: p.old_geometry,
        new: p.new_geometry,
    }
    .into())
}
fn read_set_geometry_value(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ValuePayload = parse(CommandType::SetGeometryValue, json)?;
    Ok(GeometryCommand::ValueChanged {
        target: resolver.object(p.object_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
fn read_add_script(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ScriptPayload = parse(CommandType::AddScript, json)?;
    Ok(ScriptCommand::Added {
        target: resolver.object(p.object_uuid)?,
        script: p.script,
        index: p.index,
    }
    .into())
}
fn read_remove_script(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ScriptPayload = parse(CommandType::RemoveScript, json)?;
    Ok(ScriptCommand::Removed {
        target: resolver.object(p.object_uuid)?,
        script: p.script,
        index: p.index,
    }
    .into())
}
fn read_set_script_value(
    _: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ScriptValuePayload = parse(CommandType::SetScriptValue, json)?;
    let target = resolver.object(p.object_uuid)?;
    Ok(ScriptCommand::ValueChanged {
        target,
        script: resolver.script(target, p.script_uuid)?,
        attribute: p.attribute_name,
        old: p.old_value,
        new: p.new_value,
    }
    .into())
}
fn read_scope(
    ty: CommandType,
    scope: ScopeType,
    registry: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    let p: ScopePayload = parse(ty, json)?;
    let commands = p
        .cmds
        .iter()
        .map(|command| registry.deserialize_with(resolver.nested(), command))
        .collect::<Result<Box<[_]>, _>>()?;
    Ok(Command::Scope(scope, commands))
}
fn read_multi_cmds(
    registry: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    read_scope(CommandType::MultiCmds, ScopeType::Multiple, registry, resolver, json)
}
fn read_set_scene(
    registry: &CommandRegistry,
    resolver: Resolver<'_>,
    json: &serde_json::Value,
) -> Result<Command, DeserializeError> {
    read_scope(CommandType::SetScene, ScopeType::SetScene, registry, resolver, json)
}
