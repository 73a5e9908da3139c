//! # Document format
//!
//! A document is a JSON object of the scene tree, the scripts by owning object, and optionally
//! the history of the session that produced it.

use std::io::{Read, Write};

use crate::{
    editor::Editor,
    history::{EditorState, EntryError, HistoryJson, HistorySettings},
    signal::Notifier,
    state::{ObjectSnapshot, Scene, SceneError, ScriptLibrary},
};

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("scene is not a valid tree: {0}")]
    Scene(#[from] SceneError),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub scene: ObjectSnapshot,
    #[serde(default)]
    pub scripts: ScriptLibrary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryJson>,
}

impl Document {
    /// Capture the editor's current state, with its history if `with_history`.
    pub fn from_editor<N: Notifier>(editor: &Editor<N>, with_history: bool) -> Result<Self, serde_json::Error> {
        Ok(Self {
            scene: editor.scene().to_snapshot(),
            scripts: editor.state().scripts().clone(),
            history: with_history.then(|| editor.history_json()).transpose()?,
        })
    }
    /// Open an editor on this document. History entries that couldn't be loaded are returned.
    pub fn into_editor<N: Notifier>(
        self,
        settings: HistorySettings,
        notifier: N,
    ) -> Result<(Editor<N>, Vec<EntryError>), SceneError> {
        let state = EditorState::new(Scene::from_snapshot(self.scene)?, self.scripts);
        let mut editor = Editor::with_notifier(state, settings, notifier);
        let errors = match &self.history {
            Some(history) => editor.load_history(history),
            None => Vec::new(),
        };
        Ok((editor, errors))
    }
    pub fn read(reader: impl Read) -> Result<Self, DocumentError> {
        Ok(serde_json::from_reader(reader)?)
    }
    pub fn write(&self, writer: impl Write) -> Result<(), DocumentError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Open the document at `path`.
pub fn read_path<N: Notifier>(
    path: impl AsRef<std::path::Path>,
    settings: HistorySettings,
    notifier: N,
) -> Result<(Editor<N>, Vec<EntryError>), DocumentError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let document = Document::read(std::io::BufReader::new(file))?;
    log::info!("opened {}", path.display());
    Ok(document.into_editor(settings, notifier)?)
}

/// Save the editor to `path`, including its history if the editor's settings make it persistent.
pub fn write_path<N: Notifier>(path: impl AsRef<std::path::Path>, editor: &Editor<N>) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let document = Document::from_editor(editor, editor.history().settings().persistent)?;
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    document.write(&mut writer)?;
    writer.flush()?;
    log::info!("saved {}", path.display());
    Ok(())
}
