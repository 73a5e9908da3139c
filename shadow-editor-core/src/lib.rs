pub mod color;
pub mod commands;
pub mod editor;
pub mod history;
pub mod io;
pub mod signal;
pub mod state;

pub use editor::Editor;
pub use history::EditorState;
