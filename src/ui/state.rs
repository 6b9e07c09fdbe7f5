//! Application state management structures.
//!
//! The editing session itself lives in [`EditorSession`]; this module holds what only the
//! desktop shell needs around it: selection, the data editor buffer, file operations and
//! the persisted UI preferences.

use crate::session::EditorSession;
use crate::templates::NodeTemplate;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Drag-and-drop payload carried from a palette entry to the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PaletteItem(pub &'static NodeTemplate);

/// Text buffer behind the properties panel's data bag editor.
#[derive(Debug, Default)]
pub struct DataEditorState {
    /// Node whose data is loaded in `text`
    pub node_id: Option<NodeId>,
    /// Pretty-printed JSON being edited
    pub text: String,
    /// Parse error from the last apply, shown inline
    pub error: Option<String>,
}

/// State related to file operations.
///
/// Dialogs run on a worker thread and report back over the channel, which is drained once
/// per frame.
pub struct FileState {
    /// Current file path for save/load operations
    pub current_path: Option<String>,
    /// Flag indicating if the automation has unsaved changes
    pub has_unsaved_changes: bool,
    /// Pending operations, started on the next frame
    pub pending_save_operation: Option<PendingSaveOperation>,
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Channel for receiving file operation results from worker threads
    pub file_operation_sender: Sender<FileOperationResult>,
    pub file_operation_receiver: Receiver<FileOperationResult>,
    /// Last failure, shown in the status bar until the next successful operation
    pub last_error: Option<String>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            pending_save_operation: None,
            pending_load_operation: None,
            file_operation_sender: sender,
            file_operation_receiver: receiver,
            last_error: None,
        }
    }
}

/// Represents a pending save operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSaveOperation {
    /// Save with a new file path (show file picker)
    SaveAs,
    /// Save to the existing file path
    Save,
}

/// Represents a pending load operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLoadOperation {
    /// Load from a file (show file picker)
    Load,
}

/// Messages sent from file worker threads back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save operation completed successfully with the given path
    SaveCompleted(String),
    /// Load operation completed successfully with path and content
    LoadCompleted(String, String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// The main application structure: one editing session plus shell state.
///
/// Only UI preferences are serialized (into eframe storage); the session is never part
/// of the persisted app state.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationEditorApp {
    /// The automation being edited, with its view and interaction state
    #[serde(skip)]
    pub session: EditorSession,
    /// Node shown in the properties panel
    #[serde(skip)]
    pub selected_node: Option<NodeId>,
    /// Data bag editor buffer
    #[serde(skip)]
    pub data_editor: DataEditorState,
    /// File operations state
    #[serde(skip)]
    pub file: FileState,
    /// Whether the dot grid is drawn behind the graph
    pub show_grid: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the palette panel
    pub palette_panel_width: f32,
    /// Remembered width of the properties panel
    pub properties_panel_width: f32,
}

impl Default for AutomationEditorApp {
    fn default() -> Self {
        Self {
            session: EditorSession::new(),
            selected_node: None,
            data_editor: DataEditorState::default(),
            file: FileState::default(),
            show_grid: true,
            dark_mode: true,
            palette_panel_width: 200.0,
            properties_panel_width: 300.0,
        }
    }
}

impl AutomationEditorApp {
    /// Serializes the persisted preferences to JSON.
    ///
    /// # Returns
    ///
    /// A JSON string, or an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Restores an app from persisted preferences, with a fresh empty session.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON string previously produced by [`Self::to_json`]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Points the properties panel at `node_id` and reloads the data editor.
    pub fn select_node(&mut self, node_id: Option<NodeId>) {
        if self.selected_node == node_id {
            return;
        }
        self.selected_node = node_id;
        self.reload_data_editor();
    }

    /// Refills the data editor from the selected node's current data bag.
    pub fn reload_data_editor(&mut self) {
        let node = self
            .selected_node
            .as_deref()
            .and_then(|id| self.session.graph.node(id));
        self.data_editor = match node {
            Some(node) => DataEditorState {
                node_id: Some(node.id.clone()),
                text: serde_json::to_string_pretty(&node.data).unwrap_or_default(),
                error: None,
            },
            None => DataEditorState::default(),
        };
    }

    /// Parses the data editor text and stores it on the selected node.
    ///
    /// The text must be a JSON object. On failure the error is kept for display and the
    /// node is left untouched.
    pub fn apply_data_editor(&mut self) {
        let Some(node_id) = self.data_editor.node_id.clone() else {
            return;
        };
        let parsed = serde_json::from_str::<serde_json::Value>(&self.data_editor.text)
            .map_err(|e| e.to_string())
            .and_then(|value| match value {
                serde_json::Value::Object(map) => Ok(map),
                _ => Err("node data must be a JSON object".to_string()),
            });
        match parsed {
            Ok(data) => match self.session.graph.set_node_data(&node_id, data) {
                Ok(()) => {
                    self.data_editor.error = None;
                    self.file.has_unsaved_changes = true;
                }
                Err(err) => self.data_editor.error = Some(err.to_string()),
            },
            Err(err) => {
                log::debug!("rejected data for '{node_id}': {err}");
                self.data_editor.error = Some(err);
            }
        }
    }
}
