//! File operations for saving and loading workflow records.
//!
//! Native file dialogs are awaited on a worker thread; results come back through the
//! channel in [`FileState`](super::state::FileState) and are applied on the UI thread.

use super::state::{
    AutomationEditorApp, FileOperationResult, PendingLoadOperation, PendingSaveOperation,
};
use crate::migration::WorkflowRecord;
use crate::session::EditorSession;
use eframe::egui;
use std::sync::mpsc::Sender;

const DEFAULT_FILE_NAME: &str = "automation.json";

impl AutomationEditorApp {
    /// Handles pending file operations.
    ///
    /// Applies results of finished operations first, then starts any newly requested ones.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context, used by workers to request a repaint when done
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.file_operation_receiver.try_recv() {
            self.apply_file_result(result);
        }

        if let Some(save_op) = self.file.pending_save_operation.take() {
            self.start_save(save_op, ctx);
        }

        if let Some(PendingLoadOperation::Load) = self.file.pending_load_operation.take() {
            let ctx = ctx.clone();
            let sender = self.file.file_operation_sender.clone();
            std::thread::spawn(move || {
                let picked = futures::executor::block_on(
                    rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file(),
                );
                if let Some(handle) = picked {
                    let path = handle.path().display().to_string();
                    let result = match std::fs::read_to_string(handle.path()) {
                        Ok(json) => FileOperationResult::LoadCompleted(path, json),
                        Err(e) => {
                            FileOperationResult::OperationFailed(format!("Failed to read file: {e}"))
                        }
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Applies the outcome of a finished file operation to the app.
    pub fn apply_file_result(&mut self, result: FileOperationResult) {
        match result {
            FileOperationResult::SaveCompleted(path) => {
                log::info!("saved automation to {path}");
                self.file.current_path = Some(path);
                self.file.has_unsaved_changes = false;
                self.file.last_error = None;
            }
            FileOperationResult::LoadCompleted(path, content) => {
                match self.open_record_json(&content) {
                    Ok(()) => {
                        log::info!("opened automation from {path}");
                        self.file.current_path = Some(path);
                        self.file.last_error = None;
                    }
                    Err(e) => {
                        log::warn!("failed to parse {path}: {e}");
                        self.file.last_error = Some(format!("Failed to parse {path}: {e}"));
                    }
                }
            }
            FileOperationResult::OperationFailed(error) => {
                log::warn!("file operation failed: {error}");
                self.file.last_error = Some(error);
            }
        }
    }

    /// Replaces the current session with the workflow in `json`.
    ///
    /// Legacy records are upgraded on the way in. On a parse error the current session is
    /// left as it was.
    pub fn open_record_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let record = WorkflowRecord::from_json(json)?;
        let mut session = EditorSession::from_record(&record);
        session.set_viewport(self.session.viewport);
        self.session = session;
        // An upgraded legacy record is stored in graph form on the next save.
        self.file.has_unsaved_changes = record.has_legacy_fields() && record.nodes.is_empty();
        self.select_node(None);
        Ok(())
    }

    fn start_save(&mut self, save_op: PendingSaveOperation, ctx: &egui::Context) {
        let json = match self.session.to_record().to_json() {
            Ok(json) => json,
            Err(e) => {
                self.apply_file_result(FileOperationResult::OperationFailed(format!(
                    "Failed to serialize automation: {e}"
                )));
                return;
            }
        };
        let ctx = ctx.clone();
        let sender = self.file.file_operation_sender.clone();

        match (save_op, self.file.current_path.clone()) {
            (PendingSaveOperation::Save, Some(path)) => {
                std::thread::spawn(move || {
                    write_file(&sender, path, json);
                    ctx.request_repaint();
                });
            }
            _ => {
                std::thread::spawn(move || {
                    let picked = futures::executor::block_on(
                        rfd::AsyncFileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name(DEFAULT_FILE_NAME)
                            .save_file(),
                    );
                    if let Some(handle) = picked {
                        write_file(&sender, handle.path().display().to_string(), json);
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    /// Saves to a new file chosen by the user.
    pub fn save_as_automation(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Saves to the current file path, or asks for one if there is none yet.
    pub fn save_automation(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending_save_operation = Some(PendingSaveOperation::Save);
        } else {
            self.save_as_automation();
        }
    }

    /// Opens a workflow chosen by the user.
    pub fn load_automation(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Load);
    }

    /// Starts a brand-new, empty automation. Zoom and pan are reset too.
    pub fn new_automation(&mut self) {
        let viewport = self.session.viewport;
        self.session = EditorSession::new();
        self.session.set_viewport(viewport);
        self.file.current_path = None;
        self.file.has_unsaved_changes = false;
        self.file.last_error = None;
        self.select_node(None);
    }
}

fn write_file(sender: &Sender<FileOperationResult>, path: String, json: String) {
    let result = match std::fs::write(&path, json) {
        Ok(()) => FileOperationResult::SaveCompleted(path),
        Err(e) => FileOperationResult::OperationFailed(format!("Failed to save file: {e}")),
    };
    let _ = sender.send(result);
}
