//! Document tools for the drafter agent: `update_document` and `save_document`.
//!
//! The document is not held by the tools. It arrives in `ToolCallContext::document`
//! and a replacement goes back out in `ToolCallContent::document`; ActNode writes it
//! into `DrafterState`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::{RegistryError, Tool, ToolRegistry};

pub const TOOL_UPDATE_DOCUMENT: &str = "update_document";
pub const TOOL_SAVE_DOCUMENT: &str = "save_document";
/// Start of `save_document`'s success text; the saved file name and a period follow.
pub const SAVED_PREFIX: &str = "Document has been saved successfully to ";

/// Appends `.txt` unless the name already ends with it.
pub fn document_file_name(filename: &str) -> String {
    if filename.ends_with(".txt") {
        filename.to_string()
    } else {
        format!("{}.txt", filename)
    }
}

fn string_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolSourceError> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        ToolSourceError::InvalidInput(format!("missing string argument {}", key))
    })
}

/// Replaces the whole document with `content`.
pub struct UpdateDocumentTool;

#[async_trait]
impl Tool for UpdateDocumentTool {
    fn name(&self) -> &str {
        TOOL_UPDATE_DOCUMENT
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_UPDATE_DOCUMENT.to_string(),
            description: Some(
                "Updates the document with the provided content. Pass the complete new document text; it replaces the current content."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "Complete updated document text" }
                },
                "required": ["content"]
            }),
        }
    }

    async fn call(
        &self,
        args: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let content = string_arg(&args, "content")?;
        tracing::debug!(len = content.len(), "document updated");
        Ok(ToolCallContent::text(format!(
            "Document update successful! The content now is:\n{}",
            content
        ))
        .with_document(content))
    }
}

/// Writes the current document to `<output_dir>/<filename>[.txt]` and ends the run.
pub struct SaveDocumentTool {
    output_dir: PathBuf,
}

impl SaveDocumentTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Default for SaveDocumentTool {
    /// Saves into the current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Tool for SaveDocumentTool {
    fn name(&self) -> &str {
        TOOL_SAVE_DOCUMENT
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_SAVE_DOCUMENT.to_string(),
            description: Some(
                "Save the current document to a text file and finish the process.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "filename": { "type": "string", "description": "Name of the file" }
                },
                "required": ["filename"]
            }),
        }
    }

    async fn call(
        &self,
        args: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let filename = string_arg(&args, "filename")?.trim();
        if filename.is_empty() {
            return Err(ToolSourceError::InvalidInput("filename must not be empty".into()));
        }
        if filename.contains(['/', '\\']) || filename == ".." {
            return Err(ToolSourceError::InvalidInput(format!(
                "filename must be a plain file name, got {}",
                filename
            )));
        }
        let file_name = document_file_name(filename);
        let path = self.output_dir.join(&file_name);
        let document = ctx.and_then(|c| c.document.as_deref()).unwrap_or_default();

        tokio::fs::write(&path, document.as_bytes())
            .await
            .map_err(|e| {
                ToolSourceError::Storage(format!("Error saving document to {}: {}", path.display(), e))
            })?;
        tracing::info!(path = %path.display(), bytes = document.len(), "document saved");

        Ok(ToolCallContent::text(format!("{}{}.", SAVED_PREFIX, file_name)).terminal())
    }
}

/// Registers `update_document` and `save_document` (saving into `output_dir`).
pub fn register_document_tools(
    registry: &mut ToolRegistry,
    output_dir: impl Into<PathBuf>,
) -> Result<(), RegistryError> {
    registry.register(Box::new(UpdateDocumentTool))?;
    registry.register(Box::new(SaveDocumentTool::new(output_dir)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_gets_txt_suffix_once() {
        assert_eq!(document_file_name("report"), "report.txt");
        assert_eq!(document_file_name("report.txt"), "report.txt");
        assert_eq!(document_file_name("notes.md"), "notes.md.txt");
    }

    #[tokio::test]
    async fn update_returns_replacement_document() {
        let out = UpdateDocumentTool
            .call(json!({"content": "X"}), None)
            .await
            .unwrap();
        assert_eq!(out.document.as_deref(), Some("X"));
        assert_eq!(out.text, "Document update successful! The content now is:\nX");
        assert!(!out.terminal);
    }

    /// **Scenario**: save writes the context document to <dir>/<name>.txt and is terminal.
    #[tokio::test]
    async fn save_writes_context_document() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveDocumentTool::new(dir.path());
        let ctx = ToolCallContext::default().with_document(Some("hello\nworld".into()));
        let out = tool
            .call(json!({"filename": "report"}), Some(&ctx))
            .await
            .unwrap();
        assert!(out.terminal);
        assert_eq!(out.text, "Document has been saved successfully to report.txt.");
        let lower = out.text.to_lowercase();
        assert!(lower.contains("saved") && lower.contains("document"));
        let written = std::fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert_eq!(written, "hello\nworld");
    }

    #[tokio::test]
    async fn save_rejects_empty_and_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveDocumentTool::new(dir.path());
        for name in ["", "   ", "../escape", "a/b"] {
            let err = tool.call(json!({"filename": name}), None).await.unwrap_err();
            assert!(matches!(err, ToolSourceError::InvalidInput(_)), "{}", name);
        }
    }

    #[tokio::test]
    async fn save_into_missing_directory_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SaveDocumentTool::new(dir.path().join("does-not-exist"));
        let err = tool
            .call(json!({"filename": "x"}), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolSourceError::Storage(ref m) if m.contains("Error saving document")));
    }
}
