mod aggregate_source;
pub mod arithmetic;
pub mod document;
mod registry;
mod r#trait;

pub use aggregate_source::AggregateToolSource;
pub use arithmetic::{
    register_arithmetic_tools, AddTool, DivideTool, MultiplyTool, SubtractTool, TOOL_ADD,
    TOOL_DIVIDE, TOOL_MULTIPLY, TOOL_SUBTRACT,
};
pub use document::{
    document_file_name, register_document_tools, SaveDocumentTool, UpdateDocumentTool,
    SAVED_PREFIX, TOOL_SAVE_DOCUMENT, TOOL_UPDATE_DOCUMENT,
};
pub use r#trait::Tool;
pub use registry::{RegistryError, ToolRegistry};
