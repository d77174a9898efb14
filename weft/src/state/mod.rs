//! State types for the agent graphs.
//!
//! Both agents keep their conversation as an append-only `Vec<Message>`; the drafter
//! additionally owns the in-progress document. Nodes are generic over
//! [`ConversationState`] so the same think/act nodes serve both graphs.
//!
//! # Main types
//!
//! - [`ToolCall`]: a tool invocation requested by the model.
//! - [`ToolResult`]: result of one invocation with a structured [`ToolStatus`] and a
//!   `terminal` flag (set by tools that finish the conversation, e.g. `save_document`).
//! - [`CalculatorState`], [`DrafterState`]: per-run state for the two agents.
//!
//! # Example
//!
//! ```rust
//! use weft::{CalculatorState, ConversationState, Message};
//!
//! let mut state = CalculatorState::default();
//! state.push_message(Message::user("Add 3 and 9"));
//! assert_eq!(state.messages().len(), 1);
//! ```

pub mod agent_state;

pub use agent_state::{
    CalculatorState, ConversationState, DrafterState, ToolCall, ToolResult, ToolStatus,
};
