//! # fisibot Core
//!
//! Domain types, traits, and error definitions for the fisibot physics tutor.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! Every external capability (hosted model, query encoder, vector index,
//! model-callable tool) is a trait here. Implementations live in their
//! respective crates, which keeps them swappable and easy to stub in tests.

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;
pub mod session;
pub mod syllabus;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use retrieval::{Fragment, ScoredPoint, TextEncoder, VectorIndex};
pub use session::{InteractionRecord, SessionState};
pub use syllabus::SYLLABUS;
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
