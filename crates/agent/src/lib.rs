//! Conversational ordering for a restaurant table.
//!
//! The assistant is an untrusted text generator. It signals cart changes with
//! `[ORDER: id, qty]` tags embedded in its replies; this crate scans for
//! those tags, resolves them against the catalog and deal store, and applies
//! the survivors to the table's cart.
//!
//! # Flow
//!
//! 1. **Chat** (`llm`, `prompt`) - ask the chat service, or fall back to a canned reply
//! 2. **Extract** (`extractor`) - pull tags out and clean the visible text
//! 3. **Apply** (`ordering`) - resolve each tag and mutate the cart
//!
//! `AgentRuntime` (see `runtime`) runs the three steps for one customer message.
//!
//! The assistant never decides prices: a resolved tag always uses the catalog
//! price, or the deal's listed price for bundles.

pub mod extractor;
pub mod llm;
pub mod ordering;
pub mod prompt;
pub mod runtime;
pub mod session;

pub use extractor::{extract, ExtractedInstruction, Extraction};
pub use llm::{ChatMessage, ChatRole, GeminiClient, LlmClient, LlmError};
pub use ordering::{apply_response, resolve_and_apply, ApplyOutcome, IgnoreReason, OrderTurn};
pub use runtime::{AgentRuntime, CustomerTurn, ReplySource};
pub use session::ChatSession;
