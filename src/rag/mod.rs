//! RAG (Retrieval-Augmented Generation) for question answering over the
//! documentation corpus.

pub mod context;
mod engine;

pub use context::{ContextAssembler, RetrievedContext};
pub use engine::{ConversationTurn, RagEngine};
