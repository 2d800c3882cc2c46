pub mod chat;

pub use chat::{AskApiRequest, AskForm, ChatRequest, ChatResponse, SourceInfo, DEFAULT_TOP_K};
