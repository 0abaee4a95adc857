//! Language responder backed by a hosted generative-language API
//!
//! - **config**: endpoint and model selection
//! - **prompts**: the identity system instruction and greetings
//! - **responder**: the `Responder` trait and failure classification
//! - **gemini**: the HTTP implementation
//! - **sources**: formatting of grounding citations

pub mod config;
pub mod gemini;
pub mod prompts;
pub mod responder;
pub mod sources;

// Re-export commonly used types
pub use config::LLMConfig;
pub use gemini::{GeminiResponder, EMPTY_RESPONSE_TEXT};
pub use prompts::{build_system_instruction, cleared_welcome_text, welcome_text};
pub use responder::{classify_failure, Responder};
pub use sources::{format_sources, GroundingSource};
