pub mod providers;
pub mod types;
pub mod utils;

pub use providers::gemini;
pub use types::{GenerationConfig, LLMClient, LLMMessage, LLMMessageType, LLMUserType};
