pub mod answer;
pub mod context;
pub mod engine;
pub mod intent;
pub mod prompt;

pub use answer::{DeepSeekAnswerer, PromptAnswerer};
pub use engine::{QueryEngine, QueryResponse};
pub use intent::{QueryIntent, analyze};
