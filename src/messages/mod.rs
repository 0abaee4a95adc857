pub mod storage;
pub mod types;

pub use storage::MessageLog;
pub use types::{Message, Role, Turn, WELCOME_ID};
