pub mod conversation;
pub mod record;
pub mod summary;

pub use conversation::*;
pub use record::{CallExecutionRecord, CallStatus};
pub use summary::*;
