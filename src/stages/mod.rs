pub mod aggregate;
pub mod conversation;
pub mod normalize;

pub use aggregate::*;
pub use conversation::*;
pub use normalize::*;
