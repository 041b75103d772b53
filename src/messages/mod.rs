//! Visitor message board backed by a GitHub repository.

pub mod board;
pub mod model;
pub mod profanity;
pub mod store;

pub use board::MessageBoard;
pub use model::{Message, Submission};
pub use profanity::ProfanityFilter;
pub use store::GithubStore;
