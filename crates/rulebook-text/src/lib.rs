//! rulebook-text
//!
//! In-memory topic index and relevance ranking for the rulebook corpus.
//! `index` builds the snapshot, `rank` scores it, `engine` holds the
//! replaceable snapshot behind the `TopicSearch` trait.

pub mod engine;
pub mod index;
pub mod normalize;
pub mod rank;

pub use engine::RulebookSearchEngine;
pub use index::Index;
pub use normalize::normalize;
pub use rank::rank;
