//! rulebook-core
//!
//! Domain types shared by the rulebook indexer and ranker, the error type,
//! configuration loading and the JSON chapter loader.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{ChapterDocument, ContentBlock, QueryResult, SearchContext, Section, TopicRecord};
