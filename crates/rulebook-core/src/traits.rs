use crate::error::Result;
use crate::types::{ChapterDocument, QueryResult, SearchContext};

/// A replaceable topic index that can be queried.
///
/// `build` swaps the whole snapshot; `search` is a read over whatever
/// snapshot is current when it starts.
pub trait TopicSearch: Send + Sync {
    fn build(&self, chapters: &[ChapterDocument]) -> usize;
    fn search(&self, query: &str, context: &SearchContext, limit: usize) -> Result<Vec<QueryResult>>;
}
