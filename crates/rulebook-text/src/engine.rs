use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use rulebook_core::config::DEFAULT_LIMIT;
use rulebook_core::traits::TopicSearch;
use rulebook_core::types::{ChapterDocument, QueryResult, SearchContext};
use rulebook_core::{Error, Result};

use crate::index::Index;
use crate::rank::rank;

/// Holds the current index snapshot and answers queries against it.
///
/// `build` assembles a complete new `Index` before swapping it in, so a
/// concurrent `search` sees either the old snapshot or the new one.
pub struct RulebookSearchEngine {
    snapshot: RwLock<Option<Arc<Index>>>,
    default_limit: usize,
}

impl Default for RulebookSearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulebookSearchEngine {
    pub fn new() -> Self {
        Self { snapshot: RwLock::new(None), default_limit: DEFAULT_LIMIT }
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn build(&self, chapters: &[ChapterDocument]) -> usize {
        let index = Arc::new(Index::build(chapters));
        let topics = index.len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(index);
        info!(chapters = chapters.len(), topics, "search index rebuilt");
        topics
    }

    pub fn search(&self, query: &str, context: &SearchContext, limit: usize) -> Result<Vec<QueryResult>> {
        let index = self.current()?;
        Ok(rank(&index, query, context, limit))
    }

    /// `search` with the configured default limit.
    pub fn search_default(&self, query: &str, context: &SearchContext) -> Result<Vec<QueryResult>> {
        self.search(query, context, self.default_limit)
    }

    /// Number of topics in the current snapshot.
    pub fn topic_count(&self) -> Result<usize> {
        Ok(self.current()?.len())
    }

    /// The current snapshot; stays valid even if a rebuild swaps it out.
    pub fn current(&self) -> Result<Arc<Index>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::UninitializedIndex)
    }
}

impl TopicSearch for RulebookSearchEngine {
    fn build(&self, chapters: &[ChapterDocument]) -> usize {
        Self::build(self, chapters)
    }

    fn search(&self, query: &str, context: &SearchContext, limit: usize) -> Result<Vec<QueryResult>> {
        Self::search(self, query, context, limit)
    }
}
