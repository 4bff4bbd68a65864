//! Domain types used by the indexer and the ranker.
//!
//! Chapter documents arrive as loosely shaped JSON. Their `Deserialize`
//! impls never fail on shape: missing or ill-typed fields simply contribute
//! nothing, so one odd section cannot take down a whole chapter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type ChapterId = String;
pub type TopicId = String;

/// One rulebook chapter as produced by the corpus loader.
///
/// - `title`: human-readable chapter name
/// - `source`: stable chapter identifier (the chapter's file name)
/// - `sections`: addressable topics, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChapterDocument {
    pub title: String,
    pub source: ChapterId,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    pub id: Option<TopicId>,
    pub title: Option<String>,
    pub content: Vec<ContentBlock>,
}

/// Content blocks, tagged by the JSON `type` field.
///
/// Only paragraphs and flat lists carry searchable text. Every other kind
/// (tables, subsections, spell lists, ...) is kept as `Ignored`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentBlock {
    Paragraph { text: String },
    List { items: Vec<String> },
    Ignored,
}

impl ChapterDocument {
    pub fn from_value(value: &Value) -> Self {
        Self {
            title: string_field(value, "title").unwrap_or_default(),
            source: string_field(value, "source").unwrap_or_default(),
            sections: array_field(value, "sections").iter().map(Section::from_value).collect(),
        }
    }
}

impl Section {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: section_id(value),
            title: string_field(value, "title"),
            content: array_field(value, "content").iter().map(ContentBlock::from_value).collect(),
        }
    }
}

impl ContentBlock {
    pub fn from_value(value: &Value) -> Self {
        match value.get("type").and_then(Value::as_str) {
            Some("paragraph") => Self::Paragraph { text: string_field(value, "text").unwrap_or_default() },
            Some("list") => Self::List {
                items: array_field(value, "items")
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            },
            _ => Self::Ignored,
        }
    }
}

/// String ids as-is, numeric ids in their decimal form. Empty strings and
/// zero count as missing.
fn section_id(value: &Value) -> Option<TopicId> {
    match value.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

impl<'de> Deserialize<'de> for ChapterDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

/// The unit of indexing and retrieval. All `*_normalized` fields are
/// computed once at build time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    pub chapter_title_normalized: String,
    pub topic_id: TopicId,
    pub topic_title: String,
    pub topic_title_normalized: String,
    pub body_normalized: String,
    /// Length of `body_normalized` in characters.
    pub body_length: usize,
}

/// A ranked topic. The match flags only matter for ordering ties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(flatten)]
    pub topic: TopicRecord,
    pub score: f64,
    pub phrase_match: bool,
    pub topic_match: bool,
    pub chapter_match: bool,
}

/// What the reader is looking at right now. Only used as a scoring signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    pub current_chapter_id: Option<ChapterId>,
}

impl SearchContext {
    pub fn in_chapter(chapter_id: impl Into<ChapterId>) -> Self {
        Self { current_chapter_id: Some(chapter_id.into()) }
    }
}
