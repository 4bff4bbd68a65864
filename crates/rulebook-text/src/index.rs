use std::collections::HashSet;

use tracing::{debug, warn};

use rulebook_core::types::{ChapterDocument, ContentBlock, Section, TopicRecord};

use crate::normalize::normalize;

/// Flat, ordered snapshot of every addressable topic in the corpus.
///
/// Built wholesale from chapter documents and never mutated afterwards.
/// `body_words[i]` holds the tokenized body of `topics[i]`, so proximity
/// scoring does not re-split bodies on every query.
#[derive(Debug, Clone, Default)]
pub struct Index {
    topics: Vec<TopicRecord>,
    body_words: Vec<Vec<String>>,
}

impl Index {
    pub fn build(chapters: &[ChapterDocument]) -> Self {
        let mut index = Self::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;

        for chapter in chapters {
            let chapter_title_normalized = normalize(&chapter.title);
            for section in &chapter.sections {
                let Some(topic_id) = section.id.as_deref() else {
                    skipped += 1;
                    continue;
                };
                if !seen.insert(topic_id.to_string()) {
                    warn!(topic = topic_id, chapter = %chapter.source, "duplicate topic id, keeping first occurrence");
                    skipped += 1;
                    continue;
                }

                let topic_title = section.title.clone().unwrap_or_default();
                let body_normalized = normalize(&extract_text(section));
                let body_length = body_normalized.chars().count();
                index.body_words.push(body_normalized.split(' ').filter(|w| !w.is_empty()).map(str::to_string).collect());
                index.topics.push(TopicRecord {
                    chapter_id: chapter.source.clone(),
                    chapter_title: chapter.title.clone(),
                    chapter_title_normalized: chapter_title_normalized.clone(),
                    topic_id: topic_id.to_string(),
                    topic_title_normalized: normalize(&topic_title),
                    topic_title,
                    body_normalized,
                    body_length,
                });
            }
        }

        debug!(chapters = chapters.len(), topics = index.topics.len(), skipped, "topic index built");
        index
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> &[TopicRecord] {
        &self.topics
    }

    pub fn get(&self, topic_id: &str) -> Option<&TopicRecord> {
        self.topics.iter().find(|t| t.topic_id == topic_id)
    }

    /// Topics paired with their body word arrays, in index order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&TopicRecord, &[String])> {
        self.topics.iter().zip(self.body_words.iter().map(Vec::as_slice))
    }
}

/// Section title followed by every paragraph text and list item.
fn extract_text(section: &Section) -> String {
    let mut text = section.title.clone().unwrap_or_default();
    for block in &section.content {
        match block {
            ContentBlock::Paragraph { text: para } => {
                text.push(' ');
                text.push_str(para);
            }
            ContentBlock::List { items } => {
                for item in items {
                    text.push(' ');
                    text.push_str(item);
                }
            }
            ContentBlock::Ignored => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: Option<&str>, title: &str, content: Vec<ContentBlock>) -> Section {
        Section { id: id.map(str::to_string), title: Some(title.to_string()), content }
    }

    fn chapter(source: &str, title: &str, sections: Vec<Section>) -> ChapterDocument {
        ChapterDocument { title: title.to_string(), source: source.to_string(), sections }
    }

    #[test]
    fn builds_one_record_per_addressable_section() {
        let chapters = vec![chapter(
            "03-combate.json",
            "Combate",
            vec![
                section(
                    Some("iniciativa"),
                    "Iniciativa",
                    vec![
                        ContentBlock::Paragraph { text: "A iniciativa determina a ordem de ação.".into() },
                        ContentBlock::List { items: vec!["Rolagem".into(), "Empates".into()] },
                        ContentBlock::Ignored,
                    ],
                ),
                section(None, "Sem âncora", vec![ContentBlock::Paragraph { text: "invisível".into() }]),
            ],
        )];

        let index = Index::build(&chapters);
        assert_eq!(index.len(), 1);

        let topic = &index.topics()[0];
        assert_eq!(topic.chapter_id, "03-combate.json");
        assert_eq!(topic.chapter_title_normalized, "combate");
        assert_eq!(topic.topic_title, "Iniciativa");
        assert_eq!(topic.topic_title_normalized, "iniciativa");
        assert_eq!(topic.body_normalized, "iniciativa a iniciativa determina a ordem de acao rolagem empates");
        assert_eq!(topic.body_length, topic.body_normalized.len());
    }

    #[test]
    fn missing_title_yields_empty_fields() {
        let chapters = vec![chapter("c", "", vec![Section { id: Some("t".into()), title: None, content: vec![] }])];
        let index = Index::build(&chapters);
        let topic = index.get("t").expect("indexed");
        assert_eq!(topic.topic_title, "");
        assert_eq!(topic.body_normalized, "");
        assert_eq!(topic.body_length, 0);
    }

    #[test]
    fn duplicate_topic_ids_keep_first() {
        let chapters = vec![
            chapter("a", "A", vec![section(Some("dup"), "Primeiro", vec![])]),
            chapter("b", "B", vec![section(Some("dup"), "Segundo", vec![])]),
        ];
        let index = Index::build(&chapters);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("dup").map(|t| t.topic_title.as_str()), Some("Primeiro"));
    }

    #[test]
    fn body_words_align_with_topics() {
        let chapters = vec![chapter(
            "c",
            "C",
            vec![section(Some("x"), "Dano Extra", vec![ContentBlock::Paragraph { text: "soma-se ao dano".into() }])],
        )];
        let index = Index::build(&chapters);
        let (topic, words) = index.entries().next().expect("one entry");
        assert_eq!(topic.topic_id, "x");
        assert_eq!(words, ["dano", "extra", "soma", "se", "ao", "dano"]);
    }
}
