use std::cmp::Ordering;

use regex::Regex;
use tracing::{debug, trace};

use rulebook_core::types::{QueryResult, SearchContext, TopicRecord};

use crate::index::Index;
use crate::normalize::{normalize, terms};

/// Normalized queries shorter than this never match anything.
pub const MIN_QUERY_CHARS: usize = 2;

const TITLE_PHRASE: f64 = 10.0;
const BODY_PHRASE: f64 = 5.0;
const TITLE_TERM: f64 = 5.0;
const CHAPTER_TERM: f64 = 2.0;
const BODY_TERM: f64 = 1.0;
const TITLE_SEQUENCE: f64 = 4.0;
const BODY_SEQUENCE: f64 = 2.0;
const TIGHT_WINDOW: usize = 6;
const TIGHT_WINDOW_BONUS: f64 = 6.0;
const NEAR_WINDOW: usize = 12;
const NEAR_WINDOW_BONUS: f64 = 3.0;
const WINDOW_PENALTY: f64 = 0.15;
const CURRENT_CHAPTER: f64 = 3.0;
const LENGTH_FLOOR: f64 = 10.0;

/// A query normalized once and reused against every topic.
struct PreparedQuery {
    phrase: String,
    terms: Vec<String>,
    /// Terms in order with anything in between. Only for multi-term queries.
    sequence: Option<Regex>,
}

impl PreparedQuery {
    fn parse(raw: &str) -> Option<Self> {
        let phrase = normalize(raw);
        if phrase.chars().count() < MIN_QUERY_CHARS {
            return None;
        }
        let terms: Vec<String> = terms(&phrase).into_iter().map(str::to_string).collect();
        let sequence = if terms.len() > 1 {
            let pattern = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join(".*");
            Regex::new(&pattern)
                .map_err(|e| debug!(error = %e, "in-order pattern rejected, sequence signal disabled"))
                .ok()
        } else {
            None
        };
        Some(Self { phrase, terms, sequence })
    }
}

/// Score every topic in `index` against `query` and return the best `limit`.
///
/// Pure: the same index, query and context always produce the same list.
pub fn rank(index: &Index, query: &str, context: &SearchContext, limit: usize) -> Vec<QueryResult> {
    let Some(query) = PreparedQuery::parse(query) else {
        return Vec::new();
    };

    let mut results: Vec<QueryResult> = index
        .entries()
        .filter_map(|(topic, words)| score_topic(topic, words, &query, context))
        .collect();
    let matched = results.len();

    results.sort_by(compare_results);
    results.truncate(limit);
    trace!(query = %query.phrase, matched, returned = results.len(), "ranked");
    results
}

fn score_topic(topic: &TopicRecord, words: &[String], query: &PreparedQuery, context: &SearchContext) -> Option<QueryResult> {
    let mut raw = 0.0;
    let mut phrase_match = false;
    let mut topic_match = false;
    let mut chapter_match = false;

    if topic.topic_title_normalized.contains(&query.phrase) {
        raw += TITLE_PHRASE;
        topic_match = true;
        phrase_match = true;
    }
    if topic.body_normalized.contains(&query.phrase) {
        raw += BODY_PHRASE;
        phrase_match = true;
    }

    for term in &query.terms {
        if topic.topic_title_normalized.contains(term.as_str()) {
            raw += TITLE_TERM;
            topic_match = true;
        }
        if topic.chapter_title_normalized.contains(term.as_str()) {
            raw += CHAPTER_TERM;
            chapter_match = true;
        }
        if topic.body_normalized.contains(term.as_str()) {
            raw += BODY_TERM;
        }
    }

    if let Some(sequence) = &query.sequence {
        if sequence.is_match(&topic.topic_title_normalized) {
            raw += TITLE_SEQUENCE;
        } else if sequence.is_match(&topic.body_normalized) {
            raw += BODY_SEQUENCE;
        }
    }

    raw += proximity(words, &query.terms);

    if context.current_chapter_id.as_deref() == Some(topic.chapter_id.as_str()) {
        raw += CURRENT_CHAPTER;
    }

    if raw <= 0.0 {
        return None;
    }

    Some(QueryResult {
        topic: topic.clone(),
        score: raw / (topic.body_length as f64 + LENGTH_FLOOR).ln(),
        phrase_match,
        topic_match,
        chapter_match,
    })
}

/// Bonus minus penalty for the span covering every occurrence of every term.
///
/// Zero unless each term occurs at least once as a whole body word. The span
/// is max minus min over the union of all positions, not a minimal window.
fn proximity(words: &[String], terms: &[String]) -> f64 {
    let mut first = usize::MAX;
    let mut last = 0usize;
    for term in terms {
        let mut found = false;
        for (pos, word) in words.iter().enumerate() {
            if word == term {
                found = true;
                first = first.min(pos);
                last = last.max(pos);
            }
        }
        if !found {
            return 0.0;
        }
    }
    if terms.is_empty() {
        return 0.0;
    }

    let window = last - first;
    let bonus = if window <= TIGHT_WINDOW {
        TIGHT_WINDOW_BONUS
    } else if window <= NEAR_WINDOW {
        NEAR_WINDOW_BONUS
    } else {
        0.0
    };
    bonus - WINDOW_PENALTY * window as f64
}

/// Score, then phrase, topic and chapter flags (true first), then shorter body.
fn compare_results(a: &QueryResult, b: &QueryResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.phrase_match.cmp(&a.phrase_match))
        .then_with(|| b.topic_match.cmp(&a.topic_match))
        .then_with(|| b.chapter_match.cmp(&a.chapter_match))
        .then_with(|| a.topic.body_length.cmp(&b.topic.body_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_core::types::{ChapterDocument, ContentBlock, Section};

    fn words(text: &str) -> Vec<String> {
        text.split(' ').map(str::to_string).collect()
    }

    fn owned(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    fn record(chapter: &str, title: &str, body: &str) -> TopicRecord {
        let body_normalized = normalize(body);
        TopicRecord {
            chapter_id: chapter.to_string(),
            chapter_title: chapter.to_string(),
            chapter_title_normalized: normalize(chapter),
            topic_id: normalize(title).replace(' ', "-"),
            topic_title: title.to_string(),
            topic_title_normalized: normalize(title),
            body_length: body_normalized.chars().count(),
            body_normalized,
        }
    }

    fn result(score: f64, flags: (bool, bool, bool), body_length: usize) -> QueryResult {
        let mut topic = record("c", "t", "");
        topic.body_length = body_length;
        QueryResult { topic, score, phrase_match: flags.0, topic_match: flags.1, chapter_match: flags.2 }
    }

    #[test]
    fn proximity_tiers_and_penalty() {
        let body = words("a b c d e f g h i j k l m n o p");
        assert!((proximity(&body, &owned(&["a", "c"])) - (6.0 - 0.3)).abs() < 1e-9);
        assert!((proximity(&body, &owned(&["a", "j"])) - (3.0 - 1.35)).abs() < 1e-9);
        assert!((proximity(&body, &owned(&["a", "p"])) - (0.0 - 2.25)).abs() < 1e-9);
        assert_eq!(proximity(&body, &owned(&["a", "zz"])), 0.0);
    }

    #[test]
    fn proximity_tier_boundaries_are_inclusive() {
        let body: Vec<String> = (0..20).map(|i| format!("w{i}")).collect();
        let at = |n: usize| {
            let term = format!("w{n}");
            proximity(&body, &owned(&["w0", term.as_str()]))
        };
        assert!((at(6) - 5.1).abs() < 1e-9);
        assert!((at(7) - 1.95).abs() < 1e-9);
        assert!((at(12) - 1.2).abs() < 1e-9);
        assert!((at(13) - -1.95).abs() < 1e-9);
    }

    #[test]
    fn proximity_uses_union_of_positions() {
        // "a" repeats far from "b": the span runs from the first "a" to the last one.
        let body = words("a b x x x x x x x x x x x x x x a");
        assert!((proximity(&body, &owned(&["a", "b"])) - (0.0 - 0.15 * 16.0)).abs() < 1e-9);
    }

    #[test]
    fn proximity_penalty_can_sink_a_body_only_match() {
        let topic = record("Capitulo", "Outro", "alfa x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x x beta");
        let words: Vec<String> = topic.body_normalized.split(' ').map(str::to_string).collect();
        let query = PreparedQuery::parse("alfa beta").unwrap();
        // body terms and the in-order match give +4, the 41-word window costs 6.15
        assert!(score_topic(&topic, &words, &query, &SearchContext::default()).is_none());
    }

    #[test]
    fn in_order_terms_in_body_only() {
        let topic = record("Capitulo", "Outro", "alfa x beta");
        let words: Vec<String> = topic.body_normalized.split(' ').map(str::to_string).collect();
        let query = PreparedQuery::parse("alfa beta").unwrap();
        let hit = score_topic(&topic, &words, &query, &SearchContext::default()).unwrap();

        // body terms 1 + 1, in-order body match 2, window 2 -> 6 - 0.3
        let raw = 1.0 + 1.0 + 2.0 + 6.0 - 0.3;
        let expected = raw / (topic.body_length as f64 + 10.0).ln();
        assert!((hit.score - expected).abs() < 1e-9);
        assert!(!hit.phrase_match && !hit.topic_match && !hit.chapter_match);

        // reversed order in the body earns no sequence bonus
        let reversed = record("Capitulo", "Outro", "beta x alfa");
        let words: Vec<String> = reversed.body_normalized.split(' ').map(str::to_string).collect();
        let hit = score_topic(&reversed, &words, &query, &SearchContext::default()).unwrap();
        let expected = (1.0 + 1.0 + 6.0 - 0.3) / (reversed.body_length as f64 + 10.0).ln();
        assert!((hit.score - expected).abs() < 1e-9);
    }

    #[test]
    fn signals_add_up() {
        let topic = record("Combate", "Ataque Furtivo", "Ataque Furtivo causa dano extra");
        let words: Vec<String> = topic.body_normalized.split(' ').map(str::to_string).collect();
        let query = PreparedQuery::parse("ataque furtivo").unwrap();
        let hit = score_topic(&topic, &words, &query, &SearchContext::default()).unwrap();

        // phrase 10 + 5, terms 2 * (5 + 1), sequence 4, window 1 -> 6 - 0.15
        let raw = 10.0 + 5.0 + 12.0 + 4.0 + 6.0 - 0.15;
        let expected = raw / (topic.body_length as f64 + 10.0).ln();
        assert!((hit.score - expected).abs() < 1e-9);
        assert!(hit.phrase_match && hit.topic_match && !hit.chapter_match);
    }

    #[test]
    fn chapter_title_terms_count() {
        let topic = record("Magia Arcana", "Custo", "pontos de mana");
        let words: Vec<String> = topic.body_normalized.split(' ').map(str::to_string).collect();
        let query = PreparedQuery::parse("magia").unwrap();
        let hit = score_topic(&topic, &words, &query, &SearchContext::default()).unwrap();
        assert!(hit.chapter_match);
        assert!(!hit.topic_match && !hit.phrase_match);
    }

    #[test]
    fn current_chapter_never_lowers_score() {
        let topic = record("Combate", "Iniciativa", "ordem de acao");
        let words: Vec<String> = topic.body_normalized.split(' ').map(str::to_string).collect();
        let query = PreparedQuery::parse("iniciativa").unwrap();
        let plain = score_topic(&topic, &words, &query, &SearchContext::default()).unwrap();
        let boosted = score_topic(&topic, &words, &query, &SearchContext::in_chapter("Combate")).unwrap();
        assert!(boosted.score > plain.score);
    }

    #[test]
    fn comparator_breaks_ties_in_order() {
        let mut results = vec![
            result(1.0, (false, false, false), 10),
            result(1.0, (false, false, true), 50),
            result(1.0, (false, true, false), 50),
            result(1.0, (true, false, false), 50),
            result(2.0, (false, false, false), 99),
            result(1.0, (false, false, false), 5),
        ];
        results.sort_by(compare_results);
        let order: Vec<(f64, bool, bool, bool, usize)> = results
            .iter()
            .map(|r| (r.score, r.phrase_match, r.topic_match, r.chapter_match, r.topic.body_length))
            .collect();
        assert_eq!(
            order,
            vec![
                (2.0, false, false, false, 99),
                (1.0, true, false, false, 50),
                (1.0, false, true, false, 50),
                (1.0, false, false, true, 50),
                (1.0, false, false, false, 5),
                (1.0, false, false, false, 10),
            ]
        );
    }

    #[test]
    fn short_queries_are_rejected_after_normalization() {
        assert!(PreparedQuery::parse("a").is_none());
        assert!(PreparedQuery::parse("!!a!!").is_none());
        assert!(PreparedQuery::parse("ab").is_some());
    }

    #[test]
    fn rank_truncates_to_limit() {
        let sections = (0..5)
            .map(|i| Section {
                id: Some(format!("t{i}")),
                title: Some(format!("Teste {i}")),
                content: vec![ContentBlock::Paragraph { text: "texto comum".into() }],
            })
            .collect();
        let index = Index::build(&[ChapterDocument { title: "C".into(), source: "c".into(), sections }]);
        assert_eq!(rank(&index, "comum", &SearchContext::default(), 3).len(), 3);
        assert!(rank(&index, "comum", &SearchContext::default(), 0).is_empty());
    }
}
