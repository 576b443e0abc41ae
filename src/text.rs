//! Text normalization shared by query building, scoring and refinement.
//!
//! Queries, titles, bodies and passages all go through [`terms`], so a query
//! term and a section term are always directly comparable.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Longest multi-word phrase retained as a term.
pub const MAX_PHRASE_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "etc", "few", "for", "from", "further", "had", "has", "have", "having",
    "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "upon", "us", "very", "via", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "within", "would", "you",
    "your", "yours", "yourself", "yourselves",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+|[.,;:!?()]").expect("token pattern is valid"))
}

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

fn is_word(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphanumeric)
}

/// Splits text into runs of stemmed content words. Stop-words, single
/// letters and clause punctuation end a run.
pub fn content_runs(text: &str) -> Vec<Vec<String>> {
    let mut runs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for token in token_pattern().find_iter(text).map(|m| m.as_str()) {
        let lower = token.to_lowercase();
        let too_short = lower.chars().count() < 2 && !lower.chars().all(char::is_numeric);
        if !is_word(token) || too_short || stop_words().contains(lower.as_str()) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(stemmer().stem(&lower).into_owned());
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Unigrams plus contiguous phrases up to [`MAX_PHRASE_LEN`] words.
pub fn terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for run in content_runs(text) {
        for n in 1..=MAX_PHRASE_LEN {
            terms.extend(run.windows(n).map(|window| window.join(" ")));
        }
    }
    terms
}

pub fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in terms(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// Number of words in a term (1 for a unigram).
pub fn phrase_len(term: &str) -> usize {
    term.split(' ').count()
}

pub fn word_count(text: &str) -> usize {
    token_pattern()
        .find_iter(text)
        .filter(|m| is_word(m.as_str()))
        .count()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits text into sentences. A sentence ends at `.`, `!` or `?` followed by
/// whitespace or the end of the text; a trailing unterminated fragment is kept.
pub fn split_sentences(text: &str) -> Vec<String> {
    let normalized = collapse_whitespace(text);
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = normalized.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
            let end = idx + c.len_utf8();
            let sentence = normalized[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = end;
        }
    }
    let rest = normalized[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}
