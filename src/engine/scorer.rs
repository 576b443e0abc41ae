//! Weighted term-overlap relevance between a query profile and a section.

use super::document::Section;
use super::query::QueryProfile;
use crate::config::ScoringWeights;
use crate::text;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection<'a> {
    pub section: &'a Section,
    pub score: f64,
}

/// Pure function of its inputs: no caching, no shared state.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn score_section<'a>(&self, profile: &QueryProfile, section: &'a Section) -> ScoredSection<'a> {
        ScoredSection {
            section,
            score: self.score(profile, section),
        }
    }

    pub fn score(&self, profile: &QueryProfile, section: &Section) -> f64 {
        let body = section.body();
        if body.trim().is_empty() {
            return 0.0;
        }

        let body_counts = text::term_counts(body);
        let title_counts = text::term_counts(&section.title);

        let mut raw = 0.0;
        for (term, weight) in profile.weights() {
            let body_tf = self.saturate(body_counts.get(term));
            let title_tf = self.saturate(title_counts.get(term));
            raw += weight * (body_tf + self.weights.title_weight * title_tf);
        }
        if title_counts.keys().any(|term| profile.is_domain_signal(term)) {
            raw += self.weights.domain_title_bonus;
        }

        raw * self.length_dampening(text::word_count(body))
    }

    /// Overlap score of a free-standing passage: the body component of
    /// [`score`](Self::score) without title weighting or the domain bonus.
    pub fn score_passage(&self, profile: &QueryProfile, passage: &str) -> f64 {
        if passage.trim().is_empty() {
            return 0.0;
        }
        let counts = text::term_counts(passage);
        let raw = self.overlap(profile, &counts);
        raw * self.length_dampening(text::word_count(passage))
    }

    fn overlap(&self, profile: &QueryProfile, counts: &HashMap<String, u32>) -> f64 {
        profile
            .weights()
            .iter()
            .map(|(term, weight)| weight * self.saturate(counts.get(term)))
            .sum()
    }

    /// `tf * (k + 1) / (tf + k)`: 1.0 at one occurrence, approaching `k + 1`.
    fn saturate(&self, tf: Option<&u32>) -> f64 {
        let k = self.weights.saturation_k;
        match tf {
            Some(&tf) if tf > 0 => {
                let tf = f64::from(tf);
                tf * (k + 1.0) / (tf + k)
            }
            _ => 0.0,
        }
    }

    fn length_dampening(&self, words: usize) -> f64 {
        let ratio = words as f64 / self.weights.length_pivot_words;
        1.0 / (1.0 + self.weights.length_damping * ratio.ln_1p())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryWeights;
    use crate::engine::document::build_document;
    use crate::models::{Fragment, RawDocument};
    use std::collections::{BTreeMap, BTreeSet};

    fn section(title: &str, body: &str) -> Section {
        let raw = RawDocument {
            id: "doc.pdf".into(),
            fragments: vec![Fragment::heading(1, title, body), Fragment::heading(2, "Tail", "x")],
        };
        build_document(&raw, 0).unwrap().sections.remove(0)
    }

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(ScoringWeights::default())
    }

    fn profile(persona: &str, job: &str) -> QueryProfile {
        QueryProfile::build(persona, job, &QueryWeights::default()).unwrap()
    }

    #[test]
    fn empty_body_scores_zero() {
        let q = profile("", "revenue growth");
        assert_eq!(scorer().score(&q, &section("Revenue Growth", "")), 0.0);
    }

    #[test]
    fn unrelated_section_scores_zero() {
        let q = profile("", "revenue growth");
        assert_eq!(scorer().score(&q, &section("Cuisine", "Bouillabaisse is a fish stew.")), 0.0);
    }

    #[test]
    fn matching_title_beats_matching_body_alone() {
        let q = profile("", "revenue growth");
        let body = "Revenue growth was strong this year.";
        let titled = scorer().score(&q, &section("Revenue Growth", body));
        let untitled = scorer().score(&q, &section("Highlights", body));
        assert!(titled > untitled);
        assert!(untitled > 0.0);
    }

    #[test]
    fn repeated_terms_saturate() {
        let q = profile("", "revenue");
        let once = scorer().score_passage(&q, "revenue");
        let many = scorer().score_passage(&q, &"revenue ".repeat(50));
        assert!(many > once);
        // bounded by k + 1 before dampening
        assert!(many < once * (ScoringWeights::default().saturation_k + 1.0));
    }

    #[test]
    fn domain_signal_in_title_adds_bonus() {
        let q = profile("Investment analyst", "revenue growth");
        let body = "Revenue growth accelerated.";
        let plain = scorer().score(&q, &section("Results", body));
        let signal = scorer().score(&q, &section("Investment Results", body));
        let title_only = q.weight(&text::terms("investment")[0])
            * ScoringWeights::default().title_weight;
        let dampening = scorer().length_dampening(text::word_count(body));
        let expected = plain + (title_only + ScoringWeights::default().domain_title_bonus) * dampening;
        assert!((signal - expected).abs() < 1e-9);
    }

    #[test]
    fn long_sections_are_dampened() {
        let q = profile("", "revenue");
        let short = scorer().score_passage(&q, "revenue up");
        let padded = format!("revenue up {}", "filler words ".repeat(400));
        assert!(scorer().score_passage(&q, &padded) < short);
    }

    #[test]
    fn raising_a_weight_never_lowers_the_score() {
        let s = section("Market Share", "Market share grew while revenue stayed flat.");
        let signals = BTreeSet::new();
        let mut previous = 0.0;
        for weight in [0.0, 0.5, 1.0, 2.0, 8.0] {
            let weights = BTreeMap::from([
                ("market".to_string(), weight),
                ("revenu".to_string(), 1.0),
            ]);
            let score = scorer().score(&QueryProfile::from_weights(weights, signals.clone()), &s);
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn scoring_is_referentially_transparent() {
        let q = profile("Analyst", "market share trends");
        let s = section("Trends", "Market share trends across the sector.");
        assert_eq!(scorer().score(&q, &s), scorer().score(&q, &s));
    }
}
