//! Condensed excerpts for the selected sections.

use super::query::QueryProfile;
use super::ranker::RankedSection;
use super::scorer::RelevanceScorer;
use crate::models::SubsectionAnalysis;
use crate::text;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone)]
pub struct SubsectionRefiner<'s> {
    scorer: &'s RelevanceScorer,
    budget_chars: usize,
}

struct Window {
    start: usize,
    end: usize,
    score: f64,
    oversized: bool,
}

impl Window {
    /// Drops passages that score zero from both edges. Windows that tie on
    /// score otherwise keep unrelated text around the matching run.
    fn trimmed(self, scores: &[f64]) -> Self {
        if self.oversized || self.score <= 0.0 {
            return self;
        }
        let hits = |i: &usize| scores[*i] > 0.0;
        let start = (self.start..self.end).find(hits).unwrap_or(self.start);
        let end = (start..self.end).rev().find(hits).map_or(self.end, |last| last + 1);
        Self { start, end, ..self }
    }
}

impl<'s> SubsectionRefiner<'s> {
    pub fn new(scorer: &'s RelevanceScorer, budget_chars: usize) -> Self {
        Self {
            scorer,
            budget_chars,
        }
    }

    pub fn refine(&self, ranked: &RankedSection<'_>, profile: &QueryProfile) -> SubsectionAnalysis {
        let section = ranked.section;
        SubsectionAnalysis {
            document: section.document.clone(),
            page: section.page,
            refined_text: self.refine_text(section.body(), profile),
        }
    }

    /// Picks the highest-scoring contiguous run of sentences that fits the
    /// budget, keeping the original sentence order.
    pub fn refine_text(&self, body: &str, profile: &QueryProfile) -> String {
        if body.chars().count() <= self.budget_chars {
            return body.to_string();
        }
        let passages = text::split_sentences(body);
        if passages.is_empty() {
            tracing::debug!("no sentences found, using full section body");
            return body.to_string();
        }

        let scores: Vec<f64> = passages
            .iter()
            .map(|p| self.scorer.score_passage(profile, p))
            .collect();
        let lengths: Vec<usize> = passages.iter().map(|p| p.chars().count()).collect();

        let mut best: Option<Window> = None;
        for start in 0..passages.len() {
            let window = self.widest_window(start, &lengths, &scores);
            if best.as_ref().map_or(true, |b| window.score > b.score) {
                best = Some(window);
            }
        }
        let Some(window) = best else {
            return body.to_string();
        };
        let window = window.trimmed(&scores);

        let excerpt = passages[window.start..window.end].join(" ");
        if window.oversized {
            truncate_at_word(&excerpt, self.budget_chars)
        } else {
            excerpt
        }
    }

    fn widest_window(&self, start: usize, lengths: &[usize], scores: &[f64]) -> Window {
        if lengths[start] > self.budget_chars {
            return Window {
                start,
                end: start + 1,
                score: scores[start],
                oversized: true,
            };
        }
        let mut used = lengths[start];
        let mut score = scores[start];
        let mut end = start + 1;
        while end < lengths.len() && used + 1 + lengths[end] <= self.budget_chars {
            used += 1 + lengths[end];
            score += scores[end];
            end += 1;
        }
        Window {
            start,
            end,
            score,
            oversized: false,
        }
    }
}

/// Cuts `text` to at most `budget` chars at the last whitespace and marks
/// the cut with an ellipsis.
fn truncate_at_word(text: &str, budget: usize) -> String {
    let cut = text
        .char_indices()
        .nth(budget)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];
    let head = match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };
    format!("{}{ELLIPSIS}", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QueryWeights, ScoringWeights};
    use crate::engine::document::{build_document, Section};
    use crate::models::{Fragment, RawDocument};

    fn section(body: &str) -> Section {
        let raw = RawDocument {
            id: "doc.pdf".into(),
            fragments: vec![Fragment::heading(4, "Findings", body)],
        };
        build_document(&raw, 0).unwrap().sections.remove(0)
    }

    fn profile(job: &str) -> QueryProfile {
        QueryProfile::build("", job, &QueryWeights::default()).unwrap()
    }

    fn filler(n: usize) -> String {
        (0..n)
            .map(|i| format!("Background note number {i} covers unrelated logistics."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_sections_are_kept_verbatim() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 500);
        let s = section("Revenue grew. Costs fell.");
        let ranked = RankedSection { section: &s, score: 1.0, importance_rank: 1 };
        let analysis = refiner.refine(&ranked, &profile("revenue"));
        assert_eq!(analysis.refined_text, "Revenue grew. Costs fell.");
        assert_eq!(analysis.page, 4);
        assert_eq!(analysis.document, "doc.pdf");
    }

    #[test]
    fn picks_the_relevant_run_within_budget() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 120);
        let body = format!(
            "{} Revenue growth reached 12 percent. Revenue growth was led by cloud. {}",
            filler(4),
            filler(4)
        );
        let excerpt = refiner.refine_text(&body, &profile("revenue growth"));
        assert_eq!(
            excerpt,
            "Revenue growth reached 12 percent. Revenue growth was led by cloud."
        );
        assert!(excerpt.chars().count() <= 120);
    }

    #[test]
    fn unrelated_edges_are_trimmed_from_the_excerpt() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 300);
        let body = format!(
            "{} Revenue growth reached 12 percent. Costs were flat. Revenue growth was led by cloud. {}",
            filler(6),
            filler(6)
        );
        let excerpt = refiner.refine_text(&body, &profile("revenue growth"));
        assert_eq!(
            excerpt,
            "Revenue growth reached 12 percent. Costs were flat. Revenue growth was led by cloud."
        );
    }

    #[test]
    fn unmatched_body_keeps_the_leading_window() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 120);
        let excerpt = refiner.refine_text(&filler(6), &profile("revenue"));
        assert!(excerpt.starts_with("Background note number 0"));
        assert!(excerpt.chars().count() <= 120);
    }

    #[test]
    fn excerpt_keeps_source_order() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 200);
        let body = format!(
            "{} Market share rose. Revenue growth was extraordinary and revenue growth continued. {}",
            filler(3),
            filler(3)
        );
        let excerpt = refiner.refine_text(&body, &profile("revenue growth market share"));
        let market = excerpt.find("Market share").unwrap();
        let revenue = excerpt.find("Revenue growth").unwrap();
        assert!(market < revenue);
    }

    #[test]
    fn single_long_sentence_is_cut_at_a_word() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 50);
        let body = "revenue ".repeat(40);
        let excerpt = refiner.refine_text(&body, &profile("revenue"));
        assert!(excerpt.ends_with(ELLIPSIS));
        assert!(excerpt.chars().count() <= 50 + ELLIPSIS.len());
        assert!(!excerpt.contains("revenu..."));
    }

    #[test]
    fn whitespace_only_body_is_returned_as_is() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 1);
        assert_eq!(refiner.refine_text("   ", &profile("revenue")), "   ");
    }

    #[test]
    fn multibyte_text_respects_char_budget() {
        let scorer = RelevanceScorer::new(ScoringWeights::default());
        let refiner = SubsectionRefiner::new(&scorer, 40);
        let body = "Café résumé naïveté ".repeat(10);
        let excerpt = refiner.refine_text(&body, &profile("café"));
        assert!(excerpt.chars().count() <= 40 + ELLIPSIS.len());
    }
}
