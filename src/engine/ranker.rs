//! Global ordering, per-document diversity cap and importance ranks.

use super::document::Section;
use super::scorer::ScoredSection;
use crate::error::{EngineError, EngineResult};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection<'a> {
    pub section: &'a Section,
    pub score: f64,
    /// 1 = most relevant.
    pub importance_rank: u32,
}

/// Descending score, then earliest page, then earliest document in request
/// order, then earliest section within the document.
pub fn ranking_order(a: &ScoredSection<'_>, b: &ScoredSection<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.section.page.cmp(&b.section.page))
        .then_with(|| a.section.document_index.cmp(&b.section.document_index))
        .then_with(|| a.section.ordinal.cmp(&b.section.ordinal))
}

#[derive(Debug, Clone)]
pub struct SectionRanker {
    max_results: usize,
}

impl SectionRanker {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    /// `ceil(K / documents) + 1`.
    pub fn per_document_cap(&self, documents: usize) -> usize {
        self.max_results.div_ceil(documents.max(1)) + 1
    }

    /// Selects at most `max_results` sections. `documents` is the number of
    /// documents in the corpus and sizes the per-document cap; the cap only
    /// binds when qualifying sections come from two or more documents.
    pub fn rank<'a>(
        &self,
        scored: Vec<ScoredSection<'a>>,
        documents: usize,
    ) -> EngineResult<Vec<RankedSection<'a>>> {
        let mut qualifying: Vec<ScoredSection<'a>> = scored
            .into_iter()
            .filter(|s| s.score.is_finite() && s.score > 0.0)
            .collect();
        if qualifying.is_empty() {
            return Err(EngineError::InsufficientContent { documents });
        }
        qualifying.sort_by(ranking_order);

        let contributing: BTreeSet<usize> =
            qualifying.iter().map(|s| s.section.document_index).collect();
        let cap = if contributing.len() >= 2 {
            self.per_document_cap(documents)
        } else {
            usize::MAX
        };

        let mut taken: HashMap<usize, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(self.max_results);
        for candidate in qualifying {
            if selected.len() == self.max_results {
                break;
            }
            let count = taken.entry(candidate.section.document_index).or_insert(0);
            if *count >= cap {
                tracing::debug!(
                    document = %candidate.section.document,
                    title = %candidate.section.title,
                    cap,
                    "skipping section over per-document cap"
                );
                continue;
            }
            *count += 1;
            selected.push(candidate);
        }

        Ok(selected
            .into_iter()
            .zip(1u32..)
            .map(|(scored, importance_rank)| RankedSection {
                section: scored.section,
                score: scored.score,
                importance_rank,
            })
            .collect())
    }
}
