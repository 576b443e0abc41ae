//! The intelligence engine: documents and a persona/job query in, a ranked
//! and refined selection of sections out.
//!
//! Document building, scoring and refinement run on the rayon pool. Every
//! worker reads the shared [`QueryProfile`] and documents by reference and
//! returns its own result; results are collected in input order, so the
//! output does not depend on scheduling.

pub mod assembler;
pub mod document;
pub mod query;
pub mod ranker;
pub mod refiner;
pub mod scorer;

pub use document::{build_document, Document, Section};
pub use query::QueryProfile;
pub use ranker::{RankedSection, SectionRanker};
pub use refiner::SubsectionRefiner;
pub use scorer::{RelevanceScorer, ScoredSection};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AnalysisRequest, AnalysisResult, Metadata, RawDocument, SubsectionAnalysis};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IntelligenceEngine {
    config: EngineConfig,
}

impl IntelligenceEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        documents: &[RawDocument],
        request: &AnalysisRequest,
    ) -> EngineResult<AnalysisResult> {
        self.analyze_at(documents, request, Utc::now())
    }

    /// Same as [`analyze`](Self::analyze) with a caller-supplied timestamp,
    /// which makes the whole result reproducible.
    pub fn analyze_at(
        &self,
        documents: &[RawDocument],
        request: &AnalysisRequest,
        processed_at: DateTime<Utc>,
    ) -> EngineResult<AnalysisResult> {
        let config = self.resolve(request)?;
        let profile = QueryProfile::build(&request.persona, &request.job_to_be_done, &config.query)?;
        tracing::debug!(
            terms = profile.weights().len(),
            domain_signals = profile.domain_signals().len(),
            "built query profile"
        );

        let found = request.document_ids.len();
        if found < config.min_documents || found > config.max_documents {
            return Err(EngineError::CorpusSize {
                found,
                min: config.min_documents,
                max: config.max_documents,
            });
        }

        let corpus = build_corpus(documents, &request.document_ids, config.min_documents)?;
        let sections: Vec<&Section> = corpus.iter().flat_map(|doc| &doc.sections).collect();
        tracing::info!(
            documents = corpus.len(),
            sections = sections.len(),
            "scoring sections"
        );

        let scorer = RelevanceScorer::new(config.scoring.clone());
        let scored: Vec<ScoredSection<'_>> = sections
            .par_iter()
            .map(|&section| scorer.score_section(&profile, section))
            .collect();

        let ranked = SectionRanker::new(config.max_results).rank(scored, corpus.len())?;
        for r in &ranked {
            tracing::debug!(
                rank = r.importance_rank,
                score = r.score,
                document = %r.section.document,
                title = %r.section.title,
                "selected section"
            );
        }

        let refiner = SubsectionRefiner::new(&scorer, config.excerpt_budget_chars);
        let subsections: Vec<SubsectionAnalysis> = ranked
            .par_iter()
            .map(|r| refiner.refine(r, &profile))
            .collect();

        let metadata = Metadata {
            input_documents: corpus.iter().map(|doc| doc.id.clone()).collect(),
            persona: request.persona.clone(),
            job_to_be_done: request.job_to_be_done.clone(),
            processed_at,
        };
        Ok(assembler::assemble(metadata, &ranked, subsections))
    }

    fn resolve(&self, request: &AnalysisRequest) -> EngineResult<EngineConfig> {
        let mut config = self.config.clone();
        if let Some(max_results) = request.max_results {
            config = config.with_max_results(max_results);
        }
        if let Some(budget) = request.excerpt_budget_chars {
            config = config.with_excerpt_budget(budget);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Builds every requested document, skipping malformed ones. Fails with the
/// first malformed-document error when fewer than `min_documents` survive.
fn build_corpus(
    documents: &[RawDocument],
    document_ids: &[String],
    min_documents: usize,
) -> EngineResult<Vec<Document>> {
    let by_id: HashMap<&str, &RawDocument> =
        documents.iter().map(|doc| (doc.id.as_str(), doc)).collect();

    let outcomes: Vec<EngineResult<Document>> = document_ids
        .par_iter()
        .enumerate()
        .map(|(index, id)| match by_id.get(id.as_str()) {
            Some(raw) => build_document(raw, index),
            None => Err(EngineError::malformed(id, "no extraction output")),
        })
        .collect();

    let mut corpus = Vec::with_capacity(outcomes.len());
    let mut first_failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(doc) => corpus.push(doc),
            Err(err) => {
                tracing::warn!(error = %err, "skipping document");
                first_failure.get_or_insert(err);
            }
        }
    }

    if corpus.len() < min_documents {
        return Err(first_failure.unwrap_or(EngineError::CorpusSize {
            found: corpus.len(),
            min: min_documents,
            max: document_ids.len(),
        }));
    }
    Ok(corpus)
}
