//! Weighted term profile derived from the persona and the job-to-be-done.

use crate::config::QueryWeights;
use crate::error::{EngineError, EngineResult};
use crate::text;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Immutable once built; shared by reference across scoring workers.
///
/// Ordered maps keep every iteration, and therefore every floating-point
/// sum over the profile, in the same order from run to run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProfile {
    weights: BTreeMap<String, f64>,
    domain_signals: BTreeSet<String>,
}

impl QueryProfile {
    pub fn build(persona: &str, job_to_be_done: &str, weights: &QueryWeights) -> EngineResult<Self> {
        let persona_terms = text::terms(persona);
        let job_terms = text::terms(job_to_be_done);
        if persona_terms.is_empty() && job_terms.is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let mut frequency: HashMap<&str, u32> = HashMap::new();
        for term in persona_terms.iter().chain(&job_terms) {
            *frequency.entry(term.as_str()).or_insert(0) += 1;
        }
        let in_job: BTreeSet<&str> = job_terms.iter().map(String::as_str).collect();

        let term_weights = frequency
            .into_iter()
            .map(|(term, count)| {
                let phrase = 1.0 + weights.phrase_boost * (text::phrase_len(term) - 1) as f64;
                let job = if in_job.contains(term) { weights.job_multiplier } else { 1.0 };
                (term.to_string(), count as f64 * phrase * job)
            })
            .collect();

        let domain_signals = persona_terms
            .iter()
            .filter(|term| !in_job.contains(term.as_str()))
            .cloned()
            .collect();

        Ok(Self::from_weights(term_weights, domain_signals))
    }

    /// Builds a profile from explicit weights. Negative weights are clamped
    /// to zero.
    pub fn from_weights(weights: BTreeMap<String, f64>, domain_signals: BTreeSet<String>) -> Self {
        let weights = weights.into_iter().map(|(term, w)| (term, w.max(0.0))).collect();
        Self {
            weights,
            domain_signals,
        }
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn domain_signals(&self) -> &BTreeSet<String> {
        &self.domain_signals
    }

    pub fn is_domain_signal(&self, term: &str) -> bool {
        self.domain_signals.contains(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(persona: &str, job: &str) -> EngineResult<QueryProfile> {
        QueryProfile::build(persona, job, &QueryWeights::default())
    }

    fn stem(word: &str) -> String {
        text::terms(word).remove(0)
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(build("", "").unwrap_err(), EngineError::EmptyQuery);
        assert_eq!(build("the of", "and to").unwrap_err(), EngineError::EmptyQuery);
    }

    #[test]
    fn job_terms_outweigh_persona_terms() {
        let profile = build("Investment Analyst", "Analyze revenue").unwrap();
        assert_eq!(profile.weight(&stem("investment")), 1.0);
        assert_eq!(profile.weight(&stem("revenue")), 2.0);
    }

    #[test]
    fn frequency_accumulates_across_both_texts() {
        let profile = build("revenue specialist", "revenue growth").unwrap();
        // seen twice, once in the job
        assert_eq!(profile.weight("revenu"), 4.0);
    }

    #[test]
    fn phrases_are_weighted_by_length() {
        let profile = build("", "revenue growth patterns").unwrap();
        assert_eq!(profile.weight("revenu growth"), 2.0 * 1.5);
        assert_eq!(profile.weight("revenu growth pattern"), 2.0 * 2.0);
    }

    #[test]
    fn persona_only_terms_are_domain_signals() {
        let profile = build("Investment Analyst covering revenue", "Summarize revenue").unwrap();
        assert!(profile.is_domain_signal(&stem("investment")));
        assert!(profile.is_domain_signal(&stem("analyst")));
        assert!(!profile.is_domain_signal(&stem("revenue")));
        assert!(!profile.is_domain_signal(&stem("summarize")));
    }

    #[test]
    fn construction_is_deterministic() {
        let persona = "PhD researcher in Computer Science focusing on machine learning";
        let job = "Extract methodological approaches and key findings";
        assert_eq!(build(persona, job).unwrap(), build(persona, job).unwrap());
    }

    #[test]
    fn weights_are_never_negative() {
        let profile = QueryProfile::from_weights(
            BTreeMap::from([("loss".to_string(), -3.0)]),
            BTreeSet::new(),
        );
        assert_eq!(profile.weight("loss"), 0.0);
    }
}
