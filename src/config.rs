use crate::error::{EngineError, EngineResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.json";

/// Weights used when turning persona and job text into a query profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryWeights {
    /// Multiplier for terms that appear in the job-to-be-done text.
    pub job_multiplier: f64,
    /// Extra weight per additional word in a multi-word phrase.
    pub phrase_boost: f64,
}

impl Default for QueryWeights {
    fn default() -> Self {
        Self {
            job_multiplier: 2.0,
            phrase_boost: 0.5,
        }
    }
}

/// Weights used by the relevance scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub title_weight: f64,
    /// `k` in the saturating term-frequency factor `tf * (k + 1) / (tf + k)`.
    pub saturation_k: f64,
    pub domain_title_bonus: f64,
    pub length_pivot_words: f64,
    pub length_damping: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_weight: 2.0,
            saturation_k: 1.2,
            domain_title_bonus: 1.0,
            length_pivot_words: 150.0,
            length_damping: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_results: usize,
    pub excerpt_budget_chars: usize,
    pub min_documents: usize,
    pub max_documents: usize,
    pub query: QueryWeights,
    pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            excerpt_budget_chars: 500,
            min_documents: 3,
            max_documents: 10,
            query: QueryWeights::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Loads the configuration from a JSON file, falling back to defaults
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_excerpt_budget(mut self, chars: usize) -> Self {
        self.excerpt_budget_chars = chars;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.max_results == 0 {
            return Err(EngineError::InvalidConfig("max_results must be positive".into()));
        }
        if self.excerpt_budget_chars == 0 {
            return Err(EngineError::InvalidConfig(
                "excerpt_budget_chars must be positive".into(),
            ));
        }
        if self.min_documents > self.max_documents {
            return Err(EngineError::InvalidConfig(format!(
                "min_documents ({}) exceeds max_documents ({})",
                self.min_documents, self.max_documents
            )));
        }
        if self.query.job_multiplier < 1.0 {
            return Err(EngineError::InvalidConfig(
                "query.job_multiplier must be at least 1".into(),
            ));
        }
        let weights = [
            ("query.phrase_boost", self.query.phrase_boost),
            ("scoring.title_weight", self.scoring.title_weight),
            ("scoring.domain_title_bonus", self.scoring.domain_title_bonus),
            ("scoring.length_damping", self.scoring.length_damping),
        ];
        for (name, value) in weights {
            if value.is_nan() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!("{name} must be non-negative")));
            }
        }
        if self.scoring.saturation_k.is_nan()
            || self.scoring.saturation_k <= 0.0
            || self.scoring.length_pivot_words.is_nan()
            || self.scoring.length_pivot_words <= 0.0
        {
            return Err(EngineError::InvalidConfig(
                "scoring.saturation_k and scoring.length_pivot_words must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// A challenge collection on disk: `<root>/<name>/challenge1b_input.json`
/// with its PDFs under `<root>/<name>/pdfs/`.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pdf_dir: PathBuf,
}

/// Lists the collections under `root`, sorted by name. Directories without
/// an input file are skipped.
pub fn discover_collections(root: &Path) -> Result<Vec<Collection>> {
    let mut collections = Vec::new();
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Failed to read collections dir {}", root.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let input_path = entry.path().join("challenge1b_input.json");
        if !input_path.is_file() {
            tracing::debug!(dir = %entry.path().display(), "no challenge input, skipping");
            continue;
        }
        collections.push(Collection {
            name: entry.file_name().to_string_lossy().to_string(),
            output_path: entry.path().join("challenge1b_output.json"),
            pdf_dir: entry.path().join("pdfs"),
            input_path,
        });
    }
    collections.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(collections)
}
