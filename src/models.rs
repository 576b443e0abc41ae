use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page-level text fragment handed over by the PDF extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub text: String,
}

impl Fragment {
    pub fn heading(page: u32, heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            page,
            heading: Some(heading.into()),
            text: text.into(),
        }
    }

    pub fn body(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            heading: None,
            text: text.into(),
        }
    }
}

/// Raw extraction output for a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub fragments: Vec<Fragment>,
}

/// What the orchestration layer asks the engine to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub document_ids: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub excerpt_budget_chars: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(
        document_ids: Vec<String>,
        persona: impl Into<String>,
        job_to_be_done: impl Into<String>,
    ) -> Self {
        Self {
            document_ids,
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
            max_results: None,
            excerpt_budget_chars: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub challenge_id: String,
    pub test_case_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeDocument {
    pub filename: String,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

/// `challenge1b_input.json` as found in a collection directory.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeInput {
    pub challenge_info: ChallengeInfo,
    pub documents: Vec<ChallengeDocument>,
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
}

impl ChallengeInput {
    pub fn to_request(&self) -> AnalysisRequest {
        AnalysisRequest::new(
            self.documents.iter().map(|d| d.filename.clone()).collect(),
            self.persona.role.clone(),
            self.job_to_be_done.task.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub page: u32,
    pub importance_rank: u32,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub page: u32,
    pub refined_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}
