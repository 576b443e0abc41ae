//! Ready-made persona / job pairs for trying the engine on a folder of PDFs.

use crate::models::{AnalysisRequest, AnalysisResult};
use std::path::{Path, PathBuf};

/// Number of top sections listed after an example run.
pub const SUMMARY_SECTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    #[value(name = "investment_analyst")]
    InvestmentAnalyst,
    #[value(name = "phd_researcher")]
    PhdResearcher,
    #[value(name = "business_consultant")]
    BusinessConsultant,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::InvestmentAnalyst,
        Preset::PhdResearcher,
        Preset::BusinessConsultant,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::InvestmentAnalyst => "investment_analyst",
            Preset::PhdResearcher => "phd_researcher",
            Preset::BusinessConsultant => "business_consultant",
        }
    }

    pub fn persona(self) -> &'static str {
        match self {
            Preset::InvestmentAnalyst => {
                "Investment Analyst with 5 years experience in technology sector analysis, \
                 specialized in revenue trends and competitive positioning"
            }
            Preset::PhdResearcher => {
                "PhD researcher in Computer Science focusing on machine learning and \
                 artificial intelligence applications"
            }
            Preset::BusinessConsultant => {
                "Senior business strategy consultant with expertise in digital transformation \
                 and operational efficiency"
            }
        }
    }

    pub fn job(self) -> &'static str {
        match self {
            Preset::InvestmentAnalyst => {
                "Analyze revenue growth patterns, market share trends, and competitive \
                 advantages across technology companies from their annual reports"
            }
            Preset::PhdResearcher => {
                "Extract methodological approaches, experimental results, and key findings \
                 for literature review on AI/ML techniques"
            }
            Preset::BusinessConsultant => {
                "Identify strategic initiatives, digital transformation efforts, and \
                 operational improvements from corporate strategy documents"
            }
        }
    }

    /// Request with no document ids; the directory run fills them in.
    pub fn request(self) -> AnalysisRequest {
        AnalysisRequest::new(Vec::new(), self.persona(), self.job())
    }

    /// `<output_dir>/analysis_<name>.json`
    pub fn output_file(self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("analysis_{}.json", self.name()))
    }
}

/// `"<rank>. <title> (Page <page>)"` for the first `limit` sections.
pub fn top_sections(result: &AnalysisResult, limit: usize) -> Vec<String> {
    result
        .extracted_sections
        .iter()
        .take(limit)
        .map(|s| format!("{}. {} (Page {})", s.importance_rank, s.section_title, s.page))
        .collect()
}
