use super::ranker::RankedSection;
use crate::models::{AnalysisResult, ExtractedSection, Metadata, SubsectionAnalysis};

/// Pairs the ranker's output with the refiner's, keeping the ranker's order.
pub fn assemble(
    metadata: Metadata,
    ranked: &[RankedSection<'_>],
    subsections: Vec<SubsectionAnalysis>,
) -> AnalysisResult {
    let extracted_sections = ranked
        .iter()
        .map(|r| ExtractedSection {
            document: r.section.document.clone(),
            section_title: r.section.title.clone(),
            page: r.section.page,
            importance_rank: r.importance_rank,
            score: r.score,
        })
        .collect();

    AnalysisResult {
        metadata,
        extracted_sections,
        subsection_analysis: subsections,
    }
}
