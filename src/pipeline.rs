//! Glue between the file system, the PDF extractor and the engine.

use crate::config::Collection;
use crate::engine::IntelligenceEngine;
use crate::models::{AnalysisRequest, AnalysisResult, ChallengeInput, RawDocument};
use crate::pdf_processor::PdfProcessor;
use crate::utils::ensure_directory_exists;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `*.pdf` files directly inside `dir`, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let is_pdf = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if entry.file_type().is_file() && is_pdf {
            pdfs.push(entry.into_path());
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

pub fn extract_documents(processor: &PdfProcessor, paths: &[PathBuf]) -> Vec<RawDocument> {
    paths
        .par_iter()
        .map(|path| {
            if path.is_file() {
                processor.extract_document(path)
            } else {
                tracing::warn!(path = %path.display(), "PDF not found");
                RawDocument {
                    id: file_id(path),
                    fragments: Vec::new(),
                }
            }
        })
        .collect()
}

fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn write_result(path: &Path, result: &AnalysisResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory_exists(parent)?;
    }
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write output to {}", path.display()))?;
    tracing::info!(path = %path.display(), "results saved");
    Ok(())
}

/// Analyzes every PDF in `input_dir`.
pub fn analyze_directory(
    engine: &IntelligenceEngine,
    processor: &PdfProcessor,
    input_dir: &Path,
    mut request: AnalysisRequest,
) -> Result<AnalysisResult> {
    let paths = list_pdfs(input_dir)?;
    tracing::info!(count = paths.len(), dir = %input_dir.display(), "found PDF files");

    let documents = extract_documents(processor, &paths);
    request.document_ids = documents.iter().map(|d| d.id.clone()).collect();
    let result = engine
        .analyze(&documents, &request)
        .with_context(|| format!("Analysis of {} failed", input_dir.display()))?;
    Ok(result)
}

/// Processes one challenge collection and writes its output file.
pub fn process_collection(
    engine: &IntelligenceEngine,
    processor: &PdfProcessor,
    collection: &Collection,
) -> Result<AnalysisResult> {
    let raw = std::fs::read_to_string(&collection.input_path)
        .with_context(|| format!("Failed to read input JSON at {}", collection.input_path.display()))?;
    let input: ChallengeInput = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse input JSON at {}", collection.input_path.display()))?;
    tracing::info!(
        collection = %collection.name,
        challenge = %input.challenge_info.challenge_id,
        documents = input.documents.len(),
        "processing collection"
    );

    let request = input.to_request();
    let paths: Vec<PathBuf> = request
        .document_ids
        .iter()
        .map(|filename| collection.pdf_dir.join(filename))
        .collect();
    let documents = extract_documents(processor, &paths);

    let result = engine
        .analyze(&documents, &request)
        .with_context(|| format!("Analysis of collection {} failed", collection.name))?;
    write_result(&collection.output_path, &result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use chrono::Utc;

    #[test]
    fn lists_only_top_level_pdfs_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"%PDF").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.pdf"), b"%PDF").unwrap();

        let names: Vec<String> = list_pdfs(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_id(p))
            .collect();
        assert_eq!(names, ["a.PDF", "b.pdf"]);
    }

    #[test]
    fn missing_pdf_becomes_empty_document() {
        let processor = PdfProcessor::new().unwrap();
        let docs = extract_documents(&processor, &[PathBuf::from("/nonexistent/gone.pdf")]);
        assert_eq!(docs[0].id, "gone.pdf");
        assert!(docs[0].fragments.is_empty());
    }

    #[test]
    fn write_result_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/result.json");
        let result = AnalysisResult {
            metadata: Metadata {
                input_documents: vec!["a.pdf".into()],
                persona: "Analyst".into(),
                job_to_be_done: "Review".into(),
                processed_at: Utc::now(),
            },
            extracted_sections: Vec::new(),
            subsection_analysis: Vec::new(),
        };
        write_result(&path, &result).unwrap();
        let written: AnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, result);
    }
}
