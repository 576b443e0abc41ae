//! Document model: raw extractor fragments grouped into titled sections.

use crate::error::{EngineError, EngineResult};
use crate::models::RawDocument;
use crate::text;

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Identifier of the owning document.
    pub document: String,
    /// Position of the owning document in the request.
    pub document_index: usize,
    /// Position of this section within its document.
    pub ordinal: usize,
    pub title: String,
    /// 1-based page the section starts on.
    pub page: u32,
    pub blocks: Vec<String>,
    body: String,
}

impl Section {
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub index: usize,
    pub sections: Vec<Section>,
}

struct SectionDraft {
    title: String,
    page: u32,
    blocks: Vec<String>,
}

impl SectionDraft {
    fn finish(self, document: &str, document_index: usize, ordinal: usize) -> Section {
        let body = self.blocks.join(" ");
        Section {
            document: document.to_string(),
            document_index,
            ordinal,
            title: self.title,
            page: self.page,
            blocks: self.blocks,
            body,
        }
    }
}

/// Groups consecutive fragments under the nearest preceding heading. Text
/// before the first heading lands in a section titled with the document id.
pub fn build_document(raw: &RawDocument, index: usize) -> EngineResult<Document> {
    let id = raw.id.trim();
    if id.is_empty() {
        return Err(EngineError::malformed(&raw.id, "empty document identifier"));
    }
    if let Some(fragment) = raw.fragments.iter().find(|f| f.page == 0) {
        return Err(EngineError::malformed(
            id,
            format!("fragment with invalid page number {}", fragment.page),
        ));
    }
    if raw.fragments.iter().all(|f| f.text.trim().is_empty()) {
        return Err(EngineError::malformed(id, "no extractable text"));
    }

    let mut drafts: Vec<SectionDraft> = Vec::new();
    for fragment in &raw.fragments {
        let heading = fragment
            .heading
            .as_deref()
            .map(text::collapse_whitespace)
            .filter(|h| !h.is_empty());
        let block = text::collapse_whitespace(&fragment.text);

        match heading {
            Some(title) => drafts.push(SectionDraft {
                title,
                page: fragment.page,
                blocks: Vec::new(),
            }),
            None if drafts.is_empty() && !block.is_empty() => drafts.push(SectionDraft {
                title: id.to_string(),
                page: fragment.page,
                blocks: Vec::new(),
            }),
            None => {}
        }

        if !block.is_empty() {
            if let Some(current) = drafts.last_mut() {
                current.blocks.push(block);
            }
        }
    }

    let sections: Vec<Section> = drafts
        .into_iter()
        .enumerate()
        .map(|(ordinal, draft)| draft.finish(id, index, ordinal))
        .collect();

    tracing::debug!(document = id, sections = sections.len(), "built document model");
    Ok(Document {
        id: id.to_string(),
        index,
        sections,
    })
}
