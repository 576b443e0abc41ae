//! PDF text extraction: content-stream walk into lines, heading detection,
//! and the fragment list the engine consumes.

use crate::models::{Fragment, RawDocument};
use crate::utils::preview;
use anyhow::{anyhow, Context, Result};
use pdf::content::{Content, Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use pdf::object::Resolve;
use regex::Regex;
use std::path::Path;
use std::process::Command;

/// A rebuilt line of text and the largest font size seen on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub font_size: Option<f32>,
}

impl TextLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: None,
        }
    }
}

pub struct HeadingDetector {
    patterns: Vec<Regex>,
}

impl HeadingDetector {
    const MIN_CHARS: usize = 4;
    const MAX_CHARS: usize = 100;
    const MAX_WORDS: usize = 12;
    const SIZE_RATIO: f32 = 1.2;

    pub fn new() -> Result<Self> {
        let patterns = [
            r"^[A-Z][A-Za-z]+(\s+[A-Za-z]+){0,5}:?$",                   // Capitalized headings
            r"^\d+(\.\d+)*\.?\s+[A-Z][A-Za-z\s\-&,]+:?$",               // Numbered headings
            r"^(Chapter|Section|Part)\s+[\dIVXLC]+\b.*$",               // Chapter headings
            r"^[A-Z0-9][A-Z0-9\s&\-]{3,}:?$",                           // ALL CAPS headings
            r"^[A-Z][a-z]+(\s+([A-Z][A-Za-z]*|of|and|the|in|for|to|&|\d+))+:?$", // Title Case headings
        ]
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("Invalid heading pattern {p}")))
        .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_heading(&self, text: &str, font_size: Option<f32>, body_size: Option<f32>) -> bool {
        let text = text.trim();
        let chars = text.chars().count();
        if !(Self::MIN_CHARS..=Self::MAX_CHARS).contains(&chars)
            || text.ends_with('.')
            || text.split_whitespace().count() > Self::MAX_WORDS
            || !text.chars().any(char::is_alphabetic)
        {
            return false;
        }
        let larger_than_body = match (font_size, body_size) {
            (Some(size), Some(body)) => size >= body * Self::SIZE_RATIO,
            _ => false,
        };
        larger_than_body || self.patterns.iter().any(|re| re.is_match(text))
    }

    /// Splits one page's lines into fragments: every heading opens a new
    /// fragment, other lines append to the current one.
    pub fn page_fragments(&self, page: u32, lines: &[TextLine]) -> Vec<Fragment> {
        let body_size = median_font_size(lines);
        let mut fragments = Vec::new();
        let mut current = Fragment::body(page, String::new());

        for line in lines {
            let text = line.text.trim();
            if text.is_empty() {
                continue;
            }
            if self.is_heading(text, line.font_size, body_size) {
                if current.heading.is_some() || !current.text.is_empty() {
                    fragments.push(current);
                }
                current = Fragment::heading(page, text, String::new());
            } else {
                if !current.text.is_empty() {
                    current.text.push('\n');
                }
                current.text.push_str(text);
            }
        }
        if current.heading.is_some() || !current.text.is_empty() {
            fragments.push(current);
        }
        fragments
    }
}

fn median_font_size(lines: &[TextLine]) -> Option<f32> {
    let mut sizes: Vec<f32> = lines
        .iter()
        .filter(|l| !l.text.trim().is_empty())
        .filter_map(|l| l.font_size)
        .filter(|s| s.is_finite() && *s > 0.0)
        .collect();
    if sizes.is_empty() {
        return None;
    }
    sizes.sort_by(f32::total_cmp);
    Some(sizes[sizes.len() / 2])
}

pub struct PdfProcessor {
    detector: HeadingDetector,
}

impl PdfProcessor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            detector: HeadingDetector::new()?,
        })
    }

    /// Extracts a document's fragments. A PDF that yields no text by either
    /// method comes back with no fragments; the engine decides what to do.
    pub fn extract_document(&self, path: &Path) -> RawDocument {
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let pages = match Self::extract_pages(path) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "content-stream extraction failed, trying pdftotext");
                match Self::extract_with_pdftotext(path) {
                    Ok(pages) => {
                        tracing::info!(path = %path.display(), "using pdftotext output");
                        pages
                    }
                    Err(fallback) => {
                        tracing::warn!(path = %path.display(), error = %fallback, "pdftotext also failed");
                        Vec::new()
                    }
                }
            }
        };

        let fragments: Vec<Fragment> = pages
            .iter()
            .flat_map(|(page, lines)| self.detector.page_fragments(*page, lines))
            .collect();
        for heading in fragments.iter().filter_map(|f| f.heading.as_deref()) {
            tracing::debug!(document = %id, heading, "found heading");
        }
        RawDocument { id, fragments }
    }

    fn extract_pages(path: &Path) -> Result<Vec<(u32, Vec<TextLine>)>> {
        tracing::debug!(path = %path.display(), "opening PDF");
        let file = FileOptions::cached()
            .open(path)
            .with_context(|| format!("Failed to open PDF {}", path.display()))?;
        let total_pages = file.num_pages();
        tracing::debug!(pages = total_pages, "PDF opened");

        let mut pages = Vec::new();
        let mut any_text = false;
        for page_index in 0..total_pages {
            let page_number = page_index + 1;
            let page = match file.get_page(page_index) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "failed to get page");
                    continue;
                }
            };
            let Some(content) = &page.contents else {
                continue;
            };
            let lines = match Self::extract_lines(&file, content) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "failed to read page content");
                    continue;
                }
            };
            if lines.is_empty() {
                tracing::debug!(page = page_number, "no text on page");
                continue;
            }
            any_text = true;
            let joined: String = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join(" ");
            tracing::debug!(page = page_number, lines = lines.len(), preview = %preview(&joined, 100), "extracted page");
            pages.push((page_number, lines));
        }

        if !any_text {
            return Err(anyhow!("No text extracted from PDF content streams"));
        }
        Ok(pages)
    }

    fn extract_lines(resolver: &impl Resolve, content: &Content) -> Result<Vec<TextLine>> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_size: Option<f32> = None;
        let mut line_size: Option<f32> = None;

        let mut flush = |current: &mut String, line_size: &mut Option<f32>| {
            let text = current.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() {
                lines.push(TextLine {
                    text,
                    font_size: *line_size,
                });
            }
            current.clear();
            *line_size = None;
        };

        for op in content.operations(resolver)? {
            match op {
                Op::TextFont { size, .. } => current_size = Some(size),
                Op::TextDraw { text } => {
                    let drawn = text.to_string_lossy();
                    if !drawn.trim().is_empty() {
                        append_draw(&mut current, &drawn);
                        line_size = max_size(line_size, current_size);
                    }
                }
                Op::TextDrawAdjusted { array } => {
                    let mut first = true;
                    for item in array {
                        match item {
                            TextDrawAdjusted::Text(text) => {
                                let drawn = text.to_string_lossy();
                                if !drawn.trim().is_empty() {
                                    if first {
                                        append_draw(&mut current, &drawn);
                                        first = false;
                                    } else {
                                        current.push_str(&drawn);
                                    }
                                    line_size = max_size(line_size, current_size);
                                }
                            }
                            // Large negative kerning is a word gap.
                            TextDrawAdjusted::Spacing(gap) if gap < -150.0 => current.push(' '),
                            TextDrawAdjusted::Spacing(_) => {}
                        }
                    }
                }
                Op::TextNewline | Op::EndText => flush(&mut current, &mut line_size),
                Op::MoveTextPosition { translation } => {
                    if translation.y.abs() > 0.5 {
                        flush(&mut current, &mut line_size);
                    } else {
                        current.push(' ');
                    }
                }
                _ => {}
            }
        }
        flush(&mut current, &mut line_size);
        Ok(lines)
    }

    /// Runs poppler's `pdftotext` and splits its output into pages on form
    /// feeds. Plain text extraction, not OCR.
    fn extract_with_pdftotext(path: &Path) -> Result<Vec<(u32, Vec<TextLine>)>> {
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(path)
            .arg("-")
            .output()
            .with_context(|| "Failed to execute pdftotext. Is poppler-utils installed?")?;

        if !output.status.success() {
            return Err(anyhow!(
                "pdftotext failed with status: {}\nError: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        let text = String::from_utf8(output.stdout).with_context(|| "pdftotext output not valid UTF-8")?;
        let pages = split_pdftotext_pages(&text);
        if pages.is_empty() {
            return Err(anyhow!("pdftotext extracted no text"));
        }
        Ok(pages)
    }
}

/// Appends a separate text draw to the current line, with a space unless
/// whitespace already separates the two.
fn append_draw(current: &mut String, drawn: &str) {
    let joined = current.is_empty()
        || current.ends_with(char::is_whitespace)
        || drawn.starts_with(char::is_whitespace);
    if !joined {
        current.push(' ');
    }
    current.push_str(drawn);
}

fn max_size(line: Option<f32>, current: Option<f32>) -> Option<f32> {
    match (line, current) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn split_pdftotext_pages(text: &str) -> Vec<(u32, Vec<TextLine>)> {
    text.split('\x0c')
        .zip(1u32..)
        .filter_map(|(page, number)| {
            let lines: Vec<TextLine> = page
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| TextLine::plain(l.split_whitespace().collect::<Vec<_>>().join(" ")))
                .collect();
            (!lines.is_empty()).then_some((number, lines))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> HeadingDetector {
        HeadingDetector::new().unwrap()
    }

    #[test]
    fn separate_draws_are_spaced() {
        let mut line = String::new();
        for word in ["Revenue", "growth ", "rose", " sharply"] {
            append_draw(&mut line, word);
        }
        assert_eq!(line, "Revenue growth rose sharply");
    }

    #[test]
    fn recognizes_common_heading_shapes() {
        let d = detector();
        for heading in [
            "Revenue Growth 2024",
            "3.2 Market Share Analysis",
            "Chapter 4 Results",
            "EXECUTIVE SUMMARY",
            "Coastal Adventures",
        ] {
            assert!(d.is_heading(heading, None, None), "{heading}");
        }
    }

    #[test]
    fn rejects_sentences_and_fragments() {
        let d = detector();
        for line in [
            "Revenue grew by twelve percent in the last fiscal year.",
            "The company reported strong results and raised guidance for next year",
            "abc",
            "12 34",
            "lowercase words only here",
        ] {
            assert!(!d.is_heading(line, None, None), "{line}");
        }
    }

    #[test]
    fn larger_font_marks_a_heading() {
        let d = detector();
        assert!(d.is_heading("why margins matter", Some(18.0), Some(11.0)));
        assert!(!d.is_heading("why margins matter", Some(11.0), Some(11.0)));
    }

    #[test]
    fn page_lines_become_fragments() {
        let lines = vec![
            TextLine::plain("intro words before any heading"),
            TextLine::plain("Revenue Growth 2024"),
            TextLine::plain("revenue rose by a wide margin"),
            TextLine::plain("driven by new products"),
            TextLine::plain("OUTLOOK"),
        ];
        let fragments = detector().page_fragments(7, &lines);
        assert_eq!(
            fragments,
            vec![
                Fragment::body(7, "intro words before any heading"),
                Fragment::heading(
                    7,
                    "Revenue Growth 2024",
                    "revenue rose by a wide margin\ndriven by new products"
                ),
                Fragment::heading(7, "OUTLOOK", ""),
            ]
        );
    }

    #[test]
    fn median_ignores_missing_sizes() {
        let lines = vec![
            TextLine { text: "a".into(), font_size: Some(10.0) },
            TextLine { text: "b".into(), font_size: None },
            TextLine { text: "c".into(), font_size: Some(12.0) },
            TextLine { text: "d".into(), font_size: Some(11.0) },
        ];
        assert_eq!(median_font_size(&lines), Some(11.0));
        assert_eq!(median_font_size(&[TextLine::plain("x")]), None);
    }

    #[test]
    fn pdftotext_output_splits_on_form_feeds() {
        let pages = split_pdftotext_pages("  Title  \nbody line\n\x0c\n\x0cthird   page\n");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].0, 1);
        assert_eq!(pages[0].1, vec![TextLine::plain("Title"), TextLine::plain("body line")]);
        assert_eq!(pages[1].0, 3);
        assert_eq!(pages[1].1, vec![TextLine::plain("third page")]);
    }
}
