use anyhow::{Context, Result};
use std::path::Path;

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Largest byte index `<= max_bytes` that falls on a char boundary.
pub fn floor_char_boundary(text: &str, max_bytes: usize) -> usize {
    if max_bytes >= text.len() {
        return text.len();
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Short log-friendly preview of `text`.
pub fn preview(text: &str, max_bytes: usize) -> String {
    let end = floor_char_boundary(text, max_bytes);
    if end < text.len() {
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}
