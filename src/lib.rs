//! Persona-driven section ranking over a small PDF corpus.
//!
//! [`engine::IntelligenceEngine`] turns per-page extracted text and a
//! persona / job-to-be-done query into ranked sections with refined
//! excerpts. [`pdf_processor`] and [`pipeline`] supply the PDF extraction
//! and file handling around it.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod pdf_processor;
pub mod pipeline;
pub mod presets;
pub mod text;
pub mod utils;

pub use config::EngineConfig;
pub use engine::IntelligenceEngine;
pub use error::{EngineError, EngineResult};
pub use models::{AnalysisRequest, AnalysisResult, Fragment, RawDocument};
