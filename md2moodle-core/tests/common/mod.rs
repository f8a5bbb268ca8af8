//! Shared helpers for the integration tests.

use md2moodle_core::error::RenderError;
use md2moodle_core::highlight::CodeImageRenderer;
use md2moodle_core::moodle_xml::XmlOptions;
use md2moodle_core::publish::{convert_document, CategoryDocument};
use md2moodle_core::{QuizError, RenderContext};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// PNG signature bytes, base64 `iVBORw0KGgo=`.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Renders every code fence as the PNG signature, so tests never need pygmentize.
pub struct StubRenderer;

impl CodeImageRenderer for StubRenderer {
    fn render(&self, _source: &str, _lexer: Option<&str>) -> Result<Vec<u8>, RenderError> {
        Ok(PNG_SIGNATURE.to_vec())
    }
}

static QUESTION_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})[0-9a-f]{32}").unwrap());

pub fn convert_in(
    source: &str,
    base_dir: &Path,
    options: &XmlOptions,
) -> Result<Vec<CategoryDocument>, QuizError> {
    let ctx = RenderContext::new(base_dir, &StubRenderer);
    convert_document(source, "quiz", &ctx, options)
}

pub fn convert(source: &str) -> Result<Vec<CategoryDocument>, QuizError> {
    convert_in(source, Path::new("."), &XmlOptions::default())
}

/// Convert a document that must hold exactly one category and return its XML.
pub fn single_category_xml(source: &str) -> String {
    let mut documents = convert(source).expect("conversion failed");
    assert_eq!(documents.len(), 1, "expected exactly one category");
    documents.remove(0).xml
}

/// Replace the digest part of question names, keeping the ordinal.
pub fn redact_names(xml: &str) -> String {
    QUESTION_NAME.replace_all(xml, "$1[digest]").into_owned()
}
