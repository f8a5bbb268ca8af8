//! Document publishing pipeline.
//!
//! Provides a high-level API for converting a quiz document into one Moodle XML file per
//! category. Everything is converted in memory first; files are only written once the
//! whole document converted successfully, so a failing conversion leaves no partial
//! output behind.
//!
//! For more control over the conversion process, use [`convert_document`] or the
//! [`crate::builder`] and [`crate::moodle_xml`] modules directly.

use crate::builder::build_quiz;
use crate::error::{Location, QuizError, Result};
use crate::highlight::CodeImageRenderer;
use crate::inline::RenderContext;
use crate::moodle_xml::{serialize_category, XmlOptions};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One serialized category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDocument {
    pub category: String,
    /// Output file name, see [`output_file_name`]
    pub file_name: String,
    pub xml: String,
}

/// Convert quiz source text into one XML document per category, in source order.
///
/// `input_stem` is the base name used for output file names.
pub fn convert_document(
    source: &str,
    input_stem: &str,
    ctx: &RenderContext<'_>,
    options: &XmlOptions,
) -> Result<Vec<CategoryDocument>> {
    let quiz = build_quiz(source, ctx)?;

    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut documents = Vec::with_capacity(quiz.categories.len());
    for category in &quiz.categories {
        let file_name = output_file_name(input_stem, &category.name);
        if let Some(previous) = seen.insert(file_name.clone(), &category.name) {
            return Err(QuizError::structural(
                Location::default().in_category(category.name.as_str()),
                format!(
                    "category '{}' and '{previous}' would both be written to '{file_name}'",
                    category.name
                ),
            ));
        }
        documents.push(CategoryDocument {
            category: category.name.clone(),
            file_name,
            xml: serialize_category(category, options),
        });
    }
    Ok(documents)
}

/// Output file name for a category: `<input stem>-<sanitized category>.xml`.
pub fn output_file_name(input_stem: &str, category: &str) -> String {
    format!("{input_stem}-{}.xml", sanitize_file_component(category))
}

/// Make a category name safe for use in a file name.
///
/// Whitespace is dropped, ASCII alphanumerics, `-` and `_` are kept, anything else
/// becomes `_`.
pub fn sanitize_file_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "category".to_string()
    } else {
        sanitized
    }
}

/// Specifies how to publish a quiz file.
///
/// ```ignore
/// let renderer = PygmentizeRenderer::default();
/// let spec = PublishSpec::new("quiz.md", &renderer)
///     .with_output_dir("out")
///     .with_xml_options(XmlOptions::new(AnswerNumbering::Numeric));
/// let written = publish(spec)?;
/// ```
pub struct PublishSpec<'a> {
    /// The markdown quiz to convert
    pub input: PathBuf,
    /// Directory receiving the XML files (defaults to the input's directory)
    pub output_dir: Option<PathBuf>,
    pub xml: XmlOptions,
    pub code_renderer: &'a dyn CodeImageRenderer,
}

impl<'a> PublishSpec<'a> {
    pub fn new(input: impl AsRef<Path>, code_renderer: &'a dyn CodeImageRenderer) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output_dir: None,
            xml: XmlOptions::default(),
            code_renderer,
        }
    }

    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_xml_options(mut self, xml: XmlOptions) -> Self {
        self.xml = xml;
        self
    }
}

/// Input file stem and directory used for image resolution and default output.
fn input_parts(input: &Path) -> (String, PathBuf) {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quiz".to_string());
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    (stem, dir)
}

/// Convert a quiz file in memory without writing anything.
pub fn convert_file(spec: &PublishSpec<'_>) -> Result<Vec<CategoryDocument>> {
    let source =
        fs::read_to_string(&spec.input).map_err(|e| QuizError::io(&spec.input, e))?;
    let (stem, input_dir) = input_parts(&spec.input);
    let ctx = RenderContext::new(input_dir, spec.code_renderer);
    convert_document(&source, &stem, &ctx, &spec.xml)
}

/// Convert a quiz file and write one XML file per category.
///
/// Returns the written paths in category order.
///
/// # Errors
///
/// Returns [`QuizError`] if the input cannot be read, the document is malformed, an
/// image or code block cannot be rendered, or an output file cannot be written. Nothing
/// is written unless the whole document converted.
pub fn publish(spec: PublishSpec<'_>) -> Result<Vec<PathBuf>> {
    let documents = convert_file(&spec)?;
    let output_dir = match &spec.output_dir {
        Some(dir) => dir.clone(),
        None => input_parts(&spec.input).1,
    };
    fs::create_dir_all(&output_dir).map_err(|e| QuizError::io(&output_dir, e))?;

    let mut written = Vec::with_capacity(documents.len());
    for document in documents {
        let path = output_dir.join(&document.file_name);
        fs::write(&path, document.xml.as_bytes()).map_err(|e| QuizError::io(&path, e))?;
        info!(category = %document.category, path = %path.display(), "wrote question bank");
        written.push(path);
    }
    Ok(written)
}
