//! Error types for quiz conversion
//!
//! Every failure is fatal for the whole conversion. Errors raised while reading the
//! document carry a [`Location`] so the author can find the offending line.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Position of a problem in the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Name of the enclosing category, if one was open
    pub category: Option<String>,
    /// 1-based ordinal of the enclosing question within its category
    pub question: Option<usize>,
    /// 1-based source line number (0 when the problem is not tied to a line)
    pub line: usize,
    /// The source line as written
    pub content: String,
}

impl Location {
    pub fn new(line: usize, content: impl Into<String>) -> Self {
        Self {
            category: None,
            question: None,
            line,
            content: content.into(),
        }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn in_question(mut self, ordinal: usize) -> Self {
        self.question = Some(ordinal);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)?;
        if let Some(category) = &self.category {
            write!(f, ", category '{category}'")?;
        }
        if let Some(ordinal) = self.question {
            write!(f, ", question {ordinal}")?;
        }
        if !self.content.is_empty() {
            write!(f, " (`{}`)", self.content.trim_end())?;
        }
        Ok(())
    }
}

/// Failure reported by a code-to-image renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No rendering backend could be found or started
    #[error("no code renderer available: {0}")]
    Unavailable(String),
    /// The backend ran but did not produce an image
    #[error("rendering with lexer '{lexer}' failed: {message}")]
    Failed { lexer: String, message: String },
}

/// Errors that can occur while converting a quiz document.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The document does not follow the category / question / answer structure
    #[error("structural error at {location}: {message}")]
    Structural { location: Location, message: String },

    /// A referenced local image could not be read
    #[error("cannot read image '{}' at {location}: {source}", path.display())]
    Resource {
        location: Location,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The code-to-image renderer failed
    #[error("cannot render code block at {location}: {source}")]
    Render {
        location: Location,
        #[source]
        source: RenderError,
    },

    /// The input could not be read or an output could not be written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl QuizError {
    pub fn structural(location: Location, message: impl Into<String>) -> Self {
        QuizError::Structural {
            location,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuizError::Io {
            path: path.into(),
            source,
        }
    }

    /// Source location of the error, when it came from the document itself.
    pub fn location(&self) -> Option<&Location> {
        match self {
            QuizError::Structural { location, .. }
            | QuizError::Resource { location, .. }
            | QuizError::Render { location, .. } => Some(location),
            QuizError::Io { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
