//! Quiz entity model
//!
//! A [`Quiz`] owns its [`Category`]s, which own their [`Question`]s, which own their
//! [`Answer`]s. The graph is produced in a single pass by [`crate::builder`] and is not
//! mutated afterwards; serializers only read it.

/// A whole converted document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quiz {
    pub categories: Vec<Category>,
}

/// A named group of questions, introduced by a `# ` header line.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub name: String,
    pub questions: Vec<Question>,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// 1-based position within the category
    pub ordinal: usize,
    /// Statement lines as written, joined with `\n`
    pub raw: String,
    /// Statement split into prose runs and code fences
    pub statement: Vec<StatementPart>,
    /// Rendered statement markup
    pub markup: String,
    pub answers: Vec<Answer>,
    /// Stable identifier, see [`crate::naming`]
    pub name: String,
}

impl Question {
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }

    /// Moodle's `single` flag: exactly one answer is correct.
    pub fn is_single(&self) -> bool {
        self.correct_count() == 1
    }
}

/// One piece of a question statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementPart {
    /// A run of prose, already joined into a single markdown paragraph
    Text(String),
    Code(CodeFence),
}

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    pub lexer: Option<String>,
    pub render_as_image: bool,
    /// Fence body, lines joined with `\n`
    pub source: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Answer text with the correctness marker stripped
    pub text: String,
    pub is_correct: bool,
    pub markup: AnswerMarkup,
    /// Moodle credit percentage
    pub fraction: f64,
}

/// Rendered answer content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerMarkup {
    /// No inline markup was found; the text is emitted as-is (XML escaped)
    Plain(String),
    /// HTML fragment, emitted inside CDATA
    Html(String),
}

impl AnswerMarkup {
    pub fn as_str(&self) -> &str {
        match self {
            AnswerMarkup::Plain(text) | AnswerMarkup::Html(text) => text,
        }
    }
}
