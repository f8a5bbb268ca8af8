//! Markdown quizzes to Moodle XML question banks
//!
//!     This crate converts a lightweight markdown quiz document into Moodle XML files, one per
//!     category, ready for Moodle's "Import questions" page.
//!
//!     This is a pure lib, that is, it powers the md2moodle cli but is shell agnostic: no code
//!     should be written that supposes a shell environment, be it std print, env vars etc. The
//!     one exception is the pygmentize backend in ./highlight.rs, which has to find and run an
//!     external program.
//!
//! The Document Format
//!
//!     # Category name
//!     * Question statement, *markdown* allowed
//!       more statement text
//!     ```c{img}
//!     int main(void) { return 0; }
//!     ```
//!         - wrong answer
//!         - !correct answer
//!
//!     Categories are `# ` headers, questions are `* ` items and answers are `- ` items, with
//!     `!` marking the correct ones. Inline `code`, $math$ and ![alt](images) work in both
//!     statements and answers.
//!
//! Architecture
//!
//!     The conversion is a straight pipeline, each step in its own module:
//!
//!     source ─► segment ─► builder ─► model ─► moodle_xml ─► publish
//!                            │
//!                            └─► inline (code, math, images, comrak)
//!
//!     The file structure :
//!     .
//!     ├── error.rs            # QuizError and source locations
//!     ├── segment.rs          # Line classification into blocks
//!     ├── builder.rs          # State machine assembling the quiz
//!     ├── model.rs            # Quiz / Category / Question / Answer
//!     ├── scoring.rs          # Answer fractions
//!     ├── naming.rs           # Deterministic question names
//!     ├── inline
//!     │   ├── mod.rs          # Inline spans and markdown rendering
//!     │   ├── media.rs        # Images as data URIs
//!     │   └── verbatim.rs     # Code fences
//!     ├── highlight.rs        # Code to PNG rendering
//!     ├── moodle_xml.rs       # XML serialization
//!     └── publish.rs          # File level conversion and output
//!
//! Core Algorithms
//!
//!     The document is flat, the quiz is nested. The builder (./builder.rs) is a small state
//!     machine (no category / in category / in question / in fence) that consumes one block at a
//!     time and closes questions and categories as their successors appear. Any structural
//!     problem aborts the whole conversion with the offending line, so no partial question bank
//!     is ever produced.
//!
//!     Inline spans are rendered before markdown, then swapped for placeholders while comrak runs
//!     and put back afterwards. That way code and math are escaped exactly once.
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── common
//!     │   └── mod.rs
//!     ├── moodle_xml
//!     │   └── <testname>.rs
//!     └── publish
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
pub mod builder;
pub mod error;
pub mod highlight;
pub mod inline;
pub mod model;
pub mod moodle_xml;
pub mod naming;
pub mod publish;
pub mod scoring;
pub mod segment;

pub use builder::build_quiz;
pub use error::{Location, QuizError, RenderError, Result};
pub use highlight::{CodeImageRenderer, PygmentizeOptions, PygmentizeRenderer};
pub use inline::RenderContext;
pub use model::{Answer, AnswerMarkup, Category, Question, Quiz};
pub use moodle_xml::{serialize_category, AnswerNumbering, XmlOptions};
pub use publish::{convert_document, convert_file, publish, CategoryDocument, PublishSpec};
