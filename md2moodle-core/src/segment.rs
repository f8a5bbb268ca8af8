//! Block segmentation (source text → typed blocks)
//!
//!     The quiz dialect is line oriented. Every line is first classified on its own by
//!     [`classify_line`], which returns one of a closed set of [`LineKind`]s. The [`Segmenter`]
//!     then walks the lines, tracks whether it is inside a code fence, and yields [`SourceBlock`]s
//!     lazily.
//!
//!     Grammar (line anchored, leading whitespace allowed everywhere):
//!
//!         # Category name
//!         * Question statement, continued on following plain lines
//!             - wrong answer
//!             - !correct answer
//!         ```lexer            (or ```lexer{img} to render the block as an image)
//!         verbatim code
//!         ```
//!
//!     The `!` correctness marker and the `{img}` fence suffix are handled here only, so the
//!     model never sees them.
//!
//!     Fences do not nest: any fence delimiter seen while inside a fence closes it.

use std::iter::Enumerate;
use std::str::Lines;

const FENCE: &str = "```";
const IMAGE_SUFFIX: &str = "{img}";

/// Classification of a single line, independent of any surrounding state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Header(&'a str),
    Question(&'a str),
    Answer { text: &'a str, correct: bool },
    /// Fence delimiter with its (trimmed, possibly empty) info string
    Fence(&'a str),
    Blank,
    Text(&'a str),
}

/// Classify one line of source text.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Some(name) = trimmed.strip_prefix("# ") {
        return LineKind::Header(name.trim());
    }
    if let Some(statement) = strip_marker(trimmed, '*') {
        return LineKind::Question(statement.trim_end());
    }
    if let Some(rest) = strip_marker(trimmed, '-') {
        let rest = rest.trim_start();
        return match rest.strip_prefix('!') {
            Some(text) => LineKind::Answer {
                text: text.trim(),
                correct: true,
            },
            None => LineKind::Answer {
                text: rest.trim_end(),
                correct: false,
            },
        };
    }
    if let Some(info) = trimmed.strip_prefix(FENCE) {
        return LineKind::Fence(info.trim());
    }
    LineKind::Text(trimmed.trim_end())
}

/// Strip a list-style marker character that must be followed by whitespace.
fn strip_marker(line: &str, marker: char) -> Option<&str> {
    let rest = line.strip_prefix(marker)?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}

/// Split a fence info string into its lexer name and the image-rendering flag.
pub fn parse_fence_info(info: &str) -> (Option<&str>, bool) {
    let (lexer, render_as_image) = match info.strip_suffix(IMAGE_SUFFIX) {
        Some(lexer) => (lexer.trim(), true),
        None => (info, false),
    };
    let lexer = if lexer.is_empty() { None } else { Some(lexer) };
    (lexer, render_as_image)
}

/// A typed block of the quiz document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    CategoryHeader(&'a str),
    QuestionStart(&'a str),
    AnswerLine {
        text: &'a str,
        marked_correct: bool,
    },
    CodeFenceOpen {
        lexer: Option<&'a str>,
        render_as_image: bool,
    },
    CodeFenceLine(&'a str),
    CodeFenceClose,
    PlainLine(&'a str),
    BlankLine,
}

/// A block together with the source line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBlock<'a> {
    /// 1-based line number
    pub line: usize,
    /// The line exactly as written (without line terminator)
    pub raw: &'a str,
    pub block: Block<'a>,
}

/// Lazy iterator over the blocks of a quiz document.
#[derive(Debug)]
pub struct Segmenter<'a> {
    lines: Enumerate<Lines<'a>>,
    in_fence: bool,
    last_line: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().enumerate(),
            in_fence: false,
            last_line: 0,
        }
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = SourceBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some((index, raw)) = self.lines.next() else {
            // An unterminated fence is closed at end of input
            if self.in_fence {
                self.in_fence = false;
                return Some(SourceBlock {
                    line: self.last_line + 1,
                    raw: "",
                    block: Block::CodeFenceClose,
                });
            }
            return None;
        };
        let line = index + 1;
        self.last_line = line;

        let block = if self.in_fence {
            if raw.trim_start().starts_with(FENCE) {
                self.in_fence = false;
                Block::CodeFenceClose
            } else {
                Block::CodeFenceLine(raw)
            }
        } else {
            match classify_line(raw) {
                LineKind::Header(name) => Block::CategoryHeader(name),
                LineKind::Question(statement) => Block::QuestionStart(statement),
                LineKind::Answer { text, correct } => Block::AnswerLine {
                    text,
                    marked_correct: correct,
                },
                LineKind::Fence(info) => {
                    self.in_fence = true;
                    let (lexer, render_as_image) = parse_fence_info(info);
                    Block::CodeFenceOpen {
                        lexer,
                        render_as_image,
                    }
                }
                LineKind::Blank => Block::BlankLine,
                LineKind::Text(text) => Block::PlainLine(text),
            }
        };

        Some(SourceBlock { line, raw, block })
    }
}

/// Segment a whole document.
pub fn segment(source: &str) -> Segmenter<'_> {
    Segmenter::new(source)
}
