//! Question model construction (blocks → quiz entities)
//!
//!     The builder is an explicit finite-state machine driven by the block stream:
//!
//!         NoCategory ──# ──▶ InCategory ──* ──▶ InQuestion ──```──▶ InFence
//!                              ▲   ▲                 │  ▲               │
//!                              │   └──────# ─────────┘  └─────```───────┘
//!                              └── * starts the next question
//!
//!     Each state owns only the data needed for the entity it is assembling. An entity is
//!     finalized (validated, rendered, scored and named) as soon as its closing boundary is
//!     seen, so the resulting graph is complete and immutable when the stream ends.
//!
//!     Statement text handling:
//!         - consecutive prose lines are joined with single spaces
//!         - a line referencing an image keeps its own line
//!         - a blank line starts a new paragraph
//!         - code fences become separate statement parts

use crate::error::{Location, QuizError, Result};
use crate::inline::{self, verbatim, RenderContext};
use crate::model::{Answer, Category, CodeFence, Question, Quiz, StatementPart};
use crate::naming::question_name;
use crate::scoring::answer_fractions;
use crate::segment::{segment, Block, SourceBlock};
use tracing::{debug, trace};

/// Build the quiz model for a whole document.
pub fn build_quiz(source: &str, ctx: &RenderContext<'_>) -> Result<Quiz> {
    QuizBuilder::new(ctx).build(source)
}

/// Drives the block stream through the parser states.
pub struct QuizBuilder<'c, 'r> {
    ctx: &'c RenderContext<'r>,
}

enum State<'a> {
    NoCategory,
    InCategory(OpenCategory<'a>),
    InQuestion(OpenCategory<'a>, OpenQuestion<'a>),
    InFence(OpenCategory<'a>, OpenQuestion<'a>, OpenFence<'a>),
}

struct OpenCategory<'a> {
    name: &'a str,
    line: usize,
    raw: &'a str,
    questions: Vec<Question>,
}

struct OpenQuestion<'a> {
    ordinal: usize,
    line: usize,
    raw_line: &'a str,
    raw_lines: Vec<&'a str>,
    parts: Vec<StatementPart>,
    paragraph: Paragraph,
    answers: Vec<PendingAnswer<'a>>,
}

struct PendingAnswer<'a> {
    text: &'a str,
    correct: bool,
    line: usize,
    raw: &'a str,
}

struct OpenFence<'a> {
    lexer: Option<&'a str>,
    render_as_image: bool,
    lines: Vec<&'a str>,
}

/// Prose lines collected for the current paragraph.
#[derive(Default)]
struct Paragraph {
    text: String,
    last_had_image: bool,
}

impl Paragraph {
    fn push_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let has_image = inline::has_image_reference(line);
        if !self.text.is_empty() {
            self.text
                .push(if has_image || self.last_had_image { '\n' } else { ' ' });
        }
        self.text.push_str(line);
        self.last_had_image = has_image;
    }

    fn take(&mut self) -> Option<String> {
        self.last_had_image = false;
        if self.text.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.text))
        }
    }
}

impl<'a> OpenCategory<'a> {
    fn location(&self, line: usize, raw: &str) -> Location {
        Location::new(line, raw).in_category(self.name)
    }
}

impl<'a> OpenQuestion<'a> {
    fn flush_paragraph(&mut self) {
        if let Some(text) = self.paragraph.take() {
            self.parts.push(StatementPart::Text(text));
        }
    }
}

impl<'c, 'r> QuizBuilder<'c, 'r> {
    pub fn new(ctx: &'c RenderContext<'r>) -> Self {
        Self { ctx }
    }

    pub fn build(&self, source: &str) -> Result<Quiz> {
        let mut quiz = Quiz::default();
        let mut state = State::NoCategory;
        let mut last_line = 0;

        for block in segment(source) {
            trace!(line = block.line, block = ?block.block, "segmented block");
            last_line = block.line;
            ensure_xml_chars(block.line, block.raw)?;
            state = self.step(state, block, &mut quiz)?;
        }

        match state {
            State::NoCategory => {}
            State::InCategory(category) => self.close_category(category, &mut quiz)?,
            State::InQuestion(mut category, question) => {
                self.close_question(&mut category, question)?;
                self.close_category(category, &mut quiz)?;
            }
            // The segmenter always closes fences before the stream ends
            State::InFence(category, _, _) => {
                return Err(QuizError::structural(
                    category.location(last_line, ""),
                    "unterminated code fence",
                ));
            }
        }

        if quiz.categories.is_empty() {
            return Err(QuizError::structural(
                Location::new(last_line, ""),
                "document contains no categories (expected a `# ` header line)",
            ));
        }
        Ok(quiz)
    }

    fn step<'a>(
        &self,
        state: State<'a>,
        block: SourceBlock<'a>,
        quiz: &mut Quiz,
    ) -> Result<State<'a>> {
        let SourceBlock { line, raw, block } = block;

        match state {
            State::NoCategory => match block {
                Block::CategoryHeader(name) => open_category(name, line, raw),
                Block::BlankLine => Ok(State::NoCategory),
                Block::QuestionStart(_) => Err(QuizError::structural(
                    Location::new(line, raw),
                    "question before any category",
                )),
                Block::AnswerLine { .. } => Err(QuizError::structural(
                    Location::new(line, raw),
                    "answer before any question",
                )),
                _ => Err(QuizError::structural(
                    Location::new(line, raw),
                    "text before the first category",
                )),
            },

            State::InCategory(category) => match block {
                Block::CategoryHeader(name) => {
                    self.close_category(category, quiz)?;
                    open_category(name, line, raw)
                }
                Block::QuestionStart(statement) => {
                    let question = open_question(&category, statement, line, raw);
                    Ok(State::InQuestion(category, question))
                }
                Block::BlankLine => Ok(State::InCategory(category)),
                Block::AnswerLine { .. } => Err(QuizError::structural(
                    category.location(line, raw),
                    "answer before any question",
                )),
                _ => Err(QuizError::structural(
                    category.location(line, raw),
                    "text outside of a question",
                )),
            },

            State::InQuestion(mut category, mut question) => match block {
                Block::CategoryHeader(name) => {
                    self.close_question(&mut category, question)?;
                    self.close_category(category, quiz)?;
                    open_category(name, line, raw)
                }
                Block::QuestionStart(statement) => {
                    self.close_question(&mut category, question)?;
                    let next = open_question(&category, statement, line, raw);
                    Ok(State::InQuestion(category, next))
                }
                Block::AnswerLine {
                    text,
                    marked_correct,
                } => {
                    if text.is_empty() {
                        return Err(QuizError::structural(
                            question_location(&category, &question, line, raw),
                            "answer has no text",
                        ));
                    }
                    question.answers.push(PendingAnswer {
                        text,
                        correct: marked_correct,
                        line,
                        raw,
                    });
                    Ok(State::InQuestion(category, question))
                }
                Block::PlainLine(text) => {
                    ensure_statement_open(&category, &question, line, raw)?;
                    question.raw_lines.push(raw);
                    question.paragraph.push_line(text);
                    Ok(State::InQuestion(category, question))
                }
                Block::BlankLine => {
                    if question.answers.is_empty() {
                        question.flush_paragraph();
                    }
                    Ok(State::InQuestion(category, question))
                }
                Block::CodeFenceOpen {
                    lexer,
                    render_as_image,
                } => {
                    ensure_statement_open(&category, &question, line, raw)?;
                    question.raw_lines.push(raw);
                    question.flush_paragraph();
                    let fence = OpenFence {
                        lexer,
                        render_as_image,
                        lines: Vec::new(),
                    };
                    Ok(State::InFence(category, question, fence))
                }
                Block::CodeFenceLine(_) | Block::CodeFenceClose => Err(QuizError::structural(
                    question_location(&category, &question, line, raw),
                    "code fence content outside of a fence",
                )),
            },

            State::InFence(category, mut question, mut fence) => match block {
                Block::CodeFenceLine(text) => {
                    question.raw_lines.push(raw);
                    fence.lines.push(text);
                    Ok(State::InFence(category, question, fence))
                }
                Block::CodeFenceClose => {
                    question.raw_lines.push(raw);
                    question.parts.push(StatementPart::Code(CodeFence {
                        lexer: fence.lexer.map(str::to_string),
                        render_as_image: fence.render_as_image,
                        source: fence.lines.join("\n"),
                    }));
                    Ok(State::InQuestion(category, question))
                }
                _ => Err(QuizError::structural(
                    question_location(&category, &question, line, raw),
                    "unexpected block inside a code fence",
                )),
            },
        }
    }

    /// Validate, render, score and name a question, then attach it to its category.
    fn close_question(
        &self,
        category: &mut OpenCategory<'_>,
        mut question: OpenQuestion<'_>,
    ) -> Result<()> {
        question.flush_paragraph();
        let location = Location::new(question.line, question.raw_line)
            .in_category(category.name)
            .in_question(question.ordinal);

        if question.parts.is_empty() {
            return Err(QuizError::structural(location, "question has no statement"));
        }
        if question.answers.is_empty() {
            return Err(QuizError::structural(location, "question has no answers"));
        }
        let flags: Vec<bool> = question.answers.iter().map(|a| a.correct).collect();
        let fractions = answer_fractions(&flags)
            .map_err(|e| QuizError::structural(location.clone(), e.to_string()))?;

        let mut markup = String::new();
        for part in &question.parts {
            let rendered = match part {
                StatementPart::Text(text) => inline::render_prose(text, self.ctx),
                StatementPart::Code(fence) => verbatim::render_fence(fence, self.ctx),
            }
            .map_err(|e| e.at(location.clone()))?;
            if !markup.is_empty() {
                markup.push('\n');
            }
            markup.push_str(&rendered);
        }

        let mut answers = Vec::with_capacity(question.answers.len());
        for (pending, fraction) in question.answers.iter().zip(fractions) {
            let answer_markup = inline::render_answer(pending.text, self.ctx).map_err(|e| {
                e.at(Location::new(pending.line, pending.raw)
                    .in_category(category.name)
                    .in_question(question.ordinal))
            })?;
            answers.push(Answer {
                text: pending.text.to_string(),
                is_correct: pending.correct,
                markup: answer_markup,
                fraction,
            });
        }

        let name = question_name(
            question.ordinal,
            &markup,
            answers.iter().map(|a| (a.is_correct, a.markup.as_str())),
        );
        debug!(
            category = category.name,
            ordinal = question.ordinal,
            name = %name,
            answers = answers.len(),
            "question finalized"
        );

        category.questions.push(Question {
            ordinal: question.ordinal,
            raw: question.raw_lines.join("\n"),
            statement: question.parts,
            markup,
            answers,
            name,
        });
        Ok(())
    }

    fn close_category(&self, category: OpenCategory<'_>, quiz: &mut Quiz) -> Result<()> {
        if category.questions.is_empty() {
            return Err(QuizError::structural(
                category.location(category.line, category.raw),
                "category has no questions",
            ));
        }
        debug!(
            category = category.name,
            questions = category.questions.len(),
            "category finalized"
        );
        quiz.categories.push(Category {
            name: category.name.to_string(),
            questions: category.questions,
        });
        Ok(())
    }
}

fn open_category<'a>(name: &'a str, line: usize, raw: &'a str) -> Result<State<'a>> {
    if name.is_empty() {
        return Err(QuizError::structural(
            Location::new(line, raw),
            "category header has no name",
        ));
    }
    Ok(State::InCategory(OpenCategory {
        name,
        line,
        raw,
        questions: Vec::new(),
    }))
}

fn open_question<'a>(
    category: &OpenCategory<'a>,
    statement: &'a str,
    line: usize,
    raw: &'a str,
) -> OpenQuestion<'a> {
    let mut paragraph = Paragraph::default();
    paragraph.push_line(statement);
    OpenQuestion {
        ordinal: category.questions.len() + 1,
        line,
        raw_line: raw,
        raw_lines: vec![raw],
        parts: Vec::new(),
        paragraph,
        answers: Vec::new(),
    }
}

fn question_location(
    category: &OpenCategory<'_>,
    question: &OpenQuestion<'_>,
    line: usize,
    raw: &str,
) -> Location {
    category
        .location(line, raw)
        .in_question(question.ordinal)
}

/// Characters XML 1.0 cannot carry, not even inside CDATA.
fn is_forbidden_in_xml(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Every piece of output text comes from a source line, so checking lines keeps the
/// serialized documents well-formed.
fn ensure_xml_chars(line: usize, raw: &str) -> Result<()> {
    match raw.chars().find(|&c| is_forbidden_in_xml(c)) {
        None => Ok(()),
        Some(c) => Err(QuizError::structural(
            Location::new(line, raw.escape_debug().to_string()),
            format!("character U+{:04X} cannot be written to XML", c as u32),
        )),
    }
}

/// Statement text is only accepted before the first answer.
fn ensure_statement_open(
    category: &OpenCategory<'_>,
    question: &OpenQuestion<'_>,
    line: usize,
    raw: &str,
) -> Result<()> {
    if question.answers.is_empty() {
        Ok(())
    } else {
        Err(QuizError::structural(
            question_location(category, question, line, raw),
            "statement text after answers",
        ))
    }
}
