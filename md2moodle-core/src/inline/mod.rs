//! Inline transformation (markdown text runs → HTML fragments)
//!
//!     Quiz text mixes ordinary markdown prose with a few constructs that need special
//!     treatment for Moodle:
//!
//!     | Source               | Output                                              |
//!     |----------------------|-----------------------------------------------------|
//!     | `` `code` ``         | `<code>…</code>`, `<`, `>` and `&` escaped          |
//!     | `$math$`, `$$math$$` | `\(math\)` for Moodle's MathJax filter, unescaped   |
//!     | `![alt](path)`       | `<img>` with a base64 data URI                      |
//!     | `![alt](https://…)`  | `<img>` pointing at the URL                         |
//!     | code fence           | `<pre><code>…</code></pre>` or a rendered PNG image |
//!
//!     Spans are matched left to right, without overlap, and the first alternative that
//!     matches at a position wins. Each span is rendered (and escaped) exactly once and
//!     replaced by an opaque placeholder. The remaining prose is handed to comrak, and the
//!     placeholders are swapped back into comrak's output, so no markup is ever escaped or
//!     interpreted twice.

pub mod media;
pub mod verbatim;

use crate::error::{Location, QuizError, RenderError};
use crate::highlight::CodeImageRenderer;
use crate::model::AnswerMarkup;
use comrak::{markdown_to_html, ComrakOptions};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

static INLINE_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"`(?P<code>[^`]+)`",
        r"|\$\$(?P<display_math>.+?)\$\$",
        r"|\$(?P<math>[^$]+)\$",
        r"|!\[(?P<alt>[^\]]*)\]\((?P<target>[^)\s]+)\)",
    ))
    .unwrap()
});

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// A placeholder as written, or percent-encoded by comrak inside a link destination.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new("\u{E000}(?P<raw>[0-9]+)\u{E001}|%EE%80%80(?P<encoded>[0-9]+)%EE%80%81").unwrap()
});

static IMAGE_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)\s]+\)").unwrap());

/// Errors raised while rendering inline content. The builder attaches a [`Location`].
#[derive(Debug, Error)]
pub enum InlineError {
    #[error("cannot read image '{}': {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl InlineError {
    pub fn at(self, location: Location) -> QuizError {
        match self {
            InlineError::Resource { path, source } => QuizError::Resource {
                location,
                path,
                source,
            },
            InlineError::Render(source) => QuizError::Render { location, source },
        }
    }
}

/// Everything inline rendering needs from the outside world.
pub struct RenderContext<'r> {
    /// Directory that relative image paths are resolved against
    pub base_dir: PathBuf,
    pub code_renderer: &'r dyn CodeImageRenderer,
}

impl<'r> RenderContext<'r> {
    pub fn new(base_dir: impl Into<PathBuf>, code_renderer: &'r dyn CodeImageRenderer) -> Self {
        Self {
            base_dir: base_dir.into(),
            code_renderer,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// A lexical piece of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Text(&'a str),
    Code(&'a str),
    Math(&'a str),
    Image { alt: &'a str, target: &'a str },
}

/// Split a text run into plain text and quiz-specific spans.
pub fn scan_spans(text: &str) -> Vec<Span<'_>> {
    scan_spans_with_source(text)
        .into_iter()
        .map(|(span, _)| span)
        .collect()
}

/// Like [`scan_spans`], keeping the source text of every span.
fn scan_spans_with_source(text: &str) -> Vec<(Span<'_>, &str)> {
    let mut spans = Vec::new();
    let mut last = 0;
    for caps in INLINE_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            let plain = &text[last..whole.start()];
            spans.push((Span::Text(plain), plain));
        }
        spans.push((classify_span(&caps), whole.as_str()));
        last = whole.end();
    }
    if last < text.len() {
        let plain = &text[last..];
        spans.push((Span::Text(plain), plain));
    }
    spans
}

fn classify_span<'a>(caps: &Captures<'a>) -> Span<'a> {
    if let Some(code) = caps.name("code") {
        Span::Code(code.as_str())
    } else if let Some(math) = caps.name("display_math").or_else(|| caps.name("math")) {
        Span::Math(math.as_str())
    } else {
        Span::Image {
            alt: caps.name("alt").map_or("", |m| m.as_str()),
            target: caps.name("target").map_or("", |m| m.as_str()),
        }
    }
}

/// Whether the text contains any span that needs HTML rendering.
pub fn has_inline_spans(text: &str) -> bool {
    INLINE_SPAN.is_match(text)
}

/// Whether the text references an image.
pub fn has_image_reference(text: &str) -> bool {
    IMAGE_REFERENCE.is_match(text)
}

/// Render a single quiz-specific span. Plain text spans are returned unchanged.
pub fn render_span(span: Span<'_>, ctx: &RenderContext<'_>) -> Result<String, InlineError> {
    match span {
        Span::Text(text) => Ok(text.to_string()),
        Span::Code(code) => Ok(format!("<code>{}</code>", escape_html(code))),
        Span::Math(math) => Ok(format!("\\({math}\\)")),
        Span::Image { alt, target } => media::render_image(alt, target, ctx),
    }
}

/// A rendered span waiting to replace its placeholder.
struct Fragment {
    html: String,
    /// The span as the author wrote it, used where the placeholder ended up in a URL
    source: String,
}

/// Render a run of prose into an HTML fragment (paragraph-wrapped by comrak).
pub fn render_prose(text: &str, ctx: &RenderContext<'_>) -> Result<String, InlineError> {
    let mut markdown = String::with_capacity(text.len());
    let mut fragments: Vec<Fragment> = Vec::new();
    for (span, source) in scan_spans_with_source(text) {
        match span {
            Span::Text(plain) => {
                // Delimiter code points written by the author are protected like spans
                for c in plain.chars() {
                    if c == PLACEHOLDER_OPEN || c == PLACEHOLDER_CLOSE {
                        markdown.push_str(&placeholder(fragments.len()));
                        fragments.push(Fragment {
                            html: c.to_string(),
                            source: c.to_string(),
                        });
                    } else {
                        markdown.push(c);
                    }
                }
            }
            other => {
                markdown.push_str(&placeholder(fragments.len()));
                fragments.push(Fragment {
                    html: render_span(other, ctx)?,
                    source: source.to_string(),
                });
            }
        }
    }

    let html = markdown_to_html(&markdown, &base_renderer_options());
    let html = PLACEHOLDER.replace_all(&html, |caps: &Captures<'_>| {
        let (index, in_url) = match (caps.name("raw"), caps.name("encoded")) {
            (Some(index), _) => (index.as_str(), false),
            (None, Some(index)) => (index.as_str(), true),
            (None, None) => return caps[0].to_string(),
        };
        match index.parse::<usize>().ok().and_then(|i| fragments.get(i)) {
            Some(fragment) if in_url => escape_attribute(&fragment.source),
            Some(fragment) => fragment.html.clone(),
            None => caps[0].to_string(),
        }
    });
    Ok(html.trim_end().to_string())
}

/// Render an answer: HTML when it uses inline spans, plain text otherwise.
pub fn render_answer(text: &str, ctx: &RenderContext<'_>) -> Result<AnswerMarkup, InlineError> {
    if has_inline_spans(text) {
        render_prose(text, ctx).map(AnswerMarkup::Html)
    } else {
        Ok(AnswerMarkup::Plain(text.to_string()))
    }
}

fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_OPEN}{index}{PLACEHOLDER_CLOSE}")
}

/// Options for the comrak base renderer.
fn base_renderer_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    // Authors may embed raw HTML in prose
    options.render.unsafe_ = true;
    options
}

/// Escape `&`, `<` and `>` for HTML text content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape text for use inside a double-quoted HTML attribute.
pub fn escape_attribute(text: &str) -> String {
    escape_html(text).replace('"', "&quot;")
}
