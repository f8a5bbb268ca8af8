//! Moodle XML serialization
//!
//! Serializes one [`Category`] into a complete Moodle XML question bank:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <quiz>
//!   <question type="category">          ← makes Moodle file the questions into the category
//!     <category>
//!       <text>Category name</text>
//!     </category>
//!   </question>
//!   <question type="multichoice">
//!     <name><text>0001…</text></name>
//!     <questiontext format="html"><text><![CDATA[…]]></text></questiontext>
//!     <answer fraction="100">…</answer>
//!     <shuffleanswers>1</shuffleanswers>
//!     <single>true</single>
//!     <answernumbering>abc</answernumbering>
//!   </question>
//! </quiz>
//! ```
//!
//! The category question only takes effect when "Get category from file" is checked on
//! import.

use crate::model::{AnswerMarkup, Category, Question};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Moodle's `answernumbering` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AnswerNumbering {
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "abc")]
    LowerAlpha,
    #[serde(rename = "ABCD")]
    UpperAlpha,
    #[serde(rename = "123")]
    Numeric,
}

impl AnswerNumbering {
    pub const ALL: [AnswerNumbering; 4] = [
        AnswerNumbering::None,
        AnswerNumbering::LowerAlpha,
        AnswerNumbering::UpperAlpha,
        AnswerNumbering::Numeric,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerNumbering::None => "none",
            AnswerNumbering::LowerAlpha => "abc",
            AnswerNumbering::UpperAlpha => "ABCD",
            AnswerNumbering::Numeric => "123",
        }
    }
}

impl fmt::Display for AnswerNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnswerNumbering::ALL
            .into_iter()
            .find(|numbering| numbering.as_str() == s)
            .ok_or_else(|| {
                format!("unknown answer numbering '{s}' (expected one of: none, abc, ABCD, 123)")
            })
    }
}

/// Options for Moodle XML output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlOptions {
    pub answer_numbering: AnswerNumbering,
}

impl XmlOptions {
    pub fn new(answer_numbering: AnswerNumbering) -> Self {
        Self { answer_numbering }
    }
}

/// Serialize a category into a standalone Moodle XML document.
pub fn serialize_category(category: &Category, options: &XmlOptions) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<quiz>\n");

    xml.push_str("  <question type=\"category\">\n");
    xml.push_str("    <category>\n");
    push_text_element(&mut xml, 3, &category.name);
    xml.push_str("    </category>\n");
    xml.push_str("  </question>\n");

    for question in &category.questions {
        push_question(&mut xml, question, options);
    }

    xml.push_str("</quiz>\n");
    xml
}

fn push_question(xml: &mut String, question: &Question, options: &XmlOptions) {
    xml.push_str("  <question type=\"multichoice\">\n");

    xml.push_str("    <name>\n");
    push_text_element(xml, 3, &question.name);
    xml.push_str("    </name>\n");

    xml.push_str("    <questiontext format=\"html\">\n");
    push_cdata_element(xml, 3, &question.markup);
    xml.push_str("    </questiontext>\n");

    for answer in &question.answers {
        let fraction = format_fraction(answer.fraction);
        match &answer.markup {
            AnswerMarkup::Plain(text) => {
                xml.push_str(&format!("    <answer fraction=\"{fraction}\">\n"));
                push_text_element(xml, 3, text);
            }
            AnswerMarkup::Html(html) => {
                xml.push_str(&format!(
                    "    <answer fraction=\"{fraction}\" format=\"html\">\n"
                ));
                push_cdata_element(xml, 3, html);
            }
        }
        xml.push_str("    </answer>\n");
    }

    xml.push_str("    <shuffleanswers>1</shuffleanswers>\n");
    xml.push_str(&format!("    <single>{}</single>\n", question.is_single()));
    xml.push_str(&format!(
        "    <answernumbering>{}</answernumbering>\n",
        options.answer_numbering
    ));
    xml.push_str("  </question>\n");
}

fn push_text_element(xml: &mut String, indent_level: usize, text: &str) {
    let indent = "  ".repeat(indent_level);
    xml.push_str(&format!("{indent}<text>{}</text>\n", escape_xml(text)));
}

fn push_cdata_element(xml: &mut String, indent_level: usize, content: &str) {
    let indent = "  ".repeat(indent_level);
    xml.push_str(&format!("{indent}<text>{}</text>\n", wrap_cdata(content)));
}

/// Wrap content in CDATA, splitting any `]]>` across sections so the document stays
/// well-formed.
pub fn wrap_cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

/// Escape text for XML element content and attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format a fraction for the `fraction` attribute: 7 decimals, trailing zeros removed.
pub fn format_fraction(fraction: f64) -> String {
    let formatted = format!("{fraction:.7}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
