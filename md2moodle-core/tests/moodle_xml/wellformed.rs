//! Every exported document must parse as XML, whatever the author wrote.

use crate::common::{convert, single_category_xml};
use md2moodle_core::QuizError;
use proptest::prelude::*;

fn answer_texts(xml: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).expect("exported XML must be well-formed");
    doc.descendants()
        .filter(|n| n.has_tag_name("answer"))
        .filter_map(|answer| {
            answer
                .children()
                .find(|c| c.has_tag_name("text"))
                .and_then(|text| text.text())
                .map(str::to_string)
        })
        .collect()
}

#[test]
fn test_document_structure() {
    let xml = single_category_xml("# Rust & <C>\n* Which \"quotes\"?\n- !'single'\n- \"double\"\n");
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let root = doc.root_element();
    assert!(root.has_tag_name("quiz"));
    let questions: Vec<_> = root.children().filter(|n| n.is_element()).collect();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].attribute("type"), Some("category"));
    assert_eq!(questions[1].attribute("type"), Some("multichoice"));

    let category_name = questions[0]
        .descendants()
        .find(|n| n.has_tag_name("text"))
        .and_then(|n| n.text());
    assert_eq!(category_name, Some("Rust & <C>"));
    assert_eq!(answer_texts(&xml), vec!["'single'", "\"double\""]);
}

#[test]
fn test_html_answer_content_survives_parsing() {
    let xml = single_category_xml("# C\n* Q\n- !`a<b`\n- c\n");

    assert_eq!(
        answer_texts(&xml),
        vec!["<p><code>a&lt;b</code></p>", "c"]
    );
}

#[test]
fn test_control_characters_never_reach_the_document() {
    let sources = [
        "# C\n* Q\n- !a\u{0C}b\n",
        "# C\n* Q\u{0B}x\n- !a\n",
        "# C\n* Q\n```\nx\u{01}y\n```\n- !a\n",
        "# C\u{1F}\n* Q\n- !a\n",
    ];
    for source in sources {
        match convert(source) {
            Err(QuizError::Structural { message, .. }) => {
                assert!(message.contains("cannot be written to XML"), "{message}");
            }
            Ok(documents) => panic!("converted {source:?} into {:?}", documents[0].xml),
            Err(other) => panic!("unexpected error for {source:?}: {other}"),
        }
    }
}

fn has_control_char(text: &str) -> bool {
    text.chars().any(|c| c.is_control() && c != '\t')
}

proptest! {
    #[test]
    fn plain_answers_round_trip_through_xml(
        statement in "[a-zA-Z<>&\"'\\]\\x01\\x0B\\x0C\\x1F]{1,20}",
        answers in prop::collection::vec("[a-zA-Z<>&\"'\\]\\x01\\x0B\\x0C]{1,12}", 1..5),
    ) {
        let mut source = format!("# Category\n* {statement}\n");
        for (i, answer) in answers.iter().enumerate() {
            let marker = if i == 0 { "!" } else { "" };
            source.push_str(&format!("    - {marker}{answer}\n"));
        }

        let rejected = has_control_char(&statement) || answers.iter().any(|a| has_control_char(a));
        match convert(&source) {
            Ok(documents) => {
                prop_assert!(!rejected);
                prop_assert_eq!(answer_texts(&documents[0].xml), answers);
            }
            Err(QuizError::Structural { message, .. }) => {
                prop_assert!(rejected);
                prop_assert!(message.contains("cannot be written to XML"));
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
