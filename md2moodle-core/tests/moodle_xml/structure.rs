//! Category boundaries and structural errors.

use crate::common::convert;
use md2moodle_core::QuizError;

fn structural_error(source: &str) -> (String, usize) {
    match convert(source) {
        Err(QuizError::Structural { location, message }) => (message, location.line),
        other => panic!("expected a structural error, got {other:?}"),
    }
}

#[test]
fn test_one_document_per_category() {
    let documents = convert(
        "# Week 1\n* Q1\n- !a\n* Q2\n- !b\n\n# Week 2\n* Q3\n- !c\n- d\n",
    )
    .unwrap();

    let names: Vec<_> = documents.iter().map(|d| d.category.as_str()).collect();
    assert_eq!(names, vec!["Week 1", "Week 2"]);
    assert_eq!(documents[0].file_name, "quiz-Week1.xml");
    assert_eq!(documents[1].file_name, "quiz-Week2.xml");

    assert_eq!(documents[0].xml.matches("type=\"multichoice\"").count(), 2);
    assert_eq!(documents[1].xml.matches("type=\"multichoice\"").count(), 1);
    assert!(!documents[0].xml.contains("Q3"));
    assert!(documents[1].xml.contains("<text>Week 2</text>"));
}

#[test]
fn test_question_order_is_preserved() {
    let documents = convert("# C\n* First\n- !a\n* Second\n- !a\n* Third\n- !a\n").unwrap();
    let xml = &documents[0].xml;

    let first = xml.find("First").unwrap();
    let second = xml.find("Second").unwrap();
    let third = xml.find("Third").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn test_crlf_input() {
    let documents = convert("# C\r\n* Q?\r\n    - a\r\n    - !b\r\n").unwrap();

    assert!(documents[0].xml.contains("<text>b</text>"));
    assert!(!documents[0].xml.contains('\r'));
}

#[test]
fn test_errors_report_the_offending_line() {
    assert_eq!(
        structural_error("# C\n* Q?\n- a\n- b\n"),
        ("question has no answer marked correct".to_string(), 2)
    );
    assert_eq!(
        structural_error("# C\n* Q?\n- !a\n\nstray text\n"),
        ("statement text after answers".to_string(), 5)
    );
    assert_eq!(
        structural_error("intro\n# C\n* Q?\n- !a\n"),
        ("text before the first category".to_string(), 1)
    );
}

#[test]
fn test_unterminated_fence_closes_at_end() {
    let (message, _) = structural_error("# C\n* Q?\n```c\nint x;\n- !a\n");

    assert_eq!(message, "question has no answers");
}

#[test]
fn test_one_bad_question_fails_everything() {
    let result = convert("# Good\n* Q\n- !a\n# Bad\n* R\n");

    assert!(result.is_err());
}
