//! Publishing quiz files to disk.

use crate::common::StubRenderer;
use md2moodle_core::moodle_xml::{AnswerNumbering, XmlOptions};
use md2moodle_core::publish::{convert_file, publish, PublishSpec};
use md2moodle_core::QuizError;
use std::fs;
use tempfile::tempdir;

const GIF: &[u8] = b"GIF89a";

#[test]
fn test_local_image_is_embedded_relative_to_input() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("img")).unwrap();
    fs::write(dir.path().join("img/dot.gif"), GIF).unwrap();
    let input = dir.path().join("week.md");
    fs::write(&input, "# Images\n* What is this?\n![a dot](img/dot.gif)\n- !a dot\n- a line\n").unwrap();

    let written = publish(PublishSpec::new(&input, &StubRenderer)).unwrap();

    assert_eq!(written, vec![dir.path().join("week-Images.xml")]);
    let xml = fs::read_to_string(&written[0]).unwrap();
    assert!(xml.contains("src=\"data:image/gif;base64,R0lGODlh\" alt=\"a dot\""));
}

#[test]
fn test_missing_image_is_a_resource_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("week.md");
    fs::write(&input, "# Images\n* What is this?\n![gone](missing.png)\n- !a\n").unwrap();

    let err = publish(PublishSpec::new(&input, &StubRenderer)).unwrap_err();

    match err {
        QuizError::Resource { path, location, .. } => {
            assert_eq!(path, dir.path().join("missing.png"));
            assert_eq!(location.question, Some(1));
        }
        other => panic!("expected resource error, got {other:?}"),
    }
    assert!(!dir.path().join("week-Images.xml").exists());
}

#[test]
fn test_numbering_option_reaches_every_question() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("quiz.md");
    fs::write(&input, "# C\n* One\n- !a\n* Two\n- !b\n").unwrap();

    let spec = PublishSpec::new(&input, &StubRenderer)
        .with_xml_options(XmlOptions::new(AnswerNumbering::UpperAlpha));
    let documents = convert_file(&spec).unwrap();

    assert_eq!(
        documents[0]
            .xml
            .matches("<answernumbering>ABCD</answernumbering>")
            .count(),
        2
    );
}

#[test]
fn test_convert_file_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("quiz.md");
    fs::write(&input, "# C\n* One\n- !a\n").unwrap();

    let documents = convert_file(&PublishSpec::new(&input, &StubRenderer)).unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_existing_output_is_overwritten() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("quiz.md");
    fs::write(&input, "# C\n* One\n- !a\n").unwrap();
    fs::write(dir.path().join("quiz-C.xml"), "stale").unwrap();

    publish(PublishSpec::new(&input, &StubRenderer)).unwrap();

    let xml = fs::read_to_string(dir.path().join("quiz-C.xml")).unwrap();
    assert!(xml.starts_with("<?xml"));
}
