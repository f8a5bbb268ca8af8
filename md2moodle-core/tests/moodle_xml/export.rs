//! Export tests (quiz source → Moodle XML)

use crate::common::{convert, redact_names, single_category_xml};
use insta::assert_snapshot;

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_single_correct_answer() {
    let xml = single_category_xml("# Basics\n* Q?\n    - a\n    - !b\n");

    assert!(xml.contains("<answer fraction=\"0\">\n      <text>a</text>"));
    assert!(xml.contains("<answer fraction=\"100\">\n      <text>b</text>"));
    assert!(xml.contains("<single>true</single>"));
}

#[test]
fn test_three_of_four_correct() {
    let xml = single_category_xml("# Basics\n* Pick three\n    - !a\n    - !b\n    - c\n    - !d\n");

    assert_eq!(xml.matches("<answer fraction=\"33.3333333\">").count(), 3);
    assert_eq!(xml.matches("<answer fraction=\"0\">").count(), 1);
    assert!(xml.contains("<single>false</single>"));
}

#[test]
fn test_inline_code_in_answer() {
    let xml = single_category_xml("# Basics\n* Which one?\n    - !`x`\n    - y\n");

    assert!(xml.contains("<answer fraction=\"100\" format=\"html\">"));
    assert!(xml.contains("<![CDATA[<p><code>x</code></p>]]>"));
    assert!(!xml.contains("`x`"));
    assert!(xml.contains("<text>y</text>"));
}

#[test]
fn test_image_fence_is_embedded() {
    let xml = single_category_xml(
        "# Basics\n* What does this print?\n```c{img}\nputs(\"hi\");\n```\n    - !hi\n    - nothing\n",
    );

    assert!(!xml.contains("{img}"));
    assert!(!xml.contains("puts("));
    assert!(xml.contains("<img style=\"display:block;\" src=\"data:image/png;base64,iVBORw0KGgo=\" />"));
}

// ============================================================================
// INLINE CONTENT
// ============================================================================

#[test]
fn test_code_fence_is_escaped_once() {
    let xml = single_category_xml("# C\n* Output?\n```c\nif (a < b && b > c) {}\n```\n- !yes\n");

    assert!(xml.contains("<pre><code>if (a &lt; b &amp;&amp; b &gt; c) {}</code></pre>"));
    assert!(!xml.contains("&amp;lt;"));
}

#[test]
fn test_math_is_passed_through() {
    let xml = single_category_xml("# C\n* Solve $x < 2$\n- !$x = 1$\n- $x = 3$\n");

    assert!(xml.contains("<p>Solve \\(x < 2\\)</p>"));
    assert!(xml.contains("<![CDATA[<p>\\(x = 1\\)</p>]]>"));
}

#[test]
fn test_markdown_emphasis_in_statement() {
    let xml = single_category_xml("# C\n* Is **this** _emphasized_?\n- !yes\n- no\n");

    assert!(xml.contains("<p>Is <strong>this</strong> <em>emphasized</em>?</p>"));
}

#[test]
fn test_plain_answers_are_escaped() {
    let xml = single_category_xml("# C\n* Compare\n- !a < b & c\n- b\n");

    assert!(xml.contains("<text>a &lt; b &amp; c</text>"));
}

#[test]
fn test_remote_image_keeps_url() {
    let xml = single_category_xml("# C\n* Look\n![chart](https://example.com/c.png)\n- !ok\n");

    assert!(xml.contains(
        "<img style=\"display:block;\" src=\"https://example.com/c.png\" alt=\"chart\" />"
    ));
}

// ============================================================================
// OPTIONS AND NAMES
// ============================================================================

#[test]
fn test_question_names_are_deterministic() {
    let source = "# C\n* One\n- !a\n* Two\n- !b\n- c\n";
    let first = convert(source).unwrap();
    let second = convert(source).unwrap();

    assert_eq!(first, second);
    assert!(first[0].xml.contains("<text>0001"));
    assert!(first[0].xml.contains("<text>0002"));
}

#[test]
fn test_changed_content_changes_name() {
    let a = single_category_xml("# C\n* One\n- !a\n- b\n");
    let b = single_category_xml("# C\n* One\n- a\n- !b\n");

    assert_ne!(a, b);
    assert_eq!(redact_names(&a).matches("0001[digest]").count(), 1);
}

#[test]
fn test_document_snapshot() {
    let xml = single_category_xml("# Basics\n* What is $1+1$?\n    - 1\n    - !2\n");

    assert_snapshot!(redact_names(&xml), @r###"
<?xml version="1.0" encoding="UTF-8"?>
<quiz>
  <question type="category">
    <category>
      <text>Basics</text>
    </category>
  </question>
  <question type="multichoice">
    <name>
      <text>0001[digest]</text>
    </name>
    <questiontext format="html">
      <text><![CDATA[<p>What is \(1+1\)?</p>]]></text>
    </questiontext>
    <answer fraction="0">
      <text>1</text>
    </answer>
    <answer fraction="100">
      <text>2</text>
    </answer>
    <shuffleanswers>1</shuffleanswers>
    <single>true</single>
    <answernumbering>abc</answernumbering>
  </question>
</quiz>
"###);
}
