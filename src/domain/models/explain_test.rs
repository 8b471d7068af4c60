use super::ExplainFraming;

#[test]
fn it_defaults_to_document_framing() {
    assert_eq!(ExplainFraming::default(), ExplainFraming::Document);
}

#[test]
fn it_frames_documents() {
    let framed = ExplainFraming::Document.frame("fn main() {}");
    assert_eq!(
        framed,
        "Please explain the following text in a clear and concise manner:\n\nfn main() {}"
    );
}

#[test]
fn it_frames_selections() {
    let framed = ExplainFraming::Selection.frame("let x = 1;");
    insta::assert_snapshot!(framed, @r###"
    Please explain the content below the line
    -----------------------------------------
    let x = 1;
    "###);
}

#[test]
fn it_frames_with_custom_prefixes() {
    let framing = ExplainFraming::Custom("Summarize: ".to_string());
    assert_eq!(framing.frame("abc"), "Summarize: abc");
}
