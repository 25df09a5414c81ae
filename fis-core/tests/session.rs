//! Conversational round trips with a scripted provider.


use fis_core::chat::mock::{MockProvider, MockReply};
use fis_core::{EncodeOptions, GenerateSettings, PreambleLanguage, ProjectSession};
use fixture::Project;

fn settings(project: &Project) -> GenerateSettings {
    GenerateSettings::new(project.path()).with_options(EncodeOptions {
        preamble: Some(PreambleLanguage::English),
        use_ignore_rules: true,
        suppress_own_format_files: true,
        custom_rules: None,
    })
}

#[test]
fn test_start_writes_default_document() {
    let project = Project::with_files(&[("src/lib.rs", "pub fn a() {}\n")]);
    let (session, encoded) = ProjectSession::start(settings(&project)).unwrap();

    assert_eq!(encoded.text_files, vec!["src/lib.rs"]);
    let fis_file = &session.settings().fis_file;
    assert!(fis_file.to_string_lossy().ends_with("_prj_desc.fis"));
    assert_eq!(std::fs::read_to_string(fis_file).unwrap(), session.document());
}

#[test]
fn test_ask_apply_regenerate() {
    let project = Project::with_files(&[("src/lib.rs", "pub fn a() {}\n")]);
    let (mut session, _) = ProjectSession::start(settings(&project)).unwrap();

    let reply = "Rename it:\n```fis\n$$$ src/lib.rs [REPLACE]\npub fn b() {}\n\n```\n";
    let mut provider = MockProvider::new([MockReply::chunked(reply, 7)]);

    let mut streamed = String::new();
    let response = session
        .ask(&mut provider, "Rename a to b", |chunk| streamed.push_str(chunk))
        .unwrap()
        .to_string();
    assert_eq!(response, reply);
    assert_eq!(streamed, reply);

    let prompt = &provider.prompts()[0];
    assert!(prompt.contains("$$$ src/lib.rs\npub fn a() {}\n"));
    assert!(prompt.trim_end().ends_with("Rename a to b"));

    let report = session.apply_last_response().unwrap();
    assert!(report.is_success());
    assert_eq!(project.read("src/lib.rs"), "pub fn b() {}\n");

    session.regenerate().unwrap();
    assert!(session.document().contains("$$$ src/lib.rs\npub fn b() {}\n"));
    assert!(!session.document().contains("_prj_desc.fis"));
}

#[test]
fn test_interrupted_stream_keeps_partial_reply() {
    let project = Project::with_files(&[("a.txt", "a")]);
    let (mut session, _) = ProjectSession::start(settings(&project)).unwrap();

    let mut provider = MockProvider::new([MockReply::ChunksThenError {
        chunks: vec!["partial ".to_string(), "answer".to_string()],
        error: "connection reset".to_string(),
    }]);
    let err = session.ask(&mut provider, "q", |_| {}).unwrap_err();
    assert!(format!("{err:?}").contains("connection reset"));
    assert_eq!(session.last_response(), "partial answer");
}

#[test]
fn test_retry_repeats_last_question() {
    let project = Project::with_files(&[("a.txt", "a")]);
    let (mut session, _) = ProjectSession::start(settings(&project)).unwrap();
    let mut provider = MockProvider::new([
        MockReply::Refuse("rate limited".to_string()),
        MockReply::Chunks(vec!["ok".to_string()]),
    ]);

    assert!(session.retry(&mut provider, |_| {}).is_err());
    assert!(session.ask(&mut provider, "What is a.txt?", |_| {}).is_err());
    assert_eq!(session.retry(&mut provider, |_| {}).unwrap(), "ok");
    assert_eq!(provider.prompts().len(), 2);
    assert_eq!(provider.prompts()[0], provider.prompts()[1]);
}

#[test]
fn test_apply_without_response_fails() {
    let project = Project::with_files(&[("a.txt", "a")]);
    let (session, _) = ProjectSession::start(settings(&project)).unwrap();
    assert!(session.apply_last_response().is_err());
}
