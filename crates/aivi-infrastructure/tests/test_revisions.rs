use aivi_core::config::AiviConfig;
use aivi_infrastructure::revision::{ReadStatus, StepDirection, TranscriptAction, WriteStatus};
use aivi_infrastructure::{RevisionManager, load_config};
use std::fs;
use tempfile::TempDir;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_reopened_session_continues_numbering() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("draft.md");

    let mut first = RevisionManager::open(&path);
    assert_eq!(
        first.write(&lines(&["one"]), &lines(&["tighten"]), "Freestyle"),
        WriteStatus::Wrote
    );
    assert_eq!(
        first.write(&lines(&["two"]), &lines(&["tighten"]), "Freestyle"),
        WriteStatus::Wrote
    );
    drop(first);

    let mut second = RevisionManager::open(&path);
    assert_eq!(second.rev(), 2);
    let outcome = second.read();
    assert_eq!(outcome.status, ReadStatus::Read);
    assert_eq!(outcome.lines, ["two"]);

    second.write(&lines(&["three"]), &[] as &[String], "Freestyle");
    assert_eq!(second.rev(), 3);
    assert_eq!(fs::read_to_string(temp_dir.path().join("draft.3.md")).unwrap(), "two\n");

    let transcript = fs::read_to_string(temp_dir.path().join("draft.2.ctx")).unwrap();
    assert_eq!(transcript, "000<[Freestyle][Write]tighten\n");
}

#[test]
fn test_exchange_artifacts_share_the_current_revision() {
    let temp_dir = TempDir::new().unwrap();
    let mut manager = RevisionManager::open(temp_dir.path().join("quickai.txt"));
    manager.write(&lines(&["text"]), &[] as &[String], "Zen");

    manager.append_transcript(TranscriptAction::Query, "Zen", &["text"]);
    let document = aivi_core::context::ContextDocument {
        model: "gpt-4o".into(),
        max_tokens: 64,
        messages: Vec::new(),
    };
    assert!(manager.save_context(&document));
    manager.record_original(&lines(&["text"]));
    manager.store_subrevision(&lines(&["text", "reply"]), &document, "concatenate");

    for name in ["quickai.1.ctx", "quickai.1.cog.json", "quickai.1.1.subrev"] {
        assert!(temp_dir.path().join(name).exists(), "{name} missing");
    }
    assert_eq!(manager.rev(), 1);
    assert_eq!(manager.step_subrevision(StepDirection::Forward), Some(lines(&["text"])));
}

#[test]
fn test_config_file_replaces_catalogue() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[[viewpoint]]
name = "Proofreader"
instructions = ["Fix spelling only."]
model = "gpt-4o-mini"
max_tokens = 300
text_ops = ["inline"]

[[viewpoint]]
name = "Ghost"
model = "gpt-4o-mini"
max_tokens = 300
hidden = true
"#,
    )
    .unwrap();

    let config: AiviConfig = load_config(&path).unwrap();
    let names: Vec<_> = config
        .viewpoints_or_presets()
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, ["Proofreader", "Ghost"]);
}
