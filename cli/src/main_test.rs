use super::*;
use serde_json::json;

#[test]
fn assignment_splits_on_first_equals() {
    assert_eq!(parse_assignment("title=A = B").unwrap(), ("title".into(), "A = B".into()));
    assert_eq!(parse_assignment(" tags =war, media").unwrap(), ("tags".into(), "war, media".into()));
    assert_eq!(parse_assignment("excerpt=").unwrap(), ("excerpt".into(), String::new()));
}

#[test]
fn assignment_requires_field_name() {
    assert!(matches!(parse_assignment("no-equals"), Err(CliError::InvalidAssignment(_))));
    assert!(matches!(parse_assignment("=value"), Err(CliError::InvalidAssignment(_))));
    assert!(parse_assignments(&["a=1".into(), "bad".into()]).is_err());
}

#[test]
fn yes_answers() {
    assert!(is_yes("y\n"));
    assert!(is_yes(" YES "));
    assert!(!is_yes("\n"));
    assert!(!is_yes("nope"));
}

#[test]
fn record_renders_display_text() {
    let record = Record::from_json(json!({
        "id": "1",
        "featured": true,
        "tags": ["a", "b"],
        "publishedDate": "2024-01-15T10:30:00"
    }))
    .unwrap();
    assert_eq!(
        render_record(&record),
        "id             1\nfeatured       Yes\ntags           [a, b]\npublishedDate  2024-01-15\n"
    );
}

#[test]
fn parses_edit_command() {
    let cli = Cli::try_parse_from([
        "admin-cli",
        "--base-url",
        "http://localhost:9000/api",
        "edit",
        "news_articles",
        "1",
        "--set",
        "featured=false",
        "--set",
        "title=X",
    ])
    .unwrap();
    assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000/api"));
    let Command::Edit { collection, record_id, assignments } = cli.command else {
        panic!("expected edit");
    };
    assert_eq!((collection.as_str(), record_id.as_str()), ("news_articles", "1"));
    assert_eq!(assignments, vec!["featured=false", "title=X"]);
}

#[test]
fn edit_requires_an_assignment() {
    assert!(Cli::try_parse_from(["admin-cli", "edit", "news_articles", "1"]).is_err());
}

#[test]
fn delete_defaults_to_prompt() {
    let cli = Cli::try_parse_from(["admin-cli", "delete", "faq", "3"]).unwrap();
    assert!(matches!(cli.command, Command::Delete { yes: false, .. }));
}
