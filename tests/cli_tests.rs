use std::{fs, path::PathBuf};

use cond_probe::cli::{CheckOptions, CliError, describe_split, execute_check, load_document};
use pretty_assertions::assert_eq;

fn options(condition: &str, input: &str) -> CheckOptions {
    CheckOptions {
        condition: condition.to_string(),
        input: Some(input.to_string()),
        ..CheckOptions::default()
    }
}

#[test]
fn test_exit_codes_follow_the_result() {
    let held = execute_check(&options("@.a == 1", r#"{"a": 1}"#)).unwrap();
    assert_eq!(held.exit_code(), 0);

    let failed = execute_check(&options("@.a == 2", r#"{"a": 1}"#)).unwrap();
    assert_eq!(failed.exit_code(), 1);
}

#[test]
fn test_document_from_file() {
    let path = std::env::temp_dir().join(format!("cond-probe-cli-{}.json", std::process::id()));
    fs::write(&path, r#"{"documentid": "CO-G1-CO18"}"#).unwrap();

    let outcome = execute_check(&CheckOptions {
        condition: "documentid == 'CO-G1-CO18'".to_string(),
        file: Some(path.clone()),
        ..CheckOptions::default()
    });
    fs::remove_file(&path).unwrap();

    assert!(outcome.unwrap().report.result);
}

#[test]
fn test_input_errors() {
    assert!(matches!(load_document(None, None), Err(CliError::NoInput)));
    assert!(matches!(
        load_document(Some("{}"), Some(&PathBuf::from("x.json"))),
        Err(CliError::ConflictingInput)
    ));
    assert!(matches!(load_document(Some("{not json"), None), Err(CliError::Json(_))));

    let missing = PathBuf::from("/nonexistent/cond-probe/doc.json");
    let err = load_document(None, Some(&missing)).unwrap_err();
    assert!(matches!(err, CliError::File { .. }));
    assert!(err.to_string().starts_with("Cannot read /nonexistent/cond-probe/doc.json"));
}

#[test]
fn test_engine_error_surfaces_as_eval_error() {
    let err = execute_check(&options("@.a[?(@ =)] == 1", r#"{"a": []}"#)).unwrap_err();
    assert!(matches!(err, CliError::Eval(_)));
}

#[test]
fn test_describe_split() {
    let text = describe_split("$[?(@.amount < 0 && @.lines empty false || @.flag)]");
    assert_eq!(
        text,
        "Group 1:\n\
         \x20 @.amount < 0  (comparison, number literal)\n\
         \x20 @.lines empty false  (emptiness)\n\
         Group 2:\n\
         \x20 @.flag  (error: malformed clause '@.flag': expected '<path> empty true|false' or '<path> <op> <literal>')\n"
    );
    assert_eq!(describe_split(""), "(no clauses)\n");
}
