/*!
 * Routine definition loading
 */

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::path::PathBuf;

use copia::error::{CopiaError, EXIT_FATAL};
use copia::routines::RoutineBook;

#[test]
fn test_load_json_definitions() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.json");
    file.write_str(
        r#"{
            "docs": { "sources": ["/home/me/Documents"], "destinations": ["/mnt/a", "/mnt/b"] },
            "photos": { "sources": ["/pics", "/more/pics"], "destinations": ["/mnt/a"] }
        }"#,
    )
    .unwrap();

    let book = RoutineBook::load(file.path()).unwrap();
    assert_eq!(book.names().collect::<Vec<_>>(), vec!["docs", "photos"]);

    let docs = book.get("docs").unwrap();
    assert_eq!(docs.sources, vec![PathBuf::from("/home/me/Documents")]);
    assert_eq!(docs.destinations.len(), 2);
}

#[test]
fn test_load_toml_definitions() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.toml");
    file.write_str(
        "[docs]\nsources = [\"/home/me/Documents\"]\ndestinations = [\"/mnt/a\"]\n",
    )
    .unwrap();

    let book = RoutineBook::load(file.path()).unwrap();
    assert_eq!(book.len(), 1);
    assert_eq!(book.get("docs").unwrap().destinations, vec![PathBuf::from("/mnt/a")]);
}

#[test]
fn test_missing_definitions_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.json");
    file.assert(predicate::path::missing());

    let err = RoutineBook::load(file.path()).unwrap_err();
    assert!(matches!(err, CopiaError::Config(_)));
    assert_eq!(err.exit_code(), EXIT_FATAL);
    assert!(predicate::str::contains("cannot read routine definitions").eval(err.to_string().as_str()));
}

#[test]
fn test_unknown_field_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.json");
    file.write_str(r#"{ "docs": { "sources": [], "destinations": [], "exclude": [] } }"#)
        .unwrap();

    let err = RoutineBook::load(file.path()).unwrap_err();
    assert!(predicate::str::contains("malformed").eval(err.to_string().as_str()));
}

#[test]
fn test_missing_destinations_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.json");
    file.write_str(r#"{ "docs": { "sources": ["/a"] } }"#).unwrap();

    assert!(RoutineBook::load(file.path()).is_err());
}

#[test]
fn test_empty_definitions_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.child("routines.json");
    file.write_str("{}").unwrap();

    let err = RoutineBook::load(file.path()).unwrap_err();
    assert!(predicate::str::contains("no routines defined").eval(err.to_string().as_str()));
}

#[test]
fn test_resolve_keeps_requested_order() {
    let book = RoutineBook::from_json_str(
        r#"{
            "a": { "sources": ["/a"], "destinations": ["/d"] },
            "b": { "sources": ["/b"], "destinations": ["/d"] }
        }"#,
    )
    .unwrap();

    let names = ["b", "a", "b"];
    let resolved = book.resolve(&names).unwrap();
    let order: Vec<&str> = resolved.iter().map(|(name, _)| *name).collect();
    assert_eq!(order, vec!["b", "a", "b"]);

    let err = book.resolve(&["a", "c"]).unwrap_err();
    assert!(matches!(err, CopiaError::UnknownRoutine(ref name) if name == "c"));
}
