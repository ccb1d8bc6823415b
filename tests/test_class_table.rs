//! Loading the class name table from disk.

mod common;

use common::*;
use std::io::Write;

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "nc = 2\n\n[names]\n0 = \"2.1\"\n1 = \"5.16\"")?;

    let table = ClassNameTable::load(file.path())?;
    assert_eq!(table.len(), 2);
    assert_eq!(table.label_for(1), "5.16");
    assert_eq!(table.label_for(2), "Class 2");
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = ClassNameTable::load(&dir.path().join("classes.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read class table"));
}
