mod common;

#[test]
fn chapter_seeds_database_and_delete_needs_confirmation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = common::run_cli(
        dir.path(),
        &["--chapter", "delete"],
        "DELETE FROM users WHERE username = 'alice';\n\\cancel\nSELECT count(*) FROM users;\n",
    )?;
    assert!(out.contains("Chapter delete:"), "{out}");
    assert!(out.contains("Preview: 1 rows will be deleted. Confirm?"), "{out}");
    assert!(out.contains("Delete cancelled"), "{out}");
    assert!(out.contains("| 3        |"), "{out}");
    Ok(())
}

#[test]
fn state_survives_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::run_cli(
        dir.path(),
        &[],
        "CREATE TABLE notes (body TEXT);\nINSERT INTO notes VALUES ('kept'), ('gone');\nDELETE FROM notes WHERE body = 'gone';\n\\confirm-delete\n",
    )?;

    let out = common::run_cli(dir.path(), &[], "\\tables\n")?;
    assert!(out.contains("Table: notes"), "{out}");
    assert!(out.contains("kept"), "{out}");
    assert!(!out.contains("gone"), "{out}");

    let out = common::run_cli(dir.path(), &["--reset"], "\\tables\n")?;
    assert!(out.contains("(no tables)"), "{out}");
    Ok(())
}

#[test]
fn in_memory_mode_saves_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    common::run_cli(dir.path(), &["--in-memory"], "CREATE TABLE t (a);\n")?;
    let out = common::run_cli(dir.path(), &[], "\\tables\n")?;
    assert!(out.contains("(no tables)"), "{out}");
    Ok(())
}

#[test]
fn drop_preview_marks_table() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = common::run_cli(
        dir.path(),
        &["--in-memory", "--chapter", "drop"],
        "DROP TABLE users;\n\\confirm\n\\tables\n",
    )?;
    assert!(out.contains("Table: users  [drop]"), "{out}");
    assert!(out.contains("Table users dropped"), "{out}");
    assert!(out.contains("(no tables)"), "{out}");
    Ok(())
}
