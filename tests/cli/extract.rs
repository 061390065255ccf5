use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, stderr, stdout};

const SAMPLE: &str = r#"-- TRANSLATORS: shown on the title screen
print(_("Welcome"))
print(_"Quit")
local n = gettext.ngettext("%d file", "%d files", count)
"#;

#[test]
fn test_extract_writes_default_output() -> Result<()> {
    let test = CliTest::with_file("main.lua", SAMPLE)?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("Extracted 3 messages from 1 file into messages.pot"));

    let pot = test.read_file("messages.pot")?;
    assert!(pot.starts_with("# SOME DESCRIPTIVE TITLE."));
    assert!(pot.contains("\"Plural-Forms: nplurals=INTEGER; plural=EXPRESSION;\\n\"\n"));
    assert!(pot.contains("#: main.lua:2\nmsgid \"Welcome\"\nmsgstr \"\"\n"));
    assert!(pot.contains("#: main.lua:3\nmsgid \"Quit\"\nmsgstr \"\"\n"));
    assert!(pot.contains(
        "#: main.lua:4\n#, lua-format\nmsgid \"%d file\"\nmsgid_plural \"%d files\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
    ));
    Ok(())
}

#[test]
fn test_extract_to_stdout() -> Result<()> {
    let test = CliTest::with_file("main.lua", "print(_(\"Hello\"))\n")?;

    let output = test
        .extract_command()
        .args(["-o", "-", "--omit-header"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "#: main.lua:1\nmsgid \"Hello\"\nmsgstr \"\"\n");
    assert!(stderr(&output).contains("into stdout"));
    assert!(!test.root().join("messages.pot").exists());
    Ok(())
}

#[test]
fn test_extract_json() -> Result<()> {
    let test = CliTest::with_file("src/ui.lua", "local t = pgettext(\"menu\", \"Open\")\n")?;

    let output = test
        .extract_command()
        .args(["-k", "pgettext:1c,2", "--format", "json", "-o", "-"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        value,
        json!([
            {
                "context": "menu",
                "msgid": "Open",
                "positions": [{ "file": "src/ui.lua", "line": 1 }],
                "format": "undecided"
            }
        ])
    );
    Ok(())
}

#[test]
fn test_extract_custom_keywords() -> Result<()> {
    let test = CliTest::with_file("main.lua", "tr(\"A\")\n_(\"B\")\ntrn(x, \"C\", \"Cs\")\n")?;

    let output = test
        .extract_command()
        .args([
            "--no-default-keywords",
            "-k",
            "tr",
            "-k",
            "trn:2,3",
            "--omit-header",
            "--no-location",
            "-o",
            "-",
        ])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "msgid \"A\"\nmsgstr \"\"\n\nmsgid \"C\"\nmsgid_plural \"Cs\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n"
    );
    Ok(())
}

#[test]
fn test_extract_add_comments() -> Result<()> {
    let test = CliTest::with_file("main.lua", SAMPLE)?;

    let output = test
        .extract_command()
        .args(["--add-comments=TRANSLATORS:", "--omit-header", "-o", "-"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with(
        "#. TRANSLATORS: shown on the title screen\n#: main.lua:2\nmsgid \"Welcome\"\n"
    ));
    assert!(!stdout(&output).contains("#. \n"));
    Ok(())
}

#[test]
fn test_extract_sort_output() -> Result<()> {
    let test = CliTest::with_file("main.lua", "_(\"b\") _(\"c\") _(\"a\")\n")?;

    let output = test
        .extract_command()
        .args(["--sort-output", "--omit-header", "--no-location", "-o", "-"])
        .output()?;
    assert_eq!(
        stdout(&output),
        "msgid \"a\"\nmsgstr \"\"\n\nmsgid \"b\"\nmsgstr \"\"\n\nmsgid \"c\"\nmsgstr \"\"\n"
    );
    Ok(())
}

#[test]
fn test_extract_merges_duplicates_across_files() -> Result<()> {
    let test = CliTest::with_file("a.lua", "_(\"Save\")\n")?;
    test.write_file("b.lua", "\n\n_(\"Save\")\n")?;

    let output = test
        .extract_command()
        .args(["--omit-header", "-o", "-"])
        .output()?;
    assert_eq!(
        stdout(&output),
        "#: a.lua:1 b.lua:3\nmsgid \"Save\"\nmsgstr \"\"\n"
    );
    assert!(stderr(&output).contains("Extracted 1 message from 2 files"));
    Ok(())
}

#[test]
fn test_extract_explicit_paths() -> Result<()> {
    let test = CliTest::with_file("src/a.lua", "_(\"A\")\n")?;
    test.write_file("other/b.lua", "_(\"B\")\n")?;
    test.write_file("scripts/run", "_(\"C\")\n")?;

    let output = test
        .extract_command()
        .args(["src", "scripts/run", "--omit-header", "-o", "-"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "#: scripts/run:1\nmsgid \"C\"\nmsgstr \"\"\n\n#: src/a.lua:1\nmsgid \"A\"\nmsgstr \"\"\n"
    );
    Ok(())
}

#[test]
fn test_extract_uses_config_file() -> Result<()> {
    let test = CliTest::with_file("src/a.lua", "L(\"Hi\")\n_(\"Skip\")\n")?;
    test.write_file("vendor/v.lua", "L(\"Vendor\")\n")?;
    test.write_file(
        ".xluarc.json",
        r#"{
  "includes": ["src"],
  "keywords": ["L"],
  "noDefaultKeywords": true,
  "output": "po/app.pot",
  "omitHeader": true
}"#,
    )?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        test.read_file("po/app.pot")?,
        "#: src/a.lua:1\nmsgid \"Hi\"\nmsgstr \"\"\n"
    );
    Ok(())
}

#[test]
fn test_extract_missing_path_is_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().arg("missing.lua").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Cannot access missing.lua"));
    Ok(())
}

#[test]
fn test_extract_invalid_keyword_is_error() -> Result<()> {
    let test = CliTest::with_file("main.lua", "_(\"x\")\n")?;

    let output = test.extract_command().args(["-k", "tr:0"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error:"));
    Ok(())
}

#[test]
fn test_extract_no_files_warns() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().args(["-o", "-"]).output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("warning: no Lua files found"));
    Ok(())
}
