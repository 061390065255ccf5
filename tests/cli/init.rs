use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("Created .xluarc.json"));

    let config: Value = serde_json::from_str(&test.read_file(".xluarc.json")?)?;
    assert_eq!(config["output"], "messages.pot");
    assert_eq!(config["outputFormat"], "po");
    assert_eq!(config["keywords"], Value::Array(Vec::new()));
    assert!(config.get("addComments").is_none());
    Ok(())
}

#[test]
fn test_init_keeps_existing_config() -> Result<()> {
    let test = CliTest::with_file(".xluarc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".xluarc.json already exists"));
    assert_eq!(test.read_file(".xluarc.json")?, "{}");
    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::with_file("main.lua", "print(_(\"Ready\"))\n")?;

    let init = test.command().arg("init").output()?;
    assert_eq!(init.status.code(), Some(0));

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(test.read_file("messages.pot")?.contains("msgid \"Ready\""));
    Ok(())
}
