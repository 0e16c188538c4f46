use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, output_text};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    let (stdout, _) = output_text(&output);

    assert!(output.status.success());
    assert_eq!(stdout, "\u{2713} Created .realmgenrc.json\n");

    let content = test.read_file(".realmgenrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["modelFiles"], serde_json::json!(["**/*models.ts"]));
    assert_eq!(parsed["output"], "__generated__/schemas.ts");
    assert_eq!(parsed["tags"]["primaryKey"], "realm_primary_key");
    assert_eq!(parsed["exportedOnly"], true);
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".realmgenrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    let (_, stderr) = output_text(&output);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr, "Error: .realmgenrc.json already exists\n");
    assert_eq!(test.read_file(".realmgenrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file(
        "models.ts",
        "/** @realm */\nexport interface Note { noteId: string; body: string }",
    )?;

    let output = test.generate_command().output()?;
    assert!(
        output.status.success(),
        "Generate should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(test.read_file("__generated__/schemas.ts")?.contains("primaryKey: 'noteId',"));

    Ok(())
}
