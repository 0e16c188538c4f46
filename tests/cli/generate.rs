use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, output_text};

const EXAMPLE_MODELS: &str = r#"/**
 * @realm Schema
 */
interface Phase {
  name: string;
  phaseId: number;
  articles: Article[];
  optionalFieldsWork?: boolean;
}

interface Article {
  articleId: number;
  title: string;
  /**
   * @realm_index
   *
   */
  url: string;
  content: string;
  type: ArticleType;
  position: ArticlePosition;
  compoundType: CompoundType;
}

enum ArticleType {
  A,
  B,
  C
}

type ArticlePosition = "left" | "center" | "right";

interface SubTypeA {
  a: string;
}

interface SubTypeB {
  b: string;
}

type CompoundType = SubTypeA | SubTypeB;
"#;

const EXAMPLE_SCHEMAS: &str = "// Auto-generated, do not edit
import { ObjectSchema } from 'realm';

// schema based on interface from example/models.ts
export const CompoundTypeSchema: ObjectSchema = {
  name: 'CompoundType',
  properties: {
    a: {
      type: 'string',
      optional: true,
    },
    b: {
      type: 'string',
      optional: true,
    },
  },
};

// schema based on interface from example/models.ts
export const ArticleSchema: ObjectSchema = {
  name: 'Article',
  primaryKey: 'articleId',
  properties: {
    articleId: {
      type: 'int',
    },
    title: {
      type: 'string',
    },
    url: {
      type: 'string',
      indexed: true,
    },
    content: {
      type: 'string',
    },
    type: {
      type: 'int',
    },
    position: {
      type: 'string',
    },
    compoundType: {
      type: 'CompoundType',
    },
  },
};

// schema based on interface from example/models.ts
export const PhaseSchema: ObjectSchema = {
  name: 'Phase',
  primaryKey: 'phaseId',
  properties: {
    name: {
      type: 'string',
    },
    phaseId: {
      type: 'int',
    },
    articles: {
      type: 'list',
      objectType: 'Article',
    },
    optionalFieldsWork: {
      type: 'bool',
      optional: true,
    },
  },
};

export const Schemas = [
  CompoundTypeSchema,
  ArticleSchema,
  PhaseSchema,
];
";

const DEFAULT_OUTPUT: &str = "__generated__/schemas.ts";

#[test]
fn test_generate_example_models() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test.generate_command().output()?;
    let (stdout, stderr) = output_text(&output);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert_eq!(test.read_file(DEFAULT_OUTPUT)?, EXAMPLE_SCHEMAS);
    assert_eq!(
        stdout,
        "\u{2713} Generated 3 schemas from 1 model file into __generated__/schemas.ts\n"
    );
    assert_eq!(stderr, "");

    Ok(())
}

#[test]
fn test_generate_is_deterministic() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    test.generate_command().output()?;
    let first = test.read_file(DEFAULT_OUTPUT)?;

    let output = test.generate_command().output()?;
    let (stdout, _) = output_text(&output);

    assert!(output.status.success());
    assert_eq!(test.read_file(DEFAULT_OUTPUT)?, first);
    assert_eq!(
        stdout,
        "\u{2713} __generated__/schemas.ts is up to date (3 schemas)\n"
    );

    Ok(())
}

#[test]
fn test_check_reports_stale_artifact() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test.generate_command().arg("--check").output()?;
    let (stdout, _) = output_text(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("__generated__/schemas.ts is out of date"));
    assert!(!test.root().join(DEFAULT_OUTPUT).exists());

    test.generate_command().output()?;
    let output = test.generate_command().arg("--check").output()?;
    assert_eq!(output.status.code(), Some(0));

    test.write_file(DEFAULT_OUTPUT, "// edited by hand\n")?;
    let output = test.generate_command().arg("--check").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(test.read_file(DEFAULT_OUTPUT)?, "// edited by hand\n");

    Ok(())
}

#[test]
fn test_stdout_prints_artifact_without_writing() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test.generate_command().arg("--stdout").output()?;
    let (stdout, _) = output_text(&output);

    assert!(output.status.success());
    assert_eq!(stdout, EXAMPLE_SCHEMAS);
    assert!(!test.root().join(DEFAULT_OUTPUT).exists());

    Ok(())
}

#[test]
fn test_out_argument_creates_directories() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test
        .generate_command()
        .args(["--out", "src/db/schemas.ts"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(test.read_file("src/db/schemas.ts")?, EXAMPLE_SCHEMAS);

    Ok(())
}

#[test]
fn test_json_format() -> Result<()> {
    let test = CliTest::with_file(
        "models.ts",
        r#"
/** @realm */
export interface Tag {
  /** @realm_primary_key */
  label: string;
  /** @realm_double */
  weight?: number;
}
"#,
    )?;

    let output = test
        .generate_command()
        .args(["--format", "json", "--stdout"])
        .output()?;
    let (stdout, stderr) = output_text(&output);

    assert!(output.status.success(), "stderr: {}", stderr);
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(
        value,
        json!({
            "schemas": [{
                "name": "Tag",
                "primaryKey": "label",
                "properties": {
                    "label": { "type": "string" },
                    "weight": { "type": "double", "optional": true }
                }
            }]
        })
    );

    Ok(())
}

const MODELS_WITH_PROBLEMS: &str = r#"
interface A { a: string }
interface B { b: string }

/** @realm */
export interface Post {
  postId: string;
  both: A & B;
}
"#;

#[test]
fn test_skipped_fields_are_warnings() -> Result<()> {
    let test = CliTest::with_file("models.ts", MODELS_WITH_PROBLEMS)?;

    let output = test.generate_command().output()?;
    let (stdout, stderr) = output_text(&output);

    assert!(output.status.success());
    assert_eq!(
        stderr,
        "warning: skipping 'Post.both': intersection types are not supported ('A & B')  skipped-field\n  --> models.ts:8:3\n"
    );
    assert!(stdout.starts_with("warning: 1 field or declaration skipped\n"));

    let artifact = test.read_file(DEFAULT_OUTPUT)?;
    assert!(artifact.contains("primaryKey: 'postId',"));
    assert!(!artifact.contains("both"));

    Ok(())
}

#[test]
fn test_strict_fails_on_skipped_fields() -> Result<()> {
    let test = CliTest::with_file("models.ts", MODELS_WITH_PROBLEMS)?;

    let output = test.generate_command().arg("--strict").output()?;
    let (stdout, _) = output_text(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.ends_with("\u{2718} 1 problem with --strict\n"));
    // The artifact is still written.
    assert!(test.root().join(DEFAULT_OUTPUT).exists());

    Ok(())
}

#[test]
fn test_models_resolve_across_imports() -> Result<()> {
    let test = CliTest::with_file(
        "src/blog.models.ts",
        r#"
import { Entity, Author } from './shared';

/** @realm */
export interface Post extends Entity {
  title: string;
  author: Author;
}
"#,
    )?;
    test.write_file(
        "src/shared.ts",
        r#"
export interface Entity { id: string; createdAt: Date }
export interface Author { name: string }
"#,
    )?;

    let output = test
        .generate_command()
        .args(["src/blog.models.ts", "--stdout"])
        .output()?;
    let (stdout, stderr) = output_text(&output);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("// schema based on interface from src/shared.ts\nexport const AuthorSchema"));
    assert!(stdout.contains(
        "  name: 'Post',\n  primaryKey: 'id',\n  properties: {\n    id: {\n      type: 'string',\n    },\n    createdAt: {\n      type: 'date',\n    },\n    title: {"
    ));
    assert!(stdout.ends_with("export const Schemas = [\n  AuthorSchema,\n  PostSchema,\n];\n"));

    Ok(())
}

#[test]
fn test_config_file_settings() -> Result<()> {
    let test = CliTest::with_file(
        ".realmgenrc.json",
        r#"{
  "modelFiles": ["**/*.entity.ts"],
  "tags": { "model": "entity" },
  "shortScalarProperties": true,
  "output": "db/schemas.ts"
}"#,
    )?;
    test.write_file(
        "src/user.entity.ts",
        r#"
/** @entity */
export interface User { userId: string; nickname?: string }
/** @realm */
export interface Ignored { x: string }
"#,
    )?;

    let output = test.generate_command().output()?;
    let (_, stderr) = output_text(&output);

    assert!(output.status.success(), "stderr: {}", stderr);
    let artifact = test.read_file("db/schemas.ts")?;
    assert!(artifact.contains("    userId: 'string',\n    nickname: {\n      type: 'string',\n      optional: true,\n    },\n"));
    assert!(!artifact.contains("Ignored"));

    Ok(())
}

#[test]
fn test_verbose_progress() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test.generate_command().arg("-v").output()?;
    let (_, stderr) = output_text(&output);

    assert_eq!(
        stderr,
        "Note: No .realmgenrc.json found, using default configuration
start
> compiling
> compiled
> processing 'example/models.ts'
> finished 'example/models.ts'
> generating schemas
> finished generating schemas
done
"
    );

    Ok(())
}

#[test]
fn test_missing_root_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.generate_command().arg("missing.ts").output()?;
    let (_, stderr) = output_text(&output);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.starts_with("Error: Root path does not exist:"));
    assert!(!test.root().join(DEFAULT_OUTPUT).exists());

    Ok(())
}

#[test]
fn test_syntax_error_is_an_error() -> Result<()> {
    let test = CliTest::with_file("models.ts", "export interface {")?;

    let output = test.generate_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(!test.root().join(DEFAULT_OUTPUT).exists());

    Ok(())
}

#[test]
fn test_unreadable_tsconfig_is_an_error() -> Result<()> {
    let test = CliTest::with_file("example/models.ts", EXAMPLE_MODELS)?;

    let output = test
        .generate_command()
        .args(["--tsconfig", "missing.json"])
        .output()?;
    let (_, stderr) = output_text(&output);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.starts_with("Error: Failed to read build configuration:"));

    Ok(())
}

#[test]
fn test_tsconfig_paths_resolve_imports() -> Result<()> {
    let test = CliTest::with_file(
        "tsconfig.json",
        r#"{
  // comments are allowed
  "compilerOptions": {
    "baseUrl": ".", // project root
    "paths": { "@shared/*": ["lib/*"] }, // aliases
  },
}"#,
    )?;
    test.write_file(
        "app/models.ts",
        r#"
import { Address } from '@shared/address';
/** @realm */
export interface Shop { address: Address }
"#,
    )?;
    test.write_file("lib/address.ts", "export interface Address { street: string }")?;

    let output = test
        .generate_command()
        .args(["app/models.ts", "--tsconfig", "tsconfig.json", "--stdout"])
        .output()?;
    let (stdout, stderr) = output_text(&output);

    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(stdout.contains("export const AddressSchema: ObjectSchema"));
    assert!(stdout.contains("      type: 'Address',\n"));

    Ok(())
}
