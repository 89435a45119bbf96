//! Evaluate a fixture file command
//!
//! A fixture seeds one transaction with fields and runs a list of chain
//! queries against it:
//!
//! ```yaml
//! fields:
//!   ARGS: "  SELECT *  FROM users "
//!   status: 200
//! queries:
//!   - field: ARGS
//!     chain: lowercase,compressWhitespace,trim
//!   - field: ARGS
//!     chain: lowercase,compressWhitespace,trim
//! ```
//!
//! Every query prints one JSON line; repeated queries report `cache_hit`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tfnkit_core::{DataStore, Engine, Field, Transaction};

/// Fixture file contents
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// Fields to seed the transaction with
    #[serde(default)]
    pub fields: BTreeMap<String, FixtureValue>,

    /// Queries to run, in order
    #[serde(default)]
    pub queries: Vec<Query>,
}

/// Seed value for a fixture field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FixtureValue {
    /// Signed integer
    Num(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
}

/// One chain lookup
#[derive(Debug, Deserialize)]
pub struct Query {
    /// Base field name
    pub field: String,

    /// Comma-separated chain; a plain lookup when absent
    #[serde(default)]
    pub chain: Option<String>,
}

/// Output line for one query
#[derive(Debug, Serialize)]
pub struct QueryResult {
    field: String,
    chain: Option<String>,
    key: Option<String>,
    value: Option<String>,
    cache_hit: bool,
    skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Fixture {
    /// Load a fixture from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    /// Seed a fresh transaction from `engine` with the fixture fields
    pub fn seed(&self, engine: &Engine) -> Result<Transaction> {
        let mut tx = engine.transaction();
        for (name, value) in &self.fields {
            match value {
                FixtureValue::Num(n) => {
                    tx.add_num(name, *n)?;
                }
                FixtureValue::Float(f) => {
                    let field = Field::float(tx.arena(), name, *f)?;
                    tx.add(field)?;
                }
                FixtureValue::Str(s) => {
                    tx.add_nulstr(name, s)?;
                }
            }
        }
        Ok(tx)
    }
}

/// Run every query against one transaction
pub fn evaluate(engine: &Engine, fixture: &Fixture) -> Result<Vec<QueryResult>> {
    let mut tx = fixture.seed(engine)?;
    let mut results = Vec::with_capacity(fixture.queries.len());

    for query in &fixture.queries {
        let chain = query.chain.as_deref();
        let result = match engine.get_with_transform_report(&mut tx, &query.field, chain) {
            Ok(report) => QueryResult {
                field: query.field.clone(),
                chain: query.chain.clone(),
                key: report.key.map(|k| k.to_string()),
                value: Some(report.field.value().to_string()),
                cache_hit: report.cache_hit,
                skipped: report.skipped.into_iter().map(|s| s.name).collect(),
                error: None,
            },
            Err(e) if e.is_recoverable() => QueryResult {
                field: query.field.clone(),
                chain: query.chain.clone(),
                key: None,
                value: None,
                cache_hit: false,
                skipped: Vec::new(),
                error: Some(e.to_string()),
            },
            Err(e) => return Err(e).context("Transaction evaluation aborted"),
        };
        results.push(result);
    }

    tracing::info!(
        "Evaluated {} queries ({} cached entries)",
        results.len(),
        tx.len()
    );
    tx.release();
    Ok(results)
}

/// Run the eval command
pub fn run(config_path: &str, fixture_path: &str) -> Result<()> {
    let engine = super::load_engine(config_path)?;
    let fixture = Fixture::load(Path::new(fixture_path))?;

    for result in evaluate(&engine, &fixture)? {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tfnkit_core::EngineConfig;

    fn engine() -> Engine {
        Engine::new(EngineConfig::from_yaml("builtins: [all]").unwrap()).unwrap()
    }

    fn fixture(yaml: &str) -> Fixture {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[rstest]
    #[case("hello", "str")]
    #[case("\"200\"", "str")]
    #[case("3", "num")]
    #[case("-7", "num")]
    #[case("1.5", "float")]
    fn test_parse_fixture_values(#[case] value: &str, #[case] expected: &str) {
        let f = fixture(&format!("fields:\n  a: {value}\n"));
        let kind = match f.fields["a"] {
            FixtureValue::Str(_) => "str",
            FixtureValue::Num(_) => "num",
            FixtureValue::Float(_) => "float",
        };
        assert_eq!(kind, expected);
        assert!(f.queries.is_empty());
    }

    #[test]
    fn test_repeated_query_hits_cache() {
        let f = fixture(
            r#"
fields:
  ARGS: " A  B "
queries:
  - field: ARGS
    chain: lowercase,compressWhitespace,trim
  - field: ARGS
    chain: lowercase,compressWhitespace,trim
"#,
        );
        let results = evaluate(&engine(), &f).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value.as_deref(), Some("a b"));
        assert!(!results[0].cache_hit);
        assert!(results[1].cache_hit);
        assert_eq!(
            results[1].key.as_deref(),
            Some("ARGS.t(lowercase,compressWhitespace,trim)")
        );
    }

    #[test]
    fn test_recoverable_errors_reported_per_query() {
        let f = fixture(
            r#"
fields:
  status: 200
queries:
  - field: status
    chain: trim
  - field: missing
  - field: status
"#,
        );
        let results = evaluate(&engine(), &f).unwrap();
        assert!(results[0].error.as_deref().unwrap().contains("type mismatch"));
        assert!(results[1].error.is_some());
        assert_eq!(results[2].value.as_deref(), Some("200"));
        assert!(results[2].key.is_none());
    }

    #[test]
    fn test_skipped_steps_listed() {
        let f = fixture(
            r#"
fields:
  x: abc
queries:
  - field: x
    chain: uppercase,nosuch
"#,
        );
        let results = evaluate(&engine(), &f).unwrap();
        assert_eq!(results[0].value.as_deref(), Some("ABC"));
        assert_eq!(results[0].skipped, vec!["nosuch"]);
    }
}
