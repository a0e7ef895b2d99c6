//! COPY statement rendering with Tera

use crate::error::{CatalogError, Result};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const COPY_TEMPLATE_NAME: &str = "copy.sql";

const COPY_TEMPLATE: &str = "\
COPY {{ table }}
FROM {{ source | literal }}
IAM_ROLE {{ role_arn | literal }}
JSON {{ json | literal }}
{%- if region %}
REGION {{ region | literal }}
{%- endif %};";

/// Values substituted into the COPY statements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopySources {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    pub role_arn: String,
    /// Bucket region, needed only when it differs from the cluster's
    pub region: Option<String>,
}

/// Renders COPY statements from the catalog's copy definitions
pub struct CopyRenderer {
    tera: Tera,
}

impl CopyRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("literal", literal_filter);
        tera.add_raw_template(COPY_TEMPLATE_NAME, COPY_TEMPLATE)
            .map_err(|e| CatalogError::Template(error_detail(&e)))?;
        Ok(Self { tera })
    }

    pub fn render(
        &self,
        table: &str,
        source: &str,
        json: &str,
        role_arn: &str,
        region: Option<&str>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("table", table);
        context.insert("source", source);
        context.insert("json", json);
        context.insert("role_arn", role_arn);
        context.insert("region", &region);

        self.tera
            .render(COPY_TEMPLATE_NAME, &context)
            .map_err(|e| CatalogError::Template(error_detail(&e)))
    }
}

/// Quote a value as a SQL string literal
///
/// Surrounding single quotes already present in the value are dropped so
/// config values written either way render the same.
fn literal_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("literal expects a string, got {}", value)))?;
    let s = s.trim();
    let s = s
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(s);
    Ok(Value::String(format!("'{}'", s.replace('\'', "''"))))
}

/// Tera hides the useful message in the source chain
fn error_detail(err: &tera::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_copy() {
        let renderer = CopyRenderer::new().unwrap();
        let sql = renderer
            .render(
                "staging_events",
                "s3://udacity-dend/log_data",
                "s3://udacity-dend/log_json_path.json",
                "arn:aws:iam::123456789012:role/dwhRole",
                None,
            )
            .unwrap();

        assert_eq!(
            sql,
            "COPY staging_events\n\
             FROM 's3://udacity-dend/log_data'\n\
             IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'\n\
             JSON 's3://udacity-dend/log_json_path.json';"
        );
    }

    #[test]
    fn test_render_copy_with_region() {
        let renderer = CopyRenderer::new().unwrap();
        let sql = renderer
            .render("staging_songs", "s3://b/song_data", "auto", "arn:r", Some("us-west-2"))
            .unwrap();

        assert!(sql.contains("JSON 'auto'\nREGION 'us-west-2';"));
    }

    #[test]
    fn test_literal_quoting() {
        let args = HashMap::new();
        let quoted = literal_filter(&Value::String("'s3://bucket/x'".into()), &args).unwrap();
        assert_eq!(quoted, Value::String("'s3://bucket/x'".into()));

        let escaped = literal_filter(&Value::String("it's".into()), &args).unwrap();
        assert_eq!(escaped, Value::String("'it''s'".into()));

        assert!(literal_filter(&Value::Bool(true), &args).is_err());
    }
}
