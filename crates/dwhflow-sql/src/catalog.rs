//! The statement catalog: drop, create, copy and insert lists

use crate::error::{CatalogError, CatalogIssue, Result};
use crate::schema::{self, TableDef, drop_sql};
use crate::template::{CopyRenderer, CopySources};
use serde::Serialize;
use std::collections::HashSet;

/// Bumped whenever a table definition or statement changes
pub const CATALOG_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Drop,
    Create,
    Copy,
    Insert,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Drop => "drop",
            Self::Create => "create",
            Self::Copy => "copy",
            Self::Insert => "insert",
        };
        f.write_str(s)
    }
}

/// A rendered statement ready to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub table: &'static str,
    pub sql: String,
}

/// Which configured location a COPY reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CopySource {
    LogData,
    SongData,
}

/// How COPY maps JSON fields onto columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JsonFormat {
    /// Use the configured jsonpath file
    JsonPaths,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyDef {
    pub target: &'static str,
    pub source: CopySource,
    pub format: JsonFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertDef {
    pub target: &'static str,
    pub columns: Vec<&'static str>,
    pub select: &'static str,
}

impl InsertDef {
    pub fn sql(&self) -> String {
        format!(
            "INSERT INTO {} ({})\n{}",
            self.target,
            self.columns.join(", "),
            self.select
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub version: u32,
    pub tables: Vec<TableDef>,
    pub drops: Vec<&'static str>,
    pub copies: Vec<CopyDef>,
    pub inserts: Vec<InsertDef>,
}

const SONGPLAYS_SELECT: &str = "\
SELECT
    TIMESTAMP 'epoch' + (se.ts / 1000) * INTERVAL '1 second' AS start_time,
    se.user_id,
    se.user_level,
    ss.song_id,
    ss.artist_id,
    se.session_id,
    se.location,
    se.user_agent
FROM staging_events se
INNER JOIN staging_songs ss
    ON ss.title = se.song_title
    AND ss.artist_name = se.artist_name
WHERE se.page = 'NextSong';";

const USERS_SELECT: &str = "\
SELECT DISTINCT
    user_id,
    user_first_name,
    user_last_name,
    user_gender,
    user_level
FROM staging_events
WHERE page = 'NextSong';";

const SONGS_SELECT: &str = "\
SELECT DISTINCT
    song_id,
    title,
    artist_id,
    year,
    duration
FROM staging_songs
WHERE song_id IS NOT NULL;";

const ARTISTS_SELECT: &str = "\
SELECT DISTINCT
    artist_id,
    artist_name,
    artist_location,
    artist_latitude,
    artist_longitude
FROM staging_songs
WHERE artist_id IS NOT NULL;";

const TIME_SELECT: &str = "\
SELECT start_time,
    EXTRACT(hour FROM start_time),
    EXTRACT(day FROM start_time),
    EXTRACT(week FROM start_time),
    EXTRACT(month FROM start_time),
    EXTRACT(year FROM start_time),
    EXTRACT(dayofweek FROM start_time)
FROM songplays;";

impl Catalog {
    /// Staging tables plus the songplays star schema
    pub fn star_schema() -> Self {
        let tables = vec![
            schema::staging_events(),
            schema::staging_songs(),
            schema::songplays(),
            schema::users(),
            schema::songs(),
            schema::artists(),
            schema::time(),
        ];
        let drops = tables.iter().map(|t| t.name).collect();

        Self {
            version: CATALOG_VERSION,
            tables,
            drops,
            copies: vec![
                CopyDef {
                    target: "staging_events",
                    source: CopySource::LogData,
                    format: JsonFormat::JsonPaths,
                },
                CopyDef {
                    target: "staging_songs",
                    source: CopySource::SongData,
                    format: JsonFormat::Auto,
                },
            ],
            inserts: vec![
                InsertDef {
                    target: "songplays",
                    columns: vec![
                        "start_time",
                        "user_id",
                        "level",
                        "song_id",
                        "artist_id",
                        "session_id",
                        "location",
                        "user_agent",
                    ],
                    select: SONGPLAYS_SELECT,
                },
                InsertDef {
                    target: "users",
                    columns: vec!["user_id", "first_name", "last_name", "gender", "level"],
                    select: USERS_SELECT,
                },
                InsertDef {
                    target: "songs",
                    columns: vec!["song_id", "title", "artist_id", "year", "duration"],
                    select: SONGS_SELECT,
                },
                InsertDef {
                    target: "artists",
                    columns: vec!["artist_id", "name", "location", "latitude", "longitude"],
                    select: ARTISTS_SELECT,
                },
                InsertDef {
                    target: "time",
                    columns: vec!["start_time", "hour", "day", "week", "month", "year", "weekday"],
                    select: TIME_SELECT,
                },
            ],
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Every mismatch between the statement lists, in catalog order
    pub fn issues(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name) {
                issues.push(CatalogIssue::DuplicateTable(table.name.to_string()));
            }
        }

        for name in &self.drops {
            if self.table(name).is_none() {
                issues.push(CatalogIssue::DropWithoutCreate(name.to_string()));
            }
        }

        for copy in &self.copies {
            if self.table(copy.target).is_none() {
                issues.push(CatalogIssue::CopyWithoutCreate(copy.target.to_string()));
            }
        }

        for insert in &self.inserts {
            let Some(table) = self.table(insert.target) else {
                issues.push(CatalogIssue::InsertWithoutCreate(insert.target.to_string()));
                continue;
            };
            for column in &insert.columns {
                if !table.has_column(column) {
                    issues.push(CatalogIssue::UnknownInsertColumn {
                        table: insert.target.to_string(),
                        column: column.to_string(),
                    });
                }
            }
        }

        issues
    }

    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Invalid(issues))
        }
    }

    pub fn drop_statements(&self) -> Vec<Statement> {
        self.drops
            .iter()
            .map(|name| Statement {
                kind: StatementKind::Drop,
                table: *name,
                sql: drop_sql(name),
            })
            .collect()
    }

    pub fn create_statements(&self) -> Vec<Statement> {
        self.tables
            .iter()
            .map(|table| Statement {
                kind: StatementKind::Create,
                table: table.name,
                sql: table.create_sql(),
            })
            .collect()
    }

    pub fn copy_statements(&self, sources: &CopySources) -> Result<Vec<Statement>> {
        let renderer = CopyRenderer::new()?;
        self.copies
            .iter()
            .map(|copy| {
                let source = match copy.source {
                    CopySource::LogData => &sources.log_data,
                    CopySource::SongData => &sources.song_data,
                };
                let json = match copy.format {
                    JsonFormat::JsonPaths => sources.log_jsonpath.as_str(),
                    JsonFormat::Auto => "auto",
                };
                let sql = renderer.render(
                    copy.target,
                    source,
                    json,
                    &sources.role_arn,
                    sources.region.as_deref(),
                )?;
                Ok(Statement {
                    kind: StatementKind::Copy,
                    table: copy.target,
                    sql,
                })
            })
            .collect()
    }

    pub fn insert_statements(&self) -> Vec<Statement> {
        self.inserts
            .iter()
            .map(|insert| Statement {
                kind: StatementKind::Insert,
                table: insert.target,
                sql: insert.sql(),
            })
            .collect()
    }

    /// Validate, then return drop, create, copy and insert statements in run order
    pub fn statements_in_order(&self, sources: &CopySources) -> Result<Vec<Statement>> {
        self.validate()?;

        let mut statements = self.drop_statements();
        statements.extend(self.create_statements());
        statements.extend(self.copy_statements(sources)?);
        statements.extend(self.insert_statements());

        tracing::debug!(
            version = self.version,
            count = statements.len(),
            "Rendered statement catalog"
        );
        Ok(statements)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::star_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> CopySources {
        CopySources {
            log_data: "s3://udacity-dend/log_data".to_string(),
            log_jsonpath: "s3://udacity-dend/log_json_path.json".to_string(),
            song_data: "s3://udacity-dend/song_data".to_string(),
            role_arn: "arn:aws:iam::123456789012:role/dwhRole".to_string(),
            region: None,
        }
    }

    #[test]
    fn test_star_schema_is_consistent() {
        let catalog = Catalog::star_schema();
        assert_eq!(catalog.version, CATALOG_VERSION);
        assert!(catalog.issues().is_empty(), "{:?}", catalog.issues());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_statement_counts() {
        let catalog = Catalog::star_schema();
        assert_eq!(catalog.drop_statements().len(), 7);
        assert_eq!(catalog.create_statements().len(), 7);
        assert_eq!(catalog.copy_statements(&sources()).unwrap().len(), 2);
        assert_eq!(catalog.insert_statements().len(), 5);
    }

    #[test]
    fn test_every_insert_and_drop_target_has_create() {
        let catalog = Catalog::star_schema();
        let created: HashSet<_> = catalog.create_statements().iter().map(|s| s.table).collect();

        for s in catalog.insert_statements() {
            assert!(created.contains(s.table), "insert into {}", s.table);
        }
        for s in catalog.drop_statements() {
            assert!(created.contains(s.table), "drop of {}", s.table);
        }
    }

    #[test]
    fn test_statements_in_order() {
        let statements = Catalog::star_schema().statements_in_order(&sources()).unwrap();
        let kinds: Vec<_> = statements.iter().map(|s| s.kind).collect();

        assert_eq!(statements.len(), 21);
        assert!(kinds[..7].iter().all(|k| *k == StatementKind::Drop));
        assert!(kinds[7..14].iter().all(|k| *k == StatementKind::Create));
        assert!(kinds[14..16].iter().all(|k| *k == StatementKind::Copy));
        assert!(kinds[16..].iter().all(|k| *k == StatementKind::Insert));
        assert_eq!(statements[16].table, "songplays");
    }

    #[test]
    fn test_copy_statements_embed_sources() {
        let copies = Catalog::star_schema().copy_statements(&sources()).unwrap();

        let events = &copies[0];
        assert_eq!(events.table, "staging_events");
        assert!(events.sql.contains("FROM 's3://udacity-dend/log_data'"));
        assert!(events.sql.contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(events.sql.contains("JSON 's3://udacity-dend/log_json_path.json'"));

        let songs = &copies[1];
        assert_eq!(songs.table, "staging_songs");
        assert!(songs.sql.contains("FROM 's3://udacity-dend/song_data'"));
        assert!(songs.sql.contains("JSON 'auto'"));
    }

    #[test]
    fn test_songplays_join_uses_declared_aliases() {
        let sql = Catalog::star_schema().insert_statements()[0].sql.clone();
        assert!(sql.starts_with("INSERT INTO songplays (start_time, user_id"));
        assert!(sql.contains("INNER JOIN staging_songs ss"));
        assert!(!sql.contains("so."));
    }

    #[test]
    fn test_validate_reports_every_mismatch() {
        let mut catalog = Catalog::star_schema();
        catalog.drops.push("songplay_table");
        catalog.copies.push(CopyDef {
            target: "staging_plays",
            source: CopySource::LogData,
            format: JsonFormat::Auto,
        });
        catalog.inserts.push(InsertDef {
            target: "user_table",
            columns: vec!["user_id"],
            select: "SELECT 1;",
        });
        catalog.inserts[1].columns.push("email");
        catalog.tables.push(schema::time());

        let issues = catalog.issues();
        assert_eq!(
            issues,
            vec![
                CatalogIssue::DuplicateTable("time".to_string()),
                CatalogIssue::DropWithoutCreate("songplay_table".to_string()),
                CatalogIssue::CopyWithoutCreate("staging_plays".to_string()),
                CatalogIssue::UnknownInsertColumn {
                    table: "users".to_string(),
                    column: "email".to_string(),
                },
                CatalogIssue::InsertWithoutCreate("user_table".to_string()),
            ]
        );

        let err = catalog.statements_in_order(&sources()).unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(ref found) if found.len() == 5));
        assert!(err.to_string().contains("drop of 'songplay_table' has no create statement"));
    }
}
