//! Table definitions of the warehouse

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Landing table for raw JSON records
    Staging,
    Fact,
    Dimension,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Staging => "staging",
            Self::Fact => "fact",
            Self::Dimension => "dimension",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub primary_key: bool,
}

const fn col(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        primary_key: false,
    }
}

const fn key(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        primary_key: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDef {
    pub name: &'static str,
    pub kind: TableKind,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                if c.primary_key {
                    format!("    {} {} PRIMARY KEY", c.name, c.sql_type)
                } else {
                    format!("    {} {}", c.name, c.sql_type)
                }
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {} (\n{}\n);", self.name, columns)
    }
}

pub fn drop_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", table)
}

pub fn staging_events() -> TableDef {
    TableDef {
        name: "staging_events",
        kind: TableKind::Staging,
        columns: vec![
            key("event_id", "INT IDENTITY(0,1)"),
            col("artist_name", "VARCHAR(255)"),
            col("auth", "VARCHAR(32)"),
            col("user_first_name", "VARCHAR(255)"),
            col("user_last_name", "VARCHAR(255)"),
            col("user_gender", "VARCHAR(32)"),
            col("item_in_session", "INTEGER"),
            col("song_length", "DOUBLE PRECISION"),
            col("user_level", "VARCHAR(32)"),
            col("location", "VARCHAR(100)"),
            col("method", "VARCHAR(32)"),
            col("page", "VARCHAR(32)"),
            col("registration", "VARCHAR(32)"),
            col("session_id", "BIGINT"),
            col("song_title", "VARCHAR(255)"),
            col("status", "INTEGER"),
            col("ts", "BIGINT"),
            col("user_agent", "TEXT"),
            col("user_id", "VARCHAR(128)"),
        ],
    }
}

pub fn staging_songs() -> TableDef {
    TableDef {
        name: "staging_songs",
        kind: TableKind::Staging,
        columns: vec![
            key("song_id", "VARCHAR(100)"),
            col("num_songs", "INTEGER"),
            col("artist_id", "VARCHAR(100)"),
            col("artist_latitude", "DOUBLE PRECISION"),
            col("artist_longitude", "DOUBLE PRECISION"),
            col("artist_location", "VARCHAR(255)"),
            col("artist_name", "VARCHAR(255)"),
            col("title", "VARCHAR(255)"),
            col("duration", "DOUBLE PRECISION"),
            col("year", "INTEGER"),
        ],
    }
}

pub fn songplays() -> TableDef {
    TableDef {
        name: "songplays",
        kind: TableKind::Fact,
        columns: vec![
            key("songplay_id", "INT IDENTITY(0,1)"),
            col("start_time", "TIMESTAMP"),
            col("user_id", "VARCHAR(100)"),
            col("level", "VARCHAR(50)"),
            col("song_id", "VARCHAR(100)"),
            col("artist_id", "VARCHAR(100)"),
            col("session_id", "BIGINT"),
            col("location", "VARCHAR(100)"),
            col("user_agent", "TEXT"),
        ],
    }
}

pub fn users() -> TableDef {
    TableDef {
        name: "users",
        kind: TableKind::Dimension,
        columns: vec![
            key("user_id", "VARCHAR(100)"),
            col("first_name", "VARCHAR(255)"),
            col("last_name", "VARCHAR(255)"),
            col("gender", "VARCHAR(32)"),
            col("level", "VARCHAR(50)"),
        ],
    }
}

pub fn songs() -> TableDef {
    TableDef {
        name: "songs",
        kind: TableKind::Dimension,
        columns: vec![
            key("song_id", "VARCHAR(100)"),
            col("title", "VARCHAR(255)"),
            col("artist_id", "VARCHAR(100)"),
            col("year", "INTEGER"),
            col("duration", "DOUBLE PRECISION"),
        ],
    }
}

pub fn artists() -> TableDef {
    TableDef {
        name: "artists",
        kind: TableKind::Dimension,
        columns: vec![
            key("artist_id", "VARCHAR(100)"),
            col("name", "VARCHAR(255)"),
            col("location", "VARCHAR(100)"),
            col("latitude", "DOUBLE PRECISION"),
            col("longitude", "DOUBLE PRECISION"),
        ],
    }
}

pub fn time() -> TableDef {
    TableDef {
        name: "time",
        kind: TableKind::Dimension,
        columns: vec![
            key("start_time", "TIMESTAMP"),
            col("hour", "INTEGER"),
            col("day", "INTEGER"),
            col("week", "INTEGER"),
            col("month", "INTEGER"),
            col("year", "INTEGER"),
            col("weekday", "INTEGER"),
        ],
    }
}
