use std::fmt;
use thiserror::Error;

/// A single inconsistency between the catalog's statement lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    InsertWithoutCreate(String),
    DropWithoutCreate(String),
    CopyWithoutCreate(String),
    UnknownInsertColumn { table: String, column: String },
    DuplicateTable(String),
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertWithoutCreate(t) => write!(f, "insert into '{}' has no create statement", t),
            Self::DropWithoutCreate(t) => write!(f, "drop of '{}' has no create statement", t),
            Self::CopyWithoutCreate(t) => write!(f, "copy into '{}' has no create statement", t),
            Self::UnknownInsertColumn { table, column } => {
                write!(f, "insert into '{}' names undeclared column '{}'", table, column)
            }
            Self::DuplicateTable(t) => write!(f, "table '{}' is defined more than once", t),
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is inconsistent:\n{}", format_issues(.0))]
    Invalid(Vec<CatalogIssue>),

    #[error("Template error: {0}")]
    Template(String),
}

fn format_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, CatalogError>;
