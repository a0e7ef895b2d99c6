//! Warehouse schema and ETL statements
//!
//! Two staging tables receive the raw JSON event and song records via
//! `COPY`; inserts then fill the `songplays` fact table and the `users`,
//! `songs`, `artists` and `time` dimensions.
//!
//! ```ignore
//! let catalog = Catalog::star_schema();
//! for statement in catalog.statements_in_order(&sources)? {
//!     println!("{}", statement.sql);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod schema;
pub mod template;

pub use catalog::{
    CATALOG_VERSION, Catalog, CopyDef, CopySource, InsertDef, JsonFormat, Statement,
    StatementKind,
};
pub use error::{CatalogError, CatalogIssue, Result};
pub use schema::{ColumnDef, TableDef, TableKind};
pub use template::{CopyRenderer, CopySources};
