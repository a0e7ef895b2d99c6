use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Config file not found. Looked in:\n\
        - current directory: dwh.local.kdl, dwh.kdl\n\
        - ./.dwhflow/ directory\n\
        - ~/.config/dwhflow/dwh.kdl\n\
        Pass --config or set DWH_CONFIG_PATH to point at a file directly"
    )]
    ConfigNotFound,

    #[error("Config file does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("Missing section '{0}'")]
    MissingSection(&'static str),

    #[error("Missing key '{key}' in section '{section}'")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("Invalid value for '{section}.{key}': {message}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
