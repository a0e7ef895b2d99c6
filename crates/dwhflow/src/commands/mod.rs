pub mod catalog;
pub mod create;
pub mod delete;
pub mod sources;
pub mod status;
