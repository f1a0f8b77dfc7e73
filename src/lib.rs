//! filedrop - a minimal file-hosting service.
//!
//! A browser client uploads, lists, renames, deletes and downloads files kept
//! in one flat directory; this crate is the HTTP API in front of it.

pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FiledropError, Result};
pub use file::{FileRecord, FileStore, StoredFile};
pub use web::WebServer;
