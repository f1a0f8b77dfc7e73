//! File store for filedrop.
//!
//! This module provides the flat store directory and its policies:
//! - Single-component name validation and containment checks
//! - Upload collision suffixes (`a.txt`, `a(1).txt`, `a(2).txt`, ...)
//! - Extension-preserving rename

mod name;
mod record;
mod storage;

pub use name::{
    client_file_name, renamed_file_name, split_extension, suffixed_name, validate_file_name,
};
pub use record::{FileRecord, StoredFile};
pub use storage::{FileStore, PendingUpload};
