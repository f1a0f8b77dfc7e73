//! Web API module for filedrop.
//!
//! This module provides the JSON file API (list, upload, download, rename,
//! delete), its error mapping and middleware, and optional static serving of
//! the browser UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
