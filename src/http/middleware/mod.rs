//! Ready-made pipeline stages.
//!
//! - `logger`: request and duration logging
//! - `body_parser`: request body decoding
//! - `static_files`: directory serving
//! - `auth`: bearer token guard

pub mod auth;
pub mod body_parser;
pub mod logger;
pub mod static_files;

pub use auth::{Authenticated, BearerAuth};
pub use body_parser::BodyParser;
pub use logger::Logger;
pub use static_files::StaticFiles;
