//! listing-composer
//!
//! Composes search text, facet filters, an exact-date constraint and page
//! navigation into requests against a paginated admin list endpoint, and
//! normalizes whatever payload shape comes back.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;

pub use composer::{FacetTag, FilterState, ListComposer, ListView};
pub use error::{AppError, AppResult};

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
