//! HTTP handlers for the admin panel.

pub mod admin;
pub mod params;
pub use admin::*;
