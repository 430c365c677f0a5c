//! Router construction.

mod admin;
mod common;

pub use admin::admin_routes;
pub use common::common_routes;
