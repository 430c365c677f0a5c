//! Seamless admin: configuration-driven admin panel over PostgreSQL tables.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hooks;
pub mod middleware;
pub mod privilege;
pub mod resolver;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{load_from_path, resolve, AdminConfig, AdminModel, AdminRegistry, AdminSettings, ModelConfig};
pub use error::{AdminError, ConfigError};
pub use extractors::AdminUser;
pub use hooks::{AdminHooks, DefaultHooks, HookRegistry, Record};
pub use privilege::{Action, ModelPrivileges, PrivilegeChecker};
pub use resolver::{ColumnInfo, ForeignKey, PgSchemaResolver, SchemaResolver};
pub use routes::{admin_routes, common_routes};
pub use service::AdminService;
pub use state::AdminState;
