//! Shared state for all admin routes.

use crate::config::{AdminRegistry, AdminSettings};
use crate::hooks::HookRegistry;
use crate::privilege::{ModelPrivileges, PrivilegeChecker};
use crate::resolver::{PgSchemaResolver, SchemaResolver};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminState {
    pub pool: PgPool,
    pub registry: Arc<AdminRegistry>,
    pub settings: Arc<AdminSettings>,
    pub resolver: Arc<dyn SchemaResolver>,
    pub privileges: Arc<dyn PrivilegeChecker>,
    pub hooks: Arc<HookRegistry>,
}

impl AdminState {
    /// State with schema introspection over `pool`, config-driven privileges and no hooks.
    pub fn new(pool: PgPool, registry: AdminRegistry, settings: AdminSettings) -> Self {
        AdminState {
            resolver: Arc::new(PgSchemaResolver::new(pool.clone())),
            pool,
            registry: Arc::new(registry),
            settings: Arc::new(settings),
            privileges: Arc::new(ModelPrivileges),
            hooks: Arc::new(HookRegistry::new()),
        }
    }

    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_privileges(mut self, privileges: impl PrivilegeChecker + 'static) -> Self {
        self.privileges = Arc::new(privileges);
        self
    }

    pub fn with_resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }
}
