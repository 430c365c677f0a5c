//! Per-model hooks the admin controller calls around listing and writes.

use crate::config::AdminModel;
use crate::error::AdminError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Field name to value, as accepted from request input.
pub type Record = Map<String, Value>;

/// Override any subset; every method defaults to a pass-through.
///
/// Returning an error from a write hook aborts the operation and its message
/// becomes the response body.
#[async_trait]
pub trait AdminHooks: Send + Sync {
    /// Columns shown on the index listing.
    fn index_fields(&self, model: &AdminModel) -> Vec<String> {
        model.index_fields()
    }

    /// Runs before insert; may rewrite the filtered input.
    async fn on_create(&self, _model: &AdminModel, fields: Record) -> Result<Record, AdminError> {
        Ok(fields)
    }

    /// Runs after the row was inserted.
    async fn created(&self, _model: &AdminModel, _row: &Value) -> Result<(), AdminError> {
        Ok(())
    }

    /// Runs before update with the row as currently stored.
    async fn on_edit(
        &self,
        _model: &AdminModel,
        _current: &Value,
        fields: Record,
    ) -> Result<Record, AdminError> {
        Ok(fields)
    }

    /// Runs after the row was updated.
    async fn edited(&self, _model: &AdminModel, _row: &Value) -> Result<(), AdminError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl AdminHooks for DefaultHooks {}

/// Hooks by model alias.
#[derive(Clone, Default)]
pub struct HookRegistry {
    by_alias: HashMap<String, Arc<dyn AdminHooks>>,
    fallback: Arc<DefaultHooks>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, alias: impl Into<String>, hooks: impl AdminHooks + 'static) -> Self {
        self.by_alias.insert(alias.into(), Arc::new(hooks));
        self
    }

    pub fn for_model(&self, model: &AdminModel) -> Arc<dyn AdminHooks> {
        match self.by_alias.get(&model.alias) {
            Some(h) => Arc::clone(h),
            None => self.fallback.clone() as Arc<dyn AdminHooks>,
        }
    }
}
