//! Load the admin config from a JSON file and resolve it into a registry.

use crate::config::resolved::{AdminModel, AdminRegistry};
use crate::config::{validate, AdminConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Build the runtime registry from config (validates first).
pub fn resolve(config: &AdminConfig) -> Result<AdminRegistry, ConfigError> {
    validate(config)?;

    let mut models = Vec::with_capacity(config.models.len());
    for m in &config.models {
        let model = AdminModel {
            alias: m.alias.clone(),
            label: m.label.clone().unwrap_or_else(|| m.alias.clone()),
            schema_name: m.schema.clone(),
            table_name: m.table.clone(),
            primary_key: m.primary_key.clone(),
            key_type: m.key_type,
            fillable: m.fillable.clone(),
            hidden: m.hidden.clone(),
            index_columns: m.index_fields.clone(),
            privileges: m.privileges.iter().copied().collect(),
            timestamps: m.timestamps,
            validation: m.validation.clone(),
        };
        models.push(model);
    }

    tracing::debug!(models = models.len(), "admin config resolved");
    Ok(AdminRegistry::new(models))
}

/// Read an admin config file (JSON).
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<AdminConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}
