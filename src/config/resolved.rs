//! Resolved admin model: config validated and flattened for runtime use.

use crate::config::{PkType, ValidationRule};
use crate::error::AdminError;
use crate::privilege::Action;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug)]
pub struct AdminModel {
    pub alias: String,
    pub label: String,
    pub schema_name: String,
    pub table_name: String,
    pub primary_key: String,
    pub key_type: PkType,
    pub fillable: Vec<String>,
    pub hidden: Vec<String>,
    /// Configured index columns; may be empty (see `index_fields`).
    pub index_columns: Vec<String>,
    pub privileges: HashSet<Action>,
    pub timestamps: bool,
    pub validation: HashMap<String, ValidationRule>,
}

impl AdminModel {
    pub fn key_name(&self) -> &str {
        &self.primary_key
    }

    pub fn fillable(&self) -> &[String] {
        &self.fillable
    }

    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Columns listed on the index screen: configured index fields, else fillable.
    pub fn index_fields(&self) -> Vec<String> {
        if self.index_columns.is_empty() {
            self.fillable.clone()
        } else {
            self.index_columns.clone()
        }
    }

    /// Fields loaded for the detail view: fillable, then hidden, de-duplicated, then the key.
    pub fn show_fields(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for f in self.fillable.iter().chain(&self.hidden) {
            if !out.contains(f) {
                out.push(f.clone());
            }
        }
        if !out.contains(&self.primary_key) {
            out.push(self.primary_key.clone());
        }
        out
    }

    pub fn allows(&self, action: Action) -> bool {
        self.privileges.contains(&action)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            alias: self.alias.clone(),
            label: self.label.clone(),
            key: self.primary_key.clone(),
        }
    }
}

/// The public face of a model inside view payloads.
#[derive(Clone, Debug, Serialize)]
pub struct ModelSummary {
    pub alias: String,
    pub label: String,
    pub key: String,
}

#[derive(Clone, Debug)]
pub struct AdminRegistry {
    /// In config order.
    pub models: Vec<AdminModel>,
    by_alias: HashMap<String, usize>,
}

impl AdminRegistry {
    /// Index `models` by alias. Aliases are unique once the config has been validated.
    pub fn new(models: Vec<AdminModel>) -> Self {
        let by_alias = models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.alias.clone(), i))
            .collect();
        AdminRegistry { models, by_alias }
    }

    pub fn model_by_alias(&self, alias: &str) -> Option<&AdminModel> {
        self.by_alias.get(alias).and_then(|&i| self.models.get(i))
    }

    /// Map a route segment to its model.
    pub fn resolve_type(&self, alias: &str) -> Result<&AdminModel, AdminError> {
        self.model_by_alias(alias)
            .ok_or_else(|| AdminError::NotFound(format!("unknown admin type '{}'", alias)))
    }
}
