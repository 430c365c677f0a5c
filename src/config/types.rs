//! Raw admin config types matching the JSON file layout.

use crate::privilege::Action;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Primary key type for parsing path and query ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PkType {
    Uuid,
    #[default]
    BigInt,
    Int,
    Text,
}

impl PkType {
    /// PostgreSQL type used to cast bound key values.
    pub fn cast(&self) -> &'static str {
        match self {
            PkType::Uuid => "uuid",
            PkType::BigInt => "int8",
            PkType::Int => "int4",
            PkType::Text => "text",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path segment the model is reachable under (e.g. "posts").
    pub alias: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub table: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub key_type: PkType,
    /// Fields accepted from request input on create and edit.
    #[serde(default)]
    pub fillable: Vec<String>,
    /// Fields never listed in the index but shown on the detail view.
    #[serde(default)]
    pub hidden: Vec<String>,
    /// Columns of the index listing. Empty means fillable.
    #[serde(default)]
    pub index_fields: Vec<String>,
    #[serde(default = "default_privileges")]
    pub privileges: Vec<Action>,
    /// Maintain created_at / updated_at on writes.
    #[serde(default)]
    pub timestamps: bool,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}

fn default_schema() -> String {
    "public".into()
}

fn default_primary_key() -> String {
    "id".into()
}

fn default_privileges() -> Vec<Action> {
    Action::ALL.to_vec()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}
