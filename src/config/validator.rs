//! Config validation: identifier safety and alias uniqueness.

use crate::config::AdminConfig;
use crate::error::ConfigError;
use std::collections::HashSet;

/// Plain SQL identifier: letter or underscore, then letters, digits, underscores.
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(kind: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

pub fn validate(config: &AdminConfig) -> Result<(), ConfigError> {
    if config.models.is_empty() {
        return Err(ConfigError::NoModels);
    }

    let mut aliases = HashSet::new();
    for m in &config.models {
        check_identifier("alias", &m.alias)?;
        check_identifier("schema", &m.schema)?;
        check_identifier("table", &m.table)?;
        check_identifier("primary key", &m.primary_key)?;
        for field in m.fillable.iter().chain(&m.hidden).chain(&m.index_fields) {
            check_identifier("field", field)?;
        }
        if !aliases.insert(m.alias.as_str()) {
            return Err(ConfigError::DuplicateAlias(m.alias.clone()));
        }
        if !m.fillable.is_empty() {
            for field in m.validation.keys() {
                if !m.fillable.contains(field) {
                    return Err(ConfigError::UnknownValidationField {
                        alias: m.alias.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    fn model(alias: &str, table: &str) -> ModelConfig {
        serde_json::from_value(serde_json::json!({ "alias": alias, "table": table })).unwrap()
    }

    #[test]
    fn rejects_empty_config() {
        assert!(matches!(validate(&AdminConfig::default()), Err(ConfigError::NoModels)));
    }

    #[test]
    fn rejects_duplicate_aliases() {
        let config = AdminConfig {
            models: vec![model("posts", "posts"), model("posts", "articles")],
        };
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateAlias(a)) if a == "posts"));
    }

    #[test]
    fn rejects_identifiers_that_would_need_escaping() {
        let config = AdminConfig {
            models: vec![model("posts", "posts; drop table users")],
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidIdentifier { kind: "table", .. })
        ));
    }

    #[test]
    fn validation_rules_must_name_fillable_fields() {
        let mut m = model("posts", "posts");
        m.fillable = vec!["title".into()];
        m.validation.insert("body".into(), Default::default());
        let config = AdminConfig { models: vec![m] };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnknownValidationField { field, .. }) if field == "body"
        ));
    }
}
