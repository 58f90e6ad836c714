//! Wrapper settings and DDL rendering
//!
//! DDL cannot take bind parameters, so every name that ends up in a
//! statement goes through [`quote_ident`] and every option value through
//! [`quote_literal`].

use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

const MAX_IDENTIFIER_LEN: usize = 63;

/// Settings for registering the billing customer foreign table
///
/// Deserialized from the `billing` section of the API configuration. Every
/// field has a default matching a stock Supabase `wrappers` install, except
/// `api_key_id`, which must name the vault secret holding the API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrappersConfig {
    pub extension: String,
    /// Schema the extension (and its handler functions) are installed into
    pub extension_schema: String,
    pub wrapper: String,
    pub handler: String,
    pub validator: String,
    pub server: String,
    /// Vault key id of the billing API key
    pub api_key_id: Option<String>,
    pub api_url: String,
    /// Schema holding the foreign table
    pub schema: String,
    pub table: String,
}

impl Default for WrappersConfig {
    fn default() -> Self {
        Self {
            extension: "wrappers".to_string(),
            extension_schema: "extensions".to_string(),
            wrapper: "stripe_wrapper".to_string(),
            handler: "stripe_fdw_handler".to_string(),
            validator: "stripe_fdw_validator".to_string(),
            server: "stripe_server".to_string(),
            api_key_id: None,
            api_url: "https://api.stripe.com/v1".to_string(),
            schema: "stripe".to_string(),
            table: "customers".to_string(),
        }
    }
}

impl WrappersConfig {
    /// Sets the vault key id of the billing API key
    pub fn with_api_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.api_key_id = Some(key_id.into());
        self
    }

    /// Fully qualified, quoted name of the foreign table
    pub fn qualified_table(&self) -> Result<String, DatabaseError> {
        Ok(format!("{}.{}", quote_ident(&self.schema)?, quote_ident(&self.table)?))
    }

    pub fn extension_schema_ddl(&self) -> Result<String, DatabaseError> {
        Ok(format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            quote_ident(&self.extension_schema)?
        ))
    }

    pub fn extension_ddl(&self) -> Result<String, DatabaseError> {
        Ok(format!(
            "CREATE EXTENSION IF NOT EXISTS {} WITH SCHEMA {}",
            quote_ident(&self.extension)?,
            quote_ident(&self.extension_schema)?
        ))
    }

    /// `CREATE FOREIGN DATA WRAPPER` has no `IF NOT EXISTS`; the installer
    /// checks the catalog first
    pub fn wrapper_ddl(&self) -> Result<String, DatabaseError> {
        let schema = quote_ident(&self.extension_schema)?;
        Ok(format!(
            "CREATE FOREIGN DATA WRAPPER {} HANDLER {}.{} VALIDATOR {}.{}",
            quote_ident(&self.wrapper)?,
            schema,
            quote_ident(&self.handler)?,
            schema,
            quote_ident(&self.validator)?
        ))
    }

    pub fn server_ddl(&self) -> Result<String, DatabaseError> {
        let key_id = self
            .api_key_id
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(DatabaseError::MissingSetting("billing.api_key_id"))?;

        Ok(format!(
            "CREATE SERVER IF NOT EXISTS {} FOREIGN DATA WRAPPER {} OPTIONS (api_key_id {}, api_url {})",
            quote_ident(&self.server)?,
            quote_ident(&self.wrapper)?,
            quote_literal(key_id),
            quote_literal(&self.api_url)
        ))
    }

    pub fn schema_ddl(&self) -> Result<String, DatabaseError> {
        Ok(format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)?))
    }

    /// Foreign table over the remote `customers` object, keyed by `id`
    pub fn projection_ddl(&self) -> Result<String, DatabaseError> {
        Ok(format!(
            "CREATE FOREIGN TABLE IF NOT EXISTS {} (\
                id text, \
                email text, \
                name text, \
                description text, \
                created timestamp, \
                attrs jsonb\
            ) SERVER {} OPTIONS (object 'customers', rowid_column 'id')",
            self.qualified_table()?,
            quote_ident(&self.server)?
        ))
    }
}

/// Double-quotes a plain SQL identifier
///
/// Only ASCII letters, digits and underscores are accepted, starting with a
/// letter or underscore, up to Postgres' 63-byte limit.
pub fn quote_ident(name: &str) -> Result<String, DatabaseError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LEN {
        return Err(DatabaseError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

/// Single-quotes a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let config = WrappersConfig::default();
        assert_eq!(config.qualified_table().unwrap(), "\"stripe\".\"customers\"");
        assert_eq!(config.api_url, "https://api.stripe.com/v1");
        assert!(config.api_key_id.is_none());
    }

    #[test]
    fn test_quote_ident_rejects_injection() {
        assert!(quote_ident("stripe").is_ok());
        assert!(quote_ident("_private1").is_ok());
        assert!(quote_ident("").is_err());
        assert!(quote_ident("1stripe").is_err());
        assert!(quote_ident("stripe\"; DROP TABLE organizations; --").is_err());
        assert!(quote_ident("public.customers").is_err());
        assert!(quote_ident(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_server_ddl_requires_key_id() {
        let config = WrappersConfig::default();
        assert!(matches!(
            config.server_ddl(),
            Err(DatabaseError::MissingSetting("billing.api_key_id"))
        ));

        let ddl = config.with_api_key_id("8d3a-key").server_ddl().unwrap();
        assert_eq!(
            ddl,
            "CREATE SERVER IF NOT EXISTS \"stripe_server\" FOREIGN DATA WRAPPER \"stripe_wrapper\" \
             OPTIONS (api_key_id '8d3a-key', api_url 'https://api.stripe.com/v1')"
        );
    }

    #[test]
    fn test_wrapper_ddl_qualifies_functions() {
        let ddl = WrappersConfig::default().wrapper_ddl().unwrap();
        assert!(ddl.contains("HANDLER \"extensions\".\"stripe_fdw_handler\""));
        assert!(ddl.contains("VALIDATOR \"extensions\".\"stripe_fdw_validator\""));
    }

    #[test]
    fn test_projection_ddl() {
        let ddl = WrappersConfig::default().projection_ddl().unwrap();
        assert!(ddl.starts_with("CREATE FOREIGN TABLE IF NOT EXISTS \"stripe\".\"customers\" (id text,"));
        assert!(ddl.contains("SERVER \"stripe_server\""));
        assert!(ddl.ends_with("OPTIONS (object 'customers', rowid_column 'id')"));
    }

    #[test]
    fn test_invalid_schema_fails_every_dependent_statement() {
        let config = WrappersConfig {
            schema: "bad schema".to_string(),
            ..Default::default()
        };
        assert!(config.schema_ddl().is_err());
        assert!(config.projection_ddl().is_err());
        assert!(config.extension_ddl().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: WrappersConfig =
            serde_json::from_str(r#"{"api_key_id": "vault-1", "schema": "billing"}"#).unwrap();
        assert_eq!(config.schema, "billing");
        assert_eq!(config.server, "stripe_server");
        assert_eq!(config.api_key_id.as_deref(), Some("vault-1"));
    }

    proptest! {
        #[test]
        fn prop_quoted_identifiers_never_contain_quotes_inside(name in "\\PC{0,80}") {
            if let Ok(quoted) = quote_ident(&name) {
                let inner = &quoted[1..quoted.len() - 1];
                prop_assert!(!inner.contains('"'));
                prop_assert!(!inner.contains(';'));
                prop_assert!(!inner.contains(' '));
            }
        }

        #[test]
        fn prop_quoted_literals_have_balanced_quotes(value in "\\PC{0,80}") {
            let quoted = quote_literal(&value);
            let inner = &quoted[1..quoted.len() - 1];
            prop_assert_eq!(inner.replace("''", "").matches('\'').count(), 0);
        }
    }
}
