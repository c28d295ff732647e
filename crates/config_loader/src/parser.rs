//! Configuration parsing
//!
//! TOML (primary) and JSON formats.

use contracts::{ContractError, RouterBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<RouterBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<RouterBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<RouterBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MessageType, TransportConfig};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[[vendors]]
id = 1
name = "ACL"
budget = 20
locator = "http://127.0.0.1:8081/"

[[preferences]]
message_type = "otp"
candidates = [{ vendor = "ACL", weight = 100.0 }]
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.vendors.len(), 1);
        assert_eq!(bp.vendors[0].budget, 20);
        assert_eq!(bp.preferences[0].message_type, MessageType::Otp);
        assert!(matches!(bp.transport, TransportConfig::Http { .. }));
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "transport": { "kind": "log" },
            "vendors": [{ "id": 3, "name": "Twilio", "budget": 10, "locator": "http://127.0.0.1:8083/" }],
            "preferences": [{
                "message_type": "accept",
                "candidates": [{ "vendor": "Twilio", "weight": 100.0 }]
            }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().transport, TransportConfig::Log);
    }

    #[test]
    fn test_parse_unknown_message_type_fails() {
        let content = r#"
vendors = []

[[preferences]]
message_type = "promo"
candidates = []
"#;
        assert!(matches!(
            parse_toml(content),
            Err(ContractError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
