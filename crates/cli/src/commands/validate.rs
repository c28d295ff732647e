//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::RouterBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    transport: String,
    vendor_count: usize,
    total_budget: u64,
    preference_count: usize,
}

impl ValidationResult {
    fn invalid(config_path: String, error: String) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error),
            warnings: Vec::new(),
            notes: Vec::new(),
            summary: None,
        }
    }
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        let error = format!("File not found: {}", args.config.display());
        return ValidationResult::invalid(config_path, error);
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: config_loader::ConfigLoader::warnings(&blueprint),
            notes: collect_notes(&blueprint),
            summary: Some(ConfigSummary {
                version: format!("{:?}", blueprint.version),
                transport: blueprint.transport.kind().to_string(),
                vendor_count: blueprint.vendors.len(),
                total_budget: total_budget(blueprint.vendors.iter().map(|v| v.budget)),
                preference_count: blueprint.preferences.len(),
            }),
        },
        Err(e) => ValidationResult::invalid(config_path, e.to_string()),
    }
}

/// Sum of vendor budgets, pinned at `u64::MAX` for effectively unbounded vendors
fn total_budget(budgets: impl Iterator<Item = u64>) -> u64 {
    budgets.fold(0u64, u64::saturating_add)
}

/// Informational findings that do not indicate a problem
fn collect_notes(blueprint: &RouterBlueprint) -> Vec<String> {
    blueprint
        .preferences
        .iter()
        .filter(|p| p.candidates.iter().any(|c| c.weight != 0.0))
        .map(|p| {
            format!(
                "Preference '{}' sets weights; vendors are tried in listed order and weights are informational",
                p.message_type
            )
        })
        .collect()
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Transport: {}", summary.transport);
            println!("  Vendors: {}", summary.vendor_count);
            println!("  Total budget: {}", summary.total_budget);
            println!("  Preferences: {}", summary.preference_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }

        if !result.notes.is_empty() {
            println!("\nNotes:");
            for note in &result.notes {
                println!("  - {}", note);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const CONFIG: &str = r#"
[[vendors]]
id = 1
name = "ACL"
budget = 20
locator = "http://127.0.0.1:8081/"

[[vendors]]
id = 2
name = "Spare"
budget = 0
locator = "http://127.0.0.1:8084/"

[[preferences]]
message_type = "otp"
candidates = [{ vendor = "ACL", weight = 100.0 }]
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_warnings_and_notes() {
        let file = write_config(CONFIG);
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };

        let result = validate_config(&args);
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("Spare")));
        assert!(result.warnings.iter().any(|w| w.contains("accept")));
        assert_eq!(result.notes.len(), 1);
        assert_eq!(result.summary.unwrap().total_budget, 20);
    }

    #[test]
    fn test_huge_budgets_do_not_overflow_total() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let config = format!(
            r#"{{
                "vendors": [
                    {{ "id": 1, "name": "A", "budget": {}, "locator": "http://127.0.0.1:8081/" }},
                    {{ "id": 2, "name": "B", "budget": 1, "locator": "http://127.0.0.1:8082/" }}
                ],
                "preferences": [
                    {{ "message_type": "otp", "candidates": [{{ "vendor": "A" }}, {{ "vendor": "B" }}] }}
                ]
            }}"#,
            u64::MAX
        );
        file.write_all(config.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        };

        let result = validate_config(&args);
        assert!(result.valid, "{:?}", result.error);
        assert_eq!(result.summary.unwrap().total_budget, u64::MAX);
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: PathBuf::from("/nonexistent/router.toml"),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
        assert!(run_validate(&args).is_err());
    }

    #[test]
    fn test_unknown_vendor_is_invalid() {
        let file = write_config(&CONFIG.replace(r#"vendor = "ACL""#, r#"vendor = "Nope""#));
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("Nope"));
    }
}
