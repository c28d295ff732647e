//! Configuration validation
//!
//! Rules:
//! - vendor id and name unique, locator non-empty
//! - at most one preference list per message type
//! - every candidate references a declared vendor, at most once per list
//! - candidate lists non-empty, weights finite and >= 0
//! - router timings and worker counts > 0

use std::collections::HashSet;

use contracts::{ContractError, RouterBlueprint};

/// Validate a RouterBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    validate_vendors(blueprint)?;
    validate_preferences(blueprint)?;
    validate_router_settings(blueprint)?;
    Ok(())
}

/// Non-fatal findings, reported by the `validate` command
pub fn warnings(blueprint: &RouterBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.preferences.is_empty() {
        warnings.push("No preferences configured - every message will be rejected".to_string());
    }

    for message_type in contracts::MessageType::ALL {
        if blueprint.preference(message_type).is_none() {
            warnings.push(format!(
                "Message type '{}' has no preference list - its messages will be rejected",
                message_type
            ));
        }
    }

    let referenced: HashSet<&str> = blueprint
        .preferences
        .iter()
        .flat_map(|p| p.candidates.iter().map(|c| c.vendor.as_str()))
        .collect();

    for vendor in &blueprint.vendors {
        if !referenced.contains(vendor.name.as_str()) {
            warnings.push(format!(
                "Vendor '{}' is not referenced by any preference list",
                vendor.name
            ));
        }
        if vendor.budget == 0 {
            warnings.push(format!(
                "Vendor '{}' has budget 0 and will never be selected",
                vendor.name
            ));
        }
    }

    warnings
}

fn validate_vendors(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();

    for vendor in &blueprint.vendors {
        if vendor.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("vendors[id={}].name", vendor.id),
                "vendor name cannot be empty",
            ));
        }
        if !ids.insert(vendor.id) {
            return Err(ContractError::config_validation(
                format!("vendors[id={}]", vendor.id),
                "duplicate vendor id",
            ));
        }
        if !names.insert(vendor.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("vendors[name={}]", vendor.name),
                "duplicate vendor name",
            ));
        }
        if vendor.locator.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("vendors[{}].locator", vendor.name),
                "vendor locator cannot be empty",
            ));
        }
    }
    Ok(())
}

fn validate_preferences(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    let vendor_names: HashSet<&str> = blueprint.vendors.iter().map(|v| v.name.as_str()).collect();
    let mut seen_types = HashSet::new();

    for pref in &blueprint.preferences {
        if !seen_types.insert(pref.message_type) {
            return Err(ContractError::config_validation(
                format!("preferences[message_type={}]", pref.message_type),
                "duplicate preference list for message type",
            ));
        }

        if pref.candidates.is_empty() {
            return Err(ContractError::config_validation(
                format!("preferences[{}].candidates", pref.message_type),
                "candidate list cannot be empty",
            ));
        }

        let mut listed = HashSet::new();
        for (idx, candidate) in pref.candidates.iter().enumerate() {
            let field = format!("preferences[{}].candidates[{}]", pref.message_type, idx);

            if !vendor_names.contains(candidate.vendor.as_str()) {
                return Err(ContractError::config_validation(
                    field,
                    format!("unknown vendor '{}'", candidate.vendor),
                ));
            }
            if !listed.insert(candidate.vendor.as_str()) {
                return Err(ContractError::config_validation(
                    field,
                    format!("vendor '{}' listed twice", candidate.vendor),
                ));
            }
            if !candidate.weight.is_finite() || candidate.weight < 0.0 {
                return Err(ContractError::config_validation(
                    format!("{field}.weight"),
                    format!("weight must be finite and >= 0, got {}", candidate.weight),
                ));
            }
        }
    }
    Ok(())
}

fn validate_router_settings(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    let router = &blueprint.router;

    let positive = [
        ("router.inbound_capacity", router.inbound_capacity as u64),
        ("router.retry_poll_interval_ms", router.retry_poll_interval_ms),
        (
            "router.retry_workers_per_type",
            router.retry_workers_per_type as u64,
        ),
        ("router.delivery_timeout_ms", router.delivery_timeout_ms),
    ];

    for (field, value) in positive {
        if value == 0 {
            return Err(ContractError::config_validation(field, "must be > 0"));
        }
    }
    Ok(())
}
