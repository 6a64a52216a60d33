//! Resource quantity parsing and request synthesis
//!
//! `k8s-openapi` keeps quantities as opaque strings, so the translator owns
//! the small amount of arithmetic needed here: validating the canonical
//! suffix syntax and deriving requests from limits. The request scale
//! factors are policy constants calibrated against the canonical fixtures
//! (`20m` cpu → `5m`, `600Mi` memory → `100Mi`); they are not assumed to be
//! one general ratio.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use mystack_core::{QuantityPair, ResourcesConfig};

use crate::error::{KubeError, Result};

/// Divisor applied to a cpu limit to synthesize the request
pub const CPU_REQUEST_SCALE: u64 = 4;

/// Divisor applied to a memory limit to synthesize the request
pub const MEMORY_REQUEST_SCALE: u64 = 6;

const SUFFIXES: [&str; 8] = ["", "m", "k", "M", "G", "Ki", "Mi", "Gi"];

fn split(value: &str) -> Result<(u64, &str)> {
    let invalid = || KubeError::InvalidQuantity {
        value: value.to_string(),
    };

    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(digits_end);

    if digits.is_empty() || !SUFFIXES.contains(&suffix) {
        return Err(invalid());
    }
    let number = digits.parse::<u64>().map_err(|_| invalid())?;
    Ok((number, suffix))
}

/// Validate that a quantity uses the canonical suffix syntax.
pub fn validate(value: &str) -> Result<()> {
    split(value).map(|_| ())
}

/// Divide a quantity's numeric value, keeping its suffix. Never scales to
/// zero.
pub fn scale_down(value: &str, divisor: u64) -> Result<String> {
    let (number, suffix) = split(value)?;
    Ok(format!("{}{}", (number / divisor).max(1), suffix))
}

fn quantity_map(pair: &QuantityPair) -> Result<BTreeMap<String, Quantity>> {
    let mut map = BTreeMap::new();
    if let Some(cpu) = &pair.cpu {
        validate(cpu)?;
        map.insert("cpu".to_string(), Quantity(cpu.clone()));
    }
    if let Some(memory) = &pair.memory {
        validate(memory)?;
        map.insert("memory".to_string(), Quantity(memory.clone()));
    }
    Ok(map)
}

fn derived_requests(limits: &QuantityPair) -> Result<BTreeMap<String, Quantity>> {
    let mut map = BTreeMap::new();
    if let Some(cpu) = &limits.cpu {
        map.insert(
            "cpu".to_string(),
            Quantity(scale_down(cpu, CPU_REQUEST_SCALE)?),
        );
    }
    if let Some(memory) = &limits.memory {
        map.insert(
            "memory".to_string(),
            Quantity(scale_down(memory, MEMORY_REQUEST_SCALE)?),
        );
    }
    Ok(map)
}

/// Translate a declared resource section into container requirements.
///
/// Explicit requests pass through unchanged; requests absent alongside
/// present limits are synthesized with the scale constants above. A fully
/// absent section attaches nothing.
pub fn resource_requirements(config: &ResourcesConfig) -> Result<Option<ResourceRequirements>> {
    let limits = config.limits.as_ref().map(quantity_map).transpose()?;

    let requests = match (&config.requests, &config.limits) {
        (Some(requests), _) => Some(quantity_map(requests)?),
        (None, Some(limits)) => Some(derived_requests(limits)?),
        (None, None) => None,
    };

    if limits.is_none() && requests.is_none() {
        return Ok(None);
    }

    Ok(Some(ResourceRequirements {
        limits,
        requests,
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(cpu: &str, memory: &str) -> QuantityPair {
        QuantityPair {
            cpu: Some(cpu.to_string()),
            memory: Some(memory.to_string()),
        }
    }

    #[test]
    fn requests_derived_from_limits() {
        let config = ResourcesConfig {
            limits: Some(pair("20m", "600Mi")),
            requests: None,
        };
        let requirements = resource_requirements(&config).unwrap().unwrap();

        let limits = requirements.limits.unwrap();
        assert_eq!(limits["cpu"].0, "20m");
        assert_eq!(limits["memory"].0, "600Mi");

        let requests = requirements.requests.unwrap();
        assert_eq!(requests["cpu"].0, "5m");
        assert_eq!(requests["memory"].0, "100Mi");
    }

    #[test]
    fn explicit_requests_pass_through() {
        let config = ResourcesConfig {
            limits: Some(pair("20m", "600Mi")),
            requests: Some(pair("10m", "200Mi")),
        };
        let requirements = resource_requirements(&config).unwrap().unwrap();

        let requests = requirements.requests.unwrap();
        assert_eq!(requests["cpu"].0, "10m");
        assert_eq!(requests["memory"].0, "200Mi");
    }

    #[test]
    fn absent_section_attaches_nothing() {
        let config = ResourcesConfig {
            limits: None,
            requests: None,
        };
        assert!(resource_requirements(&config).unwrap().is_none());
    }

    #[test]
    fn requests_without_limits_pass_through() {
        let config = ResourcesConfig {
            limits: None,
            requests: Some(pair("10m", "200Mi")),
        };
        let requirements = resource_requirements(&config).unwrap().unwrap();
        assert!(requirements.limits.is_none());
        assert_eq!(requirements.requests.unwrap()["cpu"].0, "10m");
    }

    #[test]
    fn quantities_round_trip_through_suffix_syntax() {
        for value in ["20m", "600Mi", "1Gi", "500k", "2G", "128Ki", "3"] {
            let (number, suffix) = split(value).unwrap();
            assert_eq!(format!("{number}{suffix}"), value);
        }
    }

    #[test]
    fn malformed_quantities_are_rejected() {
        for value in ["", "Mi", "20x", "0.5", "-5m", "20 m"] {
            assert!(
                matches!(validate(value), Err(KubeError::InvalidQuantity { .. })),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn scaling_never_reaches_zero() {
        assert_eq!(scale_down("2m", 4).unwrap(), "1m");
        assert_eq!(scale_down("20m", 4).unwrap(), "5m");
    }
}
