//! Configuration validation
//!
//! Rules:
//! - derive-level range/length checks on the blueprint structs
//! - joint and camera topics must differ
//! - sink names unique
//! - max_offset_ms must not exceed the gap threshold (an offset window wider
//!   than the episode gap would bridge recordings the detector separates)

use std::collections::HashSet;

use contracts::{ContractError, ConversionBlueprint};
use validator::Validate;

/// Validate a ConversionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ConversionBlueprint) -> Result<(), ContractError> {
    validate_derived(blueprint)?;
    validate_topics(blueprint)?;
    validate_sync(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Run the validator-derive checks (ranges, lengths)
fn validate_derived(blueprint: &ConversionBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("blueprint", e.to_string()))
}

/// Topics must be distinct
fn validate_topics(blueprint: &ConversionBlueprint) -> Result<(), ContractError> {
    if blueprint.topics.joint_states == blueprint.topics.camera {
        return Err(ContractError::config_validation(
            "topics",
            format!(
                "joint_states and camera both map to '{}'",
                blueprint.topics.joint_states
            ),
        ));
    }
    Ok(())
}

/// Cross-field sync parameter checks
fn validate_sync(blueprint: &ConversionBlueprint) -> Result<(), ContractError> {
    let sync = &blueprint.sync;
    if sync.max_offset_ms / 1000.0 > sync.gap_threshold_s {
        return Err(ContractError::config_validation(
            "sync.max_offset_ms",
            format!(
                "offset ceiling {} ms exceeds gap threshold {} s",
                sync.max_offset_ms, sync.gap_threshold_s
            ),
        ));
    }
    Ok(())
}

/// Sink names must be unique
fn validate_sinks(blueprint: &ConversionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, DatasetConfig, SinkConfig, SinkType, SyncConfig, TopicsConfig,
    };
    use std::collections::HashMap;

    fn blueprint() -> ConversionBlueprint {
        ConversionBlueprint {
            version: ConfigVersion::V1,
            dataset: DatasetConfig {
                name: "demo".into(),
                robot_type: "so100".into(),
            },
            topics: TopicsConfig {
                joint_states: "/joint_states".into(),
                camera: "/camera/color/image_raw".into(),
            },
            sync: SyncConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 32,
                params: HashMap::new(),
            }],
        }
    }

    #[test]
    fn test_valid_blueprint_passes() {
        assert!(validate(&blueprint()).is_ok());
    }

    #[test]
    fn test_zero_fps_rejected() {
        let mut bp = blueprint();
        bp.sync.fps = 0.0;
        let err = validate(&bp).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_empty_dataset_name_rejected() {
        let mut bp = blueprint();
        bp.dataset.name.clear();
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_identical_topics_rejected() {
        let mut bp = blueprint();
        bp.topics.camera = bp.topics.joint_states.clone();
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("topics"));
    }

    #[test]
    fn test_offset_wider_than_gap_rejected() {
        let mut bp = blueprint();
        bp.sync.max_offset_ms = 3000.0;
        bp.sync.gap_threshold_s = 2.0;
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_duplicate_sink_names_rejected() {
        let mut bp = blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = validate(&bp).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
