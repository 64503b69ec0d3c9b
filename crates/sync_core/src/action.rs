//! Action-delta computation over joint-state vectors.

use contracts::{ContractError, JointSample};
use nalgebra::DVector;

/// Extract the absolute joint positions of a sample as a state vector.
#[inline]
pub fn joint_positions(sample: &JointSample) -> DVector<f64> {
    DVector::from_vec(sample.position.clone())
}

/// Convert absolute joint-state vectors into frame-to-frame deltas.
///
/// Element `i` equals `states[i+1] - states[i]` for every frame but the
/// last, which gets the zero vector of the same dimensionality — the policy
/// predicts position changes, not absolute positions, and the terminal frame
/// has no successor to move toward. A single-frame episode yields a single
/// zero vector; that is a defined case, not a degenerate one.
///
/// # Errors
/// - `ContractError::EmptyInput` for an empty state sequence
/// - `ContractError::Invariant` when consecutive states differ in dimension
pub fn compute_action_deltas(
    states: &[DVector<f64>],
) -> Result<Vec<DVector<f64>>, ContractError> {
    let Some(first) = states.first() else {
        return Err(ContractError::empty_input("compute_action_deltas"));
    };

    let dim = first.len();
    let mut deltas = Vec::with_capacity(states.len());

    for (i, pair) in states.windows(2).enumerate() {
        if pair[1].len() != dim {
            return Err(ContractError::invariant(
                "states",
                format!(
                    "state {} has dimension {} but state 0 has {}",
                    i + 1,
                    pair[1].len(),
                    dim
                ),
            ));
        }
        deltas.push(&pair[1] - &pair[0]);
    }
    deltas.push(DVector::zeros(dim));

    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(values: &[f64]) -> DVector<f64> {
        DVector::from_vec(values.to_vec())
    }

    #[test]
    fn test_deltas_are_successor_differences() {
        let states = vec![v(&[0.0, 0.0]), v(&[0.5, -0.25]), v(&[1.5, -0.5])];
        let deltas = compute_action_deltas(&states).unwrap();

        assert_eq!(deltas.len(), 3);
        assert_eq!(deltas[0], v(&[0.5, -0.25]));
        assert_eq!(deltas[1], v(&[1.0, -0.25]));
        assert_eq!(deltas[2], v(&[0.0, 0.0]));
    }

    #[test]
    fn test_single_frame_yields_zero_vector() {
        let states = vec![v(&[0.1, 0.2, 0.3])];
        let deltas = compute_action_deltas(&states).unwrap();
        assert_eq!(deltas, vec![DVector::zeros(3)]);
    }

    #[test]
    fn test_empty_input_fails_fast() {
        let err = compute_action_deltas(&[]).unwrap_err();
        assert!(matches!(err, ContractError::EmptyInput { .. }));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let states = vec![v(&[0.0, 0.0]), v(&[1.0])];
        let err = compute_action_deltas(&states).unwrap_err();
        assert!(matches!(err, ContractError::Invariant { .. }));
    }

    #[test]
    fn test_cumulative_sum_reconstructs_states() {
        let states = vec![
            v(&[0.0, 1.0, -1.0]),
            v(&[0.2, 0.9, -0.8]),
            v(&[0.5, 0.4, 0.1]),
            v(&[0.4, 0.6, 0.3]),
        ];
        let deltas = compute_action_deltas(&states).unwrap();

        let mut reconstructed = states[0].clone();
        for (i, delta) in deltas.iter().take(states.len() - 1).enumerate() {
            reconstructed += delta;
            let expected = &states[i + 1];
            assert!((&reconstructed - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn test_joint_positions_extraction() {
        let sample = JointSample {
            timestamp_ns: 0,
            names: vec!["shoulder".into(), "elbow".into()],
            position: vec![0.5, -1.2],
            velocity: None,
        };
        assert_eq!(joint_positions(&sample), v(&[0.5, -1.2]));
    }
}
