//! Batched DPO loss with NumPy-style broadcasting.
//!
//! Each input may be any dimensionality. Shapes are right-aligned and every
//! dimension pair must either match or contain a `1`, which is stretched.
//! The loss is then applied elementwise, so element `i` of the result is the
//! scalar [`dpo_loss`] of the broadcast inputs at `i`.

use ndarray::{ArrayD, ArrayViewD, IxDyn, Zip};

use crate::error::{PrefOptError, Result};
use crate::loss::dpo_loss;

/// Compute the common broadcast shape of `shapes`.
///
/// # Errors
/// Returns [`PrefOptError::Broadcast`] if any dimension pair is incompatible.
pub fn broadcast_shape(shapes: &[&[usize]]) -> Result<Vec<usize>> {
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; ndim];

    for shape in shapes {
        let offset = ndim - shape.len();
        for (axis, &dim) in shape.iter().enumerate() {
            let slot = &mut out[offset + axis];
            if *slot == dim || dim == 1 {
                continue;
            }
            if *slot == 1 {
                *slot = dim;
                continue;
            }
            return Err(PrefOptError::Broadcast {
                shapes: shapes.iter().map(|s| s.to_vec()).collect(),
            });
        }
    }

    Ok(out)
}

fn broadcast_to<'a>(
    view: &'a ArrayViewD<'_, f64>,
    shape: &[usize],
    all_shapes: &[&[usize]],
) -> Result<ArrayViewD<'a, f64>> {
    view.broadcast(IxDyn(shape))
        .ok_or_else(|| PrefOptError::Broadcast {
            shapes: all_shapes.iter().map(|s| s.to_vec()).collect(),
        })
}

/// Elementwise DPO loss over broadcast inputs.
///
/// # Arguments
/// * `policy_chosen` - Policy log probs for chosen responses
/// * `ref_chosen` - Reference log probs for chosen responses
/// * `policy_rejected` - Policy log probs for rejected responses
/// * `ref_rejected` - Reference log probs for rejected responses
/// * `beta` - Temperature, shared by every element
///
/// # Returns
/// Per-element losses with the broadcast shape of the inputs.
pub fn dpo_loss_batch(
    policy_chosen: ArrayViewD<'_, f64>,
    ref_chosen: ArrayViewD<'_, f64>,
    policy_rejected: ArrayViewD<'_, f64>,
    ref_rejected: ArrayViewD<'_, f64>,
    beta: f64,
) -> Result<ArrayD<f64>> {
    let shapes = [
        policy_chosen.shape(),
        ref_chosen.shape(),
        policy_rejected.shape(),
        ref_rejected.shape(),
    ];
    let shape = broadcast_shape(&shapes)?;
    tracing::debug!(shape = ?shape, beta, "Computing batched DPO loss");

    let pc = broadcast_to(&policy_chosen, &shape, &shapes)?;
    let rc = broadcast_to(&ref_chosen, &shape, &shapes)?;
    let pr = broadcast_to(&policy_rejected, &shape, &shapes)?;
    let rr = broadcast_to(&ref_rejected, &shape, &shapes)?;

    Ok(Zip::from(pc)
        .and(rc)
        .and(pr)
        .and(rr)
        .map_collect(|&pc, &rc, &pr, &rr| dpo_loss(pc, rc, pr, rr, beta)))
}

/// Mean DPO loss over broadcast inputs.
///
/// # Errors
/// Fails on incompatible shapes or when the broadcast batch has no elements.
pub fn dpo_loss_mean(
    policy_chosen: ArrayViewD<'_, f64>,
    ref_chosen: ArrayViewD<'_, f64>,
    policy_rejected: ArrayViewD<'_, f64>,
    ref_rejected: ArrayViewD<'_, f64>,
    beta: f64,
) -> Result<f64> {
    let losses = dpo_loss_batch(policy_chosen, ref_chosen, policy_rejected, ref_rejected, beta)?;
    losses.mean().ok_or(PrefOptError::EmptyBatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, ArrayD};

    fn scalar(x: f64) -> ArrayD<f64> {
        ArrayD::from_elem(IxDyn(&[]), x)
    }

    #[test]
    fn test_broadcast_shape_rules() {
        assert_eq!(broadcast_shape(&[&[3], &[3]]).unwrap(), vec![3]);
        assert_eq!(broadcast_shape(&[&[3], &[]]).unwrap(), vec![3]);
        assert_eq!(broadcast_shape(&[&[2, 1], &[3]]).unwrap(), vec![2, 3]);
        assert_eq!(broadcast_shape(&[&[4, 1, 5], &[3, 1], &[1]]).unwrap(), vec![4, 3, 5]);
        assert_eq!(broadcast_shape(&[&[0], &[1]]).unwrap(), vec![0]);
        assert_eq!(broadcast_shape(&[]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_broadcast_shape_mismatch() {
        let err = broadcast_shape(&[&[3], &[4]]).unwrap_err();
        assert_eq!(
            err,
            PrefOptError::Broadcast {
                shapes: vec![vec![3], vec![4]]
            }
        );
        assert!(broadcast_shape(&[&[2, 3], &[3, 2]]).is_err());
        assert!(broadcast_shape(&[&[0], &[2]]).is_err());
    }

    #[test]
    fn test_batch_matches_scalar_calls() {
        let pc = array![-1.5, -0.2, -3.0];
        let rc = array![-1.2, -0.4, -2.5];
        let pr = array![-1.0, -2.0, -3.5];
        let rr = array![-1.8, -1.0, -3.0];

        let losses = dpo_loss_batch(
            pc.view().into_dyn(),
            rc.view().into_dyn(),
            pr.view().into_dyn(),
            rr.view().into_dyn(),
            0.1,
        )
        .unwrap();

        assert_eq!(losses.shape(), &[3]);
        for i in 0..3 {
            let expected = dpo_loss(pc[i], rc[i], pr[i], rr[i], 0.1);
            assert_eq!(losses[[i]].to_bits(), expected.to_bits());
        }
    }

    #[test]
    fn test_batch_broadcasts_scalar_reference() {
        let pc = array![[-1.0, -2.0], [-3.0, -4.0]];
        let pr = array![-1.5, -2.5];

        let losses = dpo_loss_batch(
            pc.view().into_dyn(),
            scalar(-2.0).view(),
            pr.view().into_dyn(),
            scalar(-2.0).view(),
            0.5,
        )
        .unwrap();

        assert_eq!(losses.shape(), &[2, 2]);
        for i in 0..2 {
            for j in 0..2 {
                let expected = dpo_loss(pc[[i, j]], -2.0, pr[j], -2.0, 0.5);
                assert_eq!(losses[[i, j]], expected);
            }
        }
    }

    #[test]
    fn test_batch_shape_mismatch_is_error() {
        let a = Array1::<f64>::zeros(3);
        let b = Array1::<f64>::zeros(4);

        let result = dpo_loss_batch(
            a.view().into_dyn(),
            a.view().into_dyn(),
            b.view().into_dyn(),
            a.view().into_dyn(),
            0.1,
        );
        assert!(matches!(result, Err(PrefOptError::Broadcast { .. })));
    }

    #[test]
    fn test_mean_loss() {
        let pc = array![-1.5, -1.0];
        let rc = array![-1.2, -1.5];
        let pr = array![-1.0, -2.0];
        let rr = array![-1.8, -1.5];

        let mean = dpo_loss_mean(
            pc.view().into_dyn(),
            rc.view().into_dyn(),
            pr.view().into_dyn(),
            rr.view().into_dyn(),
            0.1,
        )
        .unwrap();

        let expected =
            (dpo_loss(-1.5, -1.2, -1.0, -1.8, 0.1) + dpo_loss(-1.0, -1.5, -2.0, -1.5, 0.1)) / 2.0;
        assert!((mean - expected).abs() < 1e-15);
    }

    #[test]
    fn test_mean_of_empty_batch() {
        let empty = Array1::<f64>::zeros(0);
        let result = dpo_loss_mean(
            empty.view().into_dyn(),
            empty.view().into_dyn(),
            empty.view().into_dyn(),
            empty.view().into_dyn(),
            0.1,
        );
        assert_eq!(result, Err(PrefOptError::EmptyBatch));
    }
}
