//! Splitting sample arrays into training batches.

use std::ops::Range;

use ndarray::{ArrayD, ArrayViewD, Axis, Slice};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ModelError;

/// One batch of inputs and matching targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// One array per input, in the order they were passed.
    pub x: Vec<ArrayD<f64>>,
    /// Targets covering the same samples as every entry of `x`.
    pub y: ArrayD<f64>,
}

/// Splits `0..n` into `num_sections` contiguous ranges whose lengths differ
/// by at most one, the longer ranges first.
pub fn section_bounds(n: usize, num_sections: usize) -> Vec<Range<usize>> {
    let num_sections = num_sections.max(1);
    let (base, extra) = (n / num_sections, n % num_sections);
    let mut start = 0;
    (0..num_sections)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn samples(a: &ArrayViewD<'_, f64>) -> Result<usize, ModelError> {
    if a.ndim() == 0 {
        return Err(ModelError::ZeroDimensional);
    }
    Ok(a.len_of(Axis(0)))
}

/// Checks the inputs and returns the batch bounds shared by every array.
fn batch_bounds(
    xs: &[ArrayViewD<'_, f64>],
    y: &ArrayViewD<'_, f64>,
    batch_size: usize,
) -> Result<Vec<Range<usize>>, ModelError> {
    if batch_size == 0 {
        return Err(ModelError::InvalidBatchSize { batch_size });
    }
    if xs.is_empty() {
        return Err(ModelError::NoInputs);
    }
    let n = samples(y)?;
    for (index, x) in xs.iter().enumerate() {
        let found = samples(x)?;
        if found != n {
            return Err(ModelError::SampleMismatch {
                index,
                found,
                expected: n,
            });
        }
    }
    Ok(section_bounds(n, n / batch_size))
}

fn slice_batches(
    xs: &[ArrayViewD<'_, f64>],
    y: &ArrayViewD<'_, f64>,
    bounds: Vec<Range<usize>>,
) -> Vec<Batch> {
    bounds
        .into_iter()
        .map(|r| {
            let slice = Slice::from(r);
            Batch {
                x: xs
                    .iter()
                    .map(|x| x.slice_axis(Axis(0), slice).to_owned())
                    .collect(),
                y: y.slice_axis(Axis(0), slice).to_owned(),
            }
        })
        .collect()
}

/// Chunks every array in `xs` and `y` along the first axis into
/// `max(1, n / batch_size)` near-equal batches, in order.
///
/// All inputs share one set of batch bounds, so batch `i` of each input
/// covers the same samples.
///
/// # Errors
///
/// Returns [`ModelError::InvalidBatchSize`] for a zero batch size,
/// [`ModelError::NoInputs`] for an empty `xs`,
/// [`ModelError::SampleMismatch`] if an input and `y` differ in length and
/// [`ModelError::ZeroDimensional`] for scalar arrays.
///
/// # Example
///
/// ```
/// use drought_models::chunk_array;
/// use ndarray::{Array1, Array2};
///
/// let dynamic = Array2::<f64>::zeros((10, 3)).into_dyn();
/// let stat = Array1::<f64>::zeros(10).into_dyn();
/// let y = Array1::<f64>::zeros(10).into_dyn();
/// let batches = chunk_array(&[dynamic.view(), stat.view()], y.view(), 4).unwrap();
/// let sizes: Vec<usize> = batches.iter().map(|b| b.y.len()).collect();
/// assert_eq!(sizes, vec![5, 5]);
/// assert_eq!(batches[0].x.len(), 2);
/// ```
pub fn chunk_array(
    xs: &[ArrayViewD<'_, f64>],
    y: ArrayViewD<'_, f64>,
    batch_size: usize,
) -> Result<Vec<Batch>, ModelError> {
    let bounds = batch_bounds(xs, &y, batch_size)?;
    Ok(slice_batches(xs, &y, bounds))
}

/// [`chunk_array`] with the batch order shuffled by `rng`.
///
/// One permutation is drawn and applied to every input and to `y`. Samples
/// inside a batch keep their order.
///
/// # Errors
///
/// As [`chunk_array`].
pub fn chunk_array_shuffled(
    xs: &[ArrayViewD<'_, f64>],
    y: ArrayViewD<'_, f64>,
    batch_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Batch>, ModelError> {
    let mut bounds = batch_bounds(xs, &y, batch_size)?;
    bounds.shuffle(rng);
    Ok(slice_batches(xs, &y, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2, Array3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn range(n: usize) -> ArrayD<f64> {
        Array1::range(0.0, n as f64, 1.0).into_dyn()
    }

    #[test]
    fn bounds_follow_array_split() {
        assert_eq!(section_bounds(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(section_bounds(9, 3), vec![0..3, 3..6, 6..9]);
        assert_eq!(section_bounds(2, 3), vec![0..1, 1..2, 2..2]);
        assert_eq!(section_bounds(5, 0), vec![0..5]);
    }

    #[test]
    fn fewer_samples_than_batch_gives_one_batch() {
        let x = range(3);
        let batches = chunk_array(&[x.view()], x.view(), 64).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].x, vec![x]);
    }

    #[test]
    fn batches_cover_every_sample_in_order() {
        let x = Array3::from_shape_fn((11, 2, 2), |(i, j, k)| (i * 4 + j * 2 + k) as f64).into_dyn();
        let y = range(11);
        let batches = chunk_array(&[x.view()], y.view(), 3).unwrap();
        assert_eq!(batches.len(), 3);
        let ys: Vec<f64> = batches.iter().flat_map(|b| b.y.iter().copied()).collect();
        assert_eq!(ys, y.iter().copied().collect::<Vec<_>>());
        for b in &batches {
            assert_eq!(b.x[0].len_of(Axis(0)), b.y.len());
            assert_eq!(b.x[0][[0, 0, 0]], b.y[[0]] * 4.0);
        }
    }

    #[test]
    fn shuffle_is_seeded() {
        fn first(batches: &[Batch]) -> Vec<f64> {
            batches.iter().map(|b| b.y[[0]]).collect()
        }
        let y = range(40);

        let a = chunk_array_shuffled(&[y.view()], y.view(), 4, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = chunk_array_shuffled(&[y.view()], y.view(), 4, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(first(&a), first(&b));

        let mut sorted = first(&a);
        sorted.sort_by(f64::total_cmp);
        assert_eq!(sorted, (0..10).map(|i| f64::from(i * 4)).collect::<Vec<_>>());
    }

    #[test]
    fn shuffled_inputs_stay_aligned() {
        // Sample i carries the value i in every array.
        let dynamic = Array3::from_shape_fn((40, 3, 2), |(i, _, _)| i as f64).into_dyn();
        let stat = Array2::from_shape_fn((40, 5), |(i, _)| i as f64).into_dyn();
        let y = range(40);

        let batches = chunk_array_shuffled(
            &[dynamic.view(), stat.view()],
            y.view(),
            4,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();
        assert_eq!(batches.len(), 10);

        for batch in &batches {
            let samples: Vec<f64> = batch.y.iter().copied().collect();
            assert_eq!(batch.x.len(), 2);
            for x in &batch.x {
                let firsts: Vec<f64> = x.outer_iter().map(|s| s.iter().copied().next().unwrap()).collect();
                assert_eq!(firsts, samples);
            }
        }
    }

    #[test]
    fn invalid_inputs() {
        let x = Array1::<f64>::zeros(4).into_dyn();
        let y = Array1::<f64>::zeros(5).into_dyn();
        assert!(matches!(
            chunk_array(&[x.view()], x.view(), 0),
            Err(ModelError::InvalidBatchSize { batch_size: 0 })
        ));
        assert!(matches!(
            chunk_array(&[], y.view(), 2),
            Err(ModelError::NoInputs)
        ));
        assert!(matches!(
            chunk_array(&[y.view(), x.view()], y.view(), 2),
            Err(ModelError::SampleMismatch {
                index: 1,
                found: 4,
                expected: 5
            })
        ));
        let scalar = ndarray::arr0(1.0).into_dyn();
        assert!(matches!(
            chunk_array(&[scalar.view()], y.view(), 2),
            Err(ModelError::ZeroDimensional)
        ));
    }
}
