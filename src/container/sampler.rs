use crate::container::traits::ContainerNd;
use crate::{Error, Result};

/// Per-axis boundary policy of [`load`] and [`at`].
///
/// `check_index` decides whether an index is acceptable for an axis of
/// the given size; `transform_index` maps it into the storage range.
/// When a check fails, `load` falls back to `boundary_value` and fails
/// only if there is none. Custom samplers (tiling, mirroring) plug into
/// the same two hooks.
pub trait Sampler {
    fn check_index(idx: isize, size: usize) -> bool;

    fn transform_index(idx: isize, size: usize) -> usize;

    /// Substitute for reads that failed the check; `None` turns the
    /// violation into an error.
    fn boundary_value<T: Default>() -> Option<T> {
        None
    }
}

/// Bounds checked access; violations are errors.
pub struct SamplerDefault;

impl Sampler for SamplerDefault {
    fn check_index(idx: isize, size: usize) -> bool {
        idx >= 0 && (idx as usize) < size
    }

    fn transform_index(idx: isize, _size: usize) -> usize {
        idx as usize
    }
}

/// No checks at all; the fastest option for indexes known to be valid.
/// An invalid index panics on the storage access in debug terms rather
/// than being reported.
pub struct SamplerNoCheck;

impl Sampler for SamplerNoCheck {
    fn check_index(_idx: isize, _size: usize) -> bool {
        true
    }

    fn transform_index(idx: isize, _size: usize) -> usize {
        idx as usize
    }
}

/// Out-of-range indexes are clamped to the valid range.
pub struct SamplerClamp;

impl Sampler for SamplerClamp {
    fn check_index(_idx: isize, _size: usize) -> bool {
        true
    }

    fn transform_index(idx: isize, size: usize) -> usize {
        if idx <= 0 {
            0
        } else {
            (idx as usize).min(size.saturating_sub(1))
        }
    }
}

/// Out-of-range reads produce a zero valued element.
pub struct SamplerZero;

impl Sampler for SamplerZero {
    fn check_index(idx: isize, size: usize) -> bool {
        idx >= 0 && (idx as usize) < size
    }

    fn transform_index(idx: isize, _size: usize) -> usize {
        idx as usize
    }

    fn boundary_value<T: Default>() -> Option<T> {
        Some(T::default())
    }
}

/// Read an element through the boundary policy `S`.
pub fn load<S, T, C>(container: &C, indices: &[isize]) -> Result<T>
where
    S: Sampler,
    T: Clone + Default,
    C: ContainerNd<T> + ?Sized,
{
    if indices.len() != container.rank() {
        return Err(Error::Argument(format!(
            "expected {} indexes, got {}",
            container.rank(),
            indices.len()
        )));
    }

    let mut offset = 0;
    for (axis, &idx) in indices.iter().enumerate() {
        let size = container.size(axis);
        if size == 0 || !S::check_index(idx, size) {
            return match S::boundary_value::<T>() {
                Some(value) => Ok(value),
                None => Err(Error::OutOfRange(format!(
                    "index {} is not valid for axis {} of extent {}",
                    idx, axis, size
                ))),
            };
        }
        offset += S::transform_index(idx, size) * container.stride(axis);
    }
    Ok(container.storage()[offset].clone())
}

/// Reference access through the boundary policy `S`. Boundary values do
/// not apply here: an index that fails the check is always an error.
pub fn at<'a, S, T, C>(container: &'a C, indices: &[isize]) -> Result<&'a T>
where
    S: Sampler,
    C: ContainerNd<T> + ?Sized,
{
    if indices.len() != container.rank() {
        return Err(Error::Argument(format!(
            "expected {} indexes, got {}",
            container.rank(),
            indices.len()
        )));
    }

    let mut offset = 0;
    for (axis, &idx) in indices.iter().enumerate() {
        let size = container.size(axis);
        if size == 0 || !S::check_index(idx, size) {
            return Err(Error::OutOfRange(format!(
                "index {} is not valid for axis {} of extent {}",
                idx, axis, size
            )));
        }
        offset += S::transform_index(idx, size) * container.stride(axis);
    }
    Ok(&container.storage()[offset])
}
