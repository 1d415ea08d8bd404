use crate::container::dims::Dimensionality;

/// Layout classification of a container-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerCategory {
    /// No interior gaps, plain iteration over the storage is valid
    Continuous,
    /// Descriptor driven layout with strides
    Strided,
    /// No layout knowledge beyond element access
    General,
}

/// Uniform view over owning containers, proxies and standard
/// containers.
///
/// `storage` exposes the linear element run starting at the container
/// origin; together with `stride` it is enough for index-aware access,
/// which is how the samplers in [`crate::container::sampler`] read any
/// implementor.
pub trait ContainerNd<T> {
    /// Number of dimensions.
    fn rank(&self) -> usize;

    /// Extent of the given axis.
    fn size(&self, axis: usize) -> usize;

    /// Element step between neighbouring indexes of the given axis.
    fn stride(&self, axis: usize) -> usize;

    /// Total number of elements.
    fn total_size(&self) -> usize;

    /// True if strides equal sub-view sizes, so plain iteration visits
    /// exactly the elements.
    fn continuous(&self) -> bool;

    /// Linear storage starting at the container origin.
    fn storage(&self) -> &[T];

    fn category(&self) -> ContainerCategory {
        if self.continuous() {
            ContainerCategory::Continuous
        } else {
            ContainerCategory::Strided
        }
    }

    fn dimensions(&self) -> Dimensionality {
        (0..self.rank()).map(|axis| self.size(axis)).collect::<Vec<_>>().into()
    }

    /// Number of storage elements spanned, counting gaps.
    fn total_stored(&self) -> usize {
        if self.rank() == 0 {
            0
        } else {
            self.size(0) * self.stride(0)
        }
    }
}

impl<T> ContainerNd<T> for Vec<T> {
    fn rank(&self) -> usize {
        1
    }

    fn size(&self, axis: usize) -> usize {
        assert_eq!(axis, 0);
        self.len()
    }

    fn stride(&self, axis: usize) -> usize {
        assert_eq!(axis, 0);
        1
    }

    fn total_size(&self) -> usize {
        self.len()
    }

    fn continuous(&self) -> bool {
        true
    }

    fn storage(&self) -> &[T] {
        self
    }
}

impl<T> ContainerNd<T> for [T] {
    fn rank(&self) -> usize {
        1
    }

    fn size(&self, axis: usize) -> usize {
        assert_eq!(axis, 0);
        self.len()
    }

    fn stride(&self, axis: usize) -> usize {
        assert_eq!(axis, 0);
        1
    }

    fn total_size(&self) -> usize {
        self.len()
    }

    fn continuous(&self) -> bool {
        true
    }

    fn storage(&self) -> &[T] {
        self
    }
}
