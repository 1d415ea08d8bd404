use std::fmt;

use crate::container::dims::{
    contiguous_descriptors, descriptor_dims, DimensionDescriptor, Dimensionality,
};
use crate::container::proxy::{checked_offset, Proxy, ProxyIter, ProxyMut};
use crate::container::traits::ContainerNd;
use crate::{Error, Result};

/// Fixed-shape N-dimensional container backed by contiguous storage.
///
/// The extents are set at construction and never change; everything
/// else mirrors the read side of [`crate::container::VectorNd`].
pub struct ArrayNd<T> {
    descriptors: Vec<DimensionDescriptor>,
    data: Box<[T]>,
}

impl<T> ArrayNd<T> {
    pub fn filled(dims: Dimensionality, value: T) -> ArrayNd<T>
    where
        T: Clone,
    {
        assert!(dims.rank() >= 1, "rank must be at least 1");
        let data = vec![value; dims.total_size()];
        ArrayNd {
            descriptors: contiguous_descriptors(&dims),
            data: data.into_boxed_slice(),
        }
    }

    pub fn from_vec(dims: Dimensionality, data: Vec<T>) -> Result<ArrayNd<T>> {
        if dims.rank() < 1 {
            return Err(Error::Argument("rank must be at least 1".into()));
        }
        if dims.total_size() != data.len() {
            return Err(Error::Argument(format!(
                "extents describe {} elements but {} were provided",
                dims.total_size(),
                data.len()
            )));
        }
        Ok(ArrayNd {
            descriptors: contiguous_descriptors(&dims),
            data: data.into_boxed_slice(),
        })
    }

    pub fn rank(&self) -> usize {
        self.descriptors.len()
    }

    pub fn size(&self, axis: usize) -> usize {
        self.descriptors[axis].size
    }

    pub fn dimensions(&self) -> Dimensionality {
        descriptor_dims(&self.descriptors)
    }

    pub fn total_size(&self) -> usize {
        self.descriptors[0].total
    }

    pub fn at(&self, indices: &[usize]) -> Result<&T> {
        let offset = checked_offset(&self.descriptors, indices)?;
        Ok(&self.data[offset])
    }

    pub fn at_mut(&mut self, indices: &[usize]) -> Result<&mut T> {
        let offset = checked_offset(&self.descriptors, indices)?;
        Ok(&mut self.data[offset])
    }

    /// View of the outermost slice at `idx`. Requires rank > 1.
    pub fn sub(&self, idx: usize) -> Proxy<'_, T> {
        self.view().sub(idx)
    }

    pub fn view(&self) -> Proxy<'_, T> {
        Proxy::new(&self.data, &self.descriptors)
    }

    pub fn view_mut(&mut self) -> ProxyMut<'_, T> {
        ProxyMut::new(&mut self.data, &self.descriptors)
    }

    /// Iterator over the outermost slices. Requires rank > 1.
    pub fn iter(&self) -> ProxyIter<'_, T> {
        self.view().iter()
    }

    pub fn plain_iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn plain_iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<T: Clone> Clone for ArrayNd<T> {
    fn clone(&self) -> ArrayNd<T> {
        ArrayNd {
            descriptors: self.descriptors.clone(),
            data: self.data.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for ArrayNd<T> {
    fn eq(&self, other: &ArrayNd<T>) -> bool {
        self.descriptors == other.descriptors && self.data == other.data
    }
}

impl<T: Eq> Eq for ArrayNd<T> {}

impl<T: fmt::Debug> fmt::Debug for ArrayNd<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ArrayNd{:?} {:?}",
            self.dimensions().as_slice(),
            self.data
        )
    }
}

impl<T> ContainerNd<T> for ArrayNd<T> {
    fn rank(&self) -> usize {
        ArrayNd::rank(self)
    }

    fn size(&self, axis: usize) -> usize {
        ArrayNd::size(self, axis)
    }

    fn stride(&self, axis: usize) -> usize {
        self.descriptors[axis].stride
    }

    fn total_size(&self) -> usize {
        ArrayNd::total_size(self)
    }

    fn continuous(&self) -> bool {
        true
    }

    fn storage(&self) -> &[T] {
        &self.data
    }
}
