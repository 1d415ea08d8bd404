use std::fmt;

use crate::container::dims::{
    contiguous_descriptors, descriptor_dims, DimensionDescriptor, Dimensionality,
};
use crate::container::proxy::{checked_offset, Proxy, ProxyIter, ProxyMut};
use crate::container::traits::ContainerNd;
use crate::{Error, Result};

/// Clone the elements of any container into linearized order.
fn collect_linearized<T, C>(container: &C, out: &mut Vec<T>)
where
    T: Clone,
    C: ContainerNd<T> + ?Sized,
{
    let total = container.total_size();
    if total == 0 {
        return;
    }
    let storage = container.storage();
    if container.continuous() {
        for element in &storage[..total] {
            out.push(element.clone());
        }
        return;
    }

    let rank = container.rank();
    let mut indices = vec![0usize; rank];
    'outer: loop {
        let mut offset = 0;
        for axis in 0..rank {
            offset += indices[axis] * container.stride(axis);
        }
        out.push(storage[offset].clone());

        let mut axis = rank;
        loop {
            if axis == 0 {
                break 'outer;
            }
            axis -= 1;
            indices[axis] += 1;
            if indices[axis] < container.size(axis) {
                break;
            }
            indices[axis] = 0;
        }
    }
}

/// Owning, resizable N-dimensional container with contiguous storage.
///
/// The outermost axis grows and shrinks through `push_back`, `insert`
/// and `erase`; `reshape` rearranges the extents of an equally sized
/// container. Mutators that build new element runs stage the clones
/// first and commit by moving, so a panicking `Clone` leaves the
/// container exactly as it was.
///
/// Iterators are invalidated by every operation that changes the
/// storage, which the borrow checker enforces.
pub struct VectorNd<T> {
    descriptors: Vec<DimensionDescriptor>,
    data: Vec<T>,
}

impl<T> VectorNd<T> {
    /// An empty vector of the given rank; all extents are zero until
    /// the first `push_back` adopts the sub-vector shape.
    pub fn empty(rank: usize) -> VectorNd<T> {
        assert!(rank >= 1, "rank must be at least 1");
        let dims = Dimensionality::new(vec![0; rank]);
        VectorNd {
            descriptors: contiguous_descriptors(&dims),
            data: Vec::new(),
        }
    }

    /// A vector of the given extents with every cell set to `value`.
    pub fn filled(dims: Dimensionality, value: T) -> VectorNd<T>
    where
        T: Clone,
    {
        assert!(dims.rank() >= 1, "rank must be at least 1");
        let data = vec![value; dims.total_size()];
        VectorNd {
            descriptors: contiguous_descriptors(&dims),
            data,
        }
    }

    /// A vector over the given flat data; the element count must match
    /// the extents.
    pub fn from_vec(dims: Dimensionality, data: Vec<T>) -> Result<VectorNd<T>> {
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
        Ok(VectorNd {
            descriptors: contiguous_descriptors(&dims),
            data,
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

    pub fn is_empty(&self) -> bool {
        self.total_size() == 0
    }

    /// Allocated capacity in elements.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Owning storage is gapless by construction.
    pub fn continuous(&self) -> bool {
        true
    }

    /// Element count of one outermost slice.
    fn slice_len(&self) -> usize {
        if self.rank() > 1 {
            self.descriptors[1].total
        } else {
            1
        }
    }

    fn set_dims(&mut self, dims: &Dimensionality) {
        self.descriptors = contiguous_descriptors(dims);
        debug_assert_eq!(self.descriptors[0].total, self.data.len());
    }

    /// Grow capacity to hold at least `n` elements. Existing elements
    /// are moved, never copied.
    pub fn reserve(&mut self, n: usize) {
        self.data.reserve(n.saturating_sub(self.data.len()));
    }

    /// Reduce capacity to the element count. Skipped for an empty
    /// container.
    pub fn shrink_to_fit(&mut self) {
        if !self.is_empty() {
            self.data.shrink_to_fit();
        }
    }

    /// Change the outermost extent, filling new cells with default
    /// values and preserving the retained ones.
    pub fn resize_top(&mut self, new_size: usize) -> Result<()>
    where
        T: Clone + Default,
    {
        self.resize_top_with(new_size, T::default())
    }

    /// Change the outermost extent, filling new cells with `value`.
    pub fn resize_top_with(&mut self, new_size: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        let slice_len = self.slice_len();
        if self.rank() > 1 && slice_len == 0 && new_size > 0 {
            return Err(Error::BadState(
                "inner extents are not set, resize all extents instead".into(),
            ));
        }
        let new_len = new_size * slice_len;
        if new_len > self.data.len() {
            let mut appended = vec![value; new_len - self.data.len()];
            self.data.append(&mut appended);
        } else {
            self.data.truncate(new_len);
        }
        let mut dims = self.dimensions();
        dims = {
            let mut extents = dims.as_slice().to_vec();
            extents[0] = new_size;
            Dimensionality::new(extents)
        };
        self.set_dims(&dims);
        Ok(())
    }

    /// Change all extents. Existing data becomes logically invalid;
    /// every cell of the result holds a default value.
    pub fn resize_all(&mut self, dims: Dimensionality) -> Result<()>
    where
        T: Clone + Default,
    {
        self.resize_all_with(dims, T::default())
    }

    /// Change all extents, filling every cell of the result with
    /// `value`.
    pub fn resize_all_with(&mut self, dims: Dimensionality, value: T) -> Result<()>
    where
        T: Clone,
    {
        if dims.rank() != self.rank() {
            return Err(Error::Argument(format!(
                "extents of rank {} do not fit a vector of rank {}",
                dims.rank(),
                self.rank()
            )));
        }
        let staged = vec![value; dims.total_size()];
        self.data = staged;
        self.set_dims(&dims);
        Ok(())
    }

    /// The shape checks shared by `push_back` and `insert`: the
    /// sub-vector must be one rank below and match the inner extents,
    /// unless this container is empty and adopts them.
    fn check_sub_dims<C>(&self, sub: &C) -> Result<Dimensionality>
    where
        C: ContainerNd<T> + ?Sized,
    {
        if self.rank() < 2 {
            return Err(Error::BadState(
                "sub-vector operations need rank of at least 2".into(),
            ));
        }
        if sub.rank() + 1 != self.rank() {
            return Err(Error::Argument(format!(
                "sub-vector of rank {} does not fit a vector of rank {}",
                sub.rank(),
                self.rank()
            )));
        }
        let sub_dims = sub.dimensions();
        if !self.is_empty() && sub_dims != self.dimensions().sub_dims() {
            return Err(Error::Argument(format!(
                "sub-vector extents {:?} do not match the inner extents {:?}",
                sub_dims,
                self.dimensions().sub_dims()
            )));
        }
        Ok(sub_dims)
    }

    fn grown_dims(&self, sub_dims: &Dimensionality, added: usize) -> Dimensionality {
        let outer = if self.is_empty() { 0 } else { self.size(0) };
        let mut extents = Vec::with_capacity(self.rank());
        extents.push(outer + added);
        extents.extend_from_slice(sub_dims.as_slice());
        Dimensionality::new(extents)
    }

    /// Append one outermost slice copied from `sub`. An empty container
    /// adopts the sub-vector extents.
    pub fn push_back<C>(&mut self, sub: &C) -> Result<()>
    where
        T: Clone,
        C: ContainerNd<T> + ?Sized,
    {
        let sub_dims = self.check_sub_dims(sub)?;
        let mut staged = Vec::with_capacity(sub.total_size());
        collect_linearized(sub, &mut staged);

        let dims = self.grown_dims(&sub_dims, 1);
        self.data.append(&mut staged);
        self.set_dims(&dims);
        Ok(())
    }

    /// Append one outermost slice taking the elements out of `sub`.
    pub fn push_back_vec(&mut self, mut sub: VectorNd<T>) -> Result<()> {
        let sub_dims = self.check_sub_dims(&sub)?;
        let dims = self.grown_dims(&sub_dims, 1);
        self.data.append(&mut sub.data);
        self.set_dims(&dims);
        Ok(())
    }

    /// Remove the outermost slice.
    pub fn pop_back(&mut self) -> Result<()> {
        if self.size(0) == 0 {
            return Err(Error::OutOfRange("the vector is already empty!".into()));
        }
        let slice_len = self.slice_len();
        let mut dims = self.dimensions().as_slice().to_vec();
        dims[0] -= 1;
        self.data.truncate(self.data.len() - slice_len);
        self.set_dims(&Dimensionality::new(dims));
        Ok(())
    }

    /// Insert one copy of `sub` before the outermost index `position`.
    pub fn insert<C>(&mut self, position: usize, sub: &C) -> Result<()>
    where
        T: Clone,
        C: ContainerNd<T> + ?Sized,
    {
        self.insert_n(position, sub, 1)
    }

    /// Insert `count` copies of `sub` before the outermost index
    /// `position`. Either the insert happens entirely or the container
    /// is left unchanged.
    pub fn insert_n<C>(&mut self, position: usize, sub: &C, count: usize) -> Result<()>
    where
        T: Clone,
        C: ContainerNd<T> + ?Sized,
    {
        let sub_dims = self.check_sub_dims(sub)?;
        if position > self.size(0) {
            return Err(Error::OutOfRange(format!(
                "insert position {} is past the extent {}",
                position,
                self.size(0)
            )));
        }

        let mut staged = Vec::with_capacity(count * sub.total_size());
        for _ in 0..count {
            collect_linearized(sub, &mut staged);
        }

        let offset = position * sub_dims.total_size();
        let dims = self.grown_dims(&sub_dims, count);
        self.data.splice(offset..offset, staged.into_iter());
        self.set_dims(&dims);
        Ok(())
    }

    /// Insert copies of each sub-container before the outermost index
    /// `position`, preserving their order.
    pub fn insert_range<C>(&mut self, position: usize, subs: &[C]) -> Result<()>
    where
        T: Clone,
        C: ContainerNd<T>,
    {
        let first = match subs.first() {
            Some(first) => first,
            None => return Ok(()),
        };
        let sub_dims = self.check_sub_dims(first)?;
        if position > self.size(0) {
            return Err(Error::OutOfRange(format!(
                "insert position {} is past the extent {}",
                position,
                self.size(0)
            )));
        }

        let mut staged = Vec::with_capacity(subs.len() * sub_dims.total_size());
        for sub in subs {
            if sub.dimensions() != sub_dims {
                return Err(Error::Argument(
                    "sub-vectors of an insert range must share their extents".into(),
                ));
            }
            collect_linearized(sub, &mut staged);
        }

        let offset = position * sub_dims.total_size();
        let dims = self.grown_dims(&sub_dims, subs.len());
        self.data.splice(offset..offset, staged.into_iter());
        self.set_dims(&dims);
        Ok(())
    }

    /// Remove the outermost slice at `position`. Returns the index of
    /// the slice right after the erased one.
    pub fn erase(&mut self, position: usize) -> Result<usize> {
        self.erase_range(position, position + 1)
    }

    /// Remove the outermost slices in `[first, last)`. Returns the
    /// index of the slice right after the erased range.
    pub fn erase_range(&mut self, first: usize, last: usize) -> Result<usize> {
        if first > last {
            return Err(Error::Argument(format!(
                "bad erase range: {} > {}",
                first, last
            )));
        }
        if last > self.size(0) {
            return Err(Error::OutOfRange(format!(
                "erase range end {} is past the extent {}",
                last,
                self.size(0)
            )));
        }
        let slice_len = self.slice_len();
        self.data.drain(first * slice_len..last * slice_len);
        let mut dims = self.dimensions().as_slice().to_vec();
        dims[0] -= last - first;
        self.set_dims(&Dimensionality::new(dims));
        Ok(first)
    }

    /// Copy-reshape into new extents of the same total size.
    pub fn reshape(&self, dims: Dimensionality) -> Result<VectorNd<T>>
    where
        T: Clone,
    {
        if dims.rank() < 1 || dims.total_size() != self.total_size() {
            return Err(Error::Argument("reshape: total size mismatch".into()));
        }
        Ok(VectorNd {
            descriptors: contiguous_descriptors(&dims),
            data: self.data.clone(),
        })
    }

    /// Move-reshape into new extents of the same total size.
    pub fn into_reshape(self, dims: Dimensionality) -> Result<VectorNd<T>> {
        if dims.rank() < 1 || dims.total_size() != self.total_size() {
            return Err(Error::Argument("reshape: total size mismatch".into()));
        }
        Ok(VectorNd {
            descriptors: contiguous_descriptors(&dims),
            data: self.data,
        })
    }

    /// Checked element access by a full index tuple.
    pub fn at(&self, indices: &[usize]) -> Result<&T> {
        let offset = checked_offset(&self.descriptors, indices)?;
        Ok(&self.data[offset])
    }

    pub fn at_mut(&mut self, indices: &[usize]) -> Result<&mut T> {
        let offset = checked_offset(&self.descriptors, indices)?;
        Ok(&mut self.data[offset])
    }

    /// View of the outermost slice at `idx`; one rank lower. Requires
    /// rank > 1.
    pub fn sub(&self, idx: usize) -> Proxy<'_, T> {
        self.view().sub(idx)
    }

    /// Mutable view of the outermost slice at `idx`. Requires rank > 1.
    pub fn sub_mut(&mut self, idx: usize) -> ProxyMut<'_, T> {
        assert!(self.rank() > 1, "sub_mut() needs rank > 1");
        assert!(idx < self.size(0), "index out of range");
        let stride = self.descriptors[0].stride;
        ProxyMut::new(&mut self.data[idx * stride..], &self.descriptors[1..])
    }

    /// Non-owning view of the whole container.
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

    /// Iterator over all elements in linearized order.
    pub fn plain_iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn plain_iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Drop all slices, keeping the inner extents and the capacity.
    pub fn clear(&mut self) {
        self.data.clear();
        let mut dims = self.dimensions().as_slice().to_vec();
        dims[0] = 0;
        self.set_dims(&Dimensionality::new(dims));
    }
}

impl<T: Clone> Clone for VectorNd<T> {
    fn clone(&self) -> VectorNd<T> {
        VectorNd {
            descriptors: self.descriptors.clone(),
            data: self.data.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for VectorNd<T> {
    fn eq(&self, other: &VectorNd<T>) -> bool {
        self.descriptors == other.descriptors && self.data == other.data
    }
}

impl<T: Eq> Eq for VectorNd<T> {}

impl<T: fmt::Debug> fmt::Debug for VectorNd<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "VectorNd{:?} {:?}",
            self.dimensions().as_slice(),
            self.data
        )
    }
}

impl<T> ContainerNd<T> for VectorNd<T> {
    fn rank(&self) -> usize {
        VectorNd::rank(self)
    }

    fn size(&self, axis: usize) -> usize {
        VectorNd::size(self, axis)
    }

    fn stride(&self, axis: usize) -> usize {
        self.descriptors[axis].stride
    }

    fn total_size(&self) -> usize {
        VectorNd::total_size(self)
    }

    fn continuous(&self) -> bool {
        true
    }

    fn storage(&self) -> &[T] {
        &self.data
    }
}
