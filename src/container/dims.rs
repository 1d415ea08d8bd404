use std::fmt;
use std::ops::Index;

/// Extent vector of an N-dimensional container. The number of extents
/// is the rank.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dimensionality {
    extents: Vec<usize>,
}

impl Dimensionality {
    pub fn new(extents: Vec<usize>) -> Dimensionality {
        Dimensionality { extents }
    }

    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Total number of elements, the product of all extents.
    pub fn total_size(&self) -> usize {
        self.extents.iter().product()
    }

    pub fn get(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.extents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.extents.iter()
    }

    /// Extents with the outermost axis dropped.
    pub fn sub_dims(&self) -> Dimensionality {
        Dimensionality {
            extents: self.extents[1..].to_vec(),
        }
    }
}

impl Index<usize> for Dimensionality {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.extents[axis]
    }
}

impl From<&[usize]> for Dimensionality {
    fn from(extents: &[usize]) -> Dimensionality {
        Dimensionality {
            extents: extents.to_vec(),
        }
    }
}

impl From<Vec<usize>> for Dimensionality {
    fn from(extents: Vec<usize>) -> Dimensionality {
        Dimensionality { extents }
    }
}

impl fmt::Debug for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Dimensionality{:?}", self.extents)
    }
}

/// Shorthand for building extents: `dims([2, 3])`.
pub fn dims<const N: usize>(extents: [usize; N]) -> Dimensionality {
    Dimensionality {
        extents: extents.to_vec(),
    }
}

/// Per axis layout record.
///
/// `size` is the extent of the axis, `total` the number of elements of
/// the sub-view starting at this axis, and `stride` the element step
/// between neighbouring indexes. For a contiguous layout
/// `stride[i] == total[i + 1]`; strided views break that equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionDescriptor {
    pub size: usize,
    pub total: usize,
    pub stride: usize,
}

/// Contiguous descriptors for the given extents.
pub(crate) fn contiguous_descriptors(dims: &Dimensionality) -> Vec<DimensionDescriptor> {
    let rank = dims.rank();
    let mut descriptors = vec![
        DimensionDescriptor {
            size: 0,
            total: 0,
            stride: 0,
        };
        rank
    ];
    for axis in (0..rank).rev() {
        let size = dims.get(axis);
        let below = if axis + 1 < rank {
            descriptors[axis + 1].total
        } else {
            1
        };
        descriptors[axis] = DimensionDescriptor {
            size,
            total: size * below,
            stride: below,
        };
    }
    descriptors
}

/// Extents described by a descriptor run.
pub(crate) fn descriptor_dims(descriptors: &[DimensionDescriptor]) -> Dimensionality {
    Dimensionality {
        extents: descriptors.iter().map(|d| d.size).collect(),
    }
}
