//! Strided N-dimensional containers and views.
//!
//! [`VectorNd`] owns and resizes along its outermost axis, [`ArrayNd`]
//! owns a fixed shape, and [`Proxy`]/[`ProxyMut`] are non-owning
//! descriptor-driven views over either. The [`ContainerNd`] trait gives
//! all of them, plus plain `Vec`s and slices, one access surface which
//! the [`sampler`] policies build on.

mod array;
mod dims;
mod proxy;
pub mod sampler;
mod traits;
mod vector;

pub use self::array::ArrayNd;
pub use self::dims::{dims, DimensionDescriptor, Dimensionality};
pub use self::proxy::{Proxy, ProxyIter, ProxyIterMut, ProxyMut};
pub use self::sampler::{at, load, Sampler, SamplerClamp, SamplerDefault, SamplerNoCheck, SamplerZero};
pub use self::traits::{ContainerCategory, ContainerNd};
pub use self::vector::VectorNd;
