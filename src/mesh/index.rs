//! Typed handles for mesh elements.
//!
//! Every element kind has its own handle type so a vertex handle can never be
//! passed where a face is expected. Handles wrap an unsigned integer chosen by
//! the [`MeshIndex`] parameter; `u32` is the default. A handle stays valid for
//! the lifetime of the element it names and is never handed out again after
//! that element is finalized away.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Unsigned integer types usable as handle storage.
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + Debug + Default + Send + Sync + 'static
{
    /// Reserved value meaning "no element".
    const INVALID: Self;

    /// Convert from a slot position.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert back to a slot position.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {$(
        impl MeshIndex for $ty {
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v < <$ty>::MAX as usize,
                    "slot {} does not fit in {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_mesh_index!(u16, u32, u64);

/// Handle to a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Handle to a half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Handle to a face (real polygon or boundary loop).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// Handle to an undirected edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_handle {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Handle for the element stored in slot `index`.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "no element" handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Slot position of the element.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Underlying integer.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }

            /// False only for [`Self::invalid`].
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::INVALID
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $tag, self.index())
                } else {
                    write!(f, "{}(INVALID)", $tag)
                }
            }
        }

        impl<I: MeshIndex> fmt::Display for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Debug::fmt(self, f)
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_handle!(VertexId, "V");
impl_handle!(HalfEdgeId, "HE");
impl_handle!(FaceId, "F");
impl_handle!(EdgeId, "E");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip() {
        let e: EdgeId = EdgeId::new(17);
        assert_eq!(e.index(), 17);
        assert_eq!(e.raw(), 17u32);
        assert!(e.is_valid());
        assert!(!EdgeId::<u32>::default().is_valid());
    }

    #[test]
    fn test_small_handles() {
        let h: HalfEdgeId<u16> = HalfEdgeId::new(60_000);
        assert_eq!(h.index(), 60_000);
        assert!(!HalfEdgeId::<u16>::invalid().is_valid());
    }

    #[test]
    fn test_debug_format() {
        let f: FaceId = FaceId::new(3);
        assert_eq!(format!("{:?}", f), "F(3)");
        assert_eq!(format!("{}", HalfEdgeId::<u64>::invalid()), "HE(INVALID)");
    }

    #[test]
    fn test_ordering_follows_slots() {
        let a: VertexId = VertexId::new(1);
        let b: VertexId = VertexId::new(2);
        assert!(a < b);
    }
}
