//! This crate provides the [`DynamicArray`] data structure,
//! a contiguous growable array built on top of a [`RawBuffer`] of
//! uninitialized storage.
//!
//! The two layers have separate jobs.
//! A `RawBuffer` owns bytes: it allocates and frees storage for a fixed number
//! of elements, but never constructs or drops anything.
//! A `DynamicArray` owns values: it knows which slots are live and takes care of
//! constructing, cloning, moving and dropping its elements, as well as growing
//! its buffer.
//!
//! ## Transactional operations
//!
//! Every mutating operation of `DynamicArray` either succeeds completely or leaves
//! the array exactly as it was.
//! An operation can fail in two ways:
//! an allocation fails (reported as an [`AllocError`] by the `try_*` methods),
//! or an element constructor (`Default::default`, `Clone::clone` or a user closure)
//! panics. In the latter case, the elements built so far are dropped and any new
//! buffer is freed while the panic unwinds.
//!
//! ```rust
//! use std::panic::{catch_unwind, AssertUnwindSafe};
//! use strong_vec::DynamicArray;
//!
//! let mut array = DynamicArray::from_fn(4, |i| i);
//! assert_eq!(array.capacity(), 4);
//!
//! // the array is full, so this insertion needs a bigger buffer.
//! let result = catch_unwind(AssertUnwindSafe(|| {
//!     array.emplace_with(1, || panic!("no value today"));
//! }));
//!
//! assert!(result.is_err());
//! assert_eq!(array.as_slice(), [0, 1, 2, 3]);
//! assert_eq!(array.capacity(), 4);
//! ```
//!
//! ## Growth
//!
//! When an insertion finds the buffer full, the capacity is doubled
//! (or set to 1 for an empty buffer). The new element is built in the new buffer
//! first, then the existing elements are moved around it.
//! Moving never fails, so once the new element exists the operation cannot fail anymore.
//! [`DynamicArray::reserve`] sets the capacity to an exact value instead.
mod guard;

pub mod error;
pub mod raw;
pub mod array;

pub use error::AllocError;
pub use raw::RawBuffer;
pub use array::{
	DynamicArray,
	IntoIter
};

#[cfg(doctest)]
#[doc = include_str!("../README.md")]
struct ReadmeExample;
