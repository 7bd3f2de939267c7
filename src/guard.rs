//! Scoped rollback guards.
//!
//! Multi-step constructions write values one by one into raw slots. If one of
//! the constructors panics, the guard drops exactly the values already written
//! while the panic unwinds. Once every step succeeded the guard is committed,
//! which disarms it.
use core::{
	mem,
	ptr
};

/// Tracks a run of values constructed into contiguous raw slots.
pub(crate) struct Constructed<T> {
	/// First slot of the run.
	start: *mut T,

	/// Number of slots written so far.
	count: usize
}

impl<T> Constructed<T> {
	/// Starts a run at `start`, with nothing constructed yet.
	///
	/// ## Safety
	///
	/// Every slot later written through [`write`](Constructed::write) must be
	/// valid raw storage owned by the caller.
	#[inline]
	pub(crate) unsafe fn new(start: *mut T) -> Self {
		Constructed {
			start,
			count: 0
		}
	}

	/// Writes the next value of the run.
	///
	/// ## Safety
	///
	/// The slot following the last written one must be valid raw storage.
	#[inline]
	pub(crate) unsafe fn write(&mut self, value: T) {
		ptr::write(self.start.add(self.count), value);
		self.count += 1;
	}

	/// Keeps every value written so far and returns how many there are.
	#[inline]
	pub(crate) fn commit(self) -> usize {
		let count = self.count;
		mem::forget(self);
		count
	}
}

impl<T> Drop for Constructed<T> {
	fn drop(&mut self) {
		// SAFETY: the first `count` slots have been initialized by `write`.
		unsafe {
			ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.count))
		}
	}
}

// Set the length of the array when the `SetLenOnDrop` value goes out of scope.
//
// The length field in SetLenOnDrop is a local variable that the optimizer will
// see does not alias with any stores through the array's data pointer.
// If an element constructor panics, the length still counts every element
// pushed before it.
pub(crate) struct SetLenOnDrop<'a> {
	len: &'a mut usize,
	local_len: usize
}

impl<'a> SetLenOnDrop<'a> {
	#[inline]
	pub(crate) fn new(len: &'a mut usize) -> Self {
		SetLenOnDrop { local_len: *len, len }
	}

	#[inline]
	pub(crate) fn current_len(&self) -> usize {
		self.local_len
	}

	#[inline]
	pub(crate) fn increment_len(&mut self, increment: usize) {
		self.local_len += increment;
	}
}

impl Drop for SetLenOnDrop<'_> {
	#[inline]
	fn drop(&mut self) {
		*self.len = self.local_len;
	}
}
