use core::{
	marker::PhantomData,
	mem::{
		self,
		MaybeUninit
	},
	ptr::NonNull,
	fmt
};
use std::alloc::{
	self,
	Layout,
	handle_alloc_error
};
use tracing::trace;
use crate::AllocError;

/// A low-level utility for managing a block of uninitialized storage.
///
/// The buffer holds room for exactly [`capacity`](RawBuffer::capacity) values of
/// type `T`, but it does not in anyway inspect the memory that it manages.
/// When dropped it *will* free its memory, but it *won't* try to drop its
/// contents. It is up to the user of `RawBuffer` to handle the actual things
/// *stored* inside of it, and to drop them before the buffer goes away.
///
/// A buffer has a single owner. It can be moved (or [`take`](RawBuffer::take)n)
/// but not cloned, since duplicating the pointer would not duplicate the
/// values living behind it.
///
/// Zero-sized types never allocate: the capacity is recorded as requested and
/// the pointer stays dangling.
pub struct RawBuffer<T> {
	/// Start of the storage, dangling when nothing is allocated.
	ptr: NonNull<T>,

	/// Number of `T`-sized slots behind `ptr`.
	capacity: usize,

	/// The buffer logically owns storage for `T` values.
	marker: PhantomData<T>
}

impl<T> RawBuffer<T> {
	/// Creates an empty buffer.
	///
	/// This does not allocate.
	#[inline]
	pub const fn new() -> Self {
		RawBuffer {
			ptr: NonNull::dangling(),
			capacity: 0,
			marker: PhantomData
		}
	}

	/// Allocates storage for exactly `capacity` elements.
	///
	/// A zero capacity never allocates.
	///
	/// # Panics
	///
	/// Panics if the required size exceeds `isize::MAX` bytes.
	/// Calls [`handle_alloc_error`] if the allocation fails.
	#[inline]
	pub fn allocate(capacity: usize) -> Self {
		handle_reserve(Self::try_allocate(capacity))
	}

	/// The same as `allocate`, but returns on errors instead of panicking or aborting.
	pub fn try_allocate(capacity: usize) -> Result<Self, AllocError> {
		if capacity == 0 {
			return Ok(Self::new())
		}

		let layout = Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?;

		if layout.size() == 0 {
			// zero-sized types.
			return Ok(RawBuffer {
				ptr: NonNull::dangling(),
				capacity,
				marker: PhantomData
			})
		}

		// SAFETY: the layout has a non-zero size.
		let ptr = unsafe { alloc::alloc(layout) };
		match NonNull::new(ptr.cast::<T>()) {
			Some(ptr) => {
				trace!(capacity, bytes = layout.size(), "allocated raw buffer");
				Ok(RawBuffer {
					ptr,
					capacity,
					marker: PhantomData
				})
			},
			None => Err(AllocError::OutOfMemory { layout })
		}
	}

	/// Returns the number of slots in the buffer.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Returns a raw pointer to the first slot.
	///
	/// The pointer is dangling if the buffer is empty.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.ptr.as_ptr()
	}

	/// Returns an unsafe mutable pointer to the first slot.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.ptr.as_ptr()
	}

	/// Returns a pointer to the slot at `offset`.
	///
	/// The address one past the last slot may be computed, but must not be read from
	/// or written to.
	///
	/// ## Safety
	///
	/// `offset` must be at most equal to the capacity.
	#[inline]
	pub unsafe fn offset(&self, offset: usize) -> *const T {
		debug_assert!(offset <= self.capacity);
		self.as_ptr().add(offset)
	}

	/// Mutable counterpart of [`offset`](RawBuffer::offset).
	///
	/// ## Safety
	///
	/// `offset` must be at most equal to the capacity.
	#[inline]
	pub unsafe fn offset_mut(&mut self, offset: usize) -> *mut T {
		debug_assert!(offset <= self.capacity);
		self.as_mut_ptr().add(offset)
	}

	/// Returns the slot at `index`.
	///
	/// ## Safety
	///
	/// `index` must be lower than the capacity.
	#[inline]
	pub unsafe fn slot(&self, index: usize) -> &MaybeUninit<T> {
		debug_assert!(index < self.capacity);
		&*self.offset(index).cast::<MaybeUninit<T>>()
	}

	/// Returns the slot at `index`, mutably.
	///
	/// ## Safety
	///
	/// `index` must be lower than the capacity.
	#[inline]
	pub unsafe fn slot_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
		debug_assert!(index < self.capacity);
		&mut *self.offset_mut(index).cast::<MaybeUninit<T>>()
	}

	/// Takes the storage out of this buffer, leaving it empty.
	///
	/// This never fails and never allocates.
	#[inline]
	pub fn take(&mut self) -> Self {
		mem::replace(self, Self::new())
	}

	/// Exchanges the storage of the two buffers.
	#[inline]
	pub fn swap(&mut self, other: &mut Self) {
		mem::swap(self, other)
	}
}

impl<T> Drop for RawBuffer<T> {
	fn drop(&mut self) {
		let size = mem::size_of::<T>() * self.capacity;
		if size != 0 {
			unsafe {
				// SAFETY: this is the layout the storage was allocated with.
				let layout = Layout::from_size_align_unchecked(size, mem::align_of::<T>());
				alloc::dealloc(self.ptr.as_ptr().cast(), layout)
			}
		}
	}
}

impl<T> Default for RawBuffer<T> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for RawBuffer<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RawBuffer")
			.field("ptr", &self.ptr)
			.field("capacity", &self.capacity)
			.finish()
	}
}

unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

// Central function for reserve error handling.
#[inline]
pub(crate) fn handle_reserve<R>(result: Result<R, AllocError>) -> R {
	match result {
		Err(AllocError::CapacityOverflow) => capacity_overflow(),
		Err(AllocError::OutOfMemory { layout }) => handle_alloc_error(layout),
		Ok(r) => r
	}
}

// One central function responsible for reporting capacity overflows. This'll
// ensure that the code generation related to these panics is minimal as there's
// only one location which panics rather than a bunch throughout the crate.
pub(crate) fn capacity_overflow() -> ! {
	panic!("capacity overflow");
}
