use std::alloc::Layout;

/// Error returned by the fallible allocation methods (`try_*`) of
/// [`RawBuffer`](crate::RawBuffer) and [`DynamicArray`](crate::DynamicArray).
///
/// When a method returns this error, the receiver is left exactly as it was
/// before the call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
	/// The requested capacity does not fit in `isize::MAX` bytes,
	/// or computing it overflowed `usize`.
	#[error("capacity overflow")]
	CapacityOverflow,

	/// The global allocator could not satisfy the request.
	#[error("memory allocation of {} bytes failed", .layout.size())]
	OutOfMemory {
		/// Layout of the failed request.
		layout: Layout
	}
}
