use core::{
	cmp,
	fmt,
	iter::FusedIterator,
	mem::{
		self,
		ManuallyDrop
	},
	ops::{
		Deref,
		DerefMut
	},
	ptr,
	slice
};
use tracing::trace;
use crate::{
	AllocError,
	RawBuffer,
	guard::{
		Constructed,
		SetLenOnDrop
	},
	raw::handle_reserve
};

/// Contiguous growable array type built on a [`RawBuffer`].
///
/// The buffer provides the raw storage, and the array keeps track of how many
/// of its slots hold live values: slots `[0, len)` are initialized, slots
/// `[len, capacity)` are not.
///
/// Every mutating operation is transactional. If it fails, either because an
/// allocation fails or because an element constructor panics, the array is
/// left with the same length, capacity and values as before the call.
/// The only exception is [`clone_from`](Clone::clone_from) when the target
/// already has enough capacity, which only guarantees that nothing leaks.
///
/// # Examples
///
/// ```
/// # use strong_vec::DynamicArray;
/// let mut array = DynamicArray::new();
/// array.reserve(2);
/// array.push(1);
/// array.push(2);
/// array.push(3); // <- the buffer is full, its capacity is doubled here.
/// assert_eq!(array.capacity(), 4);
///
/// array.insert(1, 99);
/// assert_eq!(array.as_slice(), [1, 99, 2, 3]);
///
/// array.remove(0);
/// assert_eq!(array.as_slice(), [99, 2, 3]);
/// ```
pub struct DynamicArray<T> {
	/// Storage, with room for `capacity` elements.
	buf: RawBuffer<T>,

	/// Number of live elements at the start of `buf`.
	len: usize
}

impl<T> Drop for DynamicArray<T> {
	fn drop(&mut self) {
		unsafe {
			ptr::drop_in_place(self.as_mut_slice())
		}
		// `buf` frees the storage afterwards.
	}
}

impl<T> DynamicArray<T> {
	/// Creates a new empty `DynamicArray`.
	///
	/// The array will not allocate until elements are pushed onto it.
	#[inline]
	pub const fn new() -> Self {
		DynamicArray {
			buf: RawBuffer::new(),
			len: 0
		}
	}

	/// Creates a new empty `DynamicArray` with a capacity of exactly `capacity`.
	///
	/// # Panics
	///
	/// Panics if the required size exceeds `isize::MAX` bytes.
	#[inline]
	pub fn with_capacity(capacity: usize) -> Self {
		handle_reserve(Self::try_with_capacity(capacity))
	}

	/// The same as `with_capacity`, but returns on errors instead of panicking or aborting.
	#[inline]
	pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
		Ok(DynamicArray {
			buf: RawBuffer::try_allocate(capacity)?,
			len: 0
		})
	}

	/// Creates an array of `len` default values.
	///
	/// The capacity is exactly `len`.
	#[inline]
	pub fn with_len(len: usize) -> Self where T: Default {
		Self::from_fn(len, |_| T::default())
	}

	/// Creates an array of `len` elements, where the element at index `i` is `f(i)`.
	///
	/// If `f` panics, the elements already built are dropped and the storage is freed
	/// before the panic goes on.
	///
	/// # Panics
	///
	/// Panics if the required size exceeds `isize::MAX` bytes.
	#[inline]
	pub fn from_fn<F>(len: usize, f: F) -> Self where F: FnMut(usize) -> T {
		handle_reserve(Self::try_from_fn(len, f))
	}

	/// The same as `from_fn`, but returns on errors instead of panicking or aborting.
	pub fn try_from_fn<F>(len: usize, mut f: F) -> Result<Self, AllocError> where F: FnMut(usize) -> T {
		let mut buf = RawBuffer::try_allocate(len)?;

		unsafe {
			let mut run = Constructed::new(buf.as_mut_ptr());
			for i in 0..len {
				run.write(f(i));
			}
			run.commit();
		}

		Ok(DynamicArray { buf, len })
	}

	/// Returns the number of elements in the array.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the array contains no elements.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of elements the array can hold without reallocating.
	#[inline]
	pub fn capacity(&self) -> usize {
		self.buf.capacity()
	}

	/// Returns a raw pointer to the array's buffer.
	///
	/// The caller must ensure that the array outlives the pointer this
	/// function returns, or else it will end up pointing to garbage.
	/// Modifying the array may cause its buffer to be reallocated,
	/// which would also make any pointers to it invalid.
	#[inline]
	pub fn as_ptr(&self) -> *const T {
		self.buf.as_ptr()
	}

	/// Returns an unsafe mutable pointer to the array's buffer.
	#[inline]
	pub fn as_mut_ptr(&mut self) -> *mut T {
		self.buf.as_mut_ptr()
	}

	/// Extracts a slice containing the entire array.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.buf.as_ptr(), self.len)
		}
	}

	/// Extracts a mutable slice of the entire array.
	#[inline]
	pub fn as_mut_slice(&mut self) -> &mut [T] {
		unsafe {
			slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len)
		}
	}

	/// Takes the content of this array, leaving it empty with no capacity.
	///
	/// This never fails and never allocates.
	#[inline]
	pub fn take(&mut self) -> Self {
		let mut taken = Self::new();
		taken.swap(self);
		taken
	}

	/// Exchanges the content of the two arrays in constant time.
	#[inline]
	pub fn swap(&mut self, other: &mut Self) {
		self.buf.swap(&mut other.buf);
		mem::swap(&mut self.len, &mut other.len);
	}

	/// Ensures the array can hold at least `capacity` elements in total.
	///
	/// Unlike `Vec::reserve`, the argument is the wanted capacity, not an amount of
	/// additional elements. Does nothing if the capacity is already sufficient.
	/// Otherwise the new capacity is exactly `capacity`, and the elements are moved
	/// into the new storage.
	///
	/// # Panics
	///
	/// Panics if the required size exceeds `isize::MAX` bytes.
	#[inline]
	pub fn reserve(&mut self, capacity: usize) {
		handle_reserve(self.try_reserve(capacity))
	}

	/// The same as `reserve`, but returns on errors instead of panicking or aborting.
	pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
		if capacity <= self.capacity() {
			return Ok(())
		}

		let new_buf = RawBuffer::try_allocate(capacity)?;
		unsafe {
			self.relocate(new_buf, None)
		}

		Ok(())
	}

	/// Capacity to grow to when the array must hold `required` elements in total.
	///
	/// This guarantees exponential growth: the current capacity is at least doubled,
	/// which gives 1 for an empty buffer.
	fn amortized_capacity(&self, required: usize) -> Result<usize, AllocError> {
		let doubled = self.capacity().checked_mul(2).ok_or(AllocError::CapacityOverflow)?;
		Ok(cmp::max(doubled, required))
	}

	/// Moves every element into `new_buf`, then adopts it and frees the old storage.
	///
	/// Moving is a plain bitwise copy, so unlike constructing elements it cannot fail.
	/// If `gap` is given, the elements from `gap` onward land one slot further, so the
	/// slot `gap` of `new_buf` is left as it is.
	///
	/// ## Safety
	///
	/// `new_buf` must have room for `len` elements, plus one if `gap` is given,
	/// and `gap` must be at most `len`.
	unsafe fn relocate(&mut self, mut new_buf: RawBuffer<T>, gap: Option<usize>) {
		trace!(from = self.capacity(), to = new_buf.capacity(), len = self.len, "relocating dynamic array");

		let len = self.len;
		let src = self.buf.as_ptr();
		match gap {
			Some(index) => {
				debug_assert!(index <= len && len < new_buf.capacity());
				ptr::copy_nonoverlapping(src, new_buf.as_mut_ptr(), index);
				ptr::copy_nonoverlapping(src.add(index), new_buf.offset_mut(index + 1), len - index);
			},
			None => {
				debug_assert!(len <= new_buf.capacity());
				ptr::copy_nonoverlapping(src, new_buf.as_mut_ptr(), len)
			}
		}

		self.buf.swap(&mut new_buf);
		// `new_buf` now holds the old storage, whose elements have all been moved out.
	}

	/// Resizes the array in-place so that `len` is equal to `new_len`.
	///
	/// If `new_len` is greater than `len`, the array is extended by the
	/// difference, with each additional slot filled with the default value.
	/// If `new_len` is less than `len`, the array is simply truncated.
	#[inline]
	pub fn resize(&mut self, new_len: usize) where T: Default {
		self.resize_with(new_len, T::default)
	}

	/// Resizes the array in-place so that `len` is equal to `new_len`,
	/// filling new slots with values returned by `f`.
	///
	/// The capacity grows to exactly `new_len` when needed.
	/// If `f` panics, the values it already returned are dropped and
	/// the length is left unchanged. The capacity may have grown.
	///
	/// # Panics
	///
	/// Panics if the required size exceeds `isize::MAX` bytes.
	#[inline]
	pub fn resize_with<F>(&mut self, new_len: usize, f: F) where F: FnMut() -> T {
		handle_reserve(self.try_resize_with(new_len, f))
	}

	/// The same as `resize_with`, but returns on errors instead of panicking or aborting.
	pub fn try_resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), AllocError> where F: FnMut() -> T {
		if new_len <= self.len {
			self.truncate(new_len);
			return Ok(())
		}

		self.try_reserve(new_len)?;

		unsafe {
			let mut run = Constructed::new(self.buf.offset_mut(self.len));
			for _ in self.len..new_len {
				run.write(f());
			}
			run.commit();
		}

		self.len = new_len;
		Ok(())
	}

	/// Shortens the array, keeping the first `len` elements and dropping
	/// the rest.
	///
	/// If `len` is greater than the array's current length, this has no
	/// effect.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the array.
	pub fn truncate(&mut self, len: usize) {
		if len >= self.len {
			return
		}

		unsafe {
			let tail = ptr::slice_from_raw_parts_mut(self.buf.offset_mut(len), self.len - len);
			self.len = len;
			ptr::drop_in_place(tail);
		}
	}

	/// Clears the array, removing all values.
	///
	/// Note that this method has no effect on the allocated capacity
	/// of the array.
	#[inline]
	pub fn clear(&mut self) {
		self.truncate(0)
	}

	/// Builds a new element with `f` and inserts it at position `index`,
	/// shifting all elements after it to the right.
	///
	/// When the array is full, the capacity is doubled (or set to 1 if it is zero).
	/// The new element is built before any existing element is touched, so if `f`
	/// panics the array is left unchanged.
	///
	/// Returns a reference to the new element.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	pub fn try_emplace_with<F>(&mut self, index: usize, f: F) -> Result<&mut T, AllocError> where F: FnOnce() -> T {
		let len = self.len;
		if index > len {
			panic!("insertion index (is {}) should be <= len (which is {})", index, len);
		}

		if len == self.capacity() {
			let new_capacity = self.amortized_capacity(len + 1)?;

			let mut new_buf = RawBuffer::try_allocate(new_capacity)?;
			unsafe {
				// new element first, then the old ones around it.
				ptr::write(new_buf.offset_mut(index), f());
				self.relocate(new_buf, Some(index));
			}
		} else {
			unsafe {
				if index == len {
					ptr::write(self.buf.offset_mut(len), f());
				} else {
					let value = f();
					let p = self.buf.offset_mut(index);
					// Shift everything over to make space.
					ptr::copy(p, p.add(1), len - index);
					ptr::write(p, value);
				}
			}
		}

		self.len = len + 1;
		Ok(unsafe { self.buf.slot_mut(index).assume_init_mut() })
	}

	/// Builds a new element with `f` and inserts it at position `index`.
	///
	/// See [`try_emplace_with`](DynamicArray::try_emplace_with).
	///
	/// # Panics
	///
	/// Panics if `index > len`, or if the new capacity exceeds `isize::MAX` bytes.
	#[inline]
	pub fn emplace_with<F>(&mut self, index: usize, f: F) -> &mut T where F: FnOnce() -> T {
		handle_reserve(self.try_emplace_with(index, f))
	}

	/// Builds a new element with `f` at the back of the array.
	#[inline]
	pub fn emplace_back_with<F>(&mut self, f: F) -> &mut T where F: FnOnce() -> T {
		self.emplace_with(self.len, f)
	}

	/// Inserts an element at position `index` within the array, shifting all
	/// elements after it to the right.
	///
	/// # Panics
	///
	/// Panics if `index > len`.
	#[inline]
	pub fn insert(&mut self, index: usize, element: T) {
		self.emplace_with(index, || element);
	}

	/// The same as `insert`, but returns on allocation errors instead of panicking or aborting.
	#[inline]
	pub fn try_insert(&mut self, index: usize, element: T) -> Result<(), AllocError> {
		self.try_emplace_with(index, || element).map(|_| ())
	}

	/// Appends an element to the back of the array.
	///
	/// # Panics
	///
	/// Panics if the new capacity exceeds `isize::MAX` bytes.
	#[inline]
	pub fn push(&mut self, value: T) {
		self.emplace_with(self.len, || value);
	}

	/// The same as `push`, but returns on allocation errors instead of panicking or aborting.
	#[inline]
	pub fn try_push(&mut self, value: T) -> Result<(), AllocError> {
		self.try_emplace_with(self.len, || value).map(|_| ())
	}

	/// Removes the last element from the array and returns it, or [`None`] if it
	/// is empty.
	#[inline]
	pub fn pop(&mut self) -> Option<T> {
		if self.len == 0 {
			None
		} else {
			self.len -= 1;
			unsafe {
				Some(self.buf.slot(self.len).assume_init_read())
			}
		}
	}

	/// Removes and returns the element at position `index` within the array,
	/// shifting all elements after it to the left.
	///
	/// # Panics
	///
	/// Panics if `index` is out of bounds.
	pub fn remove(&mut self, index: usize) -> T {
		let len = self.len;
		if index >= len {
			panic!("removal index (is {}) should be < len (is {})", index, len);
		}

		unsafe {
			// the place we are taking from.
			let p = self.buf.offset_mut(index);
			let ret = ptr::read(p);

			// Shift everything down to fill in that spot.
			ptr::copy(p.add(1), p, len - index - 1);
			self.len = len - 1;
			ret
		}
	}

	/// Creates an independent copy of the array, with a capacity equal to its length.
	///
	/// If cloning an element panics, the clones made so far are dropped and
	/// `self` is untouched.
	#[inline]
	pub fn try_clone(&self) -> Result<Self, AllocError> where T: Clone {
		let source = self.as_slice();
		Self::try_from_fn(source.len(), |i| source[i].clone())
	}
}

impl<T: Clone> Clone for DynamicArray<T> {
	#[inline]
	fn clone(&self) -> Self {
		handle_reserve(self.try_clone())
	}

	/// Overwrites `self` with a copy of `source`.
	///
	/// If `source` does not fit in the current capacity, a full copy is built first
	/// and swapped in, so a panicking `clone` leaves `self` unchanged.
	///
	/// Otherwise the current buffer is reused. The shared prefix is assigned with
	/// [`Clone::clone_from`], surplus elements are dropped and missing ones are
	/// cloned into the free slots. If a clone panics on this path, elements already
	/// assigned keep their new value.
	fn clone_from(&mut self, source: &Self) {
		if source.len > self.capacity() {
			let mut copy = source.clone();
			self.swap(&mut copy);
			return
		}

		let shared = cmp::min(self.len, source.len);
		for (dst, src) in self.as_mut_slice()[..shared].iter_mut().zip(&source[..shared]) {
			dst.clone_from(src)
		}

		if source.len < self.len {
			self.truncate(source.len)
		} else {
			unsafe {
				let mut run = Constructed::new(self.buf.offset_mut(self.len));
				for value in &source[self.len..] {
					run.write(value.clone());
				}
				run.commit();
			}

			self.len = source.len
		}
	}
}

impl<T> Default for DynamicArray<T> {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Deref for DynamicArray<T> {
	type Target = [T];

	#[inline]
	fn deref(&self) -> &[T] {
		self.as_slice()
	}
}

impl<T> DerefMut for DynamicArray<T> {
	#[inline]
	fn deref_mut(&mut self) -> &mut [T] {
		self.as_mut_slice()
	}
}

impl<T> AsRef<[T]> for DynamicArray<T> {
	#[inline]
	fn as_ref(&self) -> &[T] {
		self
	}
}

impl<T> AsMut<[T]> for DynamicArray<T> {
	#[inline]
	fn as_mut(&mut self) -> &mut [T] {
		self
	}
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

impl<T> Extend<T> for DynamicArray<T> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
		let mut iter = iterable.into_iter();
		let (lower, _) = iter.size_hint();
		let required = self.len.saturating_add(lower);
		if required > self.capacity() {
			handle_reserve(self.amortized_capacity(required).and_then(|capacity| self.try_reserve(capacity)))
		}

		unsafe {
			// fill the free slots without checking the capacity on each element.
			let capacity = self.capacity();
			let dst = self.buf.as_mut_ptr();
			let mut local_len = SetLenOnDrop::new(&mut self.len);
			while local_len.current_len() < capacity {
				match iter.next() {
					Some(value) => {
						ptr::write(dst.add(local_len.current_len()), value);
						local_len.increment_len(1);
					},
					None => return
				}
			}
		}

		for value in iter {
			self.push(value)
		}
	}
}

impl<T> FromIterator<T> for DynamicArray<T> {
	#[inline]
	fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
		let mut array = Self::new();
		array.extend(iterable);
		array
	}
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
	type Item = &'a T;
	type IntoIter = slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
	type Item = &'a mut T;
	type IntoIter = slice::IterMut<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter_mut()
	}
}

impl<T> IntoIterator for DynamicArray<T> {
	type Item = T;
	type IntoIter = IntoIter<T>;

	fn into_iter(self) -> IntoIter<T> {
		let mut this = ManuallyDrop::new(self);
		// `this` is never dropped, and its buffer is left empty.
		IntoIter {
			buf: this.buf.take(),
			start: 0,
			end: this.len
		}
	}
}

/// An iterator that moves out of a [`DynamicArray`].
///
/// Elements that are not consumed are dropped with the iterator.
pub struct IntoIter<T> {
	buf: RawBuffer<T>,

	/// Index of the next element to yield from the front.
	start: usize,

	/// One past the index of the next element to yield from the back.
	end: usize
}

impl<T> IntoIter<T> {
	/// Returns the remaining elements as a slice.
	#[inline]
	pub fn as_slice(&self) -> &[T] {
		unsafe {
			slice::from_raw_parts(self.buf.offset(self.start), self.end - self.start)
		}
	}
}

impl<T> Iterator for IntoIter<T> {
	type Item = T;

	#[inline]
	fn next(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			let value = unsafe { self.buf.slot(self.start).assume_init_read() };
			self.start += 1;
			Some(value)
		}
	}

	#[inline]
	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.end - self.start;
		(remaining, Some(remaining))
	}
}

impl<T> DoubleEndedIterator for IntoIter<T> {
	#[inline]
	fn next_back(&mut self) -> Option<T> {
		if self.start == self.end {
			None
		} else {
			self.end -= 1;
			unsafe {
				Some(self.buf.slot(self.end).assume_init_read())
			}
		}
	}
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
	fn drop(&mut self) {
		unsafe {
			// only drop remaining elements.
			let remaining = ptr::slice_from_raw_parts_mut(self.buf.offset_mut(self.start), self.end - self.start);
			ptr::drop_in_place(remaining)
		}
	}
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::rc::Rc;

	#[test]
	fn reserve_push_insert_remove() {
		let mut array = DynamicArray::new();
		array.reserve(2);
		array.push(1);
		array.push(2);
		assert_eq!((array.len(), array.capacity()), (2, 2));

		array.push(3);
		assert_eq!((array.len(), array.capacity()), (3, 4));
		assert_eq!(array.as_slice(), [1, 2, 3]);

		array.insert(1, 99);
		assert_eq!(array.len(), 4);
		assert_eq!(array.as_slice(), [1, 99, 2, 3]);

		assert_eq!(array.remove(0), 1);
		assert_eq!(array.len(), 3);
		assert_eq!(array.as_slice(), [99, 2, 3]);
	}

	#[test]
	fn push_grows_geometrically() {
		let mut array = DynamicArray::new();
		let mut capacities = Vec::new();
		for i in 0..9 {
			array.push(i);
			capacities.push(array.capacity());
		}

		assert_eq!(capacities, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
	}

	#[test]
	fn reserve_within_capacity_is_a_no_op() {
		let mut array: DynamicArray<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
		array.reserve(8);
		let ptr = array.as_ptr();

		array.reserve(0);
		array.reserve(5);
		array.reserve(8);

		assert_eq!(array.capacity(), 8);
		assert_eq!(array.as_ptr(), ptr);
		assert_eq!(array.as_slice(), ["a", "b", "c"]);
	}

	#[test]
	fn reserve_sets_exact_capacity() {
		let mut array = DynamicArray::from_fn(3, |i| i * 10);
		array.reserve(11);
		assert_eq!(array.capacity(), 11);
		assert_eq!(array.as_slice(), [0, 10, 20]);
	}

	#[test]
	fn with_len_builds_default_values() {
		let array: DynamicArray<String> = DynamicArray::with_len(4);
		assert_eq!((array.len(), array.capacity()), (4, 4));
		assert!(array.iter().all(String::is_empty));

		let empty: DynamicArray<u8> = DynamicArray::with_len(0);
		assert_eq!((empty.len(), empty.capacity()), (0, 0));
	}

	#[test]
	fn with_capacity_is_empty() {
		let array: DynamicArray<u64> = DynamicArray::with_capacity(6);
		assert!(array.is_empty());
		assert_eq!(array.capacity(), 6);
	}

	#[test]
	fn resize_shrinks_and_grows() {
		let mut array = DynamicArray::from_fn(5, |i| i as u32);

		array.resize(2);
		assert_eq!(array.as_slice(), [0, 1]);
		assert_eq!(array.capacity(), 5);

		array.resize(4);
		assert_eq!(array.as_slice(), [0, 1, 0, 0]);
		assert_eq!(array.capacity(), 5);

		array.resize(7);
		assert_eq!(array.as_slice(), [0, 1, 0, 0, 0, 0, 0]);
		assert_eq!(array.capacity(), 7);

		let mut next = 100;
		array.resize_with(9, || {
			next += 1;
			next
		});
		assert_eq!(&array[7..], [101, 102]);

		array.resize(9);
		assert_eq!(array.len(), 9);
	}

	#[test]
	fn take_leaves_source_empty() {
		let mut source = DynamicArray::from_fn(3, |i| i);
		let ptr = source.as_ptr();

		let taken = source.take();
		assert_eq!(taken.as_slice(), [0, 1, 2]);
		assert_eq!(taken.as_ptr(), ptr);
		assert_eq!((source.len(), source.capacity()), (0, 0));

		source.push(5);
		assert_eq!(source.as_slice(), [5]);
	}

	#[test]
	fn swap_exchanges_content() {
		let mut a = DynamicArray::from_fn(2, |i| i);
		let mut b = DynamicArray::with_capacity(10);
		b.push(7);

		a.swap(&mut b);
		assert_eq!((a.as_slice(), a.capacity()), (&[7][..], 10));
		assert_eq!((b.as_slice(), b.capacity()), (&[0, 1][..], 2));
	}

	#[test]
	fn clone_is_independent() {
		let mut original = DynamicArray::with_capacity(8);
		original.extend(["x".to_string(), "y".to_string()]);

		let mut copy = original.clone();
		assert_eq!(copy.as_slice(), original.as_slice());
		assert_eq!(copy.capacity(), 2);
		assert_ne!(copy.as_ptr(), original.as_ptr());

		copy[0].push('!');
		assert_eq!(original[0], "x");
		assert_eq!(copy[0], "x!");
	}

	#[test]
	fn clone_from_reallocates_when_capacity_is_too_small() {
		let source = DynamicArray::from_fn(5, |i| i.to_string());
		let mut target = DynamicArray::from_fn(2, |_| String::from("old"));

		target.clone_from(&source);
		assert_eq!(target.as_slice(), source.as_slice());
		assert_eq!(target.capacity(), 5);
	}

	#[test]
	fn clone_from_reuses_buffer() {
		let source = DynamicArray::from_fn(2, |i| i.to_string());

		let mut shrinking = DynamicArray::from_fn(4, |_| String::from("old"));
		let ptr = shrinking.as_ptr();
		shrinking.clone_from(&source);
		assert_eq!(shrinking.as_slice(), ["0", "1"]);
		assert_eq!((shrinking.capacity(), shrinking.as_ptr()), (4, ptr));

		let mut growing = DynamicArray::with_capacity(3);
		growing.push(String::from("old"));
		let ptr = growing.as_ptr();
		growing.clone_from(&source);
		assert_eq!(growing.as_slice(), ["0", "1"]);
		assert_eq!((growing.capacity(), growing.as_ptr()), (3, ptr));
	}

	#[test]
	fn insert_keeps_relative_order() {
		// in place.
		let mut array = DynamicArray::with_capacity(10);
		array.extend([1, 2, 3]);
		array.insert(0, 10);
		array.insert(2, 20);
		array.insert(5, 30);
		assert_eq!(array.as_slice(), [10, 1, 20, 2, 3, 30]);
		assert_eq!(array.capacity(), 10);

		// reallocating.
		let mut array = DynamicArray::from_fn(4, |i| i);
		array.insert(2, 42);
		assert_eq!(array.as_slice(), [0, 1, 42, 2, 3]);
		assert_eq!(array.capacity(), 8);

		let mut array = DynamicArray::new();
		array.insert(0, 'a');
		assert_eq!((array.as_slice(), array.capacity()), (&['a'][..], 1));
	}

	#[test]
	fn emplace_returns_new_element() {
		let mut array = DynamicArray::from_fn(2, |i| vec![i]);
		let new = array.emplace_with(1, || vec![7, 8]);
		new.push(9);
		assert_eq!(array.as_slice(), [vec![0], vec![7, 8, 9], vec![1]]);

		*array.emplace_back_with(Vec::new) = vec![3];
		assert_eq!(array[3], [3]);
	}

	#[test]
	#[should_panic(expected = "insertion index (is 3) should be <= len (which is 2)")]
	fn insert_out_of_bounds_panics() {
		let mut array = DynamicArray::from_fn(2, |i| i);
		array.insert(3, 0);
	}

	#[test]
	#[should_panic(expected = "removal index (is 2) should be < len (is 2)")]
	fn remove_out_of_bounds_panics() {
		let mut array = DynamicArray::from_fn(2, |i| i);
		array.remove(2);
	}

	#[test]
	fn pop_and_remove() {
		let mut array = DynamicArray::from_fn(4, |i| i);
		assert_eq!(array.pop(), Some(3));
		assert_eq!(array.remove(1), 1);
		assert_eq!(array.as_slice(), [0, 2]);
		assert_eq!(array.pop(), Some(2));
		assert_eq!(array.pop(), Some(0));
		assert_eq!(array.pop(), None);
		assert_eq!(array.capacity(), 4);
	}

	#[test]
	fn elements_are_dropped_exactly_once() {
		let value = Rc::new(());
		{
			let mut array = DynamicArray::new();
			for _ in 0..10 {
				array.push(Rc::clone(&value));
			}
			array.insert(3, Rc::clone(&value));
			drop(array.remove(0));
			drop(array.pop());
			array.truncate(5);
			assert_eq!(Rc::strong_count(&value), 6);

			array.clear();
			assert_eq!(Rc::strong_count(&value), 1);
			assert_eq!(array.capacity(), 16);

			array.push(Rc::clone(&value));
		}
		assert_eq!(Rc::strong_count(&value), 1);
	}

	#[test]
	fn into_iter_drops_remaining_elements() {
		let value = Rc::new(());
		let array = DynamicArray::from_fn(5, |_| Rc::clone(&value));

		let mut iter = array.into_iter();
		assert_eq!(iter.len(), 5);
		drop(iter.next());
		drop(iter.next_back());
		assert_eq!(iter.as_slice().len(), 3);
		assert_eq!(Rc::strong_count(&value), 4);

		drop(iter);
		assert_eq!(Rc::strong_count(&value), 1);
	}

	#[test]
	fn into_iter_yields_in_order() {
		let array = DynamicArray::from_fn(4, |i| i);
		assert_eq!(array.clone().into_iter().collect::<Vec<_>>(), [0, 1, 2, 3]);
		assert_eq!(array.into_iter().rev().collect::<Vec<_>>(), [3, 2, 1, 0]);
	}

	#[test]
	fn borrowed_traversal() {
		let mut array = DynamicArray::from_fn(3, |i| i);
		for value in &mut array {
			*value *= 2;
		}

		let mut sum = 0;
		for value in &array {
			sum += value;
		}
		assert_eq!(sum, 6);
	}

	#[test]
	fn extend_grows_geometrically() {
		let mut array = DynamicArray::new();
		let mut capacities = Vec::new();
		for i in 0..9 {
			array.extend([i]);
			capacities.push(array.capacity());
		}

		assert_eq!(capacities, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
		assert_eq!(array.as_slice(), [0, 1, 2, 3, 4, 5, 6, 7, 8]);

		// a large lower bound is reserved in one step.
		array.extend(9..40);
		assert_eq!(array.capacity(), 40);
		assert_eq!(array.len(), 40);
	}

	#[test]
	fn extend_past_capacity() {
		let mut array = DynamicArray::with_capacity(2);
		array.push(0);
		// `filter` gives no useful lower bound.
		array.extend((1..6).filter(|_| true));
		assert_eq!(array.as_slice(), [0, 1, 2, 3, 4, 5]);
	}

	#[test]
	fn zero_sized_elements() {
		let mut array = DynamicArray::new();
		for _ in 0..5 {
			array.push(());
		}
		array.insert(2, ());
		assert_eq!(array.len(), 6);
		assert_eq!(array.capacity(), 8);
		assert_eq!(array.pop(), Some(()));
	}

	#[test]
	fn debug_formats_as_a_list() {
		let array = DynamicArray::from_fn(3, |i| i + 1);
		assert_eq!(format!("{:?}", array), "[1, 2, 3]");
		assert_eq!(format!("{:?}", array.into_iter()), "IntoIter([1, 2, 3])");
	}

	static_assertions::assert_impl_all!(DynamicArray<u32>: Send, Sync, Clone, Default);
	static_assertions::assert_impl_all!(IntoIter<u32>: Send, Sync);
	static_assertions::assert_not_impl_any!(DynamicArray<Rc<u32>>: Send, Sync);
	static_assertions::assert_not_impl_any!(DynamicArray<RawBuffer<u8>>: Clone);

	#[cfg(not(miri))]
	mod proptests {
		use super::*;
		use proptest::prelude::*;

		#[derive(Clone, Debug)]
		enum Op {
			Push(i32),
			Insert(usize, i32),
			Remove(usize),
			Pop,
			Reserve(usize),
			Resize(usize)
		}

		fn op() -> impl Strategy<Value = Op> {
			prop_oneof![
				any::<i32>().prop_map(Op::Push),
				(any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
				any::<usize>().prop_map(Op::Remove),
				Just(Op::Pop),
				(0usize..64).prop_map(Op::Reserve),
				(0usize..64).prop_map(Op::Resize)
			]
		}

		proptest! {
			#[test]
			fn behaves_like_vec(ops in proptest::collection::vec(op(), 0..100)) {
				let mut array = DynamicArray::new();
				let mut model = Vec::new();

				for op in ops {
					match op {
						Op::Push(v) => {
							array.push(v);
							model.push(v);
						},
						Op::Insert(i, v) => {
							let i = i % (model.len() + 1);
							array.insert(i, v);
							model.insert(i, v);
						},
						Op::Remove(i) => {
							if !model.is_empty() {
								let i = i % model.len();
								prop_assert_eq!(array.remove(i), model.remove(i));
							}
						},
						Op::Pop => {
							prop_assert_eq!(array.pop(), model.pop());
						},
						Op::Reserve(n) => {
							let before = array.capacity();
							array.reserve(n);
							prop_assert_eq!(array.capacity(), cmp::max(before, n));
						},
						Op::Resize(n) => {
							array.resize(n);
							model.resize(n, 0);
						}
					}

					prop_assert_eq!(array.as_slice(), model.as_slice());
					prop_assert!(array.len() <= array.capacity());
				}
			}

			#[test]
			fn push_capacity_follows_doubling(count in 0usize..300) {
				let mut array = DynamicArray::new();
				let mut expected = 0usize;

				for i in 0..count {
					if array.len() == expected {
						expected = cmp::max(1, expected * 2);
					}
					array.push(i);
					prop_assert_eq!(array.capacity(), expected);
				}

				prop_assert_eq!(array.len(), count);
			}
		}
	}
}
