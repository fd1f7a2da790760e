use std::{
    alloc::{self, Layout, handle_alloc_error},
    mem::MaybeUninit,
    ptr::{self, NonNull},
    slice,
};

use crate::component::{Component, ComponentDescriptor, ComponentId};

///
/// Growable type-erased buffer holding values of a single component type.
/// Capacity is tracked in bytes, length in rows.
///
pub(crate) struct Column {
    descriptor: ComponentDescriptor,
    data: NonNull<u8>,
    capacity: usize,
    len: usize,
    /// Row past `len` holding a value removed by [`Column::evict`] and not dropped yet
    evicted: Option<usize>,
}

// Column owns values of a single `Send` component type
unsafe impl Send for Column {}

impl Column {
    pub(crate) fn new(descriptor: ComponentDescriptor) -> Self {
        Column {
            data: dangling(descriptor.align()),
            descriptor,
            capacity: 0,
            len: 0,
            evicted: None,
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> ComponentId {
        self.descriptor.id()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Capacity in bytes
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn data(&self) -> NonNull<u8> {
        self.data
    }

    #[inline]
    fn slot(&self, row: usize) -> NonNull<u8> {
        // Rows are a multiple of size apart, so alignment is preserved
        unsafe { self.data.add(row * self.descriptor.size()) }
    }

    ///
    /// Makes sure one more row fits without reallocation.
    /// Capacity grows as `2 * capacity + size` bytes.
    ///
    pub(crate) fn reserve_one(&mut self) {
        // Next push overwrites the evicted slot, its value is leaked
        self.evicted = None;
        let size = self.descriptor.size();
        if size == 0 || self.len * size + size <= self.capacity {
            return;
        }
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .and_then(|c| c.checked_add(size))
            .unwrap_or_else(|| capacity_overflow());
        self.grow_to(new_capacity);
    }

    fn grow_to(&mut self, new_capacity: usize) {
        let layout = Layout::from_size_align(new_capacity, self.descriptor.align())
            .unwrap_or_else(|_| capacity_overflow());
        let Some(data) = NonNull::new(unsafe { alloc::alloc(layout) }) else {
            handle_alloc_error(layout)
        };
        let size = self.descriptor.size();
        for row in 0..self.len {
            unsafe { self.descriptor.relocate(self.slot(row), data.add(row * size)) };
        }
        self.release();
        self.data = data;
        self.capacity = new_capacity;
    }

    fn release(&mut self) {
        if self.capacity > 0 {
            unsafe {
                alloc::dealloc(
                    self.data.as_ptr(),
                    Layout::from_size_align_unchecked(self.capacity, self.descriptor.align()),
                )
            };
        }
        self.data = dangling(self.descriptor.align());
        self.capacity = 0;
    }

    /// Appends `value` as new row and returns pointer to it.
    /// # Safety
    /// `T` must be the type this column was created for.
    pub(crate) unsafe fn push<T: Component>(&mut self, value: T) -> NonNull<T> {
        debug_assert_eq!(self.id(), ComponentId::of::<T>());
        self.reserve_one();
        let slot = self.slot(self.len).cast::<T>();
        unsafe { ptr::write(slot.as_ptr(), value) };
        self.len += 1;
        slot
    }

    /// Moves value out of `src` into new row.
    /// # Safety
    /// `src` must hold a live value of this column's type outside of this column.
    pub(crate) unsafe fn push_relocated(&mut self, src: NonNull<u8>) {
        self.reserve_one();
        unsafe { self.descriptor.relocate(src, self.slot(self.len)) };
        self.len += 1;
    }

    /// Returns pointer to live value at `row` so it can be relocated elsewhere.
    /// The row must be closed with [`Column::close_gap`] afterwards.
    #[inline]
    pub(crate) fn row_ptr(&self, row: usize) -> NonNull<u8> {
        assert!(row < self.len, "row {row} is out of bounds ({})", self.len);
        self.slot(row)
    }

    ///
    /// Removes `row` without dropping its value: following rows shift one position down
    /// and the value ends up right past the new end. It stays alive until [`Column::drop_evicted`].
    ///
    pub(crate) fn evict(&mut self, row: usize) {
        assert!(row < self.len, "row {row} is out of bounds ({})", self.len);
        let size = self.descriptor.size();
        if size > 0 {
            let bytes = unsafe {
                slice::from_raw_parts_mut(
                    self.slot(row).cast::<MaybeUninit<u8>>().as_ptr(),
                    (self.len - row) * size,
                )
            };
            bytes.rotate_left(size);
        }
        self.len -= 1;
        self.evicted = Some(self.len);
    }

    /// Drops value left by the last [`Column::evict`], if any
    pub(crate) fn drop_evicted(&mut self) {
        if let Some(row) = self.evicted.take() {
            unsafe { self.descriptor.destroy(self.slot(row)) };
        }
    }

    /// Shifts rows after `row` one position down.
    /// # Safety
    /// Slot at `row` must not hold a live value.
    pub(crate) unsafe fn close_gap(&mut self, row: usize) {
        assert!(row < self.len);
        for i in row + 1..self.len {
            unsafe { self.descriptor.relocate(self.slot(i), self.slot(i - 1)) };
        }
        self.len -= 1;
    }

    /// Drops all values, keeps allocation.
    pub(crate) fn clear(&mut self) {
        let len = self.len;
        // Forget rows first, a panicking drop leaks the rest instead of double-dropping
        self.len = 0;
        for row in 0..len {
            unsafe { self.descriptor.destroy(self.slot(row)) };
        }
    }

    /// # Safety
    /// `T` must be the type this column was created for.
    #[inline]
    pub(crate) unsafe fn as_slice<T: Component>(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.data.cast::<T>().as_ptr(), self.len) }
    }

    /// # Safety
    /// `T` must be the type this column was created for.
    #[inline]
    pub(crate) unsafe fn as_mut_slice<T: Component>(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.data.cast::<T>().as_ptr(), self.len) }
    }
}

impl Drop for Column {
    fn drop(&mut self) {
        self.drop_evicted();
        self.clear();
        self.release();
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("component", &self.descriptor.name())
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[inline]
fn dangling(align: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut(align)).unwrap_or(NonNull::dangling())
}

#[cold]
pub(super) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}
