//! Fixed-size-class slab allocator.
//!
//! A `Pool` serves blocks of a single element size out of chunks it owns.
//! Free blocks are threaded into a singly-linked list through their first
//! bytes, so an element is never smaller than one link. Allocation and release
//! are O(1); blocks are never coalesced and chunks are only released when the
//! pool itself is dropped.
//!
//! Precondition violations (re-initialising a pool with live blocks, a zero
//! block size or growth factor) are programming errors and panic.

use std::alloc::{self, Layout};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};
use std::rc::Rc;

type Link = Option<NonNull<u8>>;

/// Size of one free-list link, the smallest element a pool serves.
pub const LINK_SIZE: usize = mem::size_of::<Link>();
const LINK_ALIGN: usize = mem::align_of::<Link>();

const DEFAULT_INITIAL_BLOCK_SIZE: usize = 1024;
const DEFAULT_GROWTH_FACTOR: usize = 1;

/// Growth policy of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of elements in the first chunk.
    pub initial_block_size: usize,
    /// Factor applied to the block size after every default grow.
    pub growth_factor: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_block_size: DEFAULT_INITIAL_BLOCK_SIZE,
            growth_factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

/// Counter snapshot of a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub element_size: usize,
    pub block_size: usize,
    /// Blocks currently handed out.
    pub instantiations: usize,
    /// Blocks ever created by this pool.
    pub total: usize,
    /// Blocks sitting on the free list.
    pub capacity: usize,
    /// Number of chunks allocated so far.
    pub grows: usize,
}

struct Chunk {
    mem: NonNull<u8>,
    layout: Layout,
}

impl Chunk {
    fn contains(&self, block: NonNull<u8>) -> bool {
        let start = self.mem.as_ptr() as usize;
        let addr = block.as_ptr() as usize;
        addr >= start && addr < start + self.layout.size()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: `mem` was obtained from `alloc::alloc` with exactly this layout.
        unsafe { alloc::dealloc(self.mem.as_ptr(), self.layout) }
    }
}

/// Slab allocator for one element size class.
pub struct Pool {
    initial_block_size: usize,
    growth_factor: usize,
    block_size: usize,
    el_size: usize,
    align: usize,
    instantiations: usize,
    total: usize,
    capacity: usize,
    grows: usize,
    chunks: Vec<Chunk>,
    head: Link,
    initialized: bool,
}

/// A pool shared by every `PoolBox` allocated from it.
pub type SharedPool = Rc<RefCell<Pool>>;

fn check_config(config: PoolConfig) {
    assert!(
        config.initial_block_size > 0,
        "pool block size must be positive"
    );
    assert!(config.growth_factor > 0, "pool growth factor must be positive");
}

// SAFETY (both helpers): `block` points at a block of at least `LINK_SIZE`
// bytes owned by the calling pool. Blocks are only `el_size`-aligned, hence
// the unaligned accesses.
unsafe fn read_link(block: NonNull<u8>) -> Link {
    unsafe { block.as_ptr().cast::<Link>().read_unaligned() }
}

unsafe fn write_link(block: NonNull<u8>, next: Link) {
    unsafe { block.as_ptr().cast::<Link>().write_unaligned(next) }
}

impl Pool {
    /// An uninitialised pool serving link-sized elements with the default growth policy.
    pub fn new() -> Self {
        Self::raw(LINK_SIZE, LINK_ALIGN, PoolConfig::default(), false)
    }

    /// A pool serving elements of `el_size` bytes (rounded up to `LINK_SIZE`).
    pub fn with_config(el_size: usize, config: PoolConfig) -> Self {
        check_config(config);
        Self::raw(el_size.max(LINK_SIZE), LINK_ALIGN, config, true)
    }

    /// A pool whose blocks can hold, and are aligned for, a `T`.
    pub fn for_type<T>(config: PoolConfig) -> Self {
        check_config(config);
        Self::raw(
            mem::size_of::<T>().max(LINK_SIZE),
            mem::align_of::<T>().max(LINK_ALIGN),
            config,
            true,
        )
    }

    fn raw(el_size: usize, align: usize, config: PoolConfig, initialized: bool) -> Self {
        Self {
            initial_block_size: config.initial_block_size,
            growth_factor: config.growth_factor,
            block_size: config.initial_block_size,
            el_size,
            align,
            instantiations: 0,
            total: 0,
            capacity: 0,
            grows: 0,
            chunks: Vec::new(),
            head: None,
            initialized,
        }
    }

    /// Reconfigures the pool. Panics if any block is still handed out.
    pub fn init(&mut self, el_size: usize, initial_block_size: usize, growth_factor: usize) {
        assert_eq!(
            self.instantiations, 0,
            "Pool::init called while blocks are outstanding"
        );
        let config = PoolConfig {
            initial_block_size,
            growth_factor,
        };
        check_config(config);

        self.chunks.clear();
        self.head = None;
        self.initial_block_size = initial_block_size;
        self.growth_factor = growth_factor;
        self.block_size = initial_block_size;
        self.el_size = el_size.max(LINK_SIZE);
        self.align = LINK_ALIGN;
        self.total = 0;
        self.capacity = 0;
        self.grows = 0;
        self.initialized = true;
    }

    /// Hands out one free block, growing the pool if the free list is empty.
    pub fn alloc(&mut self) -> NonNull<u8> {
        if self.head.is_none() {
            self.grow();
        }
        let Some(block) = self.head else {
            unreachable!("grow always refills the free list");
        };
        // SAFETY: every block on the free list belongs to one of our chunks.
        self.head = unsafe { read_link(block) };
        self.instantiations += 1;
        self.capacity -= 1;
        block
    }

    /// Returns a block to the free list.
    ///
    /// # Safety
    /// `block` must have been returned by `alloc` on this pool and must not
    /// be used after this call.
    pub unsafe fn free(&mut self, block: NonNull<u8>) {
        debug_assert!(self.owns(block), "block returned to a foreign pool");
        assert!(self.instantiations > 0, "Pool::free without outstanding blocks");
        // SAFETY: the caller hands back one of our blocks.
        unsafe { write_link(block, self.head) };
        self.head = Some(block);
        self.instantiations -= 1;
        self.capacity += 1;
    }

    /// Grows by the current block size, then scales the block size by the growth factor.
    pub fn grow(&mut self) {
        self.grow_by(self.block_size);
        self.block_size = self.block_size.saturating_mul(self.growth_factor);
    }

    /// Adds a chunk of `n` elements to the free list.
    pub fn grow_by(&mut self, n: usize) {
        assert!(n > 0, "pool cannot grow by zero elements");
        let size = n
            .checked_mul(self.el_size)
            .expect("pool chunk size overflows usize");
        let layout = Layout::from_size_align(size, self.align).expect("invalid pool chunk layout");

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(mem) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        // Thread the new blocks in front of whatever is still free.
        for i in 0..n {
            // SAFETY: all offsets stay inside the freshly allocated chunk.
            unsafe {
                let block = mem.add(i * self.el_size);
                let next = if i + 1 < n {
                    Some(mem.add((i + 1) * self.el_size))
                } else {
                    self.head
                };
                write_link(block, next);
            }
        }
        self.head = Some(mem);
        self.chunks.push(Chunk { mem, layout });
        self.capacity += n;
        self.total += n;
        self.grows += 1;
        log::trace!(
            "pool grew by {} elements of {} bytes (total {})",
            n,
            self.el_size,
            self.total
        );
    }

    /// Makes sure that `n` further allocations succeed without growing.
    pub fn reserve(&mut self, n: usize) {
        if self.capacity < n {
            let missing = n - self.capacity;
            self.grow_by((missing / self.block_size + 1) * self.block_size);
        }
    }

    /// Whether `block` lies on an element boundary inside one of our chunks.
    pub fn owns(&self, block: NonNull<u8>) -> bool {
        self.chunks.iter().any(|chunk| {
            chunk.contains(block)
                && (block.as_ptr() as usize - chunk.mem.as_ptr() as usize) % self.el_size == 0
        })
    }

    pub fn element_size(&self) -> usize {
        self.el_size
    }

    pub fn alignment(&self) -> usize {
        self.align
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn instantiations(&self) -> usize {
        self.instantiations
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn config(&self) -> PoolConfig {
        PoolConfig {
            initial_block_size: self.initial_block_size,
            growth_factor: self.growth_factor,
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            element_size: self.el_size,
            block_size: self.block_size,
            instantiations: self.instantiations,
            total: self.total,
            capacity: self.capacity,
            grows: self.grows,
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the configuration only; the clone starts empty.
impl Clone for Pool {
    fn clone(&self) -> Self {
        Self::raw(self.el_size, self.align, self.config(), self.initialized)
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if self.instantiations > 0 {
            log::warn!(
                "pool of {}-byte elements dropped with {} live blocks",
                self.el_size,
                self.instantiations
            );
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("stats", &self.stats())
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

/// Owning pointer to a `T` stored in a pool block.
///
/// The box keeps its pool alive and hands the block back to exactly that pool
/// when dropped.
pub struct PoolBox<T> {
    ptr: NonNull<T>,
    pool: SharedPool,
    _marker: PhantomData<T>,
}

impl<T> PoolBox<T> {
    /// Moves `value` into a block of `pool`.
    ///
    /// Panics if the pool's elements cannot hold a `T`.
    pub fn new_in(value: T, pool: &SharedPool) -> Self {
        let block = {
            let mut p = pool.borrow_mut();
            assert!(
                p.element_size() >= mem::size_of::<T>(),
                "pool element of {} bytes cannot hold {} bytes",
                p.element_size(),
                mem::size_of::<T>()
            );
            assert!(
                p.alignment() >= mem::align_of::<T>()
                    && p.element_size() % mem::align_of::<T>() == 0,
                "pool blocks are not aligned for this type"
            );
            p.alloc()
        };
        let ptr = block.cast::<T>();
        // SAFETY: the block is large enough and aligned for `T` (checked above).
        unsafe { ptr.as_ptr().write(value) };
        Self {
            ptr,
            pool: Rc::clone(pool),
            _marker: PhantomData,
        }
    }

    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    /// Moves the value out and releases the block.
    pub fn into_inner(this: Self) -> T {
        let this = ManuallyDrop::new(this);
        // SAFETY: `this` is never dropped, so value and pool handle are read exactly once.
        let value = unsafe { ptr::read(this.ptr.as_ptr()) };
        let pool = unsafe { ptr::read(&this.pool) };
        // SAFETY: the block came from `pool` and its value has been moved out.
        unsafe { pool.borrow_mut().free(this.ptr.cast()) };
        value
    }
}

impl<T> Drop for PoolBox<T> {
    fn drop(&mut self) {
        // The value is dropped before the pool is borrowed: it may own boxes
        // from the same pool.
        // SAFETY: the box owns a live `T` in a block of `self.pool`.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            self.pool.borrow_mut().free(self.ptr.cast());
        }
    }
}

impl<T> Deref for PoolBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the pointer stays valid for the lifetime of the box.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for PoolBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the box is the unique owner of the value.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T: Clone> Clone for PoolBox<T> {
    fn clone(&self) -> Self {
        Self::new_in((**self).clone(), &self.pool)
    }
}

impl<T: fmt::Debug> fmt::Debug for PoolBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for PoolBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(initial: usize, growth: usize) -> Pool {
        Pool::with_config(
            16,
            PoolConfig {
                initial_block_size: initial,
                growth_factor: growth,
            },
        )
    }

    #[test]
    fn element_size_never_below_link() {
        assert_eq!(Pool::with_config(1, PoolConfig::default()).element_size(), LINK_SIZE);
        assert_eq!(Pool::with_config(40, PoolConfig::default()).element_size(), 40);
        let mut pool = Pool::new();
        pool.init(3, 8, 2);
        assert_eq!(pool.element_size(), LINK_SIZE);
    }

    #[test]
    fn freed_block_is_reused_first() {
        let mut pool = small(4, 1);
        let a = pool.alloc();
        let _b = pool.alloc();
        unsafe { pool.free(a) };
        assert_eq!(pool.alloc(), a);
        assert_eq!(pool.stats().grows, 1);
    }

    #[test]
    fn geometric_growth_scales_block_size() {
        let mut pool = small(2, 2);
        for _ in 0..2 {
            pool.alloc();
        }
        assert_eq!(pool.total(), 2);
        pool.alloc();
        assert_eq!(pool.total(), 6);
        assert_eq!(pool.block_size(), 8);
    }

    #[test]
    fn reserve_keeps_existing_free_blocks() {
        let mut pool = small(4, 1);
        let a = pool.alloc();
        unsafe { pool.free(a) };
        assert_eq!(pool.capacity(), 4);
        pool.reserve(10);
        assert!(pool.capacity() >= 10);
        assert_eq!(pool.capacity(), pool.total());
    }

    #[test]
    #[should_panic(expected = "outstanding")]
    fn init_with_live_blocks_panics() {
        let mut pool = small(4, 1);
        let _a = pool.alloc();
        pool.init(32, 4, 1);
    }

    #[test]
    #[should_panic(expected = "growth factor")]
    fn zero_growth_factor_panics() {
        let _ = small(4, 0);
    }

    #[test]
    fn clone_copies_configuration_only() {
        let mut pool = small(4, 3);
        pool.alloc();
        let copy = pool.clone();
        assert_eq!(copy.element_size(), 16);
        assert_eq!(copy.config(), pool.config());
        assert_eq!(copy.total(), 0);
        assert_eq!(copy.instantiations(), 0);
    }

    #[test]
    fn pool_box_returns_block_on_drop() {
        let pool: SharedPool = Rc::new(RefCell::new(Pool::for_type::<(u64, u64)>(PoolConfig {
            initial_block_size: 2,
            growth_factor: 1,
        })));
        let a = PoolBox::new_in((1u64, 2u64), &pool);
        let b = a.clone();
        assert_eq!(pool.borrow().instantiations(), 2);
        assert_eq!(*b, (1, 2));
        drop(a);
        assert_eq!(PoolBox::into_inner(b), (1, 2));
        assert_eq!(pool.borrow().instantiations(), 0);
    }

    #[test]
    fn nested_boxes_from_same_pool_drop_cleanly() {
        struct Node(Option<PoolBox<Node>>);
        let pool: SharedPool = Rc::new(RefCell::new(Pool::for_type::<Node>(PoolConfig::default())));
        let leaf = PoolBox::new_in(Node(None), &pool);
        let root = PoolBox::new_in(Node(Some(leaf)), &pool);
        assert!(root.0.is_some());
        assert_eq!(pool.borrow().instantiations(), 2);
        drop(root);
        assert_eq!(pool.borrow().instantiations(), 0);
    }
}
