//! Per-type value pools.
//!
//! Every datum is allocated from the pool of its type. The pools belong to a
//! registry that is installed per thread when an interpreter is created and
//! lazily with the default configuration otherwise.

use std::cell::RefCell;
use std::rc::Rc;

use sli_core::{Pool, PoolBox, PoolConfig, PoolStats, SharedPool};

use super::types::TypeTag;
use super::value::Datum;

thread_local! {
    static REGISTRY: RefCell<Option<PoolRegistry>> = const { RefCell::new(None) };
}

pub struct PoolRegistry {
    pools: Vec<SharedPool>,
}

impl PoolRegistry {
    pub fn new(config: PoolConfig) -> Self {
        let pools = TypeTag::ALL
            .iter()
            .map(|_| Rc::new(RefCell::new(Pool::for_type::<Datum>(config))))
            .collect();
        Self { pools }
    }

    /// Replaces the registry of the current thread.
    ///
    /// Tokens allocated before keep their old pools alive until they are dropped.
    pub fn install(config: PoolConfig) {
        log::debug!(
            "installing value pools: initial block {}, growth {}",
            config.initial_block_size,
            config.growth_factor
        );
        REGISTRY.with(|r| *r.borrow_mut() = Some(PoolRegistry::new(config)));
    }

    /// Drops the registry of the current thread.
    pub fn teardown() {
        let old = REGISTRY.with(|r| r.borrow_mut().take());
        drop(old);
    }

    pub fn is_installed() -> bool {
        REGISTRY.with(|r| r.borrow().is_some())
    }

    /// Pool serving values of type `tag`.
    pub fn pool(tag: TypeTag) -> SharedPool {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            let registry = r.get_or_insert_with(|| PoolRegistry::new(PoolConfig::default()));
            Rc::clone(&registry.pools[tag.index()])
        })
    }

    pub fn stats(tag: TypeTag) -> PoolStats {
        Self::pool(tag).borrow().stats()
    }

    /// Makes room for `n` more values of type `tag` without growing.
    pub fn reserve(tag: TypeTag, n: usize) {
        Self::pool(tag).borrow_mut().reserve(n);
    }

    pub(crate) fn alloc(datum: Datum) -> PoolBox<Datum> {
        let pool = Self::pool(datum.tag());
        PoolBox::new_in(datum, &pool)
    }
}
