//! ## allot-core::alloc::default
//! **Process-wide default allocator**
//!
//! Consulted whenever an allocator-aware object is built without an explicit
//! allocator. Falls back to [`NewDeleteAllocator::singleton`] until another
//! allocator is installed. Once locked, [`set_default_allocator`] refuses to
//! change it; [`DefaultAllocatorGuard`] still may, for scoped test isolation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use tracing::{error, info};

use super::new_delete::NewDeleteAllocator;
use super::resource::Allocator;
use crate::error::{Error, Result};

static DEFAULT: RwLock<Option<&'static dyn Allocator>> = parking_lot::const_rwlock(None);
static LOCKED: AtomicBool = AtomicBool::new(false);

/// Serialises guards across threads; re-entrant so guards nest on one thread.
static GUARD_SERIAL: ReentrantMutex<()> = parking_lot::const_reentrant_mutex(());

/// Number of live guards; only touched while `GUARD_SERIAL` is held.
static GUARD_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Returns the allocator currently in effect.
pub fn default_allocator() -> &'static dyn Allocator {
    match *DEFAULT.read() {
        Some(alloc) => alloc,
        None => NewDeleteAllocator::singleton(),
    }
}

/// Installs `alloc` as the default allocator.
///
/// Fails with [`Error::DefaultAllocatorLocked`] after
/// [`lock_default_allocator`] has been called.
pub fn set_default_allocator(alloc: &'static dyn Allocator) -> Result<()> {
    if LOCKED.load(Ordering::Acquire) {
        return Err(Error::DefaultAllocatorLocked);
    }
    *DEFAULT.write() = Some(alloc);
    info!(allocator = alloc.name(), "default allocator installed");
    Ok(())
}

/// Prevents further calls to [`set_default_allocator`] from succeeding.
pub fn lock_default_allocator() {
    LOCKED.store(true, Ordering::Release);
    info!("default allocator locked");
}

pub fn is_default_allocator_locked() -> bool {
    LOCKED.load(Ordering::Acquire)
}

/// Clears the lock so one test's lock does not leak into the rest of the
/// test binary.
#[cfg(test)]
pub(crate) fn unlock_default_allocator() {
    LOCKED.store(false, Ordering::Release);
}

/// Installs an allocator as the default for the guard's lifetime and
/// restores the previous one on drop.
///
/// Installation bypasses the lock. Guards on different threads exclude each
/// other for their whole lifetime, so a test holding a guard is the only
/// code changing the default while it runs.
///
/// Nested guards must be dropped in reverse order of creation. A guard
/// dropped while a guard created after it is still alive restores its own
/// predecessor anyway, then panics (unless already unwinding).
#[must_use = "the previous default allocator is restored when the guard is dropped"]
pub struct DefaultAllocatorGuard {
    depth: usize,
    previous: Option<&'static dyn Allocator>,
    _serial: ReentrantMutexGuard<'static, ()>,
}

impl DefaultAllocatorGuard {
    pub fn new(alloc: &'static dyn Allocator) -> Self {
        let serial = GUARD_SERIAL.lock();
        let previous = DEFAULT.write().replace(alloc);
        let depth = GUARD_DEPTH.fetch_add(1, Ordering::AcqRel) + 1;
        info!(allocator = alloc.name(), depth, "default allocator guard installed");
        Self {
            depth,
            previous,
            _serial: serial,
        }
    }
}

impl Drop for DefaultAllocatorGuard {
    fn drop(&mut self) {
        *DEFAULT.write() = self.previous;
        let innermost = GUARD_DEPTH.swap(self.depth - 1, Ordering::AcqRel);
        if innermost != self.depth {
            error!(
                depth = self.depth,
                innermost, "default allocator guard dropped out of nesting order"
            );
            if !std::thread::panicking() {
                panic!("default allocator guard dropped out of nesting order");
            }
        }
        info!("default allocator guard restored previous allocator");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::{allocator_eq, TestAllocator};
    use std::panic::{self, AssertUnwindSafe};
    use tracing_test::traced_test;

    fn leaked(name: &str) -> &'static TestAllocator {
        Box::leak(Box::new(TestAllocator::new(name)))
    }

    #[test]
    fn guard_installs_and_restores() {
        let da = leaked("guarded");
        let before = {
            let _serial = GUARD_SERIAL.lock();
            default_allocator()
        };
        {
            let _guard = DefaultAllocatorGuard::new(da);
            assert!(allocator_eq(default_allocator(), da));
        }
        let _serial = GUARD_SERIAL.lock();
        assert!(allocator_eq(default_allocator(), before));
    }

    #[traced_test]
    #[test]
    fn set_then_lock() {
        let first = leaked("first");
        let second = leaked("second");

        // Hold a guard so the change is undone for every other test.
        let _guard = DefaultAllocatorGuard::new(NewDeleteAllocator::singleton());

        set_default_allocator(first).unwrap();
        assert!(allocator_eq(default_allocator(), first));
        assert!(logs_contain("default allocator installed"));

        lock_default_allocator();
        assert!(is_default_allocator_locked());
        assert_eq!(
            set_default_allocator(second),
            Err(Error::DefaultAllocatorLocked)
        );
        assert!(allocator_eq(default_allocator(), first));

        // Guards still work once locked.
        let inner = DefaultAllocatorGuard::new(second);
        assert!(allocator_eq(default_allocator(), second));
        drop(inner);
        assert!(allocator_eq(default_allocator(), first));

        unlock_default_allocator();
        assert!(!is_default_allocator_locked());
        set_default_allocator(second).unwrap();
        assert!(allocator_eq(default_allocator(), second));
    }

    #[test]
    fn out_of_order_drop_panics_and_restores() {
        let before = {
            let _serial = GUARD_SERIAL.lock();
            default_allocator()
        };
        let first = leaked("first");
        let second = leaked("second");

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _outer = DefaultAllocatorGuard::new(NewDeleteAllocator::singleton());
            let first = DefaultAllocatorGuard::new(first);
            let _second = DefaultAllocatorGuard::new(second);
            drop(first);
        }));
        assert!(result.is_err());

        let _serial = GUARD_SERIAL.lock();
        assert!(allocator_eq(default_allocator(), before));
    }
}
