//! The optional allocator argument accepted by every allocator-aware
//! constructor.

use std::fmt;

use super::default::default_allocator;
use super::resource::Allocator;

/// Either a specific allocator or "whatever the process default is".
///
/// A default-constructed handle resolves to the default allocator *at the
/// moment [`resolve`](Self::resolve) is called*; constructors resolve exactly
/// once and keep the result.
#[derive(Clone, Copy, Default)]
pub struct AllocatorHandle<'a> {
    alloc: Option<&'a dyn Allocator>,
}

impl<'a> AllocatorHandle<'a> {
    #[inline]
    pub fn new(alloc: &'a dyn Allocator) -> Self {
        Self { alloc: Some(alloc) }
    }

    /// A handle meaning "use the process default".
    #[inline]
    pub fn use_default() -> Self {
        Self { alloc: None }
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.alloc.is_none()
    }

    #[inline]
    pub fn get(&self) -> Option<&'a dyn Allocator> {
        self.alloc
    }

    /// Returns the explicit allocator, or the currently installed default.
    #[inline]
    pub fn resolve(self) -> &'a dyn Allocator {
        match self.alloc {
            Some(alloc) => alloc,
            None => default_allocator(),
        }
    }
}

impl<'a, A: Allocator + 'a> From<&'a A> for AllocatorHandle<'a> {
    fn from(alloc: &'a A) -> Self {
        Self { alloc: Some(alloc) }
    }
}

impl<'a, 'b: 'a> From<&'a (dyn Allocator + 'b)> for AllocatorHandle<'a> {
    fn from(alloc: &'a (dyn Allocator + 'b)) -> Self {
        Self { alloc: Some(alloc) }
    }
}

impl<'a> From<Option<&'a dyn Allocator>> for AllocatorHandle<'a> {
    fn from(alloc: Option<&'a dyn Allocator>) -> Self {
        Self { alloc }
    }
}

impl fmt::Debug for AllocatorHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alloc {
            Some(alloc) => write!(
                f,
                "AllocatorHandle({}@{:p})",
                alloc.name(),
                alloc as *const dyn Allocator as *const ()
            ),
            None => f.write_str("AllocatorHandle(default)"),
        }
    }
}
