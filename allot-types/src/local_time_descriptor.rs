//! ## allot-types::local_time_descriptor
//! **Local time attributes for a time zone**
//!
//! A [`LocalTimeDescriptor`] holds the offset from UTC, whether daylight
//! saving time is in effect, and a free-form description such as `"EDT"`.
//! The description lives in memory obtained from the allocator captured at
//! construction; short descriptions fit inline and never allocate.

use std::fmt;
use std::mem;

use serde::Serialize;

use allot_core::alloc::{allocator_eq, Allocator, AllocatorHandle};
use allot_core::aware::AllocatorAware;
use allot_core::string::AllocString;
use allot_core::{Error, Result};

use crate::print::{Printer, Quoted};

/// Smallest valid UTC offset, in seconds.
pub const UTC_OFFSET_MIN: i32 = -86_399;
/// Largest valid UTC offset, in seconds.
pub const UTC_OFFSET_MAX: i32 = 86_399;

#[derive(Serialize)]
pub struct LocalTimeDescriptor<'a> {
    utc_offset_in_seconds: i32,
    dst_in_effect_flag: bool,
    description: AllocString<'a>,
}

impl<'a> LocalTimeDescriptor<'a> {
    /// `(0, false, "")` using `alloc`, or the default allocator when the
    /// handle is empty.
    pub fn new_in(alloc: impl Into<AllocatorHandle<'a>>) -> Self {
        Self {
            utc_offset_in_seconds: 0,
            dst_in_effect_flag: false,
            description: AllocString::new_in(alloc),
        }
    }

    pub fn try_new_in(
        utc_offset_in_seconds: i32,
        dst_in_effect_flag: bool,
        description: &str,
        alloc: impl Into<AllocatorHandle<'a>>,
    ) -> Result<Self> {
        check_offset(utc_offset_in_seconds)?;
        Ok(Self {
            utc_offset_in_seconds,
            dst_in_effect_flag,
            description: AllocString::try_from_str_in(description, alloc)?,
        })
    }

    /// Like [`Self::try_new_in`] with the default allocator.
    pub fn try_new(
        utc_offset_in_seconds: i32,
        dst_in_effect_flag: bool,
        description: &str,
    ) -> Result<Self> {
        Self::try_new_in(
            utc_offset_in_seconds,
            dst_in_effect_flag,
            description,
            AllocatorHandle::use_default(),
        )
    }

    #[inline]
    pub fn is_valid_utc_offset_in_seconds(value: i32) -> bool {
        (UTC_OFFSET_MIN..=UTC_OFFSET_MAX).contains(&value)
    }

    #[inline]
    pub fn utc_offset_in_seconds(&self) -> i32 {
        self.utc_offset_in_seconds
    }

    #[inline]
    pub fn dst_in_effect_flag(&self) -> bool {
        self.dst_in_effect_flag
    }

    #[inline]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    #[inline]
    pub fn allocator(&self) -> &'a dyn Allocator {
        self.description.allocator()
    }

    pub fn set_utc_offset_in_seconds(&mut self, value: i32) -> Result<()> {
        check_offset(value)?;
        self.utc_offset_in_seconds = value;
        Ok(())
    }

    #[inline]
    pub fn set_dst_in_effect_flag(&mut self, value: bool) {
        self.dst_in_effect_flag = value;
    }

    /// On allocation failure the description is unchanged.
    pub fn set_description(&mut self, value: &str) -> Result<()> {
        self.description.assign(value)
    }

    /// Exchanges values with `other` without allocating.
    ///
    /// # Panics
    ///
    /// If the two descriptors use different allocators.
    pub fn swap(&mut self, other: &mut Self) {
        assert!(
            allocator_eq(self.allocator(), other.allocator()),
            "swap requires both descriptors to use the same allocator"
        );
        mem::swap(&mut self.utc_offset_in_seconds, &mut other.utc_offset_in_seconds);
        mem::swap(&mut self.dst_in_effect_flag, &mut other.dst_in_effect_flag);
        self.description.swap_same_allocator(&mut other.description);
    }

    /// Writes the attributes to `out` at nesting `level` with
    /// `spaces_per_level` indentation (see [`crate::print`]).
    pub fn print(&self, out: &mut dyn fmt::Write, level: i32, spaces_per_level: i32) -> fmt::Result {
        let mut printer = Printer::new(out, level, spaces_per_level);
        printer.start()?;
        printer.attribute("utcOffsetInSeconds", &self.utc_offset_in_seconds)?;
        printer.attribute("dstInEffectFlag", &self.dst_in_effect_flag)?;
        printer.attribute("description", &Quoted(self.description()))?;
        printer.end()
    }
}

fn check_offset(value: i32) -> Result<()> {
    if LocalTimeDescriptor::is_valid_utc_offset_in_seconds(value) {
        Ok(())
    } else {
        Err(Error::InvalidValue {
            what: "utc_offset_in_seconds",
            value: i64::from(value),
        })
    }
}

impl<'a> AllocatorAware<'a> for LocalTimeDescriptor<'a> {
    fn allocator(&self) -> &'a dyn Allocator {
        LocalTimeDescriptor::allocator(self)
    }

    fn default_in(alloc: AllocatorHandle<'a>) -> Self {
        Self::new_in(alloc)
    }

    fn try_clone_in(&self, alloc: AllocatorHandle<'a>) -> Result<Self> {
        Ok(Self {
            utc_offset_in_seconds: self.utc_offset_in_seconds,
            dst_in_effect_flag: self.dst_in_effect_flag,
            description: self.description.try_clone_in(alloc)?,
        })
    }

    fn take(&mut self) -> Self {
        Self {
            utc_offset_in_seconds: mem::take(&mut self.utc_offset_in_seconds),
            dst_in_effect_flag: mem::take(&mut self.dst_in_effect_flag),
            description: self.description.take(),
        }
    }

    fn assign(&mut self, rhs: &Self) -> Result<()> {
        // The description is the only fallible part; update it first so a
        // failure leaves every attribute unchanged.
        self.description.assign(rhs.description())?;
        self.utc_offset_in_seconds = rhs.utc_offset_in_seconds;
        self.dst_in_effect_flag = rhs.dst_in_effect_flag;
        Ok(())
    }

    fn swap_same_allocator(&mut self, other: &mut Self) {
        LocalTimeDescriptor::swap(self, other)
    }
}

impl Default for LocalTimeDescriptor<'_> {
    fn default() -> Self {
        Self::new_in(AllocatorHandle::use_default())
    }
}

impl Clone for LocalTimeDescriptor<'_> {
    /// Copies into the *default* allocator.
    ///
    /// # Panics
    ///
    /// If the default allocator cannot supply the description; use
    /// [`AllocatorAware::try_clone_in`] to handle that case.
    fn clone(&self) -> Self {
        match self.try_clone_in(AllocatorHandle::use_default()) {
            Ok(copy) => copy,
            Err(err) => panic!("LocalTimeDescriptor clone failed: {err}"),
        }
    }

    /// Copy assignment; `self` keeps its allocator.
    ///
    /// # Panics
    ///
    /// On allocation failure, after which `self` is unchanged.
    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign(source) {
            panic!("LocalTimeDescriptor assignment failed: {err}");
        }
    }
}

impl PartialEq for LocalTimeDescriptor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.utc_offset_in_seconds == other.utc_offset_in_seconds
            && self.dst_in_effect_flag == other.dst_in_effect_flag
            && self.description == other.description
    }
}

impl Eq for LocalTimeDescriptor<'_> {}

impl fmt::Debug for LocalTimeDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTimeDescriptor")
            .field("utc_offset_in_seconds", &self.utc_offset_in_seconds)
            .field("dst_in_effect_flag", &self.dst_in_effect_flag)
            .field("description", &self.description())
            .finish()
    }
}

/// The compact form: values only, e.g. `[ -14400 true "EDT" ]`.
impl fmt::Display for LocalTimeDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ {} {} {} ]",
            self.utc_offset_in_seconds,
            self.dst_in_effect_flag,
            Quoted(self.description())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allot_core::alloc::{DefaultAllocatorGuard, TestAllocator};

    const LONG: &str = "Eastern Daylight Time (New York)";

    fn leaked(name: &str) -> &'static TestAllocator {
        Box::leak(Box::new(TestAllocator::new(name)))
    }

    fn printed(value: &LocalTimeDescriptor<'_>, level: i32, spl: i32) -> String {
        let mut out = String::new();
        value.print(&mut out, level, spl).unwrap();
        out
    }

    #[test]
    fn explicit_construction_and_copy_to_another_allocator() {
        let a = TestAllocator::new("a");
        let b = TestAllocator::new("b");
        let v1 = LocalTimeDescriptor::try_new_in(-14_400, true, "EDT", &a).unwrap();
        assert_eq!(v1.utc_offset_in_seconds(), -14_400);
        assert!(v1.dst_in_effect_flag());
        assert_eq!(v1.description(), "EDT");

        let copy = v1.try_clone_in(AllocatorHandle::from(&b)).unwrap();
        assert_eq!(copy, v1);
        assert!(!allocator_eq(copy.allocator(), v1.allocator()));
        assert!(allocator_eq(copy.allocator(), &b));
    }

    #[test]
    fn default_value() {
        let da = leaked("default");
        let mut v2 = {
            let _guard = DefaultAllocatorGuard::new(da);
            LocalTimeDescriptor::default()
        };
        assert_eq!(v2.description(), "");
        assert_eq!(v2.utc_offset_in_seconds(), 0);
        assert!(!v2.dst_in_effect_flag());
        assert_eq!(da.num_allocations(), 0);

        // The default is captured at construction; a later default is not
        // consulted again.
        let db = leaked("later-default");
        let _guard = DefaultAllocatorGuard::new(db);
        assert!(allocator_eq(v2.allocator(), da));
        v2.set_description(LONG).unwrap();
        assert_eq!(da.num_blocks_in_use(), 1);
        assert_eq!(db.num_allocations(), 0);
    }

    #[test]
    fn offset_range_is_enforced() {
        let ta = TestAllocator::new("range");
        assert!(LocalTimeDescriptor::is_valid_utc_offset_in_seconds(UTC_OFFSET_MIN));
        assert!(LocalTimeDescriptor::is_valid_utc_offset_in_seconds(UTC_OFFSET_MAX));
        assert!(!LocalTimeDescriptor::is_valid_utc_offset_in_seconds(UTC_OFFSET_MAX + 1));
        assert!(!LocalTimeDescriptor::is_valid_utc_offset_in_seconds(i32::MIN));

        let err = LocalTimeDescriptor::try_new_in(86_400, false, "", &ta).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { what: "utc_offset_in_seconds", .. }));

        let mut v = LocalTimeDescriptor::new_in(&ta);
        v.set_utc_offset_in_seconds(3_600).unwrap();
        assert!(v.set_utc_offset_in_seconds(-86_400).is_err());
        assert_eq!(v.utc_offset_in_seconds(), 3_600);
    }

    #[test]
    fn long_description_comes_from_the_captured_allocator() {
        let ta = TestAllocator::new("desc");
        let mut v = LocalTimeDescriptor::new_in(&ta);
        v.set_description("CET").unwrap();
        assert_eq!(ta.num_blocks_in_use(), 0);
        v.set_description(LONG).unwrap();
        assert_eq!(ta.num_blocks_in_use(), 1);
        drop(v);
        assert_eq!(ta.num_blocks_in_use(), 0);
    }

    #[test]
    fn failed_set_description_keeps_value() {
        let ta = TestAllocator::new("fail");
        let mut v = LocalTimeDescriptor::try_new_in(7_200, true, "CEST", &ta).unwrap();
        ta.set_allocation_limit(Some(0));
        assert!(v.set_description(LONG).unwrap_err().is_allocation_failure());
        assert_eq!(v.description(), "CEST");
    }

    #[test]
    fn clone_uses_default_allocator_and_clone_from_keeps_target() {
        let da = leaked("clone-default");
        let _guard = DefaultAllocatorGuard::new(da);
        let ta = TestAllocator::new("source");
        let src = LocalTimeDescriptor::try_new_in(-18_000, false, LONG, &ta).unwrap();

        let copy = src.clone();
        assert_eq!(copy, src);
        assert!(allocator_eq(copy.allocator(), da));

        let other = TestAllocator::new("target");
        let mut target = LocalTimeDescriptor::new_in(&other);
        target.clone_from(&src);
        assert_eq!(target, src);
        assert!(allocator_eq(target.allocator(), &other));
    }

    #[test]
    fn failed_assign_leaves_target_unchanged() {
        let ta = TestAllocator::new("assign");
        let src = LocalTimeDescriptor::try_new_in(3_600, true, LONG, &ta).unwrap();
        let mut target = LocalTimeDescriptor::try_new_in(-60, false, "x", &ta).unwrap();
        ta.set_allocation_limit(Some(0));
        assert!(target.assign(&src).is_err());
        assert_eq!(target.utc_offset_in_seconds(), -60);
        assert!(!target.dst_in_effect_flag());
        assert_eq!(target.description(), "x");
    }

    #[test]
    fn take_leaves_default_and_keeps_allocator() {
        let ta = TestAllocator::new("take");
        let mut src = LocalTimeDescriptor::try_new_in(3_600, true, LONG, &ta).unwrap();
        let allocations = ta.num_allocations();
        let moved = AllocatorAware::take(&mut src);
        assert_eq!(ta.num_allocations(), allocations);
        assert_eq!(moved.description(), LONG);
        assert_eq!(src, LocalTimeDescriptor::new_in(&ta));
        assert!(allocator_eq(moved.allocator(), &ta));
    }

    #[test]
    fn member_swap_exchanges_everything() {
        let ta = TestAllocator::new("swap");
        let mut x = LocalTimeDescriptor::try_new_in(1, true, LONG, &ta).unwrap();
        let mut y = LocalTimeDescriptor::try_new_in(2, false, "y", &ta).unwrap();
        let allocations = ta.num_allocations();
        x.swap(&mut y);
        assert_eq!(ta.num_allocations(), allocations);
        assert_eq!((x.utc_offset_in_seconds(), x.description()), (2, "y"));
        assert_eq!((y.utc_offset_in_seconds(), y.description()), (1, LONG));
    }

    #[test]
    #[should_panic(expected = "same allocator")]
    fn member_swap_across_allocators_panics() {
        let a = TestAllocator::new("a");
        let b = TestAllocator::new("b");
        let mut x = LocalTimeDescriptor::new_in(&a);
        let mut y = LocalTimeDescriptor::new_in(&b);
        x.swap(&mut y);
    }

    #[test]
    fn free_swap_across_allocators_keeps_allocators() {
        let a = TestAllocator::new("a");
        let b = TestAllocator::new("b");
        let mut x = LocalTimeDescriptor::try_new_in(1, true, LONG, &a).unwrap();
        let mut y = LocalTimeDescriptor::try_new_in(2, false, "y", &b).unwrap();
        allot_core::aware::swap(&mut x, &mut y).unwrap();
        assert_eq!(x.description(), "y");
        assert_eq!(y.description(), LONG);
        assert!(allocator_eq(x.allocator(), &a));
        assert!(allocator_eq(y.allocator(), &b));
    }

    #[test]
    fn print_formats() {
        let ta = TestAllocator::new("print");
        let v = LocalTimeDescriptor::try_new_in(89, true, "a", &ta).unwrap();

        assert_eq!(
            printed(&v, 0, 0),
            "[\nutcOffsetInSeconds = 89\ndstInEffectFlag = true\ndescription = \"a\"\n]\n"
        );
        assert_eq!(
            printed(&v, 0, -1),
            "[ utcOffsetInSeconds = 89 dstInEffectFlag = true description = \"a\" ]"
        );
        assert_eq!(
            printed(&v, 3, 2),
            "      [\n        utcOffsetInSeconds = 89\n        dstInEffectFlag = true\n        description = \"a\"\n      ]\n"
        );
        assert_eq!(
            printed(&v, -3, 2),
            "[\n        utcOffsetInSeconds = 89\n        dstInEffectFlag = true\n        description = \"a\"\n      ]\n"
        );
        assert_eq!(
            printed(&v, 3, -2),
            "      [ utcOffsetInSeconds = 89 dstInEffectFlag = true description = \"a\" ]"
        );
        assert_eq!(
            printed(&v, -3, -2),
            "[ utcOffsetInSeconds = 89 dstInEffectFlag = true description = \"a\" ]"
        );
    }

    #[test]
    fn display_prints_values_only() {
        let ta = TestAllocator::new("display");
        let a = LocalTimeDescriptor::try_new_in(89, true, "a", &ta).unwrap();
        let bc = LocalTimeDescriptor::try_new_in(7, false, "bc", &ta).unwrap();
        assert_eq!(a.to_string(), "[ 89 true \"a\" ]");
        assert_eq!(bc.to_string(), "[ 7 false \"bc\" ]");
        assert_eq!(format!("{}", LocalTimeDescriptor::new_in(&ta)), "[ 0 false \"\" ]");
    }

    #[test]
    fn print_with_extreme_levels_does_not_overflow() {
        let ta = TestAllocator::new("extreme");
        let v = LocalTimeDescriptor::try_new_in(89, true, "a", &ta).unwrap();
        assert_eq!(printed(&v, i32::MIN, 0), printed(&v, 0, 0));
        assert_eq!(printed(&v, i32::MIN, -1), printed(&v, 0, -1));
        let out = printed(&v, i32::MAX, 2);
        assert!(out.trim_start().starts_with('['));
        assert!(out.ends_with("]\n"));
    }

    #[test]
    fn serializes_salient_attributes() {
        let ta = TestAllocator::new("serde");
        let v = LocalTimeDescriptor::try_new_in(7_200, true, "CEST", &ta).unwrap();
        let yaml = serde_yaml::to_string(&v).unwrap();
        assert!(yaml.contains("utc_offset_in_seconds: 7200"));
        assert!(yaml.contains("dst_in_effect_flag: true"));
        assert!(yaml.contains("description: CEST"));
    }
}
