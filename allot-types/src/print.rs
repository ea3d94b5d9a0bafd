//! ## allot-types::print
//! **Structured value printing**
//!
//! Values print as a bracketed attribute list:
//!
//! ```text
//! [
//!     name = value
//! ]
//! ```
//!
//! `level` is the nesting depth and `spaces_per_level` the indentation width.
//! A negative `level` suppresses the indentation of the opening bracket only
//! (its magnitude still drives the rest). A negative `spaces_per_level`
//! prints everything on one line separated by single spaces.

use std::fmt::{self, Write};

/// Widest indentation ever written, whatever the level.
pub const MAX_INDENT: usize = 1024;

/// Writes `|level| * |spaces_per_level|` spaces, at most [`MAX_INDENT`].
pub fn indent(out: &mut dyn Write, level: i32, spaces_per_level: i32) -> fmt::Result {
    write_indent(out, level.unsigned_abs(), spaces_per_level)
}

fn write_indent(out: &mut dyn Write, levels: u32, spaces_per_level: i32) -> fmt::Result {
    let width = (levels as usize)
        .checked_mul(spaces_per_level.unsigned_abs() as usize)
        .map_or(MAX_INDENT, |width| width.min(MAX_INDENT));
    write!(out, "{:width$}", "", width = width)
}

/// Writes a bracketed attribute list one attribute at a time.
pub struct Printer<'w> {
    out: &'w mut dyn Write,
    level: u32,
    spaces_per_level: i32,
    suppress_initial_indent: bool,
}

impl<'w> Printer<'w> {
    pub fn new(out: &'w mut dyn Write, level: i32, spaces_per_level: i32) -> Self {
        Self {
            out,
            level: level.unsigned_abs(),
            spaces_per_level,
            suppress_initial_indent: level < 0,
        }
    }

    #[inline]
    fn multi_line(&self) -> bool {
        self.spaces_per_level >= 0
    }

    fn separator(&mut self) -> fmt::Result {
        if self.multi_line() {
            self.out.write_char('\n')
        } else {
            self.out.write_char(' ')
        }
    }

    pub fn start(&mut self) -> fmt::Result {
        if !self.suppress_initial_indent {
            write_indent(self.out, self.level, self.spaces_per_level)?;
        }
        self.out.write_char('[')?;
        self.separator()
    }

    pub fn attribute(&mut self, name: &str, value: &dyn fmt::Display) -> fmt::Result {
        if self.multi_line() {
            write_indent(self.out, self.level.saturating_add(1), self.spaces_per_level)?;
        }
        write!(self.out, "{} = {}", name, value)?;
        self.separator()
    }

    pub fn end(&mut self) -> fmt::Result {
        if self.multi_line() {
            write_indent(self.out, self.level, self.spaces_per_level)?;
            self.out.write_str("]\n")
        } else {
            self.out.write_char(']')
        }
    }
}

/// Displays a string surrounded by double quotes.
pub struct Quoted<'s>(pub &'s str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}
