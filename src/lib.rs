//! # classic BASIC
//!
//! An interpreter for the classic line-numbered dialect of BASIC:
//! immediate-mode editing, GOTO and GOSUB, FOR/NEXT, DATA/READ, DEF
//! functions, and sequential file channels.
//!
//! ```text
//! classic BASIC
//! READY.
//! ```
//!
//! The [`lang`] module tokenizes and parses source lines; the [`mach`]
//! module stores programs and executes them against an abstract console
//! and file system.

pub mod lang;
pub mod mach;
