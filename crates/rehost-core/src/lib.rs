//! # rehost-core
//!
//! Safe Rust implementations of the semantics behind the rehost runtime.
//!
//! Everything here works on slices and owned values: byte and wide string
//! primitives, the format tokenizer, printf renderer and scanf parser,
//! variadic argument lists, the pthread shim, the errno table, character
//! classes and calendar arithmetic. The ABI crate resolves opaque
//! addresses to slices and calls into these modules.

#![deny(unsafe_code)]

pub mod ctype;
pub mod errno;
pub mod pthread;
pub mod stdarg;
pub mod stdio;
pub mod stdlib;
pub mod string;
pub mod time;
