//! # rehost-abi
//!
//! Runtime entry points called by code translated from C.
//!
//! Every entry point takes opaque [`Ptr`](rehost_membrane::Ptr) addresses,
//! resolves them through the process [`AddressSpace`](rehost_membrane::AddressSpace)
//! and delegates to the safe implementations in `rehost-core`.
//!
//! # Failure classes
//!
//! - Usage errors (bad allocation size, realloc of an unknown address,
//!   format/argument mismatch) panic with the emulated function's name.
//! - Environment errors are stored in the error register ([`errno_abi`])
//!   and surface as `-1`, a null address or another sentinel.
//! - Functions that are declared but not emulated panic through
//!   `not_emulated!`.

#[macro_use]
mod macros;

pub mod assert_abi;
pub mod ctype_abi;
pub mod errno_abi;
pub mod file_abi;
pub mod fs;
pub mod glob_abi;
pub mod malloc_abi;
pub mod socket_abi;
pub mod startup_abi;
pub mod stdio_abi;
pub mod stdlib_abi;
pub mod string_abi;
pub mod time_abi;
pub mod unistd_abi;
pub mod wchar_abi;
