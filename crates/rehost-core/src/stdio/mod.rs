//! Standard I/O engines.
//!
//! Format tokenizing, printf rendering, scanf parsing and fopen modes.
//! Streams themselves live in the ABI layer, which owns the file table.

pub mod format;
pub mod mode;
pub mod printf;
pub mod scanf;

pub use format::{FormatWord, parse_format};
pub use mode::{OpenFlags, parse_mode};
pub use printf::{FormatError, FormatSpec, format};
pub use scanf::{Commit, ScanError, SpaceReader, scan};
