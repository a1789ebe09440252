//! Binary buffer and cursor primitives.
//!
//! All file-format decoders in the application are built on these: a
//! [`Buffer`] owns a contiguous byte region, and cursors give bounded,
//! endianness-aware scalar access over it. Loading raw bytes (filesystem,
//! network) is a collaborator's job; this module starts from materialized
//! bytes.

pub mod buffer;
pub mod cursor;

pub use buffer::Buffer;
pub use cursor::{Cursor, CursorError, CursorMut, Endianness};
