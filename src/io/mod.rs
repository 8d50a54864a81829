//! Byte stream adaptation.
//!
//! Tile producers hand over whatever reader they have. [`ReadBuffer`] lets
//! the rest of the crate treat those readers as seekable without paying for
//! buffering until something actually needs random access.

mod read_buffer;

pub use read_buffer::ReadBuffer;
