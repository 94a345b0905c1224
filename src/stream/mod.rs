//! Byte source and sink adapters used by the codec.
//!
//! Both wrap a caller-supplied `std::io` stream and track how many bytes have
//! passed through it, so decode errors can point at a stream offset.

pub mod reader;
pub mod writer;

pub use reader::ByteReader;
pub use writer::ByteWriter;
