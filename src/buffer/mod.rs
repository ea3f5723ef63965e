//! Internal buffer management.
//!
//! A thread-local pool hands out read buffers so repeated fragment and
//! reassembly runs on one thread do not reallocate. Not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
