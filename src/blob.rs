//! Streaming access to large binary objects, for backends that expose a driver-native LOB
//! handle rather than materializing the whole value into a [`crate::types::StockValue::Blob`]
//! up front.

use crate::backend::BlobBackend;
use crate::Error;

/// A handle to one LOB value, borrowed from a fetched row or a bound parameter. Thin
/// wrapper over the backend's [`BlobBackend`]; every method forwards directly.
pub struct Lob<H: BlobBackend> {
    handle: H,
}

impl<H: BlobBackend> Lob<H> {
    pub fn new(handle: H) -> Self {
        Lob { handle }
    }

    pub fn len(&mut self) -> Result<u64, Error> {
        self.handle.len()
    }

    pub fn is_empty(&mut self) -> Result<bool, Error> {
        self.handle.is_empty()
    }

    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Error> {
        self.handle.read_at(offset, buf)
    }

    pub fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize, Error> {
        self.handle.write_at(offset, buf)
    }

    pub fn append(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.handle.append(buf)
    }

    pub fn trim(&mut self, new_len: u64) -> Result<(), Error> {
        self.handle.trim(new_len)
    }
}
