// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Fixed-buffer primitives consumed by the wire codec.
//!
//! The [`WireReader`] and [`WireWriter`] types wrap borrowed buffers
//! and provide the cursor-based field access the codec modules are
//! built on. The reader additionally exposes its full backing slice,
//! which the name decoder needs to follow compression pointers to
//! earlier offsets of the same message.
//!
//! The [`BufferPool`] supplies the fixed 512-octet blocks used on the
//! UDP path. Blocks are checked out for the duration of one
//! receive/decode/encode/send cycle and returned to the pool when the
//! [`BufferGuard`] is dropped.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

////////////////////////////////////////////////////////////////////////
// WIRE READER                                                        //
////////////////////////////////////////////////////////////////////////

/// A cursor over a borrowed buffer for reading wire-format fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WireReader<'a> {
    octets: &'a [u8],
    cursor: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a `WireReader` positioned at the start of `octets`.
    pub fn new(octets: &'a [u8]) -> Self {
        Self { octets, cursor: 0 }
    }

    /// Returns the full backing slice, independent of the cursor.
    pub fn octets(&self) -> &'a [u8] {
        self.octets
    }

    /// Returns the current cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the number of octets left to read.
    pub fn remaining(&self) -> usize {
        self.octets.len() - self.cursor
    }

    /// Returns whether the cursor has reached the end of the buffer.
    pub fn at_end(&self) -> bool {
        self.cursor >= self.octets.len()
    }

    /// Advances the cursor by `n` octets without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        if self.remaining() < n {
            Err(Error::NotEnoughBytes)
        } else {
            self.cursor += n;
            Ok(())
        }
    }

    /// Reads `n` octets at the cursor.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < n {
            Err(Error::NotEnoughBytes)
        } else {
            let slice = &self.octets[self.cursor..self.cursor + n];
            self.cursor += n;
            Ok(slice)
        }
    }

    /// Reads a single octet at the cursor.
    pub fn take_u8(&mut self) -> Result<u8, Error> {
        self.take(1).map(|s| s[0])
    }

    /// Reads a network-byte-order `u16` at the cursor.
    pub fn take_u16(&mut self) -> Result<u16, Error> {
        self.take(2)
            .map(|s| u16::from_be_bytes(s.try_into().unwrap()))
    }

    /// Reads a network-byte-order `u32` at the cursor.
    pub fn take_u32(&mut self) -> Result<u32, Error> {
        self.take(4)
            .map(|s| u32::from_be_bytes(s.try_into().unwrap()))
    }

    /// Returns the octet at the cursor without consuming it.
    pub fn peek_u8(&self) -> Result<u8, Error> {
        self.octets
            .get(self.cursor)
            .copied()
            .ok_or(Error::NotEnoughBytes)
    }
}

////////////////////////////////////////////////////////////////////////
// WIRE WRITER                                                        //
////////////////////////////////////////////////////////////////////////

/// A cursor over a borrowed mutable buffer for writing wire-format
/// fields.
///
/// A `WireWriter` carries a limit in addition to the underlying buffer
/// length; writes past the limit fail with [`Error::Truncation`]. The
/// limit lets a caller serialize against a message size cap (for
/// example the 512-octet UDP maximum) smaller than the buffer itself.
pub struct WireWriter<'a> {
    octets: &'a mut [u8],
    cursor: usize,
    limit: usize,
}

impl<'a> WireWriter<'a> {
    /// Creates a `WireWriter` over `octets` with the given size limit.
    /// The limit is clamped to the buffer length.
    pub fn new(octets: &'a mut [u8], limit: usize) -> Self {
        let limit = limit.min(octets.len());
        Self {
            octets,
            cursor: 0,
            limit,
        }
    }

    /// Returns the current cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the number of octets that may still be written.
    pub fn remaining(&self) -> usize {
        self.limit - self.cursor
    }

    /// Moves the cursor back to `position`, discarding anything written
    /// after it. Panics if `position` is past the cursor.
    pub fn truncate_to(&mut self, position: usize) {
        assert!(position <= self.cursor);
        self.cursor = position;
    }

    /// Provides mutable access to the octets written so far. Used for
    /// in-place updates of fixed-position fields such as the message
    /// header.
    pub fn written_mut(&mut self) -> &mut [u8] {
        &mut self.octets[..self.cursor]
    }

    /// Provides access to the octets written so far.
    pub fn written(&self) -> &[u8] {
        &self.octets[..self.cursor]
    }

    /// Writes `octets` at the cursor.
    pub fn write(&mut self, octets: &[u8]) -> Result<(), Error> {
        if self.remaining() < octets.len() {
            Err(Error::Truncation)
        } else {
            self.octets[self.cursor..self.cursor + octets.len()].copy_from_slice(octets);
            self.cursor += octets.len();
            Ok(())
        }
    }

    /// Writes a single octet at the cursor.
    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.write(&[value])
    }

    /// Writes a network-byte-order `u16` at the cursor.
    pub fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        self.write(&value.to_be_bytes())
    }

    /// Writes a network-byte-order `u32` at the cursor.
    pub fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.write(&value.to_be_bytes())
    }

    /// Reserves `n` octets at the cursor, zeroing them, and returns
    /// their starting position for a later [`WireWriter::patch_u16`].
    pub fn reserve(&mut self, n: usize) -> Result<usize, Error> {
        let start = self.cursor;
        if self.remaining() < n {
            Err(Error::Truncation)
        } else {
            self.octets[start..start + n].fill(0);
            self.cursor += n;
            Ok(start)
        }
    }

    /// Overwrites a previously written (or reserved) `u16` at
    /// `position`. Panics if the field does not lie within the written
    /// region.
    pub fn patch_u16(&mut self, position: usize, value: u16) {
        assert!(position + 2 <= self.cursor);
        self.octets[position..position + 2].copy_from_slice(&value.to_be_bytes());
    }
}

impl fmt::Debug for WireWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WireWriter")
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// BUFFER POOL                                                        //
////////////////////////////////////////////////////////////////////////

/// The size of the fixed blocks handed out by the [`BufferPool`]. This
/// is the classic [RFC 1035 § 2.3.4] UDP message size limit.
///
/// [RFC 1035 § 2.3.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-2.3.4
pub const UDP_BUFFER_SIZE: usize = 512;

/// A pool of fixed [`UDP_BUFFER_SIZE`]-octet blocks.
///
/// Callers check a block out with [`BufferPool::acquire`] and get it
/// back as a [`BufferGuard`]; dropping the guard returns the block to
/// the pool. The pool grows on demand, so acquisition never blocks on
/// another caller.
pub struct BufferPool {
    free: Mutex<Vec<Box<[u8; UDP_BUFFER_SIZE]>>>,
}

impl BufferPool {
    /// Creates a pool preloaded with `initial` blocks.
    pub fn new(initial: usize) -> Self {
        let free = (0..initial)
            .map(|_| Box::new([0; UDP_BUFFER_SIZE]))
            .collect();
        Self {
            free: Mutex::new(free),
        }
    }

    /// Checks a block out of the pool, allocating a new one if the pool
    /// is empty.
    pub fn acquire(&self) -> BufferGuard {
        let block = self
            .free
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Box::new([0; UDP_BUFFER_SIZE]));
        BufferGuard {
            pool: self,
            block: Some(block),
        }
    }
}

/// A block checked out of a [`BufferPool`]. Dereferences to the
/// underlying octet array; the block is returned to the pool on drop.
pub struct BufferGuard<'a> {
    pool: &'a BufferPool,
    block: Option<Box<[u8; UDP_BUFFER_SIZE]>>,
}

impl Deref for BufferGuard<'_> {
    type Target = [u8; UDP_BUFFER_SIZE];

    fn deref(&self) -> &Self::Target {
        self.block.as_ref().unwrap()
    }
}

impl DerefMut for BufferGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.block.as_mut().unwrap()
    }
}

impl Drop for BufferGuard<'_> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            self.pool.free.lock().unwrap().push(block);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error produced by [`WireReader`] and [`WireWriter`] operations.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A read ran past the end of the buffer.
    NotEnoughBytes,

    /// A write ran past the writer's size limit.
    Truncation,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NotEnoughBytes => f.write_str("not enough bytes in buffer"),
            Self::Truncation => f.write_str("message would exceed the size limit"),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
