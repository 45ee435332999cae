//! stream/buffer.rs
//! Block-list output buffer backing every compress/decompress call.
//!
//! Summary: output is written into a list of owned blocks that grow along
//! [`BUFFER_BLOCK_SIZES`], then joined once in [`ChunkedOutputBuffer::finish`].
//! Large outputs never pay for repeated doubling reallocations, and a
//! capped buffer never holds more than `max_length` bytes.
use crate::constants::BUFFER_BLOCK_SIZES;
use crate::types::{Result, ZstdError};

#[derive(Debug)]
pub struct ChunkedOutputBuffer {
    blocks: Vec<Vec<u8>>,
    /// Bytes written into the last block.
    filled: usize,
    /// Bytes written across all blocks.
    written: usize,
    max_length: Option<usize>,
}

fn alloc_block(size: usize) -> Result<Vec<u8>> {
    let mut block = Vec::new();
    block.try_reserve_exact(size).map_err(|e| {
        ZstdError::OutOfMemory(format!("unable to allocate a {size} byte output block: {e}"))
    })?;
    block.resize(size, 0);
    Ok(block)
}

fn table_size(index: usize) -> usize {
    BUFFER_BLOCK_SIZES
        .get(index)
        .or_else(|| BUFFER_BLOCK_SIZES.last())
        .copied()
        .unwrap_or(0)
}

impl ChunkedOutputBuffer {
    /// Growable buffer: the first block is the first table entry, or
    /// `max_length` when that is smaller.
    pub fn with_growth(max_length: Option<usize>) -> Result<Self> {
        let first = match max_length {
            Some(max) => table_size(0).min(max),
            None => table_size(0),
        };
        Self::start(max_length, first)
    }

    /// Buffer whose first block is sized to an expected output length.
    /// When the expectation holds, one block and no copy at `finish`.
    pub fn with_initial_size(max_length: Option<usize>, initial_size: usize) -> Result<Self> {
        let first = match max_length {
            Some(max) => initial_size.min(max),
            None => initial_size,
        };
        Self::start(max_length, first)
    }

    fn start(max_length: Option<usize>, first: usize) -> Result<Self> {
        Ok(Self {
            blocks: vec![alloc_block(first)?],
            filled: 0,
            written: 0,
            max_length,
        })
    }

    fn current(&self) -> &[u8] {
        self.blocks.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Unwritten tail of the current block.
    pub fn spare(&mut self) -> &mut [u8] {
        let filled = self.filled;
        match self.blocks.last_mut() {
            Some(block) => &mut block[filled..],
            None => &mut [],
        }
    }

    /// Commit `n` bytes just written into [`spare`](Self::spare).
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.current().len());
        self.filled += n;
        self.written += n;
    }

    pub fn is_block_full(&self) -> bool {
        self.filled == self.current().len()
    }

    /// Bounded, and every allowed byte has been written.
    pub fn reached_max_length(&self) -> bool {
        self.max_length == Some(self.written)
    }

    /// Append the next block. Only valid once the current block is full and
    /// the cap (if any) still leaves room.
    pub fn grow(&mut self) -> Result<()> {
        debug_assert!(self.is_block_full(), "grow() called with room left in the current block");
        debug_assert!(!self.reached_max_length(), "grow() called on a buffer at its cap");

        let mut size = table_size(self.blocks.len());
        if let Some(max) = self.max_length {
            size = size.min(max - self.written);
        }
        let block = alloc_block(size)?;
        log::trace!(
            "output buffer grows by {} bytes (block {}, {} written)",
            size,
            self.blocks.len() + 1,
            self.written
        );
        self.blocks.push(block);
        self.filled = 0;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Join the written bytes into one `Vec`. A single block is truncated in
    /// place instead of copied, and gives back its unused capacity.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if self.blocks.len() == 1 {
            let mut only = self.blocks.pop().unwrap_or_default();
            only.truncate(self.filled);
            only.shrink_to_fit();
            return Ok(only);
        }

        let mut out = Vec::new();
        out.try_reserve_exact(self.written).map_err(|e| {
            ZstdError::OutOfMemory(format!("unable to allocate {} bytes of output: {e}", self.written))
        })?;
        let last = self.blocks.len() - 1;
        for (i, block) in self.blocks.iter().enumerate() {
            let take = if i == last { self.filled } else { block.len() };
            out.extend_from_slice(&block[..take]);
        }
        Ok(out)
    }

    /// Drop everything written so far.
    pub fn discard(self) {
        drop(self);
    }
}
