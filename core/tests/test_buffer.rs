#[cfg(test)]
mod tests {
    use zstd_stream_core::constants::BUFFER_BLOCK_SIZES;
    use zstd_stream_core::stream::ChunkedOutputBuffer;

    /// Fill the rest of the current block with `byte`.
    fn fill(buffer: &mut ChunkedOutputBuffer, byte: u8) -> usize {
        let spare = buffer.spare();
        let n = spare.len();
        spare.iter_mut().for_each(|b| *b = byte);
        buffer.advance(n);
        n
    }

    // # ✅ 1. Initial block sizing
    #[test]
    fn growable_buffer_starts_with_first_table_entry() {
        let mut buffer = ChunkedOutputBuffer::with_growth(None).unwrap();
        assert_eq!(buffer.spare().len(), BUFFER_BLOCK_SIZES[0]);
        assert!(buffer.is_empty());
        assert!(!buffer.reached_max_length());
    }

    #[test]
    fn small_cap_limits_first_block() {
        let mut buffer = ChunkedOutputBuffer::with_growth(Some(100)).unwrap();
        assert_eq!(buffer.spare().len(), 100);
    }

    #[test]
    fn initial_size_is_clipped_by_cap() {
        let mut bounded = ChunkedOutputBuffer::with_initial_size(Some(10), 1000).unwrap();
        assert_eq!(bounded.spare().len(), 10);

        let mut unbounded = ChunkedOutputBuffer::with_initial_size(None, 1000).unwrap();
        assert_eq!(unbounded.spare().len(), 1000);
    }

    #[test]
    fn zero_cap_is_immediately_at_max() {
        let buffer = ChunkedOutputBuffer::with_growth(Some(0)).unwrap();
        assert!(buffer.is_block_full());
        assert!(buffer.reached_max_length());
    }

    // # ✅ 2. Growth policy
    #[test]
    fn grow_follows_block_table() {
        let mut buffer = ChunkedOutputBuffer::with_growth(None).unwrap();
        for expected in &BUFFER_BLOCK_SIZES[1..4] {
            fill(&mut buffer, 0xAB);
            assert!(buffer.is_block_full());
            buffer.grow().unwrap();
            assert_eq!(buffer.spare().len(), *expected);
        }
        assert_eq!(buffer.block_count(), 4);
    }

    #[test]
    fn grow_is_clipped_to_remaining_cap() {
        let cap = 100_000;
        let mut buffer = ChunkedOutputBuffer::with_growth(Some(cap)).unwrap();

        let mut written = fill(&mut buffer, 1);
        buffer.grow().unwrap();
        written += fill(&mut buffer, 2);
        assert_eq!(written, BUFFER_BLOCK_SIZES[0] + BUFFER_BLOCK_SIZES[1]);

        buffer.grow().unwrap();
        assert_eq!(buffer.spare().len(), cap - written);
        fill(&mut buffer, 3);

        assert_eq!(buffer.len(), cap);
        assert!(buffer.reached_max_length());
    }

    // # ✅ 3. Finalisation
    #[test]
    fn finish_single_block_returns_written_prefix() {
        let mut buffer = ChunkedOutputBuffer::with_growth(None).unwrap();
        buffer.spare()[..5].copy_from_slice(b"hello");
        buffer.advance(5);

        let out = buffer.finish().unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn finish_single_block_releases_spare_capacity() {
        let mut buffer = ChunkedOutputBuffer::with_growth(None).unwrap();
        assert_eq!(buffer.spare().len(), BUFFER_BLOCK_SIZES[0]);
        buffer.spare()[..10].copy_from_slice(b"0123456789");
        buffer.advance(10);

        let out = buffer.finish().unwrap();
        assert_eq!(out, b"0123456789");
        assert!(out.capacity() < 1024, "capacity {}", out.capacity());
    }

    #[test]
    fn finish_concatenates_blocks_in_order() {
        let mut buffer = ChunkedOutputBuffer::with_initial_size(None, 3).unwrap();
        buffer.spare().copy_from_slice(b"abc");
        buffer.advance(3);
        buffer.grow().unwrap();
        buffer.spare()[..2].copy_from_slice(b"de");
        buffer.advance(2);

        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.finish().unwrap(), b"abcde");
    }

    #[test]
    fn empty_first_block_grows_normally() {
        let mut buffer = ChunkedOutputBuffer::with_initial_size(None, 0).unwrap();
        assert!(buffer.is_block_full());
        buffer.grow().unwrap();
        assert_eq!(buffer.spare().len(), BUFFER_BLOCK_SIZES[1]);
        buffer.spare()[0] = 7;
        buffer.advance(1);
        assert_eq!(buffer.finish().unwrap(), vec![7]);
    }

    #[test]
    fn discard_releases_everything() {
        let mut buffer = ChunkedOutputBuffer::with_growth(None).unwrap();
        fill(&mut buffer, 9);
        buffer.grow().unwrap();
        buffer.discard();
    }
}
