mod common;

#[cfg(test)]
mod tests {
    use crossbeam::thread;
    use zstd_stream_core::prelude::*;

    use super::common::{faulty_state, init_logging, noise, text};

    fn one_frame(compressor: &Compressor, data: &[u8]) -> Vec<u8> {
        let mut frame = compressor.compress(data, EndDirective::Continue).unwrap();
        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());
        frame
    }

    fn decode(frame: &[u8]) -> Vec<u8> {
        zstd::stream::decode_all(frame).unwrap()
    }

    // # ✅ 1. Round trips
    #[test]
    fn continue_then_flush_frame_round_trips() {
        init_logging();
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();
        let data = text(200_000);

        let frame = one_frame(&compressor, &data);
        assert!(frame.len() < data.len());
        assert_eq!(decode(&frame), data);
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);
    }

    #[test]
    fn many_small_continue_calls_form_one_frame() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::with_level(1), None).unwrap();
        let data = text(50_000);

        let mut frame = Vec::new();
        for chunk in data.chunks(777) {
            frame.extend(compressor.compress(chunk, EndDirective::Continue).unwrap());
            assert_eq!(compressor.last_mode(), EndDirective::Continue);
        }
        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());

        assert_eq!(state.frame_size(&frame).unwrap(), frame.len());
        assert_eq!(decode(&frame), data);
    }

    #[test]
    fn incompressible_output_spans_several_blocks() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();
        let data = noise(1 << 20, 42);

        let frame = compressor.compress(&data, EndDirective::FlushFrame).unwrap();
        assert_eq!(decode(&frame), data);
        assert!(compressor.telemetry().grows > 0);
    }

    #[test]
    fn handle_is_reusable_for_independent_frames() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        let f1 = one_frame(&compressor, b"first frame");
        let f2 = one_frame(&compressor, b"second frame");

        assert_eq!(decode(&f1), b"first frame");
        assert_eq!(decode(&f2), b"second frame");
        assert_eq!(compressor.telemetry().frames, 2);
    }

    // # ✅ 2. Flush semantics
    #[test]
    fn flush_with_no_open_frame_is_empty() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        assert!(compressor.flush(EndDirective::FlushBlock).unwrap().is_empty());
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);
        assert!(compressor.flush(EndDirective::FlushFrame).unwrap().is_empty());
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);
    }

    #[test]
    fn repeated_flush_block_keeps_frame_open() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        let mut frame = compressor.compress(b"payload", EndDirective::Continue).unwrap();
        frame.extend(compressor.flush(EndDirective::FlushBlock).unwrap());
        assert!(!frame.is_empty());
        assert_eq!(compressor.last_mode(), EndDirective::FlushBlock);

        assert!(compressor.flush(EndDirective::FlushBlock).unwrap().is_empty());
        assert_eq!(compressor.last_mode(), EndDirective::FlushBlock);

        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());
        assert_eq!(decode(&frame), b"payload");
    }

    #[test]
    fn flush_block_output_is_decodable_before_frame_end() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();
        let decompressor = state.decompressor(&DecompressorOptions::default(), None).unwrap();

        let head = compressor.compress(b"streamed part", EndDirective::FlushBlock).unwrap();
        assert_eq!(decompressor.decompress(&head, None).unwrap(), b"streamed part");
        assert!(!decompressor.eof());
        assert!(decompressor.needs_input());

        let tail = compressor.flush(EndDirective::FlushFrame).unwrap();
        assert!(decompressor.decompress(&tail, None).unwrap().is_empty());
        assert!(decompressor.eof());
    }

    #[test]
    fn flush_rejects_continue() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        let err = compressor.flush(EndDirective::Continue).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn integer_modes_are_validated() {
        assert_eq!(EndDirective::from_mode(0).unwrap(), EndDirective::Continue);
        assert_eq!(EndDirective::from_mode(1).unwrap(), EndDirective::FlushBlock);
        assert_eq!(EndDirective::from_mode(2).unwrap(), EndDirective::FlushFrame);
        assert!(EndDirective::from_mode(3).unwrap_err().is_invalid_argument());
        assert!(EndDirective::from_mode(-1).unwrap_err().is_invalid_argument());
    }

    // # ✅ 3. Parameters
    #[test]
    fn level_is_recorded() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::with_level(7), None).unwrap();
        assert_eq!(compressor.compression_level(), 7);

        let options = CompressorOptions::new().parameter(CompressionParameter::CompressionLevel, 4);
        let compressor = state.compressor(&options, None).unwrap();
        assert_eq!(compressor.compression_level(), 4);
    }

    #[test]
    fn level_given_twice_is_rejected() {
        let state = ZstdState::new();
        let options = CompressorOptions::with_level(3).parameter(CompressionParameter::CompressionLevel, 5);
        assert!(state.compressor(&options, None).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn out_of_range_parameter_reports_bounds() {
        let state = ZstdState::new();
        let options = CompressorOptions::new().parameter(CompressionParameter::WindowLog, 100);

        match state.compressor(&options, None) {
            Err(ZstdError::ParameterOutOfBounds { name, lower, upper, value, .. }) => {
                assert_eq!(name, "windowLog");
                assert_eq!(value, 100);
                assert!(lower <= upper && upper < 100);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("window log 100 was accepted"),
        }
    }

    #[test]
    fn checksum_flag_is_visible_to_decompressor() {
        let state = ZstdState::new();
        let data = text(4096);

        for (flag, expected) in [(1, Check::Xxh64), (0, Check::None)] {
            let options = CompressorOptions::new().parameter(CompressionParameter::ChecksumFlag, flag);
            let compressor = state.compressor(&options, None).unwrap();
            let frame = one_frame(&compressor, &data);

            let decompressor = state.decompressor(&DecompressorOptions::default(), None).unwrap();
            assert_eq!(decompressor.check(), Check::Unknown);
            assert_eq!(decompressor.decompress(&frame, None).unwrap(), data);
            assert_eq!(decompressor.check(), expected);
        }
    }

    #[test]
    fn multithreaded_compression_round_trips() {
        let state = ZstdState::new();
        let workers = state.cparam_bounds(CompressionParameter::NbWorkers.key()).unwrap();
        if workers.upper == 0 {
            return; // library built without worker threads
        }

        let options = CompressorOptions::with_level(3).parameter(CompressionParameter::NbWorkers, 2);
        let compressor = state.compressor(&options, None).unwrap();
        let data = text(3 << 20);

        assert!(compressor.use_multithread());
        let mut frame = Vec::new();
        for chunk in data.chunks(256 * 1024) {
            frame.extend(compressor.compress(chunk, EndDirective::Continue).unwrap());
        }
        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());
        assert_eq!(decode(&frame), data);
    }

    #[test]
    fn small_outputs_do_not_keep_a_full_block() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        let buffered = compressor.compress(b"hi", EndDirective::Continue).unwrap();
        assert!(buffered.capacity() < 1024, "capacity {}", buffered.capacity());
        let block = compressor.flush(EndDirective::FlushBlock).unwrap();
        assert!(!block.is_empty());
        assert!(block.capacity() < 1024, "capacity {}", block.capacity());
        let end = compressor.flush(EndDirective::FlushFrame).unwrap();
        assert_eq!(decode(&[buffered, block, end].concat()), b"hi");
    }

    // # ✅ 4. Pledged input size
    #[test]
    fn pledged_size_is_written_to_frame_header() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        compressor.set_pledged_input_size(Some(11)).unwrap();
        let frame = one_frame(&compressor, b"hello world");
        assert_eq!(state.frame_info(&frame).unwrap().content_size, Some(11));
    }

    #[test]
    fn pledged_size_only_before_frame_start() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        compressor.compress(b"open", EndDirective::Continue).unwrap();
        assert!(compressor.set_pledged_input_size(Some(4)).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn wrong_pledged_size_fails_then_recovers() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        compressor.set_pledged_input_size(Some(5)).unwrap();
        let err = compressor
            .compress(b"ten bytes!", EndDirective::Continue)
            .and_then(|_| compressor.flush(EndDirective::FlushFrame))
            .unwrap_err();
        assert!(matches!(err, ZstdError::CompressionFailed(_)));
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);

        let frame = one_frame(&compressor, b"clean frame");
        assert_eq!(decode(&frame), b"clean frame");
        assert_eq!(state.frame_info(&frame).unwrap().content_size, None);
    }

    // # ✅ 5. Error recovery
    #[test]
    fn injected_failure_resets_session() {
        let (state, faults) = faulty_state();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        compressor.compress(b"half a frame", EndDirective::Continue).unwrap();
        assert_eq!(compressor.last_mode(), EndDirective::Continue);

        faults.set_fail_compress(true);
        let err = compressor.compress(b"more", EndDirective::Continue).unwrap_err();
        assert!(matches!(err, ZstdError::CompressionFailed(_)));
        assert!(err.codec_error().unwrap().message().contains("injected"));
        assert_eq!(err.codec_error().unwrap().code(), 1);
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);

        faults.set_fail_compress(false);
        let mut frame = compressor.compress(b"fresh", EndDirective::Continue).unwrap();
        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());
        assert_eq!(decode(&frame), b"fresh");

        let telemetry = compressor.telemetry();
        assert_eq!(telemetry.errors, 1);
        assert_eq!(telemetry.frames, 1);
    }

    #[test]
    fn multithreaded_failure_resets_session() {
        let (state, faults) = faulty_state();
        let workers = state.cparam_bounds(CompressionParameter::NbWorkers.key()).unwrap();
        if workers.upper == 0 {
            return; // library built without worker threads
        }

        let options = CompressorOptions::with_level(3).parameter(CompressionParameter::NbWorkers, 2);
        let compressor = state.compressor(&options, None).unwrap();
        assert!(compressor.use_multithread());

        compressor.compress(&text(100_000), EndDirective::Continue).unwrap();
        assert_eq!(compressor.last_mode(), EndDirective::Continue);

        faults.set_fail_compress(true);
        let err = compressor.compress(&text(100_000), EndDirective::Continue).unwrap_err();
        assert!(matches!(err, ZstdError::CompressionFailed(_)));
        assert_eq!(compressor.last_mode(), EndDirective::FlushFrame);
        assert_eq!(compressor.telemetry().errors, 1);

        faults.set_fail_compress(false);
        let data = text(500_000);
        let mut frame = compressor.compress(&data, EndDirective::Continue).unwrap();
        frame.extend(compressor.flush(EndDirective::FlushFrame).unwrap());
        assert_eq!(decode(&frame), data);
        assert_eq!(compressor.telemetry().frames, 1);
    }

    // # ✅ 6. Concurrency
    #[test]
    fn shared_handle_serialises_whole_frames() {
        let state = ZstdState::new();
        let compressor = state.compressor(&CompressorOptions::default(), None).unwrap();

        let frames: Vec<(usize, Vec<u8>)> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let compressor = &compressor;
                    s.spawn(move |_| {
                        let data = text(10_000 + i * 100);
                        (i, compressor.compress(&data, EndDirective::FlushFrame).unwrap())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        })
        .unwrap();

        for (i, frame) in frames {
            assert_eq!(decode(&frame), text(10_000 + i * 100));
        }
        assert_eq!(compressor.telemetry().frames, 8);
    }

    // # ✅ 7. One-shot helper
    #[test]
    fn one_shot_compress_records_content_size() {
        let state = ZstdState::new();
        let data = text(123_456);

        let frame = state.compress(&data, &CompressorOptions::with_level(5), None).unwrap();
        let info = state.frame_info(&frame).unwrap();
        assert_eq!(info.content_size, Some(data.len() as u64));
        assert_eq!(info.dict_id, 0);
        assert_eq!(decode(&frame), data);
    }

    #[test]
    fn one_shot_compress_of_empty_input() {
        let state = ZstdState::new();
        let frame = state.compress(b"", &CompressorOptions::default(), None).unwrap();
        assert!(!frame.is_empty());
        assert!(decode(&frame).is_empty());
    }
}
