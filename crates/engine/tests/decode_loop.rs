//! End-to-end tests of the decode-and-sample loop against the raw-frame
//! host decoder.

use std::sync::Arc;

use sieve_common::buffer::{Channel, FrameBuffer, Ownership};
use sieve_common::error::{ContractViolation, EvalError};
use sieve_common::profile::MemoryProfiler;
use sieve_common::sampling::{encode_sample_args, Interval, SampleArgs, SamplingMode};
use sieve_common::types::{DeviceHandle, DeviceType, VideoMetadata};
use sieve_decoder::{make_decoder, DecoderBackend};
use sieve_engine::{DecodeEvaluator, Evaluator, FRAME_CHANNEL};
use sieve_hal::make_transfer;

// 2x1 stream: 6 bytes per frame.
const META: VideoMetadata = VideoMetadata {
    width: 2,
    height: 1,
};

fn frame(index: u8) -> Vec<u8> {
    vec![index; META.width as usize * META.height as usize * 3]
}

fn packets_for(indices: std::ops::Range<u8>) -> FrameBuffer {
    let frames: Vec<Vec<u8>> = indices.map(frame).collect();
    FrameBuffer::from_bytes(sieve_engine::encode_packets(&frames))
}

fn args_for(mode: SamplingMode, warmup_count: i32, start_keyframe: i32) -> FrameBuffer {
    FrameBuffer::from_bytes(encode_sample_args(&SampleArgs {
        mode,
        warmup_count,
        start_keyframe,
    }))
}

fn all(start: i32, end: i32) -> SamplingMode {
    SamplingMode::All {
        interval: Interval::new(start, end),
    }
}

fn evaluator(backend: DecoderBackend) -> (DecodeEvaluator, Arc<MemoryProfiler>) {
    let profiler = Arc::new(MemoryProfiler::new());
    let decoder = make_decoder(DeviceType::Cpu, backend).unwrap();
    let transfer = make_transfer(DeviceType::Cpu).unwrap();
    let mut eval = DecodeEvaluator::new(DeviceHandle::CPU, decoder, transfer, profiler.clone());
    eval.configure(&META).unwrap();
    (eval, profiler)
}

fn run(
    eval: &mut DecodeEvaluator,
    packets: FrameBuffer,
    args: FrameBuffer,
) -> Result<Channel, EvalError> {
    let inputs = vec![vec![packets], vec![args]];
    let mut outputs = vec![Vec::new()];
    eval.evaluate(&inputs, &mut outputs)?;
    Ok(outputs.remove(FRAME_CHANNEL))
}

#[test]
fn all_mode_end_to_end() {
    let (mut eval, profiler) = evaluator(DecoderBackend::Raw);
    assert!(eval.needs_warmup());

    let frames = run(&mut eval, packets_for(0..3), args_for(all(0, 3), 0, 0)).unwrap();

    assert_eq!(frames.len(), 3);
    for (i, buf) in frames.iter().enumerate() {
        assert_eq!(buf.as_host().unwrap(), &frame(i as u8)[..]);
        assert_eq!(buf.size, META.frame_size());
        assert_eq!(buf.ownership, Ownership::Owned);
    }
    assert_eq!(profiler.counter("decoded_frames"), 3);
    assert_eq!(profiler.counter("effective_frames"), 3);
    assert_eq!(profiler.interval_count("decode"), 1);

    // Warmed up, and the final fed packet was real data, not a flush.
    assert!(!eval.needs_warmup());
    assert!(!eval.discontinuity());
}

#[test]
fn warmup_region_skipped_once_warm() {
    let (mut eval, profiler) = evaluator(DecoderBackend::Raw);

    // Cold call: warmup region retained.
    let first = run(&mut eval, packets_for(0..3), args_for(all(0, 3), 1, 0)).unwrap();
    assert_eq!(first.len(), 3);

    // Warm continuation: the first planned index is skipped, but its
    // frame is still decoded and discarded.
    let second = run(&mut eval, packets_for(3..6), args_for(all(3, 6), 1, 3)).unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].as_host().unwrap(), &frame(4)[..]);
    assert_eq!(second[1].as_host().unwrap(), &frame(5)[..]);

    assert_eq!(profiler.counter("decoded_frames"), 6);
    assert_eq!(profiler.counter("effective_frames"), 5);
}

#[test]
fn reordering_decoder_is_flushed() {
    // Display delay 2: the last frames only surface via the end-of-stream
    // flush record.
    let (mut eval, profiler) = evaluator(DecoderBackend::RawDelayed { display_delay: 2 });

    let frames = run(&mut eval, packets_for(0..3), args_for(all(0, 3), 0, 0)).unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2].as_host().unwrap(), &frame(2)[..]);
    assert_eq!(profiler.counter("decoded_frames"), 3);
    // The invocation ended on a flush packet: the next feed must reset.
    assert!(eval.discontinuity());
}

#[test]
fn residual_frames_are_drained_not_emitted() {
    let (mut eval, profiler) = evaluator(DecoderBackend::RawDelayed { display_delay: 2 });

    // Plan keeps [0, 2) but the chunk carries frames 0..3; the flush
    // surfaces frame 2 after the plan is already satisfied.
    let frames = run(&mut eval, packets_for(0..3), args_for(all(0, 2), 0, 0)).unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(profiler.counter("effective_frames"), 2);
    // Residual frame was decoded-but-unused.
    assert_eq!(profiler.counter("decoded_frames"), 3);
}

#[test]
fn gather_materializes_only_planned_indices() {
    let (mut eval, profiler) = evaluator(DecoderBackend::Raw);

    let frames = run(
        &mut eval,
        packets_for(0..3),
        args_for(
            SamplingMode::Gather {
                points: vec![0, 2],
            },
            0,
            0,
        ),
    )
    .unwrap();

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].as_host().unwrap(), &frame(0)[..]);
    assert_eq!(frames[1].as_host().unwrap(), &frame(2)[..]);
    assert_eq!(profiler.counter("decoded_frames"), 3);
    assert_eq!(profiler.counter("effective_frames"), 2);
}

#[test]
fn starvation_is_fatal_and_commits_nothing() {
    let (mut eval, profiler) = evaluator(DecoderBackend::Raw);

    // Plan wants 5 frames, chunk only carries 2.
    let err = run(&mut eval, packets_for(0..2), args_for(all(0, 5), 0, 0)).unwrap_err();
    match err {
        EvalError::Contract(ContractViolation::DecoderStarved { expected_frame }) => {
            assert_eq!(expected_frame, 2)
        }
        other => panic!("expected starvation, got {other:?}"),
    }

    // Engine state and metrics were not partially committed.
    assert!(eval.needs_warmup());
    assert_eq!(profiler.counter("effective_frames"), 0);
    assert_eq!(profiler.interval_count("decode"), 0);
}

#[test]
fn batch_accumulates_across_items() {
    let (mut eval, profiler) = evaluator(DecoderBackend::Raw);

    let inputs = vec![
        vec![packets_for(0..2), packets_for(2..4)],
        vec![args_for(all(0, 2), 0, 0), args_for(all(2, 4), 0, 2)],
    ];
    let mut outputs = vec![Vec::new()];
    eval.evaluate(&inputs, &mut outputs).unwrap();

    assert_eq!(outputs[FRAME_CHANNEL].len(), 4);
    assert_eq!(outputs[FRAME_CHANNEL][3].as_host().unwrap(), &frame(3)[..]);
    assert_eq!(profiler.counter("decoded_frames"), 4);
    assert_eq!(profiler.counter("effective_frames"), 4);
    // One interval per evaluate call, not per item.
    assert_eq!(profiler.interval_count("decode"), 1);
}

#[test]
fn reset_forces_cold_start_again() {
    let (mut eval, _) = evaluator(DecoderBackend::Raw);

    run(&mut eval, packets_for(0..3), args_for(all(0, 3), 1, 0)).unwrap();
    assert!(!eval.needs_warmup());

    eval.reset();
    assert!(eval.needs_warmup());
    assert!(eval.discontinuity());

    // Cold again: warmup region is retained.
    let frames = run(&mut eval, packets_for(6..9), args_for(all(6, 9), 2, 6)).unwrap();
    assert_eq!(frames.len(), 3);
}

#[test]
fn warmup_stays_clear_across_calls() {
    let (mut eval, _) = evaluator(DecoderBackend::Raw);

    run(&mut eval, packets_for(0..2), args_for(all(0, 2), 0, 0)).unwrap();
    for chunk in [2u8, 4, 6] {
        let start = chunk as i32;
        run(
            &mut eval,
            packets_for(chunk..chunk + 2),
            args_for(all(start, start + 2), 0, start),
        )
        .unwrap();
        assert!(!eval.needs_warmup());
    }
}
