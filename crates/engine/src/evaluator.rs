//! The decode engine and its pipeline facade.
//!
//! `DecodeEvaluator` is the orchestrator: for each input item it
//! deserializes the sampling descriptor (staging through host memory if
//! needed), computes the sampling plan, drives the decoder packet by
//! packet, materializes planned frames into freshly allocated output
//! buffers, discards the rest, and updates warmup/discontinuity state
//! for the next call.
//!
//! One evaluator instance is single-threaded and stateful; invocations
//! must be strictly sequential and represent contiguous chunks of one
//! logical stream. Parallelism comes from running multiple instances,
//! each bound to its own device and stream partition.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sieve_common::buffer::{Channel, FrameBuffer};
use sieve_common::error::{ContractViolation, DecodeError, EvalResult};
use sieve_common::ports::{BufferTransfer, DecoderPort};
use sieve_common::profile::Profiler;
use sieve_common::sampling::decode_sample_args;
use sieve_common::types::{DeviceHandle, DeviceType, VideoMetadata};
use sieve_decoder::{make_decoder, DecoderBackend};
use sieve_hal::make_transfer;

use crate::packets::PacketCursor;
use crate::sampling::plan_frames;
use crate::staging::resolve_host;

/// Input channel carrying the encoded packet buffers.
pub const PACKET_CHANNEL: usize = 0;
/// Input channel carrying the serialized sampling descriptors.
pub const ARGS_CHANNEL: usize = 1;
/// Output channel carrying the materialized frames.
pub const FRAME_CHANNEL: usize = 0;

const INPUT_CHANNELS: usize = 2;
const OUTPUT_CHANNELS: usize = 1;

/// What a stage tells the pipeline about its device needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorCapabilities {
    pub device_type: DeviceType,
    /// Device instances this stage needs.
    pub max_devices: u32,
    /// Pipeline-level warmup overlap this stage requires of its
    /// predecessor (sampling warmup is internal, so zero here).
    pub warmup_size: i32,
    /// Whether the pipeline may overlap this stage with adjacent ones.
    pub can_overlap: bool,
}

/// Per-slot construction parameters handed to a factory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Devices assigned to this slot; the engine uses the first.
    pub device_ids: Vec<u32>,
}

/// The facade a pipeline stage presents to its surroundings.
pub trait Evaluator: Send {
    /// Set stream metadata. Must be called before `evaluate`.
    fn configure(&mut self, metadata: &VideoMetadata) -> EvalResult<()>;

    /// Force cold-start state; used when the pipeline reattaches this
    /// instance to a different, non-contiguous stream segment.
    fn reset(&mut self);

    /// Process one batch of input items, appending produced buffers to
    /// the output channels.
    fn evaluate(&mut self, inputs: &[Channel], outputs: &mut [Channel]) -> EvalResult<()>;
}

/// Constructs one evaluator per pipeline slot.
pub trait EvaluatorFactory: Send + Sync {
    fn get_capabilities(&self) -> EvaluatorCapabilities;
    fn get_output_names(&self) -> Vec<String>;
    fn new_evaluator(&self, config: &EvaluatorConfig) -> EvalResult<Box<dyn Evaluator>>;
}

/// Counters carried across one batch, committed only on success.
struct BatchStats {
    decoded: u64,
    used: u64,
    needs_warmup: bool,
    discontinuity: bool,
}

/// The decode-and-sample engine.
pub struct DecodeEvaluator {
    device: DeviceHandle,
    decoder: Box<dyn DecoderPort>,
    transfer: Arc<dyn BufferTransfer>,
    profiler: Arc<dyn Profiler>,
    metadata: Option<VideoMetadata>,
    frame_size: usize,
    /// Cold-start flag: true until the first successful invocation. While
    /// set, the first call retains warmup-region frames it would
    /// otherwise skip.
    needs_warmup: bool,
    /// The next fed packet must reset decoder prediction state.
    discontinuity: bool,
}

impl std::fmt::Debug for DecodeEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeEvaluator")
            .field("device", &self.device)
            .field("metadata", &self.metadata)
            .field("needs_warmup", &self.needs_warmup)
            .field("discontinuity", &self.discontinuity)
            .finish()
    }
}

impl DecodeEvaluator {
    /// Build an engine from explicit collaborators.
    pub fn new(
        device: DeviceHandle,
        decoder: Box<dyn DecoderPort>,
        transfer: Arc<dyn BufferTransfer>,
        profiler: Arc<dyn Profiler>,
    ) -> Self {
        Self {
            device,
            decoder,
            transfer,
            profiler,
            metadata: None,
            frame_size: 0,
            needs_warmup: true,
            discontinuity: true,
        }
    }

    pub fn device(&self) -> DeviceHandle {
        self.device
    }

    pub fn needs_warmup(&self) -> bool {
        self.needs_warmup
    }

    pub fn discontinuity(&self) -> bool {
        self.discontinuity
    }

    /// One batch of items. Mutates only decoder internals; engine flags
    /// and produced buffers are committed by the caller on success.
    fn run_batch(
        &mut self,
        inputs: &[Channel],
        produced: &mut Vec<FrameBuffer>,
    ) -> EvalResult<BatchStats> {
        let transfer = Arc::clone(&self.transfer);
        let mut stats = BatchStats {
            decoded: 0,
            used: 0,
            needs_warmup: self.needs_warmup,
            discontinuity: self.discontinuity,
        };

        let items = inputs[PACKET_CHANNEL].len();
        for item in 0..items {
            // Stage device-resident descriptor/packet buffers through
            // host memory; guards release the staging copies when the
            // item scope ends, on success and error alike.
            let args_bytes = resolve_host(&inputs[ARGS_CHANNEL][item], &transfer)?;
            let args = decode_sample_args(args_bytes.as_slice())?;
            let packet_bytes = resolve_host(&inputs[PACKET_CHANNEL][item], &transfer)?;

            let plan = plan_frames(&args, stats.needs_warmup)?;
            stats.discontinuity |= plan.forces_discontinuity;

            let mut cursor = PacketCursor::new(packet_bytes.as_slice());
            let mut current_frame = args.start_keyframe;
            let mut valid_index = 0usize;

            while valid_index < plan.len() {
                let packet = cursor.next_packet()?;
                let was_flush = packet.is_flush();

                if self.decoder.feed(packet.payload(), stats.discontinuity)? {
                    while self.decoder.frames_buffered() > 0 && valid_index < plan.len() {
                        if current_frame == plan.valid_frames[valid_index] {
                            let mut out =
                                self.transfer.allocate(self.device, self.frame_size)?;
                            self.decoder.get_frame(&mut out)?;
                            produced.push(out);
                            valid_index += 1;
                            stats.used += 1;
                        } else {
                            self.decoder.discard_frame()?;
                        }
                        current_frame += 1;
                        stats.decoded += 1;
                    }
                }
                // An empty packet resets the stream on the next feed.
                stats.discontinuity = was_flush;

                if was_flush && self.decoder.frames_buffered() == 0 && valid_index < plan.len() {
                    let expected_frame = plan.valid_frames[valid_index];
                    warn!(
                        item,
                        expected_frame,
                        materialized = valid_index,
                        planned = plan.len(),
                        "decoder starved before plan was satisfied"
                    );
                    return Err(ContractViolation::DecoderStarved { expected_frame }.into());
                }
            }

            // Await async frame copies before any source buffer is
            // reclaimed, then leave the decoder empty for the next call.
            self.decoder.wait_until_frames_copied()?;
            self.transfer.synchronize()?;
            while self.decoder.frames_buffered() > 0 {
                self.decoder.discard_frame()?;
                stats.decoded += 1;
            }

            stats.needs_warmup = false;
        }

        Ok(stats)
    }
}

impl Evaluator for DecodeEvaluator {
    fn configure(&mut self, metadata: &VideoMetadata) -> EvalResult<()> {
        self.metadata = Some(*metadata);
        self.frame_size = metadata.frame_size();
        self.decoder.configure(metadata)?;
        self.discontinuity = true;
        info!(
            device = %self.device,
            stream = %metadata,
            frame_size = self.frame_size,
            "decode evaluator configured"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.needs_warmup = true;
        self.discontinuity = true;
        info!(device = %self.device, "decode evaluator reset");
    }

    fn evaluate(&mut self, inputs: &[Channel], outputs: &mut [Channel]) -> EvalResult<()> {
        let start = Instant::now();

        if self.metadata.is_none() {
            return Err(DecodeError::NotConfigured.into());
        }
        if inputs.len() != INPUT_CHANNELS {
            return Err(ContractViolation::ChannelArity {
                expected: INPUT_CHANNELS,
                got: inputs.len(),
            }
            .into());
        }
        if outputs.len() != OUTPUT_CHANNELS {
            return Err(ContractViolation::ChannelArity {
                expected: OUTPUT_CHANNELS,
                got: outputs.len(),
            }
            .into());
        }
        if inputs[PACKET_CHANNEL].len() != inputs[ARGS_CHANNEL].len() {
            return Err(ContractViolation::ColumnMismatch {
                packets: inputs[PACKET_CHANNEL].len(),
                args: inputs[ARGS_CHANNEL].len(),
            }
            .into());
        }

        let mut produced = Vec::new();
        match self.run_batch(inputs, &mut produced) {
            Ok(stats) => {
                // Single commit point: no partial state on early return.
                self.needs_warmup = stats.needs_warmup;
                self.discontinuity = stats.discontinuity;
                debug!(
                    items = inputs[PACKET_CHANNEL].len(),
                    decoded = stats.decoded,
                    used = stats.used,
                    "decode batch complete"
                );
                outputs[FRAME_CHANNEL].append(&mut produced);
                self.profiler.add_interval("decode", start, Instant::now());
                self.profiler.increment("decoded_frames", stats.decoded);
                self.profiler.increment("effective_frames", stats.used);
                Ok(())
            }
            Err(err) => {
                // Engine flags untouched; return output buffers to the
                // backend instead of leaking them. Frame copies from
                // earlier items may still be in flight, so await them
                // before any destination is reclaimed. Secondary failures
                // here must not mask the original error.
                if let Err(wait_err) = self.decoder.wait_until_frames_copied() {
                    warn!(%wait_err, "decoder wait failed during error cleanup");
                }
                if let Err(sync_err) = self.transfer.synchronize() {
                    warn!(%sync_err, "transfer synchronize failed during error cleanup");
                }
                for buffer in produced.drain(..) {
                    self.transfer.free(buffer);
                }
                Err(err)
            }
        }
    }
}

/// Factory for decode evaluators bound to a device type and decoder
/// backend.
pub struct DecodeEvaluatorFactory {
    device_type: DeviceType,
    backend: DecoderBackend,
    profiler: Arc<dyn Profiler>,
}

impl DecodeEvaluatorFactory {
    pub fn new(
        device_type: DeviceType,
        backend: DecoderBackend,
        profiler: Arc<dyn Profiler>,
    ) -> Self {
        Self {
            device_type,
            backend,
            profiler,
        }
    }
}

impl EvaluatorFactory for DecodeEvaluatorFactory {
    fn get_capabilities(&self) -> EvaluatorCapabilities {
        EvaluatorCapabilities {
            device_type: self.device_type,
            max_devices: 1,
            warmup_size: 0,
            can_overlap: true,
        }
    }

    fn get_output_names(&self) -> Vec<String> {
        vec!["frame".to_string()]
    }

    fn new_evaluator(&self, config: &EvaluatorConfig) -> EvalResult<Box<dyn Evaluator>> {
        let device = DeviceHandle {
            device_type: self.device_type,
            device_id: config.device_ids.first().copied().unwrap_or(0),
        };
        let decoder = make_decoder(self.device_type, self.backend)?;
        let transfer = make_transfer(self.device_type)?;
        Ok(Box::new(DecodeEvaluator::new(
            device,
            decoder,
            transfer,
            Arc::clone(&self.profiler),
        )))
    }
}
