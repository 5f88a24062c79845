//! Sampling plan computation.
//!
//! Turns a declarative [`SampleArgs`] into the ordered set of absolute
//! frame indices one invocation retains. Warmup skipping exists because a
//! chunk boundary requires decoding (but discarding) a run-up of frames
//! to prime predictive decoder state without re-emitting frames already
//! produced by the previous chunk's tail; the run-up is only skipped once
//! the engine is warm.

use sieve_common::error::ContractViolation;
use sieve_common::sampling::{SampleArgs, SamplingMode};

/// The frame indices to retain for one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplePlan {
    /// Strictly increasing absolute frame indices.
    pub valid_frames: Vec<i32>,
    /// Gather-style plans are not guaranteed contiguous with the
    /// decoder's running position, so the first feed must reset it.
    pub forces_discontinuity: bool,
}

impl SamplePlan {
    pub fn len(&self) -> usize {
        self.valid_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_frames.is_empty()
    }
}

/// Compute the retained frame set for a descriptor.
///
/// `needs_warmup` is the engine's cold-start flag: when set, the warmup
/// region is retained rather than skipped.
pub fn plan_frames(args: &SampleArgs, needs_warmup: bool) -> Result<SamplePlan, ContractViolation> {
    let warmup = if needs_warmup { 0 } else { args.warmup_count };
    let plan = match &args.mode {
        SamplingMode::All { interval } => SamplePlan {
            valid_frames: (interval.start + warmup..interval.end).collect(),
            forces_discontinuity: false,
        },
        SamplingMode::Strided { interval, stride } => {
            // The wire codec accepts any i32; a non-positive stride would
            // never advance past the interval end.
            if *stride < 1 {
                return Err(ContractViolation::InvalidStride { stride: *stride });
            }
            let mut frames = Vec::new();
            let mut s = interval.start + warmup * stride;
            while s < interval.end {
                frames.push(s);
                s += stride;
            }
            SamplePlan {
                valid_frames: frames,
                forces_discontinuity: false,
            }
        }
        SamplingMode::Gather { points } => {
            let skip = (warmup.max(0) as usize).min(points.len());
            SamplePlan {
                valid_frames: points[skip..].to_vec(),
                forces_discontinuity: true,
            }
        }
        SamplingMode::SequenceGather { sequences } => {
            if sequences.len() != 1 {
                return Err(ContractViolation::SequenceGatherArity {
                    count: sequences.len(),
                });
            }
            let interval = sequences[0];
            SamplePlan {
                valid_frames: (interval.start + warmup..interval.end).collect(),
                forces_discontinuity: true,
            }
        }
    };

    // The decode loop consumes the plan one-to-one against decoder
    // emission order; a non-increasing plan would desynchronize it.
    for (position, window) in plan.valid_frames.windows(2).enumerate() {
        if window[1] <= window[0] {
            return Err(ContractViolation::UnorderedPlan {
                position: position + 1,
                frame: window[1],
            });
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_common::sampling::Interval;

    fn all(start: i32, end: i32, warmup_count: i32) -> SampleArgs {
        SampleArgs {
            mode: SamplingMode::All {
                interval: Interval::new(start, end),
            },
            warmup_count,
            start_keyframe: start,
        }
    }

    #[test]
    fn all_cold_keeps_warmup_region() {
        let plan = plan_frames(&all(0, 10, 2), true).unwrap();
        assert_eq!(plan.valid_frames, (0..10).collect::<Vec<_>>());
        assert!(!plan.forces_discontinuity);
    }

    #[test]
    fn all_warm_skips_warmup_region() {
        let plan = plan_frames(&all(0, 10, 2), false).unwrap();
        assert_eq!(plan.valid_frames, (2..10).collect::<Vec<_>>());
    }

    #[test]
    fn strided_warm_skips_warmup_strides() {
        let args = SampleArgs {
            mode: SamplingMode::Strided {
                interval: Interval::new(0, 20),
                stride: 4,
            },
            warmup_count: 1,
            start_keyframe: 0,
        };
        let plan = plan_frames(&args, false).unwrap();
        assert_eq!(plan.valid_frames, vec![4, 8, 12, 16]);
        assert!(!plan.forces_discontinuity);
    }

    #[test]
    fn strided_cold_starts_at_interval_start() {
        let args = SampleArgs {
            mode: SamplingMode::Strided {
                interval: Interval::new(0, 20),
                stride: 4,
            },
            warmup_count: 1,
            start_keyframe: 0,
        };
        let plan = plan_frames(&args, true).unwrap();
        assert_eq!(plan.valid_frames, vec![0, 4, 8, 12, 16]);
    }

    #[test]
    fn gather_forces_discontinuity() {
        let args = SampleArgs {
            mode: SamplingMode::Gather {
                points: vec![3, 9, 27],
            },
            warmup_count: 1,
            start_keyframe: 3,
        };
        let cold = plan_frames(&args, true).unwrap();
        assert_eq!(cold.valid_frames, vec![3, 9, 27]);
        assert!(cold.forces_discontinuity);

        let warm = plan_frames(&args, false).unwrap();
        assert_eq!(warm.valid_frames, vec![9, 27]);
        assert!(warm.forces_discontinuity);
    }

    #[test]
    fn sequence_gather_single_interval() {
        let args = SampleArgs {
            mode: SamplingMode::SequenceGather {
                sequences: vec![Interval::new(30, 34)],
            },
            warmup_count: 1,
            start_keyframe: 28,
        };
        let plan = plan_frames(&args, false).unwrap();
        assert_eq!(plan.valid_frames, vec![31, 32, 33]);
        assert!(plan.forces_discontinuity);
    }

    #[test]
    fn sequence_gather_arity_is_enforced() {
        let args = SampleArgs {
            mode: SamplingMode::SequenceGather {
                sequences: vec![Interval::new(0, 2), Interval::new(4, 6)],
            },
            warmup_count: 0,
            start_keyframe: 0,
        };
        assert_eq!(
            plan_frames(&args, true).unwrap_err(),
            ContractViolation::SequenceGatherArity { count: 2 }
        );
    }

    #[test]
    fn non_positive_strides_are_rejected() {
        for stride in [0, -3] {
            let args = SampleArgs {
                mode: SamplingMode::Strided {
                    interval: Interval::new(0, 10),
                    stride,
                },
                warmup_count: 0,
                start_keyframe: 0,
            };
            assert_eq!(
                plan_frames(&args, true).unwrap_err(),
                ContractViolation::InvalidStride { stride }
            );
        }
    }

    #[test]
    fn unordered_gather_is_rejected() {
        let args = SampleArgs {
            mode: SamplingMode::Gather {
                points: vec![5, 5, 9],
            },
            warmup_count: 0,
            start_keyframe: 5,
        };
        assert_eq!(
            plan_frames(&args, true).unwrap_err(),
            ContractViolation::UnorderedPlan {
                position: 1,
                frame: 5
            }
        );
    }

    #[test]
    fn plans_are_strictly_increasing() {
        for warm in [true, false] {
            let plan = plan_frames(&all(2, 40, 3), warm).unwrap();
            assert!(plan.valid_frames.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn empty_interval_yields_empty_plan() {
        let plan = plan_frames(&all(5, 5, 0), true).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn gather_warmup_never_overruns_points() {
        let args = SampleArgs {
            mode: SamplingMode::Gather { points: vec![4] },
            warmup_count: 3,
            start_keyframe: 4,
        };
        let plan = plan_frames(&args, false).unwrap();
        assert!(plan.is_empty());
    }
}
