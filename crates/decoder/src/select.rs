//! Runtime decoder backend selection.

use tracing::info;

use sieve_common::error::DecodeError;
use sieve_common::ports::DecoderPort;
use sieve_common::types::DeviceType;

use crate::raw::RawFrameDecoder;

/// Which decoder implementation to construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecoderBackend {
    /// Raw-frame passthrough with no reordering delay.
    Raw,
    /// Raw-frame passthrough that models a hardware reordering buffer.
    RawDelayed { display_delay: usize },
}

/// Construct a decoder backend for the given device.
///
/// Accelerator decode backends register here when compiled in; without
/// one, a GPU request fails at construction rather than degrading
/// silently.
pub fn make_decoder(
    device: DeviceType,
    backend: DecoderBackend,
) -> Result<Box<dyn DecoderPort>, DecodeError> {
    match device {
        DeviceType::Cpu => {
            let decoder: Box<dyn DecoderPort> = match backend {
                DecoderBackend::Raw => Box::new(RawFrameDecoder::new()),
                DecoderBackend::RawDelayed { display_delay } => {
                    Box::new(RawFrameDecoder::with_display_delay(display_delay))
                }
            };
            info!(device = %device, ?backend, "decoder backend created");
            Ok(decoder)
        }
        DeviceType::Gpu => Err(DecodeError::UnsupportedDevice { device }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_backends_construct() {
        assert!(make_decoder(DeviceType::Cpu, DecoderBackend::Raw).is_ok());
        assert!(make_decoder(
            DeviceType::Cpu,
            DecoderBackend::RawDelayed { display_delay: 4 }
        )
        .is_ok());
    }

    #[test]
    fn gpu_backend_degrades_to_error() {
        assert!(matches!(
            make_decoder(DeviceType::Gpu, DecoderBackend::Raw),
            Err(DecodeError::UnsupportedDevice {
                device: DeviceType::Gpu
            })
        ));
    }
}
