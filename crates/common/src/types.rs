//! Core device and stream identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute device class a buffer or engine instance is bound to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Host memory / CPU execution.
    #[default]
    Cpu,
    /// Accelerator memory / GPU execution.
    Gpu,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Cpu => write!(f, "CPU"),
            DeviceType::Gpu => write!(f, "GPU"),
        }
    }
}

/// A concrete device: type plus ordinal (GPU index, always 0 for CPU).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub device_type: DeviceType,
    pub device_id: u32,
}

impl DeviceHandle {
    /// The host CPU device.
    pub const CPU: Self = Self {
        device_type: DeviceType::Cpu,
        device_id: 0,
    };

    pub fn gpu(device_id: u32) -> Self {
        Self {
            device_type: DeviceType::Gpu,
            device_id,
        }
    }

    pub fn is_cpu(self) -> bool {
        self.device_type == DeviceType::Cpu
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device_type, self.device_id)
    }
}

/// Stream metadata set once per configuration.
///
/// Determines the size of every decoded output frame. The engine emits
/// fixed-format raw frames (3 bytes per pixel), so the frame size is
/// derived rather than negotiated per call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Byte size of one decoded frame (width * height * 3).
    pub fn frame_size(self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
