//! Runtime transfer backend selection.

use std::sync::Arc;

use tracing::info;

use sieve_common::error::TransferError;
use sieve_common::ports::BufferTransfer;
use sieve_common::types::DeviceType;

use crate::host::HostTransfer;

/// Select the transfer backend for a device type.
///
/// Accelerator backends register here when compiled in; without one, a
/// GPU request fails at construction rather than degrading silently.
pub fn make_transfer(device: DeviceType) -> Result<Arc<dyn BufferTransfer>, TransferError> {
    match device {
        DeviceType::Cpu => {
            info!(device = %device, "using host transfer backend");
            Ok(Arc::new(HostTransfer::new()))
        }
        DeviceType::Gpu => Err(TransferError::UnsupportedDevice { device }),
    }
}
