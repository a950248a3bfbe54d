//! Control surface
//!
//! Maps the named control endpoints (`cpu`, `gpu`, `cache`, `system_agent`,
//! `analog_io`) onto voltage planes and exposes the file-like show/store
//! pair the CLI drives. This is the error boundary: internal distinctions
//! (parse failure, overvolt, unknown name) collapse into the single
//! invalid-argument signal, everything else is success.

use crate::codec;
use crate::common::{FpSession, MsrIo};
use crate::controller::VoltageController;
use crate::error::{Result, UndervoltError};
use undervolt_raw::PlaneIndex;

/// Resolve an endpoint name to its voltage plane
pub fn plane_for_endpoint(name: &str) -> Option<PlaneIndex> {
    match name {
        "cpu" => Some(PlaneIndex::Cpu),
        "gpu" => Some(PlaneIndex::Gpu),
        "cache" => Some(PlaneIndex::Cache),
        "system_agent" => Some(PlaneIndex::SystemAgent),
        "analog_io" => Some(PlaneIndex::AnalogIo),
        _ => None,
    }
}

/// Endpoint name for a voltage plane
pub fn endpoint_name(plane: PlaneIndex) -> &'static str {
    match plane {
        PlaneIndex::Cpu => "cpu",
        PlaneIndex::Gpu => "gpu",
        PlaneIndex::Cache => "cache",
        PlaneIndex::SystemAgent => "system_agent",
        PlaneIndex::AnalogIo => "analog_io",
    }
}

pub struct ControlSurface<M: MsrIo> {
    controller: VoltageController<M>,
}

impl<M: MsrIo> ControlSurface<M> {
    pub fn new(controller: VoltageController<M>) -> Self {
        Self { controller }
    }

    /// Read an endpoint: the current offset in millivolts, two decimals
    pub fn show(&self, endpoint: &str) -> Result<String> {
        let plane = self.resolve(endpoint)?;
        let offset = self.controller.read_offset(plane);
        tracing::debug!("Read offset 0x{:08x} for plane {endpoint}", offset.bits());

        let fp = FpSession::acquire();
        let mv = codec::offset_to_mv(offset, &fp);
        Ok(codec::format_mv(mv, &fp))
    }

    /// Write an endpoint: the desired millivolt offset, <= 0
    pub fn store(&self, endpoint: &str, text: &str) -> Result<()> {
        let plane = self.resolve(endpoint)?;
        // A trailing newline from shell redirection is not part of the value.
        let offset = self
            .controller
            .parse_and_guard(text.trim_end().as_bytes())
            .map_err(boundary)?;
        self.controller.write_offset(plane, offset);
        Ok(())
    }

    fn resolve(&self, endpoint: &str) -> Result<PlaneIndex> {
        plane_for_endpoint(endpoint)
            .ok_or_else(|| UndervoltError::UnknownPlane(endpoint.to_string()))
            .map_err(boundary)
    }
}

/// Collapse internal error kinds into the boundary's invalid-argument signal
fn boundary(err: UndervoltError) -> UndervoltError {
    match err {
        UndervoltError::InvalidCharacter { .. }
        | UndervoltError::Overflow
        | UndervoltError::Overvolt { .. }
        | UndervoltError::UnknownPlane(_) => {
            tracing::error!("Rejected request: {err}");
            UndervoltError::InvalidArgument(err.to_string())
        }
        other => other,
    }
}
