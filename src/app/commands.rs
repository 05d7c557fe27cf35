//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (OTA handler,
//! web UI, serial console) that the
//! [`AppService`](super::service::AppService) acts upon synchronously.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// A firmware update is about to start and may stall the scheduler.
    /// The fan is forced off before the command returns.
    PrepareFirmwareUpdate,

    /// Operator request: stop the purge fan now.
    ForceFanOff,
}
