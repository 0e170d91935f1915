//! Application state for the web layer.

use crate::station::StationHandle;

/// Shared application state.
///
/// The station task owns everything else; handlers talk to it through
/// its handle.
#[derive(Clone)]
pub struct AppState {
    pub station: StationHandle,
}

impl AppState {
    pub fn new(station: StationHandle) -> Self {
        Self { station }
    }
}
