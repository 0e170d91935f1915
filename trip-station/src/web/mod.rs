//! Web layer for the station.
//!
//! One page per station: a search form, and the result of a search when a
//! destination is given. Browsers get HTML; everything else gets JSON.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
