//! Network layer: transport seam, auth middleware and the typed catalog client.

pub mod api;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod interceptor;
pub mod transport;
