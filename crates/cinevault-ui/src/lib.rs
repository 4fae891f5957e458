#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Cinevault web client.
//!
//! The session and feed engine lives in DOM-free modules (`core`, `services`,
//! `features`) that build and test natively; `app` adapts them to the browser.

pub mod context;
pub mod core;
pub mod features;
pub mod models;
pub mod services;

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::{app_context, run_app};

#[cfg(test)]
mod testing;
