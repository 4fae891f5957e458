//! Core, DOM-free session and feed engine.
pub mod clock;
pub mod config;
pub mod feed;
pub mod routes;
pub mod search;
pub mod session;
pub mod store;
pub mod token;
pub mod watchlist;
