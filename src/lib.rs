//! Desktop client for a deployed FundMe funding contract.
//!
//! The binary wires an egui front end to a single background service task
//! that talks JSON-RPC to a wallet bridge. Everything below the view layer
//! is plain library code so the session logic is testable without a display
//! or a live provider.

pub mod app;
pub mod config;
pub mod contract;
pub mod events;
pub mod provider;
pub mod service;
pub mod state;
pub mod units;
pub mod view;
