//! Aggregator connectivity for Kitty.
//!
//! This crate owns the HTTP side of bank syncing: a REST client for the
//! aggregator API plus the wire models it parses. The sync orchestration
//! itself lives in `kitty-core`; this crate only supplies the
//! `AggregatorClientTrait` implementation it plugs into.

pub mod client;
pub(crate) mod models;

pub use client::AggregatorApiClient;
