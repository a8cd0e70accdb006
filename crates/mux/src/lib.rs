//! Mux video provider integration.
//!
//! Provides the provider abstraction ([`provider::VideoProvider`]), the
//! REST client for the Mux Video API, webhook signature verification and
//! event decoding, and the ingest service (upload session creation, asset
//! state reconciliation, manual sync).

pub mod client;
pub mod ingest;
pub mod provider;
pub mod webhook;
