//! Integration test common infrastructure.
//!
//! Provides a fake IRC server endpoint and a handle to a spawned bot
//! process for asserting on wire-level flows.

pub mod server;

#[allow(unused_imports)]
pub use server::{BotProcess, FakeServer};
