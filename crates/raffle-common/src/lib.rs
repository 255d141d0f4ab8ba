//! Shared utilities for the raffle deployment tooling

pub mod logging;
