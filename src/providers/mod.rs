//! Background-Removal Provider Integration Module
//!
//! This module provides a uniform interface over third-party background
//! removal APIs and the fallback chain that sequences them.
//!
//! # Architecture
//!
//! ```text
//!                 ┌───────────────────┐
//!                 │   FallbackChain   │
//!                 └─────────┬─────────┘
//!                           │ priority order
//!                 ┌─────────┴─────────┐
//!                 │ BackgroundRemover │
//!                 └─────────┬─────────┘
//!              ┌────────────┴────────────┐
//!        ┌─────┴─────┐             ┌─────┴──────┐
//!        │ remove.bg │             │ removal.ai │
//!        └───────────┘             └────────────┘
//! ```

pub mod traits;
pub mod http_client;
pub mod fallback;
pub mod remove_bg;
pub mod removal_ai;

// Re-export commonly used types
pub use traits::{BackgroundRemover, ProviderError};
pub use fallback::{
    FallbackChain, FallbackListener, LogFallbackListener, RemovalError, DEFAULT_PROVIDER_TIMEOUT,
};
pub use remove_bg::REMOVE_BG_ENDPOINT;
pub use removal_ai::REMOVAL_AI_ENDPOINT;
