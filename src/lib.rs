//! Model Inference Firewall library.
//!
//! An HTTP gateway in front of a hosted language-model endpoint. Every
//! inference request is rate limited per client, screened by a rule-based
//! content filter, and only then forwarded upstream.

// Core subsystems
pub mod config;
pub mod filter;
pub mod http;
pub mod pipeline;
pub mod upstream;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::FirewallConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Outcome, RequestPipeline};
