//! Mock identity provider for development and testing.
//!
//! Serves login pages for `MockProvider` so the whole redirect/callback round
//! trip can run without a real provider.

mod server;
mod templates;

pub use server::MockIdpServer;
