//! Functional core for loginbridge.
//!
//! - `csrf`: the split anti-forgery token carried through the provider `state`
//! - `provider`: provider settings, the provider client seam and settings resolution
//! - `flow`: the redirect initiator and the callback reconciler

pub mod csrf;
pub mod flow;
pub mod provider;

#[cfg(test)]
mod testing;
