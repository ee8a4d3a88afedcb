//! nsgeo Infrastructure Layer
//!
//! Adapters behind the application ports: the multiplexed UDP DNS client,
//! the MaxMind country reader, the public suffix list and the file-backed
//! input and output.
pub mod dns;
pub mod geoip;
pub mod input;
pub mod output;
pub mod public_suffix;
