//! tsdf_mesher application library
//!
//! Exposes the configuration layer so it can be loaded and tested outside
//! the binary.

pub mod config;
