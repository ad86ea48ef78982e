//! 3D Mathematics Library
//!
//! This crate provides the small vector type used by the TSDF mesher.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components

mod vec3;

pub use vec3::Vec3;
