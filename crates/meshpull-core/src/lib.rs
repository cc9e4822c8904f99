//! Meshpull Core - Shared types for the meshpull renderer
//!
//! This crate provides the foundational types used by every other crate:
//! - Mathematical primitives (re-exported from glam)
//! - Transform and bounding-box types used to place models
//! - Linear RGBA colors, including the diagnostic fallback color
//! - Frame timing that drives animation playback

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{FrameClock, TimeConfig};
pub use types::{Aabb, Color, Transform};
