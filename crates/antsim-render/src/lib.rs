//! Presentation-side geometry shared by antsim frontends.
//!
//! The simulation core knows nothing about screens; this crate maps world
//! coordinates into a pannable viewport and, from there, onto whatever cell
//! grid a frontend draws with.

pub mod camera;
pub mod viewport;

pub use camera::{Camera, CameraConfig};
pub use viewport::Viewport;
