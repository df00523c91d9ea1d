//! Viewer application
//!
//! Wires the registry, session pool, scheduler, compositor, and input
//! path into the single render loop, configured by [`ViewerConfig`].

pub mod config;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::Viewer;
