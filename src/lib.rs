//! Grid-based raycasting shooter: maze, enemy AI, sprite projection and a CPU renderer.

pub mod audio_manager;
pub mod config;
pub mod core;
pub mod error;
pub mod render;

pub use config::GameConfig;
pub use error::GameError;
