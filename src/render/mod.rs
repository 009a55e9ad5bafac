//! Rendering: CPU framebuffer, ray casting, sprite projection.
//!
//! Re-exports:
//! - `framebuffer`: CPU framebuffer and column spans
//! - `textures`: Texture/pixmap manager with procedural fallbacks
//! - `casters`: Wall ray casting and the depth buffer
//! - `projector`: Billboard projection, occlusion and column owners
//! - `render3d`: Column renderer for walls, sprites and scene

pub mod framebuffer;
pub mod textures;
pub mod casters;
pub mod projector;
pub mod render3d;
