//! Core game types and logic (data, input, AI, world).
//!
//! Re-exports:
//! - `maze`: Grid coordinates, world positions and level parsing
//! - `door`: Door cells and their open/close timing
//! - `pathfinder`: A* next-hop search over a `GridMap`
//! - `animation`: Enemy states and the frame clock
//! - `entity`: Ids, `Damageable` and `Billboard`
//! - `player`: Player movement and health
//! - `enemy`: Enemy state machine, pursuit and firing
//! - `item`: Floor pickups
//! - `world`: Level state and the per-tick update
//! - `process_events`: Input handling and movement

pub mod maze;
pub mod door;
pub mod pathfinder;
pub mod animation;
pub mod entity;
pub mod player;
pub mod enemy;
pub mod item;
pub mod world;
pub mod process_events;
