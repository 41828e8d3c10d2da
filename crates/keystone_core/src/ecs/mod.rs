//! # Entity Component Store
//!
//! ## Design Philosophy
//!
//! - One sparse storage per component kind, keyed by entity id
//! - Entity records carry an immutable category and a component bitmask
//! - Iteration is always in ascending id order, so every pass over the
//!   store is frame-deterministic

mod component;
mod entity;
mod storage;
mod world;

pub use component::{
    Animation, Coins, Component, Dash, Expiry, Health, Ignore, Invincible, Loot, Movement,
    Pattern, Sequence, Spatial, Temporary, Toggler, Warp,
};
pub use entity::{EntityId, EntityMeta, IdAllocator};
pub use storage::ComponentStorage;
pub use world::World;
