//! # KEYSTONE Core
//!
//! The entity and component store of the engine.
//!
//! ## Architecture Rules
//!
//! 1. **Ids are never reused** - a stale id simply misses every lookup
//! 2. **Presence is fixed at spawn** - components are inserted once and only
//!    their values change afterwards
//! 3. **Configuration is data** - entities are built from plain records, and
//!    named presets are injected, never global
//!
//! ## Example
//!
//! ```rust,ignore
//! use keystone_core::{build_entity_from_config, IdAllocator, PresetRegistry, World};
//!
//! let presets = PresetRegistry::builtin();
//! let mut ids = IdAllocator::new();
//! let mut world = World::new();
//!
//! let config = presets.instantiate("skeleton", 64.0, 48.0)?;
//! let bundle = build_entity_from_config(&config, ids.next_id(), 60);
//! world.spawn(bundle);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod ecs;
pub mod error;
pub mod preset;

pub use builder::{build_entity_from_config, EntityBundle};
pub use config::{
    AnimationConfig, DashConfig, EntityConfig, HealthConfig, HitboxConfig, MovementConfig,
    SequenceConfig, TemporaryConfig,
};
pub use ecs::{
    Animation, Coins, Component, ComponentStorage, Dash, EntityId, EntityMeta, Expiry,
    Health, IdAllocator, Ignore, Invincible, Loot, Movement, Pattern, Sequence, Spatial, Temporary,
    Toggler, Warp, World,
};
pub use error::{CoreError, CoreResult};
pub use preset::PresetRegistry;
