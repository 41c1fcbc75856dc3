//! # Scene Core
//!
//! A small real-time entity/component runtime underlying a 3D scene.
//!
//! The crate owns three pieces of machinery and nothing else:
//!
//! - **Registry** ([`World`](ecs::World) / [`Entity`](ecs::Entity)): a
//!   factory and container for named, uniquely identified entities, each
//!   carrying an ordered set of capability components.
//! - **Scene graph** ([`Transform`](scene::Transform)): a parent/child tree
//!   of local positions and rotations with lazily recomputed, cached
//!   world-space state.
//! - **Scheduler** ([`Engine`]): a frame-paced loop that advances simulated
//!   time, drives variable-rate and fixed-rate behaviour passes, and signals
//!   a render collaborator.
//!
//! Rendering, input, asset loading, and gameplay are external collaborators
//! consumed through the narrow capability traits in [`ecs`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//! use std::sync::Arc;
//!
//! let world = Arc::new(World::new());
//! let player = world.create_entity("player");
//! player.transform().translate(Vec3::new(0.0, 0.0, 5.0), Space::World);
//!
//! let config = EngineConfig::default();
//! let mut engine = Engine::new(&config, Arc::clone(&world)).unwrap();
//! engine.run(&mut |world| {
//!     // walk world.entities() and draw
//!     let _ = world.len();
//! });
//! ```

pub mod core;
pub mod ecs;
pub mod foundation;
pub mod scene;

mod engine;

pub use engine::{Engine, StopSignal};

/// Common imports for runtime users.
pub mod prelude {
    pub use crate::{
        core::config::{ConfigError, EngineConfig},
        core::tasks::{Task, TaskQueue},
        ecs::{
            Behaviour, Collision, Component, ComponentBase, ComponentError, Entity, EntityId,
            GraphicsContext, Renderable, UpdateContext, World, WorldError,
        },
        foundation::{
            math::{axis_angle, Quat, Vec3},
            time::Clock,
        },
        scene::{SceneError, Space, Transform},
        Engine, StopSignal,
    };
}
