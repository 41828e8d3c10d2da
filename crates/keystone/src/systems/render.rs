//! # Render System
//!
//! Builds the frame's draw list: what to draw, where, and which sprite
//! frame. Resolving frame indices to pixels is the presentation layer's
//! job.

use keystone_core::EntityId;
use keystone_shared::{Category, Rect};

use super::{Capability, FrameContext, Membership, System};
use crate::error::GameResult;

/// One entry of the draw list.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    /// Entity drawn.
    pub entity: EntityId,
    /// Its category.
    pub category: Category,
    /// Draw layer, lower first.
    pub layer: u8,
    /// Where to draw.
    pub rect: Rect,
    /// Playing sequence, if animated.
    pub sequence: Option<String>,
    /// Sprite frame, if animated.
    pub frame: Option<u32>,
}

/// Draw commands for one frame, sorted by layer then entity id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Commands in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether `id` is drawn this frame.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.commands.iter().any(|command| command.entity == id)
    }

    /// Empties the list.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Produces the draw list.
#[derive(Debug, Default)]
pub struct RenderSystem {
    members: Membership,
}

impl RenderSystem {
    /// Creates an empty render system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for RenderSystem {
    fn name(&self) -> &'static str {
        "render"
    }

    fn capability(&self) -> Capability {
        Capability::Drawable
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        let world = &*ctx.world;
        let list = &mut ctx.draw.commands;
        list.clear();
        for id in self.members.ids() {
            if world.is_ignored(id) {
                continue;
            }
            let (Some(category), Some(rect)) = (world.category(id), world.rect(id)) else {
                continue;
            };
            let animation = world.animation.get(id);
            list.push(DrawCommand {
                entity: id,
                category,
                layer: category.draw_layer(),
                rect,
                sequence: animation.map(|a| a.current.clone()),
                frame: animation.and_then(keystone_core::Animation::current_frame),
            });
        }
        list.sort_by_key(|command| (command.layer, command.entity));
        Ok(())
    }
}
