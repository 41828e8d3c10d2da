//! # Timer System
//!
//! Counts down `Temporary` lifetimes and invincibility windows, one tick
//! per frame. Expiry actions are queued as commands, never executed in
//! place.

use keystone_core::Expiry;

use super::{Capability, FrameContext, Membership, System};
use crate::error::GameResult;

/// Decrements frame countdowns.
#[derive(Debug, Default)]
pub struct TimerSystem {
    members: Membership,
}

impl TimerSystem {
    /// Creates an empty timer system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for TimerSystem {
    fn name(&self) -> &'static str {
        "timers"
    }

    fn capability(&self) -> Capability {
        Capability::Timed
    }

    fn members(&self) -> &Membership {
        &self.members
    }

    fn members_mut(&mut self) -> &mut Membership {
        &mut self.members
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> GameResult<()> {
        for id in self.members.ids() {
            if let Some(invincible) = ctx.world.invincible.get_mut(id) {
                if let Some(frames) = invincible.frames {
                    let left = frames.saturating_sub(1);
                    if left == 0 {
                        invincible.enabled = false;
                        invincible.frames = None;
                    } else {
                        invincible.frames = Some(left);
                    }
                }
            }

            let Some(temporary) = ctx.world.temporary.get_mut(id) else {
                continue;
            };
            temporary.remaining = temporary.remaining.saturating_sub(1);
            if temporary.remaining > 0 {
                continue;
            }
            let expiry = temporary.expiry.clone();
            if let Expiry::Spawn { preset } = expiry {
                if let Some(rect) = ctx.world.rect(id) {
                    let (x, y) = rect.center();
                    ctx.commands.spawn_centered(preset, x, y);
                }
            }
            ctx.commands.despawn(id);
            tracing::debug!(%id, "temporary entity expired");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystone_core::Invincible;

    use crate::systems::testing::Fixture;
    use crate::systems::Command;

    #[test]
    fn test_explosion_expires_into_despawn() {
        let mut fx = Fixture::new(TimerSystem::new());
        let explosion = fx.spawn("explosion", 0.0, 0.0);
        let frames = fx.world.temporary.get(explosion).unwrap().remaining;

        for _ in 0..frames - 1 {
            fx.step();
        }
        assert!(fx.res.commands.is_empty());

        fx.step();
        assert_eq!(fx.res.commands.drain(), vec![Command::Despawn(explosion)]);
    }

    #[test]
    fn test_bomb_expires_into_explosion() {
        let mut fx = Fixture::new(TimerSystem::new());
        let bomb = fx.spawn("bomb", 40.0, 40.0);
        fx.world.temporary.get_mut(bomb).unwrap().remaining = 1;

        fx.step();
        assert!(fx.res.commands.has_spawn("explosion"));
        assert_eq!(fx.res.commands.drain().last(), Some(&Command::Despawn(bomb)));
    }

    #[test]
    fn test_invincibility_window_wears_off() {
        let mut fx = Fixture::new(TimerSystem::new());
        let player = fx.spawn("player", 0.0, 0.0);
        *fx.world.invincible.get_mut(player).unwrap() = Invincible {
            enabled: true,
            frames: Some(2),
        };

        fx.step();
        assert!(fx.world.is_invincible(player));
        fx.step();
        assert!(!fx.world.is_invincible(player));
        assert!(fx.res.commands.is_empty());
    }

    #[test]
    fn test_permanent_invincibility_stays() {
        let mut fx = Fixture::new(TimerSystem::new());
        let blade = fx.spawn("blade", 0.0, 0.0);
        for _ in 0..100 {
            fx.step();
        }
        assert!(fx.world.is_invincible(blade));
    }
}
