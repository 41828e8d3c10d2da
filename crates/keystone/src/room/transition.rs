//! Slide and warp transitions between rooms.
//!
//! A slide runs for `total` frames. With `elapsed = total - timer`, the
//! scroll offset is `elapsed / total * extent`, where the extent is the
//! active-area width for left/right slides and its height for up/down
//! slides. The outgoing room, the incoming room and the player all move by
//! that same pixel offset, so they cross the seam together. A player that
//! overhangs the edge ends the slide overhanging the entry edge by the same
//! amount and is clamped inside when the room is handed over.
//!
//! A warp is a one-frame transition with no scrolling.

use keystone_shared::{Direction, Rect, Side};

/// How the room change is presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionStyle {
    /// Scroll toward the neighboring room.
    #[default]
    Slide,
    /// Jump straight to the destination.
    Warp,
}

/// Background offsets for the presentation layer during a slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionView {
    /// Draw offset of the room being left.
    pub outgoing: (f64, f64),
    /// Draw offset of the room being entered; `None` on a bounce.
    pub incoming: Option<(f64, f64)>,
    /// Destination room, 0 on a bounce.
    pub next_room: u32,
}

/// Transient transition record. Inactive means no transition math runs.
#[derive(Clone, Debug)]
pub struct RoomTransition {
    active: bool,
    side: Side,
    style: TransitionStyle,
    timer: u32,
    total: u32,
    next_room: u32,
    player_start: Rect,
}

impl RoomTransition {
    /// Creates an inactive record for slides lasting `slide_frames`.
    #[must_use]
    pub fn new(slide_frames: u32) -> Self {
        Self {
            active: false,
            side: Side::Top,
            style: TransitionStyle::Slide,
            timer: 0,
            total: slide_frames.max(1),
            next_room: 0,
            player_start: Rect::default(),
        }
    }

    /// Arms a slide across `side` toward `next_room` (0 for a bounce).
    pub fn begin_slide(&mut self, side: Side, next_room: u32, player: Rect) {
        self.active = true;
        self.side = side;
        self.style = TransitionStyle::Slide;
        self.timer = self.total;
        self.next_room = next_room;
        self.player_start = player;
    }

    /// Arms a warp to `target`, completing on the next tick.
    pub fn begin_warp(&mut self, target: u32, player: Rect) {
        self.active = true;
        self.style = TransitionStyle::Warp;
        self.timer = 1;
        self.next_room = target;
        self.player_start = player;
    }

    /// Decrements the timer if it is still running. Returns what is left.
    pub fn tick(&mut self) -> u32 {
        if self.active && self.timer > 0 {
            self.timer -= 1;
        }
        self.timer
    }

    /// Deactivates the record and returns the destination (0 on a bounce).
    pub fn finish(&mut self) -> u32 {
        self.active = false;
        self.timer = 0;
        self.next_room
    }

    /// Whether a transition is armed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the timer ran out on an armed transition.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.active && self.timer == 0
    }

    /// Edge being crossed.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Slide or warp.
    #[must_use]
    pub const fn style(&self) -> TransitionStyle {
        self.style
    }

    /// Frames left.
    #[must_use]
    pub const fn timer(&self) -> u32 {
        self.timer
    }

    /// Slide length in frames.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Resolved destination.
    #[must_use]
    pub const fn next_room(&self) -> u32 {
        self.next_room
    }

    /// Whether the slide leads nowhere.
    #[must_use]
    pub const fn is_bounce(&self) -> bool {
        self.next_room == 0
    }

    /// Fraction of the slide completed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let total = match self.style {
            TransitionStyle::Slide => self.total,
            TransitionStyle::Warp => 1,
        };
        f64::from(total - self.timer.min(total)) / f64::from(total)
    }

    /// Pixel offset along the slide axis.
    #[must_use]
    pub fn offset(&self, extent: f64) -> f64 {
        self.progress() * extent
    }

    fn extent(&self, width: f64, height: f64) -> f64 {
        match self.side {
            Side::Left | Side::Right => width,
            Side::Top | Side::Bottom => height,
        }
    }

    /// Background offsets, while a slide is active.
    #[must_use]
    pub fn view(&self, width: f64, height: f64) -> Option<TransitionView> {
        if !self.active || self.style != TransitionStyle::Slide {
            return None;
        }
        if self.is_bounce() {
            return Some(TransitionView {
                outgoing: (0.0, 0.0),
                incoming: None,
                next_room: 0,
            });
        }
        let extent = self.extent(width, height);
        let offset = self.offset(extent);
        let (dx, dy) = Direction::from(self.side).delta();
        Some(TransitionView {
            outgoing: (-dx * offset, -dy * offset),
            incoming: Some((dx * (extent - offset), dy * (extent - offset))),
            next_room: self.next_room,
        })
    }

    /// Where the player is drawn this frame.
    #[must_use]
    pub fn player_rect(&self, width: f64, height: f64) -> Rect {
        let start = self.player_start;
        if !self.active || self.style != TransitionStyle::Slide || self.is_bounce() {
            return start;
        }
        let travel = self.offset(self.extent(width, height));
        start.step(Direction::from(self.side).opposite(), travel)
    }
}
