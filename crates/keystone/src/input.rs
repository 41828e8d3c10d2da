//! # Raw Input
//!
//! The host binds devices and sets plain booleans once per frame. Edge
//! detection (`just_pressed`) compares against the previous frame.

use keystone_shared::Direction;

/// Buttons the simulation understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Move up.
    Up,
    /// Move down.
    Down,
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Swing the sword.
    Attack,
    /// Fire an arrow.
    Fire,
    /// Drop a bomb.
    Bomb,
    /// Charge a dash while held.
    Dash,
    /// Toggle pause.
    Pause,
    /// Confirm on menus.
    Confirm,
    /// Leave the pause menu for the title.
    Quit,
}

/// Button states for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct InputState {
    /// Up held.
    pub up: bool,
    /// Down held.
    pub down: bool,
    /// Left held.
    pub left: bool,
    /// Right held.
    pub right: bool,
    /// Attack held.
    pub attack: bool,
    /// Fire held.
    pub fire: bool,
    /// Bomb held.
    pub bomb: bool,
    /// Dash held.
    pub dash: bool,
    /// Pause held.
    pub pause: bool,
    /// Confirm held.
    pub confirm: bool,
    /// Quit held.
    pub quit: bool,
}

impl InputState {
    /// Whether `action` is held.
    #[must_use]
    pub const fn is_down(&self, action: Action) -> bool {
        match action {
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Attack => self.attack,
            Action::Fire => self.fire,
            Action::Bomb => self.bomb,
            Action::Dash => self.dash,
            Action::Pause => self.pause,
            Action::Confirm => self.confirm,
            Action::Quit => self.quit,
        }
    }

    /// Returns a copy with `action` held.
    #[must_use]
    pub const fn with(mut self, action: Action) -> Self {
        match action {
            Action::Up => self.up = true,
            Action::Down => self.down = true,
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Attack => self.attack = true,
            Action::Fire => self.fire = true,
            Action::Bomb => self.bomb = true,
            Action::Dash => self.dash = true,
            Action::Pause => self.pause = true,
            Action::Confirm => self.confirm = true,
            Action::Quit => self.quit = true,
        }
        self
    }

    /// Direction requested by the held arrows. Vertical wins over
    /// horizontal, up over down, left over right.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        if self.up {
            Direction::Up
        } else if self.down {
            Direction::Down
        } else if self.left {
            Direction::Left
        } else if self.right {
            Direction::Right
        } else {
            Direction::None
        }
    }
}

/// Current and previous input, for edge detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputFrame {
    /// This frame.
    pub current: InputState,
    /// Last frame.
    pub previous: InputState,
}

impl InputFrame {
    /// Whether `action` is held this frame.
    #[inline]
    #[must_use]
    pub const fn is_down(&self, action: Action) -> bool {
        self.current.is_down(action)
    }

    /// Whether `action` went down this frame.
    #[inline]
    #[must_use]
    pub const fn just_pressed(&self, action: Action) -> bool {
        self.current.is_down(action) && !self.previous.is_down(action)
    }

    /// Installs the state for the next frame.
    pub fn set(&mut self, state: InputState) {
        self.current = state;
    }

    /// Ends the frame: the current state becomes the previous one.
    pub fn roll(&mut self) {
        self.previous = self.current;
    }
}
