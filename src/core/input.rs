use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

pub const LANE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Lane {
    Left = 0,
    Down = 1,
    Up = 2,
    Right = 3,
}

impl Lane {
    pub const ALL: [Lane; LANE_COUNT] = [Lane::Left, Lane::Down, Lane::Up, Lane::Right];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Wraps any counter onto a lane, round-robin.
    #[inline(always)]
    pub const fn from_cycle(i: usize) -> Lane {
        match i % LANE_COUNT {
            0 => Lane::Left,
            1 => Lane::Down,
            2 => Lane::Up,
            _ => Lane::Right,
        }
    }
}

/// A device-independent input event. Everything device-specific (key codes,
/// touch geometry) is resolved here and nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterEvent {
    Lane(Lane),
    PauseToggle,
}

#[inline(always)]
pub fn lane_from_keycode(code: KeyCode) -> Option<Lane> {
    match code {
        KeyCode::ArrowLeft => Some(Lane::Left),
        KeyCode::ArrowDown => Some(Lane::Down),
        KeyCode::ArrowUp => Some(Lane::Up),
        KeyCode::ArrowRight => Some(Lane::Right),
        _ => None,
    }
}

/// Maps a press edge to a router event. Releases and key repeat produce
/// nothing; only the initial press of a lane key or the pause key counts.
pub fn route_key(code: KeyCode, pressed: bool, repeat: bool) -> Option<RouterEvent> {
    if !pressed || repeat {
        return None;
    }
    if code == KeyCode::Space {
        return Some(RouterEvent::PauseToggle);
    }
    lane_from_keycode(code).map(RouterEvent::Lane)
}

pub fn route_key_event(event: &KeyEvent) -> Option<RouterEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    route_key(code, event.state == ElementState::Pressed, event.repeat)
}

/// Derives a lane from a touch point's horizontal position within the play
/// surface: four equal-width zones. Points outside the surface are ignored.
pub fn lane_from_touch_x(x: f32, surface_width: f32) -> Option<Lane> {
    if !(surface_width > 0.0) || x < 0.0 || x >= surface_width {
        return None;
    }
    let zone = ((x / surface_width) * LANE_COUNT as f32) as usize;
    Some(Lane::from_cycle(zone.min(LANE_COUNT - 1)))
}

/// Touch counterpart of [`route_key`]. Multi-touch is supported by calling
/// this once per changed touch point.
pub fn route_touch(x: f32, surface_width: f32) -> Option<RouterEvent> {
    lane_from_touch_x(x, surface_width).map(RouterEvent::Lane)
}
