//! Doors: grid cells that block like walls while closed.

/// Wall texture variant used for closed doors.
pub const DOOR_TEXTURE: u8 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DoorEvent {
    Opened,
    Closed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Door {
    open: bool,
    /// World clock (seconds) at the last opening.
    opened_at: f32,
}

impl Door {
    pub fn closed() -> Self {
        Self { open: false, opened_at: 0.0 }
    }

    pub fn is_open(&self) -> bool { self.open }
    pub fn opened_at(&self) -> f32 { self.opened_at }

    pub fn open(&mut self, now: f32) {
        self.open = true;
        self.opened_at = now;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Open for at least `stay_open` seconds.
    pub fn has_expired(&self, now: f32, stay_open: f32) -> bool {
        self.open && now - self.opened_at >= stay_open
    }
}
