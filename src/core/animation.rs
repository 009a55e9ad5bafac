//! Per-entity animation clock driven by explicit elapsed time.
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Walking,
    Firing,
    Damaged,
    Dead,
}

impl EnemyState {
    pub fn is_repeating(self) -> bool {
        matches!(self, EnemyState::Idle | EnemyState::Walking | EnemyState::Firing)
    }
}

/// Number of frames in each state's sequence. Missing fields keep their defaults.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSet {
    pub idle: usize,
    pub walking: usize,
    pub firing: usize,
    pub damaged: usize,
    pub dead: usize,
}

impl Default for AnimationSet {
    fn default() -> Self {
        Self { idle: 1, walking: 4, firing: 3, damaged: 2, dead: 3 }
    }
}

impl AnimationSet {
    pub fn len(&self, state: EnemyState) -> usize {
        let n = match state {
            EnemyState::Idle => self.idle,
            EnemyState::Walking => self.walking,
            EnemyState::Firing => self.firing,
            EnemyState::Damaged => self.damaged,
            EnemyState::Dead => self.dead,
        };
        n.max(1)
    }
}

#[derive(Clone, Debug)]
pub struct Animator {
    state: EnemyState,
    frame: usize,
    since_advance: f32,
    interval: f32,
    set: AnimationSet,
}

impl Animator {
    pub fn new(set: AnimationSet, interval: f32) -> Self {
        Self { state: EnemyState::Idle, frame: 0, since_advance: 0.0, interval, set }
    }

    pub fn state(&self) -> EnemyState { self.state }
    pub fn frame(&self) -> usize { self.frame }
    pub fn frame_count(&self) -> usize { self.set.len(self.state) }

    pub fn is_last_frame(&self) -> bool {
        self.frame + 1 == self.frame_count()
    }

    /// Resets the frame and the advance baseline, even for the same state.
    pub fn set_state(&mut self, state: EnemyState) {
        self.state = state;
        self.frame = 0;
        self.since_advance = 0.0;
    }

    /// Advances at most one frame. Returns true when the frame index changed.
    pub fn advance(&mut self, elapsed: f32) -> bool {
        if self.state == EnemyState::Idle
            || (self.state == EnemyState::Dead && self.is_last_frame())
        {
            return false;
        }
        self.since_advance += elapsed;
        if self.since_advance < self.interval {
            return false;
        }
        self.since_advance = 0.0;
        self.frame += 1;
        if self.state.is_repeating() {
            self.frame %= self.frame_count();
        } else if self.frame >= self.frame_count() {
            self.set_state(EnemyState::Idle);
        }
        true
    }
}
