use std::collections::VecDeque;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::foundation::core::Position3D;
use crate::photo::data::AnimationState;

/// Position + opacity interpolation over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: Position3D,
    pub to: Position3D,
    pub from_opacity: f64,
    pub to_opacity: f64,
    pub duration: Duration,
    pub ease: Ease,
}

impl Tween {
    pub fn position(from: Position3D, to: Position3D, opacity: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            from_opacity: opacity,
            to_opacity: opacity,
            duration,
            ease: Ease::default(),
        }
    }

    pub fn with_opacity(mut self, from: f64, to: f64) -> Self {
        self.from_opacity = from;
        self.to_opacity = to;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn sample(&self, elapsed: Duration) -> (Position3D, f64) {
        let t = self.ease.apply(self.progress(elapsed));
        let pos = self.from.lerp(self.to, t);
        let opacity = self.from_opacity + (self.to_opacity - self.from_opacity) * t;
        (pos, opacity)
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// One step of a multi-stage animation chain.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Jump to a position/opacity without interpolation.
    Place { at: Position3D, opacity: f64 },
    State(AnimationState),
    Delay(Duration),
    /// Tween that starts wherever the photo currently is.
    MoveTo {
        to: Position3D,
        to_opacity: Option<f64>,
        duration: Duration,
    },
    Tween(Tween),
    /// Asks the render adapter for the high- or low-resolution texture.
    Detail { high_res: bool },
}

/// A chain of stages for one photo, valid only while the photo's generation matches.
#[derive(Clone, Debug)]
pub struct Track {
    pub photo_id: String,
    pub generation: u64,
    pub stages: VecDeque<Stage>,
}

impl Track {
    pub fn new(photo_id: impl Into<String>, generation: u64) -> Self {
        Self {
            photo_id: photo_id.into(),
            generation,
            stages: VecDeque::new(),
        }
    }

    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push_back(stage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
