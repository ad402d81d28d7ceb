/// Timing curve applied to every photo move.
///
/// `OutCubic` settles photos gently onto their slots; `OutBack` overshoots the
/// slot slightly before settling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    OutCubic,
    OutBack,
    InOutSine,
}

/// Overshoot of `OutBack`; peaks about 10% past the target.
const BACK_OVERSHOOT: f64 = 1.701_58;

impl Ease {
    /// Eased progress for `t` clamped to `[0, 1]`. Endpoints map to themselves.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::OutBack => {
                let u = t - 1.0;
                1.0 + (BACK_OVERSHOOT + 1.0) * u.powi(3) + BACK_OVERSHOOT * u.powi(2)
            }
            Self::InOutSine => (1.0 - (std::f64::consts::PI * t).cos()) / 2.0,
        }
    }

    /// Whether intermediate values may leave `[0, 1]`.
    pub fn overshoots(self) -> bool {
        matches!(self, Self::OutBack)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
