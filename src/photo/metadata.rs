use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::foundation::error::{ShowcaseError, ShowcaseResult};
use crate::foundation::math::{Rng64, hash_str};

/// Largest fan rotation, reached by a fully implausible evaluated photo.
pub const MAX_EVALUATION_ROTATION_DEG: f64 = 32.0;

/// Bound of the stable per-id rotation used when a photo has no evaluation.
pub const FALLBACK_ROTATION_DEG: f64 = 4.0;

/// Externally supplied photo record.
///
/// Recognized fields are typed; everything else the metadata source sends is kept
/// verbatim in `extra` so it round-trips untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(
        default,
        alias = "authorId",
        deserialize_with = "de_opt_stringish",
        skip_serializing_if = "Option::is_none"
    )]
    pub author_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub plausibility: Option<f64>,
    #[serde(default, alias = "favorableFuture", skip_serializing_if = "Option::is_none")]
    pub favorable_future: Option<String>,
    #[serde(
        default,
        alias = "transitionBarPosition",
        skip_serializing_if = "Option::is_none"
    )]
    pub transition_bar_position: Option<String>,
    #[serde(default, alias = "layoutX", skip_serializing_if = "Option::is_none")]
    pub layout_x: Option<f64>,
    #[serde(default, alias = "layoutY", skip_serializing_if = "Option::is_none")]
    pub layout_y: Option<f64>,
    #[serde(
        default,
        alias = "moderationStatus",
        deserialize_with = "de_opt_lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub moderation_status: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn de_opt_stringish<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers may arrive as JSON numbers or numeric strings; anything else reads as absent.
fn lenient_f64(v: Option<Value>) -> Option<f64> {
    let x = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    x.filter(|x| x.is_finite())
}

fn de_opt_lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(Option::<Value>::deserialize(de)?))
}

fn de_opt_lenient_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    if let Some(i) = v.as_ref().and_then(Value::as_i64) {
        return Ok(Some(i));
    }
    Ok(lenient_f64(v).map(|x| x.trunc() as i64))
}

/// Favorable-future classification after normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorableFuture {
    Prefer,
    Prevent,
    Uncertain,
    /// No usable answer (`''` on the wire).
    Unset,
}

impl FavorableFuture {
    /// Folds free text into the two-state prefer/prevent families.
    ///
    /// "mostly prefer" and friends land in their family at full strength.
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim().to_ascii_lowercase();
        if s == "yes" || s.contains("prefer") {
            Self::Prefer
        } else if s == "no" || s.contains("prevent") {
            Self::Prevent
        } else if s.contains("uncertain") {
            Self::Uncertain
        } else {
            Self::Unset
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prefer => "prefer",
            Self::Prevent => "prevent",
            Self::Uncertain => "uncertain",
            Self::Unset => "",
        }
    }

    /// `+1` for prefer, `-1` for prevent, `0` otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Self::Prefer => 1.0,
            Self::Prevent => -1.0,
            Self::Uncertain | Self::Unset => 0.0,
        }
    }
}

/// Where on the transition bar the author placed the photo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionBar {
    Before,
    During,
    After,
    Unclear,
}

impl TransitionBar {
    /// Empty input has no position at all; other unknown text is `Unclear`.
    pub fn normalize(raw: &str) -> Option<Self> {
        let s = raw.trim().to_ascii_lowercase();
        if s.is_empty() {
            return None;
        }
        Some(match s.as_str() {
            "before" => Self::Before,
            "during" => Self::During,
            "after" => Self::After,
            _ => Self::Unclear,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::During => "during",
            Self::After => "after",
            Self::Unclear => "unclear",
        }
    }
}

/// Clamp to `[0, 100]` and snap to the nearest multiple of 25.
pub fn normalize_plausibility(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    let snapped = (raw.clamp(0.0, 100.0) / 25.0).round() * 25.0;
    Some(snapped as u8)
}

impl PhotoMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn plausibility_bucket(&self) -> Option<u8> {
        self.plausibility.and_then(normalize_plausibility)
    }

    pub fn favorable(&self) -> FavorableFuture {
        self.favorable_future
            .as_deref()
            .map_or(FavorableFuture::Unset, FavorableFuture::normalize)
    }

    pub fn transition_bar(&self) -> Option<TransitionBar> {
        self.transition_bar_position
            .as_deref()
            .and_then(TransitionBar::normalize)
    }

    /// Signed fan score: `±(1 - p/100)`, `0` when either input is missing.
    pub fn evaluation_score(&self) -> f64 {
        match self.plausibility_bucket() {
            Some(p) => self.favorable().sign() * (1.0 - f64::from(p) / 100.0),
            None => 0.0,
        }
    }

    /// Fan rotation derived from the evaluation, `None` when it cannot be derived.
    pub fn evaluation_rotation_deg(&self) -> Option<f64> {
        self.plausibility_bucket()?;
        if self.favorable() == FavorableFuture::Unset {
            return None;
        }
        Some(self.evaluation_score() * MAX_EVALUATION_ROTATION_DEG)
    }

    /// Small rotation that only depends on the photo id.
    pub fn fallback_rotation_deg(&self) -> f64 {
        let mut rng = Rng64::new(hash_str(&self.id));
        (rng.next_f64_01() * 2.0 - 1.0) * FALLBACK_ROTATION_DEG
    }

    pub fn is_evaluated(&self) -> bool {
        self.plausibility_bucket().is_some()
            || self.favorable() != FavorableFuture::Unset
            || self.transition_bar().is_some()
    }

    pub fn is_rejected(&self) -> bool {
        self.moderation_status == Some(0)
    }

    /// Persisted normalized override, present only when both axes are finite.
    pub fn layout_override(&self) -> Option<(f64, f64)> {
        match (self.layout_x, self.layout_y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                Some((x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)))
            }
            _ => None,
        }
    }

    pub fn set_layout(&mut self, nx: f64, ny: f64) {
        self.layout_x = Some(nx.clamp(-1.0, 1.0));
        self.layout_y = Some(ny.clamp(-1.0, 1.0));
    }

    pub fn clear_layout(&mut self) {
        self.layout_x = None;
        self.layout_y = None;
    }

    pub fn clear_evaluation(&mut self) {
        self.plausibility = None;
        self.favorable_future = None;
        self.transition_bar_position = None;
    }

    /// Merge a partial record into this one. `null` clears a field.
    ///
    /// The id is immutable; a patch that tries to change it is rejected.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> ShowcaseResult<()> {
        if let Some(id) = patch.get("id")
            && id.as_str() != Some(self.id.as_str())
        {
            return Err(ShowcaseError::validation(format!(
                "metadata patch for '{}' may not change the id",
                self.id
            )));
        }

        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(m) => m,
            _ => return Err(ShowcaseError::serde("photo metadata is not an object")),
        };
        for (k, v) in patch {
            let key = canonical_key(k);
            if v.is_null() {
                merged.remove(key);
            } else {
                merged.insert(key.to_string(), v.clone());
            }
        }
        *self = serde_json::from_value(Value::Object(merged))?;
        Ok(())
    }
}

fn canonical_key(k: &str) -> &str {
    match k {
        "createdAt" => "created_at",
        "authorId" => "author_id",
        "favorableFuture" => "favorable_future",
        "transitionBarPosition" => "transition_bar_position",
        "layoutX" => "layout_x",
        "layoutY" => "layout_y",
        "moderationStatus" => "moderation_status",
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/photo/metadata.rs"]
mod tests;
