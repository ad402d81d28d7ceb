use std::collections::BTreeMap;

use crate::photo::metadata::{FavorableFuture, PhotoMetadata, TransitionBar, normalize_plausibility};

/// Evaluation attributes encoded in a region identifier.
///
/// Identifiers look like `p=50,ff=prefer,tb=during`. Long key names
/// (`plausibility`, `favorable_future`, `transition_bar_position`) are accepted
/// too, `*` means "any", and unknown pairs are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub raw: String,
    pub plausibility: Option<u8>,
    pub favorable: Option<FavorableFuture>,
    pub transition_bar: Option<TransitionBar>,
    pub extra: BTreeMap<String, String>,
}

/// Undo the `_xHH_` escaping design tools apply to ids (`_x3D_` is `=`).
fn unescape_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut rest = id;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 2..];
        let decoded = tail
            .get(..3)
            .filter(|s| s.ends_with('_'))
            .and_then(|s| u8::from_str_radix(&s[..2], 16).ok())
            .map(char::from);
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push_str("_x");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

impl RegionDescriptor {
    /// Parse an element id. Ids without any `key=value` pair are not regions.
    pub fn parse(id: &str) -> Option<Self> {
        let text = unescape_id(id);
        if !text.contains('=') {
            return None;
        }
        let mut desc = Self {
            raw: id.to_string(),
            ..Self::default()
        };
        for pair in text.split(',') {
            let Some((k, v)) = pair.split_once('=') else {
                continue;
            };
            let (k, v) = (k.trim().to_ascii_lowercase(), v.trim());
            if v == "*" || v.is_empty() {
                continue;
            }
            match k.as_str() {
                "p" | "plausibility" => {
                    desc.plausibility = v.parse::<f64>().ok().and_then(normalize_plausibility);
                }
                "ff" | "favorable" | "favorable_future" => {
                    desc.favorable = Some(FavorableFuture::normalize(v));
                }
                "tb" | "transition_bar" | "transition_bar_position" => {
                    desc.transition_bar = TransitionBar::normalize(v);
                }
                _ => {
                    desc.extra.insert(k, v.to_string());
                }
            }
        }
        Some(desc)
    }

    /// Number of evaluation keys the region pins down.
    pub fn specificity(&self) -> usize {
        usize::from(self.plausibility.is_some())
            + usize::from(self.favorable.is_some())
            + usize::from(self.transition_bar.is_some())
    }

    /// Every key the region specifies must equal the photo's normalized value.
    pub fn matches(&self, meta: &PhotoMetadata) -> bool {
        if self.specificity() == 0 {
            return false;
        }
        if let Some(p) = self.plausibility
            && meta.plausibility_bucket() != Some(p)
        {
            return false;
        }
        if let Some(ff) = self.favorable
            && meta.favorable() != ff
        {
            return false;
        }
        if let Some(tb) = self.transition_bar
            && meta.transition_bar() != Some(tb)
        {
            return false;
        }
        true
    }

    /// Write the region's attributes into dropped photo metadata.
    pub fn apply_to(&self, meta: &mut PhotoMetadata) {
        if let Some(p) = self.plausibility {
            meta.plausibility = Some(f64::from(p));
        }
        if let Some(ff) = self.favorable {
            meta.favorable_future = Some(ff.as_str().to_string());
        }
        if let Some(tb) = self.transition_bar {
            meta.transition_bar_position = Some(tb.as_str().to_string());
        }
    }
}

/// Index of the most specific matching descriptor; earlier entries win ties.
pub fn best_match<'a, I>(descriptors: I, meta: &PhotoMetadata) -> Option<usize>
where
    I: IntoIterator<Item = &'a RegionDescriptor>,
{
    let mut best: Option<(usize, usize)> = None;
    for (i, d) in descriptors.into_iter().enumerate() {
        if !d.matches(meta) {
            continue;
        }
        let s = d.specificity();
        if best.is_none_or(|(_, bs)| s > bs) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
#[path = "../../../tests/unit/layout/region/descriptor.rs"]
mod tests;
