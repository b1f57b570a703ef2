//! Resolution presets for the common latent-diffusion model families.
//!
//! Presets are shown to the user as decorated labels such as
//! `1024×1024 — 1:1 — 1.0MP — SDXL`. Only the leading `WIDTH×HEIGHT` part is
//! used for lookup, so a label survives round-tripping through the graph
//! editor even if the decoration changes.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::dimensions::Dimensions;

/// Separator between the lookup key and the display metadata in a label.
pub const LABEL_SEPARATOR: &str = " — ";

/// Label that selects the caller-supplied custom dimensions.
pub const CUSTOM_LABEL: &str = "Custom";

/// Model family a preset targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
pub enum ModelGroup {
    #[strum(to_string = "SD1.5")]
    Sd15,
    #[strum(to_string = "SDXL")]
    Sdxl,
    #[strum(to_string = "Flux")]
    Flux,
}

/// A named resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: &'static str,
    pub group: ModelGroup,
}

impl Preset {
    const fn new(width: u32, height: u32, aspect_ratio: &'static str, group: ModelGroup) -> Self {
        Self {
            width,
            height,
            aspect_ratio,
            group,
        }
    }

    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Pixel count in millions.
    #[must_use]
    pub fn megapixels(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height) / 1_000_000.0
    }

    /// The bare `WIDTH×HEIGHT` lookup key.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}×{}", self.width, self.height)
    }

    /// Decorated label for display.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}×{}{sep}{}{sep}{:.1}MP{sep}{}",
            self.width,
            self.height,
            self.aspect_ratio,
            self.megapixels(),
            self.group,
            sep = LABEL_SEPARATOR,
        )
    }
}

/// Every known preset, in display order.
pub static PRESETS: &[Preset] = &[
    // SD1.5
    Preset::new(512, 512, "1:1", ModelGroup::Sd15),
    Preset::new(512, 768, "2:3", ModelGroup::Sd15),
    Preset::new(768, 512, "3:2", ModelGroup::Sd15),
    Preset::new(576, 768, "3:4", ModelGroup::Sd15),
    Preset::new(768, 576, "4:3", ModelGroup::Sd15),
    Preset::new(512, 912, "9:16", ModelGroup::Sd15),
    Preset::new(912, 512, "16:9", ModelGroup::Sd15),
    // SDXL
    Preset::new(1024, 1024, "1:1", ModelGroup::Sdxl),
    Preset::new(896, 1152, "7:9", ModelGroup::Sdxl),
    Preset::new(1152, 896, "9:7", ModelGroup::Sdxl),
    Preset::new(832, 1216, "2:3", ModelGroup::Sdxl),
    Preset::new(1216, 832, "3:2", ModelGroup::Sdxl),
    Preset::new(768, 1344, "4:7", ModelGroup::Sdxl),
    Preset::new(1344, 768, "7:4", ModelGroup::Sdxl),
    Preset::new(640, 1536, "5:12", ModelGroup::Sdxl),
    Preset::new(1536, 640, "12:5", ModelGroup::Sdxl),
    // Flux
    Preset::new(1408, 1408, "1:1", ModelGroup::Flux),
    Preset::new(1152, 1728, "2:3", ModelGroup::Flux),
    Preset::new(1728, 1152, "3:2", ModelGroup::Flux),
    Preset::new(1088, 1920, "9:16", ModelGroup::Flux),
    Preset::new(1920, 1088, "16:9", ModelGroup::Flux),
    Preset::new(1664, 2432, "2:3", ModelGroup::Flux),
];

/// Lookup index keyed by `WIDTH×HEIGHT`. The first preset wins on duplicates.
static INDEX: Lazy<HashMap<String, &'static Preset>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(PRESETS.len());
    for preset in PRESETS {
        index.entry(preset.key()).or_insert(preset);
    }
    index
});

/// Display labels of every preset, preceded by [`CUSTOM_LABEL`].
pub static LABELS: Lazy<Vec<String>> = Lazy::new(|| {
    std::iter::once(CUSTOM_LABEL.to_string())
        .chain(PRESETS.iter().map(Preset::label))
        .collect()
});

/// Strip display metadata from a label, leaving the lookup key.
///
/// An ASCII `x` between the two numbers is normalized to `×`.
#[must_use]
pub fn lookup_key(label: &str) -> String {
    let head = label
        .split_once(LABEL_SEPARATOR)
        .map_or(label, |(head, _)| head)
        .trim();

    match head.split_once(['x', 'X']) {
        Some((w, h)) if is_number(w.trim()) && is_number(h.trim()) => {
            format!("{}×{}", w.trim(), h.trim())
        }
        _ => head.to_string(),
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Find the preset for a (possibly decorated) label.
#[must_use]
pub fn find(label: &str) -> Option<&'static Preset> {
    INDEX.get(&lookup_key(label)).copied()
}

/// Resolve a label to its dimensions, falling back to the custom pair.
///
/// Unknown labels, including [`CUSTOM_LABEL`], are not an error: the fallback
/// is returned unchanged.
#[must_use]
pub fn resolve(label: &str, fallback_width: u32, fallback_height: u32) -> Dimensions {
    if let Some(preset) = find(label) {
        tracing::debug!("preset {label:?} -> {}x{}", preset.width, preset.height);
        preset.dimensions()
    } else {
        if label != CUSTOM_LABEL {
            tracing::debug!("unknown preset {label:?}, using {fallback_width}x{fallback_height}");
        }
        Dimensions::new(fallback_width, fallback_height)
    }
}

/// Presets that target the given model family.
pub fn presets_for_group(group: ModelGroup) -> impl Iterator<Item = &'static Preset> {
    PRESETS.iter().filter(move |preset| preset.group == group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_resolve_decorated_label() {
        let dims = resolve("1024×1024 — 1:1 — 1.0MP — SDXL", 800, 600);
        assert_eq!(dims, Dimensions::new(1024, 1024));
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        assert_eq!(resolve("not-a-real-preset", 800, 600), Dimensions::new(800, 600));
        assert_eq!(resolve(CUSTOM_LABEL, 800, 600), Dimensions::new(800, 600));
        assert_eq!(resolve("", 800, 600), Dimensions::new(800, 600));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let label = "832×1216 — 2:3 — 1.0MP — SDXL";
        assert_eq!(resolve(label, 1, 1), resolve(label, 1, 1));
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key("1024×1024 — 1:1 — 1.0MP — SDXL"), "1024×1024");
        assert_eq!(lookup_key("  768x1344 "), "768×1344");
        assert_eq!(lookup_key("Custom"), "Custom");
        assert_eq!(lookup_key("box x ray"), "box x ray");
    }

    #[test]
    fn test_label_round_trip() {
        for preset in PRESETS {
            let found = find(&preset.label()).unwrap();
            assert_eq!(found.dimensions(), preset.dimensions());
        }
    }

    #[test]
    fn test_label_format() {
        let preset = find("1024×1024").unwrap();
        assert_eq!(preset.label(), "1024×1024 — 1:1 — 1.0MP — SDXL");
    }

    #[test]
    fn test_presets_are_aligned() {
        for preset in PRESETS {
            assert!(preset.dimensions().is_aligned(), "{preset}");
        }
    }

    #[test]
    fn test_every_group_has_presets() {
        for group in ModelGroup::iter() {
            assert!(presets_for_group(group).count() > 0, "{group}");
        }
        assert_eq!(LABELS.len(), PRESETS.len() + 1);
        assert_eq!(LABELS[0], CUSTOM_LABEL);
    }
}
