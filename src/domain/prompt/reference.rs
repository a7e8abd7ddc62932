use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How uploaded reference images should influence generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceIntent {
    None,
    ReplaceObjects,
    StyleInspiration,
    PlaceInScene,
}

impl ReferenceIntent {
    pub const ALL: [ReferenceIntent; 4] = [
        ReferenceIntent::None,
        ReferenceIntent::ReplaceObjects,
        ReferenceIntent::StyleInspiration,
        ReferenceIntent::PlaceInScene,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceIntent::None => "none",
            ReferenceIntent::ReplaceObjects => "replace-objects",
            ReferenceIntent::StyleInspiration => "style-inspiration",
            ReferenceIntent::PlaceInScene => "place-in-scene",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceIntent::None => "Just use my product photos",
            ReferenceIntent::ReplaceObjects => "Replace objects in the image with my product",
            ReferenceIntent::StyleInspiration => "Use images as style and layout inspiration",
            ReferenceIntent::PlaceInScene => "Place my product into the uploaded scene",
        }
    }

    /// Instruction appended to the prompt, `None` for the sentinel
    pub fn clause(&self) -> Option<&'static str> {
        match self {
            ReferenceIntent::None => None,
            ReferenceIntent::ReplaceObjects => Some(
                "Replace the main object in the uploaded reference image with my product, \
                 keeping the original scene, lighting and composition intact.",
            ),
            ReferenceIntent::StyleInspiration => Some(
                "Use the uploaded images only as inspiration for style, color palette and \
                 layout; do not copy them directly.",
            ),
            ReferenceIntent::PlaceInScene => Some(
                "Place my product naturally into the scene shown in the uploaded image, \
                 matching its perspective and lighting.",
            ),
        }
    }
}

impl FromStr for ReferenceIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReferenceIntent::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown reference intent: {}", s))
    }
}
