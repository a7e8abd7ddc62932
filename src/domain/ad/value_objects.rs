use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output orientation chosen in "Product Basics"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Portrait,
        Orientation::Landscape,
        Orientation::Square,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Square => "square",
        }
    }

    /// Pixel dimensions sent to the generation service
    pub fn dimensions(&self) -> &'static str {
        match self {
            Orientation::Portrait => "1024x1536",
            Orientation::Landscape => "1536x1024",
            Orientation::Square => "1024x1024",
        }
    }

    /// Reverse of [`Orientation::dimensions`]
    pub fn from_dimensions(dimensions: &str) -> Option<Self> {
        Orientation::ALL
            .into_iter()
            .find(|o| o.dimensions() == dimensions)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown orientation: {}", s))
    }
}

/// Rendering quality requested from the generation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Standard,
    High,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Standard => "standard",
            Quality::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_round_trip() {
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_dimensions(orientation.dimensions()),
                Some(orientation)
            );
        }
        assert_eq!(Orientation::from_dimensions("800x600"), None);
    }

    #[test]
    fn parse_orientation() {
        assert_eq!("square".parse::<Orientation>(), Ok(Orientation::Square));
        assert!("diagonal".parse::<Orientation>().is_err());
    }

    #[test]
    fn quality_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Quality::High).unwrap(), "\"high\"");
    }
}
