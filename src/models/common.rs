use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationKind {
    Image,
    Video,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::Image => "IMAGE",
            GenerationKind::Video => "VIDEO",
        }
    }

    pub fn default_aspect_ratio(&self) -> AspectRatio {
        match self {
            GenerationKind::Image => AspectRatio::Square,
            GenerationKind::Video => AspectRatio::Landscape,
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "static" => Ok(GenerationKind::Image),
            "video" | "motion" => Ok(GenerationKind::Video),
            other => Err(format!("unknown generation kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    StandardPortrait,
}

const IMAGE_RATIOS: [AspectRatio; 5] = [
    AspectRatio::Square,
    AspectRatio::Landscape,
    AspectRatio::Portrait,
    AspectRatio::Standard,
    AspectRatio::StandardPortrait,
];

const VIDEO_RATIOS: [AspectRatio; 2] = [AspectRatio::Landscape, AspectRatio::Portrait];

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::StandardPortrait => "3:4",
        }
    }

    pub fn allowed_for(kind: GenerationKind) -> &'static [AspectRatio] {
        match kind {
            GenerationKind::Image => &IMAGE_RATIOS,
            GenerationKind::Video => &VIDEO_RATIOS,
        }
    }

    pub fn is_allowed_for(&self, kind: GenerationKind) -> bool {
        Self::allowed_for(kind).contains(self)
    }

    /// Video only knows wide and tall; everything that is not wide is tall.
    pub fn coerce_for_video(&self) -> AspectRatio {
        match self {
            AspectRatio::Landscape => AspectRatio::Landscape,
            _ => AspectRatio::Portrait,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IMAGE_RATIOS
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| format!("unsupported aspect ratio: {}", s))
    }
}
