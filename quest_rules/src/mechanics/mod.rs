//! World-state classification: story themes and story block types.

use serde::{Deserialize, Serialize};

/// Narrative themes a story block can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Theme {
    Scifi,
    #[default]
    Fantasy,
    PostApocalyptic,
}

/// Position of a story block inside a questline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlockType {
    /// Opens a questline. Single theme.
    #[default]
    Starter,
    /// Fills the middle of a questline. May carry several themes.
    Regular,
    /// Closes a questline. Single theme.
    Finale,
}

impl BlockType {
    /// Whether blocks of this type may be tagged with more than one theme.
    pub fn allows_multiple_themes(&self) -> bool {
        matches!(self, BlockType::Regular)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Theme::Scifi => "scifi",
            Theme::Fantasy => "fantasy",
            Theme::PostApocalyptic => "post_apocalyptic",
        };
        write!(f, "{}", name)
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockType::Starter => "starter",
            BlockType::Regular => "regular",
            BlockType::Finale => "finale",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_regular_allows_multiple_themes() {
        assert!(BlockType::Regular.allows_multiple_themes());
        assert!(!BlockType::Starter.allows_multiple_themes());
        assert!(!BlockType::Finale.allows_multiple_themes());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Theme::PostApocalyptic.to_string(), "post_apocalyptic");
        assert_eq!(BlockType::Finale.to_string(), "finale");
    }
}
