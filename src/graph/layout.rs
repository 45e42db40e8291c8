use serde::{Deserialize, Serialize};

/// Sizing used to turn labels and badges into node widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutConfig {
    /// Estimated width of one label character, in pixels
    pub char_width: u32,
    /// Horizontal padding around a node label
    pub node_padding: u32,
    /// Width of an empty badge pill
    pub badge_base_width: u32,
    /// Extra badge width per digit of the count
    pub badge_digit_width: u32,
    pub node_height: u32,
    pub min_node_width: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            char_width: 7,
            node_padding: 40,
            badge_base_width: 16,
            badge_digit_width: 7,
            node_height: 32,
            min_node_width: 120,
        }
    }
}

impl LayoutConfig {
    pub fn label_width(&self, label: &str) -> u32 {
        let chars = u32::try_from(label.chars().count()).unwrap_or(u32::MAX);
        chars.saturating_mul(self.char_width).saturating_add(self.node_padding)
    }

    /// Width of a node before siblings on the same level are aligned.
    pub fn node_width(&self, label: &str, badge_width: u32) -> u32 {
        self.label_width(label)
            .saturating_add(badge_width)
            .max(self.min_node_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_width_scales_with_length() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.label_width(""), 40);
        assert_eq!(layout.label_width("build"), 75);
    }

    #[test]
    fn test_node_width_respects_minimum() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.node_width("a", 0), 120);
        assert_eq!(layout.node_width("build-container-image", 23), 187 + 23);
    }
}
