//! Node footprint estimation from label text.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

pub trait LabelSizer {
    fn size(&self, label: &str) -> NodeSize;
}

/// Fixed-width cards whose height grows with the number of wrapped lines.
///
/// A label wraps every `chars_per_line` characters; the card is `base_height` tall plus
/// `line_height` per line. Characters are counted in UTF-16 code units, which is how the canvas
/// measures string length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthSizer {
    pub width: f64,
    pub chars_per_line: usize,
    pub base_height: f64,
    pub line_height: f64,
}

impl Default for FixedWidthSizer {
    fn default() -> Self {
        Self {
            width: 360.0,
            chars_per_line: 60,
            base_height: 40.0,
            line_height: 24.0,
        }
    }
}

impl FixedWidthSizer {
    pub fn line_count(&self, label: &str) -> usize {
        label.encode_utf16().count().div_ceil(self.chars_per_line.max(1))
    }

    /// Rejects settings that could yield a non-positive or non-finite footprint.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfig { message });
        if !(self.width.is_finite() && self.width > 0.0) {
            return invalid(format!("node.width must be positive, got {}", self.width));
        }
        if self.chars_per_line == 0 {
            return invalid("node.charsPerLine must be at least 1".to_string());
        }
        if !(self.base_height.is_finite() && self.base_height > 0.0) {
            return invalid(format!(
                "node.baseHeight must be positive, got {}",
                self.base_height
            ));
        }
        if !(self.line_height.is_finite() && self.line_height >= 0.0) {
            return invalid(format!(
                "node.lineHeight must not be negative, got {}",
                self.line_height
            ));
        }
        Ok(())
    }
}

impl LabelSizer for FixedWidthSizer {
    fn size(&self, label: &str) -> NodeSize {
        NodeSize {
            width: self.width,
            height: self.base_height + self.line_count(label) as f64 * self.line_height,
        }
    }
}
