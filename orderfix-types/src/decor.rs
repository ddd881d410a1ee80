//! Non-semantic decoration attached to a declaration.
//!
//! Region markers are stored on the declarations they surround: opens precede the declaration
//! (outermost first) and closes follow it (innermost first). The blank-line gap between two
//! siblings renders as `max(prev.trailing_blank_lines, next.leading_blank_lines)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,

    #[serde(default)]
    pub leading_blank_lines: u32,

    #[serde(default)]
    pub trailing_blank_lines: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub region_opens: Vec<RegionOpen>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub region_closes: Vec<RegionClose>,
}

impl Decoration {
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_blank_lines(mut self, leading: u32, trailing: u32) -> Self {
        self.leading_blank_lines = leading;
        self.trailing_blank_lines = trailing;
        self
    }

    pub fn open(mut self, label: impl Into<String>) -> Self {
        self.region_opens.push(RegionOpen::new(label));
        self
    }

    pub fn close(mut self) -> Self {
        self.region_closes.push(RegionClose::default());
        self
    }

    pub fn has_markers(&self) -> bool {
        !self.region_opens.is_empty() || !self.region_closes.is_empty()
    }
}

/// Opening half of a fold region (`#region Label`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOpen {
    pub label: String,

    /// Right half of a region that was split around an inserted declaration.
    #[serde(default, skip_serializing_if = "is_false")]
    pub continued: bool,
}

impl RegionOpen {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            continued: false,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Closing half of a fold region (`#endregion`, optionally repeating the label).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionClose {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}
