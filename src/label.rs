// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification labels and their enumeration domain
//!
//! Classifiers tag each triangle of a reconstructed mesh with a small
//! category ("wall", "floor", ...). A [`LabelDomain`] fixes the set of
//! categories and their enumeration order; label 0 is always the default,
//! "unclassified" category used when no classifier is active.

use std::fmt;

/// Index of one classification category within a [`LabelDomain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(pub u16);

impl Label {
    /// The default "no classification" label, present in every domain
    pub const DEFAULT: Label = Label(0);

    /// Get the label's index into its domain
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label#{}", self.0)
    }
}

/// Ordered set of classification categories
///
/// The index order is the enumeration order used everywhere labels are
/// iterated, which keeps per-frame output ordering deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelDomain {
    names: Vec<String>,
}

impl LabelDomain {
    /// Create a domain from category names; index 0 is the default category
    ///
    /// # Panics
    /// Panics if `names` is empty — every domain needs at least the default
    /// category.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        assert!(!names.is_empty(), "label domain must not be empty");
        Self { names }
    }

    /// The face classification categories reported by ARKit scene meshing
    pub fn arkit() -> Self {
        Self::new([
            "none", "wall", "floor", "ceiling", "table", "seat", "window", "door",
        ])
    }

    /// The scene object kinds reported by Scene Understanding on HoloLens
    pub fn scene_understanding() -> Self {
        Self::new([
            "background",
            "wall",
            "floor",
            "ceiling",
            "platform",
            "world",
            "unknown",
        ])
    }

    /// A domain with only the default category, for unclassified meshing
    pub fn unclassified() -> Self {
        Self::new(["none"])
    }

    /// Number of categories
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; constructors reject empty domains
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check whether a label belongs to this domain
    #[inline]
    pub fn contains(&self, label: Label) -> bool {
        label.index() < self.names.len()
    }

    /// Get the name of a category, or `None` if out of range
    #[inline]
    pub fn name(&self, label: Label) -> Option<&str> {
        self.names.get(label.index()).map(String::as_str)
    }

    /// Look up a label by category name
    pub fn label_of(&self, name: &str) -> Option<Label> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| Label(i as u16))
    }

    /// Iterate all labels in enumeration order
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.names.len()).map(|i| Label(i as u16))
    }

    /// Build the all-default label array used by the unclassified path
    pub fn default_labels(&self, triangle_count: usize) -> Vec<Label> {
        vec![Label::DEFAULT; triangle_count]
    }
}
