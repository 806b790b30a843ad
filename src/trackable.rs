// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifiers for source meshes and their classified sub-meshes

use std::fmt;
use std::str::FromStr;

use nalgebra::Isometry3;

use crate::error::Error;

/// Rigid pose of a mesh in tracking space
pub type Pose = Isometry3<f32>;

/// Stable identifier of a source mesh, as assigned by the tracking subsystem
///
/// Trackers report this as a pair of 64-bit halves and embed it in mesh names
/// as two dash-separated 16-digit hex groups; [`FromStr`] accepts that form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackableId(pub u64, pub u64);

impl fmt::Display for TrackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}-{:016x}", self.0, self.1)
    }
}

impl FromStr for TrackableId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::TrackableIdFormat(s.to_string());

        let (first, second) = s.split_once('-').ok_or_else(malformed)?;
        // Exactly 16 hex digits per half; from_str_radix alone would also
        // let a leading '+' through
        let hex16 = |group: &str| group.len() == 16 && group.bytes().all(|b| b.is_ascii_hexdigit());
        if !hex16(first) || !hex16(second) {
            return Err(malformed());
        }

        let sub_id1 = u64::from_str_radix(first, 16).map_err(|_| malformed())?;
        let sub_id2 = u64::from_str_radix(second, 16).map_err(|_| malformed())?;
        Ok(TrackableId(sub_id1, sub_id2))
    }
}

/// Identifier of one classified sub-mesh
///
/// Allocated by the splitter when a label first appears for a source, and
/// kept stable for as long as that label persists. A label that disappears
/// and later reappears gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifiedMeshId(pub u64);

impl fmt::Display for ClassifiedMeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "classified-mesh#{}", self.0)
    }
}
