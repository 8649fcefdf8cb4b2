//! Identifier newtypes for the project document.
//!
//! Every document object is addressed by a string id. Wrapping them in
//! distinct types keeps a clip id from being passed where an effect id is
//! expected. Ids order lexicographically, which the geometry queries use as
//! their final tie-break.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a project document.
    ProjectId
);
string_id!(
    /// Identifier of a track within a timeline.
    TrackId
);
string_id!(
    /// Identifier of a clip. Unique across all tracks.
    ClipId
);
string_id!(
    /// Identifier of an effect. Unique across clip-attached and legacy
    /// recording-level effect lists.
    EffectId
);
string_id!(
    /// Identifier of a source recording referenced by clips.
    RecordingId
);
