use serde::{Deserialize, Serialize};

/// Layout of the tag records inside a tags chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormatRevision {
    /// Eight reserved bytes after the direction, three loop directions.
    Legacy,
    /// A repeat count and six reserved bytes, four loop directions.
    #[default]
    Current,
}

/// What to do with a linked cel whose source cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkPolicy {
    #[default]
    Fail,
    /// Keep the cel as an empty 0x0 image and mark the link unresolved.
    Degrade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub revision: FormatRevision,
    pub link_policy: LinkPolicy,
    pub retain_icc_profile: bool,
    pub verify_magic: bool,
    /// Replace invalid UTF-8 in names with U+FFFD instead of failing.
    pub lossy_strings: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            revision: FormatRevision::Current,
            link_policy: LinkPolicy::Fail,
            retain_icc_profile: true,
            verify_magic: true,
            lossy_strings: false,
        }
    }
}
