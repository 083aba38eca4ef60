use crate::config::MarkersConfig;
use crate::domain::VersionBump;

/// Severity requested by a single commit.
///
/// Ordered so that `max` picks the dominant level across commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BumpLevel {
    #[default]
    None = 0,
    Patch = 1,
    Minor = 2,
    Major = 3,
}

impl BumpLevel {
    /// The increment matching this level, `None` for [`BumpLevel::None`]
    pub fn as_bump(&self) -> Option<VersionBump> {
        match self {
            BumpLevel::None => None,
            BumpLevel::Patch => Some(VersionBump::Patch),
            BumpLevel::Minor => Some(VersionBump::Minor),
            BumpLevel::Major => Some(VersionBump::Major),
        }
    }
}

/// Find the highest-priority marker in a commit message.
///
/// Markers are checked `major`, then `minor`, then `patch`; the first one
/// present wins. Returns `None` when the message carries no marker.
pub fn marker_level(message: &str, markers: &MarkersConfig) -> Option<BumpLevel> {
    [
        (markers.major.as_str(), BumpLevel::Major),
        (markers.minor.as_str(), BumpLevel::Minor),
        (markers.patch.as_str(), BumpLevel::Patch),
    ]
    .into_iter()
    .find(|(marker, _)| !marker.is_empty() && message.contains(marker))
    .map(|(_, level)| level)
}
