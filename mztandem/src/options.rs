use serde::{Deserialize, Serialize};

/// Which key decides whether a peptide rank exists.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum RankProbe {
    /// The bare `s{spectrum}_p{rank}` key, as written by the upstream reader
    #[default]
    Sentinel,
    /// The `start_s{spectrum}_p{rank}` field, the probed value is used as the start offset
    StartField,
}

/// Where the end offset of a peptide is read from.
///
/// Older versions of the reconstruction read the `start` field for both offsets, so every
/// peptide ended where it started. That behaviour is kept as the default as downstream code
/// may rely on it.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EndOffsetMode {
    /// The end offset mirrors the `start` field
    #[default]
    Legacy,
    /// The end offset is read from the `end` field
    Corrected,
}

/// Parameters for rebuilding the spectrum peptide map.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct BuildOptions {
    /// How the existence of a peptide rank is detected
    pub rank_probe: RankProbe,
    /// How the end offset of a peptide is determined
    pub end_offset: EndOffsetMode,
}

impl BuildOptions {
    /// Set the rank probe
    #[must_use]
    pub fn rank_probe(self, rank_probe: RankProbe) -> Self {
        Self { rank_probe, ..self }
    }
    /// Set the end offset mode
    #[must_use]
    pub fn end_offset(self, end_offset: EndOffsetMode) -> Self {
        Self { end_offset, ..self }
    }
}
