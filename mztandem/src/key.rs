use std::{fmt::Display, str::FromStr};

use context_error::{BoxedError, Context, CreateError};
use serde::{Deserialize, Serialize};

use crate::error::{TandemError, TandemErrorKind};

/// A field name that can be combined with a composite key to address a single record.
pub trait FieldName: Copy + Display {
    /// The name of the field as written by the upstream reader
    fn name(self) -> &'static str;
}

/// The peptide level fields, stored as `{field}_s{spectrum}_p{rank}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum PeptideField {
    /// `start`, the start offset of the peptide in its source sequence
    Start,
    /// `end`, the end offset of the peptide, only read with [`crate::EndOffsetMode::Corrected`]
    End,
    /// `seq`, the amino acid sequence
    Sequence,
    /// `URL`, the path of the fasta file the sequence was found in
    Url,
}

impl FieldName for PeptideField {
    fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Sequence => "seq",
            Self::Url => "URL",
        }
    }
}

/// The domain level fields, stored as `{field}_s{spectrum}_p{rank}_d{domain}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum DomainField {
    /// `domainid`, its presence marks the existence of the domain
    Id,
    /// `proteinkey`
    ProteinKey,
    /// `domainstart`
    Start,
    /// `domainend`
    End,
    /// `expect`
    Expect,
    /// `mh`
    Mh,
    /// `delta`
    Delta,
    /// `hyperscore`
    HyperScore,
    /// `nextscore`
    NextScore,
    /// `pre`
    Pre,
    /// `post`
    Post,
    /// `domainseq`
    Sequence,
    /// `missed_cleavages`
    MissedCleavages,
}

impl FieldName for DomainField {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "domainid",
            Self::ProteinKey => "proteinkey",
            Self::Start => "domainstart",
            Self::End => "domainend",
            Self::Expect => "expect",
            Self::Mh => "mh",
            Self::Delta => "delta",
            Self::HyperScore => "hyperscore",
            Self::NextScore => "nextscore",
            Self::Pre => "pre",
            Self::Post => "post",
            Self::Sequence => "domainseq",
            Self::MissedCleavages => "missed_cleavages",
        }
    }
}

impl Display for PeptideField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Display for DomainField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The composite id of a peptide, `s{spectrum}_p{rank}`, e.g. `s171_p2` for the second peptide
/// of spectrum 171. This is also the bare key whose presence marks the existence of a peptide.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct PeptideKey {
    /// The spectrum number, starting at 1
    pub spectrum: usize,
    /// The rank of the peptide within its spectrum, starting at 1
    pub rank: usize,
}

impl PeptideKey {
    /// Create a new peptide key
    pub const fn new(spectrum: usize, rank: usize) -> Self {
        Self { spectrum, rank }
    }

    /// The key of a domain of this peptide
    pub const fn domain(self, domain: usize) -> DomainKey {
        DomainKey {
            peptide: self,
            domain,
        }
    }

    /// The full record key for the given field of this peptide
    pub fn field(self, field: PeptideField) -> String {
        format!("{field}_{self}")
    }
}

impl Display for PeptideKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}_p{}", self.spectrum, self.rank)
    }
}

/// The composite key of a domain, `s{spectrum}_p{rank}_d{domain}`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct DomainKey {
    /// The peptide this domain belongs to
    pub peptide: PeptideKey,
    /// The domain counter within the peptide, starting at 1
    pub domain: usize,
}

impl DomainKey {
    /// The full record key for the given field of this domain
    pub fn field(self, field: DomainField) -> String {
        format!("{field}_{self}")
    }
}

impl Default for PeptideKey {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Default for DomainKey {
    fn default() -> Self {
        PeptideKey::default().domain(1)
    }
}

impl Display for DomainKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_d{}", self.peptide, self.domain)
    }
}

/// Parse a single `{prefix}{number}` segment, numbers are 1-based.
fn parse_segment(text: &str, segment: Option<&str>, prefix: char) -> Result<usize, TandemError> {
    segment
        .and_then(|s| s.strip_prefix(prefix))
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            BoxedError::new(
                TandemErrorKind::MalformedKey,
                "Invalid composite key",
                format!(
                    "A composite key should look like 's1_p1' or 's1_p1_d1', expected a '{prefix}' followed by a positive number"
                ),
                Context::none().lines(0, text).to_owned(),
            )
        })
}

fn malformed_key(text: &str) -> TandemError {
    BoxedError::new(
        TandemErrorKind::MalformedKey,
        "Invalid composite key",
        "A composite key has too many segments",
        Context::none().lines(0, text).to_owned(),
    )
}

impl FromStr for PeptideKey {
    type Err = TandemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('_');
        let spectrum = parse_segment(s, segments.next(), 's')?;
        let rank = parse_segment(s, segments.next(), 'p')?;
        if segments.next().is_some() {
            return Err(malformed_key(s));
        }
        Ok(Self::new(spectrum, rank))
    }
}

impl FromStr for DomainKey {
    type Err = TandemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('_');
        let spectrum = parse_segment(s, segments.next(), 's')?;
        let rank = parse_segment(s, segments.next(), 'p')?;
        let domain = parse_segment(s, segments.next(), 'd')?;
        if segments.next().is_some() {
            return Err(malformed_key(s));
        }
        Ok(PeptideKey::new(spectrum, rank).domain(domain))
    }
}

impl From<PeptideKey> for String {
    fn from(value: PeptideKey) -> Self {
        value.to_string()
    }
}

impl From<DomainKey> for String {
    fn from(value: DomainKey) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for PeptideKey {
    type Error = TandemError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for DomainKey {
    type Error = TandemError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
