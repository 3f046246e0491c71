use std::borrow::Cow;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    domain::Domain,
    error::TandemError,
    key::{DomainField, PeptideField, PeptideKey},
    options::{BuildOptions, EndOffsetMode, RankProbe},
    probe::ProbeUntilAbsent,
    record_store::{Fields, RecordStore, parse_value},
};

/// One candidate identification for a spectrum, with all its domains.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Peptide {
    /// The composite id, `s{spectrum}_p{rank}`
    pub id: PeptideKey,
    /// The start offset of the peptide in its source sequence
    pub start: usize,
    /// The end offset of the peptide in its source sequence, see [`EndOffsetMode`]
    pub end: usize,
    /// The amino acid sequence, without surrounding whitespace
    pub sequence: String,
    /// The fasta file the sequence was found in, if this was reported
    pub fasta_file: Option<String>,
    /// The domains in the order they were reported in
    pub domains: ThinVec<Domain>,
}

impl Peptide {
    /// Read a peptide and all its domains from the record store. The existence of the peptide
    /// itself is not checked, this is up to the rank scan.
    ///
    /// # Errors
    /// If any numeric field of the peptide or its domains is present but cannot be parsed.
    pub fn from_records<R: RecordStore + ?Sized>(
        store: &R,
        id: PeptideKey,
        options: &BuildOptions,
    ) -> Result<Self, TandemError> {
        let fields = Fields::new(store, id);
        let start = fields.parse_or_default(PeptideField::Start)?;
        Self::from_fields(store, &fields, id, start, options)
    }

    /// Finish reading a peptide of which the start offset is already known.
    fn from_fields<R: RecordStore + ?Sized>(
        store: &R,
        fields: &Fields<'_, R, PeptideKey>,
        id: PeptideKey,
        start: usize,
        options: &BuildOptions,
    ) -> Result<Self, TandemError> {
        let end = match options.end_offset {
            EndOffsetMode::Legacy => start,
            EndOffsetMode::Corrected => fields.parse_or_default(PeptideField::End)?,
        };

        let domains = ProbeUntilAbsent::new(|domain| {
            store
                .get(&id.domain(domain).field(DomainField::Id))
                .map(Cow::into_owned)
        })
        .map(|(domain, domain_id)| Domain::from_records(store, id.domain(domain), domain_id))
        .collect::<Result<ThinVec<_>, _>>()?;

        log::trace!("{id}: {} domain(s)", domains.len());

        Ok(Self {
            id,
            start,
            end,
            sequence: fields
                .text(PeptideField::Sequence)
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            fasta_file: fields.text(PeptideField::Url).map(Cow::into_owned),
            domains,
        })
    }

    /// Scan all peptides of a single spectrum, stopping at the first rank that is not present.
    pub(crate) fn scan_spectrum<'a, R: RecordStore + ?Sized>(
        store: &'a R,
        spectrum: usize,
        options: &'a BuildOptions,
    ) -> impl Iterator<Item = Result<Self, TandemError>> + 'a {
        ProbeUntilAbsent::new(move |rank| {
            let id = PeptideKey::new(spectrum, rank);
            match options.rank_probe {
                RankProbe::Sentinel => store.get(&id.to_string()).map(|_| None),
                RankProbe::StartField => store.get(&id.field(PeptideField::Start)).map(Some),
            }
        })
        .map(move |(rank, probed_start)| {
            let id = PeptideKey::new(spectrum, rank);
            let fields = Fields::new(store, id);
            let start = match probed_start {
                Some(start) => parse_value(&start, PeptideField::Start, id)?,
                None => fields.parse_or_default(PeptideField::Start)?,
            };
            Self::from_fields(store, &fields, id, start, options)
        })
    }

    /// The spectrum this peptide was identified in
    pub const fn spectrum_number(&self) -> usize {
        self.id.spectrum
    }

    /// The rank of this peptide within its spectrum
    pub const fn rank(&self) -> usize {
        self.id.rank
    }

    /// Get a domain by its 1-based counter
    pub fn domain(&self, domain: usize) -> Option<&Domain> {
        domain
            .checked_sub(1)
            .and_then(|index| self.domains.get(index))
    }

    /// All distinct protein keys of the domains, in order of first occurrence
    pub fn protein_keys(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .map(|d| d.protein_key.as_str())
            .filter(|k| !k.is_empty())
            .unique()
    }
}
