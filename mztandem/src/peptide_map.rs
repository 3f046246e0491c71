use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    domain::Domain,
    error::{TandemError, not_found},
    key::PeptideKey,
    options::{BuildOptions, EndOffsetMode},
    peptide::Peptide,
    record_store::RecordStore,
};

/// All peptides of a single spectrum, keyed by their composite id in rank order.
pub type SpectrumPeptides = IndexMap<PeptideKey, Peptide>;

/// Upper bound on the up front reservation, larger maps grow while scanning
const MAX_RESERVED_SPECTRA: usize = 1 << 16;

/// The peptides found for every spectrum of an X!Tandem search. Built once from the flat records
/// and read only afterwards.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SpectrumPeptideMap {
    spectra: IndexMap<usize, SpectrumPeptides>,
}

impl SpectrumPeptideMap {
    /// Rebuild the peptide map for spectra `1..=number_of_spectra` with the default options.
    ///
    /// # Errors
    /// If any numeric field is present but cannot be parsed.
    pub fn build<R: RecordStore + ?Sized>(
        records: &R,
        number_of_spectra: usize,
    ) -> Result<Self, TandemError> {
        Self::build_with(records, number_of_spectra, &BuildOptions::default())
    }

    /// Rebuild the peptide map for spectra `1..=number_of_spectra`. Every spectrum gets an entry,
    /// even if no peptides were found for it. Per spectrum the peptide ranks are scanned from 1
    /// upwards until the first rank that is absent, so ranks after a gap are ignored.
    ///
    /// # Errors
    /// If any numeric field is present but cannot be parsed.
    pub fn build_with<R: RecordStore + ?Sized>(
        records: &R,
        number_of_spectra: usize,
        options: &BuildOptions,
    ) -> Result<Self, TandemError> {
        if options.end_offset == EndOffsetMode::Legacy {
            log::debug!("Legacy end offsets: peptide end offsets mirror the start offsets");
        }

        let mut spectra = IndexMap::with_capacity(number_of_spectra.min(MAX_RESERVED_SPECTRA));
        for spectrum in 1..=number_of_spectra {
            let peptides = Peptide::scan_spectrum(records, spectrum, options)
                .map(|peptide| peptide.map(|p| (p.id, p)))
                .collect::<Result<SpectrumPeptides, _>>()?;
            log::debug!("s{spectrum}: {} peptide(s)", peptides.len());
            spectra.insert(spectrum, peptides);
        }

        let map = Self { spectra };
        log::info!(
            "Rebuilt {} spectra with {} peptides and {} domains",
            map.number_of_spectra(),
            map.total_peptides(),
            map.total_domains()
        );
        Ok(map)
    }

    /// The number of spectra in this map, including spectra without peptides
    pub fn number_of_spectra(&self) -> usize {
        self.spectra.len()
    }

    /// The total number of peptides over all spectra
    pub fn total_peptides(&self) -> usize {
        self.spectra.values().map(IndexMap::len).sum()
    }

    /// The total number of domains over all peptides
    pub fn total_domains(&self) -> usize {
        self.spectra
            .values()
            .flat_map(IndexMap::values)
            .map(|p| p.domains.len())
            .sum()
    }

    /// Iterate over all spectra in ascending order with their peptides
    pub fn spectra(&self) -> impl ExactSizeIterator<Item = (usize, &SpectrumPeptides)> {
        self.spectra.iter().map(|(s, p)| (*s, p))
    }

    /// The full two level map from spectrum number to peptides
    pub const fn spectrum_and_peptide_map(&self) -> &IndexMap<usize, SpectrumPeptides> {
        &self.spectra
    }

    fn spectrum(&self, spectrum: usize) -> Result<&SpectrumPeptides, TandemError> {
        self.spectra
            .get(&spectrum)
            .ok_or_else(|| not_found("spectrum", &format!("s{spectrum}")))
    }

    /// All peptides for the given spectrum. Do not rely on the order of the peptides, use
    /// [`Self::peptide_by_rank`] to get a peptide with a specific rank.
    ///
    /// # Errors
    /// If the spectrum was not built. A spectrum without peptides gives an empty iterator instead.
    pub fn peptides_for_spectrum(
        &self,
        spectrum: usize,
    ) -> Result<impl ExactSizeIterator<Item = &Peptide>, TandemError> {
        self.spectrum(spectrum).map(IndexMap::values)
    }

    /// Get the peptide with the given rank (as found in the report) for a spectrum.
    ///
    /// # Errors
    /// If the spectrum or rank does not exist.
    pub fn peptide_by_rank(&self, spectrum: usize, rank: usize) -> Result<&Peptide, TandemError> {
        let key = PeptideKey::new(spectrum, rank);
        self.spectrum(spectrum)?
            .get(&key)
            .ok_or_else(|| not_found("peptide", &key.to_string()))
    }

    /// The number of peptides for a spectrum.
    ///
    /// # Errors
    /// If the spectrum was not built.
    pub fn peptide_count(&self, spectrum: usize) -> Result<usize, TandemError> {
        self.spectrum(spectrum).map(IndexMap::len)
    }

    /// Get a domain by its spectrum, peptide rank, and domain counter.
    ///
    /// # Errors
    /// If the spectrum, rank, or domain does not exist.
    pub fn domain(
        &self,
        spectrum: usize,
        rank: usize,
        domain: usize,
    ) -> Result<&Domain, TandemError> {
        let peptide = self.peptide_by_rank(spectrum, rank)?;
        peptide.domain(domain).ok_or_else(|| {
            not_found(
                "domain",
                &PeptideKey::new(spectrum, rank).domain(domain).to_string(),
            )
        })
    }
}
