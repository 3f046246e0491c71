use std::{collections::HashMap, hash::BuildHasher};

use context_error::{BoxedError, Context, CreateError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{TandemError, TandemErrorKind},
    key::{DomainField, DomainKey},
    record_store::{Fields, RecordStore},
};

/// One scored alignment of a peptide to a region of a protein.
///
/// Absent numeric fields are zero, the same as in the X!Tandem report they come from. This means
/// that a missing hyperscore cannot be told apart from a hyperscore of exactly 0.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Domain {
    /// The composite key `s{spectrum}_p{rank}_d{domain}`
    pub key: DomainKey,
    /// The id X!Tandem gave this domain
    pub id: String,
    /// The key of the protein this domain aligns to, see [`Domain::protein`]
    pub protein_key: String,
    /// The 1-based inclusive start of the aligned region
    pub start: usize,
    /// The 1-based inclusive end of the aligned region
    pub end: usize,
    /// The expectation value
    pub expect: f64,
    /// The calculated MH+ of the peptide
    pub mh: f64,
    /// The difference between the calculated and the experimental MH+
    pub delta_mh: f64,
    /// The hyperscore
    pub hyperscore: f64,
    /// The hyperscore of the next best match
    pub next_score: f64,
    /// The sequence directly before the aligned region
    pub up_flank_sequence: String,
    /// The sequence directly after the aligned region
    pub down_flank_sequence: String,
    /// The aligned sequence
    pub sequence: String,
    /// The number of missed cleavages
    pub missed_cleavages: usize,
}

impl Domain {
    /// Read a domain from the record store. The `domainid` field is assumed to be present, its
    /// value is passed in to not read it twice.
    ///
    /// # Errors
    /// If any numeric field is present but cannot be parsed, or if the start lies after the end.
    pub fn from_records<R: RecordStore + ?Sized>(
        store: &R,
        key: DomainKey,
        id: String,
    ) -> Result<Self, TandemError> {
        let fields = Fields::new(store, key);
        let start: Option<usize> = fields.parse(DomainField::Start)?;
        let end: Option<usize> = fields.parse(DomainField::End)?;
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            let key_text = key.to_string();
            return Err(BoxedError::new(
                TandemErrorKind::InconsistentRange,
                "Invalid domain range",
                format!("The domain start ({start}) lies after the domain end ({end})"),
                Context::none().source(key_text.as_str()).to_owned(),
            ));
        }

        Ok(Self {
            key,
            id,
            protein_key: fields.string(DomainField::ProteinKey),
            start: start.unwrap_or_default(),
            end: end.unwrap_or_default(),
            expect: fields.parse_or_default(DomainField::Expect)?,
            mh: fields.parse_or_default(DomainField::Mh)?,
            delta_mh: fields.parse_or_default(DomainField::Delta)?,
            hyperscore: fields.parse_or_default(DomainField::HyperScore)?,
            next_score: fields.parse_or_default(DomainField::NextScore)?,
            up_flank_sequence: fields.string(DomainField::Pre),
            down_flank_sequence: fields.string(DomainField::Post),
            sequence: fields.string(DomainField::Sequence),
            missed_cleavages: fields.parse_or_default(DomainField::MissedCleavages)?,
        })
    }

    /// The number of residues covered, if both the start and end are known and in order
    pub const fn len(&self) -> Option<usize> {
        if self.start == 0 || self.end == 0 {
            return None;
        }
        match self.end.checked_sub(self.start) {
            Some(difference) => Some(difference + 1),
            None => None,
        }
    }

    /// Resolve the protein this domain aligns to
    pub fn protein<'a, L: ProteinLookup + ?Sized>(&self, proteins: &'a L) -> Option<&'a L::Protein> {
        proteins.protein(&self.protein_key)
    }
}

/// Resolves protein keys (as found in [`Domain::protein_key`]) to protein records.
pub trait ProteinLookup {
    /// The protein record type
    type Protein;
    /// Find the protein stored under the given key
    fn protein(&self, key: &str) -> Option<&Self::Protein>;
}

impl<P, S: BuildHasher> ProteinLookup for HashMap<String, P, S> {
    type Protein = P;
    fn protein(&self, key: &str) -> Option<&P> {
        self.get(key)
    }
}

impl<P, S: BuildHasher> ProteinLookup for IndexMap<String, P, S> {
    type Protein = P;
    fn protein(&self, key: &str) -> Option<&P> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use context_error::*;

    use super::*;
    use crate::key::PeptideKey;

    fn records(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn full_domain() {
        let store = records(&[
            ("domainid_s1_p1_d1", "1.1.1.1"),
            ("proteinkey_s1_p1_d1", "sp|P02769|ALBU_BOVIN"),
            ("domainstart_s1_p1_d1", "66"),
            ("domainend_s1_p1_d1", "75"),
            ("expect_s1_p1_d1", "2.3e-05"),
            ("mh_s1_p1_d1", "1163.6306"),
            ("delta_s1_p1_d1", "-0.003"),
            ("hyperscore_s1_p1_d1", "42.1"),
            ("nextscore_s1_p1_d1", "18.3"),
            ("pre_s1_p1_d1", "ENFK"),
            ("post_s1_p1_d1", "LVNE"),
            ("domainseq_s1_p1_d1", "ALVLIAFAQY"),
            ("missed_cleavages_s1_p1_d1", "1"),
        ]);
        let key = PeptideKey::new(1, 1).domain(1);
        let domain = Domain::from_records(&store, key, "1.1.1.1".to_string()).unwrap();
        assert_eq!(domain.key.to_string(), "s1_p1_d1");
        assert_eq!(domain.protein_key, "sp|P02769|ALBU_BOVIN");
        assert_eq!((domain.start, domain.end), (66, 75));
        assert_eq!(domain.len(), Some(10));
        assert!((domain.expect - 2.3e-5).abs() < f64::EPSILON);
        assert!((domain.delta_mh + 0.003).abs() < f64::EPSILON);
        assert_eq!(domain.up_flank_sequence, "ENFK");
        assert_eq!(domain.down_flank_sequence, "LVNE");
        assert_eq!(domain.sequence, "ALVLIAFAQY");
        assert_eq!(domain.missed_cleavages, 1);
    }

    #[test]
    fn missing_fields_are_zero() {
        let store = records(&[("domainid_s2_p1_d1", "2.1.1.1")]);
        let domain = Domain::from_records(
            &store,
            PeptideKey::new(2, 1).domain(1),
            "2.1.1.1".to_string(),
        )
        .unwrap();
        assert_eq!(domain.hyperscore, 0.0);
        assert_eq!(domain.missed_cleavages, 0);
        assert_eq!(domain.len(), None);
        assert!(domain.protein_key.is_empty());
    }

    #[test]
    fn malformed_fields_are_errors() {
        let store = records(&[("missed_cleavages_s1_p1_d1", "one")]);
        let error = Domain::from_records(
            &store,
            PeptideKey::new(1, 1).domain(1),
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(error.get_kind(), TandemErrorKind::MalformedValue));

        let store = records(&[
            ("domainstart_s1_p1_d1", "20"),
            ("domainend_s1_p1_d1", "10"),
        ]);
        let error = Domain::from_records(
            &store,
            PeptideKey::new(1, 1).domain(1),
            String::new(),
        )
        .unwrap_err();
        assert!(matches!(
            error.get_kind(),
            TandemErrorKind::InconsistentRange
        ));
    }

    #[test]
    fn resolve_protein() {
        let proteins: HashMap<String, &str> =
            std::iter::once(("P1".to_string(), "Serum albumin")).collect();
        let domain = Domain {
            protein_key: "P1".to_string(),
            ..Domain::default()
        };
        assert_eq!(domain.protein(&proteins), Some(&"Serum albumin"));
        assert_eq!(Domain::default().protein(&proteins), None);
    }

    #[test]
    fn length_of_unchecked_domains() {
        let reversed = Domain {
            start: 10,
            end: 5,
            ..Domain::default()
        };
        assert_eq!(reversed.len(), None);
        let single = Domain {
            start: 7,
            end: 7,
            ..Domain::default()
        };
        assert_eq!(single.len(), Some(1));

        let deserialised: Domain = serde_json::from_value(serde_json::json!({
            "key": "s1_p1_d1",
            "id": "1.1.1.1",
            "protein_key": "P1",
            "start": 10,
            "end": 5,
            "expect": 0.0,
            "mh": 0.0,
            "delta_mh": 0.0,
            "hyperscore": 0.0,
            "next_score": 0.0,
            "up_flank_sequence": "",
            "down_flank_sequence": "",
            "sequence": "",
            "missed_cleavages": 0,
        }))
        .unwrap();
        assert_eq!(deserialised.len(), None);
    }
}
