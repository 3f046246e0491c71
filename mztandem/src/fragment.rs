use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::TandemError, tolerance::Tolerance};

/// The type of a fragment ion.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[expect(non_camel_case_types)]
pub enum FragmentKind {
    /// a
    a,
    /// b
    #[default]
    b,
    /// c
    c,
    /// x
    x,
    /// y
    y,
    /// z
    z,
    /// An immonium ion
    Immonium,
    /// The precursor
    Precursor,
    /// Any other ion type, stored as given
    Other(String),
}

impl Display for FragmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::a => write!(f, "a"),
            Self::b => write!(f, "b"),
            Self::c => write!(f, "c"),
            Self::x => write!(f, "x"),
            Self::y => write!(f, "y"),
            Self::z => write!(f, "z"),
            Self::Immonium => write!(f, "immonium"),
            Self::Precursor => write!(f, "precursor"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for FragmentKind {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "a" => Self::a,
            "b" => Self::b,
            "c" => Self::c,
            "x" => Self::x,
            "y" => Self::y,
            "z" => Self::z,
            "immonium" | "Immonium" | "imm" => Self::Immonium,
            "precursor" | "Precursor" | "p" => Self::Precursor,
            other => Self::Other(other.to_string()),
        })
    }
}

/// An observed peak in a spectrum.
pub trait PeakLike {
    /// The m/z of this peak
    fn mz(&self) -> f64;
    /// The intensity of this peak
    fn intensity(&self) -> f64;
}

/// A centroided peak
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Peak {
    /// The m/z
    pub mz: f64,
    /// The intensity
    pub intensity: f64,
}

impl Peak {
    /// Create a new peak
    pub const fn new(mz: f64, intensity: f64) -> Self {
        Self { mz, intensity }
    }
}

impl PeakLike for Peak {
    fn mz(&self) -> f64 {
        self.mz
    }
    fn intensity(&self) -> f64 {
        self.intensity
    }
}

/// `(mz, intensity)`
impl PeakLike for (f64, f64) {
    fn mz(&self) -> f64 {
        self.0
    }
    fn intensity(&self) -> f64 {
        self.1
    }
}

impl<P: PeakLike + ?Sized> PeakLike for &P {
    fn mz(&self) -> f64 {
        (**self).mz()
    }
    fn intensity(&self) -> f64 {
        (**self).intensity()
    }
}

/// A theoretical fragment ion, e.g. the b3 ion of a peptide.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FragmentIon {
    /// The theoretical m/z
    pub mz: f64,
    /// The ion number, 3 for a b3 ion
    pub number: usize,
    /// The ion type
    pub kind: FragmentKind,
    /// The error margin, used by viewers to draw the tolerance window
    pub error_margin: f64,
    /// An identifier for the ion series, as defined by the caller
    pub identifier: i32,
    /// The score of this ion
    pub score: f64,
}

/// The first peak within tolerance of a fragment ion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeakMatch<'a, P> {
    /// The matched peak
    pub peak: &'a P,
    /// The index of the peak in the given peak list
    pub index: usize,
    /// The signed difference `peak mz - theoretical mz`
    pub mass_error: f64,
}

impl<P: PeakLike> PeakMatch<'_, P> {
    /// The observed intensity
    pub fn intensity(&self) -> f64 {
        self.peak.intensity()
    }
}

/// A fragment ion together with the peak it was observed as.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchedFragmentIon {
    /// The theoretical ion
    pub ion: FragmentIon,
    /// The intensity of the matched peak
    pub intensity: f64,
    /// The signed difference `peak mz - theoretical mz`
    pub mass_error: f64,
    /// The index of the matched peak in the peak list
    pub peak_index: usize,
}

impl FragmentIon {
    /// Create a new fragment ion
    pub const fn new(
        mz: f64,
        identifier: i32,
        number: usize,
        kind: FragmentKind,
        error_margin: f64,
    ) -> Self {
        Self {
            mz,
            number,
            kind,
            error_margin,
            identifier,
            score: 0.0,
        }
    }

    /// Set the score of this ion
    #[must_use]
    pub fn score(self, score: f64) -> Self {
        Self { score, ..self }
    }

    /// Find the first peak (in the given order) within the tolerance of this ion. This is the
    /// first match, not the closest one.
    ///
    /// # Errors
    /// If the tolerance is negative or not finite.
    pub fn find_match<'a, P: PeakLike>(
        &self,
        peaks: &'a [P],
        tolerance: Tolerance,
    ) -> Result<Option<PeakMatch<'a, P>>, TandemError> {
        let tolerance = tolerance.validate()?;
        Ok(self.first_within(peaks, tolerance))
    }

    /// The tolerance has to be validated already
    fn first_within<'a, P: PeakLike>(
        &self,
        peaks: &'a [P],
        tolerance: Tolerance,
    ) -> Option<PeakMatch<'a, P>> {
        peaks
            .iter()
            .enumerate()
            .find(|(_, peak)| tolerance.within(self.mz, peak.mz()))
            .map(|(index, peak)| PeakMatch {
                peak,
                index,
                mass_error: peak.mz() - self.mz,
            })
    }

    /// Match this ion against the peaks and if found bind the observed intensity and mass error.
    ///
    /// # Errors
    /// If the tolerance is negative or not finite.
    pub fn annotate<P: PeakLike>(
        &self,
        peaks: &[P],
        tolerance: Tolerance,
    ) -> Result<Option<MatchedFragmentIon>, TandemError> {
        Ok(self
            .find_match(peaks, tolerance)?
            .map(|found| MatchedFragmentIon {
                ion: self.clone(),
                intensity: found.intensity(),
                mass_error: found.mass_error,
                peak_index: found.index,
            }))
    }
}

impl Display for FragmentIon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} ({:.4})", self.kind, self.number, self.mz)
    }
}

/// Match every ion against the same list of peaks, the result is in the same order as the ions.
///
/// # Errors
/// If the tolerance is negative or not finite.
pub fn match_fragments<'a, P: PeakLike + Sync>(
    ions: &[FragmentIon],
    peaks: &'a [P],
    tolerance: Tolerance,
) -> Result<Vec<Option<PeakMatch<'a, P>>>, TandemError> {
    let tolerance = tolerance.validate()?;
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        Ok(ions
            .par_iter()
            .map(|ion| ion.first_within(peaks, tolerance))
            .collect())
    }
    #[cfg(not(feature = "rayon"))]
    {
        Ok(ions
            .iter()
            .map(|ion| ion.first_within(peaks, tolerance))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use context_error::*;

    use super::*;
    use crate::error::TandemErrorKind;

    fn ion(mz: f64) -> FragmentIon {
        FragmentIon::new(mz, 0, 3, FragmentKind::b, 0.5)
    }

    #[test]
    fn first_match_wins() {
        let peaks = [(100.9, 10.0), (100.1, 20.0)];
        let tolerance = Tolerance::new_absolute(1.0).unwrap();
        let found = ion(100.0).find_match(&peaks, tolerance).unwrap().unwrap();
        assert_eq!(found.index, 0);
        assert!((found.mass_error - 0.9).abs() < 1e-9);
        assert!((found.intensity() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn signed_mass_error() {
        let peaks = [Peak::new(50.0, 1.0), Peak::new(99.75, 7.5)];
        let matched = ion(100.0)
            .annotate(&peaks, Tolerance::new_absolute(0.5).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(matched.peak_index, 1);
        assert!((matched.mass_error + 0.25).abs() < f64::EPSILON);
        assert!((matched.intensity - 7.5).abs() < f64::EPSILON);
        assert_eq!(matched.ion, ion(100.0));

        let scored = ion(100.0).score(0.75);
        let matched = scored
            .annotate(&peaks, Tolerance::new_absolute(0.5).unwrap())
            .unwrap()
            .unwrap();
        assert!((matched.ion.score - 0.75).abs() < f64::EPSILON);
        assert!((ion(100.0).score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn boundaries() {
        let tolerance = Tolerance::new_absolute(0.5).unwrap();
        let at_edge = [(100.5, 1.0)];
        let beyond_edge = [(100.500_000_1, 1.0)];
        let below_edge = [(99.5, 2.0)];
        assert!(ion(100.0).find_match(&at_edge, tolerance).unwrap().is_some());
        assert!(ion(100.0).find_match(&below_edge, tolerance).unwrap().is_some());
        assert!(ion(100.0).find_match(&beyond_edge, tolerance).unwrap().is_none());
    }

    #[test]
    fn exact_tolerance() {
        let tolerance = Tolerance::new_absolute(0.0).unwrap();
        let peaks = [(200.000_01, 1.0), (200.0, 3.0)];
        let found = ion(200.0).find_match(&peaks, tolerance).unwrap().unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.mass_error, 0.0);
    }

    #[test]
    fn no_peaks() {
        let peaks: [Peak; 0] = [];
        assert!(ion(100.0)
            .annotate(&peaks, Tolerance::default())
            .unwrap()
            .is_none());
        let far = [Peak::new(300.0, 1.0)];
        assert!(ion(100.0)
            .annotate(&far, Tolerance::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let peaks = [(100.0, 1.0)];
        let error = ion(100.0)
            .find_match(&peaks, Tolerance::Absolute(-1.0))
            .unwrap_err();
        assert!(matches!(error.get_kind(), TandemErrorKind::InvalidTolerance));
        assert!(match_fragments(&[ion(100.0)], &peaks, Tolerance::Absolute(-1.0)).is_err());
    }

    #[test]
    fn many_ions() {
        let peaks = [Peak::new(147.11, 5.0), Peak::new(276.16, 9.0)];
        let ions = [ion(147.113), ion(200.0), ion(276.155)];
        let matches = match_fragments(&ions, &peaks, Tolerance::new_ppm(50.0).unwrap()).unwrap();
        assert_eq!(
            matches.iter().map(|m| m.map(|m| m.index)).collect::<Vec<_>>(),
            vec![Some(0), None, Some(1)]
        );
    }

    #[test]
    fn kind_round_trip() {
        for text in ["a", "b", "y", "immonium", "precursor", "b-H2O"] {
            let kind: FragmentKind = text.parse().unwrap();
            assert_eq!(kind.to_string(), text);
        }
        assert_eq!(ion(1.0).to_string(), "b3 (1.0000)");
    }
}
