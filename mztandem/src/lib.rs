#![doc = include_str!("../README.md")]

mod domain;
mod error;
mod fragment;
mod key;
mod options;
mod peptide;
mod peptide_map;
mod probe;
mod record_store;
mod tolerance;

pub use domain::*;
pub use error::{TandemError, TandemErrorKind};
pub use fragment::*;
pub use key::*;
pub use options::*;
pub use peptide::*;
pub use peptide_map::*;
pub use record_store::RecordStore;
pub use tolerance::*;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::{
        BuildOptions, Domain, FragmentIon, Peptide, RecordStore, SpectrumPeptideMap, Tolerance,
    };
}
