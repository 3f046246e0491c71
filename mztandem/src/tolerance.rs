use std::{fmt::Display, str::FromStr};

use context_error::{BoxedError, Context, CreateError};
use serde::{Deserialize, Serialize};

use crate::error::{TandemError, TandemErrorKind};

/// A tolerance around a theoretical m/z, the window is closed so a peak exactly at the edge matches.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum Tolerance {
    /// An absolute tolerance in m/z (Thomson)
    Absolute(f64),
    /// A relative tolerance in ppm of the theoretical m/z
    Relative(f64),
}

impl Tolerance {
    /// Create an absolute tolerance.
    /// # Errors
    /// If the tolerance is negative or not finite.
    pub fn new_absolute(value: f64) -> Result<Self, TandemError> {
        Self::Absolute(value).validate()
    }

    /// Create a relative tolerance in ppm.
    /// # Errors
    /// If the tolerance is negative or not finite.
    pub fn new_ppm(value: f64) -> Result<Self, TandemError> {
        Self::Relative(value).validate()
    }

    /// Check that this tolerance can be used for matching.
    /// # Errors
    /// If the tolerance is negative or not finite.
    pub fn validate(self) -> Result<Self, TandemError> {
        let value = match self {
            Self::Absolute(v) | Self::Relative(v) => v,
        };
        if value.is_finite() && value >= 0.0 {
            Ok(self)
        } else {
            let text = self.to_string();
            Err(BoxedError::new(
                TandemErrorKind::InvalidTolerance,
                "Invalid tolerance",
                "A tolerance has to be a finite number of at least zero",
                Context::none().lines(0, text.as_str()).to_owned(),
            ))
        }
    }

    /// The half width of the window around the given theoretical m/z
    pub fn window(self, mz: f64) -> f64 {
        match self {
            Self::Absolute(v) => v,
            Self::Relative(ppm) => mz.abs() * ppm * 1e-6,
        }
    }

    /// Check if the observed m/z falls within this tolerance of the theoretical m/z
    pub fn within(self, theoretical: f64, observed: f64) -> bool {
        let window = self.window(theoretical);
        let difference = observed - theoretical;
        -window <= difference && difference <= window
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::Absolute(0.5)
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute(v) => write!(f, "{v} Th"),
            Self::Relative(v) => write!(f, "{v} ppm"),
        }
    }
}

impl FromStr for Tolerance {
    type Err = TandemError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (number, relative) = ["ppm", "da", "th", "mz"]
            .into_iter()
            .find_map(|unit| {
                lower
                    .strip_suffix(unit)
                    .map(|number| (&trimmed[..number.len()], unit == "ppm"))
            })
            .unwrap_or((trimmed, false));
        let error = || {
            BoxedError::new(
                TandemErrorKind::InvalidTolerance,
                "Invalid tolerance",
                "A tolerance should be a number optionally followed by 'da', 'th', or 'ppm'",
                Context::none().lines(0, s).to_owned(),
            )
        };
        let value = number.trim().parse::<f64>().map_err(|_| error())?;
        if relative {
            Self::new_ppm(value)
        } else {
            Self::new_absolute(value)
        }
    }
}
