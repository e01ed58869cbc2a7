//! Common measurement types and traits for cargo geometry.
//!
//! Trucks and product packages are both described by an axis-aligned
//! length × width × height in centimetres. This module holds that shared
//! representation, the unit conversions, and the numeric validation helpers
//! used by the model layer.

use serde::{Deserialize, Serialize};

/// Cubic centimetres per cubic metre.
pub const CM3_PER_M3: f64 = 1_000_000.0;

/// Kilograms per (metric) tonne.
pub const KG_PER_TONNE: f64 = 1_000.0;

/// Length × width × height in centimetres.
///
/// # Examples
/// ```
/// use load_planner::types::Dimensions;
///
/// let pallet = Dimensions::new(120.0, 80.0, 100.0);
/// assert!((pallet.volume_m3() - 0.96).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[inline]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Volume in cm³.
    #[inline]
    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Volume in m³.
    #[inline]
    pub fn volume_m3(&self) -> f64 {
        self.volume_cm3() / CM3_PER_M3
    }

    /// Returns the first component that is not positive and finite, labelled
    /// with the field names the caller uses for each axis.
    pub fn first_invalid<'a>(&self, names: [&'a str; 3]) -> Option<(&'a str, f64)> {
        [self.length, self.width, self.height]
            .into_iter()
            .zip(names)
            .find(|(value, _)| validation::check_positive(*value).is_err())
            .map(|(value, name)| (name, value))
    }
}

/// Anything with a physical extent.
pub trait Dimensional {
    fn dimensions(&self) -> Dimensions;

    fn volume_cm3(&self) -> f64 {
        self.dimensions().volume_cm3()
    }

    fn volume_m3(&self) -> f64 {
        self.dimensions().volume_m3()
    }
}

/// Anything with a weight in kg.
pub trait Weighted {
    fn weight_kg(&self) -> f64;
}

/// Numeric field checks shared by the model constructors.
pub mod validation {
    /// Why a numeric field was rejected.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum NumberProblem {
        NotANumber,
        Infinite,
        NotPositive,
        Negative,
    }

    impl NumberProblem {
        pub fn describe(&self) -> &'static str {
            match self {
                NumberProblem::NotANumber => "must be a number",
                NumberProblem::Infinite => "must be finite",
                NumberProblem::NotPositive => "must be greater than 0",
                NumberProblem::Negative => "must not be negative",
            }
        }
    }

    fn check_finite(value: f64) -> Result<(), NumberProblem> {
        if value.is_nan() {
            return Err(NumberProblem::NotANumber);
        }
        if value.is_infinite() {
            return Err(NumberProblem::Infinite);
        }
        Ok(())
    }

    /// Strictly positive and finite.
    pub fn check_positive(value: f64) -> Result<(), NumberProblem> {
        check_finite(value)?;
        if value <= 0.0 {
            return Err(NumberProblem::NotPositive);
        }
        Ok(())
    }

    /// Zero or positive, and finite.
    pub fn check_non_negative(value: f64) -> Result<(), NumberProblem> {
        check_finite(value)?;
        if value < 0.0 {
            return Err(NumberProblem::Negative);
        }
        Ok(())
    }
}
