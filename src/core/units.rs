//! Unit normalization and conversion arithmetic.
//!
//! All purchase units reduce to one of three base units: grams for mass,
//! milliliters for volume, and `un` for things counted by the piece. The
//! normalizer turns a package purchase into a price per base unit, and the
//! same conversion rules map a recipe line's usage quantity back into base
//! units for costing. Everything here is pure; callers parse unit strings at
//! the boundary, once.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A purchase or usage unit as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Kilogram (mass, 1000 g)
    Kg,
    /// Gram (mass base)
    G,
    /// Liter (volume, 1000 ml)
    L,
    /// Milliliter (volume base)
    Ml,
    /// Piece / unit count
    Un,
}

/// A canonical base unit used for stored prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseUnit {
    /// Gram
    G,
    /// Milliliter
    Ml,
    /// Piece / unit count
    Un,
}

impl Unit {
    /// The base unit this unit reduces to.
    #[must_use]
    pub const fn base(self) -> BaseUnit {
        match self {
            Self::Kg | Self::G => BaseUnit::G,
            Self::L | Self::Ml => BaseUnit::Ml,
            Self::Un => BaseUnit::Un,
        }
    }

    /// Multiplier that converts a quantity in this unit into its base unit.
    #[must_use]
    pub const fn base_factor(self) -> f64 {
        match self {
            Self::Kg | Self::L => 1000.0,
            Self::G | Self::Ml | Self::Un => 1.0,
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kg" => Ok(Self::Kg),
            "g" => Ok(Self::G),
            "l" => Ok(Self::L),
            "ml" => Ok(Self::Ml),
            "un" => Ok(Self::Un),
            other => Err(Error::UnknownUnit {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Kg => "kg",
            Self::G => "g",
            Self::L => "l",
            Self::Ml => "ml",
            Self::Un => "un",
        };
        write!(f, "{s}")
    }
}

impl FromStr for BaseUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "g" => Ok(Self::G),
            "ml" => Ok(Self::Ml),
            "un" => Ok(Self::Un),
            other => Err(Error::UnknownUnit {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::G => "g",
            Self::Ml => "ml",
            Self::Un => "un",
        };
        write!(f, "{s}")
    }
}

/// Converts a `(price, quantity, unit)` package purchase into a price per
/// base unit.
///
/// A 1 kg package bought for R$10 normalizes to 0.01 per gram. Zero or
/// negative quantities must be rejected by the caller before a purchase
/// reaches persistence; this function enforces that with `InvalidQuantity`.
pub fn normalize(price: f64, quantity: f64, unit: Unit) -> Result<(f64, BaseUnit)> {
    if quantity <= 0.0 {
        return Err(Error::InvalidQuantity { quantity });
    }
    let base_price = price / (quantity * unit.base_factor());
    Ok((base_price, unit.base()))
}

/// Converts a usage quantity expressed in `unit` into the ingredient's base
/// unit.
///
/// Crossing `kg→g` or `l→ml` multiplies by 1000; a quantity already in the
/// base family passes through unchanged. Cross-family conversions (mass
/// against volume, or either against a piece count) have no meaningful
/// answer and fail with `IncompatibleUnit`.
pub fn convert_to_base(quantity: f64, unit: Unit, base: BaseUnit) -> Result<f64> {
    if unit.base() != base {
        return Err(Error::IncompatibleUnit {
            used: unit.to_string(),
            base: base.to_string(),
        });
    }
    Ok(quantity * unit.base_factor())
}

/// Grams contributed by a quantity in the given unit.
///
/// Volume is treated as mass at density 1 (ml ≈ g), which is the convention
/// for recipe weight totals. Piece counts contribute nothing.
#[must_use]
pub fn weight_grams(quantity: f64, unit: Unit) -> f64 {
    match unit {
        Unit::G | Unit::Ml => quantity,
        Unit::Kg | Unit::L => quantity * 1000.0,
        Unit::Un => 0.0,
    }
}
