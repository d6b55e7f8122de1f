//! Physical lengths and paper sizes.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;
/// English Metric Units per millimetre.
pub const EMU_PER_MM: i64 = 36_000;
/// English Metric Units per point.
pub const EMU_PER_PT: i64 = 12_700;
/// English Metric Units per twip (1/20 pt), the unit of page geometry in WordprocessingML.
pub const EMU_PER_TWIP: i64 = 635;

/// A physical length stored as an integer number of EMUs.
///
/// Inches, millimetres, points and twips are all whole multiples of an EMU,
/// so values given in any of those units are represented exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Length(i64);

impl Length {
    /// Zero length.
    pub const ZERO: Length = Length(0);

    /// Largest page dimension WordprocessingML accepts (22in). Parsed
    /// lengths beyond it in either direction are rejected.
    pub const MAX: Length = Length::from_twips(31_680);

    /// Create a length from raw EMUs.
    pub const fn from_emu(emu: i64) -> Self {
        Self(emu)
    }

    /// Create a length from inches.
    pub fn from_inches(inches: f64) -> Self {
        Self((inches * EMU_PER_INCH as f64).round() as i64)
    }

    /// Create a length from millimetres.
    pub fn from_mm(mm: f64) -> Self {
        Self((mm * EMU_PER_MM as f64).round() as i64)
    }

    /// Create a length from centimetres.
    pub fn from_cm(cm: f64) -> Self {
        Self::from_mm(cm * 10.0)
    }

    /// Create a length from points.
    pub fn from_pt(pt: f64) -> Self {
        Self((pt * EMU_PER_PT as f64).round() as i64)
    }

    /// Create a length from twips.
    pub const fn from_twips(twips: i64) -> Self {
        Self(twips.saturating_mul(EMU_PER_TWIP))
    }

    /// Raw EMU value.
    pub const fn emu(self) -> i64 {
        self.0
    }

    /// Value in twips, rounded to the nearest twip.
    pub fn twips(self) -> i64 {
        (self.0 as f64 / EMU_PER_TWIP as f64).round() as i64
    }

    /// Value in inches.
    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    /// Value in millimetres.
    pub fn mm(self) -> f64 {
        self.0 as f64 / EMU_PER_MM as f64
    }

    /// Value in points.
    pub fn pt(self) -> f64 {
        self.0 as f64 / EMU_PER_PT as f64
    }

    /// Check if the length is below zero.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl std::ops::Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Length {
    /// Prints in the unit that represents the value most compactly:
    /// inches to two decimals, then millimetres to one, then points.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % (EMU_PER_INCH / 100) == 0 {
            write!(f, "{}in", self.inches())
        } else if self.0 % (EMU_PER_MM / 10) == 0 {
            write!(f, "{}mm", self.mm())
        } else {
            write!(f, "{}pt", self.pt())
        }
    }
}

impl FromStr for Length {
    type Err = Error;

    /// Parse a number followed by a unit: `1in`, `25.4 mm`, `2.5e1mm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.trim_end_matches(|c: char| c.is_ascii_alphabetic()).len();
        if split == s.len() {
            return Err(Error::InvalidConfig(format!("length '{}' has no unit", s)));
        }
        let (number, unit) = s.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid length '{}'", s)))?;
        if !value.is_finite() {
            return Err(Error::InvalidConfig(format!("invalid length '{}'", s)));
        }

        let length = match unit.to_ascii_lowercase().as_str() {
            "in" | "inch" | "inches" => Length::from_inches(value),
            "mm" => Length::from_mm(value),
            "cm" => Length::from_cm(value),
            "pt" => Length::from_pt(value),
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unknown length unit '{}' (expected in, mm, cm, or pt)",
                    other
                )))
            }
        };
        if !(-Length::MAX.0..=Length::MAX.0).contains(&length.0) {
            return Err(Error::InvalidConfig(format!(
                "length '{}' exceeds the largest page dimension ({})",
                s,
                Length::MAX
            )));
        }
        Ok(length)
    }
}

impl TryFrom<String> for Length {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Length> for String {
    fn from(length: Length) -> Self {
        length.to_string()
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    /// ISO A4, 210 × 297 mm
    #[default]
    A4,
    /// US Letter, 8.5 × 11 in
    Letter,
    /// US Legal, 8.5 × 14 in
    Legal,
    /// ISO A5, 148 × 210 mm
    A5,
    /// ISO B5, 176 × 250 mm
    B5,
}

impl PaperSize {
    /// Page width and height in portrait orientation.
    pub fn dimensions(self) -> (Length, Length) {
        match self {
            PaperSize::A4 => (Length::from_mm(210.0), Length::from_mm(297.0)),
            PaperSize::Letter => (Length::from_inches(8.5), Length::from_inches(11.0)),
            PaperSize::Legal => (Length::from_inches(8.5), Length::from_inches(14.0)),
            PaperSize::A5 => (Length::from_mm(148.0), Length::from_mm(210.0)),
            PaperSize::B5 => (Length::from_mm(176.0), Length::from_mm(250.0)),
        }
    }

    /// Lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
            PaperSize::A5 => "a5",
            PaperSize::B5 => "b5",
        }
    }

    /// All supported paper sizes.
    pub fn all() -> &'static [PaperSize] {
        &[
            PaperSize::A4,
            PaperSize::Letter,
            PaperSize::Legal,
            PaperSize::A5,
            PaperSize::B5,
        ]
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaperSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        PaperSize::all()
            .iter()
            .copied()
            .find(|p| p.name() == lower)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown paper size '{}'", s)))
    }
}
