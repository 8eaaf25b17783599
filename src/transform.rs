//! Value conversion for the display: mg/dL → mmol/L and trend code → arrow.

use std::fmt;

/// mg/dL per mmol/L, as Nightscout uses for its own unit toggle.
const MG_DL_PER_MMOL: f64 = 18.0;

/// A glucose value in mmol/L held as whole tenths.
///
/// Storing tenths keeps the low-value comparison exact: `4.5` is `45`, so
/// there is no float noise right at the alert threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mmol {
    tenths: i64,
}

impl Mmol {
    /// Convert mg/dL to mmol/L rounded to one decimal place.
    pub fn from_mg_dl(mg_dl: i64) -> Self {
        let tenths = (mg_dl as f64 * 10.0 / MG_DL_PER_MMOL).round() as i64;
        Self { tenths }
    }

    pub const fn from_tenths(tenths: i64) -> Self {
        Self { tenths }
    }
}

impl fmt::Display for Mmol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tenths < 0 { "-" } else { "" };
        let abs = self.tenths.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

/// Nightscout trend directions that have an arrow on the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Flat,
    SingleUp,
    DoubleUp,
    DoubleDown,
    SingleDown,
    FortyFiveDown,
    FortyFiveUp,
    /// `NONE`, `NOT COMPUTABLE`, `RATE OUT OF RANGE`, or anything unexpected
    Unknown,
}

impl Direction {
    /// Exact, case-sensitive match on the code Nightscout sends.
    pub fn from_code(code: &str) -> Self {
        match code {
            "Flat" => Direction::Flat,
            "SingleUp" => Direction::SingleUp,
            "DoubleUp" => Direction::DoubleUp,
            "DoubleDown" => Direction::DoubleDown,
            "SingleDown" => Direction::SingleDown,
            "FortyFiveDown" => Direction::FortyFiveDown,
            "FortyFiveUp" => Direction::FortyFiveUp,
            _ => Direction::Unknown,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Direction::Flat => "→",
            Direction::SingleUp => "↑",
            Direction::DoubleUp => "↑↑",
            Direction::DoubleDown => "↓↓",
            Direction::SingleDown => "↓",
            Direction::FortyFiveDown => "→↓",
            Direction::FortyFiveUp => "→↑",
            Direction::Unknown => "---",
        }
    }
}

/// Map a trend code straight to its glyph, falling back to `---`.
pub fn direction_glyph(code: &str) -> &'static str {
    Direction::from_code(code).glyph()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_directions_map_to_arrows() {
        let cases = [
            ("Flat", "→"),
            ("SingleUp", "↑"),
            ("DoubleUp", "↑↑"),
            ("DoubleDown", "↓↓"),
            ("SingleDown", "↓"),
            ("FortyFiveDown", "→↓"),
            ("FortyFiveUp", "→↑"),
        ];
        for (code, glyph) in cases {
            assert_eq!(direction_glyph(code), glyph, "code {code}");
        }
    }

    #[test]
    fn test_unknown_directions_fall_back() {
        for code in ["", "flat", "NONE", "NOT COMPUTABLE", "\"Flat\"", " Flat", "↑"] {
            assert_eq!(direction_glyph(code), "---", "code {code:?}");
        }
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(Mmol::from_mg_dl(81).to_string(), "4.5");
        assert_eq!(Mmol::from_mg_dl(80).to_string(), "4.4");
        assert!(Mmol::from_mg_dl(80) < Mmol::from_tenths(45));
        assert!(Mmol::from_mg_dl(81) >= Mmol::from_tenths(45));
    }

    #[test]
    fn test_always_one_decimal_digit() {
        assert_eq!(Mmol::from_mg_dl(0).to_string(), "0.0");
        assert_eq!(Mmol::from_mg_dl(180).to_string(), "10.0");
        assert_eq!(Mmol::from_mg_dl(187).to_string(), "10.4");
        assert_eq!(Mmol::from_mg_dl(400).to_string(), "22.2");
    }

    #[test]
    fn test_matches_float_rounding_for_sensor_range() {
        // Sensors report 39..=401; check a generous superset.
        for mg_dl in 0..=1000i64 {
            let expected = format!("{:.1}", mg_dl as f64 / 18.0);
            let got = Mmol::from_mg_dl(mg_dl).to_string();
            assert_eq!(got, expected, "mg/dL {mg_dl}");
            assert_eq!(got.split('.').nth(1).map(str::len), Some(1));
        }
    }

    #[test]
    fn test_negative_values_format_with_sign() {
        assert_eq!(Mmol::from_tenths(-5).to_string(), "-0.5");
        assert_eq!(Mmol::from_mg_dl(-18).to_string(), "-1.0");
    }
}
