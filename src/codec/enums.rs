//! Ordinal <-> label tables for enumerated attributes.

use super::CodecError;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr, VariantNames};

/// Conversion between a wire ordinal and its capability label.
pub trait LabelCodec: Copy + FromStr + Into<&'static str> + VariantNames {
    fn from_ordinal(ordinal: u64) -> Option<Self>;

    fn ordinal(self) -> u8;

    /// Label for a wire ordinal. `None` when the ordinal has no label.
    fn decode(ordinal: u64) -> Option<&'static str> {
        Self::from_ordinal(ordinal).map(Into::into)
    }

    /// Ordinal for a label (case-sensitive), falling back to a numeric ordinal.
    fn encode(input: &str) -> Result<u8, CodecError> {
        if let Ok(variant) = Self::from_str(input) {
            return Ok(variant.ordinal());
        }
        input
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::from_ordinal)
            .map(Self::ordinal)
            .ok_or_else(|| CodecError::UnknownLabel(input.to_string()))
    }

    /// All labels in ordinal order.
    fn labels() -> &'static [&'static str] {
        Self::VARIANTS
    }
}

/// Status LED behaviour.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, FromRepr, IntoStaticStr, VariantNames,
)]
#[repr(u8)]
pub enum LedMode {
    Always = 0,
    Never = 1,
    Night = 2,
}

impl LabelCodec for LedMode {
    fn from_ordinal(ordinal: u64) -> Option<Self> {
        u8::try_from(ordinal).ok().and_then(Self::from_repr)
    }

    fn ordinal(self) -> u8 {
        self as u8
    }
}

/// What the radar currently tracks.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, FromRepr, IntoStaticStr, VariantNames,
)]
#[repr(u8)]
pub enum TargetType {
    None = 0,
    Moving = 1,
    Stationary = 2,
    #[strum(serialize = "Moving and stationary")]
    MovingAndStationary = 3,
}

impl LabelCodec for TargetType {
    fn from_ordinal(ordinal: u64) -> Option<Self> {
        u8::try_from(ordinal).ok().and_then(Self::from_repr)
    }

    fn ordinal(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_led_mode_round_trip() {
        for mode in LedMode::iter() {
            let ordinal = u64::from(mode.ordinal());
            let label = LedMode::decode(ordinal).unwrap();
            assert_eq!(LedMode::encode(label), Ok(mode.ordinal()));
        }
    }

    #[test]
    fn test_target_type_round_trip() {
        for target in TargetType::iter() {
            let ordinal = u64::from(target.ordinal());
            let label = TargetType::decode(ordinal).unwrap();
            assert_eq!(TargetType::encode(label), Ok(target.ordinal()));
        }
        assert_eq!(TargetType::decode(3), Some("Moving and stationary"));
    }

    #[test]
    fn test_out_of_range_decodes_to_none() {
        assert_eq!(LedMode::decode(3), None);
        assert_eq!(LedMode::decode(u64::MAX), None);
        assert_eq!(TargetType::decode(4), None);
        assert_eq!(TargetType::decode(256), None);
    }

    #[test]
    fn test_encode_is_case_sensitive_with_numeric_fallback() {
        assert_eq!(LedMode::encode("Night"), Ok(2));
        assert_eq!(LedMode::encode("1"), Ok(1));
        assert_eq!(
            LedMode::encode("night"),
            Err(CodecError::UnknownLabel("night".to_string()))
        );
        assert!(LedMode::encode("7").is_err());
        assert!(LedMode::encode("").is_err());
    }

    #[test]
    fn test_labels_in_ordinal_order() {
        assert_eq!(LedMode::labels(), &["Always", "Never", "Night"]);
        assert_eq!(
            TargetType::labels(),
            &["None", "Moving", "Stationary", "Moving and stationary"]
        );
    }
}
