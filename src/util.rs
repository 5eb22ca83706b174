use serde::Serialize;

use crate::error::AppError;

/// Get the serde-serialized name of a unit enum variant.
/// Uses serde's own rules (rename_all, rename, etc.) as the single source of truth.
/// Returns `None` for non-string variants (data-carrying variants).
pub fn serde_variant_name<T: Serialize>(val: &T) -> Option<String> {
    match serde_json::to_value(val) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Get serde-serialized names for all variants of an enum.
/// Filters out any non-string variants (data-carrying variants).
pub fn serde_variant_names<T: Serialize>(variants: &[T]) -> Vec<String> {
    variants.iter().filter_map(serde_variant_name).collect()
}

/// Deserialize a string into an enum variant using serde's own rules.
/// Single source of truth: uses the same rename/rename_all config as normal deserialization.
pub fn from_serde_str<T: for<'de> serde::Deserialize<'de>>(s: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
}

/// Case-insensitive lookup of a closed vocabulary. The error names `field`, the offending
/// input, and every accepted label.
pub fn parse_choice<T>(field: &str, raw: &str, variants: &[T]) -> Result<T, AppError>
where
    T: Serialize + for<'de> serde::Deserialize<'de>,
{
    from_serde_str(&raw.trim().to_lowercase()).ok_or_else(|| AppError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        allowed: serde_variant_names(variants),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::{CleaningZone, FanSpeed};

    #[test]
    fn variant_names_follow_serde() {
        assert_eq!(
            serde_variant_names(CleaningZone::ALL),
            ["living_room", "bedroom", "kitchen", "bathroom"]
        );
        assert_eq!(serde_variant_name(&FanSpeed::High).as_deref(), Some("high"));
    }

    #[test]
    fn choice_is_case_insensitive() {
        assert_eq!(parse_choice("speed", " HIGH ", FanSpeed::ALL), Ok(FanSpeed::High));
        assert_eq!(
            parse_choice("zone", "Living_Room", CleaningZone::ALL),
            Ok(CleaningZone::LivingRoom)
        );
    }

    #[test]
    fn unknown_choice_names_value() {
        let err = parse_choice("speed", "ultra", FanSpeed::ALL).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid speed 'ultra' (expected one of: low, medium, high, auto)"
        );
    }
}
