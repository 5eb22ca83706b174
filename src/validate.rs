//! Call validation against a capability catalog.
//!
//! Accepted calls are wrapped in [`ValidatedCall`], which can only be built here, so the
//! dispatcher can rely on the name being in the catalog. Rejected calls are reported back
//! for diagnostics but never dispatched.

use std::borrow::Borrow;
use std::ops::Deref;

use serde::Serialize;

use crate::parse::FunctionCall;
use crate::registry::{Catalog, CommandSet};
use crate::state::bounds;
use crate::value::Value;

/// A call whose name is in the model-facing catalog, with overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedCall(FunctionCall);

impl ValidatedCall {
    pub fn into_inner(self) -> FunctionCall {
        self.0
    }
}

impl Deref for ValidatedCall {
    type Target = FunctionCall;

    fn deref(&self) -> &FunctionCall {
        &self.0
    }
}

impl Borrow<FunctionCall> for ValidatedCall {
    fn borrow(&self) -> &FunctionCall {
        &self.0
    }
}

/// A call the validator dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub call: FunctionCall,
    pub reason: String,
}

pub struct Validator {
    catalog: Catalog,
}

impl Validator {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn for_set<C: CommandSet>() -> Self {
        Self::new(Catalog::of::<C>())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Accept `call` iff its name is model-facing in the catalog, then apply overrides.
    pub fn validate(&self, call: FunctionCall) -> Result<ValidatedCall, Rejection> {
        let Some(entry) = self.catalog.get(&call.name).filter(|e| !e.llm_hidden) else {
            tracing::debug!(name = %call.name, "rejecting call outside the catalog");
            return Err(Rejection {
                reason: format!("'{}' is not in the capability catalog", call.name),
                call,
            });
        };

        let mut call = call;
        if entry.temperature {
            clamp_temperature(&mut call);
        }
        Ok(ValidatedCall(call))
    }

    /// Validate a batch, preserving order within each side.
    pub fn validate_all(
        &self,
        calls: impl IntoIterator<Item = FunctionCall>,
    ) -> (Vec<ValidatedCall>, Vec<Rejection>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for call in calls {
            match self.validate(call) {
                Ok(call) => accepted.push(call),
                Err(rejection) => rejected.push(rejection),
            }
        }
        (accepted, rejected)
    }
}

/// Numeric `temperature` values are truncated and clamped to the AC range. Text values
/// are left for the handler to cast.
#[allow(clippy::cast_possible_truncation)] // truncation toward zero is the intended cast
fn clamp_temperature(call: &mut FunctionCall) {
    let Some(value) = call.parameters.get_mut("temperature") else {
        return;
    };
    let degrees = match *value {
        Value::Integer(i) => i,
        Value::Float(f) => f.trunc() as i64,
        _ => return,
    };
    *value = Value::Integer(bounds::AC_TEMPERATURE.clamp(degrees));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::{ClimateCommand, HomeCommand};

    #[test]
    fn known_names_pass_unknown_are_rejected() {
        let validator = Validator::for_set::<ClimateCommand>();
        assert!(validator.validate(FunctionCall::bare("power_on")).is_ok());
        let rejection = validator.validate(FunctionCall::bare("fly_to_moon")).unwrap_err();
        assert_eq!(rejection.call.name, "fly_to_moon");
    }

    #[test]
    fn hidden_operations_are_rejected() {
        let validator = Validator::for_set::<ClimateCommand>();
        assert!(validator.validate(FunctionCall::bare("update_environment")).is_err());
    }

    #[test]
    fn temperature_override_clamps_numbers() {
        let validator = Validator::for_set::<ClimateCommand>();
        let call = validator
            .validate(FunctionCall::bare("set_temperature").with("temperature", 35_i64))
            .unwrap();
        assert_eq!(call.parameters.get("temperature"), Some(&Value::Integer(30)));

        let call = validator
            .validate(FunctionCall::bare("set_temperature").with("temperature", 17.9))
            .unwrap();
        assert_eq!(call.parameters.get("temperature"), Some(&Value::Integer(17)));
    }

    #[test]
    fn override_applies_to_home_set_and_skips_text() {
        let validator = Validator::for_set::<HomeCommand>();
        let call = validator
            .validate(FunctionCall::bare("ac_set_temperature").with("temperature", 3_i64))
            .unwrap();
        assert_eq!(call.parameters.get("temperature"), Some(&Value::Integer(16)));

        let call = validator
            .validate(FunctionCall::bare("ac_set_temperature").with("temperature", "warm"))
            .unwrap();
        assert_eq!(call.parameters.get("temperature"), Some(&Value::Text("warm".into())));
    }

    #[test]
    fn other_operations_are_untouched() {
        let validator = Validator::for_set::<HomeCommand>();
        let call = validator
            .validate(FunctionCall::bare("tv_set_volume").with("volume", 150_i64))
            .unwrap();
        assert_eq!(call.parameters.get("volume"), Some(&Value::Integer(150)));
    }

    #[test]
    fn batch_keeps_order() {
        let validator = Validator::for_set::<HomeCommand>();
        let (accepted, rejected) = validator.validate_all([
            FunctionCall::bare("tv_power_on"),
            FunctionCall::bare("nope"),
            FunctionCall::bare("light_power_on"),
        ]);
        let names: Vec<_> = accepted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["tv_power_on", "light_power_on"]);
        assert_eq!(rejected.len(), 1);
    }
}
