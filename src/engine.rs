//! One device set end to end: raw model output in, accepted calls and results out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::controller::{Controller, StateObserver};
use crate::describe::Describe;
use crate::dispatch::{dispatch, dispatch_one, DispatchResult};
use crate::parse::params::params_from_json;
use crate::parse::{self, FunctionCall};
use crate::registry::{Catalog, ClimateCommand, CommandSet, HomeCommand};
use crate::validate::{Rejection, ValidatedCall, Validator};

/// Which capability catalog a process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSet {
    /// Seven devices, `<device>_<operation>` names.
    #[default]
    Home,
    /// A single air conditioner with indoor/outdoor readings.
    Climate,
}

impl DeviceSet {
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Climate => "climate",
        }
    }

    /// A fresh engine with default device state.
    pub fn engine(self) -> Box<dyn CommandEngine> {
        match self {
            Self::Home => Box::new(Engine::<HomeCommand>::new()),
            Self::Climate => Box::new(Engine::<ClimateCommand>::new()),
        }
    }
}

impl std::fmt::Display for DeviceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Extraction and validation only; nothing has touched the state yet.
#[derive(Debug, Clone, Serialize)]
pub struct Interpretation {
    pub raw_output: String,
    pub calls: Vec<ValidatedCall>,
    pub rejected: Vec<Rejection>,
}

/// Response for one interpreted utterance. `success` means at least one call was accepted,
/// not that every dispatch succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub raw_output: String,
    pub function_calls: Vec<FunctionCall>,
    pub results: Vec<DispatchResult>,
}

pub struct Engine<C: CommandSet> {
    controller: Controller<C::State>,
    validator: Validator,
}

impl<C: CommandSet> Default for Engine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CommandSet> Engine<C> {
    pub fn new() -> Self {
        Self::with_state(C::State::default())
    }

    pub fn with_state(state: C::State) -> Self {
        Self {
            controller: Controller::new(state),
            validator: Validator::for_set::<C>(),
        }
    }

    pub fn controller(&self) -> &Controller<C::State> {
        &self.controller
    }

    pub fn state(&self) -> &C::State {
        self.controller.state()
    }

    pub fn catalog(&self) -> &Catalog {
        self.validator.catalog()
    }

    /// Extract calls from `raw` and keep the ones in the catalog.
    pub fn interpret(&self, raw: &str) -> Interpretation {
        let (calls, rejected) = self.validator.validate_all(parse::extract_calls(raw));
        if calls.is_empty() {
            tracing::debug!(rejected = rejected.len(), "no actionable command");
        }
        Interpretation {
            raw_output: raw.to_string(),
            calls,
            rejected,
        }
    }

    /// Interpret, then dispatch every accepted call in order.
    pub fn handle(&mut self, raw: &str) -> CommandOutcome {
        let interpretation = self.interpret(raw);
        let results = dispatch::<C, _>(
            &mut self.controller,
            interpretation.calls.iter().map(|call| &**call),
        );
        CommandOutcome {
            success: !interpretation.calls.is_empty(),
            raw_output: interpretation.raw_output,
            function_calls: interpretation
                .calls
                .into_iter()
                .map(ValidatedCall::into_inner)
                .collect(),
            results,
        }
    }

    /// Dispatch one call that did not come from the model, e.g. a manual control. Skips
    /// the validator, so hidden operations are reachable here.
    pub fn execute_call(&mut self, call: &FunctionCall) -> DispatchResult {
        dispatch_one::<C>(&mut self.controller, call)
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn StateObserver<C::State>>>) {
        self.controller.set_observer(observer);
    }
}

/// Object-safe view of an [`Engine`], so transports can hold either device set.
pub trait CommandEngine: Send {
    fn device_set(&self) -> DeviceSet;

    fn interpret(&self, raw: &str) -> Interpretation;

    fn handle(&mut self, raw: &str) -> CommandOutcome;

    /// Direct call with JSON parameters. Non-object parameters count as none.
    fn execute(&mut self, name: &str, params: &serde_json::Value) -> DispatchResult;

    fn snapshot(&self) -> serde_json::Value;

    /// Human-readable state lines, one per setting.
    fn describe(&self) -> Vec<String>;

    fn catalog(&self) -> &Catalog;

    /// Route change notifications to a JSON-level observer (e.g. a broadcast channel).
    fn observe(&mut self, observer: Arc<dyn StateObserver<serde_json::Value>>);
}

/// Adapts a JSON observer to a typed state tree.
struct JsonObserver(Arc<dyn StateObserver<serde_json::Value>>);

impl<T: Serialize> StateObserver<T> for JsonObserver {
    fn state_changed(&self, state: &T) {
        match serde_json::to_value(state) {
            Ok(json) => self.0.state_changed(&json),
            Err(e) => tracing::warn!("state snapshot not serializable: {e}"),
        }
    }
}

macro_rules! impl_command_engine {
    ($command:ty => $set:expr) => {
        impl CommandEngine for Engine<$command> {
            fn device_set(&self) -> DeviceSet {
                $set
            }

            fn interpret(&self, raw: &str) -> Interpretation {
                Engine::interpret(self, raw)
            }

            fn handle(&mut self, raw: &str) -> CommandOutcome {
                Engine::handle(self, raw)
            }

            fn execute(&mut self, name: &str, params: &serde_json::Value) -> DispatchResult {
                let call = FunctionCall::new(name, json_parameters(params));
                self.execute_call(&call)
            }

            fn snapshot(&self) -> serde_json::Value {
                self.controller.snapshot()
            }

            fn describe(&self) -> Vec<String> {
                self.controller.state().describe()
            }

            fn catalog(&self) -> &Catalog {
                Engine::catalog(self)
            }

            fn observe(&mut self, observer: Arc<dyn StateObserver<serde_json::Value>>) {
                self.set_observer(Some(Arc::new(JsonObserver(observer))));
            }
        }
    };
}

impl_command_engine!(HomeCommand => DeviceSet::Home);
impl_command_engine!(ClimateCommand => DeviceSet::Climate);

fn json_parameters(params: &serde_json::Value) -> parse::ParameterMap {
    params
        .as_object()
        .map(params_from_json)
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handle_reports_calls_and_results() {
        let mut engine = Engine::<HomeCommand>::new();
        let outcome = engine.handle(
            "<start_function_call>call:tv_power_on{}<end_function_call>\
             <start_function_call>call:fly{}<end_function_call>",
        );
        assert!(outcome.success);
        assert_eq!(outcome.function_calls.len(), 1);
        assert_eq!(outcome.results.len(), 1);
        assert!(engine.state().tv.power);
    }

    #[test]
    fn interpret_keeps_rejections() {
        let engine = Engine::<ClimateCommand>::new();
        let interpretation = engine.interpret("call:tv_power_on{}");
        assert!(interpretation.calls.is_empty());
        assert_eq!(interpretation.rejected.len(), 1);
        assert_eq!(interpretation.raw_output, "call:tv_power_on{}");
    }

    #[test]
    fn no_calls_is_not_success() {
        let mut engine = Engine::<HomeCommand>::new();
        let outcome = engine.handle("I cannot help with that.");
        assert!(!outcome.success);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn direct_execute_reaches_hidden_operations() {
        let mut engine = DeviceSet::Climate.engine();
        let result = engine.execute(
            "update_environment",
            &serde_json::json!({ "indoor_temperature": 21.0, "outdoor_temperature": null }),
        );
        assert!(result.success, "{}", result.message);
        assert_eq!(engine.snapshot()["indoor_temperature"], 21);
        assert_eq!(engine.snapshot()["outdoor_temperature"], 32);
    }

    #[test]
    fn execute_with_non_object_params_uses_defaults() {
        let mut engine = DeviceSet::Home.engine();
        let result = engine.execute("tv_set_channel", &serde_json::json!("ignored"));
        assert!(result.success);
        assert_eq!(engine.snapshot()["tv"]["channel"], 1);
    }

    #[test]
    fn json_observer_sees_snapshots() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut engine = DeviceSet::Home.engine();
        engine.observe(Arc::new(move |state: &serde_json::Value| {
            assert_eq!(state["light"]["power"], true);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        engine.handle("call:light_power_on{}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn device_set_labels() {
        assert_eq!(DeviceSet::Home.engine().device_set(), DeviceSet::Home);
        assert_eq!(DeviceSet::Climate.to_string(), "climate");
    }
}
