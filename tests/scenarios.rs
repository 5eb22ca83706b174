#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use home_command::controller::{Controller, StateObserver};
use home_command::dispatch::dispatch;
use home_command::parse::{extract_calls, parse_parameters, FunctionCall};
use home_command::registry::{ClimateCommand, HomeCommand};
use home_command::state::{ClimateState, FanSpeed, HomeState};
use home_command::{Engine, Value};

fn counting_observer<T>() -> (Arc<AtomicUsize>, Arc<dyn StateObserver<T>>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let observer: Arc<dyn StateObserver<T>> = Arc::new(move |_: &T| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (hits, observer)
}

fn tagged(segment: &str) -> String {
    format!("<start_function_call>{segment}<end_function_call>")
}

// ── Concrete scenarios ───────────────────────────────────────────

#[test]
fn tagged_temperature_is_clamped() {
    let mut engine = Engine::<ClimateCommand>::new();
    let outcome = engine.handle(&tagged("call:set_temperature{temperature:<escape>35<escape>}"));

    assert_eq!(
        outcome.function_calls,
        [FunctionCall::bare("set_temperature").with("temperature", 30_i64)]
    );
    let result = &outcome.results[0];
    assert!(result.success);
    assert_eq!(result.get("previous_temperature"), Some(&serde_json::json!(24)));
    assert_eq!(result.get("current_temperature"), Some(&serde_json::json!(30)));
    assert_eq!(engine.state().ac.temperature, 30);
}

#[test]
fn unknown_fan_speed_is_reported_and_state_kept() {
    let (hits, observer) = counting_observer::<ClimateState>();
    let mut engine = Engine::<ClimateCommand>::new();
    engine.set_observer(Some(observer));
    let outcome = engine.handle("call:set_fan_speed{speed:<escape>ultra<escape>}");

    assert_eq!(outcome.function_calls.len(), 1);
    assert_eq!(outcome.function_calls[0].parameters["speed"], Value::Text("ultra".into()));
    let result = &outcome.results[0];
    assert!(!result.success);
    assert!(result.message.contains("invalid speed"));
    assert_eq!(engine.state().ac.fan_speed, FanSpeed::Auto);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn two_blocks_power_on_then_fan_high() {
    let mut engine = Engine::<ClimateCommand>::new();
    let raw = format!(
        "{}{}",
        tagged("call:power_on{}"),
        tagged("call:set_fan_speed{speed:<escape>high<escape>}")
    );
    let outcome = engine.handle(&raw);

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.iter().all(|r| r.success));
    assert!(engine.state().ac.power);
    assert_eq!(engine.state().ac.fan_speed, FanSpeed::High);
}

#[test]
fn json_fallback_with_string_arguments() {
    let mut engine = Engine::<HomeCommand>::new();
    let outcome =
        engine.handle(r#"{"function":{"name":"tv_set_volume","arguments":"{\"volume\": 150}"}}"#);

    assert_eq!(
        outcome.function_calls,
        [FunctionCall::bare("tv_set_volume").with("volume", 150_i64)]
    );
    assert!(outcome.results[0].success);
    assert_eq!(engine.state().tv.volume, 100);
}

#[test]
fn garbage_input_touches_nothing() {
    let (hits, observer) = counting_observer::<ClimateState>();
    let mut engine = Engine::<ClimateCommand>::new();
    engine.set_observer(Some(observer));

    let outcome = engine.handle("I cannot help with that.");

    assert!(outcome.function_calls.is_empty());
    assert!(outcome.results.is_empty());
    assert!(!outcome.success);
    assert_eq!(*engine.state(), ClimateState::default());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// ── Properties ───────────────────────────────────────────────────

#[test]
fn k_tagged_blocks_give_k_calls_in_order() {
    let names = ["tv_power_on", "light_power_off", "audio_play", "curtain_open", "vacuum_start"];
    for k in 1..=names.len() {
        let raw: String = names[..k]
            .iter()
            .map(|name| tagged(&format!("call:{name}{{}}")))
            .collect::<Vec<_>>()
            .join("\n");
        let calls = extract_calls(&raw);
        let got: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(got, names[..k]);
    }
}

#[test]
fn numeric_setters_clamp_out_of_range_input() {
    let cases: [(&str, &str, i64, i64); 6] = [
        ("tv_set_volume", "volume", 0, 100),
        ("tv_set_channel", "channel", 1, 100),
        ("light_set_brightness", "brightness", 0, 100),
        ("light_set_color_temp", "temp", 2700, 6500),
        ("audio_set_volume", "volume", 0, 100),
        ("curtain_set_position", "position", 0, 100),
    ];

    for (operation, field, lo, hi) in cases {
        let mut controller = Controller::new(HomeState::default());
        let calls = [
            FunctionCall::bare(operation).with(field, lo - 7),
            FunctionCall::bare(operation).with(field, hi + 7),
        ];
        let results = dispatch::<HomeCommand, _>(&mut controller, &calls);
        assert!(results.iter().all(|r| r.success), "{operation}");
        let current = format!("current_{field}");
        assert_eq!(results[0].get(&current), Some(&serde_json::json!(lo)), "{operation}");
        assert_eq!(results[1].get(&current), Some(&serde_json::json!(hi)), "{operation}");
    }
}

#[test]
fn ac_temperature_clamps_without_the_validator() {
    let mut controller = Controller::new(ClimateState::default());
    let calls = [
        FunctionCall::bare("set_temperature").with("temperature", 2_i64),
        FunctionCall::bare("set_temperature").with("temperature", 99_i64),
    ];
    let results = dispatch::<ClimateCommand, _>(&mut controller, &calls);
    assert_eq!(results[0].get("current_temperature"), Some(&serde_json::json!(16)));
    assert_eq!(results[1].get("current_temperature"), Some(&serde_json::json!(30)));
}

#[test]
fn repeated_absolute_setter_is_idempotent() {
    let mut controller = Controller::new(HomeState::default());
    let call = FunctionCall::bare("light_set_brightness").with("brightness", 40_i64);
    let results = dispatch::<HomeCommand, _>(&mut controller, [&call, &call]);

    let before = controller.state().clone();
    let second = &results[1];
    assert!(second.success);
    assert_eq!(second.get("previous_brightness"), second.get("current_brightness"));
    assert_eq!(*controller.state(), before);
}

#[test]
fn escaped_and_json_parameters_agree() {
    let escaped =
        parse_parameters("temperature:<escape>22<escape>,mode:<escape>heating<escape>,eco:<escape>true<escape>");
    let json = parse_parameters(r#""temperature": 22, "mode": "heating", "eco": true"#);
    let wrapped = parse_parameters(r#"{"eco": "true", "mode": "heating", "temperature": "22"}"#);

    assert_eq!(escaped, json);
    assert_eq!(escaped, wrapped);
    assert_eq!(escaped["temperature"], Value::Integer(22));
}

#[test]
fn unknown_name_does_not_block_later_calls() {
    let mut controller = Controller::new(HomeState::default());
    let calls = [
        FunctionCall::bare("teleport"),
        FunctionCall::bare("tv_set_channel").with("channel", 7_i64),
        FunctionCall::bare("ventilation_set_speed").with("speed", "high"),
    ];
    let results = dispatch::<HomeCommand, _>(&mut controller, &calls);

    assert_eq!(results.len(), 3);
    assert!(!results[0].success);
    assert_eq!(results[0].message, "unknown operation teleport");
    assert!(results[1].success && results[2].success);
    assert_eq!(controller.state().tv.channel, 7);
    assert!(controller.state().ventilation.power);
}

#[test]
fn functional_setters_power_devices_on() {
    let mut engine = Engine::<HomeCommand>::new();
    engine.handle(
        "call:ac_set_mode{mode:<escape>Heating<escape>} \
         call:tv_launch_app{app_name:<escape>Netflix<escape>} \
         call:audio_play_playlist{playlist:<escape>jazz<escape>}",
    );
    let state = engine.state();
    assert!(state.ac.power);
    assert!(state.tv.power);
    assert_eq!(state.tv.current_app.as_deref(), Some("Netflix"));
    assert!(state.audio.power);
}

#[test]
fn power_off_resets_transient_fields() {
    let mut engine = Engine::<HomeCommand>::new();
    engine.handle("call:tv_launch_app{app_name:<escape>YouTube<escape>} call:tv_power_off{}");
    assert_eq!(engine.state().tv.current_app, None);

    engine.handle(
        "call:vacuum_clean_zone{zone:<escape>kitchen<escape>} call:vacuum_return_dock{}",
    );
    assert_eq!(engine.state().vacuum.current_zone, None);
}

#[test]
fn adjust_goes_through_the_setter() {
    let mut engine = Engine::<HomeCommand>::new();
    let outcome = engine.handle("call:tv_adjust_volume(delta:95)");
    assert_eq!(outcome.results[0].get("current_volume"), Some(&serde_json::json!(100)));
    assert!(engine.state().tv.power);
}

#[test]
fn every_mutation_notifies_and_queries_do_not() {
    let (hits, observer) = counting_observer::<ClimateState>();
    let mut engine = Engine::<ClimateCommand>::new();
    engine.set_observer(Some(observer));

    engine.handle("call:power_on{} call:get_current_temperature{}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn hidden_operation_is_rejected_from_model_output() {
    let mut engine = Engine::<ClimateCommand>::new();
    let outcome = engine.handle("call:update_environment{indoor_temperature:<escape>40<escape>}");
    assert!(!outcome.success);
    assert_eq!(engine.state().indoor_temperature, 26);
}

#[test]
fn rejected_choice_values_do_not_notify() {
    let (hits, observer) = counting_observer::<HomeState>();
    let mut engine = Engine::<HomeCommand>::new();
    engine.set_observer(Some(observer));

    let outcome = engine.handle(
        "call:ac_set_fan_speed{speed:<escape>ultra<escape>} \
         call:ac_set_mode{mode:<escape>turbo<escape>} \
         call:ventilation_set_speed{speed:<escape>max<escape>} \
         call:vacuum_clean_zone{zone:<escape>garage<escape>}",
    );

    assert_eq!(outcome.results.len(), 4);
    assert!(outcome.results.iter().all(|r| !r.success));
    assert_eq!(*engine.state(), HomeState::default());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn over_wide_integer_literal_is_clamped() {
    let digits = "9".repeat(400);
    let mut engine = Engine::<HomeCommand>::new();

    let outcome = engine.handle(&format!("call:tv_set_volume{{volume:<escape>{digits}<escape>}}"));
    assert!(outcome.results[0].success, "{}", outcome.results[0].message);
    assert_eq!(engine.state().tv.volume, 100);

    let outcome = engine.handle(&format!("call:tv_adjust_volume{{delta:<escape>-{digits}<escape>}}"));
    assert!(outcome.results[0].success, "{}", outcome.results[0].message);
    assert_eq!(engine.state().tv.volume, 0);

    let mut climate = Engine::<ClimateCommand>::new();
    climate.handle(&format!("call:set_temperature{{temperature:<escape>{digits}<escape>}}"));
    assert_eq!(climate.state().ac.temperature, 30);
}
