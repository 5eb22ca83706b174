//! Function-call extraction from raw model output.
//!
//! The generator is small and its output format drifts, so extraction is a cascade of
//! tiers. Each tier runs only if every earlier tier found nothing:
//!
//! | Tier | Shape |
//! |------|-------|
//! | tagged | `<start_function_call>…<end_function_call>` blocks, one call per block |
//! | brace | `call:name{params}` anywhere in the text |
//! | paren | `call:name(params)` anywhere in the text |
//! | json  | first `{` to last `}` decoded as one JSON call object |
//!
//! Nothing here fails: text with no recognizable call yields an empty vector.

pub mod json_call;
pub mod params;

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::Value;

pub use json_call::{call_from_json, parse_json_call};
pub use params::{parse_parameters, ESCAPE_MARKER};

/// Parameter name → coerced value. Names are case-sensitive; equality ignores order.
pub type ParameterMap = IndexMap<String, Value>;

/// One (operation name, parameters) pair pulled out of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub parameters: ParameterMap,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, parameters: ParameterMap) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// A call with no parameters.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, ParameterMap::new())
    }

    /// Builder-style parameter insertion, mostly for tests and manual controls.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

/// Which extraction strategy produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tagged,
    Brace,
    Paren,
    Json,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Tagged => "tagged",
            Tier::Brace => "brace",
            Tier::Paren => "paren",
            Tier::Json => "json",
        }
    }
}

#[allow(clippy::expect_used)] // literal pattern
static TAGGED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<start_(?:of_)?function_call>(.*?)<end_(?:of_)?function_call>")
        .expect("tagged block pattern compiles")
});

#[allow(clippy::expect_used)] // literal pattern
static BRACE_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"call:([A-Za-z_]\w*)\{([^}]*)\}").expect("brace call pattern compiles")
});

#[allow(clippy::expect_used)] // literal pattern
static PAREN_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"call:([A-Za-z_]\w*)\(([^)]*)\)").expect("paren call pattern compiles")
});

/// Extract every function call from `output`, in document order.
pub fn extract_calls(output: &str) -> Vec<FunctionCall> {
    extract_with_tier(output).map_or_else(Vec::new, |(_, calls)| calls)
}

/// Like [`extract_calls`] but also reports the tier that matched. `None` means no tier
/// produced a call.
pub fn extract_with_tier(output: &str) -> Option<(Tier, Vec<FunctionCall>)> {
    let tiers: [(Tier, fn(&str) -> Vec<FunctionCall>); 4] = [
        (Tier::Tagged, tagged_blocks),
        (Tier::Brace, |text| pattern_calls(&BRACE_CALL_RE, text)),
        (Tier::Paren, |text| pattern_calls(&PAREN_CALL_RE, text)),
        (Tier::Json, |text| embedded_json(text).into_iter().collect()),
    ];

    for (tier, run) in tiers {
        let calls = run(output);
        if !calls.is_empty() {
            tracing::debug!(tier = tier.label(), count = calls.len(), "extracted function calls");
            return Some((tier, calls));
        }
    }

    tracing::debug!("no function call found in model output");
    None
}

/// Parse the text of one tagged block (or any `call:name{…}` fragment).
///
/// A leading `call:` is stripped. Text that then starts with `{` is tried as a JSON call
/// object. Otherwise the name is everything before the first `{` and the parameter block
/// is everything up to the last `}`.
pub fn parse_segment(segment: &str) -> Option<FunctionCall> {
    let text = segment.trim();
    let text = text.strip_prefix("call:").map_or(text, str::trim_start);

    if text.starts_with('{') {
        if let Some(call) = parse_json_call(text) {
            return Some(call);
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    if close < open {
        return None;
    }

    let name = text.get(..open)?.trim();
    if name.is_empty() {
        return None;
    }
    let block = text.get(open + 1..close)?;

    Some(FunctionCall::new(name, parse_parameters(block)))
}

fn tagged_blocks(output: &str) -> Vec<FunctionCall> {
    TAGGED_BLOCK_RE
        .captures_iter(output)
        .filter_map(|caps| caps.get(1))
        .filter_map(|segment| {
            let call = parse_segment(segment.as_str());
            if call.is_none() {
                tracing::debug!(segment = segment.as_str(), "dropping unparseable tagged block");
            }
            call
        })
        .collect()
}

fn pattern_calls(pattern: &Regex, output: &str) -> Vec<FunctionCall> {
    pattern
        .captures_iter(output)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let block = caps.get(2).map_or("", |m| m.as_str());
            Some(FunctionCall::new(name, parse_parameters(block)))
        })
        .collect()
}

fn embedded_json(output: &str) -> Option<FunctionCall> {
    let open = output.find('{')?;
    let close = output.rfind('}')?;
    if close < open {
        return None;
    }
    parse_json_call(output.get(open..=close)?)
}
