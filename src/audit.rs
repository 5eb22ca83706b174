//! JSONL audit log of interpreted model output.
//!
//! Every handled utterance is logged as a single line in
//! `{audit_dir}/YYYY-MM-DD.jsonl`. Best-effort: never panics or fails the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::dispatch::DispatchResult;
use crate::engine::{CommandOutcome, DeviceSet};
use crate::parse::FunctionCall;

#[derive(Serialize)]
struct AuditEntry<'a> {
    ts: u64,
    device_set: DeviceSet,
    raw_output: &'a str,
    calls: &'a [FunctionCall],
    results: &'a [DispatchResult],
}

/// Append one handled utterance to today's audit file.
pub fn log_outcome(audit_dir: &Path, device_set: DeviceSet, outcome: &CommandOutcome) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let entry = AuditEntry {
        ts: now,
        device_set,
        raw_output: &outcome.raw_output,
        calls: &outcome.function_calls,
        results: &outcome.results,
    };

    if fs::create_dir_all(audit_dir).is_err() {
        tracing::debug!(dir = %audit_dir.display(), "audit dir unavailable");
        return;
    }

    let path = audit_dir.join(format!("{}.jsonl", date_from_epoch(now)));
    if let Ok(json) = serde_json::to_string(&entry) {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = writeln!(file, "{json}");
        }
    }
}

/// Format epoch seconds as `YYYY-MM-DD` (UTC).
#[allow(clippy::unreadable_literal, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn date_from_epoch(epoch_secs: u64) -> String {
    // Civil date from day count (Howard Hinnant)
    let days = (epoch_secs / 86400) as i64;
    let z = days + 719468;
    let era = (if z >= 0 { z } else { z - 146096 }) / 146097;
    let doe = (z - era * 146097) as u64; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = (yoe as i64) + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };

    format!("{y:04}-{m:02}-{d:02}")
}
