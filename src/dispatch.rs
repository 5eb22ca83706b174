//! The dispatch loop: one result per call, in order, and no call can stop the batch.

use std::borrow::Borrow;

use serde::Serialize;

use crate::controller::Controller;
use crate::error::AppError;
use crate::parse::FunctionCall;
use crate::registry::{CommandOutput, CommandSet};

/// Outcome of one dispatched call. Operation-specific fields (`previous_volume`,
/// `current_volume`, `mode`, ...) are flattened next to `success` and `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResult {
    pub operation: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AppError>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl DispatchResult {
    pub fn ok(operation: impl Into<String>, output: CommandOutput) -> Self {
        Self {
            operation: operation.into(),
            success: true,
            message: output.message,
            error: None,
            data: output.data,
        }
    }

    pub fn failed(operation: impl Into<String>, error: AppError) -> Self {
        Self {
            operation: operation.into(),
            success: false,
            message: error.to_string(),
            error: Some(error),
            data: serde_json::Map::new(),
        }
    }

    /// Operation-specific field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

/// Decode and run one call. Unknown names and bad parameters come back as failed results.
pub fn dispatch_one<C: CommandSet>(
    controller: &mut Controller<C::State>,
    call: &FunctionCall,
) -> DispatchResult {
    let outcome = C::from_call(call).and_then(|command| command.apply(controller));

    match outcome {
        Ok(output) => {
            tracing::info!(operation = %call.name, message = %output.message, "dispatched");
            DispatchResult::ok(&call.name, output)
        }
        Err(e) => {
            tracing::warn!(operation = %call.name, code = e.code(), error = %e, "dispatch failed");
            DispatchResult::failed(&call.name, e)
        }
    }
}

/// Run every call in order against one controller. The Nth result belongs to the Nth call.
pub fn dispatch<C, I>(controller: &mut Controller<C::State>, calls: I) -> Vec<DispatchResult>
where
    C: CommandSet,
    I: IntoIterator,
    I::Item: Borrow<FunctionCall>,
{
    calls
        .into_iter()
        .map(|call| dispatch_one::<C>(controller, call.borrow()))
        .collect()
}
