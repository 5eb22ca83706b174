//! Turns free-form language-model output into validated device commands and applies them
//! to an in-memory home state tree.
//!
//! Pipeline: [`parse::extract_calls`] → [`validate::Validator`] → [`dispatch::dispatch`]
//! against a [`controller::Controller`]. [`engine::Engine`] bundles the three for one
//! device set.

#[cfg(feature = "server")]
pub mod api;
pub mod audit;
pub mod controller;
pub mod describe;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod parse;
pub mod registry;
pub mod settings;
pub mod state;
pub mod util;
pub mod validate;
pub mod value;

pub use dispatch::DispatchResult;
pub use engine::{CommandEngine, CommandOutcome, DeviceSet, Engine, Interpretation};
pub use error::AppError;
pub use parse::{extract_calls, FunctionCall, ParameterMap};
pub use value::Value;
