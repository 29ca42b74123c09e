//! Sentence Flow
//!
//! English sentence analysis service. A sentence is sent to an
//! OpenAI-compatible Chat Completions endpoint, which answers with its
//! grammatical components, clauses and grammar corrections. Past analyses
//! are kept in a local history.
//!
//! # Architecture
//!
//! - **Server**: Axum JSON API; the browser front end only renders snapshots
//! - **Controller**: single owner of session state and history
//! - **Analysis**: Chat Completions client with strict payload validation
//!
//! # Modules
//!
//! - [`analysis`]: analysis types, errors and the Chat Completions client
//! - [`controller`]: session state machine and history reconciliation
//! - [`history`]: history list
//! - [`storage`]: durable key-value records
//! - [`view`]: render model for the result area

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod analysis;
pub mod config;
pub mod controller;
pub mod history;
pub mod server;
pub mod storage;
pub mod view;

use controller::Controller;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Owner of session state and history.
    pub controller: Arc<Controller>,
}
