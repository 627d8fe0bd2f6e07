//! diary-reader: a terminal reader for published diary summaries and novels.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ FetchMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio)  │ (channel) │ (state)  │          │ (render) │
//! └──────────┘           └──────────┘          └──────────┘
//!      ▲ Command::Fetch       ▲
//!      └──────────────────────┤ Action
//!                        ┌──────────┐
//!                        │ input.rs │
//!                        └──────────┘
//! ```
//!
//! * **`source/`** - the `EntryStore` trait, the `Entry` type, and the
//!   Supabase implementation.
//! * **`fetch`** - runs both collection queries concurrently and reports the
//!   merged feed (or the first failure) back to the UI thread.
//! * **`merge`** / **`filter`** - pure feed transformations.
//! * **`app`** - owns all state; every change goes through `App::update`.
//! * **`ui`** - pure rendering: reads `App` state and draws widgets.
//! * **`input`** - maps key events to `Action`s.
//! * **`config`** / **`logging`** - CLI/env configuration and tracing setup.

pub mod app;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod input;
pub mod logging;
pub mod merge;
pub mod source;
pub mod ui;
