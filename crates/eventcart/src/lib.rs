//! # EventCart Architecture
//!
//! EventCart is the **client-side core of a collaborative event planner**. Guests browse a
//! catalog of bookable items (catering, music, decor), react to them, and build a shared
//! cart of tentative and committed choices. This crate owns the state and rules; it renders
//! nothing.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Rendering client (not in this crate)                       │
//! │  - Draws views, turns clicks into planner calls             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Planner (api.rs)                                           │
//! │  - One method per user event, records undo history          │
//! │  - Derives catalog and cart views, reports StatusMessages   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain (state, history, pricing, filter, reactions, ...)   │
//! │  - Pure logic over owned Rust types                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collaborators (catalog, session, images)                   │
//! │  - Async traits for the remote catalog, session store and   │
//! │    image lookup, plus in-memory fixtures for tests          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Composite Ids
//!
//! A cart line is keyed by a [`model::CompositeId`]: a catalog item id plus an optional
//! option index. `rec7` and `rec7-0` are different lines. The text form is what goes on the
//! wire in saved sessions.
//!
//! ## State Ownership
//!
//! There is no global state. A [`state::SessionState`] is created by the [`api::Planner`]
//! and passed by reference to everything else. Undo history holds snapshots of the cart and
//! event details only; reactions and catalog data are never rolled back.
//!
//! ## Testing Strategy
//!
//! Each domain module carries its own unit tests. The collaborator modules expose
//! `fixtures` (compiled for tests or with the `test_utils` feature) so planner tests run
//! without a network. End-to-end planner flows live in `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The planner facade, entry point for all operations
//! - [`state`]: The session state tree and its cart invariant
//! - [`history`]: Undo/redo snapshots
//! - [`model`]: Catalog items, composite ids, cart entries, event details
//! - [`pricing`]: Price parsing and cart totals
//! - [`reactions`]: Emoji reactions and item scores
//! - [`filter`]: Catalog filtering and score ordering
//! - [`pagination`]: Incremental catalog reveal
//! - [`catalog`]: Catalog source trait
//! - [`session`]: Shared session storage and the local saved-session list
//! - [`images`]: Image lookup with caching and fallback
//! - [`config`]: Configuration management
//! - [`status`]: User-visible status messages
//! - [`error`]: Error types

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod images;
pub mod model;
pub mod pagination;
pub mod pricing;
pub mod reactions;
pub mod session;
pub mod state;
pub mod status;
