//! # Planner Facade
//!
//! [`Planner`] is the single entry point for a rendering client. It owns the
//! [`SessionState`], its [`HistoryManager`] and the [`PlannerConfig`].
//!
//! ## Role and Responsibilities
//!
//! The planner:
//! - **Dispatches** the discrete user events (favorite, unfavorite, lock,
//!   unlock, react, edit quantity, edit requests, edit detail, undo, redo)
//! - **Records history**: every event that changes the undoable state is
//!   committed to history right after it is applied
//! - **Derives views**: the filtered catalog, the priced cart, the history
//!   button state and reaction summaries
//! - **Talks to collaborators**: catalog fetch and session load/save
//!
//! ## What the Planner Does NOT Do
//!
//! - **Rendering**: views are plain data
//! - **Retries**: a failed remote call becomes a [`StatusMessage`] and an error
//!
//! ## Stale References
//!
//! Events naming a composite id that is not (or no longer) in the cart are
//! silent no-ops: they return `false` and record no history entry. The same
//! holds for ids whose catalog item is unknown or whose option index does not
//! exist on the item.

use crate::catalog::CatalogSource;
use crate::config::PlannerConfig;
use crate::error::Result;
use crate::filter::{self, FilterCriteria};
use crate::history::HistoryManager;
use crate::images::{ImageLookup, ImageResolver};
use crate::model::{CartEntry, CatalogItem, CompositeId, DetailType};
use crate::pricing;
use crate::reactions::{ReactionChange, ReactionCount};
use crate::session::{self, SessionRepository};
use crate::state::{CartStatus, SessionState};
use crate::status::StatusMessage;
use serde::Serialize;
use std::future::Future;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryButtons {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub id: CompositeId,
    pub name: String,
    pub status: CartStatus,
    pub quantity: u32,
    pub billed_quantity: u32,
    pub requests: String,
    pub unit_price: Option<f64>,
    /// Formatted unit price, or the catalog's price text when it has no number.
    pub price_label: String,
    pub line_total: f64,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub favorited: Vec<CartLine>,
    pub locked_in: Vec<CartLine>,
    pub favorited_total: f64,
    pub locked_in_total: f64,
}

pub struct Planner {
    state: SessionState,
    history: HistoryManager,
    config: PlannerConfig,
    messages: Vec<StatusMessage>,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        let state = SessionState::new(config.page_size());
        let history = HistoryManager::with_baseline(&state);
        Self {
            state,
            history,
            config,
            messages: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<StatusMessage> {
        std::mem::take(&mut self.messages)
    }

    fn commit(&mut self, changed: bool) -> bool {
        if changed {
            self.history.snapshot(&self.state);
        }
        changed
    }

    // --- Catalog ---

    /// Fetch the catalog. Without a catalog there is nothing to show, so the
    /// error is returned to the caller as well as reported.
    pub async fn load_catalog<C>(&mut self, source: &C) -> Result<usize>
    where
        C: CatalogSource + ?Sized,
    {
        self.state.catalog_loading = true;
        let fetched = source.fetch_all_records().await;
        self.state.catalog_loading = false;

        match fetched {
            Ok(records) => {
                let count = records.len();
                tracing::info!(count, "catalog loaded");
                if count == 0 {
                    self.messages
                        .push(StatusMessage::warning("The catalog is empty"));
                }
                self.state.set_records(records);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog load failed");
                self.messages.push(StatusMessage::error(format!(
                    "Could not load the catalog: {}",
                    err
                )));
                Err(err)
            }
        }
    }

    /// Filtered catalog ordered by reaction score.
    pub fn catalog_view(&self, criteria: &FilterCriteria) -> Vec<&CatalogItem> {
        filter::apply(&self.state.records, criteria, &self.state.reactions)
    }

    /// The part of the filtered catalog revealed so far.
    pub fn visible_catalog(&self, criteria: &FilterCriteria) -> Vec<&CatalogItem> {
        let mut items = self.catalog_view(criteria);
        let range = self.state.pager.visible_range(items.len());
        items.truncate(range.end);
        items
    }

    /// Start over from the first page, e.g. after the criteria changed.
    pub fn reset_pagination(&self) {
        self.state.pager.reset();
    }

    /// Reveal the next page of the filtered catalog, handing it to `render`.
    /// Calls made while a page is still rendering are no-ops.
    pub async fn load_more<F, Fut>(
        &self,
        criteria: &FilterCriteria,
        render: F,
    ) -> Option<Range<usize>>
    where
        F: FnOnce(Vec<CatalogItem>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let filtered = self.catalog_view(criteria);
        let load = self.state.pager.begin(filtered.len())?;
        let page: Vec<CatalogItem> = filtered[load.range()]
            .iter()
            .map(|item| (*item).clone())
            .collect();
        render(page).await;
        Some(load.finish())
    }

    // --- Cart events ---

    /// Entry for an id entering the cart. `None` when the item is unknown or
    /// the option index does not exist.
    fn default_entry(&self, id: &CompositeId) -> Option<CartEntry> {
        let item = self.state.item(&id.item_id)?;
        if id.option.is_some() && item.option(id.option).is_none() {
            return None;
        }
        Some(CartEntry::new(pricing::default_quantity(
            item,
            &self.state.event_details,
        )))
    }

    pub fn favorite(&mut self, id: CompositeId) -> bool {
        let Some(entry) = self.default_entry(&id) else {
            tracing::debug!(%id, "favorite ignored: unknown item or option");
            return false;
        };
        let changed = self.state.favorite(id, entry);
        self.commit(changed)
    }

    pub fn unfavorite(&mut self, id: &CompositeId) -> bool {
        let changed = self.state.unfavorite(id);
        self.commit(changed)
    }

    pub fn lock(&mut self, id: CompositeId) -> bool {
        let entry = match self.state.entry(&id) {
            Some(existing) => existing.clone(),
            None => match self.default_entry(&id) {
                Some(entry) => entry,
                None => {
                    tracing::debug!(%id, "lock ignored: unknown item or option");
                    return false;
                }
            },
        };
        let changed = self.state.lock_in(id, entry);
        self.commit(changed)
    }

    pub fn unlock(&mut self, id: &CompositeId) -> bool {
        let changed = self.state.unlock(id);
        self.commit(changed)
    }

    pub fn remove(&mut self, id: &CompositeId) -> bool {
        let changed = self.state.remove(id);
        self.commit(changed)
    }

    pub fn set_quantity(&mut self, id: &CompositeId, quantity: u32) -> bool {
        let changed = self.state.set_quantity(id, quantity);
        self.commit(changed)
    }

    pub fn set_requests(&mut self, id: &CompositeId, requests: &str) -> bool {
        let changed = self.state.set_requests(id, requests);
        self.commit(changed)
    }

    pub fn set_detail(&mut self, detail: DetailType, value: &str) -> bool {
        let changed = self.state.set_detail(detail, value);
        self.commit(changed)
    }

    /// Toggle the local user's reaction. Reactions are not undoable.
    pub fn react(&mut self, item_id: &str, emoji: &str) -> ReactionChange {
        let user = self.config.user_name().to_string();
        self.state.react(item_id, &user, emoji)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.state)
    }

    pub fn history_buttons(&self) -> HistoryButtons {
        HistoryButtons {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    // --- Views ---

    pub fn reaction_summary(&self, item_id: &str) -> Vec<ReactionCount> {
        self.state.reactions.summary(item_id)
    }

    fn cart_lines(&self, status: CartStatus) -> Vec<CartLine> {
        let entries = match status {
            CartStatus::Favorited => self.state.favorited(),
            CartStatus::LockedIn => self.state.locked_in(),
        };

        let mut lines: Vec<CartLine> = entries
            .iter()
            .filter_map(|(id, entry)| {
                let item = self.state.item(&id.item_id)?;
                Some(CartLine {
                    id: id.clone(),
                    name: item.display_name(id.option),
                    status,
                    quantity: entry.quantity,
                    billed_quantity: pricing::effective_quantity(item, entry.quantity),
                    requests: entry.requests.clone(),
                    unit_price: pricing::unit_price(item, id.option),
                    price_label: pricing::unit_price(item, id.option)
                        .map(pricing::format_price)
                        .unwrap_or_else(|| item.price_text.clone()),
                    line_total: pricing::line_total(item, id.option, entry.quantity),
                    score: self.state.reactions.score(&id.item_id),
                })
            })
            .collect();
        filter::sort_by_score(&mut lines, &self.state.reactions, |line| {
            line.id.item_id.as_str()
        });
        lines
    }

    /// Both cart maps, priced and ordered by reaction score.
    pub fn cart_view(&self) -> CartView {
        let favorited = self.cart_lines(CartStatus::Favorited);
        let locked_in = self.cart_lines(CartStatus::LockedIn);
        CartView {
            favorited_total: pricing::cart_total(&self.state.records, self.state.favorited()),
            locked_in_total: pricing::cart_total(&self.state.records, self.state.locked_in()),
            favorited,
            locked_in,
        }
    }

    // --- Images ---

    /// Image resolver that falls back to the configured placeholder image.
    /// Keep it across calls: its cache lives as long as it does.
    pub fn image_resolver<L: ImageLookup>(&self, lookup: L) -> ImageResolver<L> {
        ImageResolver::new(lookup, self.config.fallback_image_url.clone())
    }

    /// Displayable image URL for a catalog item.
    pub async fn image_url<L: ImageLookup>(
        &self,
        resolver: &ImageResolver<L>,
        item_id: &str,
    ) -> String {
        match self.state.item(item_id) {
            Some(item) => resolver.resolve(&item.image_tag).await,
            None => resolver.fallback_url().to_string(),
        }
    }

    // --- Sessions ---

    /// Name to show for this session in the saved-session list.
    pub fn display_name(&self) -> String {
        self.state
            .event_details
            .get(DetailType::EventName)
            .map(str::to_string)
            .unwrap_or_else(|| "Untitled event".to_string())
    }

    pub fn share_link(&self) -> Option<String> {
        self.state
            .session_id
            .as_deref()
            .map(|id| session::share_link(&self.config.share_base_url, id))
    }

    /// Replace the cart with a shared session. History restarts from the
    /// loaded state.
    pub async fn load_session<R>(&mut self, repo: &R, session_id: &str) -> Result<()>
    where
        R: SessionRepository + ?Sized,
    {
        match repo.load(session_id).await {
            Ok(data) => {
                tracing::info!(session_id, "session loaded");
                self.state.replace_from_session(session_id, data);
                self.history.reset_baseline(&self.state);
                self.messages.push(StatusMessage::success(format!(
                    "Loaded \"{}\"",
                    self.display_name()
                )));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "session load failed");
                self.messages.push(StatusMessage::error(format!(
                    "Could not load the session: {}",
                    err
                )));
                Err(err)
            }
        }
    }

    /// Save the session: create it on first save, update it afterwards.
    /// The local user joins the collaborators once the save succeeds.
    /// Returns the session id.
    pub async fn save_session<R>(&mut self, repo: &R) -> Result<String>
    where
        R: SessionRepository + ?Sized,
    {
        let user = self.config.user_name().to_string();
        let mut data = self.state.to_session_data();
        if !data.collaborators.contains(&user) {
            data.collaborators.push(user.clone());
        }

        let saved = match self.state.session_id.clone() {
            Some(id) => repo.update(&id, &data).await.map(|_| id),
            None => repo.create(&data).await,
        };

        match saved {
            Ok(id) => {
                tracing::info!(session_id = %id, "session saved");
                self.state.add_collaborator(&user);
                self.state.session_id = Some(id.clone());
                self.messages.push(StatusMessage::success("Session saved"));
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session save failed");
                self.messages.push(StatusMessage::error(format!(
                    "Could not save the session: {}",
                    err
                )));
                Err(err)
            }
        }
    }
}
