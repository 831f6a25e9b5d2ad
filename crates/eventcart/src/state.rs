//! # Session State
//!
//! [`SessionState`] is the single owned state tree for one planning session.
//! It is created explicitly and passed by reference to every component; there
//! is no global instance.
//!
//! ## Cart Invariant
//!
//! The cart is two insertion-ordered maps, `favorited` (tentative) and
//! `locked_in` (committed). A [`CompositeId`] is in at most one of them. The
//! maps are private and every mutation goes through a method that keeps them
//! disjoint.
//!
//! Mutations return `bool`: `false` means nothing changed, which covers
//! stale composite ids that are no longer in the cart.

use crate::config::DEFAULT_PAGE_SIZE;
use crate::history::Snapshot;
use crate::model::{CartEntry, CatalogItem, CompositeId, DetailType, EventDetails};
use crate::pagination::PaginationController;
use crate::reactions::{ReactionChange, Reactions};
use crate::session::SessionData;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Favorited,
    LockedIn,
}

#[derive(Debug)]
pub struct SessionState {
    pub records: Vec<CatalogItem>,
    favorited: IndexMap<CompositeId, CartEntry>,
    locked_in: IndexMap<CompositeId, CartEntry>,
    pub reactions: Reactions,
    pub event_details: EventDetails,
    pub collaborators: Vec<String>,
    pub session_id: Option<String>,
    pub pager: PaginationController,
    pub catalog_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        Self {
            records: Vec::new(),
            favorited: IndexMap::new(),
            locked_in: IndexMap::new(),
            reactions: Reactions::new(),
            event_details: EventDetails::default(),
            collaborators: Vec::new(),
            session_id: None,
            pager: PaginationController::new(page_size),
            catalog_loading: false,
        }
    }

    // --- Catalog ---

    pub fn set_records(&mut self, records: Vec<CatalogItem>) {
        self.records = records;
        self.pager.reset();
    }

    pub fn item(&self, item_id: &str) -> Option<&CatalogItem> {
        self.records.iter().find(|item| item.id == item_id)
    }

    // --- Cart ---

    pub fn favorited(&self) -> &IndexMap<CompositeId, CartEntry> {
        &self.favorited
    }

    pub fn locked_in(&self) -> &IndexMap<CompositeId, CartEntry> {
        &self.locked_in
    }

    pub fn status(&self, id: &CompositeId) -> Option<CartStatus> {
        if self.favorited.contains_key(id) {
            Some(CartStatus::Favorited)
        } else if self.locked_in.contains_key(id) {
            Some(CartStatus::LockedIn)
        } else {
            None
        }
    }

    pub fn entry(&self, id: &CompositeId) -> Option<&CartEntry> {
        self.favorited.get(id).or_else(|| self.locked_in.get(id))
    }

    fn entry_mut(&mut self, id: &CompositeId) -> Option<&mut CartEntry> {
        match self.favorited.get_mut(id) {
            Some(entry) => Some(entry),
            None => self.locked_in.get_mut(id),
        }
    }

    /// Add to the tentative set. No-op if the id is already in the cart.
    pub fn favorite(&mut self, id: CompositeId, entry: CartEntry) -> bool {
        if self.status(&id).is_some() {
            return false;
        }
        self.favorited.insert(id, entry);
        true
    }

    /// Remove from the tentative set.
    pub fn unfavorite(&mut self, id: &CompositeId) -> bool {
        self.favorited.shift_remove(id).is_some()
    }

    /// Commit an id. A favorited entry moves over with its quantity and
    /// requests; an id not yet in the cart is added with `entry`.
    pub fn lock_in(&mut self, id: CompositeId, entry: CartEntry) -> bool {
        if self.locked_in.contains_key(&id) {
            return false;
        }
        let entry = self.favorited.shift_remove(&id).unwrap_or(entry);
        self.locked_in.insert(id, entry);
        true
    }

    /// Move a committed entry back to the tentative set.
    pub fn unlock(&mut self, id: &CompositeId) -> bool {
        match self.locked_in.shift_remove(id) {
            Some(entry) => {
                self.favorited.insert(id.clone(), entry);
                true
            }
            None => false,
        }
    }

    /// Remove an id from whichever map holds it.
    pub fn remove(&mut self, id: &CompositeId) -> bool {
        self.favorited.shift_remove(id).is_some() || self.locked_in.shift_remove(id).is_some()
    }

    /// Set the quantity of a cart entry, clamped to at least 1.
    pub fn set_quantity(&mut self, id: &CompositeId, quantity: u32) -> bool {
        let quantity = quantity.max(1);
        match self.entry_mut(id) {
            Some(entry) if entry.quantity != quantity => {
                entry.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn set_requests(&mut self, id: &CompositeId, requests: &str) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.requests != requests => {
                entry.requests = requests.to_string();
                true
            }
            _ => false,
        }
    }

    // --- Details & reactions ---

    pub fn set_detail(&mut self, detail: DetailType, value: &str) -> bool {
        let before = self.event_details.get(detail).map(str::to_string);
        self.event_details.set(detail, value);
        before.as_deref() != self.event_details.get(detail)
    }

    pub fn react(&mut self, item_id: &str, user: &str, emoji: &str) -> ReactionChange {
        self.reactions.toggle(item_id, user, emoji)
    }

    pub fn add_collaborator(&mut self, name: &str) -> bool {
        if name.trim().is_empty() || self.collaborators.iter().any(|c| c == name) {
            return false;
        }
        self.collaborators.push(name.to_string());
        true
    }

    // --- Snapshots & sessions ---

    /// Deep copy of the undoable part of the state.
    pub fn capture(&self) -> Snapshot {
        Snapshot {
            favorited: self.favorited.clone(),
            locked_in: self.locked_in.clone(),
            event_details: self.event_details.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.favorited = snapshot.favorited.clone();
        self.locked_in = snapshot.locked_in.clone();
        self.event_details = snapshot.event_details.clone();
    }

    /// Replace cart, reactions, details and collaborators with a loaded
    /// session. Ids present in both maps are kept only as locked in.
    pub fn replace_from_session(&mut self, session_id: &str, data: SessionData) {
        let SessionData {
            mut favorited,
            locked_in,
            reactions,
            event_details,
            collaborators,
        } = data;
        favorited.retain(|id, _| !locked_in.contains_key(id));

        self.favorited = favorited;
        self.locked_in = locked_in;
        self.reactions = reactions;
        self.event_details = event_details;
        self.collaborators = collaborators;
        self.session_id = Some(session_id.to_string());
    }

    pub fn to_session_data(&self) -> SessionData {
        SessionData {
            favorited: self.favorited.clone(),
            locked_in: self.locked_in.clone(),
            reactions: self.reactions.clone(),
            event_details: self.event_details.clone(),
            collaborators: self.collaborators.clone(),
        }
    }
}
