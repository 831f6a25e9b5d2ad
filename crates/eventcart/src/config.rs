//! # Configuration
//!
//! Planner configuration is a [`confique`] config struct, layered from
//! (highest priority first):
//!
//! 1. **Environment variables**: `EVENTCART_PAGE_SIZE`, `EVENTCART_USER_NAME`, etc.
//! 2. **Config file**: an optional `eventcart.toml` passed to [`PlannerConfig::load`].
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `page_size` | `10` | Catalog items revealed per page |
//! | `fallback_image_url` | placeholder image | Used when an image lookup fails |
//! | `share_base_url` | `https://plan.example.com/` | Prefix for shared session links |
//! | `user_name` | none | Name recorded on reactions and as a collaborator |

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_FALLBACK_IMAGE_URL: &str = "https://plan.example.com/static/placeholder.jpg";
pub const DEFAULT_SHARE_BASE_URL: &str = "https://plan.example.com/";

/// Configuration for the planner, stored in `eventcart.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Number of catalog items revealed by each `load_more`.
    #[config(default = 10, env = "EVENTCART_PAGE_SIZE")]
    pub page_size: usize,

    /// Image shown whenever an image lookup fails.
    #[config(
        default = "https://plan.example.com/static/placeholder.jpg",
        env = "EVENTCART_FALLBACK_IMAGE_URL"
    )]
    pub fallback_image_url: String,

    /// Base URL for shared session links.
    #[config(default = "https://plan.example.com/", env = "EVENTCART_SHARE_BASE_URL")]
    pub share_base_url: String,

    /// Display name of the local user.
    #[config(env = "EVENTCART_USER_NAME")]
    pub user_name: Option<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fallback_image_url: DEFAULT_FALLBACK_IMAGE_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            user_name: None,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the environment and an optional TOML file.
    /// A missing file is not an error; defaults fill the gaps.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = PlannerConfig::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        Ok(builder.load()?)
    }

    /// Page size, never zero.
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// User name, or "Guest" when none is configured.
    pub fn user_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Guest")
    }
}
