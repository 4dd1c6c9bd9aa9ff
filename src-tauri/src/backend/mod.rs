//! # Backend Module
//!
//! Contains all non-UI logic for the wallet viewer application.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: the history extraction pipeline and the sync session machine
//! - **IO**: the single boundary to the external wallet-sync service
//!
//! The backend is UI-agnostic: the Tauri command layer is one thin adapter
//! over it, and nothing here depends on the webview.

pub mod domain;
pub mod io;

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::backend::domain::SyncSessionService;
use crate::backend::io::HttpSyncBackend;

pub use domain::*;
pub use io::*;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub sync_service: SyncSessionService,
}

/// Initialize the backend with all required services
pub fn initialize_backend() -> Result<AppState> {
    info!("Setting up wallet-sync backend client");
    let backend = Arc::new(HttpSyncBackend::new());

    info!("Setting up application state");
    Ok(AppState {
        sync_service: SyncSessionService::new(backend),
    })
}
