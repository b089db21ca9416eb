//! Paginated list screen shared by every resource.
//!
//! Deletion is two-phase: the confirm callback of the modal only queues the
//! id, and [`ListScreen::process_pending`] performs the queued deletes.

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use models::{EntityId, PaginationMeta};

use crate::api::ApiClient;
use crate::errors::ConsoleError;
use crate::modal::{ModalBroadcaster, ModalConfig};
use crate::pagination::{NavButton, PageRequest, PaginationControl, WindowConfig};
use crate::resources::{Managed, Resource};
use crate::router::Route;
use crate::table::{RenderedTable, Table};
use crate::toast::Toaster;

/// What happens to the current page after a successful delete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshStrategy {
    /// Fetch the current page again.
    #[default]
    Refetch,
    /// Drop the row locally and decrement the total.
    Optimistic,
}

pub struct ListScreen<E: Managed> {
    api: ApiClient,
    modal: ModalBroadcaster,
    toaster: Toaster,
    window: WindowConfig,
    table: Table,
    strategy: RefreshStrategy,
    filters: Vec<(String, String)>,
    request: PageRequest,
    rows: Vec<E>,
    pagination: PaginationMeta,
    loading: bool,
    error: Option<String>,
    pending_tx: mpsc::UnboundedSender<EntityId>,
    pending_rx: mpsc::UnboundedReceiver<EntityId>,
}

impl<E: Managed> ListScreen<E> {
    pub fn new(api: ApiClient, modal: ModalBroadcaster, toaster: Toaster, window: WindowConfig, limit: u32) -> Self {
        let request = PageRequest::new(1, limit).normalize();
        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        Self {
            api,
            modal,
            toaster,
            window,
            table: E::KIND.table(),
            strategy: RefreshStrategy::default(),
            filters: Vec::new(),
            request,
            rows: Vec::new(),
            pagination: PaginationMeta::empty(request.limit),
            loading: false,
            error: None,
            pending_tx,
            pending_rx,
        }
    }

    pub fn with_strategy(mut self, strategy: RefreshStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Page to load on mount, e.g. when reopening a deep link.
    pub fn starting_at(mut self, page: u32) -> Self {
        self.request = self.request.with_page(page).normalize();
        self
    }

    /// Narrow the list, e.g. regions of one country.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn resource(&self) -> Resource { E::KIND }

    pub fn rows(&self) -> &[E] { &self.rows }

    pub fn pagination(&self) -> PaginationMeta { self.pagination }

    pub fn request(&self) -> PageRequest { self.request }

    pub fn is_loading(&self) -> bool { self.loading }

    pub fn error(&self) -> Option<&str> { self.error.as_deref() }

    pub async fn mount(&mut self) -> Result<(), ConsoleError> { self.fetch().await }

    /// Fetch the current request. Failures are kept on the screen as well as returned.
    #[instrument(skip(self), fields(resource = %E::KIND, page = self.request.page, limit = self.request.limit))]
    pub async fn fetch(&mut self) -> Result<(), ConsoleError> {
        self.loading = true;
        let filters: Vec<(&str, &str)> = self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let result = self.api.fetch_page::<E>(&E::KIND.api_path(), self.request, &filters).await;
        self.loading = false;
        match result {
            Ok(page) => {
                debug!(rows = page.data.len(), total = page.pagination.total_count, "list loaded");
                self.rows = page.data;
                self.pagination = page.pagination;
                self.request.page = page.pagination.page;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "list fetch failed");
                self.rows.clear();
                self.pagination = PaginationMeta::empty(self.request.limit);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Go to `page`; returns `false` without fetching when the page is out of range or current.
    pub async fn change_page(&mut self, page: u32) -> Result<bool, ConsoleError> {
        let Some(target) = PaginationControl::new(self.pagination, self.window).clamp(page) else {
            debug!(page, "page change ignored");
            return Ok(false);
        };
        self.request.page = target;
        self.fetch().await?;
        Ok(true)
    }

    pub async fn navigate(&mut self, button: NavButton) -> Result<bool, ConsoleError> {
        let target = PaginationControl::new(self.pagination, self.window).target(button);
        self.change_page(target).await
    }

    /// New page size; starts over at page 1.
    pub async fn set_limit(&mut self, limit: u32) -> Result<(), ConsoleError> {
        self.request = PageRequest::new(1, limit).normalize();
        self.fetch().await
    }

    /// Ask for confirmation before deleting a row. Returns `false` when the id is not on this page.
    pub fn request_delete(&self, id: &EntityId) -> bool {
        let Some(row) = self.rows.iter().find(|r| r.id() == id) else { return false };
        let name = row.display_name();
        let tx = self.pending_tx.clone();
        let queued = id.clone();
        self.modal.show(
            ModalConfig::confirm(
                format!("Delete {}", E::KIND.label()),
                format!("Are you sure you want to delete '{name}'? This action cannot be undone."),
            )
            .confirm_text("Delete")
            .on_confirm(move || {
                // receiver lives as long as the screen
                let _ = tx.send(queued);
            }),
        );
        true
    }

    /// Run deletes confirmed since the last call. Returns how many succeeded.
    pub async fn process_pending(&mut self) -> Result<usize, ConsoleError> {
        let mut done = 0;
        while let Ok(id) = self.pending_rx.try_recv() {
            self.delete(&id).await?;
            done += 1;
        }
        Ok(done)
    }

    #[instrument(skip(self), fields(resource = %E::KIND))]
    async fn delete(&mut self, id: &EntityId) -> Result<(), ConsoleError> {
        let name = self
            .rows
            .iter()
            .find(|r| r.id() == id)
            .map(|r| r.display_name())
            .unwrap_or_else(|| id.to_string());
        self.api.delete_one(&E::KIND.api_path(), id, &name, &self.toaster).await?;
        info!(%id, "deleted");

        let only_row = self.rows.len() == 1;
        if only_row && self.request.page > 1 {
            self.request.page -= 1;
            return self.fetch().await;
        }
        if only_row {
            return self.fetch().await;
        }
        match self.strategy {
            RefreshStrategy::Refetch => self.fetch().await,
            RefreshStrategy::Optimistic => {
                self.drop_row(id);
                Ok(())
            }
        }
    }

    /// Splice a deleted row out of the page without asking the server.
    fn drop_row(&mut self, id: &EntityId) {
        self.rows.retain(|r| r.id() != id);
        let total = self.pagination.total_count.saturating_sub(1);
        self.pagination = PaginationMeta::for_total(self.pagination.page, self.pagination.limit, total);
    }

    pub fn row_click(&self, id: &EntityId) -> Route { Route::Edit(E::KIND, id.clone()) }

    pub fn create_route(&self) -> Route { Route::Create(E::KIND) }

    pub fn render(&self) -> RenderedTable { self.table.render(&self.rows) }

    /// `None` when everything fits on one page.
    pub fn pagination_control(&self) -> Option<PaginationControl> {
        (self.pagination.page_count > 1).then(|| PaginationControl::new(self.pagination, self.window))
    }
}
