//! Create/edit screens.
//!
//! Each resource has a form state type implementing [`EntityForm`];
//! [`FormScreen`] drives loading, validation and submission for all of them.

pub mod entities;
pub mod fields;
pub mod selector;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use models::{Entity, EntityId};

use crate::api::ApiClient;
use crate::errors::ConsoleError;
use crate::modal::{ModalBroadcaster, ModalConfig};
use crate::resources::Managed;
use crate::router::Route;
use crate::toast::Toaster;

pub use entities::{CategoryForm, ClientForm, CountryForm, DistrictForm, MasterForm, RegionForm, ServiceForm};
pub use fields::FileField;
pub use selector::{LocationSelector, OptionsState, Selector, ServicePicker, Ticket};

pub type Payload<F> = <<F as EntityForm>::Entity as Entity>::Input;

#[async_trait]
pub trait EntityForm: Default + Send + Sync {
    type Entity: Managed;

    fn from_entity(entity: &Self::Entity) -> Self;

    /// Validated request body.
    fn to_payload(&self) -> Result<Payload<Self>, ConsoleError>;

    fn validate(&self) -> Result<(), ConsoleError> { self.to_payload().map(|_| ()) }

    /// Load option lists the form needs once it is on screen.
    async fn prepare(&mut self, _api: &ApiClient) -> Result<(), ConsoleError> { Ok(()) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

/// Resets the in-flight flag when a submission ends, even if it is dropped midway.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::SeqCst); }
}

pub struct FormScreen<F: EntityForm> {
    api: ApiClient,
    modal: ModalBroadcaster,
    toaster: Toaster,
    mode: FormMode,
    pub form: F,
    loading: bool,
    load_error: Option<String>,
    submitting: Arc<AtomicBool>,
}

impl<F: EntityForm> FormScreen<F> {
    pub fn new(api: ApiClient, modal: ModalBroadcaster, toaster: Toaster, mode: FormMode) -> Self {
        Self {
            api,
            modal,
            toaster,
            mode,
            form: F::default(),
            loading: false,
            load_error: None,
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn mode(&self) -> &FormMode { &self.mode }

    pub fn api(&self) -> &ApiClient { &self.api }

    pub fn is_loading(&self) -> bool { self.loading }

    pub fn load_error(&self) -> Option<&str> { self.load_error.as_deref() }

    pub fn is_submitting(&self) -> bool { self.submitting.load(Ordering::SeqCst) }

    /// Edit screens fetch and pre-populate; every screen then loads its option lists.
    #[instrument(skip(self), fields(resource = %F::Entity::KIND, mode = ?self.mode))]
    pub async fn mount(&mut self) -> Result<(), ConsoleError> {
        self.loading = true;
        let result = self.load().await;
        self.loading = false;
        if let Err(e) = &result {
            warn!(error = %e, "form load failed");
            self.load_error = Some(e.to_string());
        }
        result
    }

    async fn load(&mut self) -> Result<(), ConsoleError> {
        if let FormMode::Edit(id) = &self.mode {
            let entity = self.api.get::<F::Entity>(id).await?;
            self.form = F::from_entity(&entity);
        }
        self.form.prepare(&self.api).await
    }

    /// Validate and send. On success returns the list route to go to; on failure an
    /// error dialog is shown and the form keeps its values.
    #[instrument(skip(self), fields(resource = %F::Entity::KIND))]
    pub async fn submit(&self) -> Result<Route, ConsoleError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(ConsoleError::Busy);
        }
        let _guard = SubmitGuard(&self.submitting);

        let kind = F::Entity::KIND;
        let result = match self.form.to_payload() {
            Ok(payload) => match &self.mode {
                FormMode::Create => self.api.create_entity::<F::Entity>(&payload).await.map(|_| "created"),
                FormMode::Edit(id) => self.api.update_entity::<F::Entity>(id, &payload).await.map(|_| "updated"),
            },
            Err(e) => Err(e),
        };
        match result {
            Ok(verb) => {
                info!(verb, "form submitted");
                self.toaster.success(format!("{} {verb} successfully.", capitalize(kind.label())), None);
                Ok(Route::List(kind))
            }
            Err(e) => {
                warn!(error = %e, "form submit failed");
                self.modal.show(ModalConfig::error("Error", e.to_string()));
                Err(e)
            }
        }
    }
}

/// `"country"` -> `"Country"`, for messages that start with a resource label.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::ModalKind;
    use crate::resources::Resource;
    use crate::session::{SessionStore, StaticAuthenticator};
    use crate::storage::MemoryStorage;
    use models::LocalizedName;

    async fn screen() -> (FormScreen<CountryForm>, ModalBroadcaster) {
        let session = SessionStore::restore(Arc::new(MemoryStorage::default()), Arc::new(StaticAuthenticator::default())).await;
        let api = ApiClient::new(reqwest::Client::new(), "http://127.0.0.1:9", session);
        let modal = ModalBroadcaster::new();
        (FormScreen::new(api, modal.clone(), Toaster::new(), FormMode::Create), modal)
    }

    #[tokio::test]
    async fn invalid_form_shows_error_and_keeps_values() {
        let (mut s, modal) = screen().await;
        s.form.name = LocalizedName::new("A", "", "");
        let err = s.submit().await.unwrap_err();
        assert_eq!(err, ConsoleError::Validation("name is missing locales: ru, en".into()));
        let view = modal.current().unwrap();
        assert_eq!(view.kind, ModalKind::Error);
        assert!(view.message.contains("ru, en"));
        assert_eq!(s.form.name.uz, "A");
        assert!(!s.is_submitting());
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected() {
        let (s, _) = screen().await;
        s.submitting.store(true, Ordering::SeqCst);
        assert_eq!(s.submit().await.unwrap_err(), ConsoleError::Busy);
        assert!(s.is_submitting());
    }

    #[test]
    fn success_message_label() {
        assert_eq!(capitalize(Resource::Countries.label()), "Country");
    }
}
