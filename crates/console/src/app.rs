use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use configs::AppConfig;
use models::EntityId;

use crate::api::{build_http_client, ApiClient};
use crate::errors::ConsoleError;
use crate::form::{EntityForm, FormMode, FormScreen};
use crate::list::ListScreen;
use crate::modal::ModalBroadcaster;
use crate::pagination::WindowConfig;
use crate::resources::Managed;
use crate::router::Shell;
use crate::session::{Authenticator, RemoteAuthenticator, SessionStore, StaticAuthenticator};
use crate::storage::{FileStorage, LocalStorage};
use crate::toast::Toaster;

/// Shared handles every screen is built from.
#[derive(Clone)]
pub struct Console {
    session: SessionStore,
    api: ApiClient,
    modal: ModalBroadcaster,
    toaster: Toaster,
    shell: Shell,
    window: WindowConfig,
    default_limit: u32,
}

impl Console {
    /// Wire everything from configuration, with local storage on disk.
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, ConsoleError> {
        let storage = FileStorage::open(cfg.session.storage_path.clone()).await?;
        Self::with_storage(cfg, storage).await
    }

    pub async fn with_storage(cfg: &AppConfig, storage: Arc<dyn LocalStorage>) -> Result<Self, ConsoleError> {
        let http = build_http_client(Duration::from_secs(cfg.api.request_timeout_secs))?;
        let authenticator: Arc<dyn Authenticator> = if cfg.session.offline_login {
            Arc::new(StaticAuthenticator::new(&cfg.server.admin_username, &cfg.server.admin_password))
        } else {
            Arc::new(RemoteAuthenticator::new(http.clone(), &cfg.api.base_url))
        };
        let session = SessionStore::restore(storage, authenticator).await;
        let api = ApiClient::new(http, &cfg.api.base_url, session.clone());
        info!(base_url = %api.base_url(), offline_login = cfg.session.offline_login, "console ready");
        Ok(Self {
            shell: Shell::new(session.clone()),
            session,
            api,
            modal: ModalBroadcaster::new(),
            toaster: Toaster::new(),
            window: WindowConfig::from(&cfg.pagination),
            default_limit: cfg.api.default_page_limit,
        })
    }

    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn api(&self) -> &ApiClient { &self.api }

    pub fn modal(&self) -> &ModalBroadcaster { &self.modal }

    pub fn toaster(&self) -> &Toaster { &self.toaster }

    pub fn shell(&self) -> &Shell { &self.shell }

    pub fn list<E: Managed>(&self) -> ListScreen<E> {
        ListScreen::new(self.api.clone(), self.modal.clone(), self.toaster.clone(), self.window, self.default_limit)
    }

    pub fn create_form<F: EntityForm>(&self) -> FormScreen<F> { self.form(FormMode::Create) }

    pub fn edit_form<F: EntityForm>(&self, id: EntityId) -> FormScreen<F> { self.form(FormMode::Edit(id)) }

    fn form<F: EntityForm>(&self, mode: FormMode) -> FormScreen<F> {
        FormScreen::new(self.api.clone(), self.modal.clone(), self.toaster.clone(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::CountryForm;
    use crate::router::Route;
    use crate::storage::MemoryStorage;
    use models::geo::Country;

    #[tokio::test]
    async fn offline_console_logs_in_and_builds_screens() {
        let mut cfg = AppConfig::default();
        cfg.session.offline_login = true;
        cfg.api.default_page_limit = 25;
        let console = Console::with_storage(&cfg, Arc::new(MemoryStorage::default())).await.unwrap();

        console.session().login("admin", "password123").await.unwrap();
        assert!(console.session().is_authenticated());

        let list = console.list::<Country>();
        assert_eq!(list.request().limit, 25);
        let form = console.edit_form::<CountryForm>("c1".into());
        assert_eq!(form.mode(), &FormMode::Edit("c1".into()));
        assert_eq!(console.shell().navigate("/countries").route(), &Route::List(crate::resources::Resource::Countries));
    }
}
