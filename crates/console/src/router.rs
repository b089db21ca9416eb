//! Route table and the authenticated shell around it.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use models::EntityId;

use crate::resources::Resource;
use crate::session::SessionStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    List(Resource),
    Create(Resource),
    Edit(Resource, EntityId),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            [resource, rest @ ..] => match (resource.parse::<Resource>(), rest) {
                (Ok(r), []) => Route::List(r),
                (Ok(r), ["create"]) => Route::Create(r),
                (Ok(r), ["edit", id]) => Route::Edit(r, EntityId::new(*id)),
                _ => Route::NotFound(clean.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Home => "/".into(),
            Route::List(r) => format!("/{r}"),
            Route::Create(r) => format!("/{r}/create"),
            Route::Edit(r, id) => format!("/{r}/edit/{id}"),
            Route::NotFound(p) => p.clone(),
        }
    }

    /// Everything except the login page and unknown paths needs a session.
    pub fn is_protected(&self) -> bool { !matches!(self, Route::Login | Route::NotFound(_)) }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.path()) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { to: Route, from: Option<Route> },
}

impl Navigation {
    /// Route that ends up on screen.
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Render(r) => r,
            Navigation::Redirect { to, .. } => to,
        }
    }
}

#[derive(Default)]
struct ShellState {
    current: Option<Route>,
    return_to: Option<Route>,
}

/// Guards protected routes and remembers where to go after login.
#[derive(Clone)]
pub struct Shell {
    session: SessionStore,
    state: Arc<Mutex<ShellState>>,
}

impl Shell {
    pub fn new(session: SessionStore) -> Self { Self { session, state: Arc::default() } }

    pub fn navigate(&self, path: &str) -> Navigation {
        let route = Route::parse(path);
        let authenticated = self.session.is_authenticated();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let nav = if route.is_protected() && !authenticated {
            state.return_to = Some(route.clone());
            Navigation::Redirect { to: Route::Login, from: Some(route) }
        } else if route == Route::Login && authenticated {
            let to = state.return_to.take().unwrap_or(Route::Home);
            Navigation::Redirect { to, from: Some(Route::Login) }
        } else {
            Navigation::Render(route)
        };
        debug!(path, to = %nav.route(), "navigate");
        state.current = Some(nav.route().clone());
        nav
    }

    /// Destination once a login succeeds: the recorded route, else home.
    pub fn after_login(&self) -> Route {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let to = state.return_to.take().unwrap_or(Route::Home);
        state.current = Some(to.clone());
        to
    }

    pub fn current(&self) -> Option<Route> { self.state.lock().unwrap_or_else(PoisonError::into_inner).current.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticAuthenticator;
    use crate::storage::MemoryStorage;

    async fn shell() -> (Shell, SessionStore) {
        let session = SessionStore::restore(Arc::new(MemoryStorage::default()), Arc::new(StaticAuthenticator::default())).await;
        (Shell::new(session.clone()), session)
    }

    #[test]
    fn parse_covers_route_table() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/regions/"), Route::List(Resource::Regions));
        assert_eq!(Route::parse("/masters/create"), Route::Create(Resource::Masters));
        assert_eq!(Route::parse("/countries/edit/c-1?tab=x"), Route::Edit(Resource::Countries, EntityId::new("c-1")));
        assert_eq!(Route::parse("/products"), Route::NotFound("/products".into()));
        assert_eq!(Route::parse("/countries/edit"), Route::NotFound("/countries/edit".into()));
    }

    #[test]
    fn path_roundtrips() {
        let route = Route::Edit(Resource::Districts, EntityId::new("d9"));
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[tokio::test]
    async fn protected_route_redirects_and_returns_after_login() {
        let (shell, session) = shell().await;
        let nav = shell.navigate("/regions");
        assert_eq!(
            nav,
            Navigation::Redirect { to: Route::Login, from: Some(Route::List(Resource::Regions)) }
        );
        session.login("admin", "password123").await.unwrap();
        assert_eq!(shell.after_login(), Route::List(Resource::Regions));
        assert_eq!(shell.after_login(), Route::Home);
    }

    #[tokio::test]
    async fn login_page_redirects_when_authenticated() {
        let (shell, session) = shell().await;
        assert_eq!(shell.navigate("/login"), Navigation::Render(Route::Login));
        session.login("admin", "password123").await.unwrap();
        assert_eq!(shell.navigate("/login").route(), &Route::Home);
        assert_eq!(shell.navigate("/nope"), Navigation::Render(Route::NotFound("/nope".into())));
        assert_eq!(shell.current(), Some(Route::NotFound("/nope".into())));
    }
}
