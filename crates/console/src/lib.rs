//! Admin console core for the services marketplace.
//!
//! Front-end independent: screens are plain state machines driven by async
//! calls, so the terminal client and the tests share the same code.

pub mod api;
pub mod app;
pub mod errors;
pub mod form;
pub mod list;
pub mod modal;
pub mod pagination;
pub mod resources;
pub mod router;
pub mod session;
pub mod storage;
pub mod table;
pub mod toast;

pub use api::ApiClient;
pub use app::Console;
pub use errors::ConsoleError;
pub use list::{ListScreen, RefreshStrategy};
pub use modal::{ModalBroadcaster, ModalConfig, ModalKind};
pub use pagination::{PageRequest, PaginationControl, WindowConfig};
pub use resources::{Managed, Resource};
pub use router::{Navigation, Route, Shell};
pub use session::SessionStore;
pub use toast::Toaster;
