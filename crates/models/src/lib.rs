//! Marketplace entity models shared by the console and the reference API.
//! - Plain records mirrored from the remote API (camelCase on the wire).
//! - Create/update payloads with their own validation.
//! - The `{ data, pagination }` list envelope.

pub mod errors;
pub mod ids;
pub mod name;
pub mod geo;
pub mod catalog;
pub mod people;
pub mod page;
pub mod entity;

pub use entity::{Entity, Validate};
pub use errors::ModelError;
pub use ids::{EntityId, FileId};
pub use name::{LocalizedName, Locale};
pub use page::{Page, PaginationMeta, RawPage};
