use serde::{de::DeserializeOwned, Serialize};

use crate::errors::ModelError;
use crate::ids::EntityId;

/// A server-owned record identified by a stable id.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Create/update body accepted by the resource endpoint.
    type Input: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection segment under the API base, e.g. `countries`.
    const RESOURCE: &'static str;

    fn id(&self) -> &EntityId;

    /// Human label used in confirmations and toasts.
    fn display_name(&self) -> String;

    /// Payload that would recreate this record; edit screens start from it.
    fn to_input(&self) -> Self::Input;
}

/// Validation shared by every create/update payload.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

/// Falls back to the id when a name is blank.
pub(crate) fn label_or_id(label: &str, id: &EntityId) -> String {
    if label.trim().is_empty() { id.to_string() } else { label.to_string() }
}
