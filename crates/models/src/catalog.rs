//! Two-level service catalogue: category → service.

use serde::{Deserialize, Serialize};

use crate::entity::{label_or_id, Entity, Validate};
use crate::errors::ModelError;
use crate::geo::ParentRef;
use crate::ids::{EntityId, FileId};
use crate::name::LocalizedName;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<FileId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
    pub category_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ParentRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: LocalizedName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<FileId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: LocalizedName,
    pub category_id: EntityId,
}

impl Validate for CategoryInput {
    fn validate(&self) -> Result<(), ModelError> { self.name.validate() }
}

impl Validate for ServiceInput {
    fn validate(&self) -> Result<(), ModelError> {
        if self.category_id.is_blank() {
            return Err(ModelError::required("categoryId"));
        }
        self.name.validate()
    }
}

impl Entity for Category {
    type Input = CategoryInput;
    const RESOURCE: &'static str = "categories";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String { label_or_id(&self.name.uz, &self.id) }
    fn to_input(&self) -> CategoryInput {
        CategoryInput { name: self.name.clone(), icon: self.icon.clone() }
    }
}

impl Entity for Service {
    type Input = ServiceInput;
    const RESOURCE: &'static str = "services";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String { label_or_id(&self.name.uz, &self.id) }
    fn to_input(&self) -> ServiceInput {
        ServiceInput { name: self.name.clone(), category_id: self.category_id.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_icon_is_omitted_when_absent() {
        let input = CategoryInput { name: LocalizedName::new("a", "b", "c"), icon: None };
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("icon").is_none());
    }

    #[test]
    fn service_requires_category() {
        let input = ServiceInput { name: LocalizedName::new("a", "b", "c"), category_id: EntityId::new("") };
        assert!(input.validate().is_err());
    }
}
