//! Geographic reference data: country → region → district.

use serde::{Deserialize, Serialize};

use crate::entity::{label_or_id, Entity, Validate};
use crate::errors::ModelError;
use crate::ids::EntityId;
use crate::name::LocalizedName;

/// Denormalized snapshot of a parent record, embedded for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
    pub country_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<ParentRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    pub id: EntityId,
    #[serde(default)]
    pub name: LocalizedName,
    pub country_id: EntityId,
    pub region_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<ParentRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInput {
    pub name: LocalizedName,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionInput {
    pub name: LocalizedName,
    pub country_id: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictInput {
    pub name: LocalizedName,
    pub country_id: EntityId,
    pub region_id: EntityId,
}

impl Validate for CountryInput {
    fn validate(&self) -> Result<(), ModelError> { self.name.validate() }
}

impl Validate for RegionInput {
    fn validate(&self) -> Result<(), ModelError> {
        if self.country_id.is_blank() {
            return Err(ModelError::required("countryId"));
        }
        self.name.validate()
    }
}

impl Validate for DistrictInput {
    fn validate(&self) -> Result<(), ModelError> {
        if self.country_id.is_blank() {
            return Err(ModelError::required("countryId"));
        }
        if self.region_id.is_blank() {
            return Err(ModelError::required("regionId"));
        }
        self.name.validate()
    }
}

impl Entity for Country {
    type Input = CountryInput;
    const RESOURCE: &'static str = "countries";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String { label_or_id(&self.name.uz, &self.id) }
    fn to_input(&self) -> CountryInput { CountryInput { name: self.name.clone() } }
}

impl Entity for Region {
    type Input = RegionInput;
    const RESOURCE: &'static str = "regions";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String { label_or_id(&self.name.uz, &self.id) }
    fn to_input(&self) -> RegionInput {
        RegionInput { name: self.name.clone(), country_id: self.country_id.clone() }
    }
}

impl Entity for District {
    type Input = DistrictInput;
    const RESOURCE: &'static str = "districts";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String { label_or_id(&self.name.uz, &self.id) }
    fn to_input(&self) -> DistrictInput {
        DistrictInput {
            name: self.name.clone(),
            country_id: self.country_id.clone(),
            region_id: self.region_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_reads_camel_case_and_parent_snapshot() {
        let region: Region = serde_json::from_value(json!({
            "id": "r1",
            "name": {"uz": "Samarqand", "ru": "Самарканд", "en": "Samarkand"},
            "countryId": "c1",
            "country": {"id": "c1", "name": {"uz": "O'zbekiston"}}
        }))
        .unwrap();
        assert_eq!(region.country_id.as_str(), "c1");
        assert_eq!(region.country.unwrap().name.uz, "O'zbekiston");
    }

    #[test]
    fn district_input_requires_region() {
        let input = DistrictInput {
            name: LocalizedName::new("A", "B", "C"),
            country_id: EntityId::new("c1"),
            region_id: EntityId::new(""),
        };
        assert_eq!(input.validate(), Err(ModelError::required("regionId")));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let country = Country { id: EntityId::new("c7"), name: LocalizedName::default() };
        assert_eq!(country.display_name(), "c7");
    }
}
