//! Marketplace participants: masters (craftsmen) and clients.

use serde::{Deserialize, Serialize};

use crate::entity::{label_or_id, Entity, Validate};
use crate::errors::ModelError;
use crate::ids::{EntityId, FileId};

/// Country/region/district reference triple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_id: Option<EntityId>,
}

impl Location {
    pub fn is_complete(&self) -> bool {
        [&self.country_id, &self.region_id, &self.district_id]
            .iter()
            .all(|id| id.as_ref().is_some_and(|id| !id.is_blank()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Master {
    pub id: EntityId,
    #[serde(flatten)]
    pub profile: MasterInput,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub phone: String,
    #[serde(default)]
    pub profile_photo: Option<FileId>,
    #[serde(default)]
    pub turon_id: i64,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub service_ids: Vec<EntityId>,
    #[serde(default)]
    pub work_photos: Vec<FileId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: EntityId,
    #[serde(flatten)]
    pub profile: ClientInput,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub phone: String,
    #[serde(default)]
    pub profile_photo: Option<FileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turon_id: Option<i64>,
    #[serde(default)]
    pub location: Location,
}

fn require(value: &str, field: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() { Err(ModelError::required(field)) } else { Ok(()) }
}

fn full_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

impl Validate for MasterInput {
    fn validate(&self) -> Result<(), ModelError> {
        require(&self.first_name, "firstName")?;
        require(&self.last_name, "lastName")?;
        require(&self.phone, "phone")?;
        if !self.location.is_complete() {
            return Err(ModelError::Validation("location requires country, region and district".into()));
        }
        if self.service_ids.is_empty() {
            return Err(ModelError::Validation("at least one service must be selected".into()));
        }
        if self.experience.months > 11 {
            return Err(ModelError::Validation("experience.months must be within 0..=11".into()));
        }
        Ok(())
    }
}

impl Validate for ClientInput {
    fn validate(&self) -> Result<(), ModelError> {
        require(&self.first_name, "firstName")?;
        require(&self.last_name, "lastName")?;
        require(&self.phone, "phone")
    }
}

impl Entity for Master {
    type Input = MasterInput;
    const RESOURCE: &'static str = "masters";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String {
        label_or_id(&full_name(&self.profile.first_name, &self.profile.last_name), &self.id)
    }
    fn to_input(&self) -> MasterInput { self.profile.clone() }
}

impl Entity for Client {
    type Input = ClientInput;
    const RESOURCE: &'static str = "clients";

    fn id(&self) -> &EntityId { &self.id }
    fn display_name(&self) -> String {
        label_or_id(&full_name(&self.profile.first_name, &self.profile.last_name), &self.id)
    }
    fn to_input(&self) -> ClientInput { self.profile.clone() }
}
