//! Option lists for reference fields, including the dependent
//! country → region → district and category → service chains.
//!
//! A dependent list is fetched under a generation ticket. When the parent
//! selection changes before the response arrives, the ticket no longer
//! matches and the late response is discarded.

use tracing::debug;

use models::catalog::{Category, Service};
use models::geo::{Country, District, Region};
use models::people::Location;
use models::{Entity, EntityId};

use crate::api::ApiClient;
use crate::errors::ConsoleError;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum OptionsState<T> {
    /// Nothing to load yet (no parent selected).
    #[default]
    Idle,
    Loading,
    Ready(Vec<T>),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selector<T> {
    selected: Option<EntityId>,
    state: OptionsState<T>,
}

impl<T> Default for Selector<T> {
    fn default() -> Self { Self { selected: None, state: OptionsState::Idle } }
}

impl<T: Entity> Selector<T> {
    pub fn selected(&self) -> Option<&EntityId> { self.selected.as_ref() }

    pub fn state(&self) -> &OptionsState<T> { &self.state }

    pub fn options(&self) -> &[T] {
        match &self.state {
            OptionsState::Ready(items) => items,
            _ => &[],
        }
    }

    /// Disabled until its options have loaded.
    pub fn is_disabled(&self) -> bool { !matches!(self.state, OptionsState::Ready(_)) }

    pub fn select(&mut self, id: Option<EntityId>) { self.selected = id.filter(|id| !id.is_blank()); }

    pub fn selected_option(&self) -> Option<&T> {
        let id = self.selected.as_ref()?;
        self.options().iter().find(|o| o.id() == id)
    }

    fn reset(&mut self) {
        self.selected = None;
        self.state = OptionsState::Idle;
    }

    fn begin(&mut self) {
        self.selected = None;
        self.state = OptionsState::Loading;
    }

    fn finish(&mut self, result: Result<Vec<T>, ConsoleError>) {
        self.state = match result {
            Ok(items) => OptionsState::Ready(items),
            Err(e) => OptionsState::Failed(e.to_string()),
        };
    }

    /// Load an independent option list, e.g. all countries.
    pub async fn load(&mut self, api: &ApiClient, filters: &[(&str, &str)]) -> Result<(), ConsoleError> {
        self.state = OptionsState::Loading;
        let result = api.fetch_options::<T>(&format!("/{}", T::RESOURCE), filters).await;
        let err = result.as_ref().err().cloned();
        self.finish(result);
        err.map_or(Ok(()), Err)
    }
}

/// Claim on the response of one dependent fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    parent: EntityId,
}

impl Ticket {
    pub fn parent(&self) -> &EntityId { &self.parent }
}

#[derive(Clone, Debug, Default)]
pub struct LocationSelector {
    pub countries: Selector<Country>,
    pub regions: Selector<Region>,
    pub districts: Selector<District>,
    region_generation: u64,
    district_generation: u64,
}

impl LocationSelector {
    pub async fn load_countries(&mut self, api: &ApiClient) -> Result<(), ConsoleError> {
        self.countries.load(api, &[]).await
    }

    /// Choose a country: region and district are cleared and the region list goes back to loading.
    pub fn begin_country(&mut self, id: EntityId) -> Ticket {
        self.countries.select(Some(id.clone()));
        self.regions.begin();
        self.districts.reset();
        self.region_generation += 1;
        self.district_generation += 1;
        Ticket { generation: self.region_generation, parent: id }
    }

    /// Apply a region list; returns `false` when the ticket was superseded.
    pub fn finish_regions(&mut self, ticket: &Ticket, result: Result<Vec<Region>, ConsoleError>) -> bool {
        if ticket.generation != self.region_generation {
            debug!(country = %ticket.parent, "stale region list discarded");
            return false;
        }
        self.regions.finish(result);
        true
    }

    pub fn begin_region(&mut self, id: EntityId) -> Ticket {
        self.regions.select(Some(id.clone()));
        self.districts.begin();
        self.district_generation += 1;
        Ticket { generation: self.district_generation, parent: id }
    }

    pub fn finish_districts(&mut self, ticket: &Ticket, result: Result<Vec<District>, ConsoleError>) -> bool {
        if ticket.generation != self.district_generation {
            debug!(region = %ticket.parent, "stale district list discarded");
            return false;
        }
        self.districts.finish(result);
        true
    }

    pub async fn select_country(&mut self, api: &ApiClient, id: EntityId) -> Result<(), ConsoleError> {
        let ticket = self.begin_country(id);
        let result = api.fetch_options::<Region>("/regions", &[("countryId", ticket.parent.as_str())]).await;
        let err = result.as_ref().err().cloned();
        self.finish_regions(&ticket, result);
        err.map_or(Ok(()), Err)
    }

    pub async fn select_region(&mut self, api: &ApiClient, id: EntityId) -> Result<(), ConsoleError> {
        let ticket = self.begin_region(id);
        let result = api.fetch_options::<District>("/districts", &[("regionId", ticket.parent.as_str())]).await;
        let err = result.as_ref().err().cloned();
        self.finish_districts(&ticket, result);
        err.map_or(Ok(()), Err)
    }

    pub fn select_district(&mut self, id: Option<EntityId>) { self.districts.select(id); }

    /// Restore a saved location: load every list along the chain and keep the selections.
    pub async fn restore(&mut self, api: &ApiClient, location: &Location) -> Result<(), ConsoleError> {
        self.load_countries(api).await?;
        if let Some(country) = location.country_id.clone() {
            self.select_country(api, country).await?;
            if let Some(region) = location.region_id.clone() {
                self.select_region(api, region).await?;
                self.select_district(location.district_id.clone());
            }
        }
        Ok(())
    }

    pub fn location(&self) -> Location {
        Location {
            country_id: self.countries.selected().cloned(),
            region_id: self.regions.selected().cloned(),
            district_id: self.districts.selected().cloned(),
        }
    }
}

/// Category filter plus a multi-select of services.
#[derive(Clone, Debug, Default)]
pub struct ServicePicker {
    pub categories: Selector<Category>,
    pub services: Selector<Service>,
    chosen: Vec<EntityId>,
    generation: u64,
}

impl ServicePicker {
    pub fn with_chosen(chosen: Vec<EntityId>) -> Self { Self { chosen, ..Self::default() } }

    pub async fn load_categories(&mut self, api: &ApiClient) -> Result<(), ConsoleError> {
        self.categories.load(api, &[]).await
    }

    pub fn begin_category(&mut self, id: EntityId) -> Ticket {
        self.categories.select(Some(id.clone()));
        self.services.begin();
        self.generation += 1;
        Ticket { generation: self.generation, parent: id }
    }

    pub fn finish_services(&mut self, ticket: &Ticket, result: Result<Vec<Service>, ConsoleError>) -> bool {
        if ticket.generation != self.generation {
            debug!(category = %ticket.parent, "stale service list discarded");
            return false;
        }
        self.services.finish(result);
        true
    }

    pub async fn select_category(&mut self, api: &ApiClient, id: EntityId) -> Result<(), ConsoleError> {
        let ticket = self.begin_category(id);
        let result = api.fetch_options::<Service>("/services", &[("categoryId", ticket.parent.as_str())]).await;
        let err = result.as_ref().err().cloned();
        self.finish_services(&ticket, result);
        err.map_or(Ok(()), Err)
    }

    /// Add or remove a service; returns whether it is now chosen.
    pub fn toggle(&mut self, id: EntityId) -> bool {
        if let Some(pos) = self.chosen.iter().position(|c| *c == id) {
            self.chosen.remove(pos);
            false
        } else {
            self.chosen.push(id);
            true
        }
    }

    pub fn chosen(&self) -> &[EntityId] { &self.chosen }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::LocalizedName;

    fn region(id: &str, country: &str) -> Region {
        Region { id: id.into(), name: LocalizedName::new(id, id, id), country_id: country.into(), country: None }
    }

    #[test]
    fn choosing_country_clears_children_and_disables_regions() {
        let mut loc = LocationSelector::default();
        let t = loc.begin_country("c1".into());
        assert!(loc.finish_regions(&t, Ok(vec![region("r1", "c1")])));
        let t = loc.begin_region("r1".into());
        assert!(loc.finish_districts(&t, Ok(vec![])));
        loc.select_district(Some("d1".into()));

        let ticket = loc.begin_country("c2".into());
        assert_eq!(loc.location(), Location { country_id: Some("c2".into()), region_id: None, district_id: None });
        assert!(loc.regions.is_disabled());
        assert_eq!(loc.regions.state(), &OptionsState::Loading);
        assert_eq!(loc.districts.state(), &OptionsState::Idle);
        assert!(loc.districts.options().is_empty());

        assert!(loc.finish_regions(&ticket, Ok(vec![region("r9", "c2")])));
        assert!(!loc.regions.is_disabled());
        assert_eq!(loc.regions.options().len(), 1);
    }

    #[test]
    fn superseded_region_response_is_discarded() {
        let mut loc = LocationSelector::default();
        let first = loc.begin_country("c1".into());
        let second = loc.begin_country("c2".into());
        assert!(!loc.finish_regions(&first, Ok(vec![region("r1", "c1")])));
        assert!(loc.regions.is_disabled());
        assert!(loc.finish_regions(&second, Ok(vec![region("r2", "c2")])));
        assert_eq!(loc.regions.options()[0].id.as_str(), "r2");
    }

    #[test]
    fn failed_region_load_keeps_selector_disabled() {
        let mut loc = LocationSelector::default();
        let t = loc.begin_country("c1".into());
        loc.finish_regions(&t, Err(ConsoleError::Transport("down".into())));
        assert!(loc.regions.is_disabled());
        assert!(matches!(loc.regions.state(), OptionsState::Failed(msg) if msg.contains("down")));
    }

    #[test]
    fn changing_category_keeps_chosen_services() {
        let mut picker = ServicePicker::with_chosen(vec!["s1".into()]);
        assert!(picker.toggle("s2".into()));
        let t = picker.begin_category("cat2".into());
        assert!(picker.services.is_disabled());
        assert!(picker.finish_services(&t, Ok(vec![])));
        assert!(!picker.toggle("s1".into()));
        assert_eq!(picker.chosen(), &[EntityId::new("s2")]);
    }
}
