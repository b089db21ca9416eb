//! Form state for each resource.

use async_trait::async_trait;

use models::catalog::{Category, CategoryInput, Service, ServiceInput};
use models::geo::{Country, CountryInput, District, DistrictInput, Region, RegionInput};
use models::people::{Client, ClientInput, Experience, Master, MasterInput};
use models::{EntityId, LocalizedName, ModelError, Validate};

use super::fields::{uploaded_ids, FileField};
use super::selector::{LocationSelector, Selector, ServicePicker};
use super::{EntityForm, Payload};
use crate::api::ApiClient;
use crate::errors::ConsoleError;

fn checked<T: Validate>(payload: T) -> Result<T, ConsoleError> {
    payload.validate()?;
    Ok(payload)
}

fn required_id(id: Option<&EntityId>, field: &str) -> Result<EntityId, ConsoleError> {
    id.cloned().ok_or_else(|| ModelError::required(field).into())
}

/// Leading integer of a text input (`"12 yil"` reads as 12); `None` when there is none.
pub fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim_start();
    let (sign, digits) = match t.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, t.strip_prefix('+').unwrap_or(t)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn parse_count(text: &str) -> u32 { parse_int(text).and_then(|n| u32::try_from(n).ok()).unwrap_or(0) }

#[derive(Clone, Debug, Default)]
pub struct CountryForm {
    pub name: LocalizedName,
}

impl EntityForm for CountryForm {
    type Entity = Country;

    fn from_entity(entity: &Country) -> Self { Self { name: entity.name.clone() } }

    fn to_payload(&self) -> Result<CountryInput, ConsoleError> { checked(CountryInput { name: self.name.clone() }) }
}

#[derive(Clone, Debug, Default)]
pub struct RegionForm {
    pub name: LocalizedName,
    pub country: Selector<Country>,
}

#[async_trait]
impl EntityForm for RegionForm {
    type Entity = Region;

    fn from_entity(entity: &Region) -> Self {
        let mut country = Selector::default();
        country.select(Some(entity.country_id.clone()));
        Self { name: entity.name.clone(), country }
    }

    fn to_payload(&self) -> Result<RegionInput, ConsoleError> {
        let country_id = required_id(self.country.selected(), "countryId")?;
        checked(RegionInput { name: self.name.clone(), country_id })
    }

    async fn prepare(&mut self, api: &ApiClient) -> Result<(), ConsoleError> { self.country.load(api, &[]).await }
}

#[derive(Clone, Debug, Default)]
pub struct DistrictForm {
    pub name: LocalizedName,
    pub location: LocationSelector,
    saved: Option<(EntityId, EntityId)>,
}

#[async_trait]
impl EntityForm for DistrictForm {
    type Entity = District;

    fn from_entity(entity: &District) -> Self {
        Self {
            name: entity.name.clone(),
            location: LocationSelector::default(),
            saved: Some((entity.country_id.clone(), entity.region_id.clone())),
        }
    }

    fn to_payload(&self) -> Result<DistrictInput, ConsoleError> {
        let country_id = required_id(self.location.countries.selected(), "countryId")?;
        let region_id = required_id(self.location.regions.selected(), "regionId")?;
        checked(DistrictInput { name: self.name.clone(), country_id, region_id })
    }

    async fn prepare(&mut self, api: &ApiClient) -> Result<(), ConsoleError> {
        self.location.load_countries(api).await?;
        if let Some((country, region)) = self.saved.take() {
            self.location.select_country(api, country).await?;
            self.location.regions.select(Some(region));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryForm {
    pub name: LocalizedName,
    pub icon: FileField,
}

impl EntityForm for CategoryForm {
    type Entity = Category;

    fn from_entity(entity: &Category) -> Self {
        Self { name: entity.name.clone(), icon: FileField::from_id(entity.icon.clone()) }
    }

    fn to_payload(&self) -> Result<CategoryInput, ConsoleError> {
        checked(CategoryInput { name: self.name.clone(), icon: self.icon.file_id().cloned() })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ServiceForm {
    pub name: LocalizedName,
    pub category: Selector<Category>,
}

#[async_trait]
impl EntityForm for ServiceForm {
    type Entity = Service;

    fn from_entity(entity: &Service) -> Self {
        let mut category = Selector::default();
        category.select(Some(entity.category_id.clone()));
        Self { name: entity.name.clone(), category }
    }

    fn to_payload(&self) -> Result<ServiceInput, ConsoleError> {
        let category_id = required_id(self.category.selected(), "categoryId")?;
        checked(ServiceInput { name: self.name.clone(), category_id })
    }

    async fn prepare(&mut self, api: &ApiClient) -> Result<(), ConsoleError> { self.category.load(api, &[]).await }
}

/// Text inputs shared by the two people forms.
#[derive(Clone, Debug, Default)]
pub struct PersonFields {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: String,
    pub turon_id: String,
    pub photo: FileField,
}

#[derive(Clone, Debug, Default)]
pub struct ClientForm {
    pub person: PersonFields,
    pub location: LocationSelector,
    saved: Option<models::people::Location>,
}

impl ClientForm {
    /// Form filled from a request body, e.g. one read from a file.
    pub fn from_input(p: &ClientInput) -> Self {
        Self {
            person: PersonFields {
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                middle_name: p.middle_name.clone(),
                phone: p.phone.clone(),
                turon_id: p.turon_id.map(|n| n.to_string()).unwrap_or_default(),
                photo: FileField::from_id(p.profile_photo.clone()),
            },
            location: LocationSelector::default(),
            saved: Some(p.location.clone()),
        }
    }
}

#[async_trait]
impl EntityForm for ClientForm {
    type Entity = Client;

    fn from_entity(entity: &Client) -> Self { Self::from_input(&entity.profile) }

    fn to_payload(&self) -> Result<Payload<Self>, ConsoleError> {
        let p = &self.person;
        checked(ClientInput {
            first_name: p.first_name.trim().to_string(),
            last_name: p.last_name.trim().to_string(),
            middle_name: p.middle_name.trim().to_string(),
            phone: p.phone.trim().to_string(),
            profile_photo: p.photo.file_id().cloned(),
            // zero counts as not provided
            turon_id: parse_int(&p.turon_id).filter(|n| *n != 0),
            location: self.location.location(),
        })
    }

    async fn prepare(&mut self, api: &ApiClient) -> Result<(), ConsoleError> {
        match self.saved.take() {
            Some(location) => self.location.restore(api, &location).await,
            None => self.location.load_countries(api).await,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MasterForm {
    pub person: PersonFields,
    pub experience_years: String,
    pub experience_months: String,
    pub location: LocationSelector,
    pub services: ServicePicker,
    pub work_photos: Vec<FileField>,
    saved: Option<models::people::Location>,
}

impl MasterForm {
    pub fn from_input(p: &MasterInput) -> Self {
        Self {
            person: PersonFields {
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                middle_name: p.middle_name.clone(),
                phone: p.phone.clone(),
                turon_id: p.turon_id.to_string(),
                photo: FileField::from_id(p.profile_photo.clone()),
            },
            experience_years: p.experience.years.to_string(),
            experience_months: p.experience.months.to_string(),
            location: LocationSelector::default(),
            services: ServicePicker::with_chosen(p.service_ids.clone()),
            work_photos: p.work_photos.iter().map(|id| FileField::from_id(Some(id.clone()))).collect(),
            saved: Some(p.location.clone()),
        }
    }

    /// Empty slot for another work photo; returns its index.
    pub fn add_work_photo(&mut self) -> usize {
        self.work_photos.push(FileField::default());
        self.work_photos.len() - 1
    }

    pub fn remove_work_photo(&mut self, index: usize) -> Option<FileField> {
        (index < self.work_photos.len()).then(|| self.work_photos.remove(index))
    }
}

#[async_trait]
impl EntityForm for MasterForm {
    type Entity = Master;

    fn from_entity(entity: &Master) -> Self { Self::from_input(&entity.profile) }

    fn to_payload(&self) -> Result<MasterInput, ConsoleError> {
        let p = &self.person;
        checked(MasterInput {
            first_name: p.first_name.trim().to_string(),
            last_name: p.last_name.trim().to_string(),
            middle_name: p.middle_name.trim().to_string(),
            phone: p.phone.trim().to_string(),
            profile_photo: p.photo.file_id().cloned(),
            turon_id: parse_int(&p.turon_id).unwrap_or(0),
            experience: Experience {
                years: parse_count(&self.experience_years),
                months: parse_count(&self.experience_months),
            },
            location: self.location.location(),
            service_ids: self.services.chosen().to_vec(),
            work_photos: uploaded_ids(&self.work_photos),
        })
    }

    async fn prepare(&mut self, api: &ApiClient) -> Result<(), ConsoleError> {
        match self.saved.take() {
            Some(location) => self.location.restore(api, &location).await?,
            None => self.location.load_countries(api).await?,
        }
        self.services.load_categories(api).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::people::Location;

    fn located() -> LocationSelector {
        let mut loc = LocationSelector::default();
        let t = loc.begin_country("c1".into());
        loc.finish_regions(&t, Ok(vec![]));
        let t = loc.begin_region("r1".into());
        loc.finish_districts(&t, Ok(vec![]));
        loc.select_district(Some("d1".into()));
        loc
    }

    fn person() -> PersonFields {
        PersonFields {
            first_name: " Aziz ".into(),
            last_name: "Karimov".into(),
            phone: "+998901234567".into(),
            ..PersonFields::default()
        }
    }

    #[test]
    fn parse_int_reads_leading_digits() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int(" 12 yil"), Some(12));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
    }

    #[test]
    fn master_numbers_default_to_zero() {
        let mut form = MasterForm { person: person(), location: located(), ..MasterForm::default() };
        form.person.turon_id = "n/a".into();
        form.experience_years = "5".into();
        form.experience_months = "x".into();
        form.services.toggle("s1".into());
        form.add_work_photo();
        form.work_photos.push(FileField::from_id(Some("w1".into())));

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.first_name, "Aziz");
        assert_eq!(payload.turon_id, 0);
        assert_eq!(payload.experience, Experience { years: 5, months: 0 });
        assert_eq!(payload.work_photos, vec![models::FileId::new("w1")]);
        assert_eq!(payload.location.district_id, Some("d1".into()));
    }

    #[test]
    fn master_requires_a_service() {
        let form = MasterForm { person: person(), location: located(), ..MasterForm::default() };
        assert!(matches!(form.validate(), Err(ConsoleError::Validation(msg)) if msg.contains("service")));
    }

    #[test]
    fn client_requires_names_and_phone_only() {
        let mut form = ClientForm { person: person(), ..ClientForm::default() };
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.location, Location::default());
        assert_eq!(payload.turon_id, None);

        form.person.phone.clear();
        assert_eq!(form.validate(), Err(ConsoleError::Validation("phone is required".into())));
    }

    #[test]
    fn master_read_from_input_submits_the_same_payload() {
        let input = MasterInput {
            first_name: "Aziz".into(),
            last_name: "Karimov".into(),
            phone: "+998901234567".into(),
            turon_id: 7,
            experience: Experience { years: 3, months: 4 },
            service_ids: vec!["s1".into()],
            work_photos: vec![models::FileId::new("w1")],
            location: Location {
                country_id: Some("c1".into()),
                region_id: Some("r1".into()),
                district_id: Some("d1".into()),
            },
            ..MasterInput::default()
        };
        let mut form = MasterForm::from_input(&input);
        assert_eq!(form.saved.as_ref(), Some(&input.location));

        // what prepare() would select after loading the option lists
        form.saved = None;
        form.location = located();
        assert_eq!(form.to_payload().unwrap(), input);
    }

    #[test]
    fn region_needs_a_country() {
        let form = RegionForm { name: LocalizedName::new("a", "b", "c"), ..RegionForm::default() };
        assert_eq!(form.validate(), Err(ConsoleError::Validation("countryId is required".into())));
    }

    #[test]
    fn edit_form_prefills_from_entity() {
        let district = District {
            id: "d1".into(),
            name: LocalizedName::new("Chilonzor", "Чиланзар", "Chilanzar"),
            country_id: "c1".into(),
            region_id: "r1".into(),
            country: None,
            region: None,
        };
        let form = DistrictForm::from_entity(&district);
        assert_eq!(form.name.uz, "Chilonzor");
        assert_eq!(form.saved, Some(("c1".into(), "r1".into())));
    }
}
