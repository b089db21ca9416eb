//! In-memory marketplace data.
//!
//! Records keep insertion order so list pages are stable. Parent snapshots
//! (`country`, `region`, `category`) are filled in on read from the current
//! parents, so renaming a country shows up on its regions immediately.

use std::collections::HashMap;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use models::catalog::{Category, CategoryInput, Service, ServiceInput};
use models::geo::{Country, CountryInput, District, DistrictInput, ParentRef, Region, RegionInput};
use models::people::{Client, ClientInput, Location, Master, MasterInput};
use models::{Entity, EntityId, FileId, LocalizedName, Page, Validate};

use crate::errors::StoreError;

/// List filters accepted by every collection; each record type uses the ones that apply.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub country_id: Option<EntityId>,
    pub region_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

impl ListQuery {
    pub fn page(&self) -> u32 { self.page.filter(|p| *p > 0).unwrap_or(1) }

    pub fn limit(&self) -> u32 { self.limit.unwrap_or(10).clamp(1, 100) }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct Collections {
    pub countries: Vec<Country>,
    pub regions: Vec<Region>,
    pub districts: Vec<District>,
    pub categories: Vec<Category>,
    pub services: Vec<Service>,
    pub masters: Vec<Master>,
    pub clients: Vec<Client>,
    pub files: HashMap<FileId, StoredFile>,
}

fn find<'a, T: Entity>(items: &'a [T], id: &EntityId) -> Option<&'a T> { items.iter().find(|i| i.id() == id) }

fn exists<T: Entity>(items: &[T], id: &EntityId, what: &str) -> Result<(), StoreError> {
    find(items, id).map(|_| ()).ok_or_else(|| StoreError::Dangling(format!("{what} '{id}' does not exist")))
}

fn snapshot(id: &EntityId, name: &LocalizedName) -> ParentRef { ParentRef { id: id.clone(), name: name.clone() } }

fn check_location(c: &Collections, loc: &Location) -> Result<(), StoreError> {
    if let Some(id) = &loc.country_id {
        exists(&c.countries, id, "country")?;
    }
    if let Some(id) = &loc.region_id {
        exists(&c.regions, id, "region")?;
    }
    if let Some(id) = &loc.district_id {
        exists(&c.districts, id, "district")?;
    }
    Ok(())
}

/// A stored collection served under `/<Entity::RESOURCE>`.
pub trait Record: Entity {
    fn table(c: &Collections) -> &Vec<Self>;
    fn table_mut(c: &mut Collections) -> &mut Vec<Self>;
    /// Check references and build the record to store.
    fn build(id: EntityId, input: Self::Input, c: &Collections) -> Result<Self, StoreError>;
    fn matches(&self, _q: &ListQuery) -> bool { true }
    /// Refresh denormalized parent snapshots.
    fn resolve(self, _c: &Collections) -> Self { self }
}

impl Record for Country {
    fn table(c: &Collections) -> &Vec<Self> { &c.countries }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.countries }

    fn build(id: EntityId, input: CountryInput, _c: &Collections) -> Result<Self, StoreError> {
        Ok(Country { id, name: input.name })
    }
}

impl Record for Region {
    fn table(c: &Collections) -> &Vec<Self> { &c.regions }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.regions }

    fn build(id: EntityId, input: RegionInput, c: &Collections) -> Result<Self, StoreError> {
        exists(&c.countries, &input.country_id, "country")?;
        Ok(Region { id, name: input.name, country_id: input.country_id, country: None }.resolve(c))
    }

    fn matches(&self, q: &ListQuery) -> bool { q.country_id.as_ref().map_or(true, |id| *id == self.country_id) }

    fn resolve(mut self, c: &Collections) -> Self {
        self.country = find(&c.countries, &self.country_id).map(|p| snapshot(&p.id, &p.name));
        self
    }
}

impl Record for District {
    fn table(c: &Collections) -> &Vec<Self> { &c.districts }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.districts }

    fn build(id: EntityId, input: DistrictInput, c: &Collections) -> Result<Self, StoreError> {
        exists(&c.countries, &input.country_id, "country")?;
        let region = find(&c.regions, &input.region_id)
            .ok_or_else(|| StoreError::Dangling(format!("region '{}' does not exist", input.region_id)))?;
        if region.country_id != input.country_id {
            return Err(StoreError::Invalid(format!(
                "region '{}' does not belong to country '{}'",
                input.region_id, input.country_id
            )));
        }
        let district = District {
            id,
            name: input.name,
            country_id: input.country_id,
            region_id: input.region_id,
            country: None,
            region: None,
        };
        Ok(district.resolve(c))
    }

    fn matches(&self, q: &ListQuery) -> bool {
        q.country_id.as_ref().map_or(true, |id| *id == self.country_id)
            && q.region_id.as_ref().map_or(true, |id| *id == self.region_id)
    }

    fn resolve(mut self, c: &Collections) -> Self {
        self.country = find(&c.countries, &self.country_id).map(|p| snapshot(&p.id, &p.name));
        self.region = find(&c.regions, &self.region_id).map(|p| snapshot(&p.id, &p.name));
        self
    }
}

impl Record for Category {
    fn table(c: &Collections) -> &Vec<Self> { &c.categories }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.categories }

    fn build(id: EntityId, input: CategoryInput, _c: &Collections) -> Result<Self, StoreError> {
        Ok(Category { id, name: input.name, icon: input.icon })
    }
}

impl Record for Service {
    fn table(c: &Collections) -> &Vec<Self> { &c.services }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.services }

    fn build(id: EntityId, input: ServiceInput, c: &Collections) -> Result<Self, StoreError> {
        exists(&c.categories, &input.category_id, "category")?;
        Ok(Service { id, name: input.name, category_id: input.category_id, category: None }.resolve(c))
    }

    fn matches(&self, q: &ListQuery) -> bool { q.category_id.as_ref().map_or(true, |id| *id == self.category_id) }

    fn resolve(mut self, c: &Collections) -> Self {
        self.category = find(&c.categories, &self.category_id).map(|p| snapshot(&p.id, &p.name));
        self
    }
}

impl Record for Master {
    fn table(c: &Collections) -> &Vec<Self> { &c.masters }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.masters }

    fn build(id: EntityId, input: MasterInput, c: &Collections) -> Result<Self, StoreError> {
        check_location(c, &input.location)?;
        for service in &input.service_ids {
            exists(&c.services, service, "service")?;
        }
        Ok(Master { id, profile: input })
    }
}

impl Record for Client {
    fn table(c: &Collections) -> &Vec<Self> { &c.clients }
    fn table_mut(c: &mut Collections) -> &mut Vec<Self> { &mut c.clients }

    fn build(id: EntityId, input: ClientInput, c: &Collections) -> Result<Self, StoreError> {
        check_location(c, &input.location)?;
        Ok(Client { id, profile: input })
    }
}

#[derive(Default)]
pub struct MarketStore {
    inner: RwLock<Collections>,
}

impl MarketStore {
    pub fn new() -> Self { Self::default() }

    pub async fn list<R: Record>(&self, q: &ListQuery) -> Page<R> {
        let c = self.inner.read().await;
        let items: Vec<R> = R::table(&c).iter().filter(|r| r.matches(q)).cloned().map(|r| r.resolve(&c)).collect();
        Page::paginate(items, q.page(), q.limit())
    }

    pub async fn get<R: Record>(&self, id: &EntityId) -> Result<R, StoreError> {
        let c = self.inner.read().await;
        find(R::table(&c), id)
            .cloned()
            .map(|r| r.resolve(&c))
            .ok_or_else(|| StoreError::NotFound(format!("{} '{id}' not found", R::RESOURCE)))
    }

    pub async fn create<R: Record>(&self, input: R::Input) -> Result<R, StoreError>
    where
        R::Input: Validate,
    {
        input.validate()?;
        let mut c = self.inner.write().await;
        let record = R::build(EntityId::random(), input, &c)?;
        R::table_mut(&mut c).push(record.clone());
        debug!(resource = R::RESOURCE, id = %record.id(), "record created");
        Ok(record)
    }

    pub async fn update<R: Record>(&self, id: &EntityId, input: R::Input) -> Result<R, StoreError>
    where
        R::Input: Validate,
    {
        input.validate()?;
        let mut c = self.inner.write().await;
        if find(R::table(&c), id).is_none() {
            return Err(StoreError::NotFound(format!("{} '{id}' not found", R::RESOURCE)));
        }
        let record = R::build(id.clone(), input, &c)?;
        if let Some(slot) = R::table_mut(&mut c).iter_mut().find(|r| r.id() == id) {
            *slot = record.clone();
        }
        Ok(record)
    }

    pub async fn delete<R: Record>(&self, id: &EntityId) -> Result<(), StoreError> {
        let mut c = self.inner.write().await;
        let table = R::table_mut(&mut c);
        let before = table.len();
        table.retain(|r| r.id() != id);
        if table.len() == before {
            return Err(StoreError::NotFound(format!("{} '{id}' not found", R::RESOURCE)));
        }
        debug!(resource = R::RESOURCE, %id, "record deleted");
        Ok(())
    }

    pub async fn put_file(&self, file: StoredFile) -> FileId {
        let id = FileId::random();
        self.inner.write().await.files.insert(id.clone(), file);
        id
    }

    pub async fn file(&self, id: &FileId) -> Option<StoredFile> { self.inner.read().await.files.get(id).cloned() }

    /// Record count per collection.
    pub async fn summary(&self) -> serde_json::Value {
        let c = self.inner.read().await;
        serde_json::json!({
            "countries": c.countries.len(),
            "regions": c.regions.len(),
            "districts": c.districts.len(),
            "categories": c.categories.len(),
            "services": c.services.len(),
            "masters": c.masters.len(),
            "clients": c.clients.len(),
            "files": c.files.len(),
        })
    }

    /// A small Uzbekistan geography plus a couple of service categories.
    pub async fn seed_demo(&self) -> Result<(), StoreError> {
        let uz = self
            .create::<Country>(CountryInput { name: LocalizedName::new("O'zbekiston", "Узбекистан", "Uzbekistan") })
            .await?;
        for (r_uz, r_ru, r_en, districts) in [
            (
                "Toshkent",
                "Ташкент",
                "Tashkent",
                [("Chilonzor", "Чиланзар", "Chilanzar"), ("Yunusobod", "Юнусабад", "Yunusabad")],
            ),
            (
                "Samarqand",
                "Самарканд",
                "Samarkand",
                [("Urgut", "Ургут", "Urgut"), ("Kattaqo'rg'on", "Каттакурган", "Kattakurgan")],
            ),
        ] {
            let region = self
                .create::<Region>(RegionInput { name: LocalizedName::new(r_uz, r_ru, r_en), country_id: uz.id.clone() })
                .await?;
            for (d_uz, d_ru, d_en) in districts {
                self.create::<District>(DistrictInput {
                    name: LocalizedName::new(d_uz, d_ru, d_en),
                    country_id: uz.id.clone(),
                    region_id: region.id.clone(),
                })
                .await?;
            }
        }
        let repair = self
            .create::<Category>(CategoryInput { name: LocalizedName::new("Ta'mirlash", "Ремонт", "Repair"), icon: None })
            .await?;
        let services = [("Santexnik", "Сантехник", "Plumbing"), ("Elektrik", "Электрик", "Electrical")];
        for (s_uz, s_ru, s_en) in services {
            self.create::<Service>(ServiceInput { name: LocalizedName::new(s_uz, s_ru, s_en), category_id: repair.id.clone() })
                .await?;
        }
        info!("demo data seeded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> LocalizedName { LocalizedName::new(s, s, s) }

    #[tokio::test]
    async fn region_requires_existing_country_and_gets_snapshot() {
        let store = MarketStore::new();
        let err = store
            .create::<Region>(RegionInput { name: name("R"), country_id: "nope".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Dangling(_)));

        let c = store.create::<Country>(CountryInput { name: name("C") }).await.unwrap();
        let r = store.create::<Region>(RegionInput { name: name("R"), country_id: c.id.clone() }).await.unwrap();
        assert_eq!(r.country.as_ref().map(|p| p.name.uz.as_str()), Some("C"));

        store.update::<Country>(&c.id, CountryInput { name: name("C2") }).await.unwrap();
        let r = store.get::<Region>(&r.id).await.unwrap();
        assert_eq!(r.country.unwrap().name.uz, "C2");
    }

    #[tokio::test]
    async fn district_region_must_belong_to_country() {
        let store = MarketStore::new();
        let a = store.create::<Country>(CountryInput { name: name("A") }).await.unwrap();
        let b = store.create::<Country>(CountryInput { name: name("B") }).await.unwrap();
        let r = store.create::<Region>(RegionInput { name: name("R"), country_id: a.id.clone() }).await.unwrap();
        let err = store
            .create::<District>(DistrictInput { name: name("D"), country_id: b.id, region_id: r.id })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let store = MarketStore::new();
        store.seed_demo().await.unwrap();
        let regions = store.list::<Region>(&ListQuery::default()).await;
        assert_eq!(regions.pagination.total_count, 2);

        let tashkent = regions.data[0].id.clone();
        let q = ListQuery { region_id: Some(tashkent), limit: Some(1), ..ListQuery::default() };
        let page = store.list::<District>(&q).await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.page_count, 2);
        assert_eq!(page.data[0].name.en, "Chilanzar");
    }

    #[tokio::test]
    async fn incomplete_name_and_unknown_id_are_rejected() {
        let store = MarketStore::new();
        let err = store
            .create::<Country>(CountryInput { name: LocalizedName::new("A", "", "") })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(matches!(store.delete::<Country>(&"x".into()).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.get::<Client>(&"x".into()).await, Err(StoreError::NotFound(_))));
    }
}
