use std::fmt;
use std::str::FromStr;

use models::catalog::{Category, Service};
use models::geo::{Country, District, Region};
use models::people::{Client, Master};
use models::Entity;

use crate::table::{Align, Column, Table};

/// The seven resources managed by the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Countries,
    Regions,
    Districts,
    Categories,
    Services,
    Masters,
    Clients,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::Countries,
        Resource::Regions,
        Resource::Districts,
        Resource::Categories,
        Resource::Services,
        Resource::Masters,
        Resource::Clients,
    ];

    /// Route and API collection segment.
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Countries => "countries",
            Resource::Regions => "regions",
            Resource::Districts => "districts",
            Resource::Categories => "categories",
            Resource::Services => "services",
            Resource::Masters => "masters",
            Resource::Clients => "clients",
        }
    }

    pub fn api_path(self) -> String { format!("/{}", self.segment()) }

    /// Singular label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Resource::Countries => "country",
            Resource::Regions => "region",
            Resource::Districts => "district",
            Resource::Categories => "category",
            Resource::Services => "service",
            Resource::Masters => "master",
            Resource::Clients => "client",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Resource::Countries => "Countries",
            Resource::Regions => "Regions",
            Resource::Districts => "Districts",
            Resource::Categories => "Categories",
            Resource::Services => "Services",
            Resource::Masters => "Masters",
            Resource::Clients => "Clients",
        }
    }

    /// Query parameter that narrows this collection to one parent.
    pub fn parent_filter(self) -> Option<&'static str> {
        match self {
            Resource::Regions => Some("countryId"),
            Resource::Districts => Some("regionId"),
            Resource::Services => Some("categoryId"),
            _ => None,
        }
    }

    pub fn columns(self) -> Vec<Column> {
        let mut cols = Vec::new();
        match self {
            Resource::Masters | Resource::Clients => {
                cols.push(Column::new("Photo", "profilePhoto").align(Align::Center));
                cols.push(Column::new("First name", "firstName"));
                cols.push(Column::new("Last name", "lastName"));
                cols.push(Column::new("Phone", "phone"));
                cols.push(Column::new("Turon ID", "turonId").align(Align::Right));
                return cols;
            }
            _ => {
                cols.push(Column::new("Name (UZ)", "name.uz"));
                cols.push(Column::new("Name (RU)", "name.ru"));
                cols.push(Column::new("Name (EN)", "name.en"));
            }
        }
        match self {
            Resource::Regions => cols.push(Column::new("Country", "country.name.uz")),
            Resource::Districts => {
                cols.push(Column::new("Country", "country.name.uz"));
                cols.push(Column::new("Region", "region.name.uz"));
            }
            Resource::Categories => cols.push(Column::new("Icon", "icon").align(Align::Center)),
            Resource::Services => cols.push(Column::new("Category", "category.name.uz")),
            _ => {}
        }
        cols
    }

    pub fn table(self) -> Table {
        Table::new(self.columns()).empty_message(format!("No {} found.", self.title().to_lowercase()))
    }

    pub fn of<E: Managed>() -> Resource { E::KIND }
}

/// An entity type with a console screen of its own.
pub trait Managed: Entity {
    const KIND: Resource;
}

macro_rules! managed {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Managed for $ty {
            const KIND: Resource = Resource::$kind;
        })*
    };
}

managed! {
    Country => Countries,
    Region => Regions,
    District => Districts,
    Category => Categories,
    Service => Services,
    Master => Masters,
    Client => Clients,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.segment()) }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_matches('/');
        Resource::ALL
            .into_iter()
            .find(|r| r.segment().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown resource '{s}'"))
    }
}
