use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Display locales carried by every named entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locale {
    Uz,
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Uz, Locale::Ru, Locale::En];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Uz => "uz",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

/// Multi-locale display name `{ uz, ru, en }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    #[serde(default)]
    pub uz: String,
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedName {
    pub fn new(uz: impl Into<String>, ru: impl Into<String>, en: impl Into<String>) -> Self {
        Self { uz: uz.into(), ru: ru.into(), en: en.into() }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Uz => &self.uz,
            Locale::Ru => &self.ru,
            Locale::En => &self.en,
        }
    }

    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        let slot = match locale {
            Locale::Uz => &mut self.uz,
            Locale::Ru => &mut self.ru,
            Locale::En => &mut self.en,
        };
        *slot = value.into();
    }

    pub fn is_complete(&self) -> bool {
        Locale::ALL.iter().all(|l| !self.get(*l).trim().is_empty())
    }

    /// Every locale must be filled in.
    pub fn validate(&self) -> Result<(), ModelError> {
        let missing: Vec<&str> = Locale::ALL
            .iter()
            .filter(|l| self.get(**l).trim().is_empty())
            .map(|l| l.code())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Validation(format!("name is missing locales: {}", missing.join(", "))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_lists_missing_locales() {
        let name = LocalizedName::new("Toshkent", "", " ");
        let err = name.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: name is missing locales: ru, en");
        assert!(!name.is_complete());
    }

    #[test]
    fn set_and_get_roundtrip_by_locale() {
        let mut name = LocalizedName::default();
        name.set(Locale::Ru, "Ташкент");
        assert_eq!(name.get(Locale::Ru), "Ташкент");
        assert_eq!(name.get(Locale::Uz), "");
    }

    #[test]
    fn missing_locales_deserialize_as_empty() {
        let name: LocalizedName = serde_json::from_str(r#"{"uz":"A"}"#).unwrap();
        assert_eq!(name, LocalizedName::new("A", "", ""));
    }
}
