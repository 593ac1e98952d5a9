//! Report filter parameters and the catalog of available filter values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, AuthorIndex, EditorialEvent};

/// Optional narrowing applied to a report request. The person filter switches
/// every builder to the scoped path; section and country narrow within it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportFilters {
    pub person: Option<String>,
    pub section: Option<String>,
    pub country: Option<String>,
}

impl ReportFilters {
    pub fn person(&self) -> Option<&str> {
        self.person.as_deref()
    }

    /// Section predicate for an editorial event.
    pub fn event_section_matches(&self, event: &EditorialEvent) -> bool {
        match self.section.as_deref() {
            Some(wanted) => event.section() == Some(wanted),
            None => true,
        }
    }

    /// Section predicate for a traffic record's denormalized section.
    pub fn traffic_section_matches(&self, section: Option<&str>) -> bool {
        match self.section.as_deref() {
            Some(wanted) => section == Some(wanted),
            None => true,
        }
    }

    /// Country predicate, resolved through the author directory.
    pub fn country_matches(&self, email: Option<&str>, authors: &AuthorIndex) -> bool {
        match self.country.as_deref() {
            Some(wanted) => email.is_some_and(|email| authors.country_matches(email, wanted)),
            None => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonOption {
    pub email: String,
    pub display_name: String,
    pub country: Option<String>,
}

/// Distinct people, sections, and countries with activity in the window,
/// offered to the caller as filter choices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCatalog {
    pub people: Vec<PersonOption>,
    pub sections: Vec<String>,
    pub countries: Vec<String>,
}

pub fn catalog(window_events: &[EditorialEvent], authors: &AuthorIndex) -> FilterCatalog {
    // Keyed by display name so the dropdown sorts by what people read.
    let mut people: BTreeMap<String, PersonOption> = BTreeMap::new();
    let mut sections: BTreeMap<String, ()> = BTreeMap::new();
    let mut countries: BTreeMap<String, ()> = BTreeMap::new();

    for event in window_events {
        if event.action_type == ActionType::FirstPublish {
            if let Some(section) = event.section() {
                sections.entry(section.to_string()).or_insert(());
            }
        }
        if !matches!(event.action_type, ActionType::Create | ActionType::FirstPublish) {
            continue;
        }
        let Some(email) = event.editor() else {
            continue;
        };
        let display_name = authors.display_name(email);
        let country = authors.country(email).map(str::to_string);
        if let Some(country) = &country {
            if !country.trim().is_empty() {
                countries.entry(country.clone()).or_insert(());
            }
        }
        people.entry(display_name.clone()).or_insert(PersonOption {
            email: email.to_string(),
            display_name,
            country,
        });
    }

    FilterCatalog {
        people: people.into_values().collect(),
        sections: sections.into_keys().collect(),
        countries: countries.into_keys().collect(),
    }
}
