use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel identity under which wire-agency copy enters the log. Matched
/// case-insensitively and relabeled in person-facing output.
pub const AGENCY_ACCOUNT: &str = "newswire";

pub const AGENCY_DISPLAY_NAME: &str = "Newswire (agency)";

pub fn is_agency_account(email: &str) -> bool {
    email.eq_ignore_ascii_case(AGENCY_ACCOUNT)
}

/// Reference row from the author directory. Absence of a row is valid; the
/// raw email stands in for the display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub email: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
}

/// Case-insensitive email lookup over the author directory.
#[derive(Clone, Debug, Default)]
pub struct AuthorIndex {
    by_email: HashMap<String, Author>,
}

impl AuthorIndex {
    pub fn new(authors: Vec<Author>) -> Self {
        let by_email =
            authors.into_iter().map(|author| (author.email.to_lowercase(), author)).collect();
        Self { by_email }
    }

    pub fn lookup(&self, email: &str) -> Option<&Author> {
        self.by_email.get(&email.to_lowercase())
    }

    /// Display name with the raw-email fallback.
    pub fn display_name(&self, email: &str) -> String {
        self.lookup(email)
            .and_then(|author| author.display_name.clone())
            .unwrap_or_else(|| email.to_string())
    }

    /// Display name with the agency relabel applied first.
    pub fn display_label(&self, email: &str) -> String {
        if is_agency_account(email) {
            return AGENCY_DISPLAY_NAME.to_string();
        }
        self.display_name(email)
    }

    pub fn country(&self, email: &str) -> Option<&str> {
        self.lookup(email).and_then(|author| author.country.as_deref())
    }

    /// Case-insensitive country match used by the country filter.
    pub fn country_matches(&self, email: &str, country: &str) -> bool {
        self.country(email).is_some_and(|c| c.eq_ignore_ascii_case(country))
    }
}

#[cfg(test)]
mod tests {
    use super::{is_agency_account, Author, AuthorIndex, AGENCY_DISPLAY_NAME};

    fn index() -> AuthorIndex {
        AuthorIndex::new(vec![Author {
            email: "Alice@Example.com".to_string(),
            display_name: Some("Alice Anders".to_string()),
            country: Some("Argentina".to_string()),
        }])
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let index = index();
        assert_eq!(index.display_name("alice@example.com"), "Alice Anders");
        assert!(index.country_matches("ALICE@EXAMPLE.COM", "argentina"));
    }

    #[test]
    fn missing_author_falls_back_to_raw_email() {
        let index = index();
        assert_eq!(index.display_name("bob@example.com"), "bob@example.com");
        assert_eq!(index.country("bob@example.com"), None);
    }

    #[test]
    fn agency_account_is_relabeled() {
        let index = index();
        assert!(is_agency_account("NewsWire"));
        assert_eq!(index.display_label("newswire"), AGENCY_DISPLAY_NAME);
        assert_eq!(index.display_label("alice@example.com"), "Alice Anders");
    }
}
