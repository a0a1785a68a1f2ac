use super::{lenient, lenient_vec};
use crate::utils::parse_web_url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Team names as shown on screen
const ROLE_DISPLAY: &[(&str, &str)] = &[("ios", "iOS"), ("android", "Android")];

/// Team names as read aloud, applied in order
const ROLE_VOCALIZATIONS: &[(&str, &str)] = &[
    ("ios", "application iOS"),
    ("android", "application Androïd"),
    ("scrap", "analyse et traitement des données"),
    ("infra", "infrastructure"),
    ("web", "application web"),
];

/// Contributor list (`credits.json`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub contributors: Vec<Credit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreditLink {
    #[serde(default, deserialize_with = "lenient")]
    pub site: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// One contributor of the project
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credit {
    #[serde(default, deserialize_with = "lenient")]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pseudo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub photo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub site_web: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub links: Vec<CreditLink>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub teams: Vec<String>,
}

impl Credit {
    /// Real name, falling back to the pseudonym
    pub fn shown_name(&self) -> &str {
        self.nom
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.pseudo.as_deref())
            .unwrap_or_default()
    }

    /// Teams joined for display, e.g. `iOS, scrap`
    pub fn shown_role(&self) -> String {
        self.teams
            .iter()
            .map(|team| replace_all(team, ROLE_DISPLAY))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn role_vocalization(&self) -> String {
        self.teams
            .iter()
            .map(|team| replace_all(team, ROLE_VOCALIZATIONS))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Personal site, else the first usable link
    pub fn link(&self) -> Option<Url> {
        self.site_web
            .as_deref()
            .and_then(parse_web_url)
            .or_else(|| {
                self.links
                    .first()
                    .and_then(|link| link.url.as_deref())
                    .and_then(parse_web_url)
            })
    }
}

fn replace_all(text: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// One entry per pseudonym (first occurrence kept), sorted by shown name
pub fn unique_credits(credits: Vec<Credit>) -> Vec<Credit> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Credit> = credits
        .into_iter()
        .filter(|credit| seen.insert(credit.pseudo.clone()))
        .collect();
    unique.sort_by(|a, b| a.shown_name().cmp(b.shown_name()));
    unique
}

/// Display-ready contributor
#[derive(Debug, Clone, Serialize)]
pub struct CreditView {
    pub name: String,
    pub role: String,
    pub role_vocalization: String,
    pub link: Option<String>,
    pub photo: Option<String>,
}

impl From<&Credit> for CreditView {
    fn from(credit: &Credit) -> Self {
        Self {
            name: credit.shown_name().to_string(),
            role: credit.shown_role(),
            role_vocalization: credit.role_vocalization(),
            link: credit.link().map(String::from),
            photo: credit.photo.clone(),
        }
    }
}
