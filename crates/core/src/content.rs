//! Payload shapes for the well-known content blocks.
//!
//! Content blocks are stored as opaque JSON keyed by name, so the server
//! never requires these shapes. They describe what the admin sub-forms write
//! and what the marketing pages read, and the CLI seeds defaults from them.

use serde::{Deserialize, Serialize};

/// Keys of the content blocks the marketing site renders.
pub mod keys {
    pub const HERO: &str = "hero";
    pub const ABOUT: &str = "about";
    pub const CONTACT: &str = "contact";
    pub const FOOTER: &str = "footer";
    pub const FRANCHISE: &str = "franchise";
}

/// Landing-page banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub background_image: String,
    pub cta_text: String,
    pub cta_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

/// Brand story section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutContent {
    pub title: String,
    pub description: String,
    pub image: String,
    pub quote: String,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactContent {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub business_hours: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterContent {
    pub description: String,
    pub instagram: String,
    pub facebook: String,
    pub copyright: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benefit {
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// One step of the franchise application process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FranchiseStep {
    /// Display label such as `"01"`.
    pub step: String,
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentItem {
    pub label: String,
    pub value: String,
}

/// Franchise landing page copy. Plans themselves live in their own table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FranchiseContent {
    pub title: String,
    pub description: String,
    pub benefits: Vec<Benefit>,
    pub steps: Vec<FranchiseStep>,
    pub conditions: Vec<String>,
    pub investment: Vec<InvestmentItem>,
    pub cta_title: String,
    pub cta_description: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_uses_camel_case_keys() {
        let hero = HeroContent {
            background_image: "/hero.jpg".to_owned(),
            cta_text: "Menu".to_owned(),
            ..HeroContent::default()
        };
        let value = serde_json::to_value(&hero).unwrap();
        assert_eq!(value["backgroundImage"], "/hero.jpg");
        assert_eq!(value["ctaText"], "Menu");
    }

    #[test]
    fn test_partial_payload_fills_defaults() {
        let franchise: FranchiseContent =
            serde_json::from_str(r#"{"title":"加盟","conditions":["熱忱"]}"#).unwrap();
        assert_eq!(franchise.title, "加盟");
        assert_eq!(franchise.conditions, vec!["熱忱".to_owned()]);
        assert!(franchise.steps.is_empty());
        assert!(franchise.cta_title.is_empty());
    }
}
