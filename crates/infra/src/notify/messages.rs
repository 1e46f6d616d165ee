//! Localized waitlist email texts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use storefront_core::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "lt-LT")]
    LtLt,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::LtLt => "lt-LT",
        }
    }

    /// Parse a language tag. Only the primary subtag matters: `lt`, `lt_LT`
    /// and `LT-lt` are all Lithuanian; `en-GB` is English.
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::EnUs),
            "lt" => Some(Locale::LtLt),
            _ => None,
        }
    }

    /// Like [`Locale::parse`] but unknown tags fall back to `en-US`.
    pub fn parse_or_default(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            DomainError::invalid_field("Invalid locale", "locale", format!("unsupported locale '{s}'"))
        })
    }
}

struct WaitlistTexts {
    subject: &'static str,
    greeting: &'static str,
    // `{product}` is replaced with the product name.
    back_in_stock: &'static str,
    // `{url}` is replaced with the product page link.
    purchase_link: &'static str,
    regards: &'static str,
    team: &'static str,
}

const EN_US: WaitlistTexts = WaitlistTexts {
    subject: "Product back in stock!",
    greeting: "Hello!",
    back_in_stock: "The product \"{product}\" is back in stock!",
    purchase_link: "You can purchase it here: {url}",
    regards: "Best regards,",
    team: "Baltaragis team",
};

const LT_LT: WaitlistTexts = WaitlistTexts {
    subject: "Prekė vėl prekyboje!",
    greeting: "Sveiki!",
    back_in_stock: "Prekė \"{product}\" vėl prekyboje!",
    purchase_link: "Ją galite įsigyti čia: {url}",
    regards: "Pagarbiai,",
    team: "Baltaragio komanda",
};

fn texts(locale: Locale) -> &'static WaitlistTexts {
    match locale {
        Locale::EnUs => &EN_US,
        Locale::LtLt => &LT_LT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// Renders customer-facing messages with product links on `base_url`.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    base_url: String,
}

impl MessageCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn product_url(&self, slug: &str) -> String {
        format!("{}/products/{}", self.base_url, slug)
    }

    pub fn back_in_stock(&self, locale: Locale, product_name: &str, slug: &str) -> RenderedMessage {
        let t = texts(locale);
        let body = format!(
            "{}\n\n{}\n\n{}\n\n{}\n{}",
            t.greeting,
            t.back_in_stock.replace("{product}", product_name),
            t.purchase_link.replace("{url}", &self.product_url(slug)),
            t.regards,
            t.team,
        );
        RenderedMessage {
            subject: t.subject.to_string(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_tags() {
        assert_eq!(Locale::parse("en-US"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("en-gb"), Some(Locale::EnUs));
        assert_eq!(Locale::parse("lt"), Some(Locale::LtLt));
        assert_eq!(Locale::parse("lt_LT"), Some(Locale::LtLt));
        assert_eq!(Locale::parse("de-DE"), None);
        assert_eq!(Locale::parse_or_default("fr"), Locale::EnUs);
        assert!("xx".parse::<Locale>().is_err());
    }

    #[test]
    fn english_message_layout() {
        let catalog = MessageCatalog::new("https://shop.example/");
        let msg = catalog.back_in_stock(Locale::EnUs, "Forest Sketch", "forest-sketch");

        assert_eq!(msg.subject, "Product back in stock!");
        assert_eq!(
            msg.body,
            "Hello!\n\n\
             The product \"Forest Sketch\" is back in stock!\n\n\
             You can purchase it here: https://shop.example/products/forest-sketch\n\n\
             Best regards,\n\
             Baltaragis team"
        );
    }

    #[test]
    fn lithuanian_message_links_the_same_page() {
        let catalog = MessageCatalog::new("http://localhost:8080");
        let msg = catalog.back_in_stock(Locale::LtLt, "Miško eskizas", "forest-sketch");
        assert!(msg.body.starts_with("Sveiki!"));
        assert!(msg.body.contains("\"Miško eskizas\""));
        assert!(msg.body.contains("http://localhost:8080/products/forest-sketch"));
    }
}
