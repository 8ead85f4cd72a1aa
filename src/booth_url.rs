use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shop and item identifiers recovered from a Booth product URL.
///
/// `shop_id` is only recoverable from the shop-subdomain form, so
/// `BoothIds { shop_id: None, item_id: Some(..) }` is a successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothIds {
    pub shop_id: Option<String>,
    pub item_id: Option<String>,
}

impl BoothIds {
    fn item(item_id: &str) -> Self {
        Self { shop_id: None, item_id: Some(item_id.to_string()) }
    }

    pub fn is_empty(&self) -> bool {
        self.shop_id.is_none() && self.item_id.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlRule {
    /// Numeric-only cell: the value is the item id itself.
    BareDigits,
    /// `https://{shop}.booth.pm/items/{id}`
    ShopSubdomain,
    /// `https://booth.pm/{lang}/items/{id}`
    LanguagePrefixed,
    /// `https://booth.pm/items/{id}`
    Bare,
    /// `/items/{id}` anywhere in the string
    ItemPathSearch,
}

static RE_BARE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

static RE_SHOP_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://([^.]+)\.booth\.pm/items/([0-9]+)").unwrap()
});

static RE_LANGUAGE_PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://booth\.pm/[^/]+/items/([0-9]+)").unwrap()
});

static RE_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://booth\.pm/items/([0-9]+)").unwrap()
});

static RE_ITEM_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/items/([0-9]+)").unwrap());

pub type Matcher = fn(&str) -> Option<BoothIds>;

/// Evaluated in order; the first rule that matches wins.
pub const RULES: [(UrlRule, Matcher); 5] = [
    (UrlRule::BareDigits, match_bare_digits),
    (UrlRule::ShopSubdomain, match_shop_subdomain),
    (UrlRule::LanguagePrefixed, match_language_prefixed),
    (UrlRule::Bare, match_bare),
    (UrlRule::ItemPathSearch, match_item_path),
];

fn match_bare_digits(s: &str) -> Option<BoothIds> {
    RE_BARE_DIGITS.is_match(s).then(|| BoothIds::item(s))
}

fn match_shop_subdomain(s: &str) -> Option<BoothIds> {
    let caps = RE_SHOP_SUBDOMAIN.captures(s)?;
    Some(BoothIds {
        shop_id: Some(caps[1].to_string()),
        item_id: Some(caps[2].to_string()),
    })
}

fn match_language_prefixed(s: &str) -> Option<BoothIds> {
    RE_LANGUAGE_PREFIXED.captures(s).map(|c| BoothIds::item(&c[1]))
}

fn match_bare(s: &str) -> Option<BoothIds> {
    RE_BARE.captures(s).map(|c| BoothIds::item(&c[1]))
}

fn match_item_path(s: &str) -> Option<BoothIds> {
    RE_ITEM_PATH.captures(s).map(|c| BoothIds::item(&c[1]))
}

/// Parse a Booth product URL (or a bare item id) into its identifiers.
///
/// Never fails: unparsable input yields empty identifiers and a warning.
pub fn extract(url: &str) -> BoothIds {
    extract_with_rule(url).0
}

/// Like [`extract`], also reporting which rule produced the result.
pub fn extract_with_rule(url: &str) -> (BoothIds, Option<UrlRule>) {
    let s = url.trim();
    if s.is_empty() {
        return (BoothIds::default(), None);
    }
    for (rule, matcher) in RULES.iter() {
        if let Some(ids) = matcher(s) {
            return (ids, Some(*rule));
        }
    }
    tracing::warn!(url = s, "could not parse Booth URL");
    (BoothIds::default(), None)
}
