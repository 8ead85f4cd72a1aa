use demandscope::booth_url::{extract, extract_with_rule, BoothIds, UrlRule};

fn ids(shop: Option<&str>, item: Option<&str>) -> BoothIds {
    BoothIds { shop_id: shop.map(str::to_string), item_id: item.map(str::to_string) }
}

#[test]
fn shop_subdomain_url_yields_shop_and_item() {
    assert_eq!(extract("https://shop123.booth.pm/items/456"), ids(Some("shop123"), Some("456")));
    let (_, rule) = extract_with_rule("https://shop123.booth.pm/items/456");
    assert_eq!(rule, Some(UrlRule::ShopSubdomain));
}

#[test]
fn language_prefixed_url_has_no_shop() {
    assert_eq!(extract("https://booth.pm/ja/items/456"), ids(None, Some("456")));
    let (_, rule) = extract_with_rule("https://booth.pm/en/items/456");
    assert_eq!(rule, Some(UrlRule::LanguagePrefixed));
}

#[test]
fn bare_booth_url_has_no_shop() {
    let (got, rule) = extract_with_rule("https://booth.pm/items/789");
    assert_eq!(got, ids(None, Some("789")));
    assert_eq!(rule, Some(UrlRule::Bare));
}

#[test]
fn bare_digits_are_an_item_id() {
    assert_eq!(extract("456"), ids(None, Some("456")));
    assert_eq!(extract(" 456 "), ids(None, Some("456")));
    let (_, rule) = extract_with_rule("456");
    assert_eq!(rule, Some(UrlRule::BareDigits));
}

#[test]
fn query_string_and_whitespace_are_tolerated() {
    assert_eq!(
        extract("  https://acme.booth.pm/items/1234?utm_source=x  "),
        ids(Some("acme"), Some("1234"))
    );
    assert_eq!(extract("https://booth.pm/ja/items/42#top"), ids(None, Some("42")));
}

#[test]
fn falls_back_to_item_path_search() {
    let (got, rule) = extract_with_rule("http://booth.pm/ja/items/555");
    assert_eq!(got, ids(None, Some("555")));
    assert_eq!(rule, Some(UrlRule::ItemPathSearch));
}

#[test]
fn unrelated_text_yields_nothing() {
    assert_eq!(extract("not a url at all"), BoothIds::default());
    assert_eq!(extract("https://example.com/products/12"), BoothIds::default());
    assert_eq!(extract(""), BoothIds::default());
    assert!(extract("https://booth.pm/items/abc").is_empty());
}
