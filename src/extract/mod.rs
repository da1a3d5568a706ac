//! Product-tile field extraction.
//!
//! Runs over the serialized page content (one `Html::parse_document` per
//! page, no per-field CDP round trips). The target's markup is unstable,
//! so every field goes through an ordered cascade of independent lookup
//! rules; the first rule yielding a non-empty value wins and a full miss
//! resolves to `None`. `extract_tile` never fails.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::ProductRecord;

static BRAND_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#".product-tile__brand p, [data-test="product-tile__brandname"] p"#).unwrap()
});
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#".product-tile__title p, [data-test="product-tile__name"] p"#).unwrap()
});
static PARAGRAPH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static TILE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.product-tile__link").unwrap());
static DISCOUNTED_PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ins.base-price__discounted, ins").unwrap());
static REGULAR_PRICE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".base-price__regular span, .product-tile__price span:not(.sr-only)").unwrap()
});
static ORIGINAL_PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("del, .base-price__was-price del").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Locale-formatted currency text as the target renders it, e.g. "2,49 €"
/// or "1.299,00 €".
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d{3})*,\d{2}\s*€").unwrap());

/// Extract every retainable product record from a page.
///
/// The retention rule lives here, not in `extract_tile`: tiles without a
/// usable title or price are layout artifacts and are dropped.
pub fn extract_products(html: &str, base: &Url, tile_selector: &Selector) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    document
        .select(tile_selector)
        .map(|tile| extract_tile(tile, base))
        .filter(ProductRecord::is_retainable)
        .collect()
}

/// Extract a best-effort record from one product tile. Missing fields
/// become `None`; this never fails.
pub fn extract_tile(tile: ElementRef<'_>, base: &Url) -> ProductRecord {
    let (brand, title) = extract_brand_and_title(&tile);
    ProductRecord {
        brand,
        title,
        price: extract_price(&tile),
        original_price: select_text(&tile, &ORIGINAL_PRICE_SEL),
        image_url: extract_image_url(&tile, base),
        link: extract_link(&tile, base),
    }
}

/// Brand/title cascade: labeled nodes, then the tile's first two generic
/// paragraphs, then (title only) the link's accessible label.
fn extract_brand_and_title(tile: &ElementRef<'_>) -> (Option<String>, Option<String>) {
    let mut brand = select_text(tile, &BRAND_SEL);
    let mut title = select_text(tile, &TITLE_SEL);

    if brand.is_none() && title.is_none() {
        let mut paragraphs = tile.select(&PARAGRAPH_SEL);
        brand = paragraphs.next().map(element_text).filter(|s| !s.is_empty());
        title = paragraphs.next().map(element_text).filter(|s| !s.is_empty());
    }

    if title.is_none() {
        title = tile
            .select(&TILE_LINK_SEL)
            .next()
            .and_then(|link| link.attr("aria-label"))
            .map(|label| label.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    (brand, title)
}

/// Price cascade: discounted `ins` node, then the regular price span, then
/// a currency-pattern match over the tile's full visible text.
fn extract_price(tile: &ElementRef<'_>) -> Option<String> {
    select_text(tile, &DISCOUNTED_PRICE_SEL)
        .or_else(|| select_text(tile, &REGULAR_PRICE_SEL))
        .or_else(|| {
            PRICE_RE
                .find(&element_text(*tile))
                .map(|m| m.as_str().to_string())
        })
}

/// Image cascade: the `src` attribute, falling back to the lazy-load
/// attributes when `src` is absent or an inline `data:` placeholder.
/// Relative URLs resolve against the page URL.
fn extract_image_url(tile: &ElementRef<'_>, base: &Url) -> Option<String> {
    let img = tile.select(&IMG_SEL).next()?;

    let src = img
        .attr("src")
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with("data:"));

    let candidate = src
        .or_else(|| {
            img.attr("data-src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .or_else(|| {
            // Responsive candidate list: take the first URL token.
            img.attr("data-srcset")
                .and_then(|srcset| srcset.split_whitespace().next())
        })?;

    resolve_url(candidate, base)
}

fn extract_link(tile: &ElementRef<'_>, base: &Url) -> Option<String> {
    let href = tile.select(&ANCHOR_SEL).next()?.attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    resolve_url(href, base)
}

/// Resolve a possibly-relative URL against the page URL. Unresolvable
/// values are dropped rather than kept broken.
fn resolve_url(raw: &str, base: &Url) -> Option<String> {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    base.join(raw).ok().map(|u| u.to_string())
}

/// Visible text of an element, whitespace-normalized.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text match for a selector within the tile.
fn select_text(tile: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    tile.select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}
