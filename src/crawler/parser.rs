//! HTML parser for catalog listing pages
//!
//! Every catalog page has the same shape: a body region holding one or more
//! `<ul>` lists, each `<li>` naming a code (the link text), linking to the
//! next level down and describing the code in its remaining text.

use crate::catalog::Entry;
use crate::ExtractionError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

const LINK_SELECTOR: &str = "a[href]";

/// Leading code or code range: "A00-A09 ", "B15 ", "A00-A09: "
fn code_prefix() -> &'static Regex {
    static CODE_PREFIX: OnceLock<Regex> = OnceLock::new();
    CODE_PREFIX.get_or_init(|| {
        Regex::new(r"^(?:\s*(?:[A-Za-z]\d{1,2}-?){1,2}\s*:?\s*)+")
            .expect("code prefix pattern is valid")
    })
}

/// Removes leading code ranges and surrounding whitespace from item text
///
/// Stripping is idempotent: the pattern consumes every consecutive prefix,
/// so a second pass finds nothing left to remove.
///
/// Known limitation: codes with a letter in the third position (`Z3A`,
/// `C4A`, `D3A`, `M1A`) only match up to the digits, so
/// `"Z3A Weeks of gestation"` becomes `"A Weeks of gestation"`.
pub fn strip_code_prefix(text: &str) -> String {
    code_prefix().replace(text, "").trim().to_string()
}

/// Compiled selectors for one kind of listing page
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    body: Selector,
    list: Selector,
    link: Selector,
    body_source: String,
    list_source: String,
}

impl ListingSelectors {
    /// Builds selectors for a page
    ///
    /// # Arguments
    ///
    /// * `body` - Selector of the body content region (`div.body-content`)
    /// * `list` - Selector of the listing container (`ul`)
    /// * `list_class` - Optional class that disambiguates between several
    ///   lists in the body region; omitted for the root page
    pub fn new(body: &str, list: &str, list_class: Option<&str>) -> Result<Self, ExtractionError> {
        let list_source = match list_class {
            Some(class) => format!("{}.{}", list, class),
            None => list.to_string(),
        };

        Ok(Self {
            body: parse_selector(body)?,
            list: parse_selector(&list_source)?,
            link: parse_selector(LINK_SELECTOR)?,
            body_source: body.to_string(),
            list_source,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(selector).map_err(|e| ExtractionError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Parses a listing page into its entries, in document order
///
/// The first body region is located, then the first matching list inside
/// it; each direct `<li>` child of that list becomes one entry.
///
/// # Arguments
///
/// * `html` - The raw page content
/// * `selectors` - Selectors for this page's level
/// * `page_url` - Where the page came from, for error messages
///
/// # Returns
///
/// * `Ok(Vec<Entry>)` - One entry per list item
/// * `Err(ExtractionError)` - The page does not have the expected shape
///
/// # Example
///
/// ```
/// use icd_harvest::crawler::{extract_entries, ListingSelectors};
///
/// let html = r#"<div class="body-content"><ul>
///     <li><a href="/A00-B99">A00-B99</a> Certain infectious diseases</li>
/// </ul></div>"#;
/// let selectors = ListingSelectors::new("div.body-content", "ul", None).unwrap();
/// let entries = extract_entries(html, &selectors, "https://example.com/").unwrap();
/// assert_eq!(entries[0].name, "A00-B99");
/// assert_eq!(entries[0].description, "Certain infectious diseases");
/// ```
pub fn extract_entries(
    html: &str,
    selectors: &ListingSelectors,
    page_url: &str,
) -> Result<Vec<Entry>, ExtractionError> {
    let document = Html::parse_document(html);

    let body = document
        .select(&selectors.body)
        .next()
        .ok_or_else(|| ExtractionError::MissingElement {
            selector: selectors.body_source.clone(),
            url: page_url.to_string(),
        })?;

    let list = body
        .select(&selectors.list)
        .next()
        .ok_or_else(|| ExtractionError::MissingElement {
            selector: selectors.list_source.clone(),
            url: page_url.to_string(),
        })?;

    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "li")
        .map(|item| extract_entry(item, &selectors.link, page_url))
        .collect()
}

/// Reads one list item
///
/// The first link supplies name and target; the whole item text, minus its
/// leading code, is the description. An item without a link is a page
/// shape this crawler does not understand.
fn extract_entry(
    item: ElementRef<'_>,
    link_selector: &Selector,
    page_url: &str,
) -> Result<Entry, ExtractionError> {
    let link = item
        .select(link_selector)
        .next()
        .ok_or_else(|| ExtractionError::MissingElement {
            selector: LINK_SELECTOR.to_string(),
            url: page_url.to_string(),
        })?;

    let name = link.text().collect::<String>().trim().to_string();
    let url = link
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);
    let description = strip_code_prefix(&item.text().collect::<String>());

    Ok(Entry::new(name, url, description))
}
