use crate::record::{HopRecord, Location};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Dotted-quad IPv4 or fully-expanded colon-hex IPv6. Octet ranges are not
/// validated and abbreviated ("::") IPv6 forms do not match; both are
/// intentional scope limits of the pattern.
const IP_PATTERN: &str =
    r"(\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b)|(\b(?:[a-fA-F0-9]{1,4}:){7}[a-fA-F0-9]{1,4}\b)";

static IP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IP_PATTERN).expect("valid IP pattern"));

/// Scan free text for IP address tokens, in order of appearance. Duplicate
/// tokens are kept.
pub fn scan_addresses(text: &str) -> Vec<String> {
    IP_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract hop records from the hop table of an HTML document.
///
/// Rows of the element with id "table" are walked in document order. Cell 0
/// carries the hostname label, cells 1 and 2 free text that may contain IP
/// tokens; matches from cell 1 come before matches from cell 2. Rows with
/// fewer than three cells are skipped, rows with no matches contribute
/// nothing.
pub fn extract_hops(html: &str) -> Vec<HopRecord> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("#table tr").unwrap();
    let cell_selector = Selector::parse("td, th").unwrap();

    let mut records = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();

        if cells.len() < 3 {
            debug!("Skipping hop row with {} cell(s)", cells.len());
            continue;
        }

        let hostname = cells[0].clone();

        let mut addresses = scan_addresses(&cells[1]);
        addresses.extend(scan_addresses(&cells[2]));

        for address in addresses {
            // Defensive; the match step cannot produce an empty token.
            if address.is_empty() {
                continue;
            }
            records.push(HopRecord::new(hostname.clone(), address));
        }
    }

    records
}

/// Read the pre-resolved location list embedded in an HTML document.
///
/// The element with id "map" carries a JSON array in its `data-locations`
/// attribute. A missing element, a missing attribute or a malformed payload
/// all degrade to "no locations".
pub fn extract_embedded_locations(html: &str) -> Vec<Location> {
    let document = Html::parse_document(html);
    let map_selector = Selector::parse("#map").unwrap();

    let Some(element) = document.select(&map_selector).next() else {
        debug!("Document has no map element");
        return Vec::new();
    };

    let Some(payload) = element.value().attr("data-locations") else {
        debug!("Map element carries no data-locations attribute");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Location>>(payload) {
        Ok(locations) => locations,
        Err(e) => {
            warn!("Malformed data-locations payload, treating as empty: {}", e);
            Vec::new()
        }
    }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
