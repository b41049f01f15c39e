use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::{OutageTable, normalize_region};

static CONTAINER_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.table-responsive").expect("invalid selector: container")
});
static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("invalid selector: table"));
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: row"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("invalid selector: cell"));

/// Zero-based position of the only cell read from each row.
const TEXT_COLUMN: usize = 2;

/// Per-table extraction state. Each table opens with a region header row
/// followed by its description rows.
#[derive(Debug, PartialEq, Eq)]
enum TableState {
    AwaitingHeader,
    CollectingDescriptions(String),
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Builds an [`OutageTable`] from the interruption page. Documents that do not
/// have the expected shape yield an empty or partial table.
pub fn parse_outage_table(html: &str) -> OutageTable {
    let document = Html::parse_document(html);
    let mut outages = OutageTable::new();

    let tables = document
        .select(&CONTAINER_SEL)
        .flat_map(|container| container.select(&TABLE_SEL));

    for (index, table) in tables.enumerate() {
        match parse_table(table, &mut outages) {
            TableState::AwaitingHeader => log::debug!("Table {} has no region header", index),
            TableState::CollectingDescriptions(region) => {
                log::debug!(
                    "Table {}: {} interruption(s) for {}",
                    index,
                    outages.get(&region).map_or(0, <[String]>::len),
                    region
                );
            }
        }
    }

    outages
}

fn parse_table(table: ElementRef, outages: &mut OutageTable) -> TableState {
    let mut state = TableState::AwaitingHeader;

    for row in table.select(&ROW_SEL) {
        let Some(cell) = row.select(&CELL_SEL).nth(TEXT_COLUMN) else {
            continue;
        };
        let text = elem_text(cell);

        state = match state {
            TableState::AwaitingHeader => {
                let region = normalize_region(&text);
                outages.start_region(region.clone());
                TableState::CollectingDescriptions(region)
            }
            TableState::CollectingDescriptions(region) => {
                outages.push_description(&region, text.trim().to_string());
                TableState::CollectingDescriptions(region)
            }
        };
    }

    state
}
