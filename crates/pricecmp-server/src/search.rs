//! Nearby-products search: scans the offer table window by window and keeps
//! the offers whose supermarket lies within the configured radius.

use pricecmp_core::{distance_meters, Coordinate, NearbySearchConfig};
use pricecmp_db::{Catalog, DbError, OfferPageRow, PageWindow};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::time::Instant;

/// First window of every scan.
pub const FIRST_WINDOW: PageWindow = PageWindow::new(0, 10);

/// A product price found near the query coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyProduct {
    pub descricao: String,
    pub gtin: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    /// Meters from the query coordinate.
    pub distancia: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("offer scan failed at rows {}..={}", window.from, window.to)]
    Fetch {
        window: PageWindow,
        #[source]
        source: DbError,
    },
}

/// Window that follows `window`: `from + to + 1` through `to + to + 1`.
///
/// Every window stays 11 rows wide, so the rows between windows are never
/// read: (0,10), (11,21), (33,43) skip rows 22..=32.
#[must_use]
pub fn next_window(window: PageWindow) -> PageWindow {
    PageWindow::new(
        window.from.saturating_add(window.to).saturating_add(1),
        window.to.saturating_add(window.to).saturating_add(1),
    )
}

/// Scans offers until an empty page, or until the target count is met and
/// the time budget is spent. A failed fetch discards everything gathered so
/// far.
///
/// # Errors
///
/// Returns [`SearchError::Fetch`] if any page fetch fails.
pub async fn find_nearby_products(
    catalog: &dyn Catalog,
    origin: Coordinate,
    config: &NearbySearchConfig,
) -> Result<Vec<NearbyProduct>, SearchError> {
    let started = Instant::now();
    let mut window = FIRST_WINDOW;
    let mut matches: Vec<NearbyProduct> = Vec::new();
    let mut iterations = 0_usize;

    loop {
        let page = catalog
            .fetch_offer_page(window)
            .await
            .map_err(|source| SearchError::Fetch { window, source })?;
        iterations += 1;

        if page.is_empty() {
            tracing::debug!(from = window.from, to = window.to, "offer scan exhausted");
            break;
        }

        let page_len = page.len();
        let before = matches.len();
        matches.extend(
            page.into_iter()
                .filter_map(|row| within_radius(row, origin, config.max_distance_meters)),
        );
        tracing::debug!(
            from = window.from,
            to = window.to,
            page_len,
            kept = matches.len() - before,
            total = matches.len(),
            "offer page scanned"
        );

        window = next_window(window);
        let elapsed = started.elapsed();

        // Either condition keeps the scan going.
        if !(matches.len() < config.target_count || elapsed < config.time_budget) {
            break;
        }
    }

    tracing::info!(
        iterations,
        matches = matches.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "nearby search finished"
    );
    Ok(matches)
}

fn within_radius(row: OfferPageRow, origin: Coordinate, max_meters: f64) -> Option<NearbyProduct> {
    let distancia = distance_meters(origin, row.supermarket_coordinate());
    (distancia <= max_meters).then(|| NearbyProduct {
        descricao: row.descricao,
        gtin: row.gtin,
        preco: row.preco,
        distancia,
    })
}
