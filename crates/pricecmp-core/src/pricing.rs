//! Price summaries and distance annotation for a product's offers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::geo::{distance_km, Coordinate};

/// One product's price at one supermarket, as read from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub price: Decimal,
    pub supermarket_id: String,
    pub supermarket_description: String,
    pub supermarket_coordinate: Coordinate,
    pub on_promotion: bool,
    pub available: bool,
}

/// Price range of a product across supermarkets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceSummary {
    #[serde(rename = "preco_minimo", with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(rename = "preco_maximo", with = "rust_decimal::serde::float")]
    pub max: Decimal,
    #[serde(rename = "preco_medio", with = "rust_decimal::serde::float")]
    pub mean: Decimal,
}

/// A [`PriceRecord`] seen from a reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceAnnotatedRecord {
    #[serde(rename = "cnpj")]
    pub supermarket_id: String,
    #[serde(rename = "descricao")]
    pub supermarket_description: String,
    #[serde(rename = "distancia")]
    pub distance_km: f64,
    #[serde(rename = "produto_preco", with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "produto_promocao")]
    pub on_promotion: bool,
    #[serde(rename = "produto_disponivel")]
    pub available: bool,
}

/// Min, max and mean price over `records`.
///
/// Returns `None` for an empty slice; callers are expected to skip the
/// summary entirely in that case. Ties keep the first record seen.
#[must_use]
pub fn summarize_prices(records: &[PriceRecord]) -> Option<PriceSummary> {
    let first = records.first()?.price;

    let (min, max, total) = records.iter().skip(1).fold(
        (first, first, first),
        |(min, max, total), record| {
            (
                if record.price < min { record.price } else { min },
                if record.price > max { record.price } else { max },
                total + record.price,
            )
        },
    );

    Some(PriceSummary {
        min,
        max,
        mean: total / Decimal::from(records.len()),
    })
}

/// Annotate every record with its distance (km) from `origin`.
///
/// Output order and length match the input; nothing is filtered.
#[must_use]
pub fn annotate_distances(
    records: &[PriceRecord],
    origin: Coordinate,
) -> Vec<DistanceAnnotatedRecord> {
    records
        .iter()
        .map(|record| DistanceAnnotatedRecord {
            supermarket_id: record.supermarket_id.clone(),
            supermarket_description: record.supermarket_description.clone(),
            distance_km: distance_km(origin, record.supermarket_coordinate),
            price: record.price,
            on_promotion: record.on_promotion,
            available: record.available,
        })
        .collect()
}
