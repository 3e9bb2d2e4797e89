use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use pricecmp_core::{
    annotate_distances, summarize_prices, DistanceAnnotatedRecord, PriceRecord, PriceSummary,
};
use pricecmp_db::{NewOffer, NewProduct, ProductRow};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::search::{find_nearby_products, NearbyProduct};

use super::validation::{
    check_fields, flag_field, parse_position, price_field, required_text, text_field, FieldsBody,
    PositionQuery,
};
use super::{map_unique_violation, ApiError, ApiResponse, AppState};

const OFFER_EXISTS: &str = "O produto informado já está cadastrado neste supermercado";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct ProductItem {
    gtin: String,
    descricao: String,
    imagem_url: Option<String>,
}

impl From<ProductRow> for ProductItem {
    fn from(row: ProductRow) -> Self {
        Self {
            gtin: row.gtin,
            descricao: row.descricao,
            imagem_url: row.imagem_url,
        }
    }
}

/// Product detail; serializes to `{}` when the product is unknown.
#[derive(Debug, Default, Serialize)]
pub(super) struct ProductDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    detalhes_produto: Option<ProductItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    escala_preco_produto: Option<PriceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    supermercados_regiao: Option<Vec<DistanceAnnotatedRecord>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub search: Option<String>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<ProductItem>>>, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let rows = state
        .catalog
        .list_products(search)
        .await
        .map_err(|e| ApiError::from_db(&req_id.0, &e))?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(ProductItem::from).collect(),
    ))
}

pub(super) async fn list_nearby_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<ApiResponse<Vec<NearbyProduct>>>, ApiError> {
    let origin = parse_position(&query)?;

    let products = find_nearby_products(state.catalog.as_ref(), origin, &state.nearby_search)
        .await
        .map_err(|e| ApiError::from_db(&req_id.0, &e))?;

    Ok(ApiResponse::ok(products))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(gtin): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let origin = parse_position(&query)?;
    let rid = &req_id.0;

    let Some(product) = state
        .catalog
        .find_product(&gtin)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?
    else {
        return Ok(ApiResponse::ok(ProductDetail::default()));
    };

    let records: Vec<PriceRecord> = state
        .catalog
        .list_product_offers(&gtin)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?
        .into_iter()
        .map(PriceRecord::from)
        .collect();

    let mut detail = ProductDetail {
        detalhes_produto: Some(product.into()),
        ..ProductDetail::default()
    };
    if let Some(summary) = summarize_prices(&records) {
        detail.escala_preco_produto = Some(summary);
        detail.supermercados_regiao = Some(annotate_distances(&records, origin));
    }

    Ok(ApiResponse::ok(detail))
}

/// Registers the price of a product at a supermarket. An unknown product is
/// created on the fly when the body carries its `descricao`.
pub(super) async fn create_offer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    FieldsBody(body): FieldsBody,
) -> Result<StatusCode, ApiError> {
    let rid = &req_id.0;
    check_fields(
        &body,
        &["cnpj", "gtin", "preco"],
        &["cnpj", "gtin", "preco"],
    )?;

    let cnpj = required_text(&body, "cnpj")?;
    let gtin = required_text(&body, "gtin")?;
    let preco = price_field(&body, "preco")?;
    let promocao = flag_field(&body, "promocao", false)?;
    let disponivel = flag_field(&body, "disponivel", true)?;

    let supermarkets = state
        .catalog
        .count_supermarkets(&cnpj)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?;
    if supermarkets == 0 {
        return Err(ApiError::validation("O cnpj informado não está cadastrado"));
    }

    let known = state
        .catalog
        .find_product(&gtin)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?;
    if known.is_none() {
        let Some(descricao) = text_field(&body, "descricao") else {
            return Err(ApiError::validation(
                "O gtin informado não está cadastrado; Campos (descricao) são obrigatórios",
            ));
        };
        let product = NewProduct {
            gtin: gtin.clone(),
            descricao,
        };
        match state.catalog.insert_product(&product).await {
            Ok(()) => tracing::info!(request_id = %rid, gtin = %gtin, "product registered"),
            // Registered concurrently by another request.
            Err(e) if e.is_unique_violation() => {}
            Err(e) => return Err(ApiError::from_db(rid, &e)),
        }
    }

    let exists = state
        .catalog
        .offer_exists(&gtin, &cnpj)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?;
    if exists {
        return Err(ApiError::conflict(OFFER_EXISTS));
    }

    let offer = NewOffer {
        gtin,
        cnpj,
        preco,
        promocao,
        disponivel,
    };
    state
        .catalog
        .insert_offer(&offer)
        .await
        .map_err(|e| map_unique_violation(rid, &e, OFFER_EXISTS))?;

    tracing::info!(
        request_id = %rid,
        gtin = %offer.gtin,
        cnpj = %offer.cnpj,
        preco = %offer.preco,
        "offer registered"
    );
    Ok(StatusCode::CREATED)
}
