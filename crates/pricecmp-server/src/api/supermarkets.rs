use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use pricecmp_db::{NewSupermarket, SupermarketRow};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::validation::{check_fields, number_field, required_text, text_field, FieldsBody};
use super::{map_unique_violation, ApiError, ApiResponse, AppState};

const CNPJ_TAKEN: &str = "O cnpj informado já está cadastrado";

const REQUIRED_FIELDS: [&str; 9] = [
    "cnpj",
    "cep",
    "cidade",
    "logradouro",
    "uf",
    "latitude",
    "longitude",
    "bairro",
    "descricao",
];

const NUMERIC_FIELDS: [&str; 3] = ["latitude", "longitude", "cnpj"];

#[derive(Debug, Serialize)]
pub(super) struct SupermarketItem {
    cnpj: String,
    descricao: String,
    cidade: String,
    bairro: String,
    logradouro: String,
    uf: String,
    cep: String,
    latitude: f64,
    longitude: f64,
    imagem_url: Option<String>,
    numero: Option<String>,
}

impl From<SupermarketRow> for SupermarketItem {
    fn from(row: SupermarketRow) -> Self {
        Self {
            cnpj: row.cnpj,
            descricao: row.descricao,
            cidade: row.cidade,
            bairro: row.bairro,
            logradouro: row.logradouro,
            uf: row.uf,
            cep: row.cep,
            latitude: row.latitude,
            longitude: row.longitude,
            imagem_url: row.imagem_url,
            numero: row.numero,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SupermarketQuery {
    pub search: Option<String>,
}

pub(super) async fn list_supermarkets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SupermarketQuery>,
) -> Result<Json<ApiResponse<Vec<SupermarketItem>>>, ApiError> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let rows = state
        .catalog
        .list_supermarkets(search)
        .await
        .map_err(|e| ApiError::from_db(&req_id.0, &e))?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(SupermarketItem::from).collect(),
    ))
}

pub(super) async fn get_supermarket(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(cnpj): Path<String>,
) -> Result<Json<ApiResponse<Vec<SupermarketItem>>>, ApiError> {
    let rows = state
        .catalog
        .find_supermarkets(cnpj.trim())
        .await
        .map_err(|e| ApiError::from_db(&req_id.0, &e))?;

    Ok(ApiResponse::ok(
        rows.into_iter().map(SupermarketItem::from).collect(),
    ))
}

pub(super) async fn create_supermarket(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    FieldsBody(body): FieldsBody,
) -> Result<StatusCode, ApiError> {
    let rid = &req_id.0;
    check_fields(&body, &REQUIRED_FIELDS, &NUMERIC_FIELDS)?;

    let supermarket = NewSupermarket {
        cnpj: required_text(&body, "cnpj")?,
        descricao: required_text(&body, "descricao")?,
        cidade: required_text(&body, "cidade")?,
        bairro: required_text(&body, "bairro")?,
        logradouro: required_text(&body, "logradouro")?,
        uf: required_text(&body, "uf")?,
        cep: required_text(&body, "cep")?,
        latitude: number_field(&body, "latitude")?,
        longitude: number_field(&body, "longitude")?,
        numero: text_field(&body, "numero"),
    };

    let existing = state
        .catalog
        .count_supermarkets(&supermarket.cnpj)
        .await
        .map_err(|e| ApiError::from_db(rid, &e))?;
    if existing > 0 {
        return Err(ApiError::conflict(CNPJ_TAKEN));
    }

    state
        .catalog
        .insert_supermarket(&supermarket)
        .await
        .map_err(|e| map_unique_violation(rid, &e, CNPJ_TAKEN))?;

    tracing::info!(request_id = %rid, cnpj = %supermarket.cnpj, "supermarket registered");
    Ok(StatusCode::CREATED)
}
