//! Field checks for request bodies and coordinate query parameters.
//!
//! Bodies (JSON or form-encoded) are read into one loose field map so every
//! missing or malformed field can be reported at once, in the order the
//! caller lists them.

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use pricecmp_core::Coordinate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::ApiError;

pub(super) type Body = Map<String, Value>;

/// `?lat=&lng=` kept as raw strings so a bad value yields our own message
/// instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
pub(super) struct PositionQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

pub(super) fn required_message(fields: &[&str]) -> String {
    format!("Campos ({}) são obrigatórios", fields.join(", "))
}

pub(super) fn numeric_message(fields: &[&str]) -> String {
    format!("Campos ({}) devem conter apenas números", fields.join(", "))
}

/// Largest price a `NUMERIC(12,2)` column holds.
pub(super) fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

pub(super) fn price_range_message(field: &str) -> String {
    format!("Campos ({field}) devem estar entre 0 e {}", max_price())
}

/// Request body as a field map. `application/x-www-form-urlencoded` bodies
/// become string values; anything else is parsed as JSON, where a non-object
/// counts as an empty body.
#[derive(Debug)]
pub(super) struct FieldsBody(pub Body);

impl<S> FromRequest<S> for FieldsBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| {
                v.trim_start()
                    .to_ascii_lowercase()
                    .starts_with("application/x-www-form-urlencoded")
            });

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
            return Ok(Self(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ));
        }

        match Json::<Value>::from_request(req, state).await {
            Ok(Json(Value::Object(body))) => Ok(Self(body)),
            Ok(Json(_)) => Ok(Self(Body::new())),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}

/// Reports every absent field in `required`, then every present but
/// non-numeric field in `numeric`.
pub(super) fn check_fields(body: &Body, required: &[&str], numeric: &[&str]) -> Result<(), ApiError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| is_missing(body.get(*field)))
        .collect();
    let not_numeric: Vec<&str> = numeric
        .iter()
        .copied()
        .filter(|field| {
            let value = body.get(*field);
            !is_missing(value) && value.and_then(as_number).is_none()
        })
        .collect();

    let mut errors = Vec::new();
    if !missing.is_empty() {
        errors.push(required_message(&missing));
    }
    if !not_numeric.is_empty() {
        errors.push(numeric_message(&not_numeric));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}

/// Text value of `field`; numbers are rendered as written.
pub(super) fn text_field(body: &Body, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(super) fn required_text(body: &Body, field: &str) -> Result<String, ApiError> {
    text_field(body, field).ok_or_else(|| ApiError::validation(required_message(&[field])))
}

pub(super) fn number_field(body: &Body, field: &str) -> Result<f64, ApiError> {
    body.get(field)
        .and_then(as_number)
        .ok_or_else(|| ApiError::validation(numeric_message(&[field])))
}

/// Price rounded to cents. Non-numeric input and numbers outside
/// `0..=max_price()` get distinct messages.
pub(super) fn price_field(body: &Body, field: &str) -> Result<Decimal, ApiError> {
    let raw = text_field(body, field)
        .filter(|raw| parse_finite(raw).is_some())
        .ok_or_else(|| ApiError::validation(numeric_message(&[field])))?;

    let price = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ApiError::validation(price_range_message(field)))?
        .round_dp(2);

    if price < Decimal::ZERO || price > max_price() {
        return Err(ApiError::validation(price_range_message(field)));
    }
    Ok(price)
}

/// Optional boolean; absent or null yields `default`.
pub(super) fn flag_field(body: &Body, field: &str, default: bool) -> Result<bool, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(value)) => Ok(*value),
        Some(Value::String(raw)) if raw.trim() == "true" => Ok(true),
        Some(Value::String(raw)) if raw.trim() == "false" => Ok(false),
        Some(_) => Err(ApiError::validation(format!(
            "Campos ({field}) devem ser verdadeiro ou falso"
        ))),
    }
}

/// Parses the `lat`/`lng` query pair into a coordinate.
pub(super) fn parse_position(query: &PositionQuery) -> Result<Coordinate, ApiError> {
    let lat = query.lat.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let lng = query.lng.as_deref().map(str::trim).filter(|v| !v.is_empty());

    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(ApiError::validation("Parâmetros (lat, lng) são obrigatórios"));
    };

    let latitude = parse_finite(lat);
    let longitude = parse_finite(lng);
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
        _ => {
            let invalid: Vec<&str> = [("lat", latitude), ("lng", longitude)]
                .into_iter()
                .filter(|(_, parsed)| parsed.is_none())
                .map(|(name, _)| name)
                .collect();
            Err(ApiError::validation(format!(
                "Parâmetros ({}) devem conter apenas números",
                invalid.join(", ")
            )))
        }
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_finite(s.trim()),
        _ => None,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
