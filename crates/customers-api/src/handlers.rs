//! Endpoint handlers for the customer API.
//!
//! Every handler invokes exactly one gateway operation.
//!
//! # Endpoints
//!
//! | Method | Path | Parameters | Gateway operation |
//! |--------|------|------------|-------------------|
//! | `GET` | `/customers.getById` | query `id` | `by_id` |
//! | `GET` | `/customers.getAll` | -- | `all` |
//! | `GET` | `/customers.getAllActive` | -- | `all_active` |
//! | `POST` | `/customers.blockById` | query `id` | `set_active(id, false)` |
//! | `POST` | `/customers.unblockById` | query `id` | `set_active(id, true)` |
//! | `POST` | `/customers.removeById` | query `id` | `delete` |
//! | `POST` | `/customers.save` | form or multipart `id`, `name`, `phone` | `save` |
//! | `GET` | `/health` | -- | none |

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, FromRequest, Multipart, Query, Request, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use customers_db::CustomerStore;
use customers_types::{Customer, CustomerId, SaveCustomer};

use crate::error::ApiError;
use crate::state::AppState;

/// Url-encoded `key=value` pairs in the order they were sent.
///
/// Parameters are read as raw pairs so a repeated key keeps its first value
/// instead of failing deserialization.
pub type Pairs = Vec<(String, String)>;

// ---------------------------------------------------------------------------
// Parameter structs
// ---------------------------------------------------------------------------

/// Query parameters of the id-scoped endpoints.
///
/// `id` is kept as text so a malformed value surfaces as our own
/// [`ApiError::BadRequest`] rather than an extractor rejection.
#[derive(Debug, Default)]
pub struct IdQuery {
    /// Customer id, decimal.
    pub id: Option<String>,
}

impl IdQuery {
    /// Take the first `id` pair; other keys are ignored.
    pub fn from_pairs(pairs: Pairs) -> Self {
        Self {
            id: pairs
                .into_iter()
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value),
        }
    }
}

/// Fields of `POST /customers.save`.
///
/// Read from the url-encoded or multipart body, falling back to the query
/// string for fields the body does not carry.
#[derive(Debug, Default)]
pub struct SaveForm {
    /// Target id; missing, empty or `0` creates a new customer.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl SaveForm {
    /// Collect the known fields; the first value of a repeated key wins.
    pub fn from_pairs(pairs: Pairs) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            form.offer(&key, value);
        }
        form
    }

    /// Read the text parts of a multipart body. File parts are skipped.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.file_name().is_some() {
                continue;
            }
            let Some(key) = field.name().map(str::to_owned) else {
                continue;
            };
            let value = field.text().await.map_err(multipart_error)?;
            form.offer(&key, value);
        }
        Ok(form)
    }

    fn offer(&mut self, key: &str, value: String) {
        let slot = match key {
            "id" => &mut self.id,
            "name" => &mut self.name,
            "phone" => &mut self.phone,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Fill fields missing from `self` with those of `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            id: self.id.or(fallback.id),
            name: self.name.or(fallback.name),
            phone: self.phone.or(fallback.phone),
        }
    }

    /// Turn the raw fields into an upsert request.
    ///
    /// # Errors
    ///
    /// [`ApiError::BadRequest`] if `id` is not an integer or if both `name`
    /// and `phone` are empty.
    pub fn into_save(self) -> Result<SaveCustomer, ApiError> {
        let raw_id = match self.id.as_deref() {
            None | Some("") => 0,
            Some(text) => parse_id(text)?,
        };

        let save = SaveCustomer {
            id: CustomerId::from_request(raw_id),
            name: self.name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
        };
        if save.is_blank() {
            return Err(ApiError::BadRequest(String::from(
                "name and phone are both empty",
            )));
        }
        Ok(save)
    }
}

/// Parse a decimal id exactly as sent; surrounding whitespace is an error.
fn parse_id(text: &str) -> Result<i64, ApiError> {
    text.parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid id {text:?}: {e}")))
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::BadRequest(e.body_text())
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("multipart/form-data"))
}

/// Read the save fields carried by the request body, if any.
async fn read_save_body(request: Request) -> Result<SaveForm, ApiError> {
    if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return SaveForm::from_multipart(multipart).await;
    }

    match Form::<Pairs>::from_request(request, &()).await {
        Ok(Form(pairs)) => Ok(SaveForm::from_pairs(pairs)),
        // No form body at all: the query string is the only source.
        Err(FormRejection::InvalidFormContentType(_)) => Ok(SaveForm::default()),
        Err(e) => Err(ApiError::BadRequest(e.body_text())),
    }
}

/// Extract the mandatory `id` query parameter.
fn required_id(query: Result<Query<Pairs>, QueryRejection>) -> Result<CustomerId, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let text = IdQuery::from_pairs(pairs)
        .id
        .ok_or_else(|| ApiError::BadRequest(String::from("missing id")))?;
    parse_id(&text).map(CustomerId)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `GET /customers.getById?id=N` -- a single customer.
pub async fn get_by_id<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = required_id(query)?;
    let customer = state.gateway.by_id(id).await?;
    Ok(Json(customer))
}

/// `GET /customers.getAll` -- every customer.
pub async fn get_all<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.gateway.all().await?))
}

/// `GET /customers.getAllActive` -- customers with the active flag set.
pub async fn get_all_active<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.gateway.all_active().await?))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// `POST /customers.blockById?id=N` -- clear the active flag.
pub async fn block_by_id<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = required_id(query)?;
    Ok(Json(state.gateway.set_active(id, false).await?))
}

/// `POST /customers.unblockById?id=N` -- set the active flag.
pub async fn unblock_by_id<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = required_id(query)?;
    Ok(Json(state.gateway.set_active(id, true).await?))
}

/// `POST /customers.removeById?id=N` -- delete and return the removed record.
pub async fn remove_by_id<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Json<Customer>, ApiError> {
    let id = required_id(query)?;
    Ok(Json(state.gateway.delete(id).await?))
}

/// `POST /customers.save` -- create or update a customer.
pub async fn save<S: CustomerStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<Pairs>, QueryRejection>,
    request: Request,
) -> Result<Json<Customer>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let from_query = SaveForm::from_pairs(pairs);
    let fields = read_save_body(request).await?.or(from_query);

    let customer = state.gateway.save(fields.into_save()?).await?;
    Ok(Json(customer))
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

/// `GET /health` -- process liveness, does not touch the store.
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(id: Option<&str>, name: Option<&str>, phone: Option<&str>) -> SaveForm {
        SaveForm {
            id: id.map(str::to_owned),
            name: name.map(str::to_owned),
            phone: phone.map(str::to_owned),
        }
    }

    #[test]
    fn missing_or_zero_id_creates() {
        for id in [None, Some(""), Some("0")] {
            let save = form(id, Some("Ann"), None).into_save().unwrap();
            assert_eq!(save.id, None);
        }
    }

    #[test]
    fn numeric_id_updates() {
        let save = form(Some("12"), Some("Ann"), Some("555"))
            .into_save()
            .unwrap();
        assert_eq!(save.id, Some(CustomerId(12)));
        assert_eq!(save.name, "Ann");
        assert_eq!(save.phone, "555");
    }

    #[test]
    fn garbage_id_is_rejected() {
        for id in ["abc", " 1", "1 ", "1.5"] {
            let err = form(Some(id), Some("Ann"), None).into_save().unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)));
        }
    }

    #[test]
    fn blank_fields_are_rejected() {
        let err = form(Some("1"), Some(""), None).into_save().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn body_fields_win_over_query() {
        let merged = form(None, Some("Body"), None).or(form(Some("3"), Some("Query"), Some("9")));
        assert_eq!(merged.id.as_deref(), Some("3"));
        assert_eq!(merged.name.as_deref(), Some("Body"));
        assert_eq!(merged.phone.as_deref(), Some("9"));
    }

    fn pairs(items: &[(&str, &str)]) -> Pairs {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let fields = SaveForm::from_pairs(pairs(&[
            ("name", "Ann"),
            ("id", "4"),
            ("name", "Bob"),
            ("id", "5"),
            ("extra", "x"),
        ]));
        assert_eq!(fields.id.as_deref(), Some("4"));
        assert_eq!(fields.name.as_deref(), Some("Ann"));
        assert_eq!(fields.phone, None);

        let query = IdQuery::from_pairs(pairs(&[("id", "1"), ("id", "2")]));
        assert_eq!(query.id.as_deref(), Some("1"));
    }

    #[test]
    fn required_id_rejects_missing_and_garbage() {
        let missing = required_id(Ok(Query(pairs(&[("other", "1")]))));
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));

        for garbage in ["x1", "", " 1"] {
            let result = required_id(Ok(Query(pairs(&[("id", garbage)]))));
            assert!(matches!(result, Err(ApiError::BadRequest(_))));
        }

        let ok = required_id(Ok(Query(pairs(&[("id", "7"), ("id", "8")]))));
        assert_eq!(ok.unwrap(), CustomerId(7));
    }
}
