//! Form option handlers

use axum::Json;
use shared::catalog::{form_catalog, FormCatalog};

/// Plants, soil types and seasons offered by the prediction form
pub async fn get_catalog() -> Json<FormCatalog> {
    Json(form_catalog())
}
