//! Product catalogue API handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;

use kasir_core::{ProductId, check_scale};

use super::{ApiJson, ApiPath};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{NewProduct, Product, ProductChanges};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route(
            "/api/products/{id}",
            get(detail).put(update).delete(remove),
        )
}

/// Check the fields a product write may set.
fn validate(
    name: Option<&str>,
    in_stock: Option<i32>,
    price: Option<Decimal>,
) -> std::result::Result<(), AppError> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if in_stock.is_some_and(|n| n < 0) {
        return Err(AppError::BadRequest("in_stock cannot be negative".to_string()));
    }
    if let Some(price) = price {
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest("price cannot be negative".to_string()));
        }
        check_scale(price).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }
    Ok(())
}

async fn list(State(state): State<AppState>, RequireAuth(_user): RequireAuth) -> Result<Json<Vec<Product>>> {
    Ok(Json(ProductRepository::new(state.pool()).list().await?))
}

async fn detail(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))
}

async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(mut body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    validate(Some(&body.name), Some(body.in_stock), Some(body.price))?;
    body.name = body.name.trim().to_owned();

    let product = ProductRepository::new(state.pool())
        .create(&body, Some(user.id))
        .await?;

    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(mut body): ApiJson<ProductChanges>,
) -> Result<Json<Product>> {
    validate(body.name.as_deref(), body.in_stock, body.price)?;
    body.name = body.name.map(|n| n.trim().to_owned());

    let product = ProductRepository::new(state.pool())
        .update(id, &body)
        .await?;
    Ok(Json(product))
}

async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;

    tracing::info!(product_id = %id, user_id = %user.id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_fields() {
        assert!(validate(Some("Es Teh"), Some(10), Some(Decimal::from(5000))).is_ok());
        assert!(validate(None, None, None).is_ok());
        assert!(validate(Some("   "), None, None).is_err());
        assert!(validate(None, Some(-1), None).is_err());
        assert!(validate(None, None, Some(Decimal::from(-1))).is_err());
        assert!(validate(None, None, Some(Decimal::new(4999, 3))).is_err());
        assert!(validate(None, None, Some(Decimal::new(499, 2))).is_ok());
    }

    #[test]
    fn test_product_payload_accepts_indonesian_category() {
        let body: NewProduct = serde_json::from_str(
            r#"{"name": "Nasi Goreng", "category": "makanan", "price": "18000"}"#,
        )
        .unwrap();
        assert_eq!(body.category, kasir_core::ProductCategory::Food);
        assert_eq!(body.in_stock, 0);
        assert!(body.description.is_empty());
    }
}
