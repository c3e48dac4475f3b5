//! Seed the product catalogue from a YAML file.
//!
//! The file is a list of products:
//!
//! ```yaml
//! - name: Nasi Goreng
//!   category: food
//!   price: "18000"
//!   in_stock: 20
//! - name: Es Teh
//!   category: minuman
//!   price: "5000"
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use tracing::{error, info};

use kasir_core::{Email, check_scale};
use kasir_server::db::{ProductRepository, UserRepository};
use kasir_server::models::NewProduct;

use super::{CommandError, connect};

/// Check every entry, returning one message per problem.
fn validate_products(products: &[NewProduct]) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, product) in products.iter().enumerate() {
        let label = format!("entry {} ({})", index + 1, product.name);
        if product.name.trim().is_empty() {
            errors.push(format!("{label}: name cannot be empty"));
        }
        if product.price < Decimal::ZERO {
            errors.push(format!("{label}: price cannot be negative"));
        } else if let Err(e) = check_scale(product.price) {
            errors.push(format!("{label}: {e}"));
        }
        if product.in_stock < 0 {
            errors.push(format!("{label}: in_stock cannot be negative"));
        }
    }
    errors
}

/// Insert the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, the owner does not exist, or an insert fails.
pub async fn products(
    file_path: &str,
    owner: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path).await?;
    let products: Vec<NewProduct> = serde_yaml::from_str(&content)?;

    info!(products = products.len(), "Parsed file");

    let errors = validate_products(&products);
    if !errors.is_empty() {
        error!("Validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;

    let owner_id = match owner {
        Some(email) => {
            let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
            let user = UserRepository::new(&pool)
                .get_by_email(&email)
                .await?
                .ok_or_else(|| CommandError::Invalid(format!("no user with email {email}")))?;
            Some(user.id)
        }
        None => None,
    };

    let repo = ProductRepository::new(&pool);
    for product in &products {
        let created = repo.create(product, owner_id).await?;
        info!(product_id = %created.id, name = %created.name, "Product inserted");
    }

    info!(inserted = products.len(), "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MENU: &str = r#"
- name: Nasi Goreng
  category: food
  price: "18000"
  in_stock: 20
- name: Es Teh
  category: minuman
  price: "5000"
"#;

    #[test]
    fn test_parse_menu_file() {
        let products: Vec<NewProduct> = serde_yaml::from_str(MENU).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].category, kasir_core::ProductCategory::Drink);
        assert_eq!(products[1].in_stock, 0);
        assert!(validate_products(&products).is_empty());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let products: Vec<NewProduct> = serde_yaml::from_str(
            r#"
- name: ""
  category: food
  price: "-1"
  in_stock: -3
"#,
        )
        .unwrap();
        let errors = validate_products(&products);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("entry 1"));
    }

    #[test]
    fn test_validate_rejects_sub_cent_price() {
        let products: Vec<NewProduct> = serde_yaml::from_str(
            r#"
- name: Kerupuk
  category: food
  price: "1500.005"
"#,
        )
        .unwrap();
        let errors = validate_products(&products);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("decimal places"));
    }
}
