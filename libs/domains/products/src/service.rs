//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::record::{self, ProductQuery};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Validation and identifier parsing always happen before the repository is
/// touched. The name check and the following write are separate calls, so two
/// concurrent writers can still end up with the same name unless the store
/// enforces a unique index.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input.validate()?;

        if self
            .repository
            .find_by_name(&input.name, None)
            .await?
            .is_some()
        {
            return Err(ProductError::DuplicateName(input.name));
        }

        let id = self.repository.insert(record::encode(&input)).await?;

        let stored = self.repository.find_by_id(id).await?.ok_or_else(|| {
            ProductError::Database(format!("product {} vanished after insert", id))
        })?;
        record::decode(stored)
    }

    /// List products matching every supplied filter, in insertion order
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        filter.validate()?;

        let query = ProductQuery::from_filter(&filter);
        let records = self.repository.find(&query).await?;
        if records.is_empty() {
            return Err(ProductError::NoMatches);
        }

        records.into_iter().map(record::decode).collect()
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        let object_id = record::parse_identifier(id)?;

        let stored = self
            .repository
            .find_by_id(object_id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;
        record::decode(stored)
    }

    /// Apply the supplied fields and return the product as persisted
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: &str, input: UpdateProduct) -> ProductResult<Product> {
        let object_id = record::parse_identifier(id)?;

        if input.is_empty() {
            return Err(ProductError::EmptyUpdate);
        }
        input.validate()?;

        if let Some(ref name) = input.name {
            if self
                .repository
                .find_by_name(name, Some(object_id))
                .await?
                .is_some()
            {
                return Err(ProductError::DuplicateName(name.clone()));
            }
        }

        let changes = record::encode_changes(&input);
        if !self.repository.update(object_id, changes).await? {
            return Err(ProductError::NotFound(id.to_string()));
        }

        let stored = self
            .repository
            .find_by_id(object_id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))?;
        record::decode(stored)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> ProductResult<()> {
        let object_id = record::parse_identifier(id)?;

        if self.repository.delete(object_id).await? {
            Ok(())
        } else {
            Err(ProductError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductRecord;
    use crate::repository::MockProductRepository;
    use mockall::predicate::eq;
    use mongodb::bson::oid::ObjectId;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stored(id: ObjectId, name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            id: Some(id),
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            category: None,
        }
    }

    fn lamp() -> CreateProduct {
        CreateProduct {
            name: "Lamp".to_string(),
            description: None,
            price: dec("79.99"),
            category: Some("Home".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_product_success() {
        let id = ObjectId::new();
        let mut mock = MockProductRepository::new();

        mock.expect_find_by_name()
            .with(eq("Lamp"), eq(None))
            .times(1)
            .returning(|_, _| Ok(None));
        mock.expect_insert()
            .withf(|record| record.price == "79.99" && record.id.is_none())
            .times(1)
            .returning(move |_| Ok(id));
        mock.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |id| Ok(Some(stored(id, "Lamp", "79.99"))));

        let service = ProductService::new(mock);
        let product = service.create_product(lamp()).await.unwrap();

        assert_eq!(product.id, id.to_hex());
        assert_eq!(product.price, dec("79.99"));
    }

    #[tokio::test]
    async fn test_create_product_duplicate_name() {
        let mut mock = MockProductRepository::new();

        mock.expect_find_by_name()
            .returning(|name, _| Ok(Some(stored(ObjectId::new(), name, "1"))));
        mock.expect_insert().times(0);

        let service = ProductService::new(mock);
        let result = service.create_product(lamp()).await;

        assert!(matches!(result, Err(ProductError::DuplicateName(name)) if name == "Lamp"));
    }

    #[tokio::test]
    async fn test_create_product_validation_precedes_store() {
        let mut mock = MockProductRepository::new();
        mock.expect_find_by_name().times(0);
        mock.expect_insert().times(0);

        let service = ProductService::new(mock);
        let input = CreateProduct {
            name: String::new(),
            price: dec("-1"),
            ..lamp()
        };

        match service.create_product(input).await {
            Err(ProductError::Validation(errors)) => {
                assert_eq!(errors.field_errors().len(), 2);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_product_invalid_id_never_reaches_store() {
        let mut mock = MockProductRepository::new();
        mock.expect_find_by_id().times(0);

        let service = ProductService::new(mock);
        let result = service.get_product("invalid_id").await;

        assert!(matches!(result, Err(ProductError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut mock = MockProductRepository::new();
        mock.expect_find_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock);
        let result = service.get_product(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_product_malformed_record() {
        let mut mock = MockProductRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Lamp", "not a number"))));

        let service = ProductService::new(mock);
        let result = service.get_product(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(ProductError::MalformedRecord { .. })));
    }

    #[tokio::test]
    async fn test_list_products_empty_is_no_matches() {
        let mut mock = MockProductRepository::new();
        mock.expect_find().returning(|_| Ok(vec![]));

        let service = ProductService::new(mock);
        let result = service.list_products(ProductFilter::default()).await;

        assert!(matches!(result, Err(ProductError::NoMatches)));
    }

    #[tokio::test]
    async fn test_list_products_passes_normalised_query() {
        let mut mock = MockProductRepository::new();
        mock.expect_find()
            .withf(|query| query.name_contains.is_none() && query.min_price == Some(Decimal::TEN))
            .times(1)
            .returning(|_| Ok(vec![stored(ObjectId::new(), "Lamp", "12")]));

        let service = ProductService::new(mock);
        let filter = ProductFilter {
            name: Some(String::new()),
            min_price: Some(Decimal::TEN),
            ..Default::default()
        };

        let products = service.list_products(filter).await.unwrap();
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_list_products_rejects_negative_bound() {
        let mut mock = MockProductRepository::new();
        mock.expect_find().times(0);

        let service = ProductService::new(mock);
        let filter = ProductFilter {
            max_price: Some(dec("-0.01")),
            ..Default::default()
        };

        let result = service.list_products(filter).await;
        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_product_empty() {
        let mut mock = MockProductRepository::new();
        mock.expect_update().times(0);

        let service = ProductService::new(mock);
        let result = service
            .update_product(&ObjectId::new().to_hex(), UpdateProduct::default())
            .await;

        assert!(matches!(result, Err(ProductError::EmptyUpdate)));
    }

    #[tokio::test]
    async fn test_update_product_invalid_id_checked_first() {
        let mock = MockProductRepository::new();
        let service = ProductService::new(mock);

        let result = service
            .update_product("invalid_id", UpdateProduct::default())
            .await;
        assert!(matches!(result, Err(ProductError::InvalidIdentifier(_))));
    }

    #[tokio::test]
    async fn test_update_product_duplicate_name_excludes_self() {
        let id = ObjectId::new();
        let mut mock = MockProductRepository::new();

        mock.expect_find_by_name()
            .with(eq("Taken"), eq(Some(id)))
            .times(1)
            .returning(|name, _| Ok(Some(stored(ObjectId::new(), name, "1"))));
        mock.expect_update().times(0);

        let service = ProductService::new(mock);
        let input = UpdateProduct {
            name: Some("Taken".to_string()),
            ..Default::default()
        };

        let result = service.update_product(&id.to_hex(), input).await;
        assert!(matches!(result, Err(ProductError::DuplicateName(_))));
    }

    #[tokio::test]
    async fn test_update_product_not_found() {
        let mut mock = MockProductRepository::new();
        mock.expect_update().returning(|_, _| Ok(false));

        let service = ProductService::new(mock);
        let input = UpdateProduct {
            price: Some(dec("5")),
            ..Default::default()
        };

        let result = service
            .update_product(&ObjectId::new().to_hex(), input)
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_product_returns_persisted_state() {
        let id = ObjectId::new();
        let mut mock = MockProductRepository::new();

        mock.expect_update()
            .withf(move |target, changes| {
                *target == id && changes.price.as_deref() == Some("5.00") && changes.name.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(true));
        mock.expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, "Lamp", "5.00"))));

        let service = ProductService::new(mock);
        let input = UpdateProduct {
            price: Some(dec("5.00")),
            ..Default::default()
        };

        let product = service.update_product(&id.to_hex(), input).await.unwrap();
        assert_eq!(product.name, "Lamp");
        assert_eq!(product.price, dec("5"));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let id = ObjectId::new();
        let mut mock = MockProductRepository::new();
        mock.expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));

        let service = ProductService::new(mock);
        assert!(service.delete_product(&id.to_hex()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_product_not_found() {
        let mut mock = MockProductRepository::new();
        mock.expect_delete().returning(|_| Ok(false));

        let service = ProductService::new(mock);
        let result = service.delete_product(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }
}
