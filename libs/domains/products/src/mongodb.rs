//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, from_document, oid::ObjectId, to_document, Bson, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::record::{ProductChanges, ProductQuery, ProductRecord, COLLECTION};
use crate::repository::ProductRepository;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB implementation of the ProductRepository
///
/// Works on raw documents so a record that no longer fits [`ProductRecord`]
/// surfaces as [`ProductError::MalformedRecord`] instead of a driver error.
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<Document>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    /// Use a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Document>(collection_name),
        }
    }

    /// Create the collection indexes.
    ///
    /// With `unique_names` the store itself rejects duplicate names, which
    /// closes the gap between the service's check and the insert. Index
    /// creation fails if duplicates already exist.
    pub async fn init_indexes(&self, unique_names: bool) -> ProductResult<()> {
        let name_index = if unique_names { "idx_name_unique" } else { "idx_name" };
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(unique_names)
                        .name(name_index.to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(unique_names, "Product indexes created successfully");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Build a MongoDB filter document from a ProductQuery
    fn build_filter(query: &ProductQuery) -> Document {
        let mut filter = doc! {};

        if let Some(ref name) = query.name_contains {
            filter.insert("name", doc! { "$regex": regex::escape(name), "$options": "i" });
        }

        if let Some(ref category) = query.category_contains {
            filter.insert(
                "category",
                doc! { "$regex": regex::escape(category), "$options": "i" },
            );
        }

        // Prices are strings, so bounds compare the converted value.
        // Unconvertible prices become null and are excluded.
        if query.has_price_bounds() {
            let price = doc! {
                "$convert": {
                    "input": "$price",
                    "to": "decimal",
                    "onError": Bson::Null,
                    "onNull": Bson::Null,
                }
            };

            let mut conditions = vec![Bson::Document(doc! { "$ne": [price.clone(), Bson::Null] })];
            if let Some(min) = query.min_price {
                let min = doc! { "$toDecimal": min.to_string() };
                conditions.push(Bson::Document(doc! { "$gte": [price.clone(), min] }));
            }
            if let Some(max) = query.max_price {
                let max = doc! { "$toDecimal": max.to_string() };
                conditions.push(Bson::Document(doc! { "$lte": [price, max] }));
            }
            filter.insert("$expr", doc! { "$and": conditions });
        }

        filter
    }

    /// `$set` body for a partial update; `None` inner values store null
    fn set_document(changes: &ProductChanges) -> Document {
        let mut set = doc! {};

        if let Some(ref name) = changes.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref description) = changes.description {
            set.insert("description", description.clone());
        }
        if let Some(ref price) = changes.price {
            set.insert("price", price.as_str());
        }
        if let Some(ref category) = changes.category {
            set.insert("category", category.clone());
        }

        set
    }

    fn to_record(document: Document) -> ProductResult<ProductRecord> {
        let id = document
            .get_object_id("_id")
            .map(|id| id.to_hex())
            .unwrap_or_else(|_| "<unknown>".to_string());

        from_document(document).map_err(|e| ProductError::MalformedRecord {
            id,
            reason: e.to_string(),
        })
    }

    fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
        matches!(
            *err.kind,
            ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY
        )
    }

    fn map_write_error(err: mongodb::error::Error, name: Option<&str>) -> ProductError {
        match name {
            Some(name) if Self::is_duplicate_key(&err) => ProductError::DuplicateName(name.to_string()),
            _ => err.into(),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, record), fields(product_name = %record.name))]
    async fn insert(&self, record: ProductRecord) -> ProductResult<ObjectId> {
        let document =
            to_document(&record).map_err(|e| ProductError::Database(e.to_string()))?;

        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(|e| Self::map_write_error(e, Some(&record.name)))?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            ProductError::Database(format!(
                "store returned a non-ObjectId identifier: {}",
                result.inserted_id
            ))
        })?;

        tracing::info!(product_id = %id, "Product created successfully");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<ProductRecord>> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .map(Self::to_record)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<ObjectId>,
    ) -> ProductResult<Option<ProductRecord>> {
        let mut filter = doc! { "name": name };
        if let Some(id) = exclude {
            filter.insert("_id", doc! { "$ne": id });
        }

        self.collection
            .find_one(filter)
            .await?
            .map(Self::to_record)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn find(&self, query: &ProductQuery) -> ProductResult<Vec<ProductRecord>> {
        let filter = Self::build_filter(query);

        let cursor = self.collection.find(filter).sort(doc! { "_id": 1 }).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents.into_iter().map(Self::to_record).collect()
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<bool> {
        let filter = doc! { "_id": id };

        if changes.is_empty() {
            return Ok(self.collection.count_documents(filter).await? > 0);
        }

        let update = doc! { "$set": Self::set_document(&changes) };
        let result = self
            .collection
            .update_one(filter, update)
            .await
            .map_err(|e| Self::map_write_error(e, changes.name.as_deref()))?;

        if result.matched_count > 0 {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_build_filter_empty() {
        let filter = MongoProductRepository::build_filter(&ProductQuery::default());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_build_filter_escapes_substrings() {
        let query = ProductQuery {
            name_contains: Some("a.b(c)".to_string()),
            category_contains: Some("home".to_string()),
            ..Default::default()
        };
        let filter = MongoProductRepository::build_filter(&query);

        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\(c\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
        assert_eq!(
            filter.get_document("category").unwrap().get_str("$regex").unwrap(),
            "home"
        );
        assert!(!filter.contains_key("$expr"));
    }

    #[test]
    fn test_build_filter_with_price_range() {
        let query = ProductQuery {
            min_price: Some(Decimal::new(100, 0)),
            max_price: Some(Decimal::new(100000, 2)),
            ..Default::default()
        };
        let filter = MongoProductRepository::build_filter(&query);

        let conditions = filter
            .get_document("$expr")
            .unwrap()
            .get_array("$and")
            .unwrap();
        // null guard plus both bounds
        assert_eq!(conditions.len(), 3);
        assert!(!filter.contains_key("price"));
    }

    #[test]
    fn test_build_filter_with_single_bound() {
        let query = ProductQuery {
            min_price: Some(Decimal::ONE),
            ..Default::default()
        };
        let filter = MongoProductRepository::build_filter(&query);

        let conditions = filter
            .get_document("$expr")
            .unwrap()
            .get_array("$and")
            .unwrap();
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn test_set_document_only_touches_supplied_fields() {
        let changes = ProductChanges {
            price: Some("12.50".to_string()),
            description: Some(None),
            ..Default::default()
        };
        let set = MongoProductRepository::set_document(&changes);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("price").unwrap(), "12.50");
        assert_eq!(set.get("description"), Some(&Bson::Null));
        assert!(!set.contains_key("name"));
    }

    #[test]
    fn test_to_record_flags_malformed_documents() {
        let id = ObjectId::new();
        let document = doc! { "_id": id, "name": "Lamp", "price": 12.5 };

        match MongoProductRepository::to_record(document) {
            Err(ProductError::MalformedRecord { id: reported, .. }) => {
                assert_eq!(reported, id.to_hex())
            }
            other => panic!("expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_to_record_reads_optional_fields() {
        let id = ObjectId::new();
        let document = doc! { "_id": id, "name": "Lamp", "price": "12.5" };

        let record = MongoProductRepository::to_record(document).unwrap();
        assert_eq!(record.id, Some(id));
        assert_eq!(record.description, None);
        assert_eq!(record.category, None);
    }
}
