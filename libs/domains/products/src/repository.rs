use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::record::{ProductChanges, ProductQuery, ProductRecord};

/// Repository trait for Product persistence
///
/// Works on stored records; mapping to API types happens in the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new record and return the identifier the store assigned
    async fn insert(&self, record: ProductRecord) -> ProductResult<ObjectId>;

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<ProductRecord>>;

    /// Exact, case-sensitive name lookup, optionally ignoring one record
    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<ObjectId>,
    ) -> ProductResult<Option<ProductRecord>>;

    async fn find(&self, query: &ProductQuery) -> ProductResult<Vec<ProductRecord>>;

    /// Apply `changes`; `false` when no record has this id
    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<bool>;

    /// `false` when no record has this id
    async fn delete(&self, id: ObjectId) -> ProductResult<bool>;
}

/// In-memory repository for development and tests.
///
/// Records are kept in insertion order, whatever their ids.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    records: Arc<RwLock<Vec<ProductRecord>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record verbatim, keeping its id if it has one.
    ///
    /// Lets tests seed data the API would never produce.
    pub async fn seed(&self, mut record: ProductRecord) -> ObjectId {
        let id = *record.id.get_or_insert_with(ObjectId::new);
        let mut records = self.records.write().await;
        match records.iter_mut().find(|stored| stored.id == Some(id)) {
            Some(stored) => *stored = record,
            None => records.push(record),
        }
        id
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, record: ProductRecord) -> ProductResult<ObjectId> {
        Ok(self.seed(record).await)
    }

    async fn find_by_id(&self, id: ObjectId) -> ProductResult<Option<ProductRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == Some(id)).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        exclude: Option<ObjectId>,
    ) -> ProductResult<Option<ProductRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|record| record.name == name && (exclude.is_none() || record.id != exclude))
            .cloned())
    }

    async fn find(&self, query: &ProductQuery) -> ProductResult<Vec<ProductRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    async fn update(&self, id: ObjectId, changes: ProductChanges) -> ProductResult<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|record| record.id == Some(id)) {
            Some(record) => {
                changes.apply_to(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> ProductResult<bool> {
        let mut records = self.records.write().await;
        match records.iter().position(|record| record.id == Some(id)) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            id: None,
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let repo = InMemoryProductRepository::new();
        let id = repo.insert(record("Lamp", "10")).await.unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.name, "Lamp");
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact_and_honours_exclude() {
        let repo = InMemoryProductRepository::new();
        let id = repo.insert(record("Lamp", "10")).await.unwrap();

        assert!(repo.find_by_name("Lamp", None).await.unwrap().is_some());
        assert!(repo.find_by_name("lamp", None).await.unwrap().is_none());
        assert!(repo.find_by_name("Lamp", Some(id)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let repo = InMemoryProductRepository::new();
        for name in ["a", "b", "c"] {
            repo.insert(record(name, "1")).await.unwrap();
        }

        let names: Vec<String> = repo
            .find(&ProductQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_seeded_ids_do_not_reorder_results() {
        let repo = InMemoryProductRepository::new();
        let later = ObjectId::new();
        let earlier = ObjectId::from_bytes([0; 12]);

        for (id, name) in [(later, "first"), (earlier, "second")] {
            repo.seed(ProductRecord {
                id: Some(id),
                ..record(name, "1")
            })
            .await;
        }
        repo.insert(record("third", "1")).await.unwrap();

        let names: Vec<String> = repo
            .find(&ProductQuery::default())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["first", "second", "third"]);

        repo.seed(ProductRecord {
            id: Some(earlier),
            ..record("second, replaced", "2")
        })
        .await;
        assert_eq!(repo.len().await, 3);
        assert_eq!(
            repo.find_by_id(earlier).await.unwrap().unwrap().name,
            "second, replaced"
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_report_missing_ids() {
        let repo = InMemoryProductRepository::new();
        let missing = ObjectId::new();

        assert!(!repo.update(missing, ProductChanges::default()).await.unwrap());
        assert!(!repo.delete(missing).await.unwrap());

        let id = repo.insert(record("Lamp", "10")).await.unwrap();
        let changes = ProductChanges {
            price: Some("12".into()),
            ..Default::default()
        };
        assert!(repo.update(id, changes).await.unwrap());
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().price, "12");

        assert!(repo.delete(id).await.unwrap());
        assert!(repo.is_empty().await);
    }
}
