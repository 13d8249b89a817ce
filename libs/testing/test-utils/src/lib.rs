//! Shared test utilities for domain testing
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic test data (always available)
//! - `assertions`: assertion helpers (always available)
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!     let db = mongo.database(&builder.database_name());
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Deterministic test data derived from a seed.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the hash of the test name, so each test gets its own data.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// `test-{prefix}-{seed}-{suffix}`
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("product", "main"), "test-product-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// Database name private to this builder's seed
    pub fn database_name(&self) -> String {
        format!("test_{}", self.seed)
    }

    /// A positive amount with two decimals, between `1.00` and `999.99`.
    ///
    /// Different `index` values give different amounts for the same seed.
    pub fn amount(&self, index: u64) -> String {
        let cents = self.seed.wrapping_add(index.wrapping_mul(7_919)) % 99_900 + 100;
        format!("{}.{:02}", cents / 100, cents % 100)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Unwrap an `Option` with a readable failure message
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that an error's `Display` output contains `needle`
    pub fn assert_err_contains<T: std::fmt::Debug, E: std::fmt::Display>(
        result: Result<T, E>,
        needle: &str,
    ) {
        match result {
            Ok(value) => panic!("expected an error containing {needle:?}, got Ok({value:?})"),
            Err(e) => assert!(
                e.to_string().contains(needle),
                "expected error containing {needle:?}, got {e}"
            ),
        }
    }
}
