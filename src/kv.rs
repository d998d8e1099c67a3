//! Small key/value store used for operational state that the mobile app
//! previously kept in ambient globals (last issued order number, last
//! selected group). Callers receive an explicit handle instead of reaching
//! for module-level state.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::DbPool;
use crate::entities::app_setting::{self, Entity as AppSetting};
use crate::errors::ServiceError;

/// Key under which the last issued order number is stored.
pub const LAST_ORDER_NUMBER_KEY: &str = "orders.last_order_number";

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError>;
}

/// Database-backed store over the `app_settings` table.
#[derive(Clone)]
pub struct DbKvStore {
    db: Arc<DbPool>,
}

impl DbKvStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KvStore for DbKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let row = AppSetting::find_by_id(key.to_string())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        let existing = AppSetting::find_by_id(key.to_string())
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        match existing {
            Some(row) => {
                let mut active: app_setting::ActiveModel = row.into();
                active.value = Set(value.to_string());
                active.updated_at = Set(Utc::now());
                active.update(&*self.db).await.map_err(ServiceError::db_error)?;
            }
            None => {
                let row = app_setting::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(Utc::now()),
                };
                row.insert(&*self.db).await.map_err(ServiceError::db_error)?;
            }
        }

        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_overwrites_on_set() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get(LAST_ORDER_NUMBER_KEY).await.unwrap(), None);

        store.set(LAST_ORDER_NUMBER_KEY, "#1001").await.unwrap();
        store.set(LAST_ORDER_NUMBER_KEY, "#1002").await.unwrap();
        assert_eq!(
            store.get(LAST_ORDER_NUMBER_KEY).await.unwrap().as_deref(),
            Some("#1002")
        );
    }
}
