//! Category catalog with the referential-constraint delete fallback

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::BackendApi;
use crate::domain::{Category, CategoryId};
use crate::error::{ClientError, Result};

use super::catalog::{CatalogEntity, CatalogStore};

/// Category catalog.
///
/// Identical to the other catalogs except for delete: the backend may
/// reject a category delete while event-category links still reference
/// it. The client treats that rejection as a cue to remove the
/// dependent links and retry the delete exactly once; a second failure
/// is surfaced. The backend constraint remains the enforcement point,
/// the fallback only smooths the common case.
pub struct CategoryStore {
    inner: CatalogStore<Category>,
}

impl CategoryStore {
    pub fn new(api: Arc<dyn BackendApi>) -> Self {
        Self {
            inner: CatalogStore::new(api),
        }
    }

    pub async fn items(&self) -> Vec<Category> {
        self.inner.items().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.last_error().await
    }

    pub async fn fetch_all(&self) -> Result<Vec<Category>> {
        self.inner.fetch_all().await
    }

    pub async fn add(&self, name: &str) -> Result<Category> {
        self.inner.add(serde_json::json!({ "name": name })).await
    }

    pub async fn update(&self, id: CategoryId, name: &str) -> Result<Category> {
        self.inner
            .update(id.as_i64(), serde_json::json!({ "name": name }))
            .await
    }

    /// Delete a category, falling back to link removal on a
    /// referential-constraint rejection.
    pub async fn delete(&self, id: CategoryId) -> Result<()> {
        let api = self.inner.api().clone();

        match api.delete_catalog(Category::ROUTE, id.as_i64()).await {
            Ok(()) => {
                self.inner.evict(id.as_i64()).await;
                return Ok(());
            }
            Err(err) if err.is_referential_constraint() => {
                warn!(category = %id, "category delete blocked by dependent links; removing links and retrying");
            }
            Err(err) => return Err(err.into()),
        }

        api.delete_event_categories_for(id).await?;

        match api.delete_catalog(Category::ROUTE, id.as_i64()).await {
            Ok(()) => {
                self.inner.evict(id.as_i64()).await;
                info!(category = %id, "category deleted after removing dependent links");
                Ok(())
            }
            Err(err) => Err(ClientError::ReferentialConstraint {
                category_id: id,
                message: err.user_message(),
            }),
        }
    }
}
