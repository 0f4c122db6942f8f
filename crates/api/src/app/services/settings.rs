use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinSet;

use bridgecms_auth::Action;
use bridgecms_content::{SettingValue, SettingsUpdate};
use bridgecms_infra::SettingsStore;

use super::{ServiceError, ServiceResult, require};
use crate::context::PrincipalContext;

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Every setting as a flat key → value map.
    pub async fn get_all(&self, principal: &PrincipalContext) -> ServiceResult<BTreeMap<String, SettingValue>> {
        require(principal, Action::ReadSettings)?;
        let settings = self.store.all_settings().await?;
        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// Upsert every key concurrently and wait for all of them.
    ///
    /// Nothing is written unless every key and value is valid. Writes are
    /// independent: a failed key does not undo the others, but fails the call.
    pub async fn set_many(
        &self,
        principal: &PrincipalContext,
        raw: BTreeMap<String, Value>,
    ) -> ServiceResult<usize> {
        require(principal, Action::WriteSettings)?;
        let update = SettingsUpdate::validate(raw)?;
        let count = update.len();

        let mut writes = JoinSet::new();
        for setting in update.into_settings(Utc::now()) {
            let store = self.store.clone();
            writes.spawn(async move {
                let key = setting.key.clone();
                store.upsert_setting(setting).await.map_err(|e| (key, e))
            });
        }

        let mut failed = Vec::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err((key, error))) => {
                    tracing::error!(%key, %error, "setting write failed");
                    failed.push(key);
                }
                Err(error) => {
                    tracing::error!(%error, "setting write task failed");
                    failed.push("<task>".to_string());
                }
            }
        }

        if !failed.is_empty() {
            return Err(ServiceError::internal(format!(
                "failed to write settings: {}",
                failed.join(", ")
            )));
        }

        tracing::info!(count, by = %principal.user_id(), "settings updated");
        Ok(count)
    }
}
