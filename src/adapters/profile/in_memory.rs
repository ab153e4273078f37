//! In-memory profile store.
//!
//! Holds profile documents in a map keyed by record id. Used by tests and
//! local runs without a database; supports failure injection.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ProfileRecordId, UserId};
use crate::ports::{PlanFields, ProfileHandle, ProfileStore};

/// A stored profile document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProfile {
    pub user_id: UserId,
    pub fields: PlanFields,
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    profiles: BTreeMap<ProfileRecordId, StoredProfile>,
    next_record: u64,
    fail_reads: bool,
    fail_writes: bool,
    find_calls: usize,
    update_calls: usize,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a profile with the given plan fields, as registration would.
    pub fn insert(
        &self,
        user_id: UserId,
        fields: PlanFields,
    ) -> Result<ProfileRecordId, DomainError> {
        let mut state = self.lock();
        state.next_record += 1;
        let record_id = ProfileRecordId::new(format!("profile-{}", state.next_record))?;
        state
            .profiles
            .insert(record_id.clone(), StoredProfile { user_id, fields });
        Ok(record_id)
    }

    /// Insert a freshly registered profile on no plan.
    pub fn register(&self, user_id: UserId) -> Result<ProfileRecordId, DomainError> {
        self.insert(
            user_id,
            PlanFields {
                subscription_plan: "none".to_string(),
                room_limit: 0,
            },
        )
    }

    pub fn get(&self, record_id: &ProfileRecordId) -> Option<StoredProfile> {
        self.lock().profiles.get(record_id).cloned()
    }

    /// All profiles stored for an identity.
    pub fn profiles_for(&self, user_id: &UserId) -> Vec<StoredProfile> {
        self.lock()
            .profiles
            .values()
            .filter(|p| &p.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn find_calls(&self) -> usize {
        self.lock().find_calls
    }

    pub fn update_calls(&self) -> usize {
        self.lock().update_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_by_identity(&self, user_id: &UserId) -> Result<Vec<ProfileHandle>, DomainError> {
        let mut state = self.lock();
        state.find_calls += 1;
        if state.fail_reads {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Profile store unavailable",
            ));
        }

        Ok(state
            .profiles
            .iter()
            .filter(|(_, p)| &p.user_id == user_id)
            .map(|(record_id, p)| ProfileHandle {
                record_id: record_id.clone(),
                user_id: p.user_id.clone(),
            })
            .collect())
    }

    async fn update_plan_fields(
        &self,
        handle: &ProfileHandle,
        fields: &PlanFields,
    ) -> Result<(), DomainError> {
        let mut state = self.lock();
        state.update_calls += 1;
        if state.fail_writes {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "Profile store rejected the write",
            ));
        }

        let profile = state.profiles.get_mut(&handle.record_id).ok_or_else(|| {
            DomainError::new(ErrorCode::ProfileNotFound, "Profile not found")
                .with_detail("record_id", handle.record_id.as_str())
        })?;
        profile.fields = fields.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn finds_only_matching_identity() {
        let store = InMemoryProfileStore::new();
        store.register(user("u1")).unwrap();
        store.register(user("u2")).unwrap();

        let handles = store.find_by_identity(&user("u1")).await.unwrap();

        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].user_id, user("u1"));
    }

    #[tokio::test]
    async fn update_overwrites_plan_fields() {
        let store = InMemoryProfileStore::new();
        let record_id = store.register(user("u1")).unwrap();
        let handle = ProfileHandle {
            record_id: record_id.clone(),
            user_id: user("u1"),
        };
        let fields = PlanFields {
            subscription_plan: "com.zthreesolutions.tolerancetracker.room02".to_string(),
            room_limit: 2,
        };

        store.update_plan_fields(&handle, &fields).await.unwrap();

        assert_eq!(store.get(&record_id).unwrap().fields, fields);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_not_found() {
        let store = InMemoryProfileStore::new();
        let handle = ProfileHandle {
            record_id: ProfileRecordId::new("missing").unwrap(),
            user_id: user("u1"),
        };
        let fields = PlanFields {
            subscription_plan: "none".to_string(),
            room_limit: 0,
        };

        let err = store.update_plan_fields(&handle, &fields).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ProfileNotFound);
    }

    #[tokio::test]
    async fn injected_failures_are_counted() {
        let store = InMemoryProfileStore::new();
        store.fail_reads(true);

        assert!(store.find_by_identity(&user("u1")).await.is_err());
        assert_eq!(store.find_calls(), 1);
        assert_eq!(store.update_calls(), 0);
    }
}
