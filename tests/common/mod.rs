#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use lmsadm::{
    error::GatewayError,
    remote::{LocalRemote, Remote},
    types::{Entity, EntityId, Fields, ListPage, ListParams},
};
use serde_json::{Value, json};
use tempfile::TempDir;

// Local remote over a fresh temporary directory. Keep the TempDir alive for
// the duration of the test.
pub fn local_remote() -> (TempDir, LocalRemote) {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = LocalRemote::open(dir.path());
    (dir, remote)
}

pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

// Inserts courses with the given titles and statuses, returning their ids.
pub async fn seed_courses(remote: &LocalRemote, courses: &[(&str, &str)]) -> Vec<EntityId> {
    let mut ids = Vec::new();
    for (title, status) in courses {
        let payload = fields(json!({
            "title": title,
            "category": "programming",
            "status": status,
        }));
        let entity = remote
            .create("courses", &payload)
            .await
            .expect("seed course");
        ids.push(entity.id);
    }
    ids
}

// Remote that delegates to a local store but fails chosen operations,
// counts every call and records every create/update payload.
pub struct FlakyRemote {
    pub inner: LocalRemote,
    pub failing_deletes: HashSet<EntityId>,
    pub fail_writes: bool,
    pub calls: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<Fields>>>,
}

impl FlakyRemote {
    pub fn new(inner: LocalRemote) -> Self {
        Self {
            inner,
            failing_deletes: HashSet::new(),
            fail_writes: false,
            calls: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn fail_delete_of(mut self, id: impl Into<EntityId>) -> Self {
        self.failing_deletes.insert(id.into());
        self
    }

    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn record(&self, fields: &Fields) {
        self.sent.lock().unwrap().push(fields.clone());
    }

    fn unavailable() -> GatewayError {
        GatewayError::Status(503)
    }
}

#[async_trait]
impl Remote for FlakyRemote {
    async fn list(&self, collection: &str, params: &ListParams) -> Result<ListPage, GatewayError> {
        self.count();
        self.inner.list(collection, params).await
    }

    async fn fetch(&self, collection: &str, id: &EntityId) -> Result<Entity, GatewayError> {
        self.count();
        self.inner.fetch(collection, id).await
    }

    async fn create(&self, collection: &str, fields: &Fields) -> Result<Entity, GatewayError> {
        self.count();
        self.record(fields);
        if self.fail_writes {
            return Err(Self::unavailable());
        }
        self.inner.create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &EntityId,
        fields: &Fields,
    ) -> Result<Entity, GatewayError> {
        self.count();
        self.record(fields);
        if self.fail_writes {
            return Err(Self::unavailable());
        }
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &EntityId) -> Result<(), GatewayError> {
        self.count();
        if self.fail_writes || self.failing_deletes.contains(id) {
            return Err(Self::unavailable());
        }
        self.inner.delete(collection, id).await
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        self.count();
        self.inner.upload(file_name, bytes).await
    }

    fn is_local(&self) -> bool {
        true
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
