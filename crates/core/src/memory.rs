//! In-memory ObjectStore used by unit tests

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};
use crate::traits::{ListOptions, ObjectReader, ObjectStore};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Buckets of objects kept in memory; pages are served in insertion order
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    buckets: Mutex<BTreeMap<String, Vec<(String, StoredObject)>>>,
}

impl MemoryStore {
    pub(crate) fn with_bucket(self, bucket: &str) -> Self {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default();
        self
    }

    pub(crate) fn insert(&self, bucket: &str, object: &str, data: &[u8]) {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets.entry(bucket.to_string()).or_default();
        objects.retain(|(name, _)| name != object);
        objects.push((
            object.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        ));
    }

    pub(crate) fn content_type(&self, bucket: &str, object: &str) -> Option<String> {
        self.find(bucket, object).map(|o| o.content_type)
    }

    fn find(&self, bucket: &str, object: &str) -> Option<StoredObject> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)?
            .iter()
            .find(|(name, _)| name == object)
            .map(|(_, o)| o.clone())
    }

    fn not_found(bucket: &str, object: &str) -> Error {
        Error::ObjectNotFound(format!("{bucket}/{object}"))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_page(&self, bucket: &str, options: ListOptions) -> Result<Vec<String>> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| Error::List(format!("bucket not found: {bucket}")))?;
        let start = match &options.marker {
            Some(marker) => objects
                .iter()
                .position(|(name, _)| name == marker)
                .map_or(objects.len(), |i| i + 1),
            None => 0,
        };
        let limit = options.limit.map_or(usize::MAX, |l| l as usize);
        Ok(objects
            .iter()
            .skip(start)
            .take(limit)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn open_object(&self, bucket: &str, object: &str) -> Result<ObjectReader> {
        let stored = self
            .find(bucket, object)
            .ok_or_else(|| Self::not_found(bucket, object))?;
        Ok(Box::new(std::io::Cursor::new(stored.data)))
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        mut body: ObjectReader,
        content_type: &str,
    ) -> Result<()> {
        if !self.buckets.lock().unwrap().contains_key(bucket) {
            return Err(Error::StorageWrite(format!("bucket not found: {bucket}")));
        }
        let mut data = Vec::new();
        body.read_to_end(&mut data)
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        self.insert(bucket, object, &data);
        let mut buckets = self.buckets.lock().unwrap();
        if let Some((_, stored)) = buckets
            .get_mut(bucket)
            .and_then(|objects| objects.iter_mut().find(|(name, _)| name == object))
        {
            stored.content_type = content_type.to_string();
        }
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, object: &str) -> Result<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Self::not_found(bucket, object))?;
        let before = objects.len();
        objects.retain(|(name, _)| name != object);
        if objects.len() == before {
            return Err(Self::not_found(bucket, object));
        }
        Ok(())
    }

    async fn head_object(&self, bucket: &str, object: &str) -> Result<HashMap<String, String>> {
        let stored = self
            .find(bucket, object)
            .ok_or_else(|| Self::not_found(bucket, object))?;
        Ok(HashMap::from([
            ("content-length".to_string(), stored.data.len().to_string()),
            ("content-type".to_string(), stored.content_type),
            ("etag".to_string(), format!("{:x}", stored.data.len())),
            ("x-trans-id".to_string(), "tx0".to_string()),
            ("x-object-meta-owner".to_string(), "demo".to_string()),
        ]))
    }
}
