//! 进程内文档存储
//! 与 PostgreSQL 实现语义一致，用于测试和本地演示

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, FindQuery, InsertOneResult,
    Projection, UpdateResult, ID_FIELD,
};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type Collections = HashMap<Collection, Vec<(DocumentId, Document)>>;

#[derive(Default)]
pub struct MemoryDocumentStore {
    // 按插入顺序保存
    collections: Mutex<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

fn with_id(id: DocumentId, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<Document>, AppError> {
        let collections = self.lock()?;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .into_iter()
            .flatten()
            .filter(|(_, doc)| query.filter.matches(doc))
            .map(|(id, doc)| with_id(*id, doc.clone()))
            .collect();

        if let Some(sort) = &query.sort {
            docs.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, AppError> {
        let collections = self.lock()?;
        let doc = collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(doc_id, doc)| with_id(*doc_id, doc.clone()));

        Ok(doc.map(|doc| match projection {
            Some(projection) => projection.apply(doc),
            None => doc,
        }))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, AppError> {
        document.remove(ID_FIELD);
        let id = DocumentId::new();

        self.lock()?
            .entry(collection)
            .or_default()
            .push((id, document));

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        mut set: Document,
    ) -> Result<UpdateResult, AppError> {
        set.remove(ID_FIELD);

        let mut collections = self.lock()?;
        let Some((_, doc)) = collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| *doc_id == id))
        else {
            return Ok(UpdateResult::new(0, 0));
        };

        let unchanged = set.iter().all(|(key, value)| doc.get(key) == Some(value));
        if unchanged {
            return Ok(UpdateResult::new(1, 0));
        }

        doc.extend(set);
        Ok(UpdateResult::new(1, 1))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, AppError> {
        let mut collections = self.lock()?;
        let deleted_count = match collections.get_mut(&collection) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|(doc_id, _)| *doc_id != id);
                (before - docs.len()) as u64
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}
