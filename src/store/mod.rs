//! 文档存储抽象
//!
//! 两个集合（services、bookings）以无模式 JSON 文档保存。
//! 查询描述（过滤、排序、投影）由 `query` 模块构建，由具体存储执行：
//! - `postgres::PgDocumentStore`：PostgreSQL JSONB 表
//! - `memory::MemoryDocumentStore`：进程内实现，用于测试

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 无模式文档
pub type Document = Map<String, Value>;

/// 文档中存放标识符的字段名
pub const ID_FIELD: &str = "_id";

/// 集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
}

impl Collection {
    /// 集合名，同时也是 PostgreSQL 表名
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "bookings",
        }
    }
}

/// 存储生成的文档标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for DocumentId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AppError::InvalidIdentifier(s.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 过滤条件
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// 匹配全部文档
    All,
    /// 字段等于给定字符串
    Eq { field: String, value: String },
    /// 字段包含给定子串（忽略大小写）
    ContainsIgnoreCase { field: String, needle: String },
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => {
                doc.get(field).and_then(Value::as_str) == Some(value.as_str())
            }
            Filter::ContainsIgnoreCase { field, needle } => doc
                .get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// 排序条件
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    /// 比较两个文档在排序字段上的先后
    ///
    /// 缺失/null < 数字 < 字符串 < 其他类型；升序时缺失值在前，降序时在后。
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(_) => 3,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// 投影：只返回 `_id` 和列出的字段
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn apply(&self, doc: Document) -> Document {
        doc.into_iter()
            .filter(|(key, _)| key == ID_FIELD || self.fields.iter().any(|f| f == key))
            .collect()
    }
}

/// 列表查询
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Option<Sort>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self {
            filter: Filter::All,
            sort: None,
        }
    }
}

/// 插入确认
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: DocumentId,
}

/// 部分更新确认
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<DocumentId>,
    pub upserted_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

/// 删除确认
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// 文档存储客户端
///
/// 每个操作是一次独立往返，不重试，不跨集合事务。
/// 返回的文档总是带有字符串形式的 `_id`。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 按过滤条件查询，按排序条件排序，返回全部匹配
    async fn find(&self, collection: Collection, query: &FindQuery)
        -> Result<Vec<Document>, AppError>;

    /// 按标识符查询单个文档，可选投影
    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, AppError>;

    /// 插入文档；调用方提供的 `_id` 会被忽略
    async fn insert_one(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<InsertOneResult, AppError>;

    /// `$set` 风格的部分更新：只覆盖 `set` 中的顶层字段
    async fn update_one(
        &self,
        collection: Collection,
        id: DocumentId,
        set: Document,
    ) -> Result<UpdateResult, AppError>;

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, AppError>;

    /// 连通性检查
    async fn ping(&self) -> Result<(), AppError>;
}
