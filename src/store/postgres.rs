//! PostgreSQL 文档存储
//! 每个集合一张表: `(id UUID PRIMARY KEY, doc JSONB, created_at TIMESTAMPTZ)`

use super::{
    Collection, DeleteResult, Document, DocumentId, DocumentStore, Filter, FindQuery,
    InsertOneResult, Projection, SortDirection, UpdateResult, ID_FIELD,
};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc: Json<Document>,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        let mut doc = self.doc.0;
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        doc
    }
}

/// 把子串转义为 ILIKE 模式
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// 排序键：先按类型排名，再按同类型的值
///
/// 排名与 `Sort::compare` 一致：缺失/null < 数字 < 字符串 < 其他。
/// jsonb 自身的顺序把字符串排在数字前，不能直接使用。
/// 字符串按字节序（COLLATE "C"）比较。
fn push_sort_keys(
    builder: &mut QueryBuilder<'_, Postgres>,
    field: &str,
    direction: SortDirection,
) {
    let order = match direction {
        SortDirection::Ascending => " ASC, ",
        SortDirection::Descending => " DESC, ",
    };

    builder
        .push("CASE COALESCE(jsonb_typeof(doc -> ")
        .push_bind(field.to_string())
        .push("), 'null') WHEN 'null' THEN 0 WHEN 'number' THEN 1 WHEN 'string' THEN 2 ELSE 3 END")
        .push(order);

    builder
        .push("CASE WHEN jsonb_typeof(doc -> ")
        .push_bind(field.to_string())
        .push(") = 'number' THEN (doc ->> ")
        .push_bind(field.to_string())
        .push(")::numeric END")
        .push(order);

    builder
        .push("CASE WHEN jsonb_typeof(doc -> ")
        .push_bind(field.to_string())
        .push(") = 'string' THEN doc ->> ")
        .push_bind(field.to_string())
        .push(" END COLLATE \"C\"")
        .push(order);
}

pub struct PgDocumentStore {
    db: PgPool,
}

impl PgDocumentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<Document>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT id, doc FROM ");
        builder.push(collection.name());

        match &query.filter {
            Filter::All => {}
            Filter::Eq { field, value } => {
                builder
                    .push(" WHERE doc -> ")
                    .push_bind(field.clone())
                    .push(" = to_jsonb(")
                    .push_bind(value.clone())
                    .push("::text)");
            }
            Filter::ContainsIgnoreCase { field, needle } => {
                builder
                    .push(" WHERE doc ->> ")
                    .push_bind(field.clone())
                    .push(" ILIKE ")
                    .push_bind(like_pattern(needle))
                    .push(" ESCAPE '\\'");
            }
        }

        builder.push(" ORDER BY ");
        if let Some(sort) = &query.sort {
            push_sort_keys(&mut builder, &sort.field, sort.direction);
        }
        builder.push("created_at");

        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(DocumentRow::into_document).collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: DocumentId,
        projection: Option<&Projection>,
    ) -> Result<Option<Document>, AppError> {
        let sql = format!("SELECT id, doc FROM {} WHERE id = $1", collection.name());
        let row = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|row| {
            let doc = row.into_document();
            match projection {
                Some(projection) => projection.apply(doc),
                None => doc,
            }
        }))
    }

    async fn insert_one(
        &self,
        collection: Collection,
        mut document: Document,
    ) -> Result<InsertOneResult, AppError> {
        document.remove(ID_FIELD);
        let id = DocumentId::new();

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2)", collection.name());
        sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(&document))
            .execute(&self.db)
            .await?;

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

        // 已包含相同值的文档算匹配但不算修改
        let sql = format!(
            r#"
            WITH target AS (
                SELECT id, doc FROM {table} WHERE id = $1
            ),
            updated AS (
                UPDATE {table} AS t
                SET doc = t.doc || $2
                FROM target
                WHERE t.id = target.id AND NOT (target.doc @> $2)
                RETURNING t.id
            )
            SELECT
                (SELECT COUNT(*) FROM target) AS matched,
                (SELECT COUNT(*) FROM updated) AS modified
            "#,
            table = collection.name()
        );

        let (matched, modified) = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(id.as_uuid())
            .bind(Json(&set))
            .fetch_one(&self.db)
            .await?;

        Ok(UpdateResult::new(matched as u64, modified as u64))
    }

    async fn delete_one(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<DeleteResult, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", collection.name());
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&self.db)
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
