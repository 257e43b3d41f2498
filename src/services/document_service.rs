use crate::dto::portal_dto::ReviewDocumentPayload;
use crate::error::{Error, Result};
use crate::models::student_document::{DocumentStatus, StudentDocument};
use sqlx::PgPool;
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, student_id, doc_type, file_path, original_name, status, \
     remarks, reviewed_by, reviewed_at, created_at";

#[derive(Clone)]
pub struct DocumentService {
    pool: PgPool,
}

impl DocumentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        student_id: Uuid,
        doc_type: &str,
        file_path: &str,
        original_name: Option<&str>,
    ) -> Result<StudentDocument> {
        let document = sqlx::query_as::<_, StudentDocument>(&format!(
            r#"
            INSERT INTO student_documents (student_id, doc_type, file_path, original_name, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(student_id)
        .bind(doc_type)
        .bind(file_path)
        .bind(original_name)
        .bind(DocumentStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(document_id = %document.id, doc_type = doc_type, "Document uploaded");
        Ok(document)
    }

    pub async fn review(
        &self,
        admin_id: Uuid,
        id: Uuid,
        payload: ReviewDocumentPayload,
    ) -> Result<StudentDocument> {
        sqlx::query_as::<_, StudentDocument>(&format!(
            r#"
            UPDATE student_documents
            SET status = $2, remarks = COALESCE($3, remarks), reviewed_by = $4, reviewed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(payload.status.as_str())
        .bind(&payload.remarks)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Document not found.".into()))
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<StudentDocument>> {
        let items = sqlx::query_as::<_, StudentDocument>(&format!(
            "SELECT {} FROM student_documents WHERE student_id = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn list_all(&self) -> Result<Vec<StudentDocument>> {
        let items = sqlx::query_as::<_, StudentDocument>(&format!(
            "SELECT {} FROM student_documents ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
