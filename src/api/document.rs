use crate::{
    config::Config,
    error::ApiError,
    model::document::{Document, DocumentStats, DocumentStatus, expiry_status},
    utils::{
        db_utils::{PageQuery, TOTAL_COUNT_HEADER},
        files::{format_file_size, public_path, remove_upload, save_upload, stored_file_name},
    },
};
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

const DOCUMENT_COLUMNS: &str = "d.id, d.employee_id, e.name AS employee_name, d.document_type, d.title, \
     d.file_name, d.upload_date, d.expiry_date, d.file_size, d.status, d.file_path";

/// Metadata accepted by `PUT /documents/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    #[schema(example = 7)]
    #[serde(deserialize_with = "crate::utils::lenient::number")]
    pub employee_id: u64,
    #[schema(example = "Contract")]
    pub document_type: String,
    #[schema(example = "Employment Contract")]
    pub title: String,
    #[schema(example = "2026-01-15", format = "date", value_type = Option<String>)]
    #[serde(default, deserialize_with = "crate::utils::lenient::optional_date")]
    pub expiry_date: Option<NaiveDate>,
}

/// Multipart body of `POST /documents`, for the OpenAPI document only.
#[allow(dead_code)]
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UploadDocumentForm {
    employee_id: u64,
    document_type: String,
    title: String,
    #[schema(format = "date")]
    expiry_date: Option<String>,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Text fields collected from the multipart form.
#[derive(Debug, Default)]
struct DocumentFields {
    employee_id: Option<String>,
    document_type: Option<String>,
    title: Option<String>,
    expiry_date: Option<String>,
}

#[derive(Debug, PartialEq)]
struct NewDocument {
    employee_id: u64,
    document_type: String,
    title: String,
    expiry_date: Option<NaiveDate>,
}

impl DocumentFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "employeeId" => self.employee_id = Some(value),
            "documentType" => self.document_type = Some(value),
            "title" => self.title = Some(value),
            "expiryDate" => self.expiry_date = Some(value),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    fn finish(self) -> Result<NewDocument, ApiError> {
        let employee_id = self
            .employee_id
            .as_deref()
            .map(str::trim)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| ApiError::bad_request("employeeId must be a positive integer"))?;

        let document_type = required(self.document_type, "documentType")?;
        let title = required(self.title, "title")?;

        let expiry_date = match self.expiry_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| ApiError::bad_request("expiryDate must be YYYY-MM-DD"))?,
            ),
        };

        Ok(NewDocument {
            employee_id,
            document_type,
            title,
            expiry_date,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::bad_request(format!("Invalid multipart request: {e}"))
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > max_bytes {
            return Err(ApiError::bad_request(format!(
                "File too large. Maximum size is {max_bytes} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Best-effort removal of a stored file; failures are only logged.
async fn discard_upload(upload_dir: PathBuf, public: String) {
    let path = public.clone();
    match web::block(move || remove_upload(&upload_dir, &path)).await {
        Ok(Ok(removed)) => debug!(file_path = %public, removed, "Stored file cleanup"),
        Ok(Err(e)) => warn!(error = %e, file_path = %public, "Stored file could not be removed"),
        Err(e) => warn!(error = %e, file_path = %public, "Stored file cleanup did not run"),
    }
}

/// List documents
#[utoipa::path(
    get,
    path = "/api/documents",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of documents with owner names", body = [Document],
            headers(("X-Total-Count" = i64, description = "Number of documents across all pages"))),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn list_documents(
    pool: web::Data<MySqlPool>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.resolve();

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents")
        .fetch_one(pool.get_ref())
        .await?;

    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents d \
         LEFT JOIN employees e ON e.id = d.employee_id \
         ORDER BY d.id ASC LIMIT ? OFFSET ?"
    );

    let documents = sqlx::query_as::<_, Document>(&sql)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, total.to_string()))
        .json(documents))
}

/// List an employee's documents
#[utoipa::path(
    get,
    path = "/api/employees/{id}/documents",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Documents of the employee, newest first", body = [Document]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn list_employee_documents(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents d \
         LEFT JOIN employees e ON e.id = d.employee_id \
         WHERE d.employee_id = ? \
         ORDER BY d.upload_date DESC, d.id DESC"
    );

    let documents = sqlx::query_as::<_, Document>(&sql)
        .bind(employee_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(documents))
}

/// Upload document
///
/// Stores the file under a generated name and derives the expiry status.
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content = UploadDocumentForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored", body = Document),
        (status = 400, description = "Missing field, bad date or file too large"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn upload_document(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut fields = DocumentFields::default();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();

        if name == "file" {
            let original = disposition
                .get_filename()
                .unwrap_or("document")
                .to_string();
            let data = read_field(&mut field, config.max_upload_bytes).await?;
            file = Some((original, data));
        } else {
            let data = read_field(&mut field, config.max_upload_bytes).await?;
            let value = String::from_utf8(data)
                .map_err(|_| ApiError::bad_request(format!("{name} must be UTF-8 text")))?;
            fields.set(&name, value);
        }
    }

    let (file_name, data) = file.ok_or_else(|| ApiError::bad_request("file is required"))?;
    let doc = fields.finish()?;

    let stored_name = stored_file_name(&file_name);
    let file_path = public_path(&config.uploads_url_prefix, &stored_name);
    let file_size = format_file_size(data.len() as u64);

    let upload_dir = PathBuf::from(&config.upload_dir);
    let dir = upload_dir.clone();
    let disk_path = web::block(move || save_upload(&dir, &stored_name, &data)).await??;
    debug!(path = %disk_path.display(), "Stored upload");

    let now = Local::now().naive_local();
    let upload_date = now.date();
    let status = expiry_status(doc.expiry_date, now);

    let result = sqlx::query(
        r#"
        INSERT INTO documents
        (employee_id, document_type, title, file_name, upload_date, expiry_date, file_size, status, file_path)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(doc.employee_id)
    .bind(&doc.document_type)
    .bind(&doc.title)
    .bind(&file_name)
    .bind(upload_date)
    .bind(doc.expiry_date)
    .bind(&file_size)
    .bind(status.to_string())
    .bind(&file_path)
    .execute(pool.get_ref())
    .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            // no row will ever point at the stored file
            discard_upload(upload_dir, file_path).await;
            return Err(e.into());
        }
    };

    let id = result.last_insert_id();
    info!(document_id = id, employee_id = doc.employee_id, %status, "Document uploaded");

    Ok(HttpResponse::Ok().json(Document {
        id,
        employee_id: doc.employee_id,
        employee_name: None,
        document_type: doc.document_type,
        title: doc.title,
        file_name,
        upload_date,
        expiry_date: doc.expiry_date,
        file_size,
        status: status.to_string(),
        file_path,
    }))
}

/// Update document metadata
///
/// Recomputes the expiry status.
#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    params(("id" = u64, Path, description = "Document ID")),
    request_body = UpdateDocument,
    responses(
        (status = 200, description = "Document updated", body = Object, example = json!({
            "id": 1,
            "employeeId": 7,
            "documentType": "Contract",
            "title": "Employment Contract",
            "expiryDate": "2026-01-15",
            "status": "Valid"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn update_document(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateDocument>,
) -> Result<HttpResponse, ApiError> {
    let document_id = path.into_inner();
    let status: DocumentStatus = expiry_status(payload.expiry_date, Local::now().naive_local());

    sqlx::query(
        r#"
        UPDATE documents
        SET employee_id = ?, document_type = ?, title = ?, expiry_date = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.employee_id)
    .bind(&payload.document_type)
    .bind(&payload.title)
    .bind(payload.expiry_date)
    .bind(status.to_string())
    .bind(document_id)
    .execute(pool.get_ref())
    .await?;

    let mut echoed = json!(payload.into_inner());
    echoed["id"] = json!(document_id);
    echoed["status"] = json!(status.to_string());

    Ok(HttpResponse::Ok().json(echoed))
}

/// Delete document
///
/// Removes the row and, best effort, the stored file.
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    params(("id" = u64, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document deleted", body = Object, example = json!({
            "message": "Document deleted",
            "id": 1
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn delete_document(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let document_id = path.into_inner();

    let file_path =
        sqlx::query_scalar::<_, String>("SELECT file_path FROM documents WHERE id = ?")
            .bind(document_id)
            .fetch_optional(pool.get_ref())
            .await?;

    sqlx::query("DELETE FROM documents WHERE id = ?")
        .bind(document_id)
        .execute(pool.get_ref())
        .await?;

    if let Some(public) = file_path {
        discard_upload(PathBuf::from(&config.upload_dir), public).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Document deleted",
        "id": document_id
    })))
}

/// Document counts per status
#[utoipa::path(
    get,
    path = "/api/documents/stats",
    responses(
        (status = 200, description = "Counts per stored status", body = DocumentStats),
        (status = 500, description = "Internal server error")
    ),
    tag = "Document"
)]
pub async fn document_stats(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let stats = sqlx::query_as::<_, DocumentStats>(
        r#"
        SELECT
            COUNT(*) AS total,
            CAST(COALESCE(SUM(status = 'Valid'), 0) AS SIGNED) AS valid,
            CAST(COALESCE(SUM(status = 'Expiring Soon'), 0) AS SIGNED) AS expiring_soon,
            CAST(COALESCE(SUM(status = 'Expired'), 0) AS SIGNED) AS expired
        FROM documents
        "#,
    )
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(stats))
}
