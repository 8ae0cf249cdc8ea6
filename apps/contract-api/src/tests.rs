//! HTTP tests for the contract API
//!
//! Every test runs the full router against an in-memory SQLite database, a
//! temporary upload folder and an extractive-only summarizer.

#[cfg(test)]
mod api_tests {
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use contract_nlp::ContractAnalyzer;
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use summarizer_core::ContractSummarizer;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use crate::build_router;
    use crate::config::DEFAULT_MAX_CONTENT_LENGTH;
    use crate::models::*;
    use crate::state::{AppState, SharedState};

    const CONTRACT_PARAGRAPHS: &[&str] = &[
        "EMPLOYMENT CONTRACT",
        "This Employment Contract is entered into between TechCorp Cameroon Ltd., a company incorporated under the laws of Cameroon (the \"Company\"), and John Doe (the \"Employee\").",
        "1. POSITION AND DUTIES",
        "The Employee is appointed as Senior Software Developer and shall report to the Chief Technology Officer.",
        "2. COMPENSATION",
        "Base Salary: 2,500,000 FCFA per month, payable on the last working day of each month.",
        "Benefits: Health insurance, transport allowance (150,000 FCFA/month)",
        "3. WORKING HOURS",
        "The Employee shall work 40 hours per week from Monday to Friday.",
        "4. TERMINATION",
        "Notice Period: 30 days written notice required from either party.",
        "Start Date: January 15, 2024",
    ];

    struct TestApp {
        server: TestServer,
        state: SharedState,
        // Keeps the upload folder alive for the duration of the test
        uploads: TempDir,
    }

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| {
                let escaped = p.replace('&', "&amp;").replace('"', "&quot;");
                format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", escaped)
            })
            .collect();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            zip.start_file("word/document.xml", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    /// A page that draws text with a font it never declares
    fn build_fontless_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let content = b"BT /F1 12 Tf 72 720 Td (Base Salary) Tj ET".to_vec();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    /// Put a contract back into `processing` as a cut-off generation leaves it
    async fn leave_processing(app: &TestApp, contract_id: i64, started_at: Option<String>) {
        sqlx::query(
            "UPDATE contracts SET status = 'processing', processing_started_at = ? WHERE id = ?",
        )
        .bind(started_at)
        .bind(contract_id)
        .execute(&app.state.db)
        .await
        .unwrap();
    }

    async fn create_test_app_with_timeout(summary_timeout: Duration) -> TestApp {
        let uploads = tempfile::tempdir().unwrap();
        let db = AppState::connect("sqlite::memory:", 1).await.unwrap();

        let state = Arc::new(AppState {
            db,
            summarizer: Arc::new(ContractSummarizer::extractive_only()),
            analyzer: ContractAnalyzer::new(),
            upload_dir: uploads.path().to_path_buf(),
            summary_timeout,
            max_upload_bytes: DEFAULT_MAX_CONTENT_LENGTH,
        });

        TestApp {
            server: TestServer::new(build_router(state.clone())).unwrap(),
            state,
            uploads,
        }
    }

    async fn create_test_app() -> TestApp {
        create_test_app_with_timeout(Duration::from_secs(30)).await
    }

    fn contract_form(file_name: &str, bytes: Vec<u8>) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_type("application/octet-stream"),
        )
    }

    async fn upload_sample(app: &TestApp) -> UploadResponse {
        let response = app
            .server
            .post("/api/contracts/upload")
            .multipart(contract_form("offer.docx", build_docx(CONTRACT_PARAGRAPHS)))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<UploadResponse>()
    }

    async fn generate(
        app: &TestApp,
        contract_id: i64,
        summary_type: &str,
    ) -> GenerateSummaryResponse {
        let response = app
            .server
            .post(&format!("/api/summaries/generate/{}", contract_id))
            .json(&json!({ "type": summary_type }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<GenerateSummaryResponse>()
    }

    async fn contract_status(app: &TestApp, contract_id: i64) -> String {
        let response = app
            .server
            .get(&format!("/api/contracts/{}", contract_id))
            .await;
        response.assert_status_ok();
        response.json::<ContractDetailResponse>().contract.status
    }

    // ============================================================
    // Health and model
    // ============================================================

    #[tokio::test]
    async fn test_health_returns_200() {
        let app = create_test_app().await;
        let response = app.server.get("/health").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_loaded"], false);
    }

    #[tokio::test]
    async fn test_model_info_without_model() {
        let app = create_test_app().await;
        let response = app.server.get("/api/model/info").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["is_loaded"], false);
        assert_eq!(body["device"], "cpu");
    }

    #[test]
    fn test_describe_model_names_extractive_fallback() {
        let info = ContractSummarizer::extractive_only().model_info();
        assert_eq!(
            crate::describe_model(&info),
            "model=extractive device=cpu loaded=false"
        );
    }

    // ============================================================
    // Contracts
    // ============================================================

    #[tokio::test]
    async fn test_upload_extracts_entities() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        assert_eq!(upload.message, "Contract uploaded successfully");
        assert_eq!(upload.language, "en");
        assert!(upload.entities_found > 0);
        assert_eq!(upload.page_count, None);

        // Stored under a generated name inside the upload folder
        let stored: Vec<_> = std::fs::read_dir(app.uploads.path()).unwrap().collect();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_get_contract_includes_salary_entity() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let response = app
            .server
            .get(&format!("/api/contracts/{}", upload.contract_id))
            .await;
        response.assert_status_ok();

        let detail: ContractDetailResponse = response.json();
        assert_eq!(detail.contract.file_name, "offer.docx");
        assert_eq!(detail.contract.status, "pending");
        assert_eq!(detail.entities.len(), upload.entities_found);
        assert!(detail
            .entities
            .iter()
            .any(|e| e.entity_type == "SALARY" && e.entity_value.contains("2,500,000 FCFA")));
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let app = create_test_app().await;
        let response = app
            .server
            .post("/api/contracts/upload")
            .multipart(contract_form("notes.txt", b"plain text".to_vec()))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "UNSUPPORTED_FILE_TYPE");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let app = create_test_app().await;
        let response = app
            .server
            .post("/api/contracts/upload")
            .multipart(MultipartForm::new().add_text("user_id", "1"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_corrupt_upload_marks_contract_failed() {
        let app = create_test_app().await;
        let response = app
            .server
            .post("/api/contracts/upload")
            .multipart(contract_form("broken.docx", b"not a zip archive".to_vec()))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "EXTRACTION_FAILED");

        let list: ContractListResponse = app.server.get("/api/contracts").await.json();
        assert_eq!(list.contracts.len(), 1);
        assert_eq!(list.contracts[0].status, "failed");

        // Retrying generation fails extraction again and leaves it failed
        let retry = app
            .server
            .post(&format!("/api/summaries/generate/{}", list.contracts[0].id))
            .await;
        retry.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(contract_status(&app, list.contracts[0].id).await, "failed");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_an_extraction_failure() {
        let app = create_test_app().await;
        let response = app
            .server
            .post("/api/contracts/upload")
            .multipart(contract_form("contract.pdf", build_fontless_pdf()))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["code"], "EXTRACTION_FAILED");

        let list: ContractListResponse = app.server.get("/api/contracts").await.json();
        assert_eq!(list.contracts[0].status, "failed");

        // Generation reads the same file and fails the same way
        let retry = app
            .server
            .post(&format!("/api/summaries/generate/{}", list.contracts[0].id))
            .await;
        retry.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(contract_status(&app, list.contracts[0].id).await, "failed");
    }

    #[tokio::test]
    async fn test_list_contracts_filters_by_user() {
        let app = create_test_app().await;
        upload_sample(&app).await;

        let form =
            contract_form("other.docx", build_docx(CONTRACT_PARAGRAPHS)).add_text("user_id", "7");
        app.server
            .post("/api/contracts/upload")
            .multipart(form)
            .await
            .assert_status(StatusCode::CREATED);

        let default_user: ContractListResponse = app.server.get("/api/contracts").await.json();
        assert_eq!(default_user.contracts.len(), 1);
        assert_eq!(default_user.contracts[0].file_name, "offer.docx");

        let user_seven: ContractListResponse = app
            .server
            .get("/api/contracts")
            .add_query_param("user_id", 7)
            .await
            .json();
        assert_eq!(user_seven.contracts.len(), 1);
        assert_eq!(user_seven.contracts[0].user_id, 7);
    }

    #[tokio::test]
    async fn test_missing_contract_is_404() {
        let app = create_test_app().await;
        let response = app.server.get("/api/contracts/999").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["code"], "CONTRACT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_contract_removes_everything() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let generated = generate(&app, upload.contract_id, "brief").await;

        let response = app
            .server
            .delete(&format!("/api/contracts/{}", upload.contract_id))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Contract deleted successfully"
        );

        assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
        app.server
            .get(&format!("/api/contracts/{}", upload.contract_id))
            .await
            .assert_status_not_found();
        app.server
            .get(&format!("/api/summaries/{}", generated.summary.id))
            .await
            .assert_status_not_found();
    }

    // ============================================================
    // Summaries
    // ============================================================

    #[tokio::test]
    async fn test_generate_extractive_summary() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let generated = generate(&app, upload.contract_id, "standard").await;

        assert_eq!(generated.summary.contract_id, upload.contract_id);
        assert_eq!(generated.summary.summary_type, "standard");
        assert_eq!(generated.summary.model_used, "extractive");
        assert!(!generated.summary.approved);
        assert!(!generated.summary.raw_content.is_empty());
        assert!(generated.summary.content.starts_with("## "));
        assert!(generated.summary.confidence_score <= 0.95);
        assert_eq!(generated.model_info.target_words, 400);
        assert!(!generated.model_info.timed_out);

        assert_eq!(contract_status(&app, upload.contract_id).await, "completed");
    }

    #[tokio::test]
    async fn test_generate_defaults_to_standard() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let response = app
            .server
            .post(&format!("/api/summaries/generate/{}", upload.contract_id))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(
            response.json::<GenerateSummaryResponse>().summary.summary_type,
            "standard"
        );
    }

    #[tokio::test]
    async fn test_regenerate_replaces_summary() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let first = generate(&app, upload.contract_id, "brief").await;
        let second = generate(&app, upload.contract_id, "brief").await;
        assert_eq!(first.summary.id, second.summary.id);

        generate(&app, upload.contract_id, "detailed").await;

        let list: SummaryListResponse = app
            .server
            .get(&format!("/api/summaries/contract/{}", upload.contract_id))
            .await
            .json();
        let types: Vec<&str> = list.summaries.iter().map(|s| s.summary_type.as_str()).collect();
        assert_eq!(types, vec!["brief", "detailed"]);
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_type() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let response = app
            .server
            .post(&format!("/api/summaries/generate/{}", upload.contract_id))
            .json(&json!({ "type": "verbose" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        // Validation happens before the contract is touched
        assert_eq!(contract_status(&app, upload.contract_id).await, "pending");
    }

    #[tokio::test]
    async fn test_generate_for_missing_contract() {
        let app = create_test_app().await;
        let response = app.server.post("/api/summaries/generate/42").await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_interrupted_generation_can_be_retried() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        // Row written before the server went down, no start time recorded
        leave_processing(&app, upload.contract_id, None).await;
        let generated = generate(&app, upload.contract_id, "brief").await;
        assert_eq!(generated.summary.contract_id, upload.contract_id);
        assert_eq!(contract_status(&app, upload.contract_id).await, "completed");

        // Started long before the timeout window
        let long_ago = Some("2020-01-01T00:00:00+00:00".to_string());
        leave_processing(&app, upload.contract_id, long_ago).await;
        generate(&app, upload.contract_id, "brief").await;
        assert_eq!(contract_status(&app, upload.contract_id).await, "completed");
    }

    #[tokio::test]
    async fn test_generation_in_flight_is_a_conflict() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;

        let just_now = Some(chrono::Utc::now().to_rfc3339());
        leave_processing(&app, upload.contract_id, just_now).await;
        let response = app
            .server
            .post(&format!("/api/summaries/generate/{}", upload.contract_id))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(contract_status(&app, upload.contract_id).await, "processing");
    }

    #[tokio::test]
    async fn test_startup_fails_contracts_left_processing() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let just_now = Some(chrono::Utc::now().to_rfc3339());
        leave_processing(&app, upload.contract_id, just_now).await;

        let recovered = AppState::recover_interrupted(&app.state.db).await.unwrap();
        assert_eq!(recovered, 1);
        assert_eq!(contract_status(&app, upload.contract_id).await, "failed");

        // And the contract is retryable afterwards
        generate(&app, upload.contract_id, "standard").await;
        assert_eq!(contract_status(&app, upload.contract_id).await, "completed");
    }

    #[tokio::test]
    async fn test_zero_timeout_still_returns_summary() {
        let app = create_test_app_with_timeout(Duration::ZERO).await;
        let upload = upload_sample(&app).await;

        let generated = generate(&app, upload.contract_id, "brief").await;
        assert_eq!(generated.summary.model_used, "extractive");
        assert!(!generated.summary.content.is_empty());
        assert_eq!(contract_status(&app, upload.contract_id).await, "completed");
    }

    #[tokio::test]
    async fn test_get_summary_with_contract() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let generated = generate(&app, upload.contract_id, "brief").await;

        let response = app
            .server
            .get(&format!("/api/summaries/{}", generated.summary.id))
            .await;
        response.assert_status_ok();

        let detail: SummaryDetailResponse = response.json();
        assert_eq!(detail.summary.id, generated.summary.id);
        assert_eq!(
            detail.contract.map(|c| c.id),
            Some(upload.contract_id)
        );
    }

    #[tokio::test]
    async fn test_approve_summary() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let generated = generate(&app, upload.contract_id, "brief").await;

        let response = app
            .server
            .put(&format!("/api/summaries/{}/approve", generated.summary.id))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<MessageResponse>().message,
            "Summary approved successfully"
        );

        let detail: SummaryDetailResponse = app
            .server
            .get(&format!("/api/summaries/{}", generated.summary.id))
            .await
            .json();
        assert!(detail.summary.approved);

        app.server
            .put("/api/summaries/999/approve")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_feedback_is_audited() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let generated = generate(&app, upload.contract_id, "brief").await;

        let response = app
            .server
            .post(&format!("/api/summaries/{}/feedback", generated.summary.id))
            .json(&json!({ "feedback": "Missing the probation clause", "rating": 3 }))
            .await;
        response.assert_status_ok();

        let audit: AuditListResponse = app
            .server
            .get("/api/audit")
            .add_query_param("resource_type", "summary")
            .add_query_param("resource_id", generated.summary.id)
            .await
            .json();
        let feedback = audit
            .logs
            .iter()
            .find(|l| l.action == "submit_feedback")
            .unwrap();
        assert_eq!(
            feedback.details.as_deref(),
            Some("Feedback: Missing the probation clause, Rating: 3")
        );
    }

    #[tokio::test]
    async fn test_feedback_rejects_out_of_range_rating() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        let generated = generate(&app, upload.contract_id, "brief").await;

        let response = app
            .server
            .post(&format!("/api/summaries/{}/feedback", generated.summary.id))
            .json(&json!({ "feedback": "great", "rating": 9 }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // ============================================================
    // Audit
    // ============================================================

    #[tokio::test]
    async fn test_audit_trail_newest_first() {
        let app = create_test_app().await;
        let upload = upload_sample(&app).await;
        generate(&app, upload.contract_id, "brief").await;

        let audit: AuditListResponse = app.server.get("/api/audit").await.json();
        let actions: Vec<&str> = audit.logs.iter().map(|l| l.action.as_str()).collect();
        assert_eq!(actions, vec!["generate_summary", "upload_contract"]);

        let contracts_only: AuditListResponse = app
            .server
            .get("/api/audit")
            .add_query_param("resource_type", "contract")
            .await
            .json();
        assert_eq!(contracts_only.logs.len(), 1);
        assert_eq!(contracts_only.logs[0].resource_id, Some(upload.contract_id));
        assert_eq!(contracts_only.logs[0].user_id, Some(1));
        // No peer address under the test transport
        assert_eq!(contracts_only.logs[0].ip_address, None);
    }
}
