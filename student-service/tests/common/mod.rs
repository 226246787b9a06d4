#![allow(dead_code)]

use secrecy::Secret;
use serde_json::json;
use student_service::config::{Config, DatabaseConfig, ServerConfig, StorageConfig};
use student_service::Application;

pub const ADMIN_USER_ID: &str = "admin";

/// One application instance bound to an ephemeral port, talking to a
/// uniquely named test database that `cleanup` drops afterwards.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub db: mongodb::Database,
    _upload_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mongo_uri = std::env::var("TEST_MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = format!("student_test_{}", uuid::Uuid::new_v4().simple());
        let upload_dir = tempfile::tempdir().expect("Failed to create upload tempdir");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new(mongo_uri.clone()),
                db_name: db_name.clone(),
            },
            storage: StorageConfig {
                upload_dir: upload_dir.path().to_path_buf(),
            },
            service_name: "student-service".to_string(),
        };

        student_service::services::init_metrics();

        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let port = app.port();
        tokio::spawn(app.run_until_stopped());

        let mongo = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo.database(&db_name);

        Self {
            address: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            db,
            _upload_dir: upload_dir,
        }
    }

    pub async fn cleanup(&self) {
        self.db.drop(None).await.ok();
    }

    // =========================================================================
    // Request helpers (admin identity headers)
    // =========================================================================

    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("X-User-Role", "ADMIN")
            .header("X-User-Id", ADMIN_USER_ID)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.address, path))
            .header("X-User-Role", "ADMIN")
            .header("X-User-Id", ADMIN_USER_ID)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("X-User-Role", "ADMIN")
            .header("X-User-Id", ADMIN_USER_ID)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_as(&self, path: &str, role: &str, user_id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("X-User-Role", role)
            .header("X-User-Id", user_id)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .header("X-User-Role", "ADMIN")
            .header("X-User-Id", ADMIN_USER_ID)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// POST without identity headers, for role-gate tests.
    pub async fn post_json_anonymous(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    // =========================================================================
    // Seed helpers
    // =========================================================================

    pub async fn seed_teacher(&self, teacher_id: &str) {
        let response = self
            .post_json(
                "/api/teachers",
                &json!({
                    "teacher_id": teacher_id,
                    "full_name": "Meera Iyer",
                    "email": "meera@example.com",
                    "phone": "9876543210",
                    "subject": "Mathematics"
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "failed to seed teacher");
    }

    pub async fn seed_student(&self, student_id: &str, class_name: &str, teacher_id: &str) {
        let student = json!({
            "student_id": student_id,
            "first_name": "Asha",
            "last_name": "Verma",
            "email": "asha@example.com",
            "guardian_name": "R. Verma",
            "guardian_contact": "9876543210",
            "class_name": class_name,
            "teacher_id": teacher_id
        });
        let form = reqwest::multipart::Form::new().text("student", student.to_string());
        let response = self
            .client
            .post(format!("{}/api/students", self.address))
            .header("X-User-Role", "ADMIN")
            .header("X-User-Id", ADMIN_USER_ID)
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "failed to seed student");
    }

    pub async fn seed_fee_structure(
        &self,
        class_name: &str,
        admission_fee: f64,
        monthly_fee: f64,
        annual_fee: f64,
    ) {
        let response = self
            .post_json(
                "/api/fee-structures",
                &json!({
                    "class_name": class_name,
                    "admission_fee": admission_fee,
                    "monthly_fee": monthly_fee,
                    "annual_fee": annual_fee
                }),
            )
            .await;
        assert_eq!(response.status(), 200, "failed to seed fee structure");
    }
}
