pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::middleware::from_fn;
use axum::{
    routing::{get, post, put},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{
    FeeRepository, FeeService, FileStorage, MongoFeeStore, StudentRepository, TeacherRepository,
    UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub students: StudentRepository,
    pub teachers: TeacherRepository,
    pub fees: FeeRepository,
    pub fee_service: FeeService,
    pub storage: FileStorage,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to MongoDB, create indexes, and bind the listener. Pass
    /// port 0 to bind an ephemeral port (used by the integration tests).
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::DatabaseError(e.into())
            })?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(e.into())
        })?;
        let db = client.database(&config.database.db_name);

        let users = UserRepository::new(&db);
        let students = StudentRepository::new(&db);
        let teachers = TeacherRepository::new(&db);
        let fees = FeeRepository::new(&db);

        users.init_indexes().await?;
        students.init_indexes().await?;
        teachers.init_indexes().await?;
        fees.init_indexes().await?;
        tracing::info!("Database indexes initialized");

        let storage = FileStorage::new(config.storage.upload_dir.clone()).await?;
        let fee_service = FeeService::new(Arc::new(MongoFeeStore::new(
            students.clone(),
            fees.clone(),
        )));

        let state = AppState {
            config: config.clone(),
            users,
            students,
            teachers,
            fees,
            fee_service,
            storage,
        };

        let address = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Listening on port {}", self.port);
        axum::serve(self.listener, self.router).await
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Auth
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/admin/create", post(handlers::auth::create_admin))
        .route("/api/auth/admin/exists", get(handlers::auth::admin_exists))
        .route(
            "/api/auth/teacher/create",
            post(handlers::auth::create_teacher_account),
        )
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/auth/stats", get(handlers::auth::user_stats))
        // Students
        .route(
            "/api/students",
            post(handlers::students::create_student).get(handlers::students::list_students),
        )
        .route(
            "/api/students/bulk/class",
            put(handlers::students::bulk_update_class),
        )
        .route(
            "/api/students/class/:class_name",
            get(handlers::students::students_by_class),
        )
        .route(
            "/api/students/teacher/:teacher_id",
            get(handlers::students::students_by_teacher),
        )
        .route(
            "/api/students/:student_id",
            get(handlers::students::get_student)
                .put(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        )
        .route(
            "/api/students/:student_id/photo",
            get(handlers::students::get_student_photo),
        )
        // Teachers
        .route(
            "/api/teachers",
            post(handlers::teachers::create_teacher).get(handlers::teachers::list_teachers),
        )
        .route(
            "/api/teachers/subject/:subject",
            get(handlers::teachers::teachers_by_subject),
        )
        .route(
            "/api/teachers/:teacher_id",
            get(handlers::teachers::get_teacher)
                .put(handlers::teachers::update_teacher)
                .delete(handlers::teachers::delete_teacher),
        )
        // Fee structures
        .route(
            "/api/fee-structures",
            post(handlers::fee_structures::upsert_fee_structure)
                .get(handlers::fee_structures::list_fee_structures),
        )
        .route(
            "/api/fee-structures/:class_name",
            get(handlers::fee_structures::get_fee_structure)
                .delete(handlers::fee_structures::delete_fee_structure),
        )
        // Payments
        .route("/api/payments", post(handlers::payments::process_payment))
        .route(
            "/api/payments/student/:student_id",
            get(handlers::payments::student_payments),
        )
        .route(
            "/api/payments/student/:student_id/summary",
            get(handlers::payments::student_fee_summary),
        )
        .route(
            "/api/payments/:payment_id",
            get(handlers::payments::get_payment),
        )
        .route(
            "/api/payments/:payment_id/receipt",
            get(handlers::payments::get_payment_receipt),
        )
        .layer(CorsLayer::permissive())
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
