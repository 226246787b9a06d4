//! Fee payment reconciliation.
//!
//! `FeeService` is the single write path for fee state: it applies a payment
//! to the student's summary, derives the payment status, and appends the
//! immutable payment record. Storage is behind the `FeeStore` seam so the
//! engine can run against MongoDB in production and an in-memory store in
//! tests.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::DateTime;
use service_core::error::AppError;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dtos::payments::CreatePaymentRequest;
use crate::models::{
    FeeStructure, Payment, PaymentPeriod, Student, StudentFeeSummary,
};
use crate::services::metrics;
use crate::services::repository::{FeeRepository, StudentRepository};

/// Storage operations the reconciliation engine needs from its collaborators.
#[async_trait]
pub trait FeeStore: Send + Sync {
    async fn find_student(&self, student_id: &str) -> Result<Option<Student>, AppError>;
    async fn find_active_fee_structure(
        &self,
        class_name: &str,
    ) -> Result<Option<FeeStructure>, AppError>;
    async fn find_fee_summary(&self, student_id: &str)
        -> Result<Option<StudentFeeSummary>, AppError>;
    async fn save_fee_summary(&self, summary: &StudentFeeSummary) -> Result<(), AppError>;
    async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError>;
    /// History for one student, newest first.
    async fn payments_for_student(&self, student_id: &str) -> Result<Vec<Payment>, AppError>;
    async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>, AppError>;
}

/// Production store backed by the MongoDB repositories.
#[derive(Clone)]
pub struct MongoFeeStore {
    students: StudentRepository,
    fees: FeeRepository,
}

impl MongoFeeStore {
    pub fn new(students: StudentRepository, fees: FeeRepository) -> Self {
        Self { students, fees }
    }
}

#[async_trait]
impl FeeStore for MongoFeeStore {
    async fn find_student(&self, student_id: &str) -> Result<Option<Student>, AppError> {
        self.students.find_by_student_id(student_id).await
    }

    async fn find_active_fee_structure(
        &self,
        class_name: &str,
    ) -> Result<Option<FeeStructure>, AppError> {
        self.fees.find_active_structure_by_class(class_name).await
    }

    async fn find_fee_summary(
        &self,
        student_id: &str,
    ) -> Result<Option<StudentFeeSummary>, AppError> {
        self.fees.find_summary_by_student(student_id).await
    }

    async fn save_fee_summary(&self, summary: &StudentFeeSummary) -> Result<(), AppError> {
        self.fees.upsert_summary(summary).await
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError> {
        self.fees.insert_payment(payment).await
    }

    async fn payments_for_student(&self, student_id: &str) -> Result<Vec<Payment>, AppError> {
        self.fees.find_payments_by_student(student_id).await
    }

    async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>, AppError> {
        self.fees.find_payment_by_payment_id(payment_id).await
    }
}

#[derive(Clone)]
pub struct FeeService {
    store: Arc<dyn FeeStore>,
    /// Per-student mutexes. Summary updates are read-modify-write over a
    /// single document; two concurrent payments for the same student would
    /// otherwise clobber each other's increment. Payments for different
    /// students run fully in parallel.
    student_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FeeService {
    pub fn new(store: Arc<dyn FeeStore>) -> Self {
        Self {
            store,
            student_locks: Arc::new(DashMap::new()),
        }
    }

    fn student_lock(&self, student_id: &str) -> Arc<Mutex<()>> {
        self.student_locks
            .entry(student_id.to_string())
            .or_default()
            .clone()
    }

    /// Process one payment end to end.
    ///
    /// Not idempotent: re-submitting the same request creates a second
    /// payment record and double-counts the amount. Callers must not retry
    /// blindly.
    pub async fn process_payment(
        &self,
        request: CreatePaymentRequest,
        created_by: Option<String>,
    ) -> Result<Payment, AppError> {
        let period =
            PaymentPeriod::from_parts(request.payment_type, request.month, request.year)?;

        tracing::info!(
            student_id = %request.student_id,
            payment_type = request.payment_type.as_str(),
            amount = request.amount_paid,
            "Processing payment"
        );

        let lock = self.student_lock(&request.student_id);
        let _guard = lock.lock().await;

        let student = self
            .store
            .find_student(&request.student_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow!("Student not found: {}", request.student_id))
            })?;

        let structure = self
            .store
            .find_active_fee_structure(&student.class_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow!(
                    "Fee structure not found for class: {}",
                    student.class_name
                ))
            })?;

        let now = DateTime::now();

        let mut summary = match self.store.find_fee_summary(&student.student_id).await? {
            Some(summary) => summary,
            None => StudentFeeSummary::new(&student, &structure, now),
        };

        let update = summary.apply_payment(&period, &structure, request.amount_paid, now)?;

        let payment = Payment {
            id: Uuid::new_v4(),
            payment_id: Payment::generate_payment_id(),
            student_id: student.student_id.clone(),
            student_name: student.full_name.clone(),
            payment_type: request.payment_type,
            amount_paid: request.amount_paid,
            total_amount: structure.amount_for(request.payment_type),
            pending_amount: update.pending_amount,
            payment_method: request.payment_method,
            transaction_reference: request.transaction_reference,
            remarks: request.remarks,
            payment_date: now,
            payment_period: period.label(),
            month: period.month(),
            year: period.year(),
            status: update.status,
            created_at: now,
            updated_at: now,
            created_by,
        };

        self.store.insert_payment(&payment).await?;
        self.store.save_fee_summary(&summary).await?;

        metrics::record_payment(payment.payment_type, payment.status, payment.amount_paid);

        tracing::info!(
            payment_id = %payment.payment_id,
            status = payment.status.as_str(),
            pending_amount = payment.pending_amount,
            "Payment processed"
        );

        Ok(payment)
    }

    /// All payments for a student, newest first.
    pub async fn payment_history(&self, student_id: &str) -> Result<Vec<Payment>, AppError> {
        self.store.payments_for_student(student_id).await
    }

    pub async fn fee_summary(&self, student_id: &str) -> Result<StudentFeeSummary, AppError> {
        self.store
            .find_fee_summary(student_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow!("Fee summary not found for student: {}", student_id))
            })
    }

    pub async fn payment_by_id(&self, payment_id: &str) -> Result<Payment, AppError> {
        self.store
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Payment not found: {}", payment_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, PaymentStatus, PaymentType};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// In-memory store. Each operation yields to the scheduler so that
    /// unguarded read-modify-write interleavings would actually surface.
    #[derive(Default)]
    struct InMemoryFeeStore {
        students: StdMutex<HashMap<String, Student>>,
        structures: StdMutex<HashMap<String, FeeStructure>>,
        summaries: StdMutex<HashMap<String, StudentFeeSummary>>,
        payments: StdMutex<Vec<Payment>>,
    }

    #[async_trait]
    impl FeeStore for InMemoryFeeStore {
        async fn find_student(&self, student_id: &str) -> Result<Option<Student>, AppError> {
            tokio::task::yield_now().await;
            Ok(self.students.lock().unwrap().get(student_id).cloned())
        }

        async fn find_active_fee_structure(
            &self,
            class_name: &str,
        ) -> Result<Option<FeeStructure>, AppError> {
            tokio::task::yield_now().await;
            Ok(self
                .structures
                .lock()
                .unwrap()
                .get(class_name)
                .filter(|s| s.is_active)
                .cloned())
        }

        async fn find_fee_summary(
            &self,
            student_id: &str,
        ) -> Result<Option<StudentFeeSummary>, AppError> {
            tokio::task::yield_now().await;
            Ok(self.summaries.lock().unwrap().get(student_id).cloned())
        }

        async fn save_fee_summary(&self, summary: &StudentFeeSummary) -> Result<(), AppError> {
            tokio::task::yield_now().await;
            self.summaries
                .lock()
                .unwrap()
                .insert(summary.student_id.clone(), summary.clone());
            Ok(())
        }

        async fn insert_payment(&self, payment: &Payment) -> Result<(), AppError> {
            tokio::task::yield_now().await;
            self.payments.lock().unwrap().push(payment.clone());
            Ok(())
        }

        async fn payments_for_student(&self, student_id: &str) -> Result<Vec<Payment>, AppError> {
            tokio::task::yield_now().await;
            let mut payments: Vec<Payment> = self
                .payments
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.student_id == student_id)
                .cloned()
                .collect();
            payments.sort_by_key(|p| std::cmp::Reverse(p.payment_date));
            Ok(payments)
        }

        async fn find_payment(&self, payment_id: &str) -> Result<Option<Payment>, AppError> {
            tokio::task::yield_now().await;
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.payment_id == payment_id)
                .cloned())
        }
    }

    fn student(student_id: &str, class_name: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            first_name: "Asha".to_string(),
            last_name: "Verma".to_string(),
            full_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            guardian_name: "R. Verma".to_string(),
            guardian_contact: "9876543210".to_string(),
            address: None,
            phone_number: None,
            date_of_birth: None,
            enrollment_date: None,
            class_name: class_name.to_string(),
            weight: None,
            height: None,
            teacher_id: Some("T001".to_string()),
            photo_filename: None,
            photo_content_type: None,
        }
    }

    fn structure(class_name: &str) -> FeeStructure {
        FeeStructure {
            id: Uuid::new_v4(),
            class_name: class_name.to_string(),
            admission_fee: 500.0,
            monthly_fee: 100.0,
            annual_fee: 1000.0,
            transport_fee: None,
            exam_fee: None,
            activity_fee: None,
            is_active: true,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
            updated_by: None,
        }
    }

    fn service_with_grade5_student() -> (FeeService, Arc<InMemoryFeeStore>) {
        let store = Arc::new(InMemoryFeeStore::default());
        store
            .students
            .lock()
            .unwrap()
            .insert("S1".to_string(), student("S1", "Grade 5"));
        store
            .structures
            .lock()
            .unwrap()
            .insert("Grade 5".to_string(), structure("Grade 5"));
        (FeeService::new(store.clone()), store)
    }

    fn request(payment_type: PaymentType, amount: f64) -> CreatePaymentRequest {
        CreatePaymentRequest {
            student_id: "S1".to_string(),
            payment_type,
            amount_paid: amount,
            payment_method: PaymentMethod::Cash,
            transaction_reference: None,
            remarks: None,
            month: None,
            year: None,
        }
    }

    fn monthly_request(month: u32, year: i32, amount: f64) -> CreatePaymentRequest {
        CreatePaymentRequest {
            month: Some(month),
            year: Some(year),
            ..request(PaymentType::Monthly, amount)
        }
    }

    #[tokio::test]
    async fn admission_payments_accumulate_until_paid() {
        let (service, _) = service_with_grade5_student();

        let first = service
            .process_payment(request(PaymentType::Admission, 200.0), None)
            .await
            .unwrap();
        assert_eq!(first.status, PaymentStatus::Partial);
        assert_eq!(first.total_amount, 500.0);
        assert_eq!(first.pending_amount, 300.0);

        let summary = service.fee_summary("S1").await.unwrap();
        assert_eq!(summary.admission_fee_paid, 200.0);
        assert_eq!(summary.admission_fee_pending, 300.0);
        assert!(!summary.admission_fee_completed);

        let second = service
            .process_payment(request(PaymentType::Admission, 300.0), None)
            .await
            .unwrap();
        assert_eq!(second.status, PaymentStatus::Paid);
        assert_eq!(second.pending_amount, 0.0);

        let summary = service.fee_summary("S1").await.unwrap();
        assert_eq!(summary.admission_fee_paid, 500.0);
        assert_eq!(summary.admission_fee_pending, 0.0);
        assert!(summary.admission_fee_completed);
    }

    #[tokio::test]
    async fn exact_monthly_payment_counts_into_totals() {
        let (service, _) = service_with_grade5_student();

        let payment = service
            .process_payment(monthly_request(1, 2025, 100.0), None)
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.payment_period.as_deref(), Some("January 2025"));
        assert_eq!(payment.month, Some(1));
        assert_eq!(payment.year, Some(2025));

        let summary = service.fee_summary("S1").await.unwrap();
        let entry = &summary.monthly_fees["01-2025"];
        assert_eq!(entry.total, 100.0);
        assert_eq!(entry.paid, 100.0);
        assert_eq!(entry.pending, 0.0);
        assert_eq!(entry.status, PaymentStatus::Paid);
        assert_eq!(summary.total_paid_amount, 100.0);
    }

    #[tokio::test]
    async fn monthly_overpayment_is_clamped_not_carried() {
        let (service, _) = service_with_grade5_student();

        let payment = service
            .process_payment(monthly_request(2, 2025, 150.0), None)
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.pending_amount, 0.0);

        let summary = service.fee_summary("S1").await.unwrap();
        let entry = &summary.monthly_fees["02-2025"];
        assert_eq!(entry.pending, 0.0);
        assert_eq!(entry.paid, 150.0);
        // No credit appears on any other period.
        assert_eq!(summary.monthly_fees.len(), 1);
    }

    #[tokio::test]
    async fn annual_payment_requires_year() {
        let (service, store) = service_with_grade5_student();

        let err = service
            .process_payment(request(PaymentType::Annual, 400.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        // Nothing was persisted.
        assert!(store.payments.lock().unwrap().is_empty());
        assert!(store.summaries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_annual_payment_tracks_balance() {
        let (service, _) = service_with_grade5_student();

        let payment = service
            .process_payment(
                CreatePaymentRequest {
                    year: Some(2025),
                    ..request(PaymentType::Annual, 400.0)
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Partial);
        assert_eq!(payment.pending_amount, 600.0);
        assert_eq!(payment.payment_period.as_deref(), Some("Year 2025"));

        let summary = service.fee_summary("S1").await.unwrap();
        let entry = &summary.annual_fees["2025"];
        assert_eq!(entry.total, 1000.0);
        assert_eq!(entry.paid, 400.0);
        assert_eq!(entry.pending, 600.0);
        assert_eq!(entry.status, PaymentStatus::Partial);
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (service, _) = service_with_grade5_student();

        let err = service
            .process_payment(
                CreatePaymentRequest {
                    student_id: "missing".to_string(),
                    ..request(PaymentType::Admission, 100.0)
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn inactive_fee_structure_is_not_found() {
        let (service, store) = service_with_grade5_student();
        store
            .structures
            .lock()
            .unwrap()
            .get_mut("Grade 5")
            .unwrap()
            .is_active = false;

        let err = service
            .process_payment(request(PaymentType::Admission, 100.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn grand_totals_follow_every_payment() {
        let (service, _) = service_with_grade5_student();

        service
            .process_payment(request(PaymentType::Admission, 200.0), None)
            .await
            .unwrap();
        service
            .process_payment(monthly_request(1, 2025, 100.0), None)
            .await
            .unwrap();
        service
            .process_payment(monthly_request(2, 2025, 60.0), None)
            .await
            .unwrap();
        service
            .process_payment(
                CreatePaymentRequest {
                    year: Some(2025),
                    ..request(PaymentType::Annual, 400.0)
                },
                None,
            )
            .await
            .unwrap();

        let summary = service.fee_summary("S1").await.unwrap();
        assert_eq!(summary.total_paid_amount, 760.0);
        assert_eq!(summary.total_pending_amount, 940.0);
        assert_eq!(summary.total_fees_amount, 1700.0);

        // The invariant: grand totals equal the sum over all sub-ledgers.
        let ledger_paid: f64 = summary.admission_fee_paid
            + summary.monthly_fees.values().map(|e| e.paid).sum::<f64>()
            + summary.annual_fees.values().map(|e| e.paid).sum::<f64>();
        assert_eq!(summary.total_paid_amount, ledger_paid);
    }

    #[tokio::test]
    async fn payment_history_is_newest_first() {
        let (service, _) = service_with_grade5_student();

        service
            .process_payment(request(PaymentType::Admission, 100.0), None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service
            .process_payment(monthly_request(1, 2025, 100.0), None)
            .await
            .unwrap();

        let history = service.payment_history("S1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].payment_type, PaymentType::Monthly);
        assert_eq!(history[1].payment_type, PaymentType::Admission);
    }

    #[tokio::test]
    async fn payment_lookup_by_receipt_id() {
        let (service, _) = service_with_grade5_student();

        let payment = service
            .process_payment(request(PaymentType::Admission, 100.0), None)
            .await
            .unwrap();

        let fetched = service.payment_by_id(&payment.payment_id).await.unwrap();
        assert_eq!(fetched.amount_paid, 100.0);

        let err = service.payment_by_id("PAY-MISSING0").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn fee_summary_is_not_found_before_first_payment() {
        let (service, _) = service_with_grade5_student();
        let err = service.fee_summary("S1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_payments_for_one_student_lose_nothing() {
        let (service, _) = service_with_grade5_student();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .process_payment(monthly_request(1, 2025, 10.0), None)
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let summary = service.fee_summary("S1").await.unwrap();
        let entry = &summary.monthly_fees["01-2025"];
        assert_eq!(entry.paid, 100.0);
        assert_eq!(entry.pending, 0.0);
        assert_eq!(summary.total_paid_amount, 100.0);

        let history = service.payment_history("S1").await.unwrap();
        assert_eq!(history.len(), 10);
    }

    #[tokio::test]
    async fn created_by_is_recorded_on_the_payment() {
        let (service, _) = service_with_grade5_student();

        let payment = service
            .process_payment(
                request(PaymentType::Admission, 100.0),
                Some("admin".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(payment.created_by.as_deref(), Some("admin"));
    }
}
