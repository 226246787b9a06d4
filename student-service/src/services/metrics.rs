use prometheus::{CounterVec, Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

use crate::models::{PaymentStatus, PaymentType};

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static FEE_PAYMENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
static FEE_AMOUNT_PAID_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Register the service's counters. Safe to call more than once; later
/// calls are no-ops (test binaries spawn several applications).
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    let registry = Registry::new();

    let payments = IntCounterVec::new(
        Opts::new(
            "fee_payments_total",
            "Processed fee payments by type and resulting status",
        ),
        &["payment_type", "status"],
    )
    .expect("Failed to create fee_payments_total metric");

    let amounts = CounterVec::new(
        Opts::new(
            "fee_amount_paid_total",
            "Sum of amounts paid, by payment type",
        ),
        &["payment_type"],
    )
    .expect("Failed to create fee_amount_paid_total metric");

    registry
        .register(Box::new(payments.clone()))
        .expect("Failed to register fee_payments_total");
    registry
        .register(Box::new(amounts.clone()))
        .expect("Failed to register fee_amount_paid_total");

    if REGISTRY.set(registry).is_ok() {
        let _ = FEE_PAYMENTS_TOTAL.set(payments);
        let _ = FEE_AMOUNT_PAID_TOTAL.set(amounts);
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn render_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized\n".to_string();
    };

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&registry.gather(), &mut buffer).ok();
    String::from_utf8(buffer).unwrap_or_default()
}

/// Count one processed payment.
pub fn record_payment(payment_type: PaymentType, status: PaymentStatus, amount: f64) {
    if let Some(counter) = FEE_PAYMENTS_TOTAL.get() {
        counter
            .with_label_values(&[payment_type.as_str(), status.as_str()])
            .inc();
    }
    if let Some(counter) = FEE_AMOUNT_PAID_TOTAL.get() {
        counter
            .with_label_values(&[payment_type.as_str()])
            .inc_by(amount);
    }
}
