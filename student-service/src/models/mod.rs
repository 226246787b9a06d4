pub mod fee_structure;
pub mod fee_summary;
pub mod payment;
pub mod student;
pub mod teacher;
pub mod user;

pub use fee_structure::FeeStructure;
pub use fee_summary::{FeeLedgerEntry, LedgerUpdate, StudentFeeSummary};
pub use payment::{Payment, PaymentMethod, PaymentPeriod, PaymentStatus, PaymentType};
pub use student::Student;
pub use teacher::Teacher;
pub use user::{User, UserRole};
