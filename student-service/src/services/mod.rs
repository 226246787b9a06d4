pub mod fees;
pub mod metrics;
pub mod repository;
pub mod storage;

pub use fees::{FeeService, FeeStore, MongoFeeStore};
pub use metrics::{init_metrics, render_metrics};
pub use repository::{FeeRepository, StudentRepository, TeacherRepository, UserRepository};
pub use storage::{FileStorage, UploadedPhoto};
