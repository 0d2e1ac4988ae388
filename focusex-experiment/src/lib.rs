pub mod acquisition;
pub mod config;
pub mod controller;
pub mod error;
pub mod problem;
pub mod store;
pub mod task;

pub use acquisition::{AcquisitionGuard, drain};
pub use config::{ConfigError, SessionConfig};
pub use controller::TrialController;
pub use error::SessionError;
pub use problem::{ArithmeticProblem, Operator};
pub use store::{NamingPolicy, ResultStore, StoreError};
pub use task::{ArithmeticTask, ConditionTask, ListeningTask, ReadingTask, standard_tasks};
