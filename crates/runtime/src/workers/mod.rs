//! Worker tasks that back the runtime orchestration.

mod timeout;

pub(crate) use timeout::TimeoutWorker;
