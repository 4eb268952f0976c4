// crates/core/src/error.rs
use thiserror::Error;

/// Rejections returned by the job controller. Neither variant changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Already running")]
    AlreadyRunning,

    #[error("Not running")]
    NotRunning,
}

/// Failure raised inside a batch task.
///
/// Contained by the harness: it only ever surfaces as an `ERR` log entry,
/// never as an error returned to whoever called `start`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("{0}")]
    Panicked(String),

    #[error("task was aborted")]
    Aborted,
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Build a `Panicked` error from a panic payload (`&str` or `String`).
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_string(),
                Err(_) => "task panicked".to_string(),
            },
        };
        Self::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_messages() {
        assert_eq!(JobError::AlreadyRunning.to_string(), "Already running");
        assert_eq!(JobError::NotRunning.to_string(), "Not running");
    }

    #[test]
    fn test_task_error_displays_bare_description() {
        assert_eq!(TaskError::failed("boom").to_string(), "boom");
        assert_eq!(TaskError::Panicked("boom".into()).to_string(), "boom");
        assert_eq!(TaskError::Aborted.to_string(), "task was aborted");
    }

    #[test]
    fn test_from_panic_payloads() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(TaskError::from_panic(owned), TaskError::Panicked("owned boom".into()));

        let static_str: Box<dyn std::any::Any + Send> = Box::new("static boom");
        assert_eq!(TaskError::from_panic(static_str), TaskError::Panicked("static boom".into()));

        let other: Box<dyn std::any::Any + Send> = Box::new(42u32);
        assert_eq!(TaskError::from_panic(other), TaskError::Panicked("task panicked".into()));
    }
}
