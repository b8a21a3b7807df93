pub mod dispatcher;
pub mod mailer;
pub mod metrics;
pub mod relay;
pub mod scheduler;
