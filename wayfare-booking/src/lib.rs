pub mod workflow;

pub use workflow::{BookingSubmission, BookingWorkflow, SubmissionOutcome, WorkflowError};
