//! The capture side: pull problem details from a page and file them under
//! one or more topics through the backend API.

pub mod client;
pub mod controller;

pub use client::{ApiClient, ClientError};
pub use controller::{
    CaptureError, ChannelError, DetailsSource, EntryDraft, FileSource, RetryPolicy, SubmitReport,
    fetch_details_with_retry, submit_to_topics,
};
