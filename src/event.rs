use crate::backend::PhotoResponse;
use crate::chat::{PhotoSlotState, SlotId};
use crate::error::BackendError;

/// Results of background requests, applied on the UI thread in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    ChatReplied(String),
    ChatFailed(BackendError),
    PhotoFinished { slot: SlotId, outcome: PhotoOutcome },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOutcome {
    Resolved(String),
    Unavailable,
    Failed,
}

impl PhotoOutcome {
    pub fn from_result(result: Result<PhotoResponse, BackendError>) -> Self {
        match result {
            Ok(response) => match response.image_url() {
                Some(url) => Self::Resolved(url.to_string()),
                None => Self::Unavailable,
            },
            Err(BackendError::Status { endpoint, status }) => {
                log::warn!("photo request to {endpoint} returned {status}");
                Self::Unavailable
            }
            Err(err) => {
                log::warn!("photo generation failed: {err}");
                Self::Failed
            }
        }
    }
}

impl From<PhotoOutcome> for PhotoSlotState {
    fn from(outcome: PhotoOutcome) -> Self {
        match outcome {
            PhotoOutcome::Resolved(url) => PhotoSlotState::Resolved { url },
            PhotoOutcome::Unavailable => PhotoSlotState::Unavailable,
            PhotoOutcome::Failed => PhotoSlotState::Failed,
        }
    }
}
