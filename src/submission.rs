//! Submission
//!
//! Hands a completed booking to the backend collaborator and decides where the
//! user goes next. Only one submission may be in flight per controller.

use std::{
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    booking::{BookingError, BookingFlow, BookingRequest},
    config::BookingConfig,
    packages::PackageKind,
    share::{ShareLink, ShareLinkError},
};

/// Shown when the collaborator fails without saying why.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Response envelope returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    /// Whether the call succeeded
    pub success: bool,

    /// Payload on success
    #[serde(default)]
    pub data: Option<T>,

    /// Message on failure
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the envelope into its payload or a displayable message.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's message, or [`GENERIC_FAILURE`] when the
    /// response failed silently or succeeded without a payload.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self {
                success: true,
                data: Some(data),
                ..
            } => Ok(data),
            Self {
                success: false,
                error: Some(message),
                ..
            } if !message.trim().is_empty() => Err(message),
            _ => Err(GENERIC_FAILURE.to_string()),
        }
    }
}

/// Accepted booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Booking reference
    pub booking_id: String,

    /// Event the booking grants access to
    pub event_id: String,
}

/// Result of checking an invite code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteStatus {
    /// Whether the code still grants access
    pub valid: bool,

    /// Event the code belongs to
    pub event_id: String,

    /// Viewers still able to join
    pub remaining_viewers: u32,
}

/// Backend that accepts bookings and checks invite codes.
#[automock]
#[async_trait]
pub trait BookingCollaborator: Send + Sync {
    /// Submit a booking with its payment.
    async fn submit_booking(&self, request: &BookingRequest) -> ApiResponse<BookingConfirmation>;

    /// Check a share link code.
    async fn validate_invite(&self, code: &str) -> ApiResponse<InviteStatus>;
}

/// Collaborator that accepts every booking without a backend.
#[derive(Debug, Default)]
pub struct OfflineCollaborator {
    next_id: AtomicU64,
}

impl OfflineCollaborator {
    /// Create a collaborator numbering bookings from 1.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingCollaborator for OfflineCollaborator {
    async fn submit_booking(&self, request: &BookingRequest) -> ApiResponse<BookingConfirmation> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(package = %request.package_id, id, "offline booking accepted");

        ApiResponse::ok(BookingConfirmation {
            booking_id: format!("BK{id:06}"),
            event_id: format!("EVT{id}"),
        })
    }

    async fn validate_invite(&self, code: &str) -> ApiResponse<InviteStatus> {
        match code.parse::<ShareLink>() {
            Ok(link) => ApiResponse::ok(InviteStatus {
                valid: true,
                event_id: link.event_id().to_string(),
                remaining_viewers: link.max_viewers(),
            }),
            Err(error) => ApiResponse::failure(error.to_string()),
        }
    }
}

/// Where the user goes after a successful booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Individual purchase: open the live stream
    Redirect {
        /// Route to navigate to
        route: String,
    },

    /// Group purchase: hand out a share link
    ShareLink(ShareLink),
}

/// Submission errors
#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    /// Another submission is still waiting on the collaborator
    #[error("a submission is already in progress")]
    InFlight,

    /// The booking was not ready to submit
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// The collaborator rejected the booking
    #[error("{0}")]
    Rejected(String),

    /// The invite code is not a share link
    #[error(transparent)]
    InvalidInvite(#[from] ShareLinkError),
}

impl SubmissionError {
    /// Whether resubmitting the same draft may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InFlight | Self::Rejected(_))
    }
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fails the flow's pending submission if the caller stops waiting for it.
struct PendingSubmission<'f, 'a>(&'f mut BookingFlow<'a>);

impl Drop for PendingSubmission<'_, '_> {
    fn drop(&mut self) {
        self.0.abandon_submission(GENERIC_FAILURE);
    }
}

/// Submission controller
#[derive(Debug)]
pub struct SubmissionController<C> {
    collaborator: C,
    success_delay: Duration,
    live_stream_route: String,
    in_flight: AtomicBool,
}

impl<C: BookingCollaborator> SubmissionController<C> {
    /// Create a controller.
    pub fn new(collaborator: C, success_delay: Duration, live_stream_route: impl Into<String>) -> Self {
        Self {
            collaborator,
            success_delay,
            live_stream_route: live_stream_route.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create a controller using the configured delay and route.
    pub fn from_config(collaborator: C, config: &BookingConfig) -> Self {
        Self::new(
            collaborator,
            config.success_delay,
            config.live_stream_route.clone(),
        )
    }

    /// Whether a submission is waiting on the collaborator.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Collaborator
    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }

    /// Submit the booking once. On success the flow shows its success state
    /// for the configured delay before the outcome is returned. On failure the
    /// flow keeps its draft and the collaborator's message.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InFlight`] while another submission is
    /// pending, [`SubmissionError::Booking`] if the flow cannot submit, and
    /// [`SubmissionError::Rejected`] if the collaborator refuses the booking.
    ///
    /// Dropping the returned future before the collaborator answers leaves the
    /// flow `Failed` with [`GENERIC_FAILURE`], ready to resubmit.
    pub async fn submit(&self, flow: &mut BookingFlow<'_>) -> Result<SubmissionOutcome, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("submission refused: another is in flight");
            return Err(SubmissionError::InFlight);
        };

        let request = flow.begin_submission()?;
        let mut pending = PendingSubmission(flow);

        match self.collaborator.submit_booking(&request).await.into_result() {
            Ok(confirmation) => {
                pending.0.complete_submission(Ok(()))?;

                info!(
                    booking = %confirmation.booking_id,
                    event = %confirmation.event_id,
                    "booking confirmed"
                );

                tokio::time::sleep(self.success_delay).await;

                Ok(self.outcome(&request, confirmation))
            }
            Err(message) => {
                pending.0.complete_submission(Err(message.clone()))?;

                Err(SubmissionError::Rejected(message))
            }
        }
    }

    fn outcome(&self, request: &BookingRequest, confirmation: BookingConfirmation) -> SubmissionOutcome {
        match (request.kind, request.people) {
            (PackageKind::Group, Some(people)) => {
                SubmissionOutcome::ShareLink(ShareLink::generate(confirmation.event_id, people))
            }
            _ => SubmissionOutcome::Redirect {
                route: self.live_stream_route.clone(),
            },
        }
    }

    /// Check an invite code with the collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidInvite`] for codes that are not share
    /// links and [`SubmissionError::Rejected`] if the collaborator refuses it.
    pub async fn validate_invite(&self, code: &str) -> Result<InviteStatus, SubmissionError> {
        let link: ShareLink = code.parse()?;

        debug!(event = %link.event_id(), "validating invite");

        self.collaborator
            .validate_invite(&link.to_string())
            .await
            .into_result()
            .map_err(SubmissionError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use testresult::TestResult;
    use tokio::time::Instant;

    use crate::{
        booking::{
            BookingState,
            tests::{fill_details, fill_mobile_money, flow},
        },
        packages::tests::package,
        share::SHARE_PREFIX,
    };

    use super::*;

    fn confirmation() -> BookingConfirmation {
        BookingConfirmation {
            booking_id: "BK000042".to_string(),
            event_id: "EVT42".to_string(),
        }
    }

    fn ready_flow<'a>(kind: PackageKind) -> TestResult<BookingFlow<'a>> {
        let mut flow = flow()?;

        match kind {
            PackageKind::Individual => {
                flow.select_package(&package("basic", kind, 10_000));
            }
            PackageKind::Group => {
                flow.select_package(&package("group", kind, 15_000));
                flow.input_people("3")?;
            }
        }

        fill_details(&mut flow);
        fill_mobile_money(&mut flow);

        Ok(flow)
    }

    #[test]
    fn into_result_prefers_collaborator_message() {
        assert_eq!(ApiResponse::ok(1).into_result(), Ok(1));
        assert_eq!(
            ApiResponse::<u8>::failure("Card declined").into_result(),
            Err("Card declined".to_string())
        );
    }

    #[test]
    fn into_result_falls_back_to_generic_message() {
        let silent = ApiResponse::<u8> {
            success: false,
            data: None,
            error: None,
        };
        let blank = ApiResponse::<u8>::failure("  ");
        let empty_success = ApiResponse::<u8> {
            success: true,
            data: None,
            error: None,
        };

        for response in [silent, blank, empty_success] {
            assert_eq!(response.into_result(), Err(GENERIC_FAILURE.to_string()));
        }
    }

    #[test]
    fn response_deserializes_without_optional_fields() -> TestResult {
        let response: ApiResponse<BookingConfirmation> =
            serde_json::from_str(r#"{"success": false, "error": "Payment failed"}"#)?;

        assert_eq!(response.into_result(), Err("Payment failed".to_string()));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn group_booking_yields_share_link_after_delay() -> TestResult {
        let mut collaborator = MockBookingCollaborator::new();

        collaborator
            .expect_submit_booking()
            .withf(|request| request.people == Some(3) && request.total_minor == 40_500)
            .times(1)
            .returning(|_| ApiResponse::ok(confirmation()));

        let controller = SubmissionController::new(collaborator, Duration::from_secs(2), "/live-stream");
        let mut flow = ready_flow(PackageKind::Group)?;

        let started = Instant::now();
        let outcome = controller.submit(&mut flow).await?;

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(flow.state(), BookingState::Succeeded);

        let SubmissionOutcome::ShareLink(link) = outcome else {
            panic!("group booking should produce a share link, got {outcome:?}");
        };

        let code = link.to_string();

        assert!(code.starts_with(&format!("{SHARE_PREFIX}-")));
        assert!(code.contains("EVT42"));
        assert!(code.ends_with("-3"));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn individual_booking_redirects_to_live_stream() -> TestResult {
        let mut collaborator = MockBookingCollaborator::new();

        collaborator
            .expect_submit_booking()
            .times(1)
            .returning(|_| ApiResponse::ok(confirmation()));

        let controller = SubmissionController::new(collaborator, Duration::from_secs(2), "/live-stream");
        let mut flow = ready_flow(PackageKind::Individual)?;

        let outcome = controller.submit(&mut flow).await?;

        assert_eq!(
            outcome,
            SubmissionOutcome::Redirect {
                route: "/live-stream".to_string()
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejected_booking_keeps_draft_and_message() -> TestResult {
        let mut collaborator = MockBookingCollaborator::new();

        collaborator
            .expect_submit_booking()
            .times(1)
            .returning(|_| ApiResponse::failure("Insufficient balance"));

        let controller = SubmissionController::new(collaborator, Duration::ZERO, "/live-stream");
        let mut flow = ready_flow(PackageKind::Individual)?;

        let error = controller.submit(&mut flow).await.err();

        assert_eq!(
            error,
            Some(SubmissionError::Rejected("Insufficient balance".to_string()))
        );
        assert!(error.is_some_and(|error| error.is_retryable()));
        assert_eq!(flow.state(), BookingState::Failed);
        assert_eq!(flow.error(), Some("Insufficient balance"));
        assert!(flow.can_submit());
        assert!(!controller.is_submitting());

        Ok(())
    }

    #[tokio::test]
    async fn incomplete_flow_never_reaches_collaborator() -> TestResult {
        let mut collaborator = MockBookingCollaborator::new();
        collaborator.expect_submit_booking().never();

        let controller = SubmissionController::new(collaborator, Duration::ZERO, "/live-stream");
        let mut flow = flow()?;
        flow.select_package(&package("group", PackageKind::Group, 15_000));
        flow.input_people("1")?;

        let error = controller.submit(&mut flow).await.err();

        assert_eq!(error, Some(SubmissionError::Booking(BookingError::PeopleCount)));
        assert!(!controller.is_submitting());

        Ok(())
    }

    /// Collaborator that takes a while to answer.
    #[derive(Default)]
    struct SlowCollaborator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BookingCollaborator for SlowCollaborator {
        async fn submit_booking(&self, _request: &BookingRequest) -> ApiResponse<BookingConfirmation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;

            ApiResponse::ok(confirmation())
        }

        async fn validate_invite(&self, _code: &str) -> ApiResponse<InviteStatus> {
            ApiResponse::failure("unused")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submission_is_refused() -> TestResult {
        let controller = SubmissionController::new(SlowCollaborator::default(), Duration::ZERO, "/live-stream");
        let mut first = ready_flow(PackageKind::Individual)?;
        let mut second = ready_flow(PackageKind::Individual)?;

        let (first_result, second_result) =
            tokio::join!(controller.submit(&mut first), controller.submit(&mut second));

        assert!(first_result.is_ok());
        assert_eq!(second_result, Err(SubmissionError::InFlight));
        assert_eq!(controller.collaborator().calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.state(), BookingState::FormComplete);
        assert!(!controller.is_submitting());

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_submission_can_be_resubmitted() -> TestResult {
        let controller = SubmissionController::new(SlowCollaborator::default(), Duration::ZERO, "/live-stream");
        let mut flow = ready_flow(PackageKind::Individual)?;

        let timed_out =
            tokio::time::timeout(Duration::from_millis(100), controller.submit(&mut flow)).await;

        assert!(timed_out.is_err());
        assert_eq!(flow.state(), BookingState::Failed);
        assert_eq!(flow.error(), Some(GENERIC_FAILURE));
        assert!(flow.can_submit());
        assert!(!controller.is_submitting());

        let outcome = controller.submit(&mut flow).await?;

        assert!(matches!(outcome, SubmissionOutcome::Redirect { .. }));
        assert_eq!(flow.state(), BookingState::Succeeded);
        assert_eq!(controller.collaborator().calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test]
    async fn validate_invite_rejects_malformed_codes_locally() {
        let mut collaborator = MockBookingCollaborator::new();
        collaborator.expect_validate_invite().never();

        let controller = SubmissionController::new(collaborator, Duration::ZERO, "/live-stream");

        assert_eq!(
            controller.validate_invite("INVITE-123").await,
            Err(SubmissionError::InvalidInvite(ShareLinkError::MissingPrefix))
        );
    }

    #[tokio::test]
    async fn offline_collaborator_round_trip() -> TestResult {
        let controller = SubmissionController::new(OfflineCollaborator::new(), Duration::ZERO, "/live-stream");
        let mut flow = ready_flow(PackageKind::Group)?;

        let SubmissionOutcome::ShareLink(link) = controller.submit(&mut flow).await? else {
            panic!("group booking should produce a share link");
        };

        let status = controller.validate_invite(&link.to_string()).await?;

        assert!(status.valid);
        assert_eq!(status.event_id, "EVT1");
        assert_eq!(status.remaining_viewers, 3);

        Ok(())
    }
}
