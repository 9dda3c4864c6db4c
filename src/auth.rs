//! Phone number / one-time-code sign-in.
//!
//! `AuthFlow` owns the whole session. Submissions are two-step: the submit
//! call validates and marks the session busy, returning a [`Pending`]; once
//! the pending delay has elapsed its [`Ticket`] is handed back to
//! [`AuthFlow::complete`], the only place a submission resolves.

use std::time::Duration;

use log::{debug, info, warn};

use crate::api::events::AuthSignal;
use crate::api::models::{OtpCode, PhoneCredential};
use crate::error::{AuthError, ValidationError};

pub const MIN_PHONE_DIGITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    CollectingPhone,
    Verifying,
    AwaitingOtp,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    state: AuthState,
    phone: PhoneCredential,
    otp: OtpCode,
    error_message: String,
    busy: bool,
}

impl AuthSession {
    fn new(calling_code: &str) -> Self {
        Self {
            state: AuthState::CollectingPhone,
            phone: PhoneCredential::new(calling_code),
            otp: OtpCode::default(),
            error_message: String::new(),
            busy: false,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn phone(&self) -> &PhoneCredential {
        &self.phone
    }

    pub fn otp(&self) -> &OtpCode {
        &self.otp
    }

    /// Empty when there is nothing to show.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    SendOtp,
    VerifyOtp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    action: PendingAction,
}

impl Ticket {
    pub fn action(&self) -> PendingAction {
        self.action
    }
}

/// An in-flight submission. The flow stays busy until its ticket is passed to
/// [`AuthFlow::complete`].
#[derive(Debug)]
#[must_use = "the flow stays busy until the ticket is completed"]
pub struct Pending {
    ticket: Ticket,
    delay: Duration,
}

impl Pending {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the simulated round trip.
    pub async fn settle(self) -> Ticket {
        tokio::time::sleep(self.delay).await;
        self.ticket
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitDelays {
    pub send_otp: Duration,
    pub verify_otp: Duration,
}

impl Default for SubmitDelays {
    fn default() -> Self {
        Self {
            send_otp: Duration::from_millis(1500),
            verify_otp: Duration::from_millis(1500),
        }
    }
}

pub struct AuthFlow {
    session: AuthSession,
    delays: SubmitDelays,
    next_seq: u64,
    in_flight: Option<Ticket>,
}

impl AuthFlow {
    pub fn new(default_calling_code: &str, delays: SubmitDelays) -> Self {
        Self {
            session: AuthSession::new(default_calling_code),
            delays,
            next_seq: 0,
            in_flight: None,
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state
    }

    pub fn is_busy(&self) -> bool {
        self.session.busy
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.state == AuthState::Authenticated
    }

    pub fn select_calling_code(&mut self, code: &str) -> Result<(), AuthError> {
        if self.admit("select_calling_code", AuthState::CollectingPhone)? {
            self.session.phone.set_calling_code(code);
        }
        Ok(())
    }

    pub fn set_phone_input(&mut self, raw: &str) -> Result<(), AuthError> {
        if self.admit("set_phone_input", AuthState::CollectingPhone)? {
            self.session.phone.set_national_number(raw);
        }
        Ok(())
    }

    pub fn set_otp_input(&mut self, raw: &str) -> Result<(), AuthError> {
        if self.admit("set_otp_input", AuthState::AwaitingOtp)? {
            self.session.otp.set(raw);
        }
        Ok(())
    }

    /// `Ok(None)` once authenticated: the call has no effect.
    pub fn submit_phone(&mut self) -> Result<Option<Pending>, AuthError> {
        if !self.admit("submit_phone", AuthState::CollectingPhone)? {
            return Ok(None);
        }
        self.session.error_message.clear();
        if self.session.phone.national_number().len() < MIN_PHONE_DIGITS {
            return Err(self.reject(ValidationError::PhoneTooShort));
        }
        self.session.state = AuthState::Verifying;
        Ok(Some(self.begin(PendingAction::SendOtp)))
    }

    pub fn submit_otp(&mut self) -> Result<Option<Pending>, AuthError> {
        if !self.admit("submit_otp", AuthState::AwaitingOtp)? {
            return Ok(None);
        }
        self.session.error_message.clear();
        if !self.session.otp.is_complete() {
            return Err(self.reject(ValidationError::OtpIncomplete));
        }
        Ok(Some(self.begin(PendingAction::VerifyOtp)))
    }

    pub fn change_phone_number(&mut self) -> Result<(), AuthError> {
        if self.admit("change_phone_number", AuthState::AwaitingOtp)? {
            self.session.otp.clear();
            self.session.error_message.clear();
            self.session.state = AuthState::CollectingPhone;
            debug!("auth: back to phone entry");
        }
        Ok(())
    }

    /// Resolve the in-flight submission. Tickets that do not match it are
    /// ignored.
    pub fn complete(&mut self, ticket: Ticket) -> Option<AuthSignal> {
        if self.in_flight != Some(ticket) {
            warn!("auth: ignoring stale completion {ticket:?}");
            return None;
        }
        self.in_flight = None;
        self.session.busy = false;
        let signal = match ticket.action {
            PendingAction::SendOtp => {
                self.session.state = AuthState::AwaitingOtp;
                AuthSignal::OtpSent {
                    destination: self.session.phone.display(),
                }
            }
            PendingAction::VerifyOtp => {
                self.session.state = AuthState::Authenticated;
                AuthSignal::LoginSuccessful
            }
        };
        info!("auth: {signal:?}");
        Some(signal)
    }

    /// Abandon the in-flight submission. A phone submission falls back to
    /// phone entry; an OTP check leaves the code screen as it was.
    pub fn cancel(&mut self, ticket: Ticket) {
        if self.in_flight != Some(ticket) {
            warn!("auth: ignoring cancel for stale {ticket:?}");
            return;
        }
        self.in_flight = None;
        self.session.busy = false;
        if self.session.state == AuthState::Verifying {
            self.session.state = AuthState::CollectingPhone;
        }
        debug!("auth: {:?} cancelled", ticket.action);
    }

    /// Settle `pending` and complete it in one go.
    pub async fn drive(&mut self, pending: Pending) -> Option<AuthSignal> {
        let ticket = pending.settle().await;
        self.complete(ticket)
    }

    /// `Ok(false)` once signed in: the caller should do nothing.
    fn admit(&self, action: &'static str, accepts: AuthState) -> Result<bool, AuthError> {
        if self.session.state == AuthState::Authenticated {
            debug!("auth: {action} ignored after sign-in");
            return Ok(false);
        }
        if self.session.busy {
            return Err(AuthError::Busy);
        }
        if self.session.state != accepts {
            return Err(AuthError::OutOfStep {
                action,
                state: self.session.state,
            });
        }
        Ok(true)
    }

    fn reject(&mut self, err: ValidationError) -> AuthError {
        self.session.error_message = err.to_string();
        debug!("auth: rejected input: {err}");
        err.into()
    }

    fn begin(&mut self, action: PendingAction) -> Pending {
        self.session.busy = true;
        self.next_seq += 1;
        let ticket = Ticket {
            seq: self.next_seq,
            action,
        };
        self.in_flight = Some(ticket);
        let delay = match action {
            PendingAction::SendOtp => self.delays.send_otp,
            PendingAction::VerifyOtp => self.delays.verify_otp,
        };
        debug!("auth: {action:?} in flight for {delay:?}");
        Pending { ticket, delay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> AuthFlow {
        AuthFlow::new("+1", SubmitDelays::default())
    }

    fn awaiting_otp() -> AuthFlow {
        let mut flow = flow();
        flow.set_phone_input("5551234567").unwrap();
        let pending = flow.submit_phone().unwrap().unwrap();
        flow.complete(pending.ticket()).unwrap();
        flow
    }

    #[test]
    fn short_phone_is_rejected_in_place() {
        let mut flow = flow();
        flow.set_phone_input("12345").unwrap();
        let err = flow.submit_phone().unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::PhoneTooShort));
        assert_eq!(flow.state(), AuthState::CollectingPhone);
        assert_eq!(flow.session().error_message(), "Please enter a valid phone number");
        assert!(!flow.is_busy());
    }

    #[test]
    fn phone_submission_goes_busy_then_awaits_otp() {
        let mut flow = flow();
        flow.select_calling_code("+44").unwrap();
        flow.set_phone_input("7700-900123").unwrap();
        let pending = flow.submit_phone().unwrap().unwrap();
        assert_eq!(flow.state(), AuthState::Verifying);
        assert!(flow.is_busy());
        assert_eq!(pending.delay(), Duration::from_millis(1500));

        let signal = flow.complete(pending.ticket());
        assert_eq!(
            signal,
            Some(AuthSignal::OtpSent { destination: "+44 7700900123".into() })
        );
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert!(!flow.is_busy());
        assert_eq!(flow.session().error_message(), "");
    }

    #[test]
    fn new_attempt_clears_previous_error() {
        let mut flow = flow();
        assert!(flow.submit_phone().is_err());
        assert!(!flow.session().error_message().is_empty());
        flow.set_phone_input("123456").unwrap();
        let _pending = flow.submit_phone().unwrap().unwrap();
        assert_eq!(flow.session().error_message(), "");
    }

    #[test]
    fn busy_flow_rejects_every_input() {
        let mut flow = flow();
        flow.set_phone_input("123456").unwrap();
        let _pending = flow.submit_phone().unwrap().unwrap();
        assert_eq!(flow.submit_phone().unwrap_err(), AuthError::Busy);
        assert_eq!(flow.set_phone_input("999").unwrap_err(), AuthError::Busy);
        assert_eq!(flow.select_calling_code("+7").unwrap_err(), AuthError::Busy);
        assert_eq!(flow.change_phone_number().unwrap_err(), AuthError::Busy);
        assert_eq!(flow.session().phone().national_number(), "123456");
        assert_eq!(flow.session().phone().calling_code(), "+1");
    }

    #[test]
    fn otp_of_wrong_length_is_rejected() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("12345").unwrap();
        let err = flow.submit_otp().unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::OtpIncomplete));
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert_eq!(flow.session().error_message(), "Please enter a valid 6-digit OTP");
    }

    #[test]
    fn otp_verification_stays_on_otp_screen_while_busy() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("424242").unwrap();
        let pending = flow.submit_otp().unwrap().unwrap();
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert!(flow.is_busy());
        assert_eq!(flow.set_otp_input("000000").unwrap_err(), AuthError::Busy);

        assert_eq!(flow.complete(pending.ticket()), Some(AuthSignal::LoginSuccessful));
        assert!(flow.is_authenticated());
        assert!(!flow.is_busy());
    }

    #[test]
    fn change_phone_number_resets_otp_context() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("12").unwrap();
        let _ = flow.submit_otp();
        flow.change_phone_number().unwrap();
        assert_eq!(flow.state(), AuthState::CollectingPhone);
        assert_eq!(flow.session().otp().as_str(), "");
        assert_eq!(flow.session().error_message(), "");
        assert_eq!(flow.session().phone().national_number(), "5551234567");
    }

    #[test]
    fn actions_outside_their_state_are_out_of_step() {
        let mut flow = flow();
        assert!(matches!(
            flow.submit_otp(),
            Err(AuthError::OutOfStep { action: "submit_otp", state: AuthState::CollectingPhone })
        ));
        assert!(matches!(flow.change_phone_number(), Err(AuthError::OutOfStep { .. })));

        let mut flow = awaiting_otp();
        assert!(matches!(flow.set_phone_input("1"), Err(AuthError::OutOfStep { .. })));
        assert_eq!(flow.session().error_message(), "");
    }

    #[test]
    fn authenticated_flow_ignores_everything() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("123456").unwrap();
        let pending = flow.submit_otp().unwrap().unwrap();
        let ticket = pending.ticket();
        flow.complete(ticket).unwrap();

        let before = flow.session().clone();
        assert!(flow.submit_phone().unwrap().is_none());
        assert!(flow.submit_otp().unwrap().is_none());
        flow.change_phone_number().unwrap();
        flow.set_phone_input("999999").unwrap();
        assert_eq!(flow.complete(ticket), None);
        assert_eq!(flow.session(), &before);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut flow = flow();
        flow.set_phone_input("123456").unwrap();
        let first = flow.submit_phone().unwrap().unwrap().ticket();
        flow.complete(first).unwrap();
        flow.change_phone_number().unwrap();
        let second = flow.submit_phone().unwrap().unwrap();

        assert_eq!(flow.complete(first), None);
        assert!(flow.is_busy());
        assert!(flow.complete(second.ticket()).is_some());
    }

    #[test]
    fn dropped_submission_can_be_cancelled() {
        let mut flow = flow();
        flow.set_phone_input("123456").unwrap();
        let pending = flow.submit_phone().unwrap().unwrap();
        let ticket = pending.ticket();
        drop(pending);
        assert_eq!(flow.set_phone_input("1").unwrap_err(), AuthError::Busy);

        flow.cancel(ticket);
        assert_eq!(flow.state(), AuthState::CollectingPhone);
        assert!(!flow.is_busy());
        assert_eq!(flow.complete(ticket), None);
        let retry = flow.submit_phone().unwrap().unwrap();
        assert!(flow.complete(retry.ticket()).is_some());
    }

    #[test]
    fn cancelled_otp_check_stays_on_code_screen() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("123456").unwrap();
        let ticket = flow.submit_otp().unwrap().unwrap().ticket();
        flow.cancel(ticket);
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert!(!flow.is_busy());
        assert_eq!(flow.session().otp().as_str(), "123456");
        flow.change_phone_number().unwrap();
    }

    #[test]
    fn seven_digit_code_is_rejected() {
        let mut flow = awaiting_otp();
        flow.set_otp_input("1234567").unwrap();
        let err = flow.submit_otp().unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::OtpIncomplete));
        assert_eq!(flow.state(), AuthState::AwaitingOtp);
        assert!(!flow.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn drive_waits_for_the_configured_delay() {
        let delays = SubmitDelays {
            send_otp: Duration::from_secs(2),
            verify_otp: Duration::from_secs(3),
        };
        let mut flow = AuthFlow::new("+1", delays);
        flow.set_phone_input("5550100").unwrap();
        let start = tokio::time::Instant::now();
        let pending = flow.submit_phone().unwrap().unwrap();
        let signal = flow.drive(pending).await;
        assert!(matches!(signal, Some(AuthSignal::OtpSent { .. })));
        assert!(start.elapsed() >= Duration::from_secs(2));

        flow.set_otp_input("654321").unwrap();
        let pending = flow.submit_otp().unwrap().unwrap();
        assert_eq!(flow.drive(pending).await, Some(AuthSignal::LoginSuccessful));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
