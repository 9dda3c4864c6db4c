//! Sign-in and conversation dashboard core for the Gemini chat client.
//!
//! [`auth::AuthFlow`] drives phone/OTP sign-in and [`conversations::ConversationList`]
//! backs the dashboard. Neither knows about the other or about rendering;
//! [`ui`] is a terminal front end built on top of both.

pub mod api;
pub mod app;
pub mod auth;
pub mod conversations;
pub mod error;
pub mod ui;
pub mod utils;

pub use api::events::{AuthSignal, ListSignal, Toast, ToastKind};
pub use api::models::{Conversation, CountryOption, OtpCode, PhoneCredential};
pub use auth::{AuthFlow, AuthSession, AuthState, Pending, SubmitDelays, Ticket};
pub use conversations::ConversationList;
pub use error::{ApiError, AuthError, ConfigError, ValidationError};
