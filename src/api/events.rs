#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Error, message: message.into() }
    }
}

/// Outcomes of the sign-in flow the screen reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSignal {
    OtpSent { destination: String },
    LoginSuccessful,
}

impl AuthSignal {
    pub fn toast(&self) -> Toast {
        match self {
            AuthSignal::OtpSent { .. } => Toast::success("OTP sent successfully!"),
            AuthSignal::LoginSuccessful => Toast::success("Login successful!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSignal {
    Created { id: String },
    Deleted { id: String },
}

impl ListSignal {
    pub fn toast(&self) -> Toast {
        match self {
            ListSignal::Created { .. } => Toast::success("New chatroom created!"),
            ListSignal::Deleted { .. } => Toast::success("Chatroom deleted successfully"),
        }
    }
}
