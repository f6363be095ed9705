use actix_web::HttpRequest;
use uuid::Uuid;

/// Sentinel key when no peer address can be determined; the admission check
/// still runs rather than being skipped.
const UNKNOWN_ORIGIN: &str = "unknown";

/// Who a request is throttled as: the authenticated user when a verified
/// identity is present, the network origin otherwise. Resolved once per
/// request, before the admission check; resolution never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdentity {
    Authenticated { subject: Uuid },
    Anonymous { origin: String },
}

impl ClientIdentity {
    pub fn authenticated(subject: Uuid) -> Self {
        ClientIdentity::Authenticated { subject }
    }

    pub fn from_request(req: &HttpRequest) -> Self {
        let origin = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN_ORIGIN.to_string());

        ClientIdentity::Anonymous { origin }
    }

    /// The admission key. User-scoped keys are prefixed so an authenticated
    /// user and an anonymous caller at the same address consume independent
    /// counters.
    pub fn key(&self) -> String {
        match self {
            ClientIdentity::Authenticated { subject } => format!("user:{subject}"),
            ClientIdentity::Anonymous { origin } => origin.clone(),
        }
    }
}
