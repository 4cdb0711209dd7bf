//! Error descriptions for the message overlays
//!
//! Translates Ramen client failures into text an operator can act on. The
//! API server's own message wins when it carries one; everything else is
//! bucketed by [`ErrorKind`] and rewritten.

use kube::core::ErrorResponse;
use ramen_rs::RamenError;

/// Failure bucket, used to prefix messages and pick follow-up hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The API server could not be reached at all
    Connectivity,
    /// The server answered but rejected the caller
    Credentials,
    /// Kubeconfig or context problems, before any request was made
    ClusterConfig,
    /// The target resource does not exist
    Missing,
    /// The resource changed while the request was in flight
    Conflict,
    /// The server did not answer in time
    Timeout,
    /// Any other API-level failure
    Api,
}

impl ErrorKind {
    pub fn of(error: &RamenError) -> Self {
        match error {
            RamenError::Api(kube::Error::Api(response)) => match response.code {
                401 | 403 => ErrorKind::Credentials,
                404 => ErrorKind::Missing,
                409 => ErrorKind::Conflict,
                408 | 504 => ErrorKind::Timeout,
                _ => ErrorKind::Api,
            },
            RamenError::Api(other) => {
                let raw = other.to_string().to_lowercase();
                if raw.contains("timeout") || raw.contains("timed out") {
                    ErrorKind::Timeout
                } else if raw.contains("certificate") || raw.contains("tls") {
                    ErrorKind::Credentials
                } else {
                    ErrorKind::Connectivity
                }
            }
            RamenError::Kubeconfig(_) | RamenError::Infer(_) => ErrorKind::ClusterConfig,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Connectivity => "Connection",
            ErrorKind::Credentials => "Credentials",
            ErrorKind::ClusterConfig => "Cluster config",
            ErrorKind::Missing => "Missing",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Api => "API",
        }
    }
}

/// Describe a RamenError in operator-facing terms
pub fn describe_ramen_error(error: &RamenError) -> String {
    match error {
        RamenError::Api(kube::Error::Api(response)) => describe_api_response(response),
        RamenError::Api(other) => describe_transport(&other.to_string()),
        RamenError::Kubeconfig(e) => {
            format!("Kubeconfig problem: {e} - verify the context name and credentials")
        }
        RamenError::Infer(e) => format!("No usable cluster configuration: {e}"),
    }
}

fn describe_api_response(response: &ErrorResponse) -> String {
    if !response.message.is_empty() {
        return response.message.clone();
    }
    match response.code {
        401 => "The API server rejected the credentials".to_string(),
        403 => "Forbidden - the current user lacks access to the DR resources".to_string(),
        404 => "The resource no longer exists - it may already be unassigned".to_string(),
        409 => "The resource changed while the request was in flight".to_string(),
        408 | 504 => "The API server did not answer in time".to_string(),
        code => format!("API request failed with status {code}"),
    }
}

// Sniffed in order; the first matching fragment wins.
const TRANSPORT_HINTS: &[(&str, &str)] = &[
    (
        "certificate",
        "Certificate validation failed - verify the kubeconfig credentials",
    ),
    (
        "tls",
        "Certificate validation failed - verify the kubeconfig credentials",
    ),
    ("refused", "Nothing is listening at the API server address"),
    ("timed out", "The API server is not answering"),
    ("timeout", "The API server is not answering"),
    ("resolve", "The API server hostname does not resolve"),
    ("dns", "The API server hostname does not resolve"),
];

fn describe_transport(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    for (fragment, text) in TRANSPORT_HINTS {
        if lowered.contains(fragment) {
            return (*text).to_string();
        }
    }
    format!("Could not reach the cluster: {raw}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_response(code: u16, message: &str) -> RamenError {
        RamenError::Api(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.to_string(),
            reason: String::new(),
            code,
        }))
    }

    #[test]
    fn test_server_message_wins() {
        let error = api_response(500, "drplacementcontrols.ramendr.openshift.io \"x\" is invalid");
        assert_eq!(
            describe_ramen_error(&error),
            "drplacementcontrols.ramendr.openshift.io \"x\" is invalid"
        );
    }

    #[test]
    fn test_status_codes_without_message() {
        assert!(describe_ramen_error(&api_response(403, "")).contains("Forbidden"));
        assert!(describe_ramen_error(&api_response(404, "")).contains("no longer exists"));
        assert!(describe_ramen_error(&api_response(418, "")).contains("418"));
    }

    #[test]
    fn test_transport_sniffing() {
        assert!(describe_transport("connection refused").contains("listening"));
        assert!(describe_transport("TLS handshake failure").contains("Certificate"));
        assert!(describe_transport("operation timed out").contains("not answering"));
        assert!(describe_transport("weird failure").contains("weird failure"));
    }

    #[test]
    fn test_kind_buckets() {
        assert_eq!(ErrorKind::of(&api_response(401, "")), ErrorKind::Credentials);
        assert_eq!(ErrorKind::of(&api_response(404, "")), ErrorKind::Missing);
        assert_eq!(ErrorKind::of(&api_response(409, "")), ErrorKind::Conflict);
        assert_eq!(ErrorKind::of(&api_response(504, "")), ErrorKind::Timeout);
        assert_eq!(ErrorKind::of(&api_response(500, "")), ErrorKind::Api);
    }
}
