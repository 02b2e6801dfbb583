use std::error::Error;

/// A message pattern mapped to a short description
struct ErrorRule {
    patterns: &'static [&'static str],
    message: &'static str,
}

const RULES: &[ErrorRule] = &[
    ErrorRule {
        patterns: &["certificate", "UnknownIssuer", "NotValidForName"],
        message: "TLS certificate could not be verified",
    },
    ErrorRule {
        patterns: &["handshake", "TLS", "SSL"],
        message: "TLS handshake failed",
    },
    ErrorRule {
        patterns: &[
            "failed to lookup address",
            "nodename nor servname",
            "name resolution",
            "dns error",
        ],
        message: "DNS resolution failed",
    },
    ErrorRule {
        patterns: &["Connection refused", "connection refused"],
        message: "Connection refused",
    },
    ErrorRule {
        patterns: &["Connection reset", "connection reset"],
        message: "Connection reset by server",
    },
    ErrorRule {
        patterns: &["Network is unreachable", "No route to host"],
        message: "Network unreachable",
    },
    ErrorRule {
        patterns: &["timed out", "timeout"],
        message: "Request timed out",
    },
    ErrorRule {
        patterns: &["connection closed", "IncompleteMessage", "unexpected EOF"],
        message: "Connection closed before the response completed",
    },
];

impl ErrorRule {
    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| text.contains(pattern))
    }
}

/// Condense a `reqwest` error into a single human-readable line.
///
/// `reqwest` errors wrap `hyper`, `io` and TLS errors several levels deep
/// and their top-level `Display` is usually just "error sending request".
/// This walks the source chain and reports the most specific known cause.
pub(crate) fn trim_error_output(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "Request timed out".to_string();
    }

    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<std::io::Error>() {
            if let Some(message) = analyze_io_error(io_error) {
                return message.to_string();
            }
        }
        let text = err.to_string();
        if let Some(rule) = RULES.iter().find(|rule| rule.matches(&text)) {
            return rule.message.to_string();
        }
        source = err.source();
    }

    if error.is_connect() {
        "Connection failed".to_string()
    } else if error.is_body() || error.is_decode() {
        "Failed to read the response body".to_string()
    } else {
        format!("Request failed: {error}")
    }
}

fn analyze_io_error(io_error: &std::io::Error) -> Option<&'static str> {
    use std::io::ErrorKind;

    match io_error.kind() {
        ErrorKind::ConnectionRefused => Some("Connection refused"),
        ErrorKind::ConnectionReset => Some("Connection reset by server"),
        ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe | ErrorKind::UnexpectedEof => {
            Some("Connection closed before the response completed")
        }
        ErrorKind::TimedOut => Some("Request timed out"),
        ErrorKind::NetworkUnreachable | ErrorKind::HostUnreachable => {
            Some("Network unreachable")
        }
        _ => None,
    }
}
