//! Request-scoped security context

/// Record of who made the request and how they authenticated
///
/// Built once per request after a successful authentication, read-only for
/// the rest of request processing, discarded at end of request.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    scheme: &'static str,
    email: String,
}

impl SecurityContext {
    pub fn new(scheme: &'static str, email: impl Into<String>) -> Self {
        Self {
            scheme,
            email: email.into(),
        }
    }

    /// Email of the authenticated identity.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The authentication scheme that was used (`Basic`, `Bearer`).
    pub fn authentication_scheme(&self) -> &'static str {
        self.scheme
    }

    /// A context only exists after authentication succeeded.
    pub fn is_secure(&self) -> bool {
        true
    }
}
