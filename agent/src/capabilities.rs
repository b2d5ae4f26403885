//! Optional Platform Capabilities
//!
//! Identity and active-tab access are ambient browser APIs in the original
//! extension. Here they are injected capabilities: absent in headless
//! contexts, so the pipeline degrades to sentinels instead of failing.

/// Resolves the signed-in user's email, when an identity source exists.
pub trait IdentityProvider: Send + Sync {
    /// `None` when the lookup is denied or no account is signed in.
    fn user_email(&self) -> Option<String>;
}

/// Exposes the currently active browsing context, when one exists.
pub trait TabContext: Send + Sync {
    /// Origin of the last active tab, used as the referer.
    fn active_origin(&self) -> Option<String>;
}

/// Identity provider backed by a fixed configured email.
pub struct StaticIdentity {
    email: String,
}

impl StaticIdentity {
    pub fn new(email: String) -> Self {
        Self { email }
    }
}

impl IdentityProvider for StaticIdentity {
    fn user_email(&self) -> Option<String> {
        if self.email.is_empty() {
            None
        } else {
            Some(self.email.clone())
        }
    }
}
