//! Viewer session.
//!
//! The login is a hardcoded credential pair checked on the client. It gates
//! which streams are shown and is not a security boundary.

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Anonymous,
    Privileged,
}

/// Session-scoped viewer context, passed explicitly to everything that
/// filters by role.
#[derive(Debug, Clone, Default)]
pub struct Session {
    role: Role,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn privileged() -> Self {
        Self {
            role: Role::Privileged,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role == Role::Privileged
    }

    /// Check the configured credential pair. On success the session becomes
    /// privileged; on failure it is left unchanged.
    pub fn login(&mut self, config: &Config, user: &str, password: &str) -> bool {
        let ok = user == config.admin_user && password == config.admin_password;
        if ok {
            self.role = Role::Privileged;
            tracing::info!(user = %user, "Login succeeded");
        } else {
            tracing::warn!(user = %user, "Login failed");
        }
        ok
    }

    pub fn logout(&mut self) {
        if self.role == Role::Privileged {
            tracing::info!("Logged out");
        }
        self.role = Role::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_with_configured_pair() {
        let config = Config::default();
        let mut session = Session::anonymous();

        assert!(!session.login(&config, "admin", "wrong"));
        assert_eq!(session.role(), Role::Anonymous);

        assert!(session.login(&config, "admin", "admin123"));
        assert!(session.is_privileged());

        session.logout();
        assert_eq!(session.role(), Role::Anonymous);
    }
}
