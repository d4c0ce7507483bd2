//! Who is using the client. The search core never consults this; it only
//! decides how the CLI greets the user.

/// Source of the current user's identity.
pub trait SessionProvider: Send + Sync {
  fn is_authenticated(&self) -> bool {
    self.current_user_id().is_some()
  }

  fn current_user_id(&self) -> Option<u64>;
}

/// Session taken from the `JOBSEEK_USER_ID` environment variable.
#[derive(Debug, Clone, Default)]
pub struct EnvSession {
  user_id: Option<u64>,
}

impl EnvSession {
  pub const VAR: &'static str = "JOBSEEK_USER_ID";

  pub fn from_env() -> Self {
    Self::from_value(std::env::var(Self::VAR).ok().as_deref())
  }

  /// A missing, blank or non-numeric value means a guest session
  fn from_value(value: Option<&str>) -> Self {
    let user_id = value.and_then(|v| v.trim().parse().ok());
    Self { user_id }
  }
}

impl SessionProvider for EnvSession {
  fn current_user_id(&self) -> Option<u64> {
    self.user_id
  }
}
