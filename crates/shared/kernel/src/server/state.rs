use axum::extract::FromRef;
use corral_database::Database;
use corral_domain::profile::Profile;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[corral_derive::app_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub profile: Profile,
    pub database: Option<Database>,
}

/// Shared application state: the loaded profile plus the optional database
/// handle. Cheap to clone into handlers and background tasks.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for Profile {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.profile.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    profile: Option<Profile>,
    database: Option<Database>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    #[must_use]
    pub fn database(mut self, database: Option<Database>) -> Self {
        self.database = database;
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when the profile is missing.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let profile = self.profile.ok_or(ApiStateError::Validation {
            message: "Profile not provided".into(),
            context: None,
        })?;

        Ok(ApiState { inner: Arc::new(ApiStateInner { profile, database: self.database }) })
    }
}
