//! Commerce SDK configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::Environment;
use crate::application::CoordinatorSettings;

/// Store platform a public SDK key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePlatform {
    AppStore,
    PlayStore,
}

/// Commerce backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CommerceConfig {
    /// Public SDK key (`appl_...` or `goog_...`)
    pub public_api_key: SecretString,

    /// Subscription management page used when the backend has none
    pub management_url: Option<String>,

    /// Offering to display when none is marked current
    pub offering_id: Option<String>,
}

impl CommerceConfig {
    /// Platform the key was issued for, if recognizable.
    pub fn platform(&self) -> Option<StorePlatform> {
        let key = self.public_api_key.expose_secret();
        if key.starts_with("appl_") {
            Some(StorePlatform::AppStore)
        } else if key.starts_with("goog_") {
            Some(StorePlatform::PlayStore)
        } else {
            None
        }
    }

    /// Default management page for the key's platform.
    pub fn platform_management_url(&self) -> Option<&'static str> {
        match self.platform()? {
            StorePlatform::AppStore => Some("https://apps.apple.com/account/subscriptions"),
            StorePlatform::PlayStore => Some("https://play.google.com/store/account/subscriptions"),
        }
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            fallback_management_url: self
                .management_url
                .clone()
                .or_else(|| self.platform_management_url().map(str::to_string)),
            offering_id: self.offering_id.clone(),
        }
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.public_api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("COMMERCE_PUBLIC_API_KEY"));
        }
        if self.platform().is_none() {
            return Err(ValidationError::InvalidCommerceKey);
        }

        if let Some(url) = &self.management_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ValidationError::InvalidManagementUrl);
            }
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::ManagementUrlMustBeHttps);
            }
        }

        Ok(())
    }
}
