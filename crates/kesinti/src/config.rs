use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_PAGE_URL: &str = "https://www.iski.istanbul/web/tr-TR/ariza-kesinti";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_COUNTRY_CODE: &str = "+90";

static RE_NATIONAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("invalid regex: national number"));
static RE_COUNTRY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{1,3}$").expect("invalid regex: country code"));

#[derive(Debug, thiserror::Error)]
pub enum PhoneNumberError {
    #[error("Invalid national number '{0}'. Expected exactly 10 digits")]
    NationalNumber(String),
    #[error("Invalid country code '{0}'. Expected '+' followed by 1 to 3 digits")]
    CountryCode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// A recipient number in `+<country code><national number>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn from_national(country_code: &str, national: &str) -> Result<Self, PhoneNumberError> {
        if !RE_COUNTRY_CODE.is_match(country_code) {
            return Err(PhoneNumberError::CountryCode(country_code.to_string()));
        }
        let national = national.trim();
        if !RE_NATIONAL_NUMBER.is_match(national) {
            return Err(PhoneNumberError::NationalNumber(national.to_string()));
        }
        Ok(Self(format!("{}{}", country_code, national)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone)]
pub struct TwilioConfig {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioConfig {
    /// Builds the Twilio settings, naming the first missing value.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: DEFAULT_TWILIO_API_BASE.to_string(),
            account_sid: account_sid.ok_or(ConfigError::Missing("TWILIO_SID"))?,
            auth_token: auth_token.ok_or(ConfigError::Missing("TWILIO_AUTH"))?,
            from_number: from_number.ok_or(ConfigError::Missing("TWILIO_NUMBER"))?,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[redacted]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub page_url: String,
    pub country_code: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl Config {
    pub fn recipient(&self, national: &str) -> Result<PhoneNumber, PhoneNumberError> {
        PhoneNumber::from_national(&self.country_code, national)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_gets_country_code() {
        let config = Config::default();

        let number = config.recipient("5321234567").expect("Should accept 10 digits");
        assert_eq!(number.as_str(), "+905321234567");
        assert_eq!(number.to_string(), "+905321234567");
    }

    #[test]
    fn test_recipient_rejects_malformed_numbers() {
        let config = Config::default();

        for bad in [
            "",
            "532123456",
            "53212345678",
            "532-123-4567",
            "+905321234567",
            "٥٣٢١٢٣٤٥٦٧",
            "５３２１２３４５６７",
        ] {
            assert!(
                matches!(
                    config.recipient(bad),
                    Err(PhoneNumberError::NationalNumber(_))
                ),
                "Should reject '{}'",
                bad
            );
        }
    }

    #[test]
    fn test_invalid_country_code() {
        let result = PhoneNumber::from_national("90", "5321234567");

        assert!(matches!(result, Err(PhoneNumberError::CountryCode(_))));

        let result = PhoneNumber::from_national("+٩٠", "5321234567");
        assert!(matches!(result, Err(PhoneNumberError::CountryCode(_))));
    }

    #[test]
    fn test_twilio_config_reports_missing_setting() {
        let err = TwilioConfig::from_parts(Some("AC123".into()), None, Some("+15005550006".into()))
            .expect_err("Should be missing auth token");

        assert_eq!(err.to_string(), "Missing required setting: TWILIO_AUTH");
    }

    #[test]
    fn test_twilio_config_debug_hides_token() {
        let config = TwilioConfig::from_parts(
            Some("AC123".into()),
            Some("secret-token".into()),
            Some("+15005550006".into()),
        )
        .expect("Should build config")
        .with_api_base("http://localhost:8080/");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert_eq!(config.api_base, "http://localhost:8080");
    }
}
