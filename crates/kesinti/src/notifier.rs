use crate::config::{PhoneNumber, TwilioConfig};
use crate::scraper::build_client;

use reqwest::{Client, Request, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Message rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Unexpected response: {0}")]
    DecodeError(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageForm<'a> {
    body: &'a str,
    from: &'a str,
    to: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u32>,
    message: String,
}

/// Twilio's record of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub sid: String,
    pub status: String,
    pub to: Option<String>,
}

fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(ApiError {
            code: Some(code),
            message,
        }) => format!("{} (code {})", message, code),
        Ok(ApiError { code: None, message }) => message,
        Err(_) => body.trim().to_string(),
    }
}

/// Sorts a Messages API reply into an accepted message or a failure.
fn read_response(status: StatusCode, body: &str) -> Result<SentMessage, NotifyError> {
    if !status.is_success() {
        return Err(NotifyError::Rejected {
            status,
            message: rejection_message(body),
        });
    }

    serde_json::from_str(body).map_err(|e| {
        log::warn!("Could not decode {} response: {}", status, e);
        NotifyError::DecodeError(e)
    })
}

#[derive(Debug, Clone)]
pub struct SmsNotifier {
    client: Client,
    config: TwilioConfig,
}

impl SmsNotifier {
    pub fn new(config: TwilioConfig) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client()?,
            config,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base, self.config.account_sid
        )
    }

    pub(crate) fn build_request(
        &self,
        body: &str,
        to: &PhoneNumber,
    ) -> Result<Request, NotifyError> {
        let form = MessageForm {
            body,
            from: &self.config.from_number,
            to: to.as_str(),
        };

        Ok(self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .build()?)
    }

    pub async fn send(&self, body: &str, to: &PhoneNumber) -> Result<SentMessage, NotifyError> {
        log::info!("Sending message to {}...", to);
        let request = self.build_request(body, to)?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        let sent = read_response(status, &text)?;
        log::debug!("Message {} is {}", sent.sid, sent.status);
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    fn notifier() -> SmsNotifier {
        let config = TwilioConfig::from_parts(
            Some("AC0123456789".into()),
            Some("secret-token".into()),
            Some("+15005550006".into()),
        )
        .expect("Should build config");
        SmsNotifier::new(config).expect("Should build notifier")
    }

    #[test]
    fn test_build_request() {
        let notifier = notifier();
        let to = PhoneNumber::from_national("+90", "5321234567").expect("Valid number");

        let request = notifier
            .build_request("*\nALPHA\n#####\n\nA", &to)
            .expect("Should build request");

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://api.twilio.com/2010-04-01/Accounts/AC0123456789/Messages.json"
        );

        let auth = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .expect("Should send basic auth");
        assert!(auth.starts_with("Basic "));
        assert_eq!(
            request.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/x-www-form-urlencoded"[..])
        );

        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .expect("Should have form body");
        assert_eq!(
            body,
            "Body=*%0AALPHA%0A%23%23%23%23%23%0A%0AA&From=%2B15005550006&To=%2B905321234567"
        );
    }

    #[test]
    fn test_custom_api_base() {
        let config = TwilioConfig::from_parts(
            Some("AC1".into()),
            Some("token".into()),
            Some("+15005550006".into()),
        )
        .expect("Should build config")
        .with_api_base("http://127.0.0.1:9999/");
        let notifier = SmsNotifier::new(config).expect("Should build notifier");
        let to = PhoneNumber::from_national("+90", "5321234567").expect("Valid number");

        let request = notifier.build_request("hi", &to).expect("Should build request");

        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:9999/2010-04-01/Accounts/AC1/Messages.json"
        );
    }

    #[test]
    fn test_rejection_message() {
        let body = r#"{"code": 21211, "message": "The 'To' number is not a valid phone number.", "more_info": "https://www.twilio.com/docs/errors/21211", "status": 400}"#;

        assert_eq!(
            rejection_message(body),
            "The 'To' number is not a valid phone number. (code 21211)"
        );
        assert_eq!(rejection_message("  Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_read_response_created() {
        let body = r#"{"sid": "SM0123", "status": "queued", "to": "+905321234567", "from": "+15005550006"}"#;

        let sent = read_response(StatusCode::CREATED, body).expect("Should accept 201");
        assert_eq!(sent.sid, "SM0123");
        assert_eq!(sent.status, "queued");
    }

    #[test]
    fn test_read_response_rejected() {
        let body = r#"{"code": 20003, "message": "Authenticate", "more_info": "https://www.twilio.com/docs/errors/20003", "status": 401}"#;

        match read_response(StatusCode::UNAUTHORIZED, body) {
            Err(NotifyError::Rejected { status, message }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Authenticate (code 20003)");
            }
            other => panic!("Expected rejection, got {:?}", other),
        }

        let err = read_response(StatusCode::BAD_REQUEST, r#"{"sid": "SM1", "status": "queued"}"#)
            .expect_err("Non-2xx is never a success");
        assert!(matches!(err, NotifyError::Rejected { .. }));
    }

    #[test]
    fn test_read_response_undecodable_success() {
        let err = read_response(StatusCode::OK, "<html>maintenance</html>")
            .expect_err("Should fail to decode");

        assert!(matches!(err, NotifyError::DecodeError(_)));
    }

    #[test]
    fn test_decode_sent_message() {
        let body = r#"{"sid": "SM123", "status": "queued", "to": "+905321234567", "body": "hi", "num_segments": "1"}"#;

        let sent: SentMessage = serde_json::from_str(body).expect("Should decode");
        assert_eq!(sent.sid, "SM123");
        assert_eq!(sent.status, "queued");
        assert_eq!(sent.to.as_deref(), Some("+905321234567"));
    }
}
