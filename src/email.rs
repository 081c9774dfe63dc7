//! Email sending endpoints.

use crate::error::RawResponse;
use crate::{Client, Email, EmailResult, Result};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};

const SEND_PATH: &str = "email";
const SEND_BATCH_PATH: &str = "email/batch";

const HEADER_SERVER_TOKEN: &str = "X-Postmark-Server-Token";
const JSON_MIME: &str = "application/json";

/// Handle to the email endpoints, obtained from [`Client::email`].
#[derive(Debug, Clone, Copy)]
pub struct EmailService<'a> {
    client: &'a Client,
}

impl<'a> EmailService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Send a single email.
    ///
    /// Returns the API receipt together with the raw response.
    ///
    /// # Examples
    /// ```no_run
    /// # use postmark_client::{Client, Email};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), postmark_client::Error> {
    /// let client = Client::builder().server_token("server-token").build()?;
    /// let email = Email::new()
    ///     .from("sender@example.com")
    ///     .to("receiver@example.com")
    ///     .subject("Subject")
    ///     .text_body("Body");
    /// let (result, _) = client.email().send(&email).await?;
    /// println!("{}", result.message_id);
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(name = "Send email", skip(self, email))]
    pub async fn send(&self, email: &Email) -> Result<(EmailResult, RawResponse)> {
        let request = self.request(SEND_PATH, email)?;
        self.client.execute_json(request).await
    }

    /// Send several emails in one call.
    ///
    /// Results come back in the same order as `emails`. The count is not
    /// checked against the request; a malformed payload surfaces as
    /// [`crate::Error::Decode`].
    #[tracing::instrument(
        name = "Send email batch",
        skip(self, emails),
        fields(count = emails.len())
    )]
    pub async fn send_batch(&self, emails: &[Email]) -> Result<(Vec<EmailResult>, RawResponse)> {
        let request = self.request(SEND_BATCH_PATH, emails)?;
        self.client.execute_json(request).await
    }

    /// Build an authenticated JSON POST for an email endpoint.
    fn request<B>(&self, path: &str, body: &B) -> Result<reqwest::Request>
    where
        B: serde::Serialize + ?Sized,
    {
        let mut request = self.client.new_request(Method::POST, path, Some(body))?;

        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME));
        let mut token = HeaderValue::from_str(self.client.server_token())?;
        token.set_sensitive(true);
        headers.insert(HEADER_SERVER_TOKEN, token);

        Ok(request)
    }
}
