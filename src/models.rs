//! Request and response types for the email endpoints.

use chrono::{DateTime, Utc};
use serde::de::value::MapAccessDeserializer;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An outgoing email.
///
/// Every field is optional; absent fields are left out of the JSON payload.
/// No validation happens client-side, the API decides what is acceptable.
///
/// # Examples
/// ```
/// use postmark_client::Email;
///
/// let email = Email::new()
///     .from("sender@example.com")
///     .to("receiver@example.com")
///     .subject("Hello")
///     .text_body("Body");
/// assert_eq!(email.to.as_deref(), Some("receiver@example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Email {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Create an email with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Recipient(s); Postmark accepts a comma-separated list.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Append a custom message header.
    pub fn header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn track_opens(mut self, track: bool) -> Self {
        self.track_opens = Some(track);
        self
    }

    /// Append an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// A custom message header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

/// A file attached to an email.
///
/// `content` holds the raw bytes; it is base64-encoded only when serialized
/// and decoded back when deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_content")]
    pub content: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(
        rename = "ContentID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_id: Option<String>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
            content_type: Some(content_type.into()),
            content_id: None,
        }
    }

    /// Set the content id used to reference inline images (`cid:...`).
    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

/// Base64 transcoding of attachment content at the serde boundary.
mod base64_content {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(content: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match content {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|s| {
                STANDARD
                    .decode(s.as_bytes())
                    .map_err(|e| de::Error::custom(format!("invalid base64 content: {e}")))
            })
            .transpose()
    }
}

/// The API's receipt for one submitted email.
///
/// Only a JSON object decodes into a result; any other payload shape is a
/// deserialization error even though every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailResult {
    pub to: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub message_id: String,
    /// Per-item status, reported mostly in batch responses. `0` means accepted.
    pub error_code: i64,
    pub message: String,
}

#[derive(Deserialize)]
struct EmailResultFields {
    #[serde(rename = "To", default)]
    to: String,
    #[serde(rename = "SubmittedAt", default)]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(rename = "MessageID", default)]
    message_id: String,
    #[serde(rename = "ErrorCode", default)]
    error_code: i64,
    #[serde(rename = "Message", default)]
    message: String,
}

impl<'de> Deserialize<'de> for EmailResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = EmailResult;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an email result object")
            }

            fn visit_map<A>(self, map: A) -> Result<EmailResult, A::Error>
            where
                A: MapAccess<'de>,
            {
                let fields = EmailResultFields::deserialize(MapAccessDeserializer::new(map))?;
                Ok(EmailResult {
                    to: fields.to,
                    submitted_at: fields.submitted_at,
                    message_id: fields.message_id,
                    error_code: fields.error_code,
                    message: fields.message,
                })
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}
