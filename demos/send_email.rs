//! Send a single email using credentials from the environment.
//!
//! ```text
//! POSTMARK_SERVER_TOKEN=... RUST_LOG=postmark_client=debug cargo run --example send_email
//! ```

use postmark_client::{ClientBuilder, Email};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), postmark_client::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = ClientBuilder::from_env().build()?;

    let email = Email::new()
        .to("receiver@example.com")
        .from("sender@example.com")
        .subject("Subject")
        .text_body("Body");

    match client.email().send(&email).await {
        Ok((result, response)) => {
            println!("Email sent ({}): {}", response.status, result.message_id);
        }
        Err(err) => {
            eprintln!("Error sending email: {err}");
            if let Some(response) = err.response() {
                eprintln!("Response body: {}", response.text());
            }
        }
    }

    Ok(())
}
