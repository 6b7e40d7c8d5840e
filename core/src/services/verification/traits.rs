//! Trait for mail transport integration

use async_trait::async_trait;

/// Outgoing mail transport
///
/// Implementations deliver a message and report a provider message id. The
/// verification service only stores a code after `send` returns `Ok`.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a message to `to`
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, String>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Box<T> {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        (**self).send(to, subject, body).await
    }
}
