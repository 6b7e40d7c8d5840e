//! Example demonstrating the verification service with the mock mail transport
//!
//! Run with: cargo run --example verification_service_demo

use std::sync::Arc;

use anyhow::Context;
use hs_core::services::verification::{VerificationService, VerificationServiceConfig};
use hs_infra::{load_config, mail::create_mail_transport, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("loading configuration")?;
    init_tracing(&config.logging);

    println!("=== Verification Service Demo ===\n");

    let transport = create_mail_transport(&config.mail).context("configuring mail transport")?;
    let service = VerificationService::new(
        Arc::new(transport),
        VerificationServiceConfig::from(&config.verification),
    );
    service.start();

    let email = "demo.user@example.com";
    println!("Sending verification code to {}...", email);
    let sent = service.send_verification_code(email).await?;
    println!("✓ Verification code sent");
    println!("  - Code: {} (visible in mock mode)", sent.code);
    println!("  - Message ID: {}", sent.message_id);
    println!("  - Expires at: {}", sent.expires_at);

    println!("\n--- Attempting to verify with a wrong code ---");
    println!("Outcome: {}", service.verify_detailed(email, "000000x"));

    println!("\n--- Attempting to verify the code ---");
    if service.verify(email, &sent.code) {
        println!("✓ Code verified successfully!");
    } else {
        println!("✗ Verification failed");
    }

    println!("\n--- Replaying the same code ---");
    println!("Outcome: {}", service.verify_detailed(email, &sent.code));

    service.shutdown().await;
    println!("\nService shut down, {} codes left in memory", service.stored_codes());

    Ok(())
}
