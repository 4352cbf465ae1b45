//! Handlers for commands that talk to the backend or the validation model
//! without producing a report: site audits, name validation, and billing.

use aivis_client::{AuditStatus, BackendClient, BrandValidator, EntityKind, SiteAudit};
use aivis_core::AppConfig;
use anyhow::Context;

fn backend(config: &AppConfig) -> anyhow::Result<BackendClient> {
    BackendClient::new(config).context("failed to build backend client")
}

/// Start a site audit and wait for it to finish.
///
/// # Errors
///
/// Returns an error if the audit cannot be created or polling fails.
pub(crate) async fn run_audit(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let client = backend(config)?;
    let created = client.create_site_audit(url).await?;
    tracing::info!(audit_id = %created.id, url, "site audit started");

    let audit = if created.status.is_terminal() {
        created
    } else {
        client.poll_site_audit(&created.id).await?
    };
    print_audit(&audit);

    if audit.status == AuditStatus::Failed {
        anyhow::bail!(
            "site audit {} failed: {}",
            audit.id,
            audit.error.as_deref().unwrap_or("no reason given")
        );
    }
    Ok(())
}

fn print_audit(audit: &SiteAudit) {
    println!("Site audit: {}", audit.url);
    match audit.score {
        Some(score) => println!("Score: {score:.0}/100"),
        None => println!("Score: \u{2014}"),
    }
    if !audit.checks.is_empty() {
        println!();
        for check in &audit.checks {
            let mark = if check.passed { "pass" } else { "FAIL" };
            let severity = check
                .severity
                .as_deref()
                .map(|s| format!(" [{s}]"))
                .unwrap_or_default();
            println!("{mark:<5}{}{severity}", check.name);
            if let Some(message) = check.message.as_deref().filter(|_| !check.passed) {
                println!("     {message}");
            }
        }
    }
    if !audit.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for rec in &audit.recommendations {
            println!("- {rec}");
        }
    }
}

/// Validate a brand or category name. Never fails on API problems; the name
/// is then accepted as entered.
///
/// # Errors
///
/// Returns an error only if the validator cannot be built from config.
pub(crate) async fn run_validate(config: &AppConfig, name: &str) -> anyhow::Result<()> {
    let validator = BrandValidator::new(config).context("failed to build brand validator")?;
    let result = validator.validate(name).await;

    let kind = match result.kind {
        Some(EntityKind::Brand) => "brand",
        Some(EntityKind::Category) => "category",
        Some(EntityKind::Local) => "local business",
        None => "unclassified",
    };
    if result.valid {
        println!("{} ({kind})", result.corrected_name);
        if result.corrected_name != name.trim() {
            println!("corrected from: {}", name.trim());
        }
    } else {
        println!("not recognised: {}", name.trim());
    }
    if !result.suggestions.is_empty() {
        println!("did you mean: {}", result.suggestions.join(", "));
    }
    Ok(())
}

/// Print subscription status. Falls back to the free tier when the backend
/// cannot say.
///
/// # Errors
///
/// Returns an error only if the backend client cannot be built.
pub(crate) async fn run_billing(config: &AppConfig) -> anyhow::Result<()> {
    let status = backend(config)?.billing_status().await;
    if status.has_subscription {
        println!("plan: subscribed");
    } else {
        println!("plan: free");
    }
    println!(
        "reports: {} used of {} ({} remaining)",
        status.reports_used,
        status.reports_limit,
        status.reports_remaining()
    );
    if !status.can_create_report() {
        println!("report limit reached; run `aivis checkout --price-id <price>` to upgrade");
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the checkout session cannot be created.
pub(crate) async fn run_checkout(config: &AppConfig, price_id: &str) -> anyhow::Result<()> {
    let session = backend(config)?.create_checkout_session(price_id).await?;
    println!("{}", session.url);
    Ok(())
}

/// # Errors
///
/// Returns an error if the portal session cannot be created.
pub(crate) async fn run_portal(config: &AppConfig) -> anyhow::Result<()> {
    let session = backend(config)?.create_portal_session().await?;
    println!("{}", session.url);
    Ok(())
}
