//! Operator client for the duplicate contact cleanup endpoint.
//!
//! ```text
//! cleanup_client --preview
//! cleanup_client --preview --tenant-id tenant_abc123
//! cleanup_client --safe
//! cleanup_client --execute --tenant-id tenant_xyz --no-confirm
//! ```

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use shared_types::{CleanupReport, GroupOutcome};
use std::io::{BufRead, Write};

const SHOWN_DETAILS: usize = 10;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Preview or execute duplicate contact cleanup",
    long_about = None
)]
#[command(group(ArgGroup::new("mode").required(true).args(["preview", "execute", "safe"])))]
struct Args {
    /// Base URL of the CRM API
    #[arg(long, default_value = "http://localhost:8001")]
    base_url: String,

    /// Restrict the cleanup to one tenant
    #[arg(long)]
    tenant_id: Option<String>,

    /// Dry run only, nothing is deleted
    #[arg(long)]
    preview: bool,

    /// Delete duplicates
    #[arg(long)]
    execute: bool,

    /// Preview first, then execute after confirmation
    #[arg(long)]
    safe: bool,

    /// Skip the confirmation prompt
    #[arg(long)]
    no_confirm: bool,
}

struct CleanupClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CleanupClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/contacts/cleanup-duplicates", base_url.trim_end_matches('/')),
        }
    }

    async fn run(&self, tenant_id: Option<&str>, dry_run: bool) -> Result<CleanupReport> {
        let mut query = vec![("dry_run", dry_run.to_string())];
        if let Some(tenant_id) = tenant_id {
            query.push(("tenant_id", tenant_id.to_string()));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Cleanup request failed with {}: {}", status, body);
        }

        response
            .json::<CleanupReport>()
            .await
            .context("Failed to decode cleanup report")
    }
}

fn print_report(report: &CleanupReport) {
    let stats = &report.statistics;

    println!("\nSTATISTICS");
    println!("{}", "-".repeat(70));
    println!("  Total Contacts Scanned:      {}", stats.total_contacts_scanned);
    println!("  Tenants Processed:           {}", stats.tenants_processed);
    println!("  Phone Numbers with Dupes:    {}", stats.phone_numbers_with_duplicates);
    println!("  Duplicate Contacts Found:    {}", stats.duplicates_found);
    println!("  Contacts Kept (Unique):      {}", stats.contacts_kept);
    if report.dry_run {
        println!("  Would Delete:                {}", stats.contacts_deleted);
    } else {
        println!("  Contacts Deleted:            {}", stats.contacts_deleted);
        println!("  Already Resolved Groups:     {}", stats.groups_already_resolved);
        println!("  Failed Groups:               {}", stats.groups_failed);
    }
    println!("  Execution Time:              {:.2}s", report.execution_time_seconds);

    if !report.deletion_details.is_empty() {
        println!(
            "\nDETAILED BREAKDOWN (showing {} entries)",
            report.deletion_details.len().min(SHOWN_DETAILS)
        );
        println!("{}", "-".repeat(70));
    }

    for (idx, detail) in report
        .deletion_details
        .iter()
        .take(SHOWN_DETAILS)
        .enumerate()
    {
        println!(
            "\n  {}. Phone: {} (Tenant: {})",
            idx + 1,
            detail.phone,
            detail.tenant_id
        );
        println!("     Total Duplicates: {}", detail.total_duplicates);

        let kept = &detail.kept_contact;
        println!(
            "     KEPT:         ID={}, Score={}, Name={:?}, Email={:?}",
            kept.id, kept.richness_score, kept.name, kept.email
        );

        let action = match detail.outcome {
            GroupOutcome::WouldDelete => "WOULD DELETE",
            GroupOutcome::Deleted => "DELETED",
            GroupOutcome::AlreadyResolved => "SKIPPED",
            GroupOutcome::Failed => "FAILED",
        };
        for deleted in &detail.deleted_contacts {
            println!(
                "     {:<13} ID={}, Score={}, Name={:?}, Email={:?}",
                format!("{}:", action),
                deleted.id,
                deleted.richness_score,
                deleted.name,
                deleted.email
            );
        }
        if let Some(error) = &detail.error {
            println!("     Error: {}", error);
        }
    }

    if report.deletion_details.len() > SHOWN_DETAILS {
        println!(
            "\n  ... and {} more duplicate groups",
            report.deletion_details.len() - SHOWN_DETAILS
        );
    }
    if let Some(note) = &report.note {
        println!("\n  Note: {}", note);
    }

    println!("\n{}", report.message);
}

fn confirm() -> Result<bool> {
    println!("\nWARNING: This will permanently delete duplicate contacts!");
    print!("Type 'YES' to proceed: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim() == "YES")
}

fn print_target(tenant_id: Option<&str>) {
    match tenant_id {
        Some(tenant_id) => println!("Target: tenant '{}'", tenant_id),
        None => println!("Target: ALL TENANTS"),
    }
}

async fn execute(client: &CleanupClient, tenant_id: Option<&str>, ask: bool) -> Result<()> {
    println!("\nEXECUTION MODE (will delete data)");
    print_target(tenant_id);

    if ask && !confirm()? {
        println!("Cancelled by user");
        return Ok(());
    }

    let report = client.run(tenant_id, false).await?;
    print_report(&report);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = CleanupClient::new(&args.base_url);
    let tenant_id = args.tenant_id.as_deref();

    if args.preview || args.safe {
        println!("\nPREVIEW MODE (dry run)");
        print_target(tenant_id);

        let report = client.run(tenant_id, true).await?;
        print_report(&report);

        if args.safe {
            if report.statistics.duplicates_found == 0 {
                println!("\nNo duplicates found. Nothing to clean up.");
                return Ok(());
            }
            println!(
                "\nWill delete {} duplicate contacts",
                report.statistics.contacts_deleted
            );
            execute(&client, tenant_id, true).await?;
        }
    } else if args.execute {
        execute(&client, tenant_id, !args.no_confirm).await?;
    }

    Ok(())
}
