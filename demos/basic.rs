//! Basic example demonstrating the hub API client.
//!
//! Run with a `.restconfig.json` in the working directory:
//! ```
//! cargo run --example basic
//! ```

use std::time::Duration;

use hubapi::{
    create_version_report, ConnectionConfig, HubClient, List, Project, ProjectListQuery,
    ReportCategory, ReportFormat, ReportPoller, RetryPolicy,
};

#[tokio::main]
async fn main() -> hubapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Connecting...");
    let config = ConnectionConfig::load(ConnectionConfig::default_path())?;
    let client = HubClient::connect(&config).await?;
    println!(
        "Connected to {} (server {})",
        client.base_url(),
        client.server_version().await?
    );

    // List first page of projects
    println!("\n--- Listing Projects (first page) ---");
    let projects_page = Project::list_page(&client, &ProjectListQuery::default(), 0, 10).await?;
    println!(
        "Found {} projects (total: {:?})",
        projects_page.len(),
        projects_page.total
    );

    for project in &projects_page {
        println!(
            "  - {} {}",
            project.name,
            project.description.as_deref().unwrap_or("")
        );
    }

    let Some(project) = projects_page.items.first() else {
        println!("\nNo projects, done.");
        return Ok(());
    };

    println!("\n--- Versions of {} ---", project.name);
    let versions = project.versions(&client).await?;
    for version in &versions {
        let phase = version
            .phase
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  - {} [{}]", version.version_name, phase);
    }

    let Some(version) = versions.first() else {
        println!("\nNo versions, done.");
        return Ok(());
    };

    println!("\n--- BOM of {} ---", version.version_name);
    let components = version.components(&client).await?;
    println!("Found {} components", components.len());
    for component in components.iter().take(5) {
        println!(
            "  - {} {} ({})",
            component.component_name,
            component.component_version_name.as_deref().unwrap_or(""),
            component.license_names()
        );
    }

    let status = version.policy_status(&client).await?;
    println!("Policy status: {}", status.overall_status);

    println!("\n--- Version report ---");
    let mut job = create_version_report(
        &client,
        version,
        &[ReportCategory::Version, ReportCategory::Components],
        ReportFormat::Csv,
    )
    .await?;
    let poller = ReportPoller::new(RetryPolicy::fixed(60, Duration::from_secs(5)));
    let archive = poller.fetch(&client, &mut job).await?;
    tokio::fs::write("version-report.zip", &archive).await?;
    println!("Wrote version-report.zip ({} bytes)", archive.len());
    job.delete(&client).await?;

    println!("\nDone!");
    Ok(())
}
