//! Hub API CLI binary.
//!
//! A command-line interface for interacting with a Black Duck Hub server.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use hubapi::cli::{
    Cli, CodeLocationCommand, Command, ComponentCommand, ConfigCommand, ConnectionArgs,
    GroupCommand, PolicyCommand, PollArgs, ProjectCommand, ReportCommand, RoleCommand,
    ScanCommand, UserCommand, VersionCommand, VersionRef, VulnerabilityCommand,
};
use hubapi::output::PrettyPrint;
use hubapi::{
    create_notices_report, create_version_report, upload_scan, BomComponent, CodeLocation,
    CodeLocationListQuery, ComponentSearchHit, ComponentSearchQuery, ConnectOptions,
    ConnectionConfig, Create, Credential, Delete, Get, HubClient, HubError, List, MediaType, Page,
    PolicyRule, Project, ProjectCreateParams, ProjectListQuery, ProjectUpdateParams,
    ProjectVersion, ReportCategory, ReportJob, ReportPoller, Resource, RetryPolicy, Role, Update,
    User, UserCreateParams, UserGroup, UserGroupCreateParams, UserGroupListQuery, UserListQuery,
    VersionCreateParams, VersionRequest, Vulnerability, VulnerableComponent, DEFAULT_PAGE_SIZE,
};
use serde::Serialize;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = resolve_config(&cli.config, &cli.connection);
    let debug = cli.debug || config.as_ref().is_ok_and(|c| c.debug);
    init_tracing(debug);

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "Hint: Pass --baseurl with --api-token (or --username and --password), \
                 or run from a directory containing {}",
                hubapi::DEFAULT_CONFIG_FILE
            );
            return ExitCode::FAILURE;
        }
    };

    match run(&config, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Merge command-line connection settings over the config file.
fn resolve_config(path: &Path, args: &ConnectionArgs) -> hubapi::Result<ConnectionConfig> {
    let file = if path.exists() {
        Some(ConnectionConfig::load(path)?)
    } else {
        None
    };

    let credential = match (&args.api_token, &args.username, &args.password) {
        (Some(token), _, _) => Some(Credential::ApiToken {
            api_token: token.clone(),
        }),
        (None, Some(username), Some(password)) => Some(Credential::Password {
            username: username.clone(),
            password: password.clone(),
        }),
        (None, Some(_), None) | (None, None, Some(_)) => {
            return Err(HubError::ConfigMissing(
                "--username and --password must be given together".to_string(),
            ))
        }
        (None, None, None) => file.as_ref().map(|c| c.credential.clone()),
    };

    let baseurl = args
        .baseurl
        .clone()
        .or_else(|| file.as_ref().map(|c| c.baseurl.clone()))
        .ok_or_else(|| HubError::ConfigMissing(format!("no base URL in {}", path.display())))?;
    let credential = credential
        .ok_or_else(|| HubError::ConfigMissing(format!("no credentials in {}", path.display())))?;

    let config = match credential {
        Credential::ApiToken { api_token } => ConnectionConfig::with_api_token(&baseurl, &api_token),
        Credential::Password { username, password } => {
            ConnectionConfig::with_password(&baseurl, &username, &password)
        }
    };
    let (insecure, debug) = file.map_or((false, false), |c| (c.insecure, c.debug));
    Ok(config.insecure(args.insecure || insecure).debug(debug))
}

async fn run(config: &ConnectionConfig, cli: Cli) -> hubapi::Result<()> {
    let options = ConnectOptions {
        write_config: !cli.no_write_config || matches!(cli.command, Command::Config(_)),
        config_path: cli.config.clone(),
        check_version: true,
    };
    let client = HubClient::connect_with(config, &options).await?;
    let json = cli.json;

    match cli.command {
        Command::Config(cmd) => handle_config(&client, cmd, &cli.config).await,
        Command::Project(cmd) => handle_project(&client, cmd, json).await,
        Command::Version(cmd) => handle_version(&client, cmd, json).await,
        Command::User(cmd) => handle_user(&client, cmd, json).await,
        Command::Group(cmd) => handle_group(&client, cmd, json).await,
        Command::Role(cmd) => handle_role(&client, cmd, json).await,
        Command::Policy(cmd) => handle_policy(&client, cmd, json).await,
        Command::Component(cmd) => handle_component(&client, cmd, json).await,
        Command::Vulnerability(cmd) => handle_vulnerability(&client, cmd, json).await,
        Command::Codelocation(cmd) => handle_code_location(&client, cmd, json).await,
        Command::Scan(cmd) => handle_scan(&client, cmd).await,
        Command::Report(cmd) => handle_report(&client, cmd).await,
    }
}

async fn handle_config(
    client: &HubClient,
    cmd: ConfigCommand,
    path: &Path,
) -> hubapi::Result<()> {
    match cmd {
        ConfigCommand::Write => {
            let version = client.server_version().await?;
            println!(
                "Connected to {} (version {version}), configuration saved to {}",
                client.base_url(),
                path.display()
            );
        }
    }
    Ok(())
}

async fn handle_project(client: &HubClient, cmd: ProjectCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        ProjectCommand::List {
            name,
            offset,
            limit,
        } => {
            let query = ProjectListQuery {
                name,
                ..Default::default()
            };
            let offset = offset.unwrap_or(0);
            let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
            let projects = Project::list_page(client, &query, offset, limit).await?;
            output_page(&projects, json, |x| ProjectRow::from(x))?;
        }
        ProjectCommand::Get { name } => {
            let project = find_project(client, &name).await?;
            output_single(&project, json)?;
        }
        ProjectCommand::Create {
            name,
            description,
            initial_version,
        } => {
            let params = ProjectCreateParams {
                description,
                version_request: initial_version.as_deref().map(VersionRequest::new),
                ..ProjectCreateParams::new(&name)
            };
            let location = match Project::create(client, &params).await {
                Ok(location) => location,
                Err(e) => {
                    if e.is_precondition_failed() {
                        eprintln!("Hint: A project named '{name}' probably exists already");
                    }
                    return Err(e);
                }
            };
            let project: Project = client.get_json(&location, MediaType::ProjectDetail).await?;
            output_single(&project, json)?;
        }
        ProjectCommand::Update {
            name,
            new_name,
            description,
        } => {
            let project = find_project(client, &name).await?;
            let params = ProjectUpdateParams {
                name: new_name,
                description,
                ..Default::default()
            };
            let href = project.require_href()?.to_string();
            let project = Project::update(client, href, params).await?;
            output_single(&project, json)?;
        }
        ProjectCommand::Delete { name } => {
            let project = find_project(client, &name).await?;
            project.delete(client).await?;
            println!("Deleted project '{name}'");
        }
    }
    Ok(())
}

async fn handle_version(client: &HubClient, cmd: VersionCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        VersionCommand::List { project } => {
            let project = find_project(client, &project).await?;
            let versions = project.versions(client).await?;
            output_list(&versions, json, |x| VersionRow::from(x))?;
        }
        VersionCommand::Get(target) => {
            let version = find_version(client, &target).await?;
            output_single(&version, json)?;
        }
        VersionCommand::Create {
            target,
            phase,
            distribution,
            nickname,
        } => {
            let project = find_project(client, &target.project).await?;
            let request = VersionRequest {
                phase,
                distribution,
                nickname,
                ..VersionRequest::new(&target.version)
            };
            let params = VersionCreateParams::for_project(&project, request)?;
            let location = ProjectVersion::create(client, &params).await?;
            let version = ProjectVersion::get(client, location).await?;
            output_single(&version, json)?;
        }
        VersionCommand::Delete(target) => {
            let version = find_version(client, &target).await?;
            version.delete(client).await?;
            println!("Deleted version '{}' of '{}'", target.version, target.project);
        }
        VersionCommand::Components(target) => {
            let version = find_version(client, &target).await?;
            let components = version.components(client).await?;
            output_list(&components, json, |x| ComponentRow::from(x))?;
        }
        VersionCommand::Vulnerabilities(target) => {
            let version = find_version(client, &target).await?;
            let vulnerable = version.vulnerable_components(client).await?;
            output_list(&vulnerable, json, |x| VulnerableRow::from(x))?;
        }
        VersionCommand::PolicyStatus(target) => {
            let version = find_version(client, &target).await?;
            let status = version.policy_status(client).await?;
            output_single(&status, json)?;
        }
    }
    Ok(())
}

async fn handle_user(client: &HubClient, cmd: UserCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        UserCommand::List { name } => {
            let users = User::list_all(client, &UserListQuery { user_name: name }).await?;
            output_list(&users, json, |x| UserRow::from(x))?;
        }
        UserCommand::Create {
            user_name,
            first_name,
            last_name,
            email,
            initial_password,
        } => {
            let params = UserCreateParams {
                user_name,
                first_name,
                last_name,
                email,
                password: initial_password,
                active: true,
            };
            let location = User::create(client, &params).await?;
            let user: User = client.get_json(&location, MediaType::User).await?;
            output_single(&user, json)?;
        }
        UserCommand::Delete { user_name } => {
            let user = find_user(client, &user_name).await?;
            user.delete(client).await?;
            println!("Deleted user '{user_name}'");
        }
        UserCommand::AssignRole { user_name, role } => {
            let user = find_user(client, &user_name).await?;
            let found = Role::find_by_name(client, &role).await?;
            let role = found.ok_or(HubError::NotFound {
                entity_type: "role",
                id: role,
            })?;
            user.assign_role(client, &role).await?;
            println!("Assigned role '{}' to '{user_name}'", role.name);
        }
    }
    Ok(())
}

async fn handle_group(client: &HubClient, cmd: GroupCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        GroupCommand::List => {
            let groups = UserGroup::list_all(client, &UserGroupListQuery::default()).await?;
            output_list(&groups, json, |x| GroupRow::from(x))?;
        }
        GroupCommand::Create { name } => {
            let location = UserGroup::create(client, &UserGroupCreateParams::new(&name)).await?;
            println!("Created group '{name}' at {location}");
        }
        GroupCommand::Delete { name } => {
            let group = find_group(client, &name).await?;
            group.delete(client).await?;
            println!("Deleted group '{name}'");
        }
        GroupCommand::AddUser { group, users } => {
            let group = find_group(client, &group).await?;
            let mut members = Vec::with_capacity(users.len());
            for user_name in &users {
                members.push(find_user(client, user_name).await?);
            }
            group.add_users(client, &members).await?;
            println!("Added {} user(s) to '{}'", members.len(), group.name);
        }
    }
    Ok(())
}

async fn handle_role(client: &HubClient, cmd: RoleCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        RoleCommand::List => {
            let roles = Role::list_all(client, &()).await?;
            output_list(&roles, json, |x| RoleRow::from(x))?;
        }
    }
    Ok(())
}

async fn handle_policy(client: &HubClient, cmd: PolicyCommand, json: bool) -> hubapi::Result<()> {
    match cmd {
        PolicyCommand::List => {
            let rules = PolicyRule::list_all(client, &Default::default()).await?;
            output_list(&rules, json, |x| PolicyRow::from(x))?;
        }
        PolicyCommand::Get { name } => {
            let rule = find_policy(client, &name).await?;
            output_single(&rule, json)?;
        }
        PolicyCommand::Delete { name } => {
            let rule = find_policy(client, &name).await?;
            rule.delete(client).await?;
            println!("Deleted policy rule '{name}'");
        }
    }
    Ok(())
}

async fn handle_component(
    client: &HubClient,
    cmd: ComponentCommand,
    json: bool,
) -> hubapi::Result<()> {
    match cmd {
        ComponentCommand::Search { query, limit } => {
            let query = ComponentSearchQuery { q: query };
            let hits = ComponentSearchHit::list_page(client, &query, 0, limit).await?;
            output_page(&hits, json, |x| SearchRow::from(x))?;
        }
    }
    Ok(())
}

async fn handle_vulnerability(
    client: &HubClient,
    cmd: VulnerabilityCommand,
    json: bool,
) -> hubapi::Result<()> {
    match cmd {
        VulnerabilityCommand::Get { id } => {
            let vulnerability = Vulnerability::get(client, id).await?;
            output_single(&vulnerability, json)?;
        }
    }
    Ok(())
}

async fn handle_code_location(
    client: &HubClient,
    cmd: CodeLocationCommand,
    json: bool,
) -> hubapi::Result<()> {
    match cmd {
        CodeLocationCommand::List { name } => {
            let locations = CodeLocation::list_all(client, &CodeLocationListQuery { name }).await?;
            output_list(&locations, json, |x| CodeLocationRow::from(x))?;
        }
        CodeLocationCommand::Map { name, target } => {
            let location = find_code_location(client, &name).await?;
            let version = find_version(client, &target).await?;
            location.map_to(client, &version).await?;
            println!(
                "Mapped '{name}' to '{}' version '{}'",
                target.project, target.version
            );
        }
        CodeLocationCommand::Unmap { name } => {
            let location = find_code_location(client, &name).await?;
            location.unmap(client).await?;
            println!("Unmapped '{name}'");
        }
        CodeLocationCommand::Delete { name } => {
            let location = find_code_location(client, &name).await?;
            location.delete(client).await?;
            println!("Deleted code location '{name}'");
        }
    }
    Ok(())
}

async fn handle_scan(client: &HubClient, cmd: ScanCommand) -> hubapi::Result<()> {
    match cmd {
        ScanCommand::Upload { file } => {
            upload_scan(client, &file).await?;
            println!("Uploaded {}", file.display());
        }
    }
    Ok(())
}

async fn handle_report(client: &HubClient, cmd: ReportCommand) -> hubapi::Result<()> {
    match cmd {
        ReportCommand::Version {
            target,
            categories,
            format,
            poll,
        } => {
            let version = find_version(client, &target).await?;
            let categories = if categories.is_empty() {
                ReportCategory::ALL.to_vec()
            } else {
                categories
            };
            let job = create_version_report(client, &version, &categories, format).await?;
            finish_report(client, job, &poll).await
        }
        ReportCommand::Notices {
            target,
            format,
            copyright,
            poll,
        } => {
            let version = find_version(client, &target).await?;
            let job = create_notices_report(client, &version, format, copyright).await?;
            finish_report(client, job, &poll).await
        }
    }
}

async fn finish_report(client: &HubClient, mut job: ReportJob, poll: &PollArgs) -> hubapi::Result<()> {
    let policy = RetryPolicy::fixed(poll.attempts, Duration::from_secs(poll.delay));
    let poller = ReportPoller::new(policy);

    eprintln!("Waiting for report at {}", job.location);
    let bytes = poller.fetch(client, &mut job).await?;
    tokio::fs::write(&poll.output, &bytes).await?;
    println!("Wrote {} bytes to {}", bytes.len(), poll.output.display());

    if !poll.keep {
        if let Err(e) = job.delete(client).await {
            tracing::warn!("Could not delete report {}: {e}", job.location);
        }
    }
    Ok(())
}

// Lookups by name

async fn find_project(client: &HubClient, name: &str) -> hubapi::Result<Project> {
    Project::find_by_name(client, name)
        .await?
        .ok_or_else(|| HubError::NotFound {
            entity_type: "project",
            id: name.to_string(),
        })
}

async fn find_version(client: &HubClient, target: &VersionRef) -> hubapi::Result<ProjectVersion> {
    let project = find_project(client, &target.project).await?;
    project
        .find_version(client, &target.version)
        .await?
        .ok_or_else(|| HubError::NotFound {
            entity_type: "version",
            id: format!("{}/{}", target.project, target.version),
        })
}

async fn find_user(client: &HubClient, user_name: &str) -> hubapi::Result<User> {
    User::find_by_username(client, user_name)
        .await?
        .ok_or_else(|| HubError::NotFound {
            entity_type: "user",
            id: user_name.to_string(),
        })
}

async fn find_group(client: &HubClient, name: &str) -> hubapi::Result<UserGroup> {
    UserGroup::find_by_name(client, name)
        .await?
        .ok_or_else(|| HubError::NotFound {
            entity_type: "user group",
            id: name.to_string(),
        })
}

async fn find_policy(client: &HubClient, name: &str) -> hubapi::Result<PolicyRule> {
    let rules = PolicyRule::list_all(client, &Default::default()).await?;
    rules
        .into_iter()
        .find(|r| r.name == name)
        .ok_or_else(|| HubError::NotFound {
            entity_type: "policy rule",
            id: name.to_string(),
        })
}

async fn find_code_location(client: &HubClient, name: &str) -> hubapi::Result<CodeLocation> {
    let query = CodeLocationListQuery {
        name: Some(name.to_string()),
    };
    CodeLocation::list_all(client, &query)
        .await?
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| HubError::NotFound {
            entity_type: "code location",
            id: name.to_string(),
        })
}

// Output helpers

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> hubapi::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> hubapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("No results");
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} item(s)", items.len());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> hubapi::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
        return Ok(());
    }

    let rows: Vec<R> = page.items.iter().map(to_row).collect();
    println!("{}", Table::new(rows));
    let first = page.offset + 1;
    let last = page.offset + page.items.len() as u32;
    if let Some(total) = page.total {
        println!("\nItems {first}-{last} of {total}");
    } else if page.has_more {
        println!("\nItems {first}-{last} (more available)");
    } else {
        println!("\nItems {first}-{last} (end)");
    }
    Ok(())
}

// Table row types for non-JSON output

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

#[derive(Tabled)]
struct ProjectRow {
    name: String,
    id: String,
    description: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            name: p.name.clone(),
            id: p.object_id().unwrap_or_default(),
            description: p.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct VersionRow {
    version: String,
    phase: String,
    distribution: String,
    created: String,
}

impl From<&ProjectVersion> for VersionRow {
    fn from(v: &ProjectVersion) -> Self {
        Self {
            version: v.version_name.clone(),
            phase: v.phase.map(|p| p.to_string()).unwrap_or_default(),
            distribution: v.distribution.map(|d| d.to_string()).unwrap_or_default(),
            created: v
                .created_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ComponentRow {
    component: String,
    version: String,
    licenses: String,
    policy: String,
}

impl From<&BomComponent> for ComponentRow {
    fn from(c: &BomComponent) -> Self {
        Self {
            component: c.component_name.clone(),
            version: c.component_version_name.clone().unwrap_or_default(),
            licenses: c.license_names(),
            policy: c.policy_status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct VulnerableRow {
    component: String,
    version: String,
    vulnerability: String,
    severity: String,
    remediation: String,
}

impl From<&VulnerableComponent> for VulnerableRow {
    fn from(v: &VulnerableComponent) -> Self {
        let detail = v.vulnerability_with_remediation.as_ref();
        Self {
            component: v.component_name.clone(),
            version: v.component_version_name.clone().unwrap_or_default(),
            vulnerability: detail
                .map(|d| d.vulnerability_name.clone())
                .unwrap_or_default(),
            severity: detail.and_then(|d| d.severity.clone()).unwrap_or_default(),
            remediation: detail
                .and_then(|d| d.remediation_status.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "user name")]
    user_name: String,
    name: String,
    email: String,
    active: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        let name = [u.first_name.as_deref(), u.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            user_name: u.user_name.clone(),
            name,
            email: u.email.clone().unwrap_or_default(),
            active: yes_no(u.active),
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    name: String,
    active: String,
    source: String,
}

impl From<&UserGroup> for GroupRow {
    fn from(g: &UserGroup) -> Self {
        Self {
            name: g.name.clone(),
            active: yes_no(g.active),
            source: g.created_from.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct RoleRow {
    name: String,
    scope: String,
    description: String,
}

impl From<&Role> for RoleRow {
    fn from(r: &Role) -> Self {
        Self {
            name: r.name.clone(),
            scope: r.scope.clone().unwrap_or_default(),
            description: r.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct PolicyRow {
    name: String,
    enabled: String,
    severity: String,
}

impl From<&PolicyRule> for PolicyRow {
    fn from(p: &PolicyRule) -> Self {
        Self {
            name: p.name.clone(),
            enabled: yes_no(p.enabled),
            severity: p.severity.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct SearchRow {
    component: String,
    version: String,
    href: String,
}

impl From<&ComponentSearchHit> for SearchRow {
    fn from(h: &ComponentSearchHit) -> Self {
        Self {
            component: h.component_name.clone(),
            version: h.version_name.clone().unwrap_or_default(),
            href: h
                .version
                .clone()
                .or_else(|| h.component.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct CodeLocationRow {
    name: String,
    mapped: String,
    updated: String,
}

impl From<&CodeLocation> for CodeLocationRow {
    fn from(c: &CodeLocation) -> Self {
        Self {
            name: c.name.clone(),
            mapped: yes_no(c.is_mapped()),
            updated: c
                .updated_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}
