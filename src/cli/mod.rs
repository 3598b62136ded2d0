//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the hubapi binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::models::{Distribution, Phase, ReportCategory, ReportFormat};

/// Hub API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "hubapi", about = "Black Duck Hub API CLI", version)]
pub struct Cli {
    /// Connection config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log requests and poll attempts to stderr.
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Do not rewrite the config file after logging in.
    #[arg(long, global = true, default_value = "false")]
    pub no_write_config: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings that override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Server base URL.
    #[arg(long, global = true)]
    pub baseurl: Option<String>,

    /// User name for password login.
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password for password login.
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// API token; takes precedence over username and password.
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,
}

impl ConnectionArgs {
    /// True when no override was given.
    pub fn is_empty(&self) -> bool {
        self.baseurl.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.api_token.is_none()
            && !self.insecure
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the connection config file.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Projects.
    #[command(subcommand, alias = "projects")]
    Project(ProjectCommand),

    /// Project versions.
    #[command(subcommand, alias = "versions")]
    Version(VersionCommand),

    /// Users.
    #[command(subcommand, alias = "users")]
    User(UserCommand),

    /// User groups.
    #[command(subcommand, alias = "groups")]
    Group(GroupCommand),

    /// Roles.
    #[command(subcommand, alias = "roles")]
    Role(RoleCommand),

    /// Policy rules.
    #[command(subcommand, alias = "policies")]
    Policy(PolicyCommand),

    /// Component catalogue.
    #[command(subcommand, alias = "components")]
    Component(ComponentCommand),

    /// Vulnerability records.
    #[command(subcommand, alias = "vulnerabilities")]
    Vulnerability(VulnerabilityCommand),

    /// Code locations (uploaded scans).
    #[command(subcommand, alias = "codelocations")]
    Codelocation(CodeLocationCommand),

    /// Scan uploads.
    #[command(subcommand)]
    Scan(ScanCommand),

    /// Generate and download reports.
    #[command(subcommand, alias = "reports")]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Log in with the given connection settings and save them.
    Write,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects.
    List {
        /// Filter by name.
        #[arg(long)]
        name: Option<String>,

        /// Offset of the first item.
        #[arg(long)]
        offset: Option<u32>,

        /// Number of items per page.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show a project by name.
    Get { name: String },

    /// Create a project.
    Create {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Also create an initial version with this name.
        #[arg(long)]
        initial_version: Option<String>,
    },

    /// Update a project's name or description.
    Update {
        name: String,

        #[arg(long)]
        new_name: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a project and all its versions.
    Delete { name: String },
}

/// Identifies a version by project and version name.
#[derive(Args, Debug, Clone)]
pub struct VersionRef {
    /// Project name.
    pub project: String,

    /// Version name.
    pub version: String,
}

#[derive(Subcommand, Debug)]
pub enum VersionCommand {
    /// List a project's versions.
    List { project: String },

    /// Show a version.
    Get(VersionRef),

    /// Create a version.
    Create {
        #[command(flatten)]
        target: VersionRef,

        #[arg(long, default_value = "DEVELOPMENT")]
        phase: Phase,

        #[arg(long, default_value = "EXTERNAL")]
        distribution: Distribution,

        #[arg(long)]
        nickname: Option<String>,
    },

    /// Delete a version.
    Delete(VersionRef),

    /// List the components in a version's BOM.
    Components(VersionRef),

    /// List vulnerable components in a version's BOM.
    Vulnerabilities(VersionRef),

    /// Show a version's policy status.
    PolicyStatus(VersionRef),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List users.
    List {
        /// Filter by user name.
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a user.
    Create {
        user_name: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: Option<String>,

        /// Initial password for an internal account.
        #[arg(long)]
        initial_password: Option<String>,
    },

    /// Delete a user.
    Delete { user_name: String },

    /// Grant a global role to a user.
    AssignRole { user_name: String, role: String },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// List user groups.
    List,

    /// Create a user group.
    Create { name: String },

    /// Delete a user group.
    Delete { name: String },

    /// Add users to a group.
    AddUser {
        group: String,

        #[arg(required = true)]
        users: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// List roles.
    List,
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommand {
    /// List policy rules.
    List,

    /// Show a policy rule by name.
    Get { name: String },

    /// Delete a policy rule by name.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ComponentCommand {
    /// Search the component catalogue.
    Search {
        query: String,

        /// Number of hits to show.
        #[arg(long, default_value = "20")]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum VulnerabilityCommand {
    /// Show a vulnerability, e.g. `CVE-2021-44228`.
    Get { id: String },
}

#[derive(Subcommand, Debug)]
pub enum CodeLocationCommand {
    /// List code locations.
    List {
        #[arg(long)]
        name: Option<String>,
    },

    /// Map a code location to a version.
    Map {
        name: String,

        #[command(flatten)]
        target: VersionRef,
    },

    /// Remove a code location's version mapping.
    Unmap { name: String },

    /// Delete a code location.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ScanCommand {
    /// Upload a `.jsonld` or `.bdio` scan document.
    Upload { file: PathBuf },
}

/// How long to wait for a report.
#[derive(Args, Debug, Clone)]
pub struct PollArgs {
    /// File to write the report archive to.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Number of status checks before giving up.
    #[arg(long, default_value_t = crate::retry::DEFAULT_ATTEMPTS)]
    pub attempts: u32,

    /// Seconds between status checks.
    #[arg(long, default_value_t = crate::retry::DEFAULT_DELAY.as_secs())]
    pub delay: u64,

    /// Leave the report on the server after downloading it.
    #[arg(long, default_value = "false")]
    pub keep: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Generate a version report.
    Version {
        #[command(flatten)]
        target: VersionRef,

        /// Sections to include; all when omitted.
        #[arg(long, value_delimiter = ',')]
        categories: Vec<ReportCategory>,

        #[arg(long, default_value = "CSV")]
        format: ReportFormat,

        #[command(flatten)]
        poll: PollArgs,
    },

    /// Generate a notices (license attribution) report.
    Notices {
        #[command(flatten)]
        target: VersionRef,

        #[arg(long, default_value = "TEXT")]
        format: ReportFormat,

        /// Include copyright statements.
        #[arg(long, default_value = "false")]
        copyright: bool,

        #[command(flatten)]
        poll: PollArgs,
    },
}
