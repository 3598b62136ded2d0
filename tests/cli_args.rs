//! CLI argument parsing tests.

use std::path::PathBuf;

use clap::Parser;
use hubapi::cli::{
    Cli, Command, ConfigCommand, GroupCommand, ProjectCommand, ReportCommand, VersionCommand,
};
use hubapi::{Distribution, Phase, ReportCategory, ReportFormat};

#[test]
fn test_cli_defaults() {
    let cli = Cli::parse_from(["hubapi", "project", "list"]);

    assert!(!cli.json);
    assert!(!cli.debug);
    assert!(!cli.no_write_config);
    assert_eq!(cli.config, PathBuf::from(".restconfig.json"));
    assert!(cli.connection.is_empty());
    match cli.command {
        Command::Project(ProjectCommand::List {
            name,
            offset,
            limit,
        }) => {
            assert!(name.is_none());
            assert!(offset.is_none());
            assert!(limit.is_none());
        }
        _ => panic!("Expected project list"),
    }
}

#[test]
fn test_cli_connection_overrides_are_global() {
    let cli = Cli::parse_from([
        "hubapi",
        "projects",
        "list",
        "--baseurl",
        "https://hub.example.com",
        "--api-token",
        "abc123",
        "--insecure",
        "--json",
    ]);

    assert!(cli.json);
    assert!(!cli.connection.is_empty());
    assert_eq!(
        cli.connection.baseurl.as_deref(),
        Some("https://hub.example.com")
    );
    assert_eq!(cli.connection.api_token.as_deref(), Some("abc123"));
    assert!(cli.connection.insecure);
}

#[test]
fn test_cli_parses_project_create() {
    let cli = Cli::parse_from([
        "hubapi",
        "project",
        "create",
        "demo-app",
        "--description",
        "Demo application",
        "--initial-version",
        "1.0",
    ]);

    match cli.command {
        Command::Project(ProjectCommand::Create {
            name,
            description,
            initial_version,
        }) => {
            assert_eq!(name, "demo-app");
            assert_eq!(description.as_deref(), Some("Demo application"));
            assert_eq!(initial_version.as_deref(), Some("1.0"));
        }
        _ => panic!("Expected project create"),
    }
}

#[test]
fn test_cli_parses_version_create_with_phase() {
    let cli = Cli::parse_from([
        "hubapi",
        "version",
        "create",
        "demo-app",
        "3.0",
        "--phase",
        "released",
        "--distribution",
        "INTERNAL",
    ]);

    match cli.command {
        Command::Version(VersionCommand::Create {
            target,
            phase,
            distribution,
            nickname,
        }) => {
            assert_eq!(target.project, "demo-app");
            assert_eq!(target.version, "3.0");
            assert_eq!(phase, Phase::Released);
            assert_eq!(distribution, Distribution::Internal);
            assert!(nickname.is_none());
        }
        _ => panic!("Expected version create"),
    }
}

#[test]
fn test_cli_rejects_unknown_phase() {
    let result = Cli::try_parse_from([
        "hubapi", "version", "create", "demo-app", "3.0", "--phase", "shipping",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_parses_report_version() {
    let cli = Cli::parse_from([
        "hubapi",
        "report",
        "version",
        "demo-app",
        "1.0",
        "--categories",
        "version,components,license-conflicts",
        "--format",
        "json",
        "-o",
        "report.zip",
        "--attempts",
        "5",
        "--delay",
        "1",
    ]);

    match cli.command {
        Command::Report(ReportCommand::Version {
            target,
            categories,
            format,
            poll,
        }) => {
            assert_eq!(target.project, "demo-app");
            assert_eq!(
                categories,
                vec![
                    ReportCategory::Version,
                    ReportCategory::Components,
                    ReportCategory::LicenseConflicts,
                ]
            );
            assert_eq!(format, ReportFormat::Json);
            assert_eq!(poll.output, PathBuf::from("report.zip"));
            assert_eq!(poll.attempts, 5);
            assert_eq!(poll.delay, 1);
            assert!(!poll.keep);
        }
        _ => panic!("Expected report version"),
    }
}

#[test]
fn test_cli_report_defaults() {
    let cli = Cli::parse_from([
        "hubapi", "report", "notices", "demo-app", "1.0", "--output", "notices.zip",
    ]);

    match cli.command {
        Command::Report(ReportCommand::Notices {
            format,
            copyright,
            poll,
            ..
        }) => {
            assert_eq!(format, ReportFormat::Text);
            assert!(!copyright);
            assert_eq!(poll.attempts, hubapi::retry::DEFAULT_ATTEMPTS);
            assert_eq!(poll.delay, hubapi::retry::DEFAULT_DELAY.as_secs());
        }
        _ => panic!("Expected report notices"),
    }
}

#[test]
fn test_cli_report_requires_output() {
    let result = Cli::try_parse_from(["hubapi", "report", "version", "demo-app", "1.0"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_group_add_user_needs_users() {
    let cli = Cli::parse_from(["hubapi", "group", "add-user", "devs", "alice", "bob"]);
    match cli.command {
        Command::Group(GroupCommand::AddUser { group, users }) => {
            assert_eq!(group, "devs");
            assert_eq!(users, vec!["alice", "bob"]);
        }
        _ => panic!("Expected group add-user"),
    }

    assert!(Cli::try_parse_from(["hubapi", "group", "add-user", "devs"]).is_err());
}

#[test]
fn test_cli_config_write() {
    let cli = Cli::parse_from([
        "hubapi",
        "--config",
        "/tmp/hub.json",
        "config",
        "write",
        "--username",
        "sysadmin",
        "--password",
        "blackduck",
    ]);

    assert_eq!(cli.config, PathBuf::from("/tmp/hub.json"));
    assert_eq!(cli.connection.username.as_deref(), Some("sysadmin"));
    assert_eq!(cli.connection.password.as_deref(), Some("blackduck"));
    assert!(matches!(cli.command, Command::Config(ConfigCommand::Write)));
}
