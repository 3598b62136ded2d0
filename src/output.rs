//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{
    CodeLocation, PolicyRule, PolicyStatus, Project, ProjectVersion, Resource, User, Vulnerability,
};

/// Trait for human-readable key-value output.
///
/// Implemented by resource types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn header(kind: &str, name: &str) -> Vec<String> {
    let title = format!("{kind}: {name}");
    let divider = "─".repeat(title.chars().count().max(30));
    vec![title, divider]
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let mut lines = header("Project", &self.name);

        if let Some(id) = self.object_id() {
            lines.push(format!("ID:             {}", id));
        }

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        if let Some(tier) = self.project_tier {
            lines.push(format!("Tier:           {}", tier));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }

        if let Some(href) = self.href() {
            lines.push(format!("URL:            {}", href));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ProjectVersion {
    fn pretty_print(&self) -> String {
        let mut lines = header("Version", &self.version_name);

        if let Some(ref phase) = self.phase {
            lines.push(format!("Phase:          {}", phase));
        }

        if let Some(ref distribution) = self.distribution {
            lines.push(format!("Distribution:   {}", distribution));
        }

        if let Some(ref nickname) = self.nickname {
            lines.push(format!("Nickname:       {}", nickname));
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        if let Some(href) = self.href() {
            lines.push(format!("URL:            {}", href));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let mut lines = header("User", &self.user_name);

        let full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if !full_name.is_empty() {
            lines.push(format!("Name:           {}", full_name));
        }

        if let Some(ref email) = self.email {
            lines.push(format!("Email:          {}", email));
        }

        lines.push(format!("Active:         {}", if self.active { "yes" } else { "no" }));

        if let Some(ref user_type) = self.user_type {
            lines.push(format!("Type:           {}", user_type));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for PolicyRule {
    fn pretty_print(&self) -> String {
        let mut lines = header("Policy Rule", &self.name);

        lines.push(format!("Enabled:        {}", if self.enabled { "yes" } else { "no" }));
        lines.push(format!(
            "Overridable:    {}",
            if self.overridable { "yes" } else { "no" }
        ));

        if let Some(ref severity) = self.severity {
            lines.push(format!("Severity:       {}", severity));
        }

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for PolicyStatus {
    fn pretty_print(&self) -> String {
        let mut lines = header("Policy Status", &self.overall_status);

        for count in &self.component_version_status_counts {
            lines.push(format!("{:<16}{}", format!("{}:", count.name), count.value));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Vulnerability {
    fn pretty_print(&self) -> String {
        let mut lines = header("Vulnerability", &self.name);

        if let Some(ref severity) = self.severity {
            lines.push(format!("Severity:       {}", severity));
        }

        if let Some(score) = self.base_score {
            lines.push(format!("Base Score:     {:.1}", score));
        }

        if let Some(ref source) = self.source {
            lines.push(format!("Source:         {}", source));
        }

        if let Some(ref published) = self.published_date {
            lines.push(format!("Published:      {}", timestamp(published)));
        }

        if let Some(ref description) = self.description {
            lines.push(String::new());
            lines.push(description.clone());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for CodeLocation {
    fn pretty_print(&self) -> String {
        let mut lines = header("Code Location", &self.name);

        match self.mapped_project_version.as_deref() {
            Some(href) if self.is_mapped() => lines.push(format!("Mapped To:      {}", href)),
            _ => lines.push("Mapped To:      (unmapped)".to_string()),
        }

        if let Some(size) = self.scan_size {
            lines.push(format!("Scan Size:      {} bytes", size));
        }

        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_pretty_print_format() {
        let project: Project = serde_json::from_value(serde_json::json!({
            "name": "My Project",
            "description": "Payments backend",
            "_meta": {"href": "https://hub/api/projects/abc-123", "links": []}
        }))
        .unwrap();

        let output = project.pretty_print();
        assert!(output.starts_with("Project: My Project"));
        assert!(output.contains("ID:             abc-123"));
        assert!(output.contains("Description:"));
    }

    #[test]
    fn test_code_location_unmapped() {
        let location: CodeLocation = serde_json::from_value(serde_json::json!({
            "name": "app/scan",
            "mappedProjectVersion": ""
        }))
        .unwrap();

        assert!(location.pretty_print().contains("(unmapped)"));
    }
}
