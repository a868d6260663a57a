// Copyright (c) The reportwire Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Options are typically deserialized from the host runner's reporter options
//! block, then overridden from the environment (`RP_LAUNCH`,
//! `RP_DESCRIPTION`, `RP_ATTRIBUTES`, `RP_MODE`, `RP_LAUNCH_ID`). The
//! environment lookup is injectable so override behavior is testable without
//! touching process state.

use chrono::{DateTime, Utc};
use reportwire_model::{Attribute, LaunchDescriptor};
use serde::Deserialize;

const AGENT_NAME: &str = env!("CARGO_PKG_NAME");
const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for a [`Reporter`](crate::reporter::Reporter).
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReporterConfig {
    /// The launch name.
    pub launch: String,

    /// Free-form launch description.
    pub description: Option<String>,

    /// User-supplied launch attributes.
    pub attributes: Vec<Attribute>,

    /// The backend analysis mode, e.g. `DEBUG`.
    pub mode: Option<String>,

    /// True if this launch is a rerun of an earlier one.
    pub rerun: Option<bool>,

    /// The launch this one is a rerun of.
    pub rerun_of: Option<String>,

    /// Attach to this pre-existing launch instead of creating one. When set,
    /// the reporter does not finish the launch at run completion either.
    pub launch_id: Option<String>,

    /// When false, skipped items finish with an explicit "not an issue"
    /// marker instead of the backend's defect defaults.
    pub skipped_issue: bool,

    /// When false, failed steps finish without the formatted error
    /// description.
    pub extend_description_with_last_error: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        ReporterConfig {
            launch: "Unit Tests".to_owned(),
            description: None,
            attributes: vec![],
            mode: None,
            rerun: None,
            rerun_of: None,
            launch_id: None,
            skipped_issue: true,
            extend_description_with_last_error: true,
        }
    }
}

impl ReporterConfig {
    /// Applies environment variable overrides through the given lookup.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(launch) = var("RP_LAUNCH") {
            self.launch = launch;
        }
        if let Some(description) = var("RP_DESCRIPTION") {
            self.description = Some(description);
        }
        if let Some(attributes) = var("RP_ATTRIBUTES") {
            self.attributes = parse_attributes(&attributes);
        }
        if let Some(mode) = var("RP_MODE") {
            self.mode = Some(mode);
        }
        if let Some(launch_id) = var("RP_LAUNCH_ID") {
            self.launch_id = Some(launch_id);
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Builds the launch start descriptor for this configuration.
    ///
    /// System attributes (the agent identity and, when `skipped_issue` is
    /// disabled, a `skippedIssue=false` marker) are appended after the
    /// user-supplied ones.
    pub fn launch_descriptor(&self, start_time: DateTime<Utc>) -> LaunchDescriptor {
        let mut attributes = self.attributes.clone();
        attributes.extend(self.system_attributes());

        LaunchDescriptor {
            name: self.launch.clone(),
            description: self.description.clone(),
            attributes,
            mode: self.mode.clone(),
            rerun: self.rerun,
            rerun_of: self.rerun_of.clone(),
            start_time,
            existing_id: self.launch_id.clone(),
        }
    }

    fn system_attributes(&self) -> Vec<Attribute> {
        let mut attributes = vec![Attribute::system(
            "agent",
            format!("{AGENT_NAME}|{AGENT_VERSION}"),
        )];
        if !self.skipped_issue {
            attributes.push(Attribute::system("skippedIssue", "false"));
        }
        attributes
    }
}

/// Parses a comma-separated attribute list of `key:value` pairs.
///
/// Entries without a colon become bare values with no key.
pub fn parse_attributes(raw: &str) -> Vec<Attribute> {
    raw.split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((key, value)) => Attribute::new(Some(key), value),
            None => Attribute::new(None::<String>, entry),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn defaults() {
        let config = ReporterConfig::default();
        assert_eq!(config.launch, "Unit Tests");
        assert!(config.skipped_issue);
        assert!(config.extend_description_with_last_error);
        assert_eq!(config.launch_id, None);
    }

    #[test]
    fn deserializes_from_reporter_options() {
        let config: ReporterConfig = serde_json::from_value(serde_json::json!({
            "launch": "Smoke",
            "skippedIssue": false,
            "extendDescriptionWithLastError": false,
            "attributes": [{"key": "env", "value": "ci"}],
        }))
        .unwrap();

        assert_eq!(config.launch, "Smoke");
        assert!(!config.skipped_issue);
        assert!(!config.extend_description_with_last_error);
        assert_eq!(config.attributes, vec![Attribute::new(Some("env"), "ci")]);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = ReporterConfig {
            launch: "from options".to_owned(),
            ..ReporterConfig::default()
        };
        config.apply_overrides(lookup(&[
            ("RP_LAUNCH", "from env"),
            ("RP_DESCRIPTION", "nightly"),
            ("RP_LAUNCH_ID", "existing"),
        ]));

        assert_eq!(config.launch, "from env");
        assert_eq!(config.description.as_deref(), Some("nightly"));
        assert_eq!(config.launch_id.as_deref(), Some("existing"));
        // untouched without the corresponding variable
        assert_eq!(config.mode, None);
    }

    #[test]
    fn parses_attribute_lists() {
        assert_eq!(
            parse_attributes("env:ci,smoke,team:runtime"),
            vec![
                Attribute::new(Some("env"), "ci"),
                Attribute::new(None::<String>, "smoke"),
                Attribute::new(Some("team"), "runtime"),
            ]
        );
        assert_eq!(parse_attributes(""), vec![]);
    }

    #[test]
    fn launch_descriptor_carries_system_attributes() {
        let config = ReporterConfig {
            attributes: vec![Attribute::new(None::<String>, "smoke")],
            skipped_issue: false,
            ..ReporterConfig::default()
        };
        let descriptor = config.launch_descriptor(Utc::now());

        assert_eq!(descriptor.name, "Unit Tests");
        assert_eq!(descriptor.attributes.len(), 3);
        assert_eq!(descriptor.attributes[0].value, "smoke");
        assert_eq!(descriptor.attributes[1].key.as_deref(), Some("agent"));
        assert!(descriptor.attributes[1].system);
        assert_eq!(descriptor.attributes[2].key.as_deref(), Some("skippedIssue"));
        assert_eq!(descriptor.attributes[2].value, "false");

        let default_config = ReporterConfig::default();
        let descriptor = default_config.launch_descriptor(Utc::now());
        assert_eq!(descriptor.attributes.len(), 1, "agent attribute only");
    }
}
