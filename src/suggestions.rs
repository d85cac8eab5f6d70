//! # Error Suggestions
//!
//! Helpers that build user-facing errors with hints. Errors should say what
//! went wrong and how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modrun::suggestions;
//!
//! return Err(suggestions::unknown_task("lint", &config));
//! ```

use std::path::Path;

use crate::config::Config;

/// The explicitly requested configuration file does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Create a .modrun.yaml file in your repository root\n\
         hint: Omit -c/--config to use the built-in defaults\n\
         hint: Set the MODRUN_CONFIG environment variable",
        path = path.display()
    )
}

/// `modrun task <name>` named a task the configuration does not define.
pub fn unknown_task(name: &str, config: &Config) -> anyhow::Error {
    let available = if config.tasks.is_empty() {
        "hint: No tasks are defined; add them under 'tasks:' in .modrun.yaml".to_string()
    } else {
        format!(
            "hint: Available tasks: {}",
            config.tasks.keys().cloned().collect::<Vec<_>>().join(", ")
        )
    };
    anyhow::anyhow!("Unknown task: {name}\n\n{available}")
}

/// A command needs something to run.
pub fn missing_command() -> anyhow::Error {
    anyhow::anyhow!(
        "No command given\n\n\
         hint: Pass the program after --, e.g. modrun run -- terraform init"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskDef;

    #[test]
    fn test_config_not_found_has_hints() {
        let message = config_not_found(Path::new("custom.yaml")).to_string();
        assert!(message.contains("Configuration file not found: custom.yaml"));
        assert!(message.contains("hint:"));
    }

    #[test]
    fn test_unknown_task_lists_available() {
        let mut config = Config::default();
        config.tasks.insert(
            "lint".to_string(),
            TaskDef {
                command: vec!["tflint".to_string()],
                description: None,
            },
        );
        let message = unknown_task("lnt", &config).to_string();
        assert!(message.contains("Unknown task: lnt"));
        assert!(message.contains("Available tasks: lint"));
    }

    #[test]
    fn test_unknown_task_without_tasks() {
        let message = unknown_task("lint", &Config::default()).to_string();
        assert!(message.contains("No tasks are defined"));
    }

    #[test]
    fn test_missing_command() {
        assert!(missing_command().to_string().contains("modrun run --"));
    }
}
