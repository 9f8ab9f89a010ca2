//! Template customization checks (`agent-starter validate`).
//!
//! Reports which parts of the template still carry placeholder values.

use std::path::Path;

use colored::*;

const PLACEHOLDER_KEY: &str = "your-api-key-here";
const PLACEHOLDER_NAME: &str = "my_agent";
const PLACEHOLDER_DISPLAY_NAME: &str = "My Agent";
const PLACEHOLDER_CARD_NAME: &str = "<TODO_YOUR_AGENT_NAME>";
const README_TEMPLATE_TITLE: &str = "Agent Starter Template";
const README_TEMPLATE_EXAMPLE: &str = "Example Agent";

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
        }
    }
}

/// Run every check. Paths are resolved against `root`.
pub fn run_checks(
    root: &Path,
    config_path: &Path,
    discovery_path: &Path,
    tool_count: usize,
) -> Vec<CheckResult> {
    vec![
        check_env_file(&root.join(".env")),
        check_agent_config(&root.join(config_path)),
        check_agent_card(&root.join(discovery_path)),
        check_tools(tool_count),
        check_readme(&root.join("README.md")),
    ]
}

fn check_env_file(path: &Path) -> CheckResult {
    const NAME: &str = "Environment Configuration";
    if !path.exists() {
        return CheckResult::fail(NAME, ".env file does not exist (copy from .env.example)");
    }
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => return CheckResult::fail(NAME, format!("could not read .env: {}", e)),
    };

    let mut api_key = None;
    for entry in entries {
        match entry {
            Ok((key, value)) if key == "GEMINI_API_KEY" => api_key = Some(value),
            Ok(_) => {}
            Err(e) => return CheckResult::fail(NAME, format!("could not parse .env: {}", e)),
        }
    }

    match api_key.as_deref().map(str::trim) {
        None => CheckResult::fail(NAME, "GEMINI_API_KEY not found in .env"),
        Some("") => CheckResult::fail(NAME, "GEMINI_API_KEY is empty"),
        Some(PLACEHOLDER_KEY) => {
            CheckResult::fail(NAME, "GEMINI_API_KEY still has placeholder value")
        }
        Some(_) => CheckResult::pass(NAME, ".env configured with API key"),
    }
}

fn check_agent_config(path: &Path) -> CheckResult {
    const NAME: &str = "Agent Configuration";
    let Ok(content) = std::fs::read_to_string(path) else {
        return CheckResult::fail(NAME, format!("{} not found", path.display()));
    };
    let yaml: serde_yaml::Value = match serde_yaml::from_str(&content) {
        Ok(v) => v,
        Err(e) => return CheckResult::fail(NAME, format!("invalid YAML: {}", e)),
    };

    let mut issues = Vec::new();
    if yaml["agent"]["name"].as_str() == Some(PLACEHOLDER_NAME) {
        issues.push(format!("agent name still '{}'", PLACEHOLDER_NAME));
    }
    if yaml["agent"]["display_name"].as_str() == Some(PLACEHOLDER_DISPLAY_NAME) {
        issues.push(format!("display_name still '{}'", PLACEHOLDER_DISPLAY_NAME));
    }

    if issues.is_empty() {
        CheckResult::pass(NAME, "Agent configuration customized")
    } else {
        CheckResult::fail(
            NAME,
            format!("Agent config needs customization: {}", issues.join(", ")),
        )
    }
}

fn check_agent_card(path: &Path) -> CheckResult {
    const NAME: &str = "A2A Agent Card";
    let Ok(content) = std::fs::read_to_string(path) else {
        return CheckResult::fail(NAME, "agent.json not found");
    };
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
        return CheckResult::fail(NAME, format!("agent.json is not valid JSON: {}", e));
    }

    let mut issues = Vec::new();
    if content.contains(PLACEHOLDER_CARD_NAME) || content.contains(PLACEHOLDER_NAME) {
        issues.push("agent name needs updating");
    }
    if content.contains(PLACEHOLDER_DISPLAY_NAME) {
        issues.push("displayName needs updating");
    }

    if issues.is_empty() {
        CheckResult::pass(NAME, "A2A agent card updated")
    } else {
        CheckResult::fail(NAME, format!("agent.json needs updates: {}", issues.join(", ")))
    }
}

fn check_tools(tool_count: usize) -> CheckResult {
    const NAME: &str = "Custom Tools";
    if tool_count == 0 {
        CheckResult::fail(NAME, "No tools implemented yet (add your custom tools)")
    } else {
        CheckResult::pass(NAME, format!("{} tool(s) registered", tool_count))
    }
}

fn check_readme(path: &Path) -> CheckResult {
    const NAME: &str = "README Customization";
    let Ok(content) = std::fs::read_to_string(path) else {
        return CheckResult::fail(NAME, "README.md not found");
    };
    if content.contains(README_TEMPLATE_TITLE) && content.contains(README_TEMPLATE_EXAMPLE) {
        return CheckResult::fail(NAME, "README.md still has template title/content");
    }
    CheckResult::pass(NAME, "README.md customized")
}

/// Print the report. Returns `true` when every check passed.
pub fn report(results: &[CheckResult]) -> bool {
    let rule = "=".repeat(70);
    println!("\n{}", rule.blue().bold());
    println!("{}", "  Agent Template Validation".blue().bold());
    println!("{}\n", rule.blue().bold());

    for result in results {
        if result.passed {
            println!("  {} {:<30} {}", "✓".green(), result.name, result.message.green());
        } else {
            println!("  {} {:<30} {}", "✗".red(), result.name, result.message.yellow());
        }
    }
    println!("\n{}\n", rule.blue().bold());

    let all_passed = results.iter().all(|r| r.passed);
    if all_passed {
        println!("{}\n", "All checks passed! Template is properly customized.".green().bold());
    } else {
        println!("{}", "Some checks failed. Please customize the template:".yellow().bold());
        println!("\n{}", "Customization Checklist:".bold());
        println!("  1. Copy .env.example to .env and add your GEMINI_API_KEY");
        println!("  2. Update config/agent_config.yaml with your agent details");
        println!("  3. Update static/.well-known/agent.json with your agent info");
        println!("  4. Register your custom tools in src/tools/mod.rs");
        println!("  5. Customize README.md with your project information\n");
    }
    all_passed
}
