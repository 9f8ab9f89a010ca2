//! Travel-planner tools shipped with the template.

use super::schema::{
    ConfirmPlanInput, ConfirmPlanOutput, Confirmation, TravelRequestInput, TravelRequestOutput,
};

const POSITIVE_PATTERNS: &[&str] = &["yes", "positive", "proceed"];
const NEGATIVE_PATTERNS: &[&str] = &["no", "negative", "dont proceed"];

/// Report which trip slots are filled and which are missing.
pub fn process_user_request(input: TravelRequestInput) -> anyhow::Result<TravelRequestOutput> {
    let slots = [
        ("destination", &input.destination),
        ("dates", &input.dates),
        ("budget", &input.budget),
        ("preferences", &input.preferences),
    ];

    let mut known = Vec::new();
    let mut missing = Vec::new();
    for (name, value) in slots {
        match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => known.push(format!("{}: {}", name, v)),
            None => missing.push(name.to_string()),
        }
    }

    let validation_message = if missing.is_empty() {
        format!("All details received ({}). Plan the itinerary.", known.join(", "))
    } else if known.is_empty() {
        format!("No details received yet. Ask the user for: {}.", missing.join(", "))
    } else {
        format!(
            "Received {}. Ask the user for: {}.",
            known.join(", "),
            missing.join(", ")
        )
    };

    Ok(TravelRequestOutput {
        complete: missing.is_empty(),
        missing,
        validation_message,
    })
}

/// Classify the user's reply to a proposed itinerary.
pub fn confirm_travel_plan(input: ConfirmPlanInput) -> anyhow::Result<ConfirmPlanOutput> {
    let normalized = normalize(&input.user_response);

    // Negatives first: "dont proceed" would otherwise match "proceed".
    let decision = if matches_any(&normalized, NEGATIVE_PATTERNS) {
        Confirmation::Declined
    } else if matches_any(&normalized, POSITIVE_PATTERNS) {
        Confirmation::Confirmed
    } else {
        Confirmation::Unclear
    };

    let confirmation_message = match decision {
        Confirmation::Confirmed => {
            "The user confirmed the itinerary. Proceed with it.".to_string()
        }
        Confirmation::Declined => format!(
            "The user declined the itinerary (\"{}\"). Adapt the plan to their feedback.",
            input.user_response.trim()
        ),
        Confirmation::Unclear => format!(
            "Could not interpret \"{}\". Ask the user to answer yes or no, or say what to change.",
            input.user_response.trim()
        ),
    };

    Ok(ConfirmPlanOutput {
        decision,
        confirmation_message,
    })
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn matches_any(normalized: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| {
        normalized == *p
            || normalized
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}
