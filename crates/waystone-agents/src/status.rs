//! Human-readable agent status for the inspect query.

use waystone_types::{Want, WantKind};

/// Fallback when the host cannot say what the agent is doing.
pub const UNKNOWN_ACTIVITY: &str = "doing something";

/// Map the host's raw activity name onto a friendly verb.
pub fn classify_activity(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return UNKNOWN_ACTIVITY.to_owned();
    };
    let lower = raw.to_lowercase();
    let friendly = if lower.contains("build") {
        "building"
    } else if lower.contains("mine") || lower.contains("mining") || lower.contains("excavat") {
        "excavating"
    } else if lower.contains("craft") {
        "crafting"
    } else if lower.contains("sleep") {
        "resting"
    } else if lower.contains("wander") || lower.contains("idle") {
        "wandering"
    } else {
        return lower.replace('_', " ");
    };
    friendly.to_owned()
}

/// Status line built from what the agent is doing and what it needs.
pub fn status_message(activity: Option<&str>, want: Option<&Want>) -> String {
    let activity = classify_activity(activity);
    match want {
        None => format!("I'm currently busy ({activity})."),
        Some(want) => {
            let item = want.item.display_name();
            match want.kind {
                WantKind::Build => {
                    format!("I'm {activity}, but I'm missing {item} to keep building.")
                }
                WantKind::Craft => {
                    format!("I'm {activity}, trying to craft something, but I need {item}.")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use waystone_types::ItemId;

    use super::*;

    #[test]
    fn classifies_known_activities() {
        assert_eq!(classify_activity(Some("BUILD_HOUSE")), "building");
        assert_eq!(classify_activity(Some("Mining")), "excavating");
        assert_eq!(classify_activity(Some("excavate_tunnel")), "excavating");
        assert_eq!(classify_activity(Some("CRAFTING")), "crafting");
        assert_eq!(classify_activity(Some("sleep")), "resting");
        assert_eq!(classify_activity(Some("IDLE")), "wandering");
    }

    #[test]
    fn mining_variants_are_excavating() {
        for raw in ["MINING", "strip_mining", "go_mine", "Mine"] {
            assert_eq!(classify_activity(Some(raw)), "excavating", "{raw}");
        }
    }

    #[test]
    fn unknown_activity_is_humanised() {
        assert_eq!(classify_activity(Some("TEND_FIRE")), "tend fire");
        assert_eq!(classify_activity(None), UNKNOWN_ACTIVITY);
        assert_eq!(classify_activity(Some("  ")), UNKNOWN_ACTIVITY);
    }

    #[test]
    fn busy_without_want() {
        assert_eq!(status_message(Some("wander"), None), "I'm currently busy (wandering).");
    }

    #[test]
    fn names_missing_build_material() {
        let want = Want::new(WantKind::Build, ItemId::new("oak_slab"));
        assert_eq!(
            status_message(Some("build"), want.as_ref()),
            "I'm building, but I'm missing oak slab to keep building."
        );
    }

    #[test]
    fn names_missing_craft_input() {
        let want = Want::new(WantKind::Craft, ItemId::new("torch"));
        assert_eq!(
            status_message(None, want.as_ref()),
            "I'm doing something, trying to craft something, but I need torch."
        );
    }
}
