//! Default domain seed data
//!
//! Seeding policy belongs to the daemon, not the store: on startup, if the
//! store has no domains, this fixed set is inserted once. Domains are never
//! deleted afterwards - a reset zeroes progress instead.

use chrono::Utc;
use goalstore::{Domain, Urgency};

fn domain(
    id: &str,
    label: &str,
    color: &str,
    bg: &str,
    icon: &str,
    win: &str,
    status: &str,
    urgency: Urgency,
    days: i64,
    progress: i64,
) -> Domain {
    Domain {
        id: id.to_string(),
        label: label.to_string(),
        color: color.to_string(),
        bg: bg.to_string(),
        icon: icon.to_string(),
        win: win.to_string(),
        status: status.to_string(),
        urgency,
        days,
        progress,
        updated_at: Utc::now(),
    }
}

/// The fixed default set seeded on first run.
pub fn default_domains() -> Vec<Domain> {
    vec![
        domain(
            "sat", "SAT", "#FF4757", "#1A0608", "🎯",
            "1550+ score", "1300 → need +250",
            Urgency::Critical, 29, 52,
        ),
        domain(
            "ap", "AP Exams", "#FFA502", "#0A0E00", "📐",
            "Score 4-5 on both", "Behind on curriculum",
            Urgency::High, 88, 30,
        ),
        domain(
            "research", "Research", "#4ECDC4", "#0A1A1A", "📄",
            "Published paper", "Not started",
            Urgency::High, 210, 10,
        ),
        domain(
            "agents", "Agent Library", "#FF6B6B", "#1A0A0A", "🤝",
            "Adopted by 2 companies", "Define your role",
            Urgency::High, 180, 25,
        ),
        domain(
            "transit", "Transit Pilot", "#45B7D1", "#0A1218", "🚌",
            "City pilot + paper", "No clear vision",
            Urgency::Medium, 180, 15,
        ),
        domain(
            "studio", "Builder Studio", "#F7DC6F", "#1A1800", "🚀",
            "3 cohorts, 1000+ teams", "Concept stage",
            Urgency::Medium, 180, 20,
        ),
        domain(
            "automation", "Automation Business", "#A29BFE", "#0D0A1A", "⚡",
            "Stable income", "Learning phase",
            Urgency::Medium, 180, 35,
        ),
        domain(
            "reading", "Reading Habit", "#2ED573", "#0A1A0D", "📖",
            "Daily 30min habit", "Inconsistent",
            Urgency::Medium, 240, 45,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_shape() {
        let domains = default_domains();
        assert_eq!(domains.len(), 8);

        // Ids are unique lowercase tokens.
        let mut ids: Vec<&str> = domains.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert!(domains.iter().all(|d| d.id.chars().all(|c| c.is_ascii_lowercase())));

        // All progress values are already in range.
        assert!(domains.iter().all(|d| (0..=100).contains(&d.progress)));
    }

    #[test]
    fn test_exactly_one_critical_domain() {
        let domains = default_domains();
        let critical: Vec<_> = domains.iter().filter(|d| d.urgency == Urgency::Critical).collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].id, "sat");
    }
}
