use crate::models::RankedCandidate;

/// Distance for result lists, one decimal.
pub fn format_distance(km: f64) -> String {
    format!("{:.1} km", km)
}

/// Notification title for a near-field alert. Alerts use two decimals since
/// everything they report is under half a kilometer.
pub fn alert_title(candidate: &RankedCandidate) -> String {
    format!(
        "{}, {} — {:.2} km",
        candidate.candidate.display_name, candidate.candidate.age, candidate.distance_km
    )
}

/// Title used when a candidate is pinged manually from the result list.
pub fn ping_title(candidate: &RankedCandidate) -> String {
    format!(
        "{}, {} — {}",
        candidate.candidate.display_name,
        candidate.candidate.age,
        format_distance(candidate.distance_km)
    )
}

pub fn alert_body(candidate: &RankedCandidate) -> String {
    format!("Looking for: {}", candidate.candidate.category)
}

/// Multi-line profile card.
pub fn profile_summary(candidate: &RankedCandidate) -> String {
    let c = &candidate.candidate;
    format!(
        "{}, {}\n{}\n{}\n({})",
        c.display_name,
        c.age,
        c.category,
        c.note,
        format_distance(candidate.distance_km)
    )
}
