use super::layout::LayoutConfig;
use super::model::TaskStatus;

/// Single count shown on a node's badge.
///
/// Test counts win over scan counts whenever either test count is known.
pub fn badge_count(status: &TaskStatus) -> u32 {
    if status.test_fail_count.is_some() || status.test_warn_count.is_some() {
        return status
            .test_fail_count
            .unwrap_or(0)
            .saturating_add(status.test_warn_count.unwrap_or(0));
    }

    status
        .scan_results
        .map_or(0, |scan| scan.vulnerabilities.total())
}

pub fn badge_width(count: u32, layout: &LayoutConfig) -> u32 {
    if count == 0 {
        return 0;
    }
    let digits = count.ilog10() + 1;
    layout.badge_base_width + digits * layout.badge_digit_width
}
