/// Offset of the first record on a 1-based page, or `None` when page 0 is asked
/// for or the offset does not fit in a `u64`.
#[must_use]
pub fn page_to_offset(page: u64, limit: u64) -> Option<u64> {
    limit.checked_mul(page.checked_sub(1)?)
}

/// 1-based page containing `offset`. A zero limit is treated as one record per page.
#[must_use]
pub fn offset_to_page(offset: u64, limit: u64) -> u64 {
    offset / limit.max(1) + 1
}

/// Number of pages needed for `total` records; an empty list still has one page.
#[must_use]
pub fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1)).max(1)
}

/// Sanitize resource name by removing control characters
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_control()).collect()
}

/// Footer summary of the visible window, e.g. `employees 0-19/135`.
///
/// # Arguments
///
/// * `offset` - The first record shown.
/// * `shown` - How many records are on the current page.
/// * `total` - The total number of matching records reported by the backend.
/// * `resource_name` - The name of the resource being listed.
#[must_use]
pub fn summary(offset: u64, shown: u64, total: u64, resource_name: &str) -> String {
    let safe_name = sanitize_resource_name(resource_name);
    if shown == 0 {
        return format!("{safe_name} 0-0/{total}");
    }
    let last = offset.saturating_add(shown - 1).min(total.saturating_sub(1));
    format!("{safe_name} {offset}-{last}/{total}")
}
