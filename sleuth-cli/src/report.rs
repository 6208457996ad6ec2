//! Text rendering of investigation reports

use sleuth_runtime::InvestigationReport;

/// Shown when the transport could not report a peer address
const UNAVAILABLE: &str = "unavailable";

/// Render a report as plain text
pub fn render_text(report: &InvestigationReport) -> String {
    let mut out = String::new();

    for (category, results) in &report.results.categories {
        if results.is_empty() {
            continue;
        }
        out.push_str(&format!("\n=== {} ===\n", category.to_uppercase()));
        for (site_name, url) in &results.exact {
            out.push_str(&format!("[{:6.2}%] {}: {}\n", 100.0, site_name, url));
        }
        for hit in &results.search {
            out.push_str(&format!(
                "[{:6.2}%] {}: {}\n",
                hit.result.percent(),
                hit.site_name,
                hit.result.url
            ));
        }
    }

    if report.results.is_empty() {
        out.push_str(&format!("\nNo account found for '{}'.\n", report.handle));
    }

    out.push_str("\n=== LINKED ACCOUNTS ===\n");
    if report.linked_accounts.is_empty() {
        out.push_str("(none)\n");
    }
    for (site, urls) in &report.linked_accounts {
        out.push_str(&format!("|-+ [{}]:\n", site));
        for url in urls {
            out.push_str(&format!("| |- {}\n", url));
        }
    }

    out.push_str("\n=== IDENTITY / PEER ADDRESS ===\n");
    if report.identities.is_empty() {
        out.push_str("(none)\n");
    }
    for (account, identity) in &report.identities {
        out.push_str(&format!("| + {}:\n", account));
        out.push_str(&format!(
            "| |- ip: {}\n",
            identity.peer_address.as_deref().unwrap_or(UNAVAILABLE)
        ));
        let fields = [
            ("real_name", &identity.real_name),
            ("location", &identity.location),
            ("bio", &identity.bio),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                out.push_str(&format!("| |- {}: {}\n", label, value));
            }
        }
    }

    let stats = &report.stats;
    out.push_str(&format!(
        "\n{} sites probed in {:.1}s: {} exact, {} search matches\n",
        stats.sites_probed,
        stats.elapsed_ms as f64 / 1000.0,
        stats.exact_matches,
        stats.search_matches
    ));

    out
}
