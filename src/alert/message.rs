//! Alert text formatting.

use crate::health::ProbeKind;

/// Alert emitted when a server crosses the failure threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineAlert {
    pub identity: String,
    pub record_name: String,
    pub failed_probes: Vec<ProbeKind>,
    pub reachable: bool,
    pub failures: u32,
}

impl OfflineAlert {
    /// Render as Telegram-flavoured HTML.
    pub fn render(&self) -> String {
        let probes = if self.failed_probes.is_empty() {
            "none".to_string()
        } else {
            self.failed_probes
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let machine = if self.reachable {
            "responds to ping"
        } else {
            "unreachable"
        };

        format!(
            "<b>Server offline</b>\n\
             IP: {}\n\
             Record: {}\n\
             Failed probes: {}\n\
             Machine: {}\n\
             Consecutive failures: {}\n\n\
             Removing from the DNS pool. Please review and reinstate the record once fixed.",
            escape_html(&self.identity),
            escape_html(&self.record_name),
            probes,
            machine,
            self.failures,
        )
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
