use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct StatRow<'a> {
    #[tabled(rename = "Metric")]
    metric: &'a str,
    #[tabled(rename = "Value")]
    value: &'a str,
}

/// Two-column metric table; empty input renders as an empty string.
pub fn stats_table(stats: &[(&str, String)]) -> String {
    if stats.is_empty() {
        return String::new();
    }
    let rows = stats.iter().map(|(metric, value)| StatRow { metric: *metric, value: value.as_str() });
    Table::new(rows).with(Style::rounded()).to_string()
}
