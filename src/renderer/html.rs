use chrono::Local;
use humansize::{format_size, DECIMAL};

use crate::models::{CollectionReport, HostResult, Level};
use crate::renderer::colours::{css_class, Colours};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn stylesheet(colours: &Colours) -> String {
    format!(
        "body {{ font-family: sans-serif; color: {text}; background: {background}; margin: 2em; }}
h1 {{ color: {header}; }}
table {{ border-collapse: collapse; margin-bottom: 1em; }}
th, td {{ border: 1px solid {border}; padding: 4px 8px; text-align: left; }}
th {{ background: {header}; color: white; }}
.ok {{ color: {ok}; }}
.warn {{ color: {warn}; font-weight: bold; }}
.crit {{ color: {crit}; font-weight: bold; }}
.muted {{ color: {muted}; }}
details {{ margin-bottom: 0.5em; }}
",
        text = colours.text,
        background = colours.background,
        header = colours.header,
        border = colours.border,
        ok = colours.for_level(Level::Ok),
        warn = colours.for_level(Level::Warn),
        crit = colours.for_level(Level::Crit),
        muted = colours.muted,
    )
}

fn summary_row(host: &HostResult) -> String {
    let class = css_class(host.worst_level());
    let reachable_class = css_class(if host.reachable { Level::Ok } else { Level::Crit });
    format!(
        "<tr class=\"{class}\"><td>{}</td><td class=\"{reachable_class}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{}/{}</td></tr>\n",
        escape(&host.host),
        if host.reachable { "yes" } else { "no" },
        optional(host.latency_ms),
        escape(&host.os),
        host.uptime_days,
        host.min_free_pct
            .map(|pct| format!("{:.1}%", pct))
            .unwrap_or_else(|| "-".to_string()),
        optional(host.disk_warn_count),
        optional(host.disk_crit_count),
        optional(host.svc_warn_count),
        optional(host.svc_crit_count),
    )
}

fn host_detail(host: &HostResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<details><summary class=\"{}\">{}</summary>\n",
        css_class(host.worst_level()),
        escape(&host.host)
    ));

    if let Some(error) = &host.error {
        out.push_str(&format!("<p class=\"crit\">Probe failed: {}</p>\n", escape(error)));
    }

    if !host.disks.is_empty() {
        out.push_str("<table><tr><th>Device</th><th>Free</th><th>Total</th><th>Free %</th><th>Level</th></tr>\n");
        for disk in &host.disks {
            let class = css_class(disk.level);
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{:.1}%</td><td class=\"{class}\">{}</td></tr>\n",
                escape(&disk.device),
                format_size(disk.free_bytes, DECIMAL),
                format_size(disk.total_bytes, DECIMAL),
                disk.free_pct,
                disk.level,
            ));
        }
        out.push_str("</table>\n");
    }

    if !host.services.is_empty() {
        out.push_str("<table><tr><th>Service</th><th>Status</th><th>Level</th></tr>\n");
        for service in &host.services {
            let class = css_class(service.level);
            out.push_str(&format!(
                "<tr><td>{}</td><td class=\"{class}\">{}</td><td class=\"{class}\">{}</td></tr>\n",
                escape(&service.name),
                escape(service.status.as_str()),
                service.level,
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str(&format!(
        "<p class=\"muted\">Collected {}</p>\n</details>\n",
        host.collected_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

/// Summary table followed by an expandable section per host.
pub fn render(report: &CollectionReport) -> String {
    let colours = Colours::default();
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{}</style>\n</head>\n<body>\n<h1>{title}</h1>\n",
        stylesheet(&colours),
        title = escape(&report.title),
    ));

    out.push_str(&format!(
        "<p class=\"muted\">Generated {} &middot; disk thresholds: warn &lt; {}%, crit &lt; {}%</p>\n",
        report.finished_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        report.warn_pct,
        report.crit_pct,
    ));

    out.push_str(&format!(
        "<p>{} host(s): <span class=\"crit\">{} failed</span>, <span class=\"crit\">{} unreachable</span>, <span class=\"warn\">{} warn</span>, <span class=\"crit\">{} crit</span></p>\n",
        summary.total, summary.failed, summary.unreachable, summary.warn, summary.crit,
    ));

    out.push_str("<table>\n<tr><th>Host</th><th>Reachable</th><th>Latency (ms)</th><th>OS</th><th>Uptime (days)</th><th>Min free</th><th>Disks warn/crit</th><th>Services warn/crit</th></tr>\n");
    for host in &report.hosts {
        out.push_str(&summary_row(host));
    }
    out.push_str("</table>\n");

    for host in &report.hosts {
        out.push_str(&host_detail(host));
    }

    out.push_str("</body>\n</html>\n");
    out
}
