// Plain-text rendering of the view model for the terminal binary.

use crate::view_model::{format_number, Connectivity, NotificationLevel, Section, ViewModel};
use std::fmt::Write;

const PRODUCER_ROWS: usize = 6;
const NAME_WIDTH: usize = 24;

fn truncate(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH {
        let head: String = name.chars().take(NAME_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

pub fn render(vm: &ViewModel) -> String {
    let mut out = String::new();
    let status = match vm.connectivity {
        Connectivity::Live => "LIVE",
        Connectivity::Offline => "OFFLINE",
    };
    let updated = vm
        .last_updated
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());
    let _ = writeln!(out, "Streamgraph [{}]  updated {}", status, updated);
    let _ = writeln!(
        out,
        "Topics {:>8}  Producers {:>8}  Consumers {:>8}  Relations {:>8}",
        format_number(vm.counters.topics.current()),
        format_number(vm.counters.producers.current()),
        format_number(vm.counters.consumers.current()),
        format_number(vm.counters.relations.current()),
    );
    out.push('\n');

    match vm.section {
        Section::Overview => render_overview(vm, &mut out),
        Section::Analytics => render_analytics(vm, &mut out),
    }

    if let Some(pending) = &vm.pending_delete {
        let _ = writeln!(out, "\n{} [y/N]", pending.prompt());
    }
    for n in &vm.notifications {
        let tag = match n.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        let _ = writeln!(out, "({}) {}", tag, n.message);
    }
    out
}

fn render_overview(vm: &ViewModel, out: &mut String) {
    let _ = writeln!(out, "TOPICS");
    if vm.snapshot.topics.is_empty() {
        let _ = writeln!(out, "  No topics found");
    }
    for t in &vm.snapshot.topics {
        let _ = writeln!(
            out,
            "  {:<width$} {:>10} msgs {:>4} producers  {}",
            truncate(&t.name),
            format_number(t.message_count),
            t.producer_count,
            t.status,
            width = NAME_WIDTH
        );
    }

    let _ = writeln!(out, "\nPRODUCERS");
    if vm.snapshot.producers.is_empty() {
        let _ = writeln!(out, "  No producers found");
    }
    for p in vm.snapshot.producers.iter().take(PRODUCER_ROWS) {
        let _ = writeln!(
            out,
            "  {:<width$} {:>4} topics {:>10} msgs",
            truncate(&p.id),
            p.topic_count,
            format_number(p.message_count),
            width = NAME_WIDTH
        );
    }

    let _ = writeln!(out, "\nCONSUMERS");
    if vm.snapshot.consumers.is_empty() {
        let _ = writeln!(out, "  No consumers found");
    }
    for c in &vm.snapshot.consumers {
        let _ = writeln!(
            out,
            "  {:<width$} {:>4} topics",
            truncate(&c.id),
            c.topic_count,
            width = NAME_WIDTH
        );
    }

    let _ = writeln!(out, "\nMESSAGES");
    for entry in vm.log.entries() {
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            entry.at.format("%H:%M:%S"),
            entry.topic,
            entry.content
        );
    }
}

fn render_analytics(vm: &ViewModel, out: &mut String) {
    let _ = writeln!(out, "TOPIC DISTRIBUTION");
    for t in &vm.charts.topic_distribution {
        let _ = writeln!(
            out,
            "  {:<width$} {:>10}",
            truncate(&t.name),
            format_number(t.count),
            width = NAME_WIDTH
        );
    }

    let _ = writeln!(out, "\nPRODUCER ACTIVITY");
    for p in &vm.charts.producer_activity {
        let _ = writeln!(
            out,
            "  {:<width$} {:>4} topics {:>10} msgs",
            truncate(&p.id),
            p.topics,
            format_number(p.messages),
            width = NAME_WIDTH
        );
    }

    let _ = writeln!(out, "\nENTITIES");
    for e in &vm.charts.entity_distribution {
        let _ = writeln!(out, "  {:<12} {:>8}", e.name, format_number(e.count));
    }
}
