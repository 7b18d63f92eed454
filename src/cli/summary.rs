use ansi_term::{Colour, Style};

use crate::{
    indicator::render_label,
    store::entities::Sprint,
    tracking::{engine::TrackedSession, summary::ProjectSummary},
    utils::{
        clock::Clock,
        time::{entry_date, format_time_spent},
    },
};

/// Lines of the `summary` command. Active projects come with their sprints and entries, archived
/// ones only with totals.
fn summary_lines(summaries: &[ProjectSummary], heading: impl Fn(&str) -> String) -> Vec<String> {
    let mut lines = Vec::new();
    for project in summaries.iter().filter(|v| !v.archived) {
        let mut title = format!(
            "{}\t{}",
            heading(&project.name),
            format_time_spent(project.total_seconds)
        );
        if let Some(since) = project.tracking_since {
            title.push_str(&format!("\ttracking since {}", entry_date(since)));
        }
        lines.push(title);

        for sprint in &project.sprints {
            let marker = if sprint.is_active { " (active)" } else { "" };
            lines.push(format!(
                "  sprint {}{marker}\t{}",
                sprint.name,
                format_time_spent(sprint.total_seconds)
            ));
        }
        for entry in &project.entries {
            lines.push(format!(
                "  {}\t{}\t{}",
                entry.date,
                format_time_spent(entry.time_spent),
                entry.description
            ));
        }
    }

    let archived = summaries.iter().filter(|v| v.archived).collect::<Vec<_>>();
    if !archived.is_empty() {
        lines.push(heading("Archived"));
        for project in archived {
            lines.push(format!(
                "  {}\t{}",
                project.name,
                format_time_spent(project.total_seconds)
            ));
        }
    }
    lines
}

pub fn print_summary(summaries: &[ProjectSummary]) {
    if summaries.is_empty() {
        println!("No projects yet");
        return;
    }
    let bold = Style::new().bold();
    for line in summary_lines(summaries, |v| bold.paint(v).to_string()) {
        println!("{line}");
    }
}

pub fn print_status(sessions: &[TrackedSession], clock: &dyn Clock) {
    if sessions.is_empty() {
        println!("Not tracking anything");
        return;
    }
    for session in sessions {
        println!("{}", Colour::Green.paint(render_label(session, clock)));
    }
}

/// One line per sprint, active marked with `*`.
fn sprint_lines(sprints: &[Sprint]) -> Vec<String> {
    sprints
        .iter()
        .map(|sprint| {
            format!(
                "{} {}\t{}\t{}\t{}",
                if sprint.is_active { "*" } else { " " },
                sprint.name,
                sprint.start_date,
                sprint.id,
                sprint.description
            )
        })
        .collect()
}

pub fn print_sprints(sprints: &[Sprint]) {
    for line in sprint_lines(sprints) {
        println!("{line}");
    }
}
