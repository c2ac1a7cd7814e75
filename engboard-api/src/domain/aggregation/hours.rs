use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use time::Date;

use crate::domain::models::{
    Engineer, EngineerId, HourEntry, HourType, Project, ProjectId, Task, TaskStatus,
};

use super::sanitize;

/// Spent-vs-estimated hours for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectProgress {
    pub project_id: ProjectId,
    pub name: String,
    pub estimated_hours: f64,
    pub spent_hours: f64,
    /// Capped at 100.
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoursSummary {
    /// One row per project, in input order.
    pub projects: Vec<ProjectProgress>,
    pub month_total: f64,
    pub cost_total: f64,
}

/// Aggregate logged hours against projects and engineer rates.
///
/// Never fails: missing or malformed numbers count as 0 and entries for
/// unknown engineers contribute hours but no cost. Cost is always computed;
/// whether to show it is up to the caller.
pub fn compute_hours_summary(
    entries: &[HourEntry],
    projects: &[Project],
    engineers: &[Engineer],
    today: Date,
) -> HoursSummary {
    let spent = spent_by_project(entries);
    let projects = projects
        .iter()
        .map(|project| project_progress(project, spent.get(&project.id).copied().unwrap_or(0.0)))
        .collect();

    HoursSummary {
        projects,
        month_total: month_total(entries, today),
        cost_total: cost_total(entries, engineers),
    }
}

pub fn project_progress(project: &Project, spent_hours: f64) -> ProjectProgress {
    let estimated_hours = sanitize(project.estimated_hours);
    ProjectProgress {
        project_id: project.id.clone(),
        name: project.name.clone(),
        estimated_hours,
        spent_hours,
        progress: progress_percent(spent_hours, estimated_hours),
    }
}

/// `min(100, spent / estimated * 100)`, or 0 without an estimate.
pub fn progress_percent(spent: f64, estimated: f64) -> f64 {
    let (spent, estimated) = (sanitize(spent), sanitize(estimated));
    if estimated > 0.0 {
        (spent / estimated * 100.0).min(100.0)
    } else {
        0.0
    }
}

pub fn spent_by_project(entries: &[HourEntry]) -> HashMap<ProjectId, f64> {
    entries
        .iter()
        .map(|e| (e.project_id.clone(), sanitize(e.hours)))
        .into_grouping_map()
        .sum()
}

pub fn total_hours(entries: &[HourEntry]) -> f64 {
    entries.iter().map(|e| sanitize(e.hours)).sum()
}

/// Hours dated from the first day of `today`'s month through `today`.
pub fn month_total(entries: &[HourEntry], today: Date) -> f64 {
    let first_of_month = today.replace_day(1).unwrap_or(today);
    entries
        .iter()
        .filter(|e| e.date >= first_of_month && e.date <= today)
        .map(|e| sanitize(e.hours))
        .sum()
}

/// Hours logged by one engineer on `today`.
pub fn today_total(entries: &[HourEntry], engineer_id: Option<&EngineerId>, today: Date) -> f64 {
    let Some(engineer_id) = engineer_id else {
        return 0.0;
    };
    entries
        .iter()
        .filter(|e| e.date == today && &e.engineer_id == engineer_id)
        .map(|e| sanitize(e.hours))
        .sum()
}

/// Hours priced at the engineer's normal or overtime rate.
pub fn cost_total(entries: &[HourEntry], engineers: &[Engineer]) -> f64 {
    let rates: HashMap<&EngineerId, &Engineer> = engineers.iter().map(|e| (&e.id, e)).collect();

    entries
        .iter()
        .filter_map(|entry| {
            let engineer = rates.get(&entry.engineer_id)?;
            let rate = match entry.hour_type {
                HourType::Overtime => engineer.overtime_rate,
                HourType::Normal => engineer.normal_rate,
            };
            Some(sanitize(entry.hours) * sanitize(rate))
        })
        .sum()
}

/// Total hours per engineer name, largest first. Unknown engineers are
/// grouped under the embedded name on the entry, or the raw id.
pub fn hours_by_engineer(entries: &[HourEntry], engineers: &[Engineer]) -> Vec<(String, f64)> {
    let names: HashMap<&EngineerId, &str> = engineers
        .iter()
        .map(|e| (&e.id, e.name.as_str()))
        .collect();

    entries
        .iter()
        .map(|e| {
            let name = names
                .get(&e.engineer_id)
                .map(|n| n.to_string())
                .or_else(|| e.engineer_name.clone())
                .unwrap_or_else(|| e.engineer_id.to_string());
            (name, sanitize(e.hours))
        })
        .into_grouping_map()
        .sum()
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Task count per status, with every status present.
pub fn status_distribution(tasks: &[Task]) -> BTreeMap<TaskStatus, usize> {
    let mut counts: BTreeMap<TaskStatus, usize> =
        TaskStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    for task in tasks {
        *counts.entry(task.status).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProjectStatus;
    use time::macros::date;

    fn engineer(id: &str, normal: f64, overtime: f64) -> Engineer {
        Engineer {
            id: EngineerId::new(id),
            name: format!("Eng {id}"),
            email: None,
            specialty: None,
            level: None,
            normal_rate: normal,
            overtime_rate: overtime,
            availability: 100.0,
            user_id: None,
        }
    }

    #[test]
    fn progress_is_capped_at_one_hundred() {
        assert_eq!(progress_percent(150.0, 100.0), 100.0);
        assert_eq!(progress_percent(25.0, 100.0), 25.0);
    }

    #[test]
    fn progress_without_estimate_is_zero() {
        assert_eq!(progress_percent(40.0, 0.0), 0.0);
        assert_eq!(progress_percent(40.0, f64::NAN), 0.0);
    }

    #[test]
    fn summary_rolls_up_per_project() {
        let today = date!(2024 - 03 - 15);
        let projects = vec![
            Project::new("p1", "Ponte", ProjectStatus::InProgress).with_estimated_hours(100.0),
            Project::new("p2", "Viaduto", ProjectStatus::InProgress),
        ];
        let entries = vec![
            HourEntry::new("h1", "e1", "p1", today, 100.0),
            HourEntry::new("h2", "e1", "p1", today, 50.0),
            HourEntry::new("h3", "e1", "p2", today, 8.0),
        ];

        let summary = compute_hours_summary(&entries, &projects, &[], today);

        assert_eq!(summary.projects[0].spent_hours, 150.0);
        assert_eq!(summary.projects[0].progress, 100.0);
        assert_eq!(summary.projects[1].spent_hours, 8.0);
        assert_eq!(summary.projects[1].progress, 0.0);
    }

    #[test]
    fn month_total_covers_first_of_month_through_today() {
        let today = date!(2024 - 03 - 15);
        let entries = vec![
            HourEntry::new("h1", "e1", "p1", date!(2024 - 02 - 29), 4.0),
            HourEntry::new("h2", "e1", "p1", date!(2024 - 03 - 01), 3.0),
            HourEntry::new("h3", "e1", "p1", date!(2024 - 03 - 15), 2.0),
            HourEntry::new("h4", "e1", "p1", date!(2024 - 03 - 16), 1.0),
        ];

        assert_eq!(month_total(&entries, today), 5.0);
    }

    #[test]
    fn cost_uses_rate_per_hour_type_and_skips_unknown_engineers() {
        let today = date!(2024 - 03 - 15);
        let engineers = vec![engineer("e1", 100.0, 150.0)];
        let entries = vec![
            HourEntry::new("h1", "e1", "p1", today, 2.0),
            HourEntry::new("h2", "e1", "p1", today, 1.0).overtime(),
            HourEntry::new("h3", "ghost", "p1", today, 10.0),
        ];

        assert_eq!(cost_total(&entries, &engineers), 350.0);
    }

    #[test]
    fn today_total_only_counts_own_entries() {
        let today = date!(2024 - 03 - 15);
        let entries = vec![
            HourEntry::new("h1", "e1", "p1", today, 2.5),
            HourEntry::new("h2", "e2", "p1", today, 4.0),
            HourEntry::new("h3", "e1", "p1", date!(2024 - 03 - 14), 8.0),
        ];

        assert_eq!(today_total(&entries, Some(&EngineerId::new("e1")), today), 2.5);
        assert_eq!(today_total(&entries, None, today), 0.0);
    }

    #[test]
    fn hours_by_engineer_groups_by_name() {
        let today = date!(2024 - 03 - 15);
        let engineers = vec![engineer("e1", 0.0, 0.0), engineer("e2", 0.0, 0.0)];
        let entries = vec![
            HourEntry::new("h1", "e1", "p1", today, 2.0),
            HourEntry::new("h2", "e2", "p1", today, 5.0),
            HourEntry::new("h3", "e1", "p1", today, 1.0),
        ];

        assert_eq!(
            hours_by_engineer(&entries, &engineers),
            vec![("Eng e2".to_string(), 5.0), ("Eng e1".to_string(), 3.0)]
        );
    }

    #[test]
    fn status_distribution_lists_every_status() {
        let tasks = vec![
            Task::new("t1", "Fundacao", "p1", TaskStatus::Doing),
            Task::new("t2", "Estrutura", "p1", TaskStatus::Doing),
        ];
        let counts = status_distribution(&tasks);
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[&TaskStatus::Doing], 2);
        assert_eq!(counts[&TaskStatus::Done], 0);
    }
}
