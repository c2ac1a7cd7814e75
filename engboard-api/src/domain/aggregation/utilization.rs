use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::domain::models::{Allocation, AllocationId, Engineer, EngineerId, Project, ProjectId};

use super::sanitize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum UtilizationLevel {
    Available,
    Active,
    NearLimit,
    Overloaded,
}

impl UtilizationLevel {
    /// 0 is available, (0, 80) active, [80, 100] near the limit, above 100 overloaded.
    pub fn classify(utilization: f64) -> Self {
        let utilization = sanitize(utilization);
        if utilization > 100.0 {
            Self::Overloaded
        } else if utilization >= 80.0 {
            Self::NearLimit
        } else if utilization > 0.0 {
            Self::Active
        } else {
            Self::Available
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineerUtilization {
    pub engineer_id: EngineerId,
    pub name: String,
    pub specialty: Option<String>,
    /// Sum of allocation percentages over in-progress projects.
    pub utilization: f64,
    pub level: UtilizationLevel,
    /// Names of the in-progress projects the engineer is allocated to.
    pub active_projects: Vec<String>,
}

/// Utilization of every engineer, in input order.
///
/// Allocations whose project is unknown or not in progress are ignored.
/// Several rows for the same engineer and project are summed.
pub fn compute_utilization(
    engineers: &[Engineer],
    allocations: &[Allocation],
    projects: &[Project],
) -> Vec<EngineerUtilization> {
    let active: HashMap<&ProjectId, &Project> = projects
        .iter()
        .filter(|p| p.status.is_active())
        .map(|p| (&p.id, p))
        .collect();

    let by_engineer = allocations
        .iter()
        .filter_map(|a| active.get(&a.project_id).map(|p| (&a.engineer_id, (a, *p))))
        .into_group_map();

    engineers
        .iter()
        .map(|engineer| {
            let rows = by_engineer.get(&engineer.id);
            let utilization: f64 = rows
                .map(|rows| rows.iter().map(|(a, _)| sanitize(a.percent)).sum::<f64>())
                .unwrap_or(0.0);
            let active_projects = rows
                .map(|rows| {
                    rows.iter()
                        .map(|(_, p)| p.name.clone())
                        .unique()
                        .collect()
                })
                .unwrap_or_default();

            EngineerUtilization {
                engineer_id: engineer.id.clone(),
                name: engineer.name.clone(),
                specialty: engineer.specialty.clone(),
                utilization,
                level: UtilizationLevel::classify(utilization),
                active_projects,
            }
        })
        .collect()
}

/// Mean utilization across the fleet, as a percentage of total capacity.
pub fn fleet_utilization(rows: &[EngineerUtilization]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let used: f64 = rows.iter().map(|r| r.utilization).sum();
    used / (rows.len() as f64 * 100.0) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationOverview {
    /// Sorted by utilization, highest first.
    pub engineers: Vec<EngineerUtilization>,
    pub fleet_utilization: f64,
    pub overloaded_count: usize,
}

pub fn utilization_overview(
    engineers: &[Engineer],
    allocations: &[Allocation],
    projects: &[Project],
) -> UtilizationOverview {
    let mut rows = compute_utilization(engineers, allocations, projects);
    let fleet_utilization = fleet_utilization(&rows);
    let overloaded_count = rows
        .iter()
        .filter(|r| r.level == UtilizationLevel::Overloaded)
        .count();
    rows.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));

    UtilizationOverview {
        engineers: rows,
        fleet_utilization,
        overloaded_count,
    }
}

/// One engineer's allocation on a single project.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub allocation_id: AllocationId,
    pub engineer_id: EngineerId,
    pub name: Option<String>,
    pub percent: f64,
    /// Share of the project's estimate covered by this allocation.
    pub allocated_hours: f64,
}

pub fn team_members(project: &Project, allocations: &[Allocation]) -> Vec<TeamMember> {
    allocations
        .iter()
        .filter(|a| a.project_id == project.id)
        .map(|a| {
            let percent = sanitize(a.percent);
            TeamMember {
                allocation_id: a.id.clone(),
                engineer_id: a.engineer_id.clone(),
                name: a.engineer_name.clone(),
                percent,
                allocated_hours: sanitize(project.estimated_hours) * percent / 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProjectStatus;

    fn engineer(id: &str) -> Engineer {
        Engineer {
            id: EngineerId::new(id),
            name: format!("Engineer {id}"),
            email: None,
            specialty: None,
            level: None,
            normal_rate: 100.0,
            overtime_rate: 150.0,
            availability: 100.0,
            user_id: None,
        }
    }

    #[test]
    fn classification_boundaries() {
        let levels: Vec<_> = [0.0, 1.0, 79.0, 80.0, 100.0, 100.01, 150.0]
            .into_iter()
            .map(UtilizationLevel::classify)
            .collect();

        assert_eq!(
            levels,
            vec![
                UtilizationLevel::Available,
                UtilizationLevel::Active,
                UtilizationLevel::Active,
                UtilizationLevel::NearLimit,
                UtilizationLevel::NearLimit,
                UtilizationLevel::Overloaded,
                UtilizationLevel::Overloaded,
            ]
        );
    }

    #[test]
    fn only_in_progress_projects_count() {
        let projects = vec![
            Project::new("p1", "Ponte", ProjectStatus::InProgress),
            Project::new("p2", "Galpao", ProjectStatus::Completed),
        ];
        let allocations = vec![
            Allocation::new("a1", "e1", "p1", 50.0),
            Allocation::new("a2", "e1", "p2", 50.0),
        ];

        let rows = compute_utilization(&[engineer("e1")], &allocations, &projects);

        assert_eq!(rows[0].utilization, 50.0);
        assert_eq!(rows[0].level, UtilizationLevel::Active);
        assert_eq!(rows[0].active_projects, vec!["Ponte".to_string()]);
    }

    #[test]
    fn unknown_projects_are_ignored() {
        let allocations = vec![Allocation::new("a1", "e1", "missing", 70.0)];
        let rows = compute_utilization(&[engineer("e1")], &allocations, &[]);
        assert_eq!(rows[0].utilization, 0.0);
        assert_eq!(rows[0].level, UtilizationLevel::Available);
    }

    #[test]
    fn negative_and_non_finite_percent_count_as_zero_and_duplicates_sum() {
        let projects = vec![Project::new("p1", "Ponte", ProjectStatus::InProgress)];
        let allocations = vec![
            Allocation::new("a1", "e1", "p1", -30.0),
            Allocation::new("a2", "e1", "p1", f64::NAN),
            Allocation::new("a3", "e1", "p1", 40.0),
            Allocation::new("a4", "e1", "p1", 45.0),
        ];

        let rows = compute_utilization(&[engineer("e1")], &allocations, &projects);

        assert_eq!(rows[0].utilization, 85.0);
        assert_eq!(rows[0].level, UtilizationLevel::NearLimit);
        assert_eq!(rows[0].active_projects.len(), 1);
    }

    #[test]
    fn fleet_utilization_of_empty_fleet_is_zero() {
        assert_eq!(fleet_utilization(&[]), 0.0);
    }

    #[test]
    fn overview_sorts_and_counts_overloaded() {
        let projects = vec![
            Project::new("p1", "Ponte", ProjectStatus::InProgress),
            Project::new("p2", "Viaduto", ProjectStatus::InProgress),
        ];
        let allocations = vec![
            Allocation::new("a1", "e1", "p1", 30.0),
            Allocation::new("a2", "e2", "p1", 80.0),
            Allocation::new("a3", "e2", "p2", 40.0),
        ];
        let engineers = vec![engineer("e1"), engineer("e2"), engineer("e3")];

        let overview = utilization_overview(&engineers, &allocations, &projects);

        let order: Vec<_> = overview
            .engineers
            .iter()
            .map(|r| r.engineer_id.as_str())
            .collect();
        assert_eq!(order, vec!["e2", "e1", "e3"]);
        assert_eq!(overview.overloaded_count, 1);
        // (30 + 120 + 0) / 300 * 100
        assert!((overview.fleet_utilization - 50.0).abs() < 1e-9);
    }

    #[test]
    fn team_member_hours_follow_percent_of_estimate() {
        let project =
            Project::new("p1", "Ponte", ProjectStatus::Planning).with_estimated_hours(400.0);
        let allocations = vec![
            Allocation::new("a1", "e1", "p1", 25.0).with_engineer_name("Ana"),
            Allocation::new("a2", "e2", "other", 50.0),
        ];

        let team = team_members(&project, &allocations);

        assert_eq!(team.len(), 1);
        assert_eq!(team[0].allocated_hours, 100.0);
        assert_eq!(team[0].name.as_deref(), Some("Ana"));
    }
}
