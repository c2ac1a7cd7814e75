use time::{Duration, OffsetDateTime};

use crate::domain::models::{
    Allocation, Client, ClientId, Engineer, EngineerId, HourEntry, Profile, Project,
    ProjectStatus, Role, Task, TaskStatus, UserId,
};

use super::InMemoryStore;

fn engineer(id: &str, name: &str, email: &str, user: Option<&str>, rate: f64) -> Engineer {
    Engineer {
        id: EngineerId::new(id),
        name: name.to_string(),
        email: Some(email.to_string()),
        specialty: Some("Estruturas".to_string()),
        level: Some("Pleno".to_string()),
        normal_rate: rate,
        overtime_rate: rate * 1.5,
        availability: 100.0,
        user_id: user.map(UserId::new),
    }
}

/// Demo data for the `memory` backend. Passwords equal the local part of
/// the email address.
pub(super) fn demo(store: InMemoryStore) -> InMemoryStore {
    let now = OffsetDateTime::now_utc();
    let today = now.date();
    let days_ago = |n: i64| today.saturating_sub(Duration::days(n));

    store
        .with_user(
            Profile::new("u-admin", "Admin", "admin@engboard.local", Role::Admin),
            "admin",
        )
        .with_user(
            Profile::new("u-gestor", "Gestora", "gestor@engboard.local", Role::Manager),
            "gestor",
        )
        .with_user(
            Profile::new("u-ana", "Ana Souza", "ana@engboard.local", Role::Engineer),
            "ana",
        )
        .with_clients(vec![Client {
            id: ClientId::new("c-1"),
            name: "Construtora Horizonte".to_string(),
            tax_id: Some("12.345.678/0001-90".to_string()),
            contact: Some("Marina".to_string()),
            email: Some("contato@horizonte.example".to_string()),
        }])
        .with_engineers(vec![
            engineer("e-ana", "Ana Souza", "ana@engboard.local", Some("u-ana"), 110.0),
            engineer("e-bruno", "Bruno Lima", "bruno@engboard.local", None, 95.0),
            engineer("e-gestor", "Gestora", "gestor@engboard.local", Some("u-gestor"), 140.0),
        ])
        .with_projects(vec![
            Project::new("p-ponte", "Ponte Rio Claro", ProjectStatus::InProgress)
                .with_client("c-1", "Construtora Horizonte")
                .with_estimated_hours(320.0)
                .with_created_at(now - Duration::days(40)),
            Project::new("p-galpao", "Galpao Logistico", ProjectStatus::Planning)
                .with_estimated_hours(180.0)
                .with_created_at(now - Duration::days(10)),
            Project::new("p-escola", "Reforma Escola", ProjectStatus::Completed)
                .with_client("c-1", "Construtora Horizonte")
                .with_estimated_hours(90.0)
                .with_created_at(now - Duration::days(120)),
        ])
        .with_allocations(vec![
            Allocation::new("a-1", "e-ana", "p-ponte", 60.0),
            Allocation::new("a-2", "e-bruno", "p-ponte", 50.0),
            Allocation::new("a-3", "e-bruno", "p-galpao", 40.0),
            Allocation::new("a-4", "e-ana", "p-escola", 100.0),
        ])
        .with_tasks(vec![
            Task::new("t-1", "Sondagem do terreno", "p-ponte", TaskStatus::Done)
                .with_engineer("e-bruno"),
            Task::new("t-2", "Calculo estrutural", "p-ponte", TaskStatus::Doing)
                .with_engineer("e-ana"),
            Task::new("t-3", "Revisao de projeto", "p-ponte", TaskStatus::Review)
                .with_engineer("e-ana"),
            Task::new("t-4", "Layout do galpao", "p-galpao", TaskStatus::Todo)
                .with_engineer("e-bruno"),
            Task::new("t-5", "Orcamento preliminar", "p-galpao", TaskStatus::Backlog),
        ])
        .with_hour_entries(vec![
            HourEntry::new("h-1", "e-ana", "p-ponte", today, 6.0),
            HourEntry::new("h-2", "e-ana", "p-ponte", days_ago(1), 8.0),
            HourEntry::new("h-3", "e-bruno", "p-ponte", days_ago(2), 7.5),
            HourEntry::new("h-4", "e-bruno", "p-galpao", days_ago(3), 3.0).overtime(),
            HourEntry::new("h-5", "e-ana", "p-escola", days_ago(45), 12.0),
        ])
}
