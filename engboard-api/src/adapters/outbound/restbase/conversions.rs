//! Row types of the remote tables and their conversion to domain models.
//!
//! Column names follow the remote schema. Numeric columns may be null and
//! ids may be numbers or uuids, so both are read leniently.

use serde::{Deserialize, Deserializer, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use crate::domain::models::{
    Allocation, Client, ClientInput, Engineer, EngineerInput, HourEntry, HourType, NewHourEntry,
    Profile, Project, ProjectInput, ProjectStatus, Role, Task, TaskDraft, TaskStatus,
};

pub const CLIENTS: &str = "clientes";
pub const ENGINEERS: &str = "engenheiros";
pub const PROJECTS: &str = "projetos";
pub const ALLOCATIONS: &str = "alocacoes";
pub const TASKS: &str = "atividades";
pub const HOUR_ENTRIES: &str = "apontamentos_horas";
pub const USERS: &str = "usuarios";

pub const PROJECT_SELECT: &str = "*,clientes(nome)";
pub const ALLOCATION_SELECT: &str = "*,engenheiros(id,nome)";
pub const TASK_SELECT: &str = "*,projetos(nome),engenheiros(id,nome)";
pub const ENTRY_SELECT: &str = "*,projetos(nome),atividades(titulo),engenheiros(id,nome)";

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

fn parse_date(value: Option<&str>) -> Option<Date> {
    let value = value?;
    // Timestamps are cut down to their date part.
    let day = value.get(..10).unwrap_or(value);
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

fn parse_timestamp(value: Option<&str>) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value?, &Rfc3339).ok()
}

pub fn now_timestamp() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

pub fn project_status_from_wire(value: &str) -> ProjectStatus {
    match value {
        "planejamento" => ProjectStatus::Planning,
        "em_andamento" => ProjectStatus::InProgress,
        "concluido" => ProjectStatus::Completed,
        "pausado" => ProjectStatus::Paused,
        "cancelado" => ProjectStatus::Cancelled,
        other => {
            tracing::warn!("Unknown project status '{}', treating as planning", other);
            ProjectStatus::Planning
        }
    }
}

pub fn project_status_to_wire(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Planning => "planejamento",
        ProjectStatus::InProgress => "em_andamento",
        ProjectStatus::Completed => "concluido",
        ProjectStatus::Paused => "pausado",
        ProjectStatus::Cancelled => "cancelado",
    }
}

pub fn task_status_from_wire(value: &str) -> TaskStatus {
    match value {
        "todo" => TaskStatus::Todo,
        "doing" => TaskStatus::Doing,
        "review" => TaskStatus::Review,
        "done" => TaskStatus::Done,
        _ => TaskStatus::Backlog,
    }
}

pub fn task_status_to_wire(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Backlog => "backlog",
        TaskStatus::Todo => "todo",
        TaskStatus::Doing => "doing",
        TaskStatus::Review => "review",
        TaskStatus::Done => "done",
    }
}

fn hour_type_from_wire(value: Option<&str>) -> HourType {
    match value {
        Some("extra") => HourType::Overtime,
        _ => HourType::Normal,
    }
}

fn hour_type_to_wire(hour_type: HourType) -> &'static str {
    match hour_type {
        HourType::Normal => "normal",
        HourType::Overtime => "extra",
    }
}

fn role_from_wire(value: &str) -> Role {
    match value {
        "admin" => Role::Admin,
        "gestor" => Role::Manager,
        _ => Role::Engineer,
    }
}

#[derive(Deserialize)]
pub struct NameEmbed {
    pub nome: Option<String>,
}

#[derive(Deserialize)]
pub struct TitleEmbed {
    pub titulo: Option<String>,
}

#[derive(Deserialize)]
pub struct ClientRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub nome: String,
    pub cnpj: Option<String>,
    pub contato: Option<String>,
    pub email: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id.into(),
            name: row.nome,
            tax_id: row.cnpj,
            contact: row.contato,
            email: row.email,
        }
    }
}

#[derive(Serialize)]
pub struct ClientWrite<'a> {
    pub nome: &'a str,
    pub cnpj: Option<&'a str>,
    pub contato: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl<'a> From<&'a ClientInput> for ClientWrite<'a> {
    fn from(input: &'a ClientInput) -> Self {
        Self {
            nome: &input.name,
            cnpj: input.tax_id.as_deref(),
            contato: input.contact.as_deref(),
            email: input.email.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub struct EngineerRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub nome: String,
    pub email: Option<String>,
    pub nivel: Option<String>,
    pub especialidade: Option<String>,
    pub disponibilidade: Option<f64>,
    pub custo_hora_normal: Option<f64>,
    pub custo_hora_extra: Option<f64>,
    #[serde(default, deserialize_with = "optional_id")]
    pub usuario_id: Option<String>,
}

impl From<EngineerRow> for Engineer {
    fn from(row: EngineerRow) -> Self {
        Engineer {
            id: row.id.into(),
            name: row.nome,
            email: row.email,
            specialty: row.especialidade,
            level: row.nivel,
            normal_rate: row.custo_hora_normal.unwrap_or(0.0),
            overtime_rate: row.custo_hora_extra.unwrap_or(0.0),
            availability: row.disponibilidade.unwrap_or(0.0),
            user_id: row.usuario_id.map(Into::into),
        }
    }
}

#[derive(Serialize)]
pub struct EngineerWrite<'a> {
    pub nome: &'a str,
    pub email: Option<&'a str>,
    pub nivel: Option<&'a str>,
    pub especialidade: Option<&'a str>,
    pub disponibilidade: f64,
    pub custo_hora_normal: f64,
    pub custo_hora_extra: f64,
    pub usuario_id: Option<&'a str>,
}

impl<'a> EngineerWrite<'a> {
    pub fn new(input: &'a EngineerInput, user_id: Option<&'a str>) -> Self {
        Self {
            nome: &input.name,
            email: input.email.as_deref(),
            nivel: input.level.as_deref(),
            especialidade: input.specialty.as_deref(),
            disponibilidade: input.availability,
            custo_hora_normal: input.normal_rate,
            custo_hora_extra: input.overtime_rate,
            usuario_id: user_id,
        }
    }
}

#[derive(Deserialize)]
pub struct ProjectRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub nome: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub cliente_id: Option<String>,
    pub status: Option<String>,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub horas_estimadas: Option<f64>,
    pub created_at: Option<String>,
    pub clientes: Option<NameEmbed>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id.into(),
            name: row.nome,
            client_id: row.cliente_id.map(Into::into),
            client_name: row.clientes.and_then(|c| c.nome),
            status: row
                .status
                .as_deref()
                .map(project_status_from_wire)
                .unwrap_or(ProjectStatus::Planning),
            estimated_hours: row.horas_estimadas.unwrap_or(0.0),
            start_date: parse_date(row.data_inicio.as_deref()),
            end_date: parse_date(row.data_fim.as_deref()),
            created_at: parse_timestamp(row.created_at.as_deref()),
        }
    }
}

#[derive(Serialize)]
pub struct ProjectWrite<'a> {
    pub nome: &'a str,
    pub cliente_id: Option<&'a str>,
    pub status: &'static str,
    pub horas_estimadas: f64,
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

impl<'a> From<&'a ProjectInput> for ProjectWrite<'a> {
    fn from(input: &'a ProjectInput) -> Self {
        Self {
            nome: &input.name,
            cliente_id: input.client_id.as_ref().map(|id| id.as_str()),
            status: project_status_to_wire(input.status),
            horas_estimadas: input.estimated_hours,
            data_inicio: input.start_date.map(|d| d.to_string()),
            data_fim: input.end_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct EngineerEmbed {
    pub nome: Option<String>,
}

#[derive(Deserialize)]
pub struct AllocationRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "id")]
    pub engenheiro_id: String,
    #[serde(deserialize_with = "id")]
    pub projeto_id: String,
    pub percentual: Option<f64>,
    pub engenheiros: Option<EngineerEmbed>,
}

impl From<AllocationRow> for Allocation {
    fn from(row: AllocationRow) -> Self {
        let mut allocation = Allocation::new(
            row.id,
            row.engenheiro_id,
            row.projeto_id,
            row.percentual.unwrap_or(0.0),
        );
        allocation.engineer_name = row.engenheiros.and_then(|e| e.nome);
        allocation
    }
}

#[derive(Serialize)]
pub struct AllocationWrite<'a> {
    pub engenheiro_id: &'a str,
    pub projeto_id: &'a str,
    pub percentual: f64,
}

#[derive(Deserialize)]
pub struct TaskRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: Option<String>,
    pub prazo: Option<String>,
    #[serde(deserialize_with = "id")]
    pub projeto_id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub engenheiro_id: Option<String>,
    pub horas_previstas: Option<f64>,
    pub updated_at: Option<String>,
    pub projetos: Option<NameEmbed>,
    pub engenheiros: Option<EngineerEmbed>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id.into(),
            title: row.titulo,
            description: row.descricao,
            project_id: row.projeto_id.into(),
            engineer_id: row.engenheiro_id.map(Into::into),
            status: row
                .status
                .as_deref()
                .map(task_status_from_wire)
                .unwrap_or(TaskStatus::Backlog),
            estimated_hours: row.horas_previstas.unwrap_or(0.0),
            deadline: parse_date(row.prazo.as_deref()),
            project_name: row.projetos.and_then(|p| p.nome),
            engineer_name: row.engenheiros.and_then(|e| e.nome),
            updated_at: parse_timestamp(row.updated_at.as_deref()),
        }
    }
}

/// Editable task columns. `status` is only sent on insert.
#[derive(Serialize)]
pub struct TaskWrite<'a> {
    pub titulo: &'a str,
    pub descricao: Option<&'a str>,
    pub projeto_id: &'a str,
    pub engenheiro_id: Option<&'a str>,
    pub horas_previstas: f64,
    pub prazo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl<'a> TaskWrite<'a> {
    pub fn insert(draft: &'a TaskDraft) -> Self {
        Self {
            status: Some(task_status_to_wire(TaskStatus::Backlog)),
            ..Self::update(draft)
        }
    }

    pub fn update(draft: &'a TaskDraft) -> Self {
        Self {
            titulo: &draft.title,
            descricao: draft.description.as_deref(),
            projeto_id: draft.project_id.as_str(),
            engenheiro_id: draft.engineer_id.as_ref().map(|id| id.as_str()),
            horas_previstas: draft.estimated_hours,
            prazo: draft.deadline.map(|d| d.to_string()),
            status: None,
            updated_at: now_timestamp(),
        }
    }
}

#[derive(Serialize)]
pub struct TaskStatusWrite {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct HourEntryRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    #[serde(deserialize_with = "id")]
    pub engenheiro_id: String,
    #[serde(deserialize_with = "id")]
    pub projeto_id: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub atividade_id: Option<String>,
    pub data: Option<String>,
    pub horas: Option<f64>,
    pub tipo_hora: Option<String>,
    pub observacao: Option<String>,
    pub created_at: Option<String>,
    pub projetos: Option<NameEmbed>,
    pub atividades: Option<TitleEmbed>,
    pub engenheiros: Option<EngineerEmbed>,
}

impl HourEntryRow {
    /// Rows without a readable date are dropped.
    pub fn into_domain(self) -> Option<HourEntry> {
        let Some(date) = parse_date(self.data.as_deref()) else {
            tracing::warn!("Skipping hour entry {} with invalid date {:?}", self.id, self.data);
            return None;
        };

        let mut entry = HourEntry::new(
            self.id,
            self.engenheiro_id,
            self.projeto_id,
            date,
            self.horas.unwrap_or(0.0),
        );
        entry.task_id = self.atividade_id.map(Into::into);
        entry.hour_type = hour_type_from_wire(self.tipo_hora.as_deref());
        entry.note = self.observacao;
        entry.project_name = self.projetos.and_then(|p| p.nome);
        entry.task_title = self.atividades.and_then(|a| a.titulo);
        entry.engineer_name = self.engenheiros.and_then(|e| e.nome);
        entry.created_at = parse_timestamp(self.created_at.as_deref());
        Some(entry)
    }
}

#[derive(Serialize)]
pub struct HourEntryWrite<'a> {
    pub engenheiro_id: &'a str,
    pub projeto_id: &'a str,
    pub atividade_id: Option<&'a str>,
    pub data: String,
    pub horas: f64,
    pub tipo_hora: &'static str,
    pub observacao: Option<&'a str>,
}

impl<'a> From<&'a NewHourEntry> for HourEntryWrite<'a> {
    fn from(entry: &'a NewHourEntry) -> Self {
        Self {
            engenheiro_id: entry.engineer_id.as_str(),
            projeto_id: entry.project_id.as_str(),
            atividade_id: entry.task_id.as_ref().map(|id| id.as_str()),
            data: entry.date.to_string(),
            horas: entry.hours,
            tipo_hora: hour_type_to_wire(entry.hour_type),
            observacao: entry.note.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub struct UserRow {
    #[serde(deserialize_with = "id")]
    pub id: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub perfil: Option<String>,
}

impl From<UserRow> for Profile {
    fn from(row: UserRow) -> Self {
        let email = row.email.unwrap_or_default();
        Profile::new(
            row.id,
            row.nome.unwrap_or_else(|| email.clone()),
            email,
            row.perfil
                .as_deref()
                .map(role_from_wire)
                .unwrap_or(Role::Engineer),
        )
    }
}
