use super::{EngineerId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct Engineer {
    pub id: EngineerId,
    pub name: String,
    pub email: Option<String>,
    pub specialty: Option<String>,
    /// Seniority level, free text (e.g. "Junior", "Pleno", "Senior").
    pub level: Option<String>,
    /// Hourly cost for normal hours.
    pub normal_rate: f64,
    /// Hourly cost for overtime hours.
    pub overtime_rate: f64,
    /// Nominal availability as a percentage of full time.
    pub availability: f64,
    /// Auth user linked to this engineer, if any.
    pub user_id: Option<UserId>,
}

impl Engineer {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Writable fields of an engineer.
///
/// The user link is not part of the input: it is resolved from the email
/// whenever an engineer is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineerInput {
    pub name: String,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub level: Option<String>,
    pub normal_rate: f64,
    pub overtime_rate: f64,
    pub availability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_takes_first_word() {
        let engineer = Engineer {
            id: EngineerId::new("e1"),
            name: "Ana Maria Souza".to_string(),
            email: None,
            specialty: None,
            level: None,
            normal_rate: 0.0,
            overtime_rate: 0.0,
            availability: 100.0,
            user_id: None,
        };
        assert_eq!(engineer.first_name(), "Ana");
    }
}
