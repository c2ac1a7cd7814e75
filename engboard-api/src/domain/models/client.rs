use super::ClientId;

/// A customer that owns projects.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    /// Company tax id (CNPJ).
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

/// Writable fields of a client, used for both create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInput {
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}
