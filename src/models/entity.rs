use serde::Serialize;

/// A tracked team member.
///
/// `login` is the stable external identifier; `id` is the local row id used
/// as foreign key by events, daily activity and summaries.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Entity {
    pub id: i64,
    pub login: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub included: bool,
}

impl Entity {
    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    pub fn name_or_empty(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }
}
