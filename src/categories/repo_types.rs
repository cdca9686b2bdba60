use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Shared label; categories have no owner.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
