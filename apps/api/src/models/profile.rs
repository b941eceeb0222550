use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::matching::codec::is_absent;

/// A candidate profile. `skills_embedding` is read through `to_jsonb` so any
/// stored representation arrives as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub skills_embedding: Option<Value>,
    pub resume_url: Option<String>,
}

impl ProfileRow {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("User")
    }

    pub fn has_embedding(&self) -> bool {
        self.skills_embedding
            .as_ref()
            .is_some_and(|v| !is_absent(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(embedding: Option<Value>) -> ProfileRow {
        ProfileRow {
            id: Uuid::nil(),
            full_name: None,
            skills_embedding: embedding,
            resume_url: None,
        }
    }

    #[test]
    fn test_empty_embeddings_do_not_count() {
        assert!(!profile(None).has_embedding());
        assert!(!profile(Some(Value::Null)).has_embedding());
        assert!(!profile(Some(json!([]))).has_embedding());
        assert!(!profile(Some(json!(""))).has_embedding());
        assert!(profile(Some(json!([0.1, 0.2]))).has_embedding());
    }

    #[test]
    fn test_display_name_defaults_to_user() {
        assert_eq!(profile(None).display_name(), "User");
    }
}
