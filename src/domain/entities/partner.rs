use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Partner reference data joined into the panel report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Partner {
    pub id: i64,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl Partner {
    /// Display name shown in the partner table. Partners without a
    /// description render as "Unknown Partner", same as missing partners.
    pub fn display_name(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "Unknown Partner".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_uses_description() {
        let partner = Partner {
            id: 1,
            description: Some("Acme Media".to_string()),
            ..Default::default()
        };
        assert_eq!(partner.display_name(), "Acme Media");
    }

    #[test]
    fn test_display_name_fallback_when_missing() {
        let partner = Partner {
            id: 2,
            ..Default::default()
        };
        assert_eq!(partner.display_name(), "Unknown Partner");
    }
}
