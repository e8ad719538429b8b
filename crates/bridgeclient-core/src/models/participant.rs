use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One participant as listed by `/v3/participants`.
///
/// Every field is optional; the server omits what it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "createdOn")]
    pub created_on: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "studyIdentifier")]
    pub study_identifier: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

// Response from GET /v3/participants
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantPage {
    pub total: u64,
    pub items: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participant() {
        let json = r#"{"createdOn":"2015-03-09T17:30:00.000Z","email":"p1@example.org","firstName":"Pat","id":"aBc123","lastName":"Doe","status":"enabled","studyIdentifier":"parkinson","type":"StudyParticipant","roles":[]}"#;
        let p: Participant = serde_json::from_str(json).expect("Failed to parse participant");

        assert_eq!(p.id.as_deref(), Some("aBc123"));
        assert_eq!(p.kind.as_deref(), Some("StudyParticipant"));
        assert_eq!(p.study_identifier.as_deref(), Some("parkinson"));
        assert_eq!(p.first_name.as_deref(), Some("Pat"));
        assert_eq!(p.last_name.as_deref(), Some("Doe"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let p: Participant = serde_json::from_str(r#"{"email": "p2@example.org"}"#).unwrap();
        assert_eq!(
            p,
            Participant {
                email: Some("p2@example.org".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_parse_page() {
        let page: ParticipantPage =
            serde_json::from_str(r#"{"total": 7, "items": [{"id": "a"}, {"id": "b"}], "offsetBy": 0}"#)
                .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 2);

        assert!(serde_json::from_str::<ParticipantPage>(r#"{"total": 0}"#).is_err());
        assert!(serde_json::from_str::<ParticipantPage>(r#"{"items": []}"#).is_err());
    }
}
