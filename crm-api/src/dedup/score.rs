use serde_json::Value;
use shared_types::Contact;

const DESCRIPTIVE_FIELD_POINTS: u32 = 1;
const ACTIVITY_FIELD_POINTS: u32 = 2;
const CUSTOM_ENTRY_POINTS: u32 = 1;
const FLAG_POINTS: u32 = 1;
const SECONDARY_ID_POINTS: u32 = 1;

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn populated_custom_entries(custom_field: Option<&Value>) -> u32 {
    match custom_field {
        Some(Value::Object(map)) => map
            .values()
            .filter(|v| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
            .count() as u32,
        _ => 0,
    }
}

/// How much data a contact carries. Used only to rank duplicates.
pub fn richness_score(contact: &Contact) -> u32 {
    let descriptive = [
        &contact.name,
        &contact.email,
        &contact.address,
        &contact.description,
        &contact.bg_name,
    ]
    .into_iter()
    .filter(|field| is_filled(field))
    .count() as u32;

    let activity = [
        contact.last_seen,
        contact.last_delivered,
        contact.last_replied,
    ]
    .iter()
    .filter(|ts| ts.is_some())
    .count() as u32;

    let mut score = descriptive * DESCRIPTIVE_FIELD_POINTS + activity * ACTIVITY_FIELD_POINTS;
    score += populated_custom_entries(contact.custom_field.as_ref()) * CUSTOM_ENTRY_POINTS;

    // Presence counts, not the value.
    if contact.manual_mode.is_some() {
        score += FLAG_POINTS;
    }
    if is_filled(&contact.bg_id) {
        score += SECONDARY_ID_POINTS;
    }

    score
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    pub(crate) fn bare_contact(id: i64, tenant_id: &str, phone: &str) -> Contact {
        Contact {
            id,
            tenant_id: Some(tenant_id.to_string()),
            phone: Some(phone.to_string()),
            name: None,
            email: None,
            address: None,
            description: None,
            bg_id: None,
            bg_name: None,
            template_key: None,
            last_seen: None,
            last_delivered: None,
            last_replied: None,
            custom_field: None,
            manual_mode: None,
            created_on: None,
        }
    }

    #[test]
    fn test_empty_contact_scores_zero() {
        assert_eq!(richness_score(&bare_contact(1, "T1", "+1111")), 0);
    }

    #[test]
    fn test_name_email_last_seen_scores_four() {
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.name = Some("Alice".to_string());
        contact.email = Some("alice@example.com".to_string());
        contact.last_seen = Some(Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap());

        assert_eq!(richness_score(&contact), 4);
    }

    #[test]
    fn test_every_field_counted() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.name = Some("Alice".to_string());
        contact.email = Some("alice@example.com".to_string());
        contact.address = Some("1 Main St".to_string());
        contact.description = Some("VIP".to_string());
        contact.bg_name = Some("Retail".to_string());
        contact.last_seen = Some(ts);
        contact.last_delivered = Some(ts);
        contact.last_replied = Some(ts);
        contact.custom_field = Some(json!({"company": "Acme", "role": "Manager"}));
        contact.manual_mode = Some(true);
        contact.bg_id = Some("bg-42".to_string());

        // 5 descriptive + 3 * 2 activity + 2 custom + flag + secondary id
        assert_eq!(richness_score(&contact), 5 + 6 + 2 + 1 + 1);
    }

    #[test]
    fn test_blank_strings_do_not_count() {
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.name = Some(String::new());
        contact.email = Some("   ".to_string());
        contact.bg_id = Some(String::new());

        assert_eq!(richness_score(&contact), 0);
    }

    #[test]
    fn test_false_flag_still_counts() {
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.manual_mode = Some(false);

        assert_eq!(richness_score(&contact), 1);
    }

    #[test]
    fn test_custom_field_counts_only_populated_entries() {
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.custom_field = Some(json!({
            "company": "Acme",
            "notes": "",
            "referrer": null,
            "score": 0,
            "tags": ["a"]
        }));

        assert_eq!(richness_score(&contact), 3);
    }

    #[test]
    fn test_non_object_custom_field_scores_zero() {
        let mut contact = bare_contact(1, "T1", "+1111");
        contact.custom_field = Some(json!(["not", "a", "map"]));

        assert_eq!(richness_score(&contact), 0);
    }
}
