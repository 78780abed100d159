use std::cmp::Ordering;
use std::collections::BTreeMap;

use shared_types::{Contact, ContactSummary};

use super::score::richness_score;

#[derive(Debug, Clone)]
pub struct ScoredContact {
    pub contact: Contact,
    pub score: u32,
}

impl ScoredContact {
    pub fn new(contact: Contact) -> Self {
        let score = richness_score(&contact);
        Self { contact, score }
    }

    pub fn summary(&self) -> ContactSummary {
        ContactSummary {
            id: self.contact.id,
            richness_score: self.score,
            name: self.contact.name.clone(),
            email: self.contact.email.clone(),
            created_on: self.contact.created_on,
        }
    }
}

/// Contacts sharing one (tenant, phone) pair. Members are kept in survivor
/// order: the first member is the one to keep.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub tenant_id: String,
    pub phone: String,
    members: Vec<ScoredContact>,
}

impl DuplicateGroup {
    fn new(tenant_id: String, phone: String, contacts: Vec<Contact>) -> Self {
        let mut members: Vec<ScoredContact> =
            contacts.into_iter().map(ScoredContact::new).collect();
        members.sort_by(survivor_order);
        Self {
            tenant_id,
            phone,
            members,
        }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn survivor(&self) -> &ScoredContact {
        &self.members[0]
    }

    pub fn duplicates(&self) -> &[ScoredContact] {
        &self.members[1..]
    }

    pub fn duplicate_ids(&self) -> Vec<i64> {
        self.duplicates().iter().map(|m| m.contact.id).collect()
    }
}

/// Higher score first, then older `created_on` (missing timestamps last),
/// then lower id. Total, so the survivor is reproducible.
pub fn survivor_order(a: &ScoredContact, b: &ScoredContact) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| match (a.contact.created_on, b.contact.created_on) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.contact.id.cmp(&b.contact.id))
}

fn group_key(contact: &Contact) -> Option<(String, String)> {
    let tenant_id = contact.tenant_id.as_deref().filter(|t| !t.trim().is_empty())?;
    let phone = contact.phone.as_deref().filter(|p| !p.trim().is_empty())?;
    Some((tenant_id.to_string(), phone.to_string()))
}

/// Partition contacts by (tenant_id, phone) and keep only the pairs that
/// occur more than once. Contacts without a phone or tenant are never
/// duplicates. Groups come back ordered by tenant, then phone.
pub fn group_duplicates(contacts: Vec<Contact>) -> Vec<DuplicateGroup> {
    let mut buckets: BTreeMap<(String, String), Vec<Contact>> = BTreeMap::new();

    for contact in contacts {
        if let Some(key) = group_key(&contact) {
            buckets.entry(key).or_default().push(contact);
        }
    }

    buckets
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((tenant_id, phone), members)| DuplicateGroup::new(tenant_id, phone, members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::score::tests::bare_contact;
    use chrono::{TimeZone, Utc};

    fn ids(group: &DuplicateGroup) -> Vec<i64> {
        group.members.iter().map(|m| m.contact.id).collect()
    }

    #[test]
    fn test_singletons_are_discarded() {
        let contacts = vec![
            bare_contact(1, "T1", "+1111"),
            bare_contact(2, "T1", "+2222"),
            bare_contact(3, "T2", "+1111"),
        ];

        assert!(group_duplicates(contacts).is_empty());
    }

    #[test]
    fn test_duplicates_never_cross_tenants() {
        let contacts = vec![
            bare_contact(1, "T1", "+1111"),
            bare_contact(2, "T2", "+1111"),
            bare_contact(3, "T1", "+1111"),
        ];

        let groups = group_duplicates(contacts);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tenant_id, "T1");
        assert_eq!(groups[0].phone, "+1111");
        assert_eq!(ids(&groups[0]), vec![1, 3]);
    }

    #[test]
    fn test_blank_phone_and_missing_tenant_are_skipped() {
        let mut no_tenant_a = bare_contact(5, "T1", "+3333");
        no_tenant_a.tenant_id = None;
        let mut no_tenant_b = bare_contact(6, "T1", "+3333");
        no_tenant_b.tenant_id = None;
        let mut no_phone = bare_contact(7, "T1", "");
        no_phone.phone = None;

        let contacts = vec![
            bare_contact(1, "T1", ""),
            bare_contact(2, "T1", ""),
            bare_contact(3, "T1", "  "),
            bare_contact(4, "T1", "  "),
            no_tenant_a,
            no_tenant_b,
            no_phone,
            bare_contact(8, "T1", ""),
        ];

        assert!(group_duplicates(contacts).is_empty());
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let contacts = vec![
            bare_contact(4, "T2", "+1111"),
            bare_contact(1, "T1", "+1111"),
            bare_contact(2, "T1", "+1111"),
            bare_contact(3, "T2", "+1111"),
            bare_contact(5, "T1", "+9999"),
        ];

        let first = group_duplicates(contacts.clone());
        let second = group_duplicates(contacts);

        let keys = |groups: &[DuplicateGroup]| {
            groups
                .iter()
                .map(|g| (g.tenant_id.clone(), g.phone.clone(), ids(g)))
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(
            keys(&first),
            vec![
                ("T1".to_string(), "+1111".to_string(), vec![1, 2]),
                ("T2".to_string(), "+1111".to_string(), vec![3, 4]),
            ]
        );
    }

    #[test]
    fn test_richest_contact_survives() {
        let mut a = bare_contact(1, "T1", "+1111");
        a.name = Some("Alice".to_string());
        a.email = Some("alice@example.com".to_string());
        a.last_seen = Some(Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
        a.created_on = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let mut b = bare_contact(2, "T1", "+1111");
        b.name = Some("Alice B".to_string());
        b.created_on = Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());

        let groups = group_duplicates(vec![b, a]);
        let group = &groups[0];

        assert_eq!(group.survivor().contact.id, 1);
        assert_eq!(group.survivor().score, 4);
        assert_eq!(group.duplicate_ids(), vec![2]);
        assert_eq!(group.duplicates()[0].score, 1);
    }

    #[test]
    fn test_tie_goes_to_oldest() {
        let mut a = bare_contact(10, "T1", "+1111");
        a.name = Some("A".to_string());
        a.email = Some("a@example.com".to_string());
        a.address = Some("Somewhere".to_string());
        a.created_on = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let mut b = bare_contact(3, "T1", "+1111");
        b.name = Some("B".to_string());
        b.email = Some("b@example.com".to_string());
        b.description = Some("Other".to_string());
        b.created_on = Some(Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap());

        let groups = group_duplicates(vec![b, a]);
        assert_eq!(groups[0].survivor().score, 3);
        assert_eq!(groups[0].survivor().contact.id, 10);
    }

    #[test]
    fn test_full_tie_goes_to_lowest_id() {
        let created = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut a = bare_contact(7, "T1", "+1111");
        a.created_on = created;
        let mut b = bare_contact(4, "T1", "+1111");
        b.created_on = created;
        let mut c = bare_contact(9, "T1", "+1111");
        c.created_on = created;

        let groups = group_duplicates(vec![a, b, c]);
        assert_eq!(ids(&groups[0]), vec![4, 7, 9]);
    }

    #[test]
    fn test_missing_created_on_sorts_after_known() {
        let mut dated = bare_contact(8, "T1", "+1111");
        dated.created_on = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        let undated = bare_contact(2, "T1", "+1111");

        let groups = group_duplicates(vec![undated, dated]);
        assert_eq!(groups[0].survivor().contact.id, 8);
    }

    #[test]
    fn test_exactly_one_survivor_with_max_score() {
        let mut contacts = Vec::new();
        for id in 1..=6 {
            let mut c = bare_contact(id, "T1", "+5555");
            if id % 2 == 0 {
                c.name = Some(format!("Contact {}", id));
            }
            if id == 5 {
                c.last_replied = Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
            }
            contacts.push(c);
        }

        let groups = group_duplicates(contacts);
        let group = &groups[0];
        let max = group.members.iter().map(|m| m.score).max().unwrap();

        assert_eq!(group.size(), 6);
        assert_eq!(group.duplicates().len(), 5);
        assert_eq!(group.survivor().score, max);
        assert_eq!(group.survivor().contact.id, 5);
        assert!(!group.duplicate_ids().contains(&5));
    }
}
