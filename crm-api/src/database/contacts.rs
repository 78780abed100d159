use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{Contact, CreateContactRequest};

use crate::database::AsyncDbConnection;

pub(crate) const CONTACT_COLUMNS: &str =
    "id, tenant_id, phone, name, email, address, description, bg_id, bg_name, template_key,
     last_seen, last_delivered, last_replied, custom_field, manual_mode, created_on";

/// Map a `contacts_contact` row selected with [`CONTACT_COLUMNS`].
///
/// Timestamp, JSON and flag columns are read leniently: a value that cannot
/// be interpreted comes back as `None` instead of failing the whole query.
pub(crate) fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        phone: text_column(row, 2)?,
        name: text_column(row, 3)?,
        email: text_column(row, 4)?,
        address: text_column(row, 5)?,
        description: text_column(row, 6)?,
        bg_id: text_column(row, 7)?,
        bg_name: text_column(row, 8)?,
        template_key: text_column(row, 9)?,
        last_seen: timestamp_column(row, 10)?,
        last_delivered: timestamp_column(row, 11)?,
        last_replied: timestamp_column(row, 12)?,
        custom_field: json_column(row, 13)?,
        manual_mode: flag_column(row, 14)?,
        created_on: timestamp_column(row, 15)?,
    })
}

fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(bytes) => parse_timestamp(&String::from_utf8_lossy(bytes)),
        ValueRef::Integer(secs) => DateTime::from_timestamp(secs, 0),
        _ => None,
    })
}

fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(bytes) => serde_json::from_slice(bytes).ok(),
        _ => None,
    })
}

fn flag_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<bool>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(n) => Some(n != 0),
        ValueRef::Text(bytes) => match bytes {
            b"true" | b"TRUE" | b"1" => Some(true),
            b"false" | b"FALSE" | b"0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Parse a stored timestamp. Accepts RFC 3339 and the naive
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` form (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339())
}

/// Load every contact, optionally restricted to one tenant.
pub async fn list_all_contacts(
    conn: AsyncDbConnection,
    tenant_id: Option<&str>,
) -> Result<Vec<Contact>> {
    let conn = conn.lock().await?;

    let contacts = match tenant_id {
        Some(tenant_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts_contact WHERE tenant_id = ? ORDER BY id"
            ))?;
            let rows = stmt.query_map([tenant_id], contact_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts_contact ORDER BY id"
            ))?;
            let rows = stmt.query_map([], contact_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(contacts)
}

pub async fn list_contacts(
    conn: AsyncDbConnection,
    tenant_id: &str,
    limit: usize,
) -> Result<Vec<Contact>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts_contact
         WHERE tenant_id = ?
         ORDER BY id ASC
         LIMIT ?"
    ))?;

    let contacts = stmt
        .query_map(params![tenant_id, limit as i64], contact_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contacts)
}

pub async fn get_contact(conn: AsyncDbConnection, id: i64) -> Result<Option<Contact>> {
    let conn = conn.lock().await?;

    let contact = conn
        .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts_contact WHERE id = ?"),
            [id],
            contact_from_row,
        )
        .optional()?;

    Ok(contact)
}

pub async fn find_contact_by_phone(
    conn: AsyncDbConnection,
    tenant_id: &str,
    phone: &str,
) -> Result<Option<Contact>> {
    let conn = conn.lock().await?;

    let contact = conn
        .query_row(
            &format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts_contact
                 WHERE tenant_id = ? AND phone = ?
                 ORDER BY id ASC
                 LIMIT 1"
            ),
            params![tenant_id, phone],
            contact_from_row,
        )
        .optional()?;

    Ok(contact)
}

/// Insert a contact for `tenant_id`. The caller is responsible for
/// validating the phone number.
pub async fn insert_contact(
    conn: AsyncDbConnection,
    tenant_id: &str,
    request: &CreateContactRequest,
    created_on: DateTime<Utc>,
) -> Result<Contact> {
    let phone = request
        .phone
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Phone number is required"))?;

    let custom_field = request
        .custom_field
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let id: i64 = {
        let conn = conn.lock().await?;
        conn.query_row(
            "INSERT INTO contacts_contact
             (tenant_id, phone, name, email, address, description, bg_id, bg_name, template_key,
              last_seen, last_delivered, last_replied, custom_field, manual_mode, created_on)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
            params![
                tenant_id,
                phone,
                request.name,
                request.email,
                request.address,
                request.description,
                request.bg_id,
                request.bg_name,
                request.template_key,
                format_timestamp(request.last_seen),
                format_timestamp(request.last_delivered),
                format_timestamp(request.last_replied),
                custom_field,
                request.manual_mode,
                created_on.to_rfc3339(),
            ],
            |row| row.get(0),
        )?
    };

    get_contact(conn, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Contact {} vanished after insert", id))
}

/// Delete a single contact owned by `tenant_id`. Returns false when no
/// such contact exists.
pub async fn delete_contact(conn: AsyncDbConnection, tenant_id: &str, id: i64) -> Result<bool> {
    let conn = conn.lock().await?;

    let affected = conn.execute(
        "DELETE FROM contacts_contact WHERE id = ? AND tenant_id = ?",
        params![id, tenant_id],
    )?;

    Ok(affected > 0)
}
