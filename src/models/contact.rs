use rusqlite::{Connection, OptionalExtension, params};

/// A stored contact row. `phone` is nullable in the store and surfaced as
/// an empty string. `created_at` is assigned by the store at insert.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
}

/// Field values for a contact about to be inserted. Callers trim before
/// constructing; the store never sees untrimmed input.
#[derive(Debug)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

const SELECT_CONTACT: &str =
    "SELECT id, name, email, COALESCE(phone, '') AS phone, created_at FROM contacts";

fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        created_at: row.get("created_at")?,
    })
}

/// All contacts, newest first (id descending).
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Contact>> {
    let sql = format!("{SELECT_CONTACT} ORDER BY id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let contacts = stmt
        .query_map([], row_to_contact)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contacts)
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Contact>> {
    let sql = format!("{SELECT_CONTACT} WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_contact).optional()
}

/// Insert a contact and return the store-assigned id.
pub fn create(conn: &Connection, new: &NewContact) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO contacts (name, email, phone) VALUES (?1, ?2, ?3)",
        params![new.name, new.email, new.phone],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update name/email/phone in place. `id` and `created_at` are immutable.
/// Returns the number of rows affected (0 when no such id).
pub fn update(
    conn: &Connection,
    id: i64,
    name: &str,
    email: &str,
    phone: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE contacts SET name = ?1, email = ?2, phone = ?3 WHERE id = ?4",
        params![name, email, phone, id],
    )
}

/// Delete by id. Returns the number of rows affected (0 when no such id).
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM contacts WHERE id = ?1", params![id])
}
