use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{Contact, ContactUpdate, NewContact};

pub async fn insert_contact(contact: &NewContact, conn: &mut SqliteConnection) -> Result<Contact, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO contacts (user_id, city, street, house, building, structure, apartment, phone)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(contact.user_id)
    .bind(&contact.city)
    .bind(&contact.street)
    .bind(&contact.house)
    .bind(&contact.building)
    .bind(&contact.structure)
    .bind(&contact.apartment)
    .bind(&contact.phone)
    .fetch_one(conn)
    .await
}

pub async fn fetch_contacts_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Contact>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM contacts WHERE user_id = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(conn)
        .await
}

/// Orders may only reference contacts owned by the order's user; this is the check behind `InvalidContact`.
pub async fn contact_belongs_to_user(
    contact_id: i64,
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM contacts WHERE id = ? AND user_id = ?")
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub async fn update_contact(
    user_id: i64,
    contact_id: i64,
    update: ContactUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Contact>, sqlx::Error> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for contact {contact_id}. Update request skipped.");
        return sqlx::query_as("SELECT * FROM contacts WHERE id = ? AND user_id = ?")
            .bind(contact_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await;
    }
    let mut builder = QueryBuilder::new("UPDATE contacts SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(city) = update.city {
        set_clause.push("city = ");
        set_clause.push_bind_unseparated(city);
    }
    if let Some(street) = update.street {
        set_clause.push("street = ");
        set_clause.push_bind_unseparated(street);
    }
    if let Some(house) = update.house {
        set_clause.push("house = ");
        set_clause.push_bind_unseparated(house);
    }
    if let Some(building) = update.building {
        set_clause.push("building = ");
        set_clause.push_bind_unseparated(building);
    }
    if let Some(structure) = update.structure {
        set_clause.push("structure = ");
        set_clause.push_bind_unseparated(structure);
    }
    if let Some(apartment) = update.apartment {
        set_clause.push("apartment = ");
        set_clause.push_bind_unseparated(apartment);
    }
    if let Some(phone) = update.phone {
        set_clause.push("phone = ");
        set_clause.push_bind_unseparated(phone);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(contact_id);
    builder.push(" AND user_id = ");
    builder.push_bind(user_id);
    builder.push(" RETURNING *");
    builder.build_query_as::<Contact>().fetch_optional(conn).await
}

/// Deletes one contact if it belongs to the user. A contact referenced by an order fails the foreign key check;
/// the caller maps that to a conflict.
pub async fn delete_contact(user_id: i64, contact_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM contacts WHERE id = ? AND user_id = ?")
        .bind(contact_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected() > 0)
}
