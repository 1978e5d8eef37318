//! Customer address book.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use larder_core::{AddressId, CustomerId};

use crate::{RepositoryError, write_error};

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    #[serde(skip_serializing)]
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when saving an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    pub name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "IN".to_owned()
}

impl AddressInput {
    /// Check required fields are present.
    ///
    /// # Errors
    ///
    /// Returns the name of the first blank required field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(format!("{field} is required")),
            None => Ok(()),
        }
    }
}

impl From<&Address> for AddressInput {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            phone: address.phone.clone(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            is_default: address.is_default,
        }
    }
}

const COLUMNS: &str = "id, customer_id, name, phone, line1, line2, city, state, postal_code, \
                       country, is_default, created_at";

/// Repository for address database operations. Every call is scoped to one
/// customer.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The customer's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, customer: CustomerId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(&format!(
            "SELECT {COLUMNS} FROM addresses WHERE customer_id = $1
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(customer)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// One of the customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        customer: CustomerId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(&format!(
            "SELECT {COLUMNS} FROM addresses WHERE id = $1 AND customer_id = $2"
        ))
        .bind(id)
        .bind(customer)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Save a new address. The customer's first address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        customer: CustomerId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE customer_id = $1")
                .bind(customer)
                .fetch_one(&mut *tx)
                .await?;
        let is_default = input.is_default || existing == 0;

        if is_default {
            clear_default(&mut tx, customer).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO addresses
                (customer_id, name, phone, line1, line2, city, state, postal_code, country, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        ))
        .bind(customer)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "address"))?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no such address.
    pub async fn update(
        &self,
        customer: CustomerId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, customer).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            "UPDATE addresses
             SET name = $3, phone = $4, line1 = $5, line2 = $6, city = $7, state = $8,
                 postal_code = $9, country = $10, is_default = is_default OR $11
             WHERE id = $1 AND customer_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(customer)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| write_error(e, "address"))?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no such address.
    pub async fn delete(&self, customer: CustomerId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND customer_id = $2")
            .bind(id)
            .bind(customer)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn clear_default(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    customer: CustomerId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE addresses SET is_default = FALSE WHERE customer_id = $1 AND is_default")
        .bind(customer)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names_missing_field() {
        let input = AddressInput {
            name: "Asha".to_owned(),
            phone: "9800000000".to_owned(),
            line1: "12 MG Road".to_owned(),
            line2: None,
            city: String::new(),
            state: "KA".to_owned(),
            postal_code: "560001".to_owned(),
            country: default_country(),
            is_default: false,
        };
        assert_eq!(input.validate(), Err("city is required".to_owned()));
    }

    #[test]
    fn test_country_defaults_when_omitted() {
        let input: AddressInput = serde_json::from_str(
            r#"{"name":"A","phone":"1","line1":"x","city":"c","state":"s","postal_code":"p"}"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(input.country, "IN");
        assert!(!input.is_default);
    }
}
