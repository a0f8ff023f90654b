use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::error::{AppError, AppResult};

pub const MAX_CODE_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 255;

/// A row of the `inventory` table, keyed externally by its QR code.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub code: String,
    pub description: Option<String>,
    pub image_reference: Option<String>,
}

/// Body of `POST /items`. Accepts the original frontend's `qr_code`/`image_url` keys too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    #[serde(alias = "qr_code")]
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "image_url")]
    pub image_reference: Option<String>,
}

/// Validated fields of an item about to be inserted. The code is resolved separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub quantity: i32,
    pub requested_code: Option<String>,
    pub description: Option<String>,
    pub image_reference: Option<String>,
}

impl CreateItemRequest {
    pub fn validate(self) -> AppResult<NewItem> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(AppError::Validation("name is required".to_string())),
        };
        validate_name(&name)?;
        let quantity = self
            .quantity
            .ok_or_else(|| AppError::Validation("quantity is required".to_string()))?;
        validate_quantity(quantity)?;
        validate_text("description", self.description.as_deref())?;
        validate_text("imageReference", self.image_reference.as_deref())?;

        Ok(NewItem {
            name,
            quantity,
            requested_code: self.code,
            description: self.description,
            image_reference: self.image_reference,
        })
    }
}

/// Body of `PUT /items/{code}`.
///
/// Omitted fields are left untouched. For the nullable fields an explicit `null`
/// clears the column, which is why they are double options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", alias = "image_url")]
    pub image_reference: Option<Option<String>>,
}

/// Body of `PATCH /items/{code}/quantity`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i32,
}

impl ItemPatch {
    pub fn quantity_only(quantity: i32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
            && self.image_reference.is_none()
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::Validation(
                "at least one of name, quantity, description, imageReference is required"
                    .to_string(),
            ));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("name must not be empty".to_string()));
            }
            validate_name(name)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(description) = &self.description {
            validate_text("description", description.as_deref())?;
        }
        if let Some(image_reference) = &self.image_reference {
            validate_text("imageReference", image_reference.as_deref())?;
        }
        Ok(())
    }

    /// Applies the patch to an in-memory copy of an item.
    pub fn apply_to(&self, item: &mut InventoryItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(image_reference) = &self.image_reference {
            item.image_reference = image_reference.clone();
        }
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::Validation(
            "quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    validate_text("name", Some(name))
}

/// Postgres text columns cannot hold NUL.
fn validate_text(field: &str, value: Option<&str>) -> AppResult<()> {
    if value.is_some_and(|v| v.contains('\0')) {
        return Err(AppError::Validation(format!(
            "{} must not contain NUL characters",
            field
        )));
    }
    Ok(())
}

/// Rejects codes that cannot be stored or scanned back reliably.
pub fn validate_code(code: &str) -> AppResult<()> {
    if code.chars().count() > MAX_CODE_LEN {
        return Err(AppError::Validation(format!(
            "code must be at most {} characters",
            MAX_CODE_LEN
        )));
    }
    if code.chars().any(char::is_control) {
        return Err(AppError::Validation(
            "code must not contain control characters".to_string(),
        ));
    }
    Ok(())
}
