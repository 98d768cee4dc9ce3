use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::expiry::{self, InvalidDateError};

/// A product as stored by the data API. Field names on the wire follow the
/// API's Spanish camelCase; the English names are accepted on input too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "precio", alias = "price")]
    pub price: f64,
    pub stock: u32,
    /// Raw `YYYY-MM-DD` string as received. Kept unparsed so a malformed value
    /// surfaces as an [`InvalidDateError`] where it is classified instead of
    /// failing the whole collection load.
    #[serde(
        rename = "fechaCaducidad",
        alias = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<String>,
    /// Fields the data API stores that the dashboard does not use. Sent back
    /// unchanged on every `PUT`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            expiration_date: None,
            extra: Map::new(),
        }
    }

    pub fn expiration(&self) -> Result<Option<NaiveDate>, InvalidDateError> {
        self.expiration_date
            .as_deref()
            .map(expiry::parse_date)
            .transpose()
    }

    /// Expiration date, or `today + default_days` when the product has none.
    /// The default is for display and classification only; it is never written back.
    pub fn expiration_or_default(
        &self,
        today: NaiveDate,
        default_days: i64,
    ) -> Result<NaiveDate, InvalidDateError> {
        match self.expiration()? {
            Some(date) => Ok(date),
            None => expiry::add_days(today, default_days),
        }
    }

    pub fn with_stock(&self, stock: u32) -> Product {
        Product {
            stock,
            ..self.clone()
        }
    }
}

/// Body of `POST /productos`: a product without its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "precio", alias = "price")]
    pub price: f64,
    pub stock: u32,
    #[serde(
        rename = "fechaCaducidad",
        alias = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<String>,
}

impl NewProduct {
    pub fn into_product(self, id: i64) -> Product {
        Product {
            expiration_date: self.expiration_date,
            ..Product::new(id, self.name, self.price, self.stock)
        }
    }
}

/// The "Nuevo / Editar Producto" form. Every field but the expiration date is
/// required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductForm {
    #[serde(rename = "nombre", alias = "name", default)]
    #[validate(required, custom = "not_blank")]
    pub name: Option<String>,
    #[serde(rename = "precio", alias = "price", default)]
    #[validate(required, range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(default)]
    #[validate(required)]
    pub stock: Option<u32>,
    #[serde(rename = "fechaCaducidad", alias = "expirationDate", default)]
    #[validate(custom = "iso_date")]
    pub expiration_date: Option<String>,
}

impl ProductForm {
    /// Validate the form and fill in the default expiration date when it was
    /// left empty.
    pub fn into_new_product(self, today: NaiveDate, default_days: i64) -> AppResult<NewProduct> {
        self.validate()?;

        let expiration = match self.expiration_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => expiry::parse_date(raw)?,
            _ => expiry::add_days(today, default_days)?,
        };

        Ok(NewProduct {
            name: self.name.unwrap_or_default().trim().to_string(),
            price: self.price.unwrap_or_default(),
            stock: self.stock.unwrap_or_default(),
            expiration_date: Some(expiration.format("%Y-%m-%d").to_string()),
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Ingresa un nombre".into());
        return Err(err);
    }
    Ok(())
}

fn iso_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || expiry::parse_date(value).is_ok() {
        return Ok(());
    }
    let mut err = ValidationError::new("date");
    err.message = Some("Fecha inválida, usa YYYY-MM-DD".into());
    Err(err)
}
