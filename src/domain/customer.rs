//! Customer domain entity, its choice enums and the write schema.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::config::{
    CREDIT_LIMIT_PRECISION, CREDIT_LIMIT_SCALE, MSG_BLANK, MSG_INVALID_INTEGER,
    MSG_INVALID_NUMBER, MSG_INVALID_STRING, MSG_REQUIRED,
};
use crate::errors::{field_errors_from, AppError, AppResult, FieldErrors, BODY_FIELD};

/// A string that does not name one of the allowed choices.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("\"{0}\" is not a valid choice.")]
pub struct ParseChoiceError(pub String);

/// Customer salutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Title {
    Mr,
    Mrs,
    Ms,
    Dr,
}

impl Title {
    pub fn as_str(&self) -> &'static str {
        match self {
            Title::Mr => "Mr",
            Title::Mrs => "Mrs",
            Title::Ms => "Ms",
            Title::Dr => "Dr",
        }
    }
}

impl FromStr for Title {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mr" => Ok(Title::Mr),
            "Mrs" => Ok(Title::Mrs),
            "Ms" => Ok(Title::Ms),
            "Dr" => Ok(Title::Dr),
            other => Err(ParseChoiceError(other.to_string())),
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer market category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CustomerCategory {
    Domestic,
    International,
}

impl CustomerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerCategory::Domestic => "Domestic",
            CustomerCategory::International => "International",
        }
    }
}

impl FromStr for CustomerCategory {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Domestic" => Ok(CustomerCategory::Domestic),
            "International" => Ok(CustomerCategory::International),
            other => Err(ParseChoiceError(other.to_string())),
        }
    }
}

impl fmt::Display for CustomerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer domain entity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Customer {
    #[schema(example = 1)]
    pub id: i64,
    pub title: Title,
    pub customer_category: CustomerCategory,
    #[schema(example = "Nimal")]
    pub first_name: String,
    #[schema(example = "Perera")]
    pub last_name: String,
    #[schema(example = "nimal@example.com")]
    pub email: String,
    #[schema(example = "12 Galle Road")]
    pub address_1: String,
    pub address_2: Option<String>,
    #[schema(example = "Colombo")]
    pub city: String,
    #[schema(example = "0771234567")]
    pub mobile: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub photo: Option<String>,
    #[schema(value_type = String, example = "1500.00")]
    pub credit_limit: Decimal,
    /// Credit period in days
    #[schema(example = 30)]
    pub credit_period: i32,
    pub is_deleted: bool,
}

impl Customer {
    /// Check if customer is active (not soft deleted)
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// "First Last (Company)" or "First Last (Individual)"
    pub fn display_name(&self) -> String {
        format!(
            "{} {} ({})",
            self.first_name,
            self.last_name,
            self.company_name.as_deref().unwrap_or("Individual")
        )
    }
}

/// Fully validated customer fields, ready for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDraft {
    pub title: Title,
    pub customer_category: CustomerCategory,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub mobile: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub photo: Option<String>,
    pub credit_limit: Decimal,
    pub credit_period: i32,
}

/// Customer write payload (create and full update).
///
/// Every field is optional at the serde level so that missing fields are
/// reported per field rather than as a single body error.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(
        required,
        custom(function = "validate_title")
    )]
    #[schema(example = "Mr")]
    pub title: Option<String>,

    #[validate(
        required,
        custom(function = "validate_category")
    )]
    #[schema(example = "Domestic")]
    pub customer_category: Option<String>,

    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    #[schema(example = "Nimal")]
    pub first_name: Option<String>,

    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    #[schema(example = "Perera")]
    pub last_name: Option<String>,

    #[validate(
        required,
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    #[schema(example = "nimal@example.com")]
    pub email: Option<String>,

    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    #[schema(example = "12 Galle Road")]
    pub address_1: Option<String>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub address_2: Option<String>,

    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    #[schema(example = "Colombo")]
    pub city: Option<String>,

    #[validate(
        required,
        custom(function = "not_blank"),
        length(max = 20, message = "Ensure this field has no more than 20 characters.")
    )]
    #[schema(example = "0771234567")]
    pub mobile: Option<String>,

    #[validate(length(max = 20, message = "Ensure this field has no more than 20 characters."))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub company_name: Option<String>,

    /// Reference to an already stored photo
    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub photo: Option<String>,

    #[validate(
        required,
        custom(function = "validate_credit_limit")
    )]
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub credit_limit: Option<Decimal>,

    #[validate(required)]
    #[schema(example = 30)]
    pub credit_period: Option<i32>,

    /// Values of the wrong JSON type, keyed by field
    #[serde(skip)]
    type_errors: FieldErrors,
}

impl CustomerInput {
    /// Read a payload from a decoded JSON body.
    ///
    /// Numbers and numeric strings are both accepted for the numeric fields.
    /// A value of the wrong type is kept as an error on its own field and
    /// surfaces from [`CustomerInput::into_draft`] together with the other
    /// field errors. A body that is not an object is a `body` error.
    pub fn from_json(body: Value) -> Self {
        let fields = match body {
            Value::Object(fields) => fields,
            other => {
                let mut input = Self::default();
                input.type_errors.insert(
                    BODY_FIELD.to_string(),
                    vec![format!(
                        "Invalid data. Expected a dictionary, but got {}.",
                        json_kind(&other)
                    )],
                );
                return input;
            }
        };

        let mut reader = FieldReader {
            fields,
            errors: FieldErrors::new(),
        };
        Self {
            title: reader.text("title"),
            customer_category: reader.text("customer_category"),
            first_name: reader.text("first_name"),
            last_name: reader.text("last_name"),
            email: reader.text("email"),
            address_1: reader.text("address_1"),
            address_2: reader.text("address_2"),
            city: reader.text("city"),
            mobile: reader.text("mobile"),
            phone: reader.text("phone"),
            company_name: reader.text("company_name"),
            photo: reader.text("photo"),
            credit_limit: reader.decimal("credit_limit"),
            credit_period: reader.integer("credit_period"),
            type_errors: reader.errors,
        }
    }

    /// Validate the payload and convert it into a persistable draft.
    ///
    /// # Errors
    /// Returns `AppError::Validation` with every failing field.
    pub fn into_draft(mut self) -> AppResult<CustomerDraft> {
        let type_errors = std::mem::take(&mut self.type_errors);
        if type_errors.contains_key(BODY_FIELD) {
            return Err(AppError::Validation(type_errors));
        }

        let mut fields = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => field_errors_from(errors),
        };
        // A mistyped value was read as absent; its type error replaces "required".
        fields.extend(type_errors);
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        let title = required("title", self.title)?;
        let category = required("customer_category", self.customer_category)?;
        let mut credit_limit = required("credit_limit", self.credit_limit)?;
        credit_limit.rescale(CREDIT_LIMIT_SCALE);

        Ok(CustomerDraft {
            title: title
                .trim()
                .parse()
                .map_err(|e: ParseChoiceError| AppError::field("title", e.to_string()))?,
            customer_category: category
                .trim()
                .parse()
                .map_err(|e: ParseChoiceError| {
                    AppError::field("customer_category", e.to_string())
                })?,
            first_name: required_text("first_name", self.first_name)?,
            last_name: required_text("last_name", self.last_name)?,
            email: required_text("email", self.email)?,
            address_1: required_text("address_1", self.address_1)?,
            address_2: optional_text(self.address_2),
            city: required_text("city", self.city)?,
            mobile: required_text("mobile", self.mobile)?,
            phone: optional_text(self.phone),
            company_name: optional_text(self.company_name),
            photo: optional_text(self.photo),
            credit_limit,
            credit_period: required("credit_period", self.credit_period)?,
        })
    }
}

fn required<T>(field: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::field(field, MSG_REQUIRED))
}

fn required_text(field: &str, value: Option<String>) -> AppResult<String> {
    required(field, value).map(|v| v.trim().to_string())
}

/// Blank optional strings are stored as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pulls typed values out of a JSON object, recording an error for each
/// value of the wrong shape.
struct FieldReader {
    fields: Map<String, Value>,
    errors: FieldErrors,
}

impl FieldReader {
    fn reject(&mut self, name: &str, message: &str) {
        self.errors
            .insert(name.to_string(), vec![message.to_string()]);
    }

    fn text(&mut self, name: &str) -> Option<String> {
        match self.fields.remove(name)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.reject(name, MSG_INVALID_STRING);
                None
            }
        }
    }

    fn decimal(&mut self, name: &str) -> Option<Decimal> {
        let parsed = match self.fields.remove(name)? {
            Value::Null => return None,
            Value::String(s) => parse_decimal(s.trim()),
            Value::Number(n) => parse_decimal(&n.to_string()),
            _ => None,
        };
        if parsed.is_none() {
            self.reject(name, MSG_INVALID_NUMBER);
        }
        parsed
    }

    fn integer(&mut self, name: &str) -> Option<i32> {
        let parsed = match self.fields.remove(name)? {
            Value::Null => return None,
            Value::String(s) => s.trim().parse::<i32>().ok(),
            Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            _ => None,
        };
        if parsed.is_none() {
            self.reject(name, MSG_INVALID_INTEGER);
        }
        parsed
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", MSG_BLANK));
    }
    Ok(())
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<Title>()
        .map(|_| ())
        .map_err(|e| invalid("invalid_choice", e.to_string()))
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    value
        .trim()
        .parse::<CustomerCategory>()
        .map(|_| ())
        .map_err(|e| invalid("invalid_choice", e.to_string()))
}

fn validate_credit_limit(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid(
            "min_value",
            "Ensure this value is greater than or equal to 0.",
        ));
    }

    if value.normalize().scale() > CREDIT_LIMIT_SCALE {
        return Err(invalid(
            "max_decimal_places",
            format!(
                "Ensure that there are no more than {} decimal places.",
                CREDIT_LIMIT_SCALE
            ),
        ));
    }

    let integer_limit = Decimal::from(10i64.pow(CREDIT_LIMIT_PRECISION - CREDIT_LIMIT_SCALE));
    if value.trunc() >= integer_limit {
        return Err(invalid(
            "max_digits",
            format!(
                "Ensure that there are no more than {} digits in total.",
                CREDIT_LIMIT_PRECISION
            ),
        ));
    }

    Ok(())
}
