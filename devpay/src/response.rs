//! Parsed API responses.
//!
//! A [`Response`] wraps the decoded JSON object returned by the API together
//! with the [`Operation`] that produced it. Fields are read by name through
//! explicit accessors, or the whole body can be converted into one of the
//! declared models ([`Charge`], [`Customer`]) or any other
//! [`serde::de::DeserializeOwned`] type.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    error::{ApiErrorBody, DevPayError, Result},
    operation::Operation,
};

/// Successful exchange with the API.
///
/// # Examples
///
/// ```
/// use devpay::{Operation, Response};
/// use serde_json::json;
///
/// let response = Response::from_value(
///     Operation::ExecuteCharge,
///     json!({"id": "ch_1", "amount": 2000}),
/// )
/// .unwrap();
///
/// assert_eq!(response.id(), Some("ch_1"));
/// assert_eq!(response.get_i64("amount"), Some(2000));
/// assert_eq!(response.operation(), Operation::ExecuteCharge);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    operation: Operation,
    body: Map<String, Value>,
}

impl Response {
    /// Wraps an already-decoded body.
    #[must_use]
    pub fn new(operation: Operation, body: Map<String, Value>) -> Self {
        Self { operation, body }
    }

    /// Wraps a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::InvalidInput`] if `value` is not an object.
    pub fn from_value(operation: Operation, value: Value) -> Result<Self> {
        match value {
            Value::Object(body) => Ok(Self::new(operation, body)),
            _ => Err(DevPayError::InvalidInput("response body must be a JSON object".to_owned())),
        }
    }

    /// The operation this response answers.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the raw value of a top-level field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Returns a string field.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.body.get(name).and_then(Value::as_str)
    }

    /// Returns an integer field.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.body.get(name).and_then(Value::as_i64)
    }

    /// Returns a boolean field.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.body.get(name).and_then(Value::as_bool)
    }

    /// Returns the `id` field, present on charges and customers.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Returns true if the body has a top-level field called `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.body.contains_key(name)
    }

    /// Returns the server-reported error carried by this response.
    ///
    /// Only clients built with `raise_errors(false)` hand out responses with
    /// an error; otherwise the error is returned as a [`DevPayError`].
    #[must_use]
    pub fn error(&self) -> Option<ApiErrorBody> {
        error_body(&self.body)
    }

    /// Returns true if this response carries a server-reported error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Borrows the decoded body.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consumes the response, returning the decoded body.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.body
    }

    /// Converts the body into a declared structure.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::InvalidInput`] if the body does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.body.clone())).map_err(|e| {
            DevPayError::InvalidInput(format!(
                "cannot decode {} response: {e}",
                self.operation.as_str()
            ))
        })
    }
}

/// Extracts the `error` field of a body, if it is present and truthy.
///
/// `null`, `false`, zero, `""`, `[]` and `{}` all mean no error.
pub(crate) fn error_body(body: &Map<String, Value>) -> Option<ApiErrorBody> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => Some(
            serde_json::from_value(Value::Object(map.clone())).unwrap_or_else(|_| ApiErrorBody {
                kind: map
                    .get("type")
                    .and_then(Value::as_str)
                    .map(Into::into)
                    .unwrap_or_default(),
                message: map
                    .get("message")
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_owned))
                    .unwrap_or_default(),
                code: None,
                param: None,
            }),
        ),
        Value::String(message) => Some(ApiErrorBody {
            kind: Default::default(),
            message: message.clone(),
            code: None,
            param: None,
        }),
        other => Some(ApiErrorBody {
            kind: Default::default(),
            message: other.to_string(),
            code: None,
            param: None,
        }),
    }
}

/// Card details as echoed back by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Last four digits.
    #[serde(default)]
    pub last4: Option<String>,
    /// Card brand, e.g. `Visa`.
    #[serde(default, rename = "type")]
    pub brand: Option<String>,
    /// Expiry month.
    #[serde(default)]
    pub exp_month: Option<u32>,
    /// Expiry year.
    #[serde(default)]
    pub exp_year: Option<u32>,
    /// Cardholder name.
    #[serde(default)]
    pub name: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Charge identifier.
    pub id: String,
    /// Amount in the currency's minor unit.
    #[serde(default)]
    pub amount: Option<i64>,
    /// Lowercase ISO 4217 code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Whether the charge has been refunded.
    #[serde(default)]
    pub refunded: Option<bool>,
    /// Customer the charge was billed to.
    #[serde(default)]
    pub customer: Option<String>,
    /// Card the charge was made against.
    #[serde(default)]
    pub card: Option<Card>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored billing profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier.
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Active card.
    #[serde(default)]
    pub active_card: Option<Card>,
    /// Set once the customer has been deleted.
    #[serde(default)]
    pub deleted: Option<bool>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::RemoteErrorKind;

    fn response(value: Value) -> Response {
        Response::from_value(Operation::ExecuteCharge, value).unwrap()
    }

    #[test]
    fn test_accessors() {
        let resp = response(json!({"id": "ch_1", "amount": 2000, "paid": true}));
        assert_eq!(resp.id(), Some("ch_1"));
        assert_eq!(resp.get_i64("amount"), Some(2000));
        assert_eq!(resp.get_bool("paid"), Some(true));
        assert_eq!(resp.get_str("amount"), None);
        assert!(resp.get("missing").is_none());
        assert!(resp.contains("paid"));
        assert!(!resp.is_error());
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Response::from_value(Operation::RefundCharge, json!("ok")).is_err());
    }

    #[test]
    fn test_into_inner_returns_body() {
        let resp = response(json!({"id": "ch_2"}));
        let body = resp.clone().into_inner();
        assert_eq!(body.get("id"), Some(&json!("ch_2")));
        assert_eq!(resp.as_map(), &body);
    }

    #[test]
    fn test_error_extraction() {
        let resp = response(json!({
            "error": {"type": "card_error", "message": "Your card was declined.", "code": "card_declined"}
        }));
        let err = resp.error().unwrap();
        assert_eq!(err.kind, RemoteErrorKind::CardError);
        assert_eq!(err.message, "Your card was declined.");
        assert_eq!(err.code.as_deref(), Some("card_declined"));
    }

    #[test]
    fn test_falsy_error_fields_are_ignored() {
        assert!(response(json!({"error": null})).error().is_none());
        assert!(response(json!({"error": false})).error().is_none());
        assert!(response(json!({"error": {}})).error().is_none());
        assert!(response(json!({"error": ""})).error().is_none());
        assert!(response(json!({"error": 0})).error().is_none());
        assert!(response(json!({"error": 0.0})).error().is_none());
        assert!(response(json!({"error": []})).error().is_none());
    }

    #[test]
    fn test_truthy_scalar_error_fields_count() {
        assert!(response(json!({"error": 1})).is_error());
        assert!(response(json!({"error": true})).is_error());
        assert!(response(json!({"error": ["declined"]})).is_error());
    }

    #[test]
    fn test_string_error_field() {
        let err = response(json!({"error": "boom"})).error().unwrap();
        assert_eq!(err.kind, RemoteErrorKind::Unknown(String::new()));
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_error_object_with_odd_message_type() {
        let err = response(json!({"error": {"type": "api_error", "message": 42}})).error().unwrap();
        assert_eq!(err.kind, RemoteErrorKind::ApiError);
        assert_eq!(err.message, "42");
    }

    #[test]
    fn test_deserialize_charge() {
        let resp = response(json!({
            "id": "ch_1",
            "amount": 2000,
            "currency": "usd",
            "refunded": false,
            "card": {"last4": "4242", "type": "Visa", "exp_month": 10, "exp_year": 2031, "country": "US"},
            "livemode": false
        }));
        let charge: Charge = resp.deserialize().unwrap();
        assert_eq!(charge.id, "ch_1");
        assert_eq!(charge.amount, Some(2000));
        assert_eq!(charge.refunded, Some(false));
        let card = charge.card.unwrap();
        assert_eq!(card.brand.as_deref(), Some("Visa"));
        assert_eq!(card.extra.get("country"), Some(&json!("US")));
        assert_eq!(charge.extra.get("livemode"), Some(&json!(false)));
    }

    #[test]
    fn test_deserialize_customer() {
        let resp = Response::from_value(
            Operation::RetrieveCustomer,
            json!({"id": "cus_1", "description": "gold", "active_card": {"last4": "1881"}}),
        )
        .unwrap();
        let customer: Customer = resp.deserialize().unwrap();
        assert_eq!(customer.id, "cus_1");
        assert_eq!(customer.active_card.unwrap().last4.as_deref(), Some("1881"));
        assert_eq!(customer.deleted, None);
    }

    #[test]
    fn test_deserialize_mismatch_names_operation() {
        let resp = response(json!({"amount": 1}));
        let err = resp.deserialize::<Charge>().unwrap_err();
        assert!(matches!(err, DevPayError::InvalidInput(ref msg) if msg.contains("execute_charge")));
    }
}
