//! Data Transfer Objects for the wallet endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use exchange_rates::CurrencyCode;

use crate::domain::CustomerId;
use crate::error::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Wallet DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Body of `POST /api/financials/wallet/{add,withdraw}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMutationRequest {
    pub customer_id: CustomerId,
    /// Amount in `currency`
    pub amount: f64,
    pub currency: CurrencyCode,
}

// ─────────────────────────────────────────────────────────────────────────────
// Balance payload schema
// ─────────────────────────────────────────────────────────────────────────────

/// Locations the balance endpoint is known to put the amount, in priority
/// order. Anything else is rejected.
pub const BALANCE_FIELD_POINTERS: [&str; 6] = [
    "/data/data",
    "/data/targetValue",
    "/data/balance",
    "/data",
    "/targetValue",
    "/balance",
];

/// Extracts the wallet balance from a balance response body.
///
/// The first pointer in [`BALANCE_FIELD_POINTERS`] that holds a scalar
/// decides the result. Numbers and numeric strings are accepted; the value
/// must be finite and non-negative.
pub fn parse_balance_payload(body: &Value) -> Result<f64, ApiError> {
    let (pointer, raw) = BALANCE_FIELD_POINTERS
        .iter()
        .find_map(|pointer| {
            body.pointer(pointer)
                .filter(|v| v.is_number() || v.is_string())
                .map(|v| (*pointer, v))
        })
        .ok_or_else(|| ApiError::MalformedBalance(format!("no balance field in {}", body)))?;

    let amount = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ApiError::MalformedBalance(format!("{} is not numeric: {}", pointer, raw)))?;

    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::MalformedBalance(format!(
            "{} is out of range: {}",
            pointer, amount
        )));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutation_request_body() {
        let req = WalletMutationRequest {
            customer_id: CustomerId::new("99").unwrap(),
            amount: 50.0,
            currency: CurrencyCode::KWD,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "customerId": "99", "amount": 50.0, "currency": "KWD" })
        );
    }

    #[test]
    fn test_balance_shapes() {
        let cases = [
            (json!({ "data": { "data": 1.5 } }), 1.5),
            (json!({ "data": { "targetValue": 2 } }), 2.0),
            (json!({ "data": { "balance": "3.25" } }), 3.25),
            (json!({ "data": 4 }), 4.0),
            (json!({ "targetValue": 5.5 }), 5.5),
            (json!({ "balance": 6 }), 6.0),
        ];
        for (body, expected) in cases {
            assert_eq!(parse_balance_payload(&body).unwrap(), expected, "{body}");
        }
    }

    #[test]
    fn test_nested_data_takes_priority() {
        let body = json!({ "data": { "data": 10, "balance": 20 }, "balance": 30 });
        assert_eq!(parse_balance_payload(&body).unwrap(), 10.0);
    }

    #[test]
    fn test_missing_balance_is_malformed() {
        for body in [json!({}), json!({ "data": {} }), json!({ "data": null }), json!([1, 2])] {
            assert!(
                matches!(parse_balance_payload(&body), Err(ApiError::MalformedBalance(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_non_numeric_and_non_finite_are_malformed() {
        for body in [
            json!({ "balance": "abc" }),
            json!({ "balance": "NaN" }),
            json!({ "balance": "inf" }),
        ] {
            assert!(
                matches!(parse_balance_payload(&body), Err(ApiError::MalformedBalance(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_negative_balance_is_malformed() {
        assert!(matches!(
            parse_balance_payload(&json!({ "data": { "balance": -0.5 } })),
            Err(ApiError::MalformedBalance(_))
        ));
        assert!(matches!(
            parse_balance_payload(&json!({ "balance": "-12" })),
            Err(ApiError::MalformedBalance(_))
        ));
        assert_eq!(parse_balance_payload(&json!({ "balance": 0 })).unwrap(), 0.0);
    }
}
