use serde_json::Value;

use common::{Error, Result};

/// Longest body excerpt carried in a transport error.
const MAX_BODY_EXCERPT: usize = 200;

/// Turn an HTTP status and raw body into JSON or a classified error.
///
/// An error object (negative `code` or an `error` field) wins over the
/// status code, so a 400 carrying `{"code":-1100,"msg":...}` surfaces as an
/// exchange error rather than a transport error.
pub fn classify(status: u16, body: &str) -> Result<Value> {
    let success = (200..300).contains(&status);

    if body.trim().is_empty() {
        return if success {
            Ok(Value::Null)
        } else {
            Err(Error::Transport(format!("HTTP {status} with empty body")))
        };
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            if let Some(err) = exchange_error(&value) {
                return Err(err);
            }
            if !success {
                return Err(Error::Transport(format!("HTTP {status}: {}", excerpt(body))));
            }
            Ok(value)
        }
        Err(e) if success => Err(Error::Shape(format!("invalid JSON body: {e}"))),
        Err(_) => Err(Error::Transport(format!("HTTP {status}: {}", excerpt(body)))),
    }
}

/// Extract an exchange-reported error from a JSON payload, if any.
pub fn exchange_error(value: &Value) -> Option<Error> {
    let obj = value.as_object()?;
    let code = obj.get("code").and_then(Value::as_i64);
    let msg = obj.get("msg").and_then(Value::as_str);

    if let Some(code) = code.filter(|c| *c < 0) {
        return Some(Error::Exchange {
            code: Some(code),
            msg: msg.unwrap_or("unknown exchange error").to_string(),
        });
    }

    match obj.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(Error::Exchange {
            code,
            msg: s.clone(),
        }),
        Some(other) => Some(Error::Exchange {
            code,
            msg: msg.map(str::to_string).unwrap_or_else(|| other.to_string()),
        }),
    }
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
