use crate::errors::ListError;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Response envelope used by every endpoint: `{ "payload": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope<P> {
    payload: P,
}

/// One page of a list endpoint.
///
/// `count` is the total number of records matching the query, not the page length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub count: u64,
}

impl<T> ListPage<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
        }
    }
}

impl<T> Default for ListPage<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Decode and validate a `{ payload: { items, count } }` body.
///
/// # Errors
/// Returns [`ListError::MalformedResponse`] if the body is not that shape, or if
/// `count` is smaller than the number of items returned.
pub fn decode_list<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<ListPage<T>, ListError> {
    let envelope: Envelope<ListPage<T>> =
        serde_json::from_slice(body).map_err(|e| ListError::malformed(endpoint, e.to_string()))?;
    let page = envelope.payload;
    if (page.items.len() as u64) > page.count {
        return Err(ListError::malformed(
            endpoint,
            format!(
                "count {} is smaller than the {} items returned",
                page.count,
                page.items.len()
            ),
        ));
    }
    Ok(page)
}

/// Decode a single-entity `{ payload: T }` body.
///
/// # Errors
/// Returns [`ListError::MalformedResponse`] if the body is not that shape.
pub fn decode_one<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, ListError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| ListError::malformed(endpoint, e.to_string()))?;
    Ok(envelope.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Group {
        name: String,
    }

    #[test]
    fn test_decode_list() {
        let body = json!({"payload": {"items": [{"name": "HR"}, {"name": "IT"}], "count": 12}});
        let page: ListPage<Group> = decode_list("/groups", body.to_string().as_bytes()).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.count, 12);
    }

    #[test]
    fn test_decode_list_missing_count() {
        let body = json!({"payload": {"items": []}});
        let err = decode_list::<Group>("/groups", body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ListError::MalformedResponse { .. }));
    }

    #[test]
    fn test_decode_list_without_envelope() {
        let body = json!({"items": [], "count": 0});
        assert!(decode_list::<Group>("/groups", body.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_decode_list_negative_count() {
        let body = json!({"payload": {"items": [], "count": -1}});
        assert!(decode_list::<Group>("/groups", body.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_decode_list_count_below_items() {
        let body = json!({"payload": {"items": [{"name": "HR"}, {"name": "IT"}], "count": 1}});
        let err = decode_list::<Group>("/groups", body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, ListError::MalformedResponse { .. }));
    }

    #[test]
    fn test_decode_list_wrong_item_shape() {
        let body = json!({"payload": {"items": [{"title": "HR"}], "count": 1}});
        assert!(decode_list::<Group>("/groups", body.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_decode_one() {
        let body = json!({"payload": {"name": "HR"}});
        let group: Group = decode_one("/groups/1", body.to_string().as_bytes()).unwrap();
        assert_eq!(group.name, "HR");
    }

    #[test]
    fn test_decode_not_json() {
        assert!(decode_one::<Group>("/groups/1", b"<html>").is_err());
    }
}
