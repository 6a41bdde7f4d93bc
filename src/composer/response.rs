//! Normalization of list-endpoint payloads.
//!
//! The endpoint answers either with a bare array or with an envelope whose
//! records sit under `results` or `data`. The shape is resolved once into
//! [`ListPayload`]; everything downstream sees a [`NormalizedPage`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::composer::pagination::{PageRequest, PaginationState, clamp_page, total_pages_for};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("expected a JSON array or object, got {0}")]
    UnexpectedShape(&'static str),

    #[error("envelope carries neither `results` nor `data`")]
    MissingRecords,

    #[error("envelope metadata is invalid: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("record {index} does not match the expected shape: {source}")]
    Record {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Pagination envelope; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub current_page: Option<u32>,
    /// `None` when the key is absent, `Some(Value::Null)` when sent as null
    #[serde(default, deserialize_with = "present")]
    pub next: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub previous: Option<Value>,
    #[serde(default)]
    pub results: Option<Vec<Value>>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Which key held the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKey {
    Results,
    Data,
}

/// A payload after its shape has been recognized.
#[derive(Debug)]
pub enum ListPayload {
    Bare(Vec<Value>),
    Envelope {
        key: RecordKey,
        records: Vec<Value>,
        meta: Envelope,
    },
}

impl ListPayload {
    pub fn from_value(raw: Value) -> Result<Self, PayloadError> {
        match raw {
            Value::Array(records) => Ok(ListPayload::Bare(records)),
            Value::Object(_) => {
                let mut meta: Envelope = serde_json::from_value(raw).map_err(PayloadError::Envelope)?;
                let (key, records) = match (meta.results.take(), meta.data.take()) {
                    (Some(records), _) => (RecordKey::Results, records),
                    (None, Some(records)) => (RecordKey::Data, records),
                    (None, None) => return Err(PayloadError::MissingRecords),
                };
                Ok(ListPayload::Envelope { key, records, meta })
            }
            Value::Null => Err(PayloadError::UnexpectedShape("null")),
            Value::Bool(_) => Err(PayloadError::UnexpectedShape("a boolean")),
            Value::Number(_) => Err(PayloadError::UnexpectedShape("a number")),
            Value::String(_) => Err(PayloadError::UnexpectedShape("a string")),
        }
    }
}

/// Shape tag kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum PayloadShape {
    Bare,
    Envelope { key: RecordKey },
}

/// Records plus pagination in one uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPage<R> {
    pub records: Vec<R>,
    pub pagination: PaginationState,
    pub shape: PayloadShape,
}

/// Turn any accepted payload into records and pagination for `requested`.
///
/// Metadata the endpoint did not send is derived: `count` from the record
/// count, `total_pages` as `max(1, ceil(count / page_size))`, `current_page`
/// from the requested page. `current_page` is always clamped.
pub fn normalize_response<R: DeserializeOwned>(
    raw: Value,
    requested: &PageRequest,
) -> Result<NormalizedPage<R>, PayloadError> {
    match ListPayload::from_value(raw)? {
        ListPayload::Bare(records) => {
            let records = decode_records(records)?;
            let pagination =
                PaginationState::derive(records.len() as u64, requested.page_size, requested.page);
            Ok(NormalizedPage {
                records,
                pagination,
                shape: PayloadShape::Bare,
            })
        }
        ListPayload::Envelope { key, records, meta } => {
            let records: Vec<R> = decode_records(records)?;
            let pagination = envelope_pagination(&meta, records.len(), requested);
            Ok(NormalizedPage {
                records,
                pagination,
                shape: PayloadShape::Envelope { key },
            })
        }
    }
}

fn decode_records<R: DeserializeOwned>(records: Vec<Value>) -> Result<Vec<R>, PayloadError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|source| PayloadError::Record { index, source })
        })
        .collect()
}

fn envelope_pagination(meta: &Envelope, record_count: usize, requested: &PageRequest) -> PaginationState {
    let count = meta.count.unwrap_or(record_count as u64);

    let total_pages = if count == 0 {
        1
    } else {
        meta.total_pages
            .filter(|pages| *pages > 0)
            .unwrap_or_else(|| total_pages_for(count, requested.page_size))
    };
    let current_page = clamp_page(meta.current_page.unwrap_or(requested.page), total_pages);

    let next = link(meta.next.as_ref());
    let previous = link(meta.previous.as_ref());

    let has_next = match &meta.next {
        Some(_) => next.is_some() && count > 0,
        None => current_page < total_pages,
    };
    let has_previous = match &meta.previous {
        Some(_) => previous.is_some() && count > 0,
        None => current_page > 1,
    };

    PaginationState {
        count,
        total_pages,
        current_page,
        page_size: requested.page_size,
        has_next,
        has_previous,
        next,
        previous,
    }
}

/// Non-empty link text; numbers are accepted for backends that send page numbers.
fn link(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRecord;
    use proptest::prelude::*;
    use serde_json::json;

    fn users(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({ "id": i as i64 + 1, "name": format!("user-{i}") }))
                .collect(),
        )
    }

    #[test]
    fn test_bare_array_of_five() {
        let page: NormalizedPage<UserRecord> =
            normalize_response(users(5), &PageRequest::new(1, 10)).unwrap();

        assert_eq!(page.records.len(), 5);
        assert_eq!(page.shape, PayloadShape::Bare);
        assert_eq!(page.pagination.count, 5);
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.current_page, 1);
        assert!(!page.pagination.has_next);
        assert!(!page.pagination.has_previous);
        assert!(page.pagination.next.is_none());
        assert!(page.pagination.previous.is_none());
    }

    #[test]
    fn test_results_envelope_with_full_metadata() {
        let raw = json!({
            "count": 42,
            "total_pages": 5,
            "current_page": 2,
            "next": "https://admin.example.org/api/users/?page=3",
            "previous": "https://admin.example.org/api/users/?page=1",
            "results": users(10),
        });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(2, 10)).unwrap();

        assert_eq!(page.shape, PayloadShape::Envelope { key: RecordKey::Results });
        assert_eq!(page.pagination.count, 42);
        assert_eq!(page.pagination.total_pages, 5);
        assert_eq!(page.pagination.current_page, 2);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_previous);
        assert!(page.pagination.shows_controls());
    }

    #[test]
    fn test_data_envelope_without_metadata_derives_pages() {
        let raw = json!({ "data": users(3) });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(4, 2)).unwrap();

        assert_eq!(page.shape, PayloadShape::Envelope { key: RecordKey::Data });
        assert_eq!(page.pagination.count, 3);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.current_page, 2);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_previous);
    }

    #[test]
    fn test_empty_envelope_suppresses_controls() {
        let raw = json!({ "count": 0, "results": [] });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(3, 10)).unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.current_page, 1);
        assert!(!page.pagination.has_next);
        assert!(!page.pagination.has_previous);
        assert!(!page.pagination.shows_controls());
    }

    #[test]
    fn test_zero_total_pages_from_server_is_corrected() {
        let raw = json!({ "count": 0, "total_pages": 0, "current_page": 0, "results": [] });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.pagination.total_pages, 1);
        assert_eq!(page.pagination.current_page, 1);
    }

    #[test]
    fn test_explicit_null_links_win_over_derivation() {
        let raw = json!({
            "count": 30,
            "current_page": 1,
            "next": null,
            "previous": null,
            "results": users(10),
        });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.pagination.total_pages, 3);
        assert!(!page.pagination.has_next);
    }

    #[test]
    fn test_results_preferred_over_data() {
        let raw = json!({ "results": users(1), "data": users(4) });
        let page: NormalizedPage<UserRecord> =
            normalize_response(raw, &PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn test_malformed_payloads() {
        let requested = PageRequest::new(1, 10);
        let cases = [
            json!("nope"),
            json!(12),
            json!(null),
            json!({ "count": 3 }),
            json!({ "count": "three", "results": [] }),
            json!([{ "name": "missing id" }]),
        ];
        for raw in cases {
            let result: Result<NormalizedPage<UserRecord>, _> =
                normalize_response(raw.clone(), &requested);
            assert!(result.is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_record_error_reports_index() {
        let raw = json!([{ "id": 1 }, { "id": "x" }]);
        let result: Result<NormalizedPage<UserRecord>, _> =
            normalize_response(raw, &PageRequest::new(1, 10));
        assert!(matches!(result, Err(PayloadError::Record { index: 1, .. })));
    }

    proptest! {
        #[test]
        fn property_missing_metadata_is_derived_and_clamped(
            n in 0usize..60,
            page_size in 1u32..=25,
            page in 1u32..20,
            wrapped in any::<bool>(),
        ) {
            let raw = if wrapped { json!({ "results": users(n) }) } else { users(n) };
            let page_data: NormalizedPage<Value> =
                normalize_response(raw, &PageRequest::new(page, page_size)).unwrap();
            let p = page_data.pagination;

            let expected_pages = std::cmp::max(1, (n as u64).div_ceil(u64::from(page_size)) as u32);
            prop_assert_eq!(p.count, n as u64);
            prop_assert_eq!(p.total_pages, expected_pages);
            prop_assert!(p.current_page >= 1 && p.current_page <= p.total_pages);
            prop_assert_eq!(p.current_page, page.min(expected_pages));
        }
    }
}
