//! In-memory collections and bookmark paging.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub type Record = Map<String, Value>;

/// Records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| record_id(r) == Some(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| record_id(r) == Some(id))
    }

    pub fn insert(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let index = self.records.iter().position(|r| record_id(r) == Some(id))?;
        Some(self.records.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    pub cards: Collection,
    pub decks: Collection,
    pub templates: Collection,
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub fn timestamp() -> Value {
    json!({ "date": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Apply a partial update: `null` removes a key, anything else replaces it.
pub fn merge(record: &mut Record, patch: Record) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        if value.is_null() {
            record.remove(&key);
        } else {
            record.insert(key, value);
        }
    }
    record.insert("updated-at".to_string(), timestamp());
}

/// Opaque page cursor. Encodes the offset of the next record.
pub fn encode_bookmark(offset: usize) -> String {
    URL_SAFE_NO_PAD.encode(format!("g1:{offset}"))
}

pub fn decode_bookmark(bookmark: &str) -> Option<usize> {
    let bytes = URL_SAFE_NO_PAD.decode(bookmark).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix("g1:")?.parse().ok()
}

/// One CouchDB-style page of `records`.
///
/// Every non-empty page carries a bookmark, including the last one, so the
/// page after the last is empty and echoes the bookmark it was asked for.
pub fn page(records: Vec<Record>, bookmark: Option<&str>, limit: usize) -> Result<Value, String> {
    let start = match bookmark {
        Some(b) => decode_bookmark(b).ok_or_else(|| format!("Invalid bookmark: {b}"))?,
        None => 0,
    };
    let docs: Vec<Value> = records
        .into_iter()
        .skip(start)
        .take(limit)
        .map(Value::Object)
        .collect();

    let count = docs.len();
    let mut body = json!({ "docs": docs });
    if count > 0 {
        body["bookmark"] = json!(encode_bookmark(start + count));
    } else if let Some(bookmark) = bookmark {
        body["bookmark"] = json!(bookmark);
    }
    Ok(body)
}

/// True when `card` should be reviewed on or before `date` (ISO 8601).
pub fn is_due(card: &Record, date: &str) -> bool {
    if card.get("archived?").and_then(Value::as_bool) == Some(true)
        || card.get("trashed?").is_some_and(|v| !v.is_null())
    {
        return false;
    }
    let last_due = card
        .get("reviews")
        .and_then(Value::as_array)
        .and_then(|reviews| reviews.last())
        .and_then(|review| review.pointer("/due/date"))
        .and_then(Value::as_str);
    match last_due {
        Some(due) => due <= date,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(id));
        record
    }

    #[test]
    fn bookmarks_roundtrip_offsets() {
        assert_eq!(decode_bookmark(&encode_bookmark(42)), Some(42));
        assert_eq!(decode_bookmark("not-a-bookmark"), None);
    }

    #[test]
    fn last_page_has_bookmark_and_next_is_empty() {
        let records: Vec<_> = ["a", "b", "c"].into_iter().map(record).collect();

        let first = page(records.clone(), None, 2).unwrap();
        assert_eq!(first["docs"].as_array().unwrap().len(), 2);
        let b1 = first["bookmark"].as_str().unwrap().to_string();

        let second = page(records.clone(), Some(&b1), 2).unwrap();
        assert_eq!(second["docs"].as_array().unwrap().len(), 1);
        let b2 = second["bookmark"].as_str().unwrap().to_string();

        let third = page(records, Some(&b2), 2).unwrap();
        assert!(third["docs"].as_array().unwrap().is_empty());
        assert_eq!(third["bookmark"], json!(b2));
    }

    #[test]
    fn merge_removes_nulls_and_keeps_id() {
        let mut card = record("c1");
        card.insert("template-id".to_string(), json!("t1"));
        let patch = json!({"id": "other", "template-id": null, "content": "x"});
        merge(&mut card, patch.as_object().unwrap().clone());
        assert_eq!(card["id"], json!("c1"));
        assert!(!card.contains_key("template-id"));
        assert_eq!(card["content"], json!("x"));
    }

    #[test]
    fn unreviewed_cards_are_due() {
        let mut card = record("c1");
        assert!(is_due(&card, "2026-01-01T00:00:00.000Z"));

        card.insert(
            "reviews".to_string(),
            json!([{"date": {"date": "2026-01-01"}, "due": {"date": "2026-02-01T00:00:00.000Z"}, "remembered?": true}]),
        );
        assert!(!is_due(&card, "2026-01-15T00:00:00.000Z"));
        assert!(is_due(&card, "2026-02-01T00:00:00.000Z"));

        card.insert("archived?".to_string(), json!(true));
        assert!(!is_due(&card, "2027-01-01T00:00:00.000Z"));
    }
}
