//! Hierarchy reconstruction
//!
//! Exports are flat: each file is one record, and parent/child structure
//! exists only as foreign-key fields inside the payloads (item →
//! `holdingsRecordId`, holdings → `instanceId`). This module threads the
//! flat mapping back into the instance → holdings → item ownership tree
//! and verifies that every loaded record landed in it.

use crate::error::{RestoreError, Result};
use crate::records::{classify, RawRecord, RecordKind};
use std::collections::{BTreeMap, BTreeSet};

/// Top-level bibliographic record with its holdings
#[derive(Debug, Clone)]
pub struct InstanceNode {
    pub id: String,
    pub record: RawRecord,
    pub holdings: Vec<HoldingsNode>,
}

/// Holding location record with its items
#[derive(Debug, Clone)]
pub struct HoldingsNode {
    pub id: String,
    pub record: RawRecord,
    pub items: Vec<ItemNode>,
}

/// Individual copy/unit record
#[derive(Debug, Clone)]
pub struct ItemNode {
    pub id: String,
    pub record: RawRecord,
}

/// Build the three-level ownership tree from the flat record mapping
///
/// Three passes: items are gathered under their `holdingsRecordId`, holdings
/// (with their gathered items) under their `instanceId`, and finally every
/// instance becomes a root node, with an empty holdings list if nothing
/// referenced it. Sibling order follows the map's lexicographic id order.
///
/// After assembly the set of ids reachable from the roots must equal the
/// input id set. A dangling foreign key, a record missing its foreign-key
/// field, or an unclassifiable record all leave something unplaced, and the
/// whole run fails with `IncompleteHierarchy` before any remote call is
/// made. Partially restoring a corrupt export would be worse than failing.
pub fn build_hierarchy(records: &BTreeMap<String, RawRecord>) -> Result<Vec<InstanceNode>> {
    // Pass 1: group items under the holdings record they reference.
    let mut items_by_holdings: BTreeMap<String, Vec<ItemNode>> = BTreeMap::new();
    for (id, record) in records {
        if classify(record) != RecordKind::Item {
            continue;
        }
        match record.field_str("holdingsRecordId") {
            Some(parent) => items_by_holdings
                .entry(parent.to_string())
                .or_default()
                .push(ItemNode {
                    id: id.clone(),
                    record: record.clone(),
                }),
            None => tracing::warn!(id = %id, "item record has no holdingsRecordId"),
        }
    }

    // Pass 2: group holdings (and their items) under their instance.
    let mut holdings_by_instance: BTreeMap<String, Vec<HoldingsNode>> = BTreeMap::new();
    for (id, record) in records {
        if classify(record) != RecordKind::Holdings {
            continue;
        }
        let items = items_by_holdings.remove(id).unwrap_or_default();
        match record.field_str("instanceId") {
            Some(parent) => holdings_by_instance
                .entry(parent.to_string())
                .or_default()
                .push(HoldingsNode {
                    id: id.clone(),
                    record: record.clone(),
                    items,
                }),
            None => tracing::warn!(id = %id, "holdings record has no instanceId"),
        }
    }

    // Pass 3: every instance becomes a root, childless ones included.
    let mut roots = Vec::new();
    for (id, record) in records {
        match classify(record) {
            RecordKind::Instance => {
                let holdings = holdings_by_instance.remove(id).unwrap_or_default();
                roots.push(InstanceNode {
                    id: id.clone(),
                    record: record.clone(),
                    holdings,
                });
            }
            RecordKind::Unknown => {
                tracing::warn!(id = %id, "unrecognized record type");
            }
            _ => {}
        }
    }

    verify_complete(records, &roots)?;
    Ok(roots)
}

/// Fail unless every loaded id is reachable from the finished tree
fn verify_complete(
    records: &BTreeMap<String, RawRecord>,
    roots: &[InstanceNode],
) -> Result<()> {
    let mut reachable = BTreeSet::new();
    for instance in roots {
        reachable.insert(instance.id.as_str());
        for holdings in &instance.holdings {
            reachable.insert(holdings.id.as_str());
            for item in &holdings.items {
                reachable.insert(item.id.as_str());
            }
        }
    }

    let missing: Vec<String> = records
        .keys()
        .filter(|id| !reachable.contains(id.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RestoreError::IncompleteHierarchy { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record_map(bodies: Vec<Value>) -> BTreeMap<String, RawRecord> {
        bodies
            .into_iter()
            .map(|body| {
                let id = body["id"].as_str().unwrap().to_string();
                (id.clone(), RawRecord { id, body })
            })
            .collect()
    }

    fn instance(id: &str) -> Value {
        json!({"id": id, "instanceTypeId": "text"})
    }

    fn holdings(id: &str, instance_id: &str) -> Value {
        // "holdingsItems" mirrors the marker field present in real exports
        json!({"id": id, "holdingsItems": [], "instanceId": instance_id})
    }

    fn item(id: &str, holdings_id: &str) -> Value {
        json!({"id": id, "barcode": "350470001", "holdingsRecordId": holdings_id})
    }

    #[test]
    fn test_chained_foreign_keys_build_expected_tree() {
        let records = record_map(vec![
            item("t1", "h1"),
            holdings("h1", "i1"),
            instance("i1"),
        ]);

        let roots = build_hierarchy(&records).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, "i1");
        assert_eq!(roots[0].holdings.len(), 1);
        assert_eq!(roots[0].holdings[0].id, "h1");
        assert_eq!(roots[0].holdings[0].items.len(), 1);
        assert_eq!(roots[0].holdings[0].items[0].id, "t1");
    }

    #[test]
    fn test_instance_without_holdings_gets_empty_list() {
        let records = record_map(vec![instance("i1")]);

        let roots = build_hierarchy(&records).unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].holdings.is_empty());
    }

    #[test]
    fn test_every_loaded_id_appears_in_tree() {
        let records = record_map(vec![
            instance("i1"),
            instance("i2"),
            holdings("h1", "i1"),
            holdings("h2", "i1"),
            holdings("h3", "i2"),
            item("t1", "h1"),
            item("t2", "h1"),
            item("t3", "h3"),
        ]);

        let roots = build_hierarchy(&records).unwrap();
        let mut seen = BTreeSet::new();
        for inst in &roots {
            seen.insert(inst.id.clone());
            for h in &inst.holdings {
                seen.insert(h.id.clone());
                for t in &h.items {
                    seen.insert(t.id.clone());
                }
            }
        }
        let expected: BTreeSet<String> = records.keys().cloned().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_item_with_dangling_holdings_reference_fails() {
        let records = record_map(vec![instance("i1"), item("t1", "h-missing")]);

        let err = build_hierarchy(&records).unwrap_err();
        match err {
            RestoreError::IncompleteHierarchy { missing } => {
                assert_eq!(missing, vec!["t1".to_string()]);
            }
            other => panic!("Expected IncompleteHierarchy, got {:?}", other),
        }
    }

    #[test]
    fn test_holdings_with_dangling_instance_reference_fails() {
        let records = record_map(vec![
            instance("i1"),
            holdings("h1", "i-missing"),
            item("t1", "h1"),
        ]);

        let err = build_hierarchy(&records).unwrap_err();
        match err {
            RestoreError::IncompleteHierarchy { missing } => {
                // The orphaned holdings takes its items down with it.
                assert_eq!(missing, vec!["h1".to_string(), "t1".to_string()]);
            }
            other => panic!("Expected IncompleteHierarchy, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_record_fails_completeness_check() {
        let records = record_map(vec![
            instance("i1"),
            json!({"id": "x1", "note": "no discriminating field"}),
        ]);

        let err = build_hierarchy(&records).unwrap_err();
        match err {
            RestoreError::IncompleteHierarchy { missing } => {
                assert_eq!(missing, vec!["x1".to_string()]);
            }
            other => panic!("Expected IncompleteHierarchy, got {:?}", other),
        }
    }

    #[test]
    fn test_item_missing_foreign_key_field_fails() {
        let records = record_map(vec![
            instance("i1"),
            json!({"id": "t1", "barcode": "350470001"}),
        ]);

        let err = build_hierarchy(&records).unwrap_err();
        assert!(matches!(err, RestoreError::IncompleteHierarchy { .. }));
    }

    #[test]
    fn test_sibling_order_is_lexicographic() {
        let records = record_map(vec![
            instance("i1"),
            holdings("h2", "i1"),
            holdings("h1", "i1"),
            item("t2", "h1"),
            item("t1", "h1"),
        ]);

        let roots = build_hierarchy(&records).unwrap();
        let holding_ids: Vec<&str> = roots[0].holdings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(holding_ids, vec!["h1", "h2"]);
        let item_ids: Vec<&str> = roots[0].holdings[0]
            .items
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(item_ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_empty_input_builds_empty_tree() {
        let records = BTreeMap::new();
        let roots = build_hierarchy(&records).unwrap();
        assert!(roots.is_empty());
    }
}
