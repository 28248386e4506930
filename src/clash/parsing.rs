//! Tolerant decoding of Clash controller payloads.
//!
//! # Responsibilities
//! - Decode group-info responses into `GroupInfo`
//! - Decode batch-delay responses into a `ProbeReport`
//!
//! # Design Decisions
//! - Clash forks disagree on payload shape, so group parsing is an ordered
//!   variant chain with explicit fallbacks, each pinned by a literal-payload
//!   test below
//! - Unknown fields are ignored; missing optional fields degrade gracefully
//! - A payload that matches no variant is `Malformed`, never a panic

use serde_json::Value;

use crate::clash::types::{ClashError, ClashResult, GroupInfo, ProbeReport};

/// Decode a group-info payload.
///
/// Variants, tried in order:
/// 1. Selector object: `{"now": "HK-01", "all": ["HK-01", "US-02"], ...}`
/// 2. Proxies array: `{"now": "HK-01", "proxies": [{"name": "HK-01"}, ...]}`
/// 3. Flat string map: `{"now": "HK-01", "HK-01": "...", "US-02": "..."}`
pub fn parse_group_info(payload: &Value) -> ClashResult<GroupInfo> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ClashError::Malformed("group info is not a JSON object".into()))?;

    let now = obj
        .get("now")
        .and_then(Value::as_str)
        .ok_or_else(|| ClashError::Malformed("group info has no 'now' selection".into()))?
        .to_string();

    // Variant 1: canonical selector shape.
    if let Some(all) = obj.get("all").and_then(Value::as_array) {
        let members = all
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !members.is_empty() {
            return Ok(GroupInfo { now, all: members });
        }
    }

    // Variant 2: array of member objects under "proxies".
    if let Some(proxies) = obj.get("proxies").and_then(Value::as_array) {
        let members = proxies
            .iter()
            .filter_map(|p| p.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !members.is_empty() {
            return Ok(GroupInfo { now, all: members });
        }
    }

    // Variant 3: flat string-to-string map; keys other than the selection
    // metadata are member names.
    let members = obj
        .iter()
        .filter(|(k, v)| v.is_string() && *k != "now" && *k != "type" && *k != "name")
        .map(|(k, _)| k.clone())
        .collect::<Vec<_>>();
    if !members.is_empty() {
        return Ok(GroupInfo { now, all: members });
    }

    Err(ClashError::Malformed(
        "group info lists no members in any known shape".into(),
    ))
}

/// Decode a batch-delay payload into member → latency ms.
///
/// The controller returns a flat object of member names to numbers. Entries
/// that are not numeric (some forks report an error object per member) are
/// skipped, which makes the member unreachable from the caller's view.
pub fn parse_delay_report(payload: &Value) -> ClashResult<ProbeReport> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ClashError::Malformed("delay report is not a JSON object".into()))?;

    let mut report = ProbeReport::new();
    for (name, value) in obj {
        if let Some(delay) = value.as_u64() {
            report.insert(name.clone(), delay);
        } else if let Some(delay) = value.as_f64() {
            if delay >= 0.0 {
                report.insert(name.clone(), delay as u64);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_shape() {
        let payload = json!({
            "name": "Proxy",
            "type": "Selector",
            "now": "HK-01",
            "all": ["HK-01", "US-02", "JP-03"],
            "history": []
        });
        let info = parse_group_info(&payload).unwrap();
        assert_eq!(info.now, "HK-01");
        assert_eq!(info.all, vec!["HK-01", "US-02", "JP-03"]);
    }

    #[test]
    fn test_proxies_array_shape() {
        let payload = json!({
            "now": "US-02",
            "proxies": [
                {"name": "HK-01", "type": "Shadowsocks"},
                {"name": "US-02", "type": "Vmess"}
            ]
        });
        let info = parse_group_info(&payload).unwrap();
        assert_eq!(info.now, "US-02");
        assert_eq!(info.all, vec!["HK-01", "US-02"]);
    }

    #[test]
    fn test_flat_map_shape() {
        let payload = json!({
            "now": "HK-01",
            "type": "Selector",
            "HK-01": "alive",
            "US-02": "alive"
        });
        let info = parse_group_info(&payload).unwrap();
        assert_eq!(info.now, "HK-01");
        assert_eq!(info.all.len(), 2);
        assert!(info.all.contains(&"HK-01".to_string()));
    }

    #[test]
    fn test_missing_now_is_malformed() {
        let payload = json!({"all": ["HK-01"]});
        assert!(matches!(
            parse_group_info(&payload),
            Err(ClashError::Malformed(_))
        ));
    }

    #[test]
    fn test_no_members_is_malformed() {
        let payload = json!({"now": "HK-01", "all": []});
        assert!(matches!(
            parse_group_info(&payload),
            Err(ClashError::Malformed(_))
        ));
    }

    #[test]
    fn test_delay_report_numbers() {
        let payload = json!({"HK-01": 120, "US-02": 433.0, "JP-03": "timeout"});
        let report = parse_delay_report(&payload).unwrap();
        assert_eq!(report.get("HK-01"), Some(&120));
        assert_eq!(report.get("US-02"), Some(&433));
        // Non-numeric entry drops out → unreachable from the caller's view.
        assert!(!report.contains_key("JP-03"));
    }

    #[test]
    fn test_delay_report_empty() {
        let report = parse_delay_report(&json!({})).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_delay_report_non_object_is_malformed() {
        assert!(matches!(
            parse_delay_report(&json!([1, 2])),
            Err(ClashError::Malformed(_))
        ));
    }
}
