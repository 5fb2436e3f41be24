// Port Schedule Monitor - Schedule Transformer
// Raw schedule API records → normalized ScheduleEntry

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Navigation - kind of vessel movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Arrival,
    Departure,
    Shift,
}

impl Navigation {
    /// Map the raw `nav` value; anything unrecognised is a shift
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "입항" => Navigation::Arrival,
            "출항" => Navigation::Departure,
            _ => Navigation::Shift,
        }
    }

    /// Badge text as the port uses it
    pub fn label(&self) -> &'static str {
        match self {
            Navigation::Arrival => "입항",
            Navigation::Departure => "출항",
            Navigation::Shift => "이동",
        }
    }
}

/// ScheduleEntry - one vessel movement event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    // Identity
    pub id: String,                // "{date}-{no}" from the raw fields
    pub no: i64,

    // When
    pub date: String,
    pub time: String,

    // Vessel
    pub ship_name: String,
    pub call_sign: String,
    pub imo: String,
    pub grt: String,
    pub loa: String,
    pub draft: String,

    // Movement
    pub navigation: Navigation,
    pub from: String,              // berth code
    pub to: String,                // berth code
    pub side: String,

    // Operations
    pub tugs: String,
    pub agent: String,
    pub pilot: String,
    pub line: String,              // shipping line, free text
    pub quarantine: bool,

    // Remarks
    pub remarks: String,
    pub team_note: Option<String>,
    pub agent_note: Option<String>,
    pub note: Option<String>,
    pub is_special: bool,
}

// ============================================================================
// TRANSFORMER
// ============================================================================

/// Transform a whole batch; output keeps input order and length.
pub fn transform_records(records: &[Value]) -> Vec<ScheduleEntry> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| transform_record(index, record))
        .collect()
}

/// Transform one raw record. Never fails: anything it can't read becomes
/// an empty string or a default.
pub fn transform_record(index: usize, record: &Value) -> ScheduleEntry {
    let date = field(record, "date");
    let raw_no = field(record, "no");

    let (grt, loa) = split_tonnage(&field(record, "grt"));
    let (call_sign, imo) = split_call_sign(&field(record, "cs"));

    let team_note = non_empty(field(record, "rmkTeam"));
    let agent_note = non_empty(field(record, "rmkAgent"));
    let remarks = team_note
        .clone()
        .or_else(|| agent_note.clone())
        .unwrap_or_default();
    let is_special = team_note.as_deref().is_some_and(|note| note.contains('@'));

    ScheduleEntry {
        id: format!("{}-{}", date, raw_no),
        no: sequence_number(&raw_no, index),
        date,
        time: field(record, "time"),
        ship_name: field(record, "name"),
        call_sign,
        imo,
        grt,
        loa,
        draft: field(record, "dt"),
        navigation: Navigation::from_raw(&field(record, "nav")),
        from: field(record, "fm"),
        to: field(record, "to"),
        side: field(record, "side"),
        tugs: field(record, "tugs"),
        agent: field(record, "agent"),
        pilot: field(record, "pt"),
        line: field(record, "line"),
        quarantine: !field(record, "quarantine").is_empty(),
        remarks,
        team_note,
        agent_note,
        note: non_empty(field(record, "rmk")),
        is_special,
    }
}

/// Read a field as text. Numbers and booleans are rendered, anything
/// else (missing, null, arrays, objects) reads as empty.
fn field(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Leading integer of the raw sequence field; positional fallback when
/// there is none or it is zero.
fn sequence_number(raw: &str, index: usize) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();

    match leading.parse::<i64>() {
        Ok(n) if n != 0 => sign * n,
        _ => index as i64 + 1,
    }
}

/// "GRT / LOA" → (grt, loa); loa is empty without a second segment
pub fn split_tonnage(raw: &str) -> (String, String) {
    let mut parts = raw.split('/');
    let grt = parts.next().unwrap_or_default().trim().to_string();
    let loa = parts.next().map(|s| s.trim().to_string()).unwrap_or_default();
    (grt, loa)
}

/// "CALLSIGN(IMO)" → (call sign, imo); imo is empty without a
/// parenthesised number
pub fn split_call_sign(raw: &str) -> (String, String) {
    static IMO: OnceLock<Option<Regex>> = OnceLock::new();

    let call_sign = raw.split('(').next().unwrap_or_default().trim().to_string();
    let imo = IMO
        .get_or_init(|| Regex::new(r"\((\d+)\)").ok())
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    (call_sign, imo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Value {
        json!({
            "date": "2026-10-17",
            "no": "3",
            "time": "14:30",
            "name": "HMM ALGECIRAS",
            "grt": "228283 / 399.9",
            "dt": "14.5",
            "fm": "OUTER",
            "to": "NT10(HJ1)",
            "side": "P",
            "cs": "3FMZ9(9863297)",
            "tugs": "2척",
            "quarantine": "Y",
            "line": "이엔에스마린",
            "nav": "입항",
            "agent": "HMM",
            "rmkTeam": "@홍길동",
            "rmkAgent": "",
            "rmk": "선석 변경 가능",
            "pt": "1"
        })
    }

    #[test]
    fn test_transform_full_record() {
        let entry = transform_record(0, &sample_record());

        assert_eq!(entry.id, "2026-10-17-3");
        assert_eq!(entry.no, 3);
        assert_eq!(entry.ship_name, "HMM ALGECIRAS");
        assert_eq!(entry.grt, "228283");
        assert_eq!(entry.loa, "399.9");
        assert_eq!(entry.call_sign, "3FMZ9");
        assert_eq!(entry.imo, "9863297");
        assert_eq!(entry.navigation, Navigation::Arrival);
        assert_eq!(entry.from, "OUTER");
        assert_eq!(entry.to, "NT10(HJ1)");
        assert_eq!(entry.pilot, "1");
        assert!(entry.quarantine);
        assert_eq!(entry.remarks, "@홍길동");
        assert_eq!(entry.team_note.as_deref(), Some("@홍길동"));
        assert_eq!(entry.agent_note, None);
        assert_eq!(entry.note.as_deref(), Some("선석 변경 가능"));
        assert!(entry.is_special);
    }

    #[test]
    fn test_batch_keeps_count_and_order() {
        let records = vec![
            json!({"date": "2026-10-17", "no": "1", "name": "A"}),
            json!({"date": "2026-10-17", "no": "2", "name": "B"}),
            json!({}),
            json!({"date": "2026-10-18", "no": "1", "name": "D"}),
        ];

        let entries = transform_records(&records);

        assert_eq!(entries.len(), 4);
        let names: Vec<&str> = entries.iter().map(|e| e.ship_name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "", "D"]);
    }

    #[test]
    fn test_tonnage_split() {
        assert_eq!(split_tonnage("12345 / 99"), ("12345".to_string(), "99".to_string()));
        assert_eq!(split_tonnage("12345"), ("12345".to_string(), String::new()));
        assert_eq!(split_tonnage(""), (String::new(), String::new()));
    }

    #[test]
    fn test_call_sign_split() {
        assert_eq!(split_call_sign("ABCD(1234567)"), ("ABCD".to_string(), "1234567".to_string()));
        assert_eq!(split_call_sign("ABCD"), ("ABCD".to_string(), String::new()));
        assert_eq!(split_call_sign("ABCD (n/a)"), ("ABCD".to_string(), String::new()));
    }

    #[test]
    fn test_navigation_mapping() {
        assert_eq!(Navigation::from_raw("입항"), Navigation::Arrival);
        assert_eq!(Navigation::from_raw("출항"), Navigation::Departure);
        assert_eq!(Navigation::from_raw("이동"), Navigation::Shift);
        assert_eq!(Navigation::from_raw(""), Navigation::Shift);
        assert_eq!(Navigation::from_raw("foo"), Navigation::Shift);
    }

    #[test]
    fn test_quarantine_flag() {
        let clear = transform_record(0, &json!({"quarantine": ""}));
        let flagged = transform_record(0, &json!({"quarantine": "Y"}));
        let missing = transform_record(0, &json!({}));

        assert!(!clear.quarantine);
        assert!(flagged.quarantine);
        assert!(!missing.quarantine);
    }

    #[test]
    fn test_special_marker() {
        let marked = transform_record(0, &json!({"rmkTeam": "@홍길동"}));
        let plain = transform_record(0, &json!({"rmkTeam": "홍길동"}));
        let absent = transform_record(0, &json!({"rmkAgent": "@대리점"}));

        assert!(marked.is_special);
        assert!(!plain.is_special);
        assert!(!absent.is_special);
    }

    #[test]
    fn test_remarks_fall_back_to_agent_note() {
        let entry = transform_record(0, &json!({"rmkTeam": "", "rmkAgent": "서류 대기", "rmk": "X"}));
        assert_eq!(entry.remarks, "서류 대기");
        assert_eq!(entry.team_note, None);
        assert_eq!(entry.note.as_deref(), Some("X"));

        let none = transform_record(0, &json!({"rmk": "X"}));
        assert_eq!(none.remarks, "");
    }

    #[test]
    fn test_sequence_fallback() {
        let numeric = transform_record(4, &json!({"date": "2026-10-17", "no": 7}));
        assert_eq!(numeric.no, 7);
        assert_eq!(numeric.id, "2026-10-17-7");

        let text = transform_record(4, &json!({"date": "2026-10-17", "no": "A1"}));
        assert_eq!(text.no, 5);
        assert_eq!(text.id, "2026-10-17-A1");

        let prefixed = transform_record(4, &json!({"no": "12a"}));
        assert_eq!(prefixed.no, 12);

        let zero = transform_record(4, &json!({"no": "0"}));
        assert_eq!(zero.no, 5);
    }

    #[test]
    fn test_wrong_types_degrade() {
        let entry = transform_record(0, &json!({"grt": null, "cs": ["x"], "name": {"a": 1}}));
        assert_eq!(entry.grt, "");
        assert_eq!(entry.loa, "");
        assert_eq!(entry.call_sign, "");
        assert_eq!(entry.ship_name, "");

        let scalar = transform_record(2, &json!("not an object"));
        assert_eq!(scalar.no, 3);
        assert_eq!(scalar.navigation, Navigation::Shift);
    }
}
