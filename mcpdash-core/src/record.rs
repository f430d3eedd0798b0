//! Log record normalization.
//!
//! The backend hands out log rows either as positional arrays (raw DB tuples,
//! column order is the contract) or as keyed objects. Both are normalized here
//! into one canonical keyed map and then decoded into the typed record for
//! the log domain.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DashError;

/// Ordered wire field names of a positional log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    name: &'static str,
    fields: &'static [&'static str],
}

impl FieldSchema {
    pub const fn new(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Map positional values onto field names. Missing trailing positions are `null`.
    pub fn to_keyed(&self, values: &[Value]) -> Map<String, Value> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), values.get(i).cloned().unwrap_or(Value::Null)))
            .collect()
    }
}

/// `mcp_answer_log` column order.
pub const MCP_LOG_SCHEMA: FieldSchema = FieldSchema::new(
    "mcp",
    &[
        "id",
        "mcp_server",
        "name",
        "description",
        "instruction",
        "prompt",
        "answer",
        "created_at",
        "updated_at",
        "request_id",
    ],
);

/// `sql_agent_log` column order as served to the dashboard.
pub const SQL_AGENT_LOG_SCHEMA: FieldSchema = FieldSchema::new(
    "sql_agent",
    &[
        "id",
        "instruction",
        "tool_name",
        "tool_input",
        "tool_output",
        "step_order",
        "created_at",
        "updated_at",
        "request_id",
    ],
);

/// A log record exactly as it came over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLogRecord {
    Positional(Vec<Value>),
    Keyed(Map<String, Value>),
}

impl RawLogRecord {
    /// The keyed wire form of this record under `schema`.
    pub fn into_keyed(self, schema: &FieldSchema) -> RawLogRecord {
        match self {
            RawLogRecord::Positional(values) => RawLogRecord::Keyed(schema.to_keyed(&values)),
            keyed => keyed,
        }
    }
}

/// Canonical keyed form: every schema field is present, absent ones are `null`.
pub fn normalize_fields(
    raw: RawLogRecord,
    schema: &FieldSchema,
) -> Result<Map<String, Value>, DashError> {
    let fields = match raw {
        RawLogRecord::Positional(values) => {
            if values.len() > schema.len() {
                tracing::debug!(
                    schema = schema.name(),
                    extra = values.len() - schema.len(),
                    "Ignoring trailing positional fields"
                );
            }
            schema.to_keyed(&values)
        }
        RawLogRecord::Keyed(mut map) => {
            for name in schema.fields() {
                map.entry(name.to_string()).or_insert(Value::Null);
            }
            map
        }
    };

    if fields.get("id").map_or(true, Value::is_null) {
        return Err(DashError::Payload(format!(
            "{} log record has no id",
            schema.name()
        )));
    }

    Ok(fields)
}

/// A typed log record bound to its positional schema.
pub trait LogSchema: DeserializeOwned + Send + Sync {
    const SCHEMA: FieldSchema;

    fn id(&self) -> i64;
    fn correlation_id(&self) -> Option<&str>;
    fn created_at(&self) -> &str;
}

/// Normalize one wire record of either form into the typed record `R`.
pub fn normalize_log_record<R: LogSchema>(raw: RawLogRecord) -> Result<R, DashError> {
    let fields = normalize_fields(raw, &R::SCHEMA)?;
    Ok(serde_json::from_value(Value::Object(fields))?)
}

pub fn normalize_all<R: LogSchema>(raws: Vec<RawLogRecord>) -> Result<Vec<R>, DashError> {
    raws.into_iter().map(normalize_log_record::<R>).collect()
}

/// One row of the MCP server answer log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpLogRecord {
    pub id: i64,
    #[serde(rename = "mcp_server", deserialize_with = "text")]
    pub server_key: Option<String>,
    #[serde(rename = "name", deserialize_with = "text")]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "text")]
    pub instruction: Option<String>,
    #[serde(rename = "prompt", deserialize_with = "text")]
    pub prompt_template: Option<String>,
    /// Markdown.
    #[serde(deserialize_with = "text")]
    pub answer: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: Option<String>,
    #[serde(rename = "request_id", deserialize_with = "correlation")]
    pub correlation_id: Option<String>,
}

impl LogSchema for McpLogRecord {
    const SCHEMA: FieldSchema = MCP_LOG_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// One tool invocation of the SQL agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlAgentLogRecord {
    pub id: i64,
    #[serde(deserialize_with = "text")]
    pub instruction: Option<String>,
    #[serde(deserialize_with = "text")]
    pub tool_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub tool_input: Option<String>,
    #[serde(deserialize_with = "text")]
    pub tool_output: Option<String>,
    /// 1-based position within the correlated execution.
    pub step_order: Option<i64>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: String,
    #[serde(deserialize_with = "text")]
    pub updated_at: Option<String>,
    #[serde(rename = "request_id", deserialize_with = "correlation")]
    pub correlation_id: Option<String>,
}

impl LogSchema for SqlAgentLogRecord {
    const SCHEMA: FieldSchema = SQL_AGENT_LOG_SCHEMA;

    fn id(&self) -> i64 {
        self.id
    }

    fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

// Text columns occasionally arrive as numbers or JSON fragments; keep them as text.
fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text(d)?.unwrap_or_default())
}

fn correlation<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(text(d)?.filter(|s| !s.is_empty() && s != "N/A"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mcp_row() -> Vec<Value> {
        vec![
            json!(1),
            json!("srv"),
            json!("Name"),
            json!("d"),
            json!("instr"),
            json!("p"),
            json!("answer"),
            json!("2024-01-01T00:00:00Z"),
            Value::Null,
            json!("req-1"),
        ]
    }

    fn sql_row(id: i64, step: i64) -> Vec<Value> {
        vec![
            json!(id),
            json!("list tables"),
            json!("sql_db_query"),
            json!("SELECT 1"),
            json!("[(1,)]"),
            json!(step),
            json!("2024-01-01T00:00:00Z"),
            Value::Null,
            json!("req-9"),
        ]
    }

    // ========================================================================
    // TEST 1: positional MCP record maps every index to its field
    // ========================================================================
    #[test]
    fn test_positional_mcp_record() {
        let rec: McpLogRecord =
            normalize_log_record(RawLogRecord::Positional(mcp_row())).unwrap();
        assert_eq!(rec.id, 1);
        assert_eq!(rec.server_key.as_deref(), Some("srv"));
        assert_eq!(rec.display_name.as_deref(), Some("Name"));
        assert_eq!(rec.description.as_deref(), Some("d"));
        assert_eq!(rec.instruction.as_deref(), Some("instr"));
        assert_eq!(rec.prompt_template.as_deref(), Some("p"));
        assert_eq!(rec.answer.as_deref(), Some("answer"));
        assert_eq!(rec.created_at, "2024-01-01T00:00:00Z");
        assert_eq!(rec.updated_at, None);
        assert_eq!(rec.correlation_id.as_deref(), Some("req-1"));
    }

    // ========================================================================
    // TEST 2: positional and keyed forms normalize identically
    // ========================================================================
    #[test]
    fn test_positional_and_keyed_forms_are_equivalent() {
        let positional = RawLogRecord::Positional(mcp_row());
        let keyed = positional.clone().into_keyed(&MCP_LOG_SCHEMA);
        assert!(matches!(keyed, RawLogRecord::Keyed(_)));

        assert_eq!(
            normalize_fields(positional.clone(), &MCP_LOG_SCHEMA).unwrap(),
            normalize_fields(keyed.clone(), &MCP_LOG_SCHEMA).unwrap()
        );
        let a: McpLogRecord = normalize_log_record(positional).unwrap();
        let b: McpLogRecord = normalize_log_record(keyed).unwrap();
        assert_eq!(a, b);

        let sql = RawLogRecord::Positional(sql_row(4, 2));
        let a: SqlAgentLogRecord = normalize_log_record(sql.clone()).unwrap();
        let b: SqlAgentLogRecord =
            normalize_log_record(sql.into_keyed(&SQL_AGENT_LOG_SCHEMA)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.step_order, Some(2));
    }

    // ========================================================================
    // TEST 3: short legacy rows get a null correlation id
    // ========================================================================
    #[test]
    fn test_short_sequence_defaults_correlation_to_null() {
        let mut row = mcp_row();
        row.truncate(9);
        let fields = normalize_fields(RawLogRecord::Positional(row), &MCP_LOG_SCHEMA).unwrap();
        assert_eq!(fields.len(), MCP_LOG_SCHEMA.len());
        assert_eq!(fields["request_id"], Value::Null);

        let mut row = mcp_row();
        row.truncate(9);
        let rec: McpLogRecord = normalize_log_record(RawLogRecord::Positional(row)).unwrap();
        assert_eq!(rec.correlation_id, None);
    }

    // ========================================================================
    // TEST 4: keyed record missing fields gains them as null, extras survive
    // ========================================================================
    #[test]
    fn test_keyed_record_is_completed() {
        let mut map = Map::new();
        map.insert("id".into(), json!(3));
        map.insert("tool_name".into(), json!("sql_db_schema"));
        map.insert("created_at".into(), json!("2024-02-02T10:00:00"));
        map.insert("execution_time".into(), json!("2024-02-02T10:00:00"));
        let fields =
            normalize_fields(RawLogRecord::Keyed(map), &SQL_AGENT_LOG_SCHEMA).unwrap();
        for name in SQL_AGENT_LOG_SCHEMA.fields() {
            assert!(fields.contains_key(*name), "missing {name}");
        }
        assert_eq!(fields["request_id"], Value::Null);
        assert!(fields.contains_key("execution_time"));
    }

    // ========================================================================
    // TEST 5: "N/A" and empty correlation ids are absent
    // ========================================================================
    #[test]
    fn test_placeholder_correlation_ids_are_absent() {
        for placeholder in ["N/A", ""] {
            let mut row = mcp_row();
            row[9] = json!(placeholder);
            let rec: McpLogRecord =
                normalize_log_record(RawLogRecord::Positional(row)).unwrap();
            assert_eq!(rec.correlation_id, None);
        }
    }

    // ========================================================================
    // TEST 6: a record without an id is malformed
    // ========================================================================
    #[test]
    fn test_missing_id_is_rejected() {
        let err = normalize_fields(RawLogRecord::Positional(vec![]), &MCP_LOG_SCHEMA).unwrap_err();
        assert!(matches!(err, DashError::Payload(_)));

        let err = normalize_log_record::<SqlAgentLogRecord>(RawLogRecord::Keyed(Map::new()))
            .unwrap_err();
        assert!(matches!(err, DashError::Payload(_)));
    }

    // ========================================================================
    // TEST 7: untagged wire decoding picks the right variant
    // ========================================================================
    #[test]
    fn test_raw_record_deserializes_both_forms() {
        let raws: Vec<RawLogRecord> =
            serde_json::from_value(json!([[1, "a"], {"id": 2}])).unwrap();
        assert!(matches!(raws[0], RawLogRecord::Positional(_)));
        assert!(matches!(raws[1], RawLogRecord::Keyed(_)));
    }

    // ========================================================================
    // TEST 8: non-string text columns are rendered as text
    // ========================================================================
    #[test]
    fn test_structured_tool_output_becomes_text() {
        let mut row = sql_row(1, 1);
        row[4] = json!({"rows": 2});
        let rec: SqlAgentLogRecord =
            normalize_log_record(RawLogRecord::Positional(row)).unwrap();
        assert_eq!(rec.tool_output.as_deref(), Some(r#"{"rows":2}"#));
    }

    // ========================================================================
    // TEST 9: typed records serialize back to the keyed wire names
    // ========================================================================
    #[test]
    fn test_typed_record_serializes_with_wire_names() {
        let rec: McpLogRecord =
            normalize_log_record(RawLogRecord::Positional(mcp_row())).unwrap();
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["mcp_server"], "srv");
        assert_eq!(v["request_id"], "req-1");
        let again: McpLogRecord =
            normalize_log_record(serde_json::from_value(v).unwrap()).unwrap();
        assert_eq!(again, rec);
    }

    // ========================================================================
    // TEST 10: Schema positions
    // ========================================================================
    #[test]
    fn test_schema_positions() {
        assert_eq!(MCP_LOG_SCHEMA.position("request_id"), Some(9));
        assert_eq!(SQL_AGENT_LOG_SCHEMA.position("step_order"), Some(5));
        assert_eq!(SQL_AGENT_LOG_SCHEMA.position("answer"), None);
    }
}
