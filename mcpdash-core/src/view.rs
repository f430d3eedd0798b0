//! Structured view tree.
//!
//! Builders here turn normalized data into renderer-neutral nodes. The HTML
//! front end and the terminal CLI each walk the same tree.

use chrono::{DateTime, NaiveDateTime};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::grouping::{CorrelationGroup, GroupLayout};
use crate::models::{ServerDetail, ServerInfo};
use crate::pagination::{Page, PageWindow};
use crate::record::{McpLogRecord, SqlAgentLogRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Primary,
    Secondary,
    Success,
    Danger,
}

/// Which paginated list a pagination control drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTarget {
    SqlAgentLogs,
    McpLogs,
    ServerLogs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Code(String),
    Badge(Badge),
    /// Long text shown clipped until expanded.
    Collapsible { id: String, content: Box<Inline> },
    Markdown(String),
    Preformatted(String),
    Timestamp(String),
    Labeled { label: String, value: Box<Inline> },
    Link(Link),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub badge: Option<Badge>,
    pub body: Vec<Inline>,
    pub footer: Option<Inline>,
    pub link: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccordionItem {
    pub title: String,
    pub open: bool,
    pub body: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewNode {
    Alert { level: AlertLevel, text: String },
    CorrelationHeader { correlation_id: String },
    CardGrid { cards: Vec<Card> },
    Card(Card),
    Fields { fields: Vec<(String, Inline)> },
    Table { columns: Vec<String>, rows: Vec<Vec<Inline>> },
    Accordion { id: String, items: Vec<AccordionItem> },
    Pagination { target: PageTarget, window: PageWindow },
}

pub fn alert(level: AlertLevel, text: impl Into<String>) -> ViewNode {
    ViewNode::Alert {
        level,
        text: text.into(),
    }
}

/// First 8 characters of a correlation id followed by `...`, or `N/A`.
pub fn short_correlation(id: Option<&str>) -> String {
    match id {
        Some(id) if id.chars().count() > 8 => format!("{}...", id.chars().take(8).collect::<String>()),
        Some(id) => id.to_string(),
        None => "N/A".to_string(),
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// `YYYY-MM-DD HH:MM:SS` for the timestamp shapes the backend emits; anything
/// else is shown as received.
pub fn format_timestamp(raw: &str) -> String {
    if raw.is_empty() {
        return "-".to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }
    raw.to_string()
}

fn running_badge(is_running: bool) -> Badge {
    if is_running {
        Badge {
            text: "running".to_string(),
            tone: Tone::Success,
        }
    } else {
        Badge {
            text: "stopped".to_string(),
            tone: Tone::Danger,
        }
    }
}

fn text_or_empty(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

/// Percent-encode a value for use inside a query string or path segment.
pub fn encode_query_value(input: &str) -> String {
    // RFC 3986 unreserved characters pass through.
    const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'.')
        .remove(b'_')
        .remove(b'~');

    utf8_percent_encode(input, UNRESERVED).to_string()
}

pub fn server_href(server_key: &str) -> String {
    format!("/mcp/{}", encode_query_value(server_key))
}

pub fn server_cards(servers: &[ServerInfo], preview_chars: usize) -> ViewNode {
    if servers.is_empty() {
        return alert(AlertLevel::Info, "No MCP servers.");
    }

    let cards = servers
        .iter()
        .map(|s| Card {
            title: s.server_key.clone(),
            subtitle: s.display_name.clone(),
            badge: Some(running_badge(s.is_running)),
            body: vec![Inline::Text(preview(
                s.description.as_deref().unwrap_or_default(),
                preview_chars,
            ))],
            footer: Some(match &s.updated_at {
                Some(ts) => Inline::Timestamp(ts.clone()),
                None => Inline::Text("never updated".to_string()),
            }),
            link: Some(Link {
                href: server_href(&s.server_key),
                text: "Manage".to_string(),
            }),
        })
        .collect();

    ViewNode::CardGrid { cards }
}

pub fn server_info(detail: &ServerDetail) -> ViewNode {
    let mut fields = vec![
        ("Server".to_string(), Inline::Code(detail.server_key.clone())),
        ("Name".to_string(), Inline::Text(text_or_empty(&detail.display_name))),
        (
            "Port".to_string(),
            Inline::Text(detail.port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())),
        ),
        ("Status".to_string(), Inline::Badge(running_badge(detail.is_running))),
    ];
    if let Some(transport) = &detail.transport {
        fields.push(("Transport".to_string(), Inline::Text(transport.clone())));
    }
    fields.push((
        "Description".to_string(),
        Inline::Text(text_or_empty(&detail.description)),
    ));
    fields.push((
        "Prompt".to_string(),
        Inline::Text(
            detail
                .prompt_template
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "none".to_string()),
        ),
    ));
    ViewNode::Fields { fields }
}

/// Optional columns of an MCP log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpColumns {
    pub request_id: bool,
    pub server: bool,
}

fn collapsible(id: String, content: Inline) -> Inline {
    Inline::Collapsible {
        id,
        content: Box::new(content),
    }
}

/// Correlation header (request-group pages), table and pagination control.
pub fn mcp_log_table(
    page: &Page<McpLogRecord>,
    columns: McpColumns,
    target: PageTarget,
    radius: u32,
    empty_text: &str,
) -> Vec<ViewNode> {
    if page.is_empty() {
        return vec![alert(AlertLevel::Info, empty_text)];
    }

    let mut nodes = Vec::new();
    if let Some(id) = &page.correlation_id {
        nodes.push(ViewNode::CorrelationHeader {
            correlation_id: id.clone(),
        });
    }

    let mut header = Vec::new();
    if columns.request_id {
        header.push("Request ID");
    }
    if columns.server {
        header.push("Server");
    }
    header.extend(["Name", "Instruction", "Answer", "Time"]);

    let rows = page
        .items
        .iter()
        .map(|log| {
            let mut row = Vec::new();
            if columns.request_id {
                row.push(Inline::Code(short_correlation(log.correlation_id.as_deref())));
            }
            if columns.server {
                row.push(Inline::Badge(Badge {
                    text: text_or_empty(&log.server_key),
                    tone: Tone::Primary,
                }));
            }
            row.push(Inline::Text(text_or_empty(&log.display_name)));
            row.push(collapsible(
                format!("mcp_inst_{}", log.id),
                Inline::Text(text_or_empty(&log.instruction)),
            ));
            row.push(collapsible(
                format!("mcp_ans_{}", log.id),
                Inline::Markdown(text_or_empty(&log.answer)),
            ));
            row.push(Inline::Timestamp(log.created_at.clone()));
            row
        })
        .collect();

    nodes.push(ViewNode::Table {
        columns: header.into_iter().map(str::to_string).collect(),
        rows,
    });
    nodes.extend(pagination(target, page.window(radius)));
    nodes
}

pub fn sql_agent_log_table(
    page: &Page<SqlAgentLogRecord>,
    target: PageTarget,
    radius: u32,
) -> Vec<ViewNode> {
    if page.is_empty() {
        return vec![alert(AlertLevel::Info, "No SQL agent logs.")];
    }

    let mut nodes = Vec::new();
    if let Some(id) = &page.correlation_id {
        nodes.push(ViewNode::CorrelationHeader {
            correlation_id: id.clone(),
        });
    }

    let rows = page
        .items
        .iter()
        .map(|log| {
            vec![
                Inline::Code(short_correlation(log.correlation_id.as_deref())),
                Inline::Badge(Badge {
                    text: step_label(log.step_order),
                    tone: Tone::Secondary,
                }),
                Inline::Code(text_or_empty(&log.tool_name)),
                collapsible(
                    format!("sql_input_{}", log.id),
                    Inline::Text(text_or_empty(&log.tool_input)),
                ),
                collapsible(
                    format!("sql_output_{}", log.id),
                    Inline::Text(text_or_empty(&log.tool_output)),
                ),
                Inline::Timestamp(log.created_at.clone()),
            ]
        })
        .collect();

    nodes.push(ViewNode::Table {
        columns: ["Request ID", "Step", "Tool", "Input", "Output", "Time"]
            .into_iter()
            .map(str::to_string)
            .collect(),
        rows,
    });
    nodes.extend(pagination(target, page.window(radius)));
    nodes
}

fn step_label(step: Option<i64>) -> String {
    step.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn pagination(target: PageTarget, window: PageWindow) -> Option<ViewNode> {
    window
        .is_visible()
        .then_some(ViewNode::Pagination { target, window })
}

fn mcp_body(log: &McpLogRecord) -> Vec<Inline> {
    vec![
        Inline::Labeled {
            label: "Instruction".to_string(),
            value: Box::new(Inline::Text(text_or_empty(&log.instruction))),
        },
        Inline::Markdown(text_or_empty(&log.answer)),
        Inline::Timestamp(log.created_at.clone()),
    ]
}

fn sql_body(log: &SqlAgentLogRecord) -> Vec<Inline> {
    vec![
        Inline::Labeled {
            label: "Input".to_string(),
            value: Box::new(Inline::Preformatted(text_or_empty(&log.tool_input))),
        },
        Inline::Labeled {
            label: "Output".to_string(),
            value: Box::new(Inline::Preformatted(text_or_empty(&log.tool_output))),
        },
        Inline::Timestamp(log.created_at.clone()),
    ]
}

fn sql_title(log: &SqlAgentLogRecord) -> String {
    format!("Step {} - {}", step_label(log.step_order), text_or_empty(&log.tool_name))
}

fn group_nodes<R>(
    group: &CorrelationGroup<R>,
    accordion_id: &str,
    empty_text: &str,
    title: impl Fn(&R) -> String,
    body: impl Fn(&R) -> Vec<Inline>,
) -> Vec<ViewNode> {
    let mut nodes = Vec::new();
    if let Some(id) = &group.correlation_id {
        nodes.push(ViewNode::CorrelationHeader {
            correlation_id: id.clone(),
        });
    }

    match group.layout() {
        GroupLayout::Empty => nodes.push(alert(AlertLevel::Info, empty_text)),
        GroupLayout::Single => {
            let item = &group.items[0];
            nodes.push(ViewNode::Card(Card {
                title: title(item),
                subtitle: None,
                badge: None,
                body: body(item),
                footer: None,
                link: None,
            }));
        }
        GroupLayout::Accordion { open } => nodes.push(ViewNode::Accordion {
            id: accordion_id.to_string(),
            items: group
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| AccordionItem {
                    title: title(item),
                    open: i == open,
                    body: body(item),
                })
                .collect(),
        }),
    }
    nodes
}

/// MCP answers of one execution: flat card, accordion, or empty state.
pub fn mcp_group(group: &CorrelationGroup<McpLogRecord>) -> Vec<ViewNode> {
    group_nodes(
        group,
        "mcpAccordion",
        "No execution result.",
        |log| text_or_empty(&log.display_name),
        mcp_body,
    )
}

/// SQL agent steps of one execution.
pub fn sql_agent_group(group: &CorrelationGroup<SqlAgentLogRecord>) -> Vec<ViewNode> {
    group_nodes(
        group,
        "sqlAccordion",
        "No execution logs.",
        sql_title,
        sql_body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by_correlation;

    fn mcp(id: i64, correlation: Option<&str>) -> McpLogRecord {
        McpLogRecord {
            id,
            server_key: Some("srv".into()),
            display_name: Some(format!("Name {id}")),
            description: None,
            instruction: Some("instr".into()),
            prompt_template: None,
            answer: Some("**bold**".into()),
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: None,
            correlation_id: correlation.map(str::to_string),
        }
    }

    fn page_of(items: Vec<McpLogRecord>, current: u32, total: u32) -> Page<McpLogRecord> {
        Page {
            items,
            current_page: current,
            total_pages: total,
            total_count: total as u64,
            per_page: 10,
            has_prev: current > 1,
            has_next: current < total,
            correlation_id: None,
        }
    }

    const ALL_COLUMNS: McpColumns = McpColumns {
        request_id: true,
        server: true,
    };

    // ========================================================================
    // TEST 1: Correlation ids are shortened
    // ========================================================================
    #[test]
    fn test_short_correlation() {
        assert_eq!(short_correlation(Some("0123456789abcdef")), "01234567...");
        assert_eq!(short_correlation(Some("abc")), "abc");
        assert_eq!(short_correlation(None), "N/A");
    }

    // ========================================================================
    // TEST 2: Preview truncates on characters
    // ========================================================================
    #[test]
    fn test_preview_truncates_on_chars() {
        assert_eq!(preview("학과 검색 서버", 2), "학과...");
        assert_eq!(preview("short", 100), "short");
    }

    // ========================================================================
    // TEST 3: Timestamp display
    // ========================================================================
    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-03-05T14:07:09Z"), "2024-03-05 14:07:09");
        assert_eq!(format_timestamp("2024-03-05T14:07:09.123456"), "2024-03-05 14:07:09");
        assert_eq!(format_timestamp("2024-03-05 14:07:09"), "2024-03-05 14:07:09");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_timestamp(""), "-");
    }

    // ========================================================================
    // TEST 4: View tree serializes with kind tags
    // ========================================================================
    #[test]
    fn test_view_tree_serializes_with_kind_tags() {
        let node = ViewNode::Fields {
            fields: vec![("Port".to_string(), Inline::Text("8101".to_string()))],
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            serde_json::json!({
                "kind": "fields",
                "fields": [["Port", {"kind": "text", "value": "8101"}]]
            })
        );
    }

    // ========================================================================
    // TEST 5: Empty server list is informational
    // ========================================================================
    #[test]
    fn test_empty_server_list_is_informational() {
        assert_eq!(
            server_cards(&[], 100),
            alert(AlertLevel::Info, "No MCP servers.")
        );
    }

    // ========================================================================
    // TEST 6: Server cards link to the server page
    // ========================================================================
    #[test]
    fn test_server_card_links_to_server_page() {
        let servers = vec![ServerInfo {
            server_key: "kocw".into(),
            description: Some("x".repeat(150)),
            ..Default::default()
        }];
        match server_cards(&servers, 100) {
            ViewNode::CardGrid { cards } => {
                assert_eq!(cards[0].link.as_ref().unwrap().href, "/mcp/kocw");
                assert_eq!(cards[0].badge.as_ref().unwrap().tone, Tone::Danger);
                match &cards[0].body[0] {
                    Inline::Text(t) => assert_eq!(t.chars().count(), 103),
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // ========================================================================
    // TEST 7: Server links encode the key
    // ========================================================================
    #[test]
    fn test_server_href_encodes_key() {
        assert_eq!(server_href("kocw"), "/mcp/kocw");
        assert_eq!(server_href("a b/c?x#y"), "/mcp/a%20b%2Fc%3Fx%23y");
        assert_eq!(encode_query_value("req-1_a.b~"), "req-1_a.b~");

        let servers = vec![ServerInfo {
            server_key: "a b/c?x#y".into(),
            ..Default::default()
        }];
        match server_cards(&servers, 100) {
            ViewNode::CardGrid { cards } => {
                assert_eq!(
                    cards[0].link.as_ref().unwrap().href,
                    "/mcp/a%20b%2Fc%3Fx%23y"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // ========================================================================
    // TEST 8: Single-page tables have no pagination
    // ========================================================================
    #[test]
    fn test_single_page_table_has_no_pagination() {
        let nodes = mcp_log_table(
            &page_of(vec![mcp(1, Some("req-1"))], 1, 1),
            ALL_COLUMNS,
            PageTarget::McpLogs,
            2,
            "No MCP server logs.",
        );
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            ViewNode::Table { columns, rows } => {
                assert_eq!(columns.len(), 6);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][0], Inline::Code("req-1".into()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // ========================================================================
    // TEST 9: Multi-page tables have pagination
    // ========================================================================
    #[test]
    fn test_multi_page_table_has_pagination() {
        let nodes = mcp_log_table(
            &page_of(vec![mcp(1, None)], 2, 5),
            McpColumns {
                request_id: false,
                server: false,
            },
            PageTarget::ServerLogs,
            2,
            "No logs.",
        );
        match nodes.last().unwrap() {
            ViewNode::Pagination { target, window } => {
                assert_eq!(*target, PageTarget::ServerLogs);
                assert_eq!(window.pages, vec![1, 2, 3, 4]);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &nodes[0] {
            ViewNode::Table { columns, .. } => assert_eq!(columns[0], "Name"),
            other => panic!("unexpected {:?}", other),
        }
    }

    // ========================================================================
    // TEST 10: Empty pages use the empty text
    // ========================================================================
    #[test]
    fn test_empty_page_uses_empty_text() {
        let nodes = mcp_log_table(
            &page_of(vec![], 1, 0),
            ALL_COLUMNS,
            PageTarget::McpLogs,
            2,
            "No MCP server logs.",
        );
        assert_eq!(nodes, vec![alert(AlertLevel::Info, "No MCP server logs.")]);
    }

    // ========================================================================
    // TEST 11: Group layouts
    // ========================================================================
    #[test]
    fn test_group_layouts() {
        let empty = mcp_group(&group_by_correlation(vec![]));
        assert_eq!(empty, vec![alert(AlertLevel::Info, "No execution result.")]);

        let single = mcp_group(&group_by_correlation(vec![mcp(1, Some("abc"))]));
        assert_eq!(single.len(), 2);
        assert!(matches!(single[0], ViewNode::CorrelationHeader { .. }));
        assert!(matches!(single[1], ViewNode::Card(_)));

        let multi = mcp_group(&group_by_correlation(vec![
            mcp(1, Some("xyz")),
            mcp(2, Some("xyz")),
            mcp(3, Some("xyz")),
        ]));
        match &multi[1] {
            ViewNode::Accordion { items, .. } => {
                let open: Vec<bool> = items.iter().map(|i| i.open).collect();
                assert_eq!(open, vec![true, false, false]);
                assert_eq!(items[0].title, "Name 1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // ========================================================================
    // TEST 12: SQL group titles use step and tool
    // ========================================================================
    #[test]
    fn test_sql_group_titles_use_step_and_tool() {
        let steps = vec![
            SqlAgentLogRecord {
                id: 1,
                instruction: None,
                tool_name: Some("sql_db_list_tables".into()),
                tool_input: Some("".into()),
                tool_output: Some("students".into()),
                step_order: Some(1),
                created_at: "2024-01-01T00:00:00Z".into(),
                updated_at: None,
                correlation_id: Some("req-2".into()),
            },
            SqlAgentLogRecord {
                id: 2,
                instruction: None,
                tool_name: Some("sql_db_query".into()),
                tool_input: Some("SELECT COUNT(*) FROM students".into()),
                tool_output: Some("[(42,)]".into()),
                step_order: Some(2),
                created_at: "2024-01-01T00:00:01Z".into(),
                updated_at: None,
                correlation_id: Some("req-2".into()),
            },
        ];
        let nodes = sql_agent_group(&group_by_correlation(steps));
        match &nodes[1] {
            ViewNode::Accordion { id, items } => {
                assert_eq!(id, "sqlAccordion");
                assert_eq!(items[1].title, "Step 2 - sql_db_query");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
