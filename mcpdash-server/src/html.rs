//! Server-side HTML rendering of the view tree.
//!
//! Plain string building. Every piece of backend text goes through
//! [`escape_html`] (or the markdown writer for answers) and every query value
//! through [`encode_query_value`].

use mcpdash_core::orchestrator::{DashboardQuery, DashboardView, ServerPageQuery, ServerPageView};
pub use mcpdash_core::view::encode_query_value;
use mcpdash_core::view::{
    format_timestamp, preview, AccordionItem, AlertLevel, Badge, Card, Inline, PageTarget, Tone, ViewNode,
};
use mcpdash_core::{ExecutionSession, PageWindow};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag};

/// Text longer than this is folded behind a `<details>` summary.
const COLLAPSE_AT: usize = 100;

/// Builds the link for page `n` of a paginated list.
pub type HrefFn<'a> = &'a dyn Fn(PageTarget, u32) -> String;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markdown to HTML. Raw HTML in the source is shown as text and links with
/// a script scheme lose their target.
pub fn markdown_html(text: &str) -> String {
    let events = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) if is_script_url(&dest_url) => Event::Start(Tag::Link {
                link_type,
                dest_url: CowStr::Borrowed("#"),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) if is_script_url(&dest_url) => Event::Start(Tag::Image {
                link_type,
                dest_url: CowStr::Borrowed("#"),
                title,
                id,
            }),
            other => other,
        });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut out, events);
    out
}

fn is_script_url(url: &str) -> bool {
    let compact = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| compact.starts_with(scheme))
}

fn alert_class(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => "info",
        AlertLevel::Success => "success",
        AlertLevel::Warning => "warning",
        AlertLevel::Danger => "danger",
    }
}

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Primary => "primary",
        Tone::Secondary => "secondary",
        Tone::Success => "success",
        Tone::Danger => "danger",
    }
}

fn plain_text(inline: &Inline) -> String {
    match inline {
        Inline::Text(t)
        | Inline::Code(t)
        | Inline::Markdown(t)
        | Inline::Preformatted(t)
        | Inline::Timestamp(t) => t.clone(),
        Inline::Badge(b) => b.text.clone(),
        Inline::Collapsible { content, .. } => plain_text(content),
        Inline::Labeled { value, .. } => plain_text(value),
        Inline::Link(l) => l.text.clone(),
    }
}

fn render_badge(out: &mut String, badge: &Badge) {
    out.push_str("<span class=\"badge badge-");
    out.push_str(tone_class(badge.tone));
    out.push_str("\">");
    out.push_str(&escape_html(&badge.text));
    out.push_str("</span>");
}

pub fn render_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(t) => out.push_str(&escape_html(t)),
        Inline::Code(t) => {
            out.push_str("<code>");
            out.push_str(&escape_html(t));
            out.push_str("</code>");
        }
        Inline::Badge(b) => render_badge(out, b),
        Inline::Collapsible { id, content } => {
            let plain = plain_text(content);
            if plain.chars().count() <= COLLAPSE_AT {
                render_inline(out, content);
            } else {
                out.push_str("<details class=\"collapsible\" id=\"");
                out.push_str(&escape_html(id));
                out.push_str("\"><summary>");
                out.push_str(&escape_html(&preview(&plain, COLLAPSE_AT)));
                out.push_str("</summary>");
                render_inline(out, content);
                out.push_str("</details>");
            }
        }
        Inline::Markdown(t) => {
            out.push_str("<div class=\"markdown\">");
            out.push_str(&markdown_html(t));
            out.push_str("</div>");
        }
        Inline::Preformatted(t) => {
            out.push_str("<pre>");
            out.push_str(&escape_html(t));
            out.push_str("</pre>");
        }
        Inline::Timestamp(t) => {
            out.push_str("<time datetime=\"");
            out.push_str(&escape_html(t));
            out.push_str("\">");
            out.push_str(&escape_html(&format_timestamp(t)));
            out.push_str("</time>");
        }
        Inline::Labeled { label, value } => {
            out.push_str("<div><strong>");
            out.push_str(&escape_html(label));
            out.push_str(":</strong> ");
            render_inline(out, value);
            out.push_str("</div>");
        }
        Inline::Link(l) => {
            out.push_str("<a href=\"");
            out.push_str(&escape_html(&l.href));
            out.push_str("\">");
            out.push_str(&escape_html(&l.text));
            out.push_str("</a>");
        }
    }
}

fn render_card(out: &mut String, card: &Card) {
    out.push_str("<div class=\"card\">\n<div class=\"card-header\"><strong>");
    out.push_str(&escape_html(&card.title));
    out.push_str("</strong>");
    if let Some(subtitle) = &card.subtitle {
        out.push_str(" <small>");
        out.push_str(&escape_html(subtitle));
        out.push_str("</small>");
    }
    if let Some(badge) = &card.badge {
        out.push(' ');
        render_badge(out, badge);
    }
    out.push_str("</div>\n<div class=\"card-body\">\n");
    for inline in &card.body {
        out.push_str("<p>");
        render_inline(out, inline);
        out.push_str("</p>\n");
    }
    out.push_str("</div>\n");
    if card.footer.is_some() || card.link.is_some() {
        out.push_str("<div class=\"card-footer\">");
        if let Some(footer) = &card.footer {
            render_inline(out, footer);
        }
        if let Some(link) = &card.link {
            out.push(' ');
            render_inline(out, &Inline::Link(link.clone()));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

fn render_accordion_item(out: &mut String, item: &AccordionItem) {
    out.push_str(if item.open { "<details open>" } else { "<details>" });
    out.push_str("<summary>");
    out.push_str(&escape_html(&item.title));
    out.push_str("</summary>\n");
    for inline in &item.body {
        render_inline(out, inline);
        out.push('\n');
    }
    out.push_str("</details>\n");
}

fn render_pagination(out: &mut String, target: PageTarget, window: &PageWindow, href: HrefFn) {
    out.push_str("<nav><ul class=\"pagination\">");
    // Backend has_prev, minus a link to page 0
    if let Some(prev) = window.prev_page() {
        out.push_str("<li><a href=\"");
        out.push_str(&escape_html(&href(target, prev)));
        out.push_str("\">&laquo;</a></li>");
    }
    for &n in &window.pages {
        if n == window.current {
            out.push_str("<li class=\"active\"><span>");
            out.push_str(&n.to_string());
            out.push_str("</span></li>");
        } else {
            out.push_str("<li><a href=\"");
            out.push_str(&escape_html(&href(target, n)));
            out.push_str("\">");
            out.push_str(&n.to_string());
            out.push_str("</a></li>");
        }
    }
    if let Some(next) = window.next_page() {
        out.push_str("<li><a href=\"");
        out.push_str(&escape_html(&href(target, next)));
        out.push_str("\">&raquo;</a></li>");
    }
    out.push_str("</ul></nav>\n");
}

pub fn render_node(out: &mut String, node: &ViewNode, href: HrefFn) {
    match node {
        ViewNode::Alert { level, text } => {
            out.push_str("<div class=\"alert alert-");
            out.push_str(alert_class(*level));
            out.push_str("\">");
            out.push_str(&escape_html(text));
            out.push_str("</div>\n");
        }
        ViewNode::CorrelationHeader { correlation_id } => {
            out.push_str("<div class=\"request-id\">Request ID: <code>");
            out.push_str(&escape_html(correlation_id));
            out.push_str("</code></div>\n");
        }
        ViewNode::CardGrid { cards } => {
            out.push_str("<div class=\"cards\">\n");
            for card in cards {
                render_card(out, card);
            }
            out.push_str("</div>\n");
        }
        ViewNode::Card(card) => render_card(out, card),
        ViewNode::Fields { fields } => {
            out.push_str("<dl>\n");
            for (label, value) in fields {
                out.push_str("<dt>");
                out.push_str(&escape_html(label));
                out.push_str("</dt><dd>");
                render_inline(out, value);
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n");
        }
        ViewNode::Table { columns, rows } => {
            out.push_str("<table class=\"table\">\n<thead><tr>");
            for column in columns {
                out.push_str("<th>");
                out.push_str(&escape_html(column));
                out.push_str("</th>");
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    render_inline(out, cell);
                    out.push_str("</td>");
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
        }
        ViewNode::Accordion { id, items } => {
            out.push_str("<div class=\"accordion\" id=\"");
            out.push_str(&escape_html(id));
            out.push_str("\">\n");
            for item in items {
                render_accordion_item(out, item);
            }
            out.push_str("</div>\n");
        }
        ViewNode::Pagination { target, window } => render_pagination(out, *target, window, href),
    }
}

pub fn render_nodes(nodes: &[ViewNode], href: HrefFn) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node, href);
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
    html.push_str(&escape_html(title));
    html.push_str("</title>\n</head>\n<body>\n<header><a href=\"/\">MCP Dashboard</a></header>\n<main>\n");
    html.push_str(body);
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn section(out: &mut String, heading: &str, content: &str) {
    out.push_str("<section>\n<h2>");
    out.push_str(&escape_html(heading));
    out.push_str("</h2>\n");
    out.push_str(content);
    out.push_str("</section>\n");
}

// ============================================================================
// Dashboard
// ============================================================================

pub fn dashboard_href(query: &DashboardQuery, target: PageTarget, page: u32) -> String {
    let (sql_page, mcp_page) = match target {
        PageTarget::SqlAgentLogs => (page, query.mcp_page),
        _ => (query.sql_page, page),
    };
    format!(
        "/?sql_page={}&mcp_page={}&per_page={}&mode={}",
        sql_page,
        mcp_page,
        query.per_page,
        if query.group_mode { "group" } else { "list" }
    )
}

fn mcp_controls(out: &mut String, query: &DashboardQuery) {
    out.push_str("<form method=\"get\" action=\"/\" class=\"controls\">\n");
    out.push_str("<input type=\"hidden\" name=\"sql_page\" value=\"");
    out.push_str(&query.sql_page.to_string());
    out.push_str("\">\n<select name=\"mode\">");
    for (value, label, selected) in [
        ("group", "By request", query.group_mode),
        ("list", "All logs", !query.group_mode),
    ] {
        out.push_str("<option value=\"");
        out.push_str(value);
        out.push('"');
        if selected {
            out.push_str(" selected");
        }
        out.push('>');
        out.push_str(label);
        out.push_str("</option>");
    }
    out.push_str("</select>\n<select name=\"per_page\">");
    for n in [10u32, 20, 50] {
        out.push_str("<option value=\"");
        out.push_str(&n.to_string());
        out.push('"');
        if n == query.per_page {
            out.push_str(" selected");
        }
        out.push('>');
        out.push_str(&n.to_string());
        out.push_str("</option>");
    }
    out.push_str("</select>\n<button type=\"submit\">Apply</button>\n</form>\n");
}

pub fn dashboard_page(view: &DashboardView, query: &DashboardQuery) -> String {
    let href = |target: PageTarget, page: u32| dashboard_href(query, target, page);
    let mut body = String::new();

    section(&mut body, "SQL Agent Logs", &render_nodes(&view.sql_agent_logs, &href));

    let mut mcp = String::new();
    mcp_controls(&mut mcp, query);
    mcp.push_str(&render_nodes(&view.mcp_logs, &href));
    section(&mut body, "MCP Server Logs", &mcp);

    section(&mut body, "MCP Servers", &render_nodes(&view.servers, &href));

    layout("MCP Dashboard", &body)
}

// ============================================================================
// Server page
// ============================================================================

/// Outcome of a form action, shown above the server page.
#[derive(Debug, Clone, Default)]
pub struct ServerPageExtras {
    pub banner: Option<ViewNode>,
    pub answer: Option<String>,
    pub session: Option<ExecutionSession>,
}

pub fn server_page_href(
    server_key: &str,
    query: &ServerPageQuery,
    session: Option<&ExecutionSession>,
    page: u32,
) -> String {
    let mut href = format!(
        "/mcp/{}?page={}&per_page={}",
        encode_query_value(server_key),
        page,
        query.per_page
    );
    if let Some(session) = session.filter(|s| s.has_instruction()) {
        href.push_str("&instruction=");
        href.push_str(&encode_query_value(&session.instruction));
        if let Some(id) = &session.correlation_id {
            href.push_str("&request_id=");
            href.push_str(&encode_query_value(id));
        }
    }
    href
}

fn text_field(out: &mut String, name: &str, label: &str, value: &str) {
    out.push_str("<label>");
    out.push_str(label);
    out.push_str(" <input type=\"text\" name=\"");
    out.push_str(name);
    out.push_str("\" value=\"");
    out.push_str(&escape_html(value));
    out.push_str("\"></label>\n");
}

fn text_area(out: &mut String, name: &str, label: &str, value: &str) {
    out.push_str("<label>");
    out.push_str(label);
    out.push_str(" <textarea name=\"");
    out.push_str(name);
    out.push_str("\">");
    out.push_str(&escape_html(value));
    out.push_str("</textarea></label>\n");
}

fn server_forms(out: &mut String, view: &ServerPageView, session: Option<&ExecutionSession>) {
    let detail = view.detail.clone().unwrap_or_default();
    let name = detail.display_name.unwrap_or_default();
    let description = detail.description.unwrap_or_default();
    let prompt = detail.prompt_template.unwrap_or_default();
    let key = encode_query_value(&view.server_key);

    out.push_str("<form method=\"post\" action=\"/mcp/");
    out.push_str(&key);
    out.push_str("/update\" class=\"update-form\">\n");
    text_field(out, "name", "Name", &name);
    text_area(out, "description", "Description", &description);
    text_area(out, "prompt", "Prompt", &prompt);
    out.push_str("<button type=\"submit\">Save</button>\n</form>\n");

    out.push_str("<form method=\"post\" action=\"/mcp/");
    out.push_str(&key);
    out.push_str("/execute\" class=\"execute-form\">\n");
    text_field(out, "name", "Name", &name);
    text_area(out, "description", "Description", &description);
    text_area(out, "prompt", "Prompt", &prompt);
    text_area(
        out,
        "instruction",
        "Instruction",
        session.map(|s| s.instruction.as_str()).unwrap_or_default(),
    );
    out.push_str("<button type=\"submit\">Execute</button>\n</form>\n");
}

pub fn server_page(view: &ServerPageView, query: &ServerPageQuery, extras: &ServerPageExtras) -> String {
    let session = extras.session.as_ref();
    let href = |_: PageTarget, page: u32| server_page_href(&view.server_key, query, session, page);
    let mut body = String::new();

    body.push_str("<h1>");
    body.push_str(&escape_html(&view.server_key));
    body.push_str("</h1>\n");
    if let Some(banner) = &extras.banner {
        render_node(&mut body, banner, &href);
    }
    if let Some(answer) = &extras.answer {
        render_inline(&mut body, &Inline::Markdown(answer.clone()));
    }

    section(&mut body, "Server", &render_nodes(&view.info, &href));

    if view.detail.is_some() {
        let mut forms = String::new();
        server_forms(&mut forms, view, session);
        section(&mut body, "Configure and run", &forms);
    }

    section(&mut body, "Execution Result", &render_nodes(&view.results.mcp, &href));
    section(&mut body, "SQL Agent Steps", &render_nodes(&view.results.sql_agent, &href));
    section(&mut body, "Server Logs", &render_nodes(&view.logs, &href));

    layout(&format!("{} - MCP Dashboard", view.server_key), &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpdash_core::orchestrator::ExecutionResults;
    use mcpdash_core::pagination::{compute_page_window, PageFlags};
    use mcpdash_core::view::{alert, Link};

    fn no_links(_: PageTarget, _: u32) -> String {
        String::new()
    }

    // ========================================================================
    // TEST 1: Backend text is escaped
    // ========================================================================
    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        let html = render_nodes(&[alert(AlertLevel::Danger, "<b>boom</b>")], &no_links);
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(html.contains("alert-danger"));
    }

    // ========================================================================
    // TEST 2: Markdown answers render headings, lists and code blocks
    // ========================================================================
    #[test]
    fn test_markdown_structure() {
        let html = markdown_html("# Lectures\n\n- AI basics\n- Deep learning\n\n```\nSELECT * FROM t WHERE a < 3;\n```\n");
        assert!(html.contains("<h1>Lectures</h1>"));
        assert!(html.contains("<ul>\n<li>AI basics</li>\n<li>Deep learning</li>\n</ul>"));
        assert!(html.contains("<pre><code>SELECT * FROM t WHERE a &lt; 3;\n</code></pre>"));
        assert_eq!(markdown_html("Found **3** lectures"), "<p>Found <strong>3</strong> lectures</p>\n");
    }

    // ========================================================================
    // TEST 3: Raw HTML and script links in markdown stay inert
    // ========================================================================
    #[test]
    fn test_markdown_escapes_raw_html() {
        let block = markdown_html("<script>alert(1)</script>\n\ndone");
        assert!(!block.contains("<script>"));
        assert!(block.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));

        let inline = markdown_html("see <img src=x onerror=alert(1)> here");
        assert!(!inline.contains("<img"));
        assert!(inline.contains("&lt;img src=x onerror=alert(1)&gt;"));

        let link = markdown_html("[click](javascript:alert(1))");
        assert!(!link.contains("javascript:"));
        assert!(link.contains("<a href=\"#\">click</a>"));

        let node = render_nodes(
            &[ViewNode::Card(Card {
                title: "t".into(),
                subtitle: None,
                badge: None,
                body: vec![Inline::Markdown("**ok** <b>raw</b>".into())],
                footer: None,
                link: None,
            })],
            &no_links,
        );
        assert!(node.contains("<strong>ok</strong> &lt;b&gt;raw&lt;/b&gt;"));
    }

    // ========================================================================
    // TEST 4: Long cells collapse, short cells render inline
    // ========================================================================
    #[test]
    fn test_collapsible() {
        let mut short = String::new();
        render_inline(
            &mut short,
            &Inline::Collapsible {
                id: "c1".into(),
                content: Box::new(Inline::Text("short".into())),
            },
        );
        assert_eq!(short, "short");

        let mut long = String::new();
        render_inline(
            &mut long,
            &Inline::Collapsible {
                id: "c2".into(),
                content: Box::new(Inline::Text("x".repeat(150))),
            },
        );
        assert!(long.starts_with("<details class=\"collapsible\" id=\"c2\">"));
    }

    // ========================================================================
    // TEST 5: Pagination links follow the flags and the window
    // ========================================================================
    #[test]
    fn test_pagination_links() {
        let window = compute_page_window(
            2,
            5,
            2,
            PageFlags {
                has_prev: true,
                has_next: true,
            },
        );
        let query = DashboardQuery::default();
        let href = |t: PageTarget, p: u32| dashboard_href(&query, t, p);
        let html = render_nodes(
            &[ViewNode::Pagination {
                target: PageTarget::SqlAgentLogs,
                window,
            }],
            &href,
        );

        assert!(html.contains("<li class=\"active\"><span>2</span></li>"));
        assert!(html.contains("/?sql_page=1&amp;mcp_page=1&amp;per_page=10&amp;mode=group"));
        assert!(html.contains("/?sql_page=4&amp;"));
        assert!(!html.contains("sql_page=5"));
        assert!(html.contains("&laquo;"));
        assert!(html.contains("&raquo;"));
    }

    // ========================================================================
    // TEST 6: Server page links carry the session
    // ========================================================================
    #[test]
    fn test_server_page_href_carries_session() {
        let session = ExecutionSession {
            server_key: "kocw".into(),
            instruction: "AI 강의".into(),
            correlation_id: Some("req-1".into()),
        };
        assert_eq!(
            server_page_href("kocw", &ServerPageQuery::default(), Some(&session), 3),
            "/mcp/kocw?page=3&per_page=10&instruction=AI%20%EA%B0%95%EC%9D%98&request_id=req-1"
        );
        assert_eq!(
            server_page_href("kocw", &ServerPageQuery::default(), None, 1),
            "/mcp/kocw?page=1&per_page=10"
        );
    }

    // ========================================================================
    // TEST 7: Full pages
    // ========================================================================
    #[test]
    fn test_dashboard_page_sections() {
        let view = DashboardView {
            sql_agent_logs: vec![alert(AlertLevel::Info, "No SQL agent logs.")],
            mcp_logs: vec![alert(AlertLevel::Info, "No MCP server logs.")],
            servers: vec![ViewNode::CardGrid {
                cards: vec![Card {
                    title: "kocw".into(),
                    subtitle: None,
                    badge: None,
                    body: vec![],
                    footer: None,
                    link: Some(Link {
                        href: "/mcp/kocw".into(),
                        text: "Manage".into(),
                    }),
                }],
            }],
        };
        let html = dashboard_page(&view, &DashboardQuery::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>SQL Agent Logs</h2>"));
        assert!(html.contains("<option value=\"group\" selected>"));
        assert!(html.contains("<a href=\"/mcp/kocw\">Manage</a>"));
    }

    // ========================================================================
    // TEST 8: Server page prefills the forms
    // ========================================================================
    #[test]
    fn test_server_page_prefills_forms() {
        let view = ServerPageView {
            server_key: "kocw".into(),
            detail: Some(mcpdash_core::models::ServerDetail {
                server_key: "kocw".into(),
                display_name: Some("Lecture \"search\"".into()),
                ..Default::default()
            }),
            info: vec![],
            logs: vec![],
            results: ExecutionResults::none(),
        };
        let extras = ServerPageExtras {
            session: Some(ExecutionSession::new("kocw", "find lectures")),
            ..Default::default()
        };
        let html = server_page(&view, &ServerPageQuery::default(), &extras);
        assert!(html.contains("value=\"Lecture &quot;search&quot;\""));
        assert!(html.contains("<textarea name=\"instruction\">find lectures</textarea>"));
        assert!(html.contains("action=\"/mcp/kocw/execute\""));
        assert!(html.contains("No execution result."));
    }

    // ========================================================================
    // TEST 9: Unknown servers get no forms
    // ========================================================================
    #[test]
    fn test_unknown_server_has_no_forms() {
        let view = ServerPageView {
            server_key: "ghost".into(),
            detail: None,
            info: vec![alert(AlertLevel::Warning, "Unknown MCP server: ghost")],
            logs: vec![],
            results: ExecutionResults::none(),
        };
        let html = server_page(&view, &ServerPageQuery::default(), &ServerPageExtras::default());
        assert!(!html.contains("<form"));
        assert!(html.contains("Unknown MCP server: ghost"));
    }
}
