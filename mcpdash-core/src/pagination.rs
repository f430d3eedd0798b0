use serde::{Deserialize, Serialize};

use crate::error::DashError;
use crate::record::{normalize_all, LogSchema, RawLogRecord};

pub const DEFAULT_PAGE_RADIUS: u32 = 2;

/// Prev/next availability as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageFlags {
    pub has_prev: bool,
    pub has_next: bool,
}

/// The page numbers a pagination control shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: u32,
    pub pages: Vec<u32>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// A control is only drawn when there is more than one page.
    pub fn is_visible(&self) -> bool {
        !self.pages.is_empty()
    }

    /// `has_prev` stays exactly as the backend sent it; the `current > 1`
    /// check only keeps a page-0 link from being built.
    pub fn prev_page(&self) -> Option<u32> {
        (self.has_prev && self.current > 1).then(|| self.current - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_next.then(|| self.current + 1)
    }
}

/// Pages `[current - radius, current + radius]` clipped to `[1, total]`.
///
/// `flags` are carried through unchanged; the backend is the authority on
/// whether a previous/next page exists. A `current` outside `[1, total]` is
/// clamped.
pub fn compute_page_window(current: u32, total: u32, radius: u32, flags: PageFlags) -> PageWindow {
    let pages = if total <= 1 {
        Vec::new()
    } else {
        let clamped = current.clamp(1, total);
        if clamped != current {
            tracing::warn!(current, total, "Page number out of range, clamping");
        }
        let start = clamped.saturating_sub(radius).max(1);
        let end = clamped.saturating_add(radius).min(total);
        (start..=end).collect()
    };

    PageWindow {
        current: if total >= 1 { current.clamp(1, total) } else { current.max(1) },
        pages,
        has_prev: flags.has_prev,
        has_next: flags.has_next,
    }
}

/// Paginated log payload as the backend sends it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PagePayload {
    #[serde(default)]
    pub logs: Vec<RawLogRecord>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default, alias = "total")]
    pub total_count: u64,
    #[serde(default = "first_page", alias = "page")]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl Default for PagePayload {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            request_id: None,
            total_count: 0,
            current_page: 1,
            per_page: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

fn first_page() -> u32 {
    1
}

/// A normalized page of log records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub per_page: u32,
    pub has_prev: bool,
    pub has_next: bool,
    /// Set on request-group pages, one correlation id per page.
    pub correlation_id: Option<String>,
}

impl<R> Page<R> {
    pub fn flags(&self) -> PageFlags {
        PageFlags {
            has_prev: self.has_prev,
            has_next: self.has_next,
        }
    }

    pub fn window(&self, radius: u32) -> PageWindow {
        compute_page_window(self.current_page, self.total_pages, radius, self.flags())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn normalize_page<R: LogSchema>(payload: PagePayload) -> Result<Page<R>, DashError> {
    Ok(Page {
        items: normalize_all(payload.logs)?,
        current_page: payload.current_page,
        total_pages: payload.total_pages,
        total_count: payload.total_count,
        per_page: payload.per_page,
        has_prev: payload.has_prev,
        has_next: payload.has_next,
        correlation_id: payload.request_id.filter(|id| !id.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::McpLogRecord;
    use serde_json::json;

    fn no_flags() -> PageFlags {
        PageFlags::default()
    }

    // ========================================================================
    // TEST 1: A single page has no window
    // ========================================================================
    #[test]
    fn test_single_page_has_no_window() {
        let w = compute_page_window(1, 1, 2, no_flags());
        assert!(w.pages.is_empty());
        assert!(!w.has_prev);
        assert!(!w.has_next);
        assert!(!w.is_visible());
    }

    // ========================================================================
    // TEST 2: Zero pages have no window
    // ========================================================================
    #[test]
    fn test_zero_pages_has_no_window() {
        let w = compute_page_window(1, 0, 2, no_flags());
        assert!(w.pages.is_empty());
        assert_eq!(w.current, 1);
    }

    // ========================================================================
    // TEST 3: Window around a middle page
    // ========================================================================
    #[test]
    fn test_middle_window() {
        let w = compute_page_window(5, 10, 2, no_flags());
        assert_eq!(w.pages, vec![3, 4, 5, 6, 7]);
    }

    // ========================================================================
    // TEST 4: Window clipped at start and end
    // ========================================================================
    #[test]
    fn test_window_clipped_at_start_and_end() {
        assert_eq!(compute_page_window(1, 10, 2, no_flags()).pages, vec![1, 2, 3]);
        assert_eq!(compute_page_window(10, 10, 2, no_flags()).pages, vec![8, 9, 10]);
        assert_eq!(compute_page_window(2, 3, 2, no_flags()).pages, vec![1, 2, 3]);
    }

    // ========================================================================
    // TEST 5: Flags are not recomputed
    // ========================================================================
    #[test]
    fn test_flags_are_not_recomputed() {
        let flags = PageFlags {
            has_prev: false,
            has_next: true,
        };
        // Page 5 of 10 with has_prev=false from the backend stays false.
        let w = compute_page_window(5, 10, 2, flags);
        assert!(!w.has_prev);
        assert!(w.has_next);
        assert_eq!(w.prev_page(), None);
        assert_eq!(w.next_page(), Some(6));
    }

    // ========================================================================
    // TEST 6: has_prev is kept on the first page
    // ========================================================================
    #[test]
    fn test_prev_flag_kept_on_first_page() {
        let flags = PageFlags {
            has_prev: true,
            has_next: false,
        };
        let w = compute_page_window(1, 3, 2, flags);
        assert!(w.has_prev);
        assert_eq!(w.prev_page(), None);

        let w = compute_page_window(2, 3, 2, flags);
        assert_eq!(w.prev_page(), Some(1));
    }

    // ========================================================================
    // TEST 7: Out-of-range current page is clamped
    // ========================================================================
    #[test]
    fn test_out_of_range_current_is_clamped() {
        let w = compute_page_window(15, 10, 2, no_flags());
        assert_eq!(w.current, 10);
        assert_eq!(w.pages, vec![8, 9, 10]);

        let w = compute_page_window(0, 10, 2, no_flags());
        assert_eq!(w.current, 1);
        assert_eq!(w.pages, vec![1, 2, 3]);
    }

    // ========================================================================
    // TEST 8: Backend failure default decodes
    // ========================================================================
    #[test]
    fn test_payload_decodes_backend_failure_default() {
        let payload: PagePayload =
            serde_json::from_value(json!({"logs": [], "total": 0, "page": 3, "per_page": 1}))
                .unwrap();
        assert_eq!(payload.current_page, 3);
        assert_eq!(payload.total_pages, 0);
        assert!(payload.logs.is_empty());
    }

    // ========================================================================
    // TEST 9: Payload to typed page
    // ========================================================================
    #[test]
    fn test_normalize_page_end_to_end() {
        let payload: PagePayload = serde_json::from_value(json!({
            "logs": [[1, "srv", "Name", "d", "instr", "p", "answer", "2024-01-01T00:00:00Z", null, "req-1"]],
            "total_pages": 1,
            "has_prev": false,
            "has_next": false
        }))
        .unwrap();
        let page: Page<McpLogRecord> = normalize_page(payload).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].correlation_id.as_deref(), Some("req-1"));
        assert!(!page.window(DEFAULT_PAGE_RADIUS).is_visible());
    }
}
