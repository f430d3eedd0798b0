use serde::Serialize;

use crate::record::LogSchema;

/// Records of one logical execution, in the order the backend returned them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationGroup<R> {
    pub correlation_id: Option<String>,
    pub items: Vec<R>,
}

/// How a group is laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLayout {
    /// Informational empty state.
    Empty,
    /// One flat card, no accordion.
    Single,
    /// Accordion with only `open` expanded.
    Accordion { open: usize },
}

impl<R> CorrelationGroup<R> {
    pub fn layout(&self) -> GroupLayout {
        match self.items.len() {
            0 => GroupLayout::Empty,
            1 => GroupLayout::Single,
            _ => GroupLayout::Accordion { open: 0 },
        }
    }

    /// Label the group with an id the caller already knows (e.g. the one the
    /// execute action returned). Falls back to the records' own id.
    pub fn with_correlation_hint(mut self, hint: Option<&str>) -> Self {
        if let Some(id) = hint.filter(|id| !id.is_empty()) {
            self.correlation_id = Some(id.to_string());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Group records that the backend already filtered to one correlation id.
///
/// The id comes from the first record. Order is preserved as-is: for SQL agent
/// groups the backend sorts by ascending step order.
pub fn group_by_correlation<R: LogSchema>(records: Vec<R>) -> CorrelationGroup<R> {
    let correlation_id = records
        .first()
        .and_then(|r| r.correlation_id())
        .map(str::to_string);

    if let Some(id) = correlation_id.as_deref() {
        let strays = records
            .iter()
            .filter(|r| r.correlation_id().is_some_and(|other| other != id))
            .count();
        if strays > 0 {
            tracing::warn!(correlation_id = id, strays, "Group contains records from other executions");
        }
    }

    CorrelationGroup {
        correlation_id,
        items: records,
    }
}
