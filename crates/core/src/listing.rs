//! List query parsing for `GET /todos` (`?priority=&sort=&order=`).

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::todo::{Priority, Todo};

/// Field a todo list can be ordered by. Names match the JSON field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Priority,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::DueDate,
        SortField::Title,
        SortField::Priority,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::DueDate => "dueDate",
            SortField::Title => "title",
            SortField::Priority => "priority",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }
}

/// Sort direction. Defaults to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

/// A validated list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub priority: Option<Priority>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl ListQuery {
    /// Parse raw query parameters. Empty strings count as absent.
    pub fn parse(
        priority: Option<&str>,
        sort: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self, CoreError> {
        let mut errors = Vec::new();
        let mut query = ListQuery::default();

        if let Some(raw) = priority.filter(|s| !s.is_empty()) {
            match raw.parse::<Priority>() {
                Ok(p) => query.priority = Some(p),
                Err(_) => errors.push(format!(
                    "priority filter must be one of: {}",
                    Priority::options()
                )),
            }
        }

        if let Some(raw) = sort.filter(|s| !s.is_empty()) {
            match SortField::parse(raw) {
                Some(field) => query.sort = field,
                None => errors.push(format!(
                    "sort must be one of: {}",
                    SortField::ALL
                        .iter()
                        .map(|f| f.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            }
        }

        if let Some(raw) = order.filter(|s| !s.is_empty()) {
            match SortOrder::parse(raw) {
                Some(o) => query.order = o,
                None => errors.push("order must be 'asc' or 'desc'".to_string()),
            }
        }

        if errors.is_empty() {
            Ok(query)
        } else {
            Err(CoreError::Validation(errors))
        }
    }

    /// Whether a todo passes the priority filter.
    pub fn matches(&self, todo: &Todo) -> bool {
        self.priority.map_or(true, |p| todo.priority == p)
    }

    /// Compare two todos under this query's ordering.
    ///
    /// Missing due dates sort last in both directions; ties break by id.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let primary = match self.sort {
            SortField::CreatedAt => self.directed(a.created_at.cmp(&b.created_at)),
            SortField::UpdatedAt => self.directed(a.updated_at.cmp(&b.updated_at)),
            SortField::Title => self.directed(a.title.cmp(&b.title)),
            SortField::Priority => self.directed(a.priority.as_str().cmp(b.priority.as_str())),
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    fn directed(&self, ord: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}
