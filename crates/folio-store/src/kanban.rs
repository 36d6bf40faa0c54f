//! Kanban view of job applications: one column per status, in the fixed
//! order of [`JobStatus::ALL`].

use folio_common::models::{Document, JobApplication, JobStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub status: JobStatus,
    pub items: Vec<Document<JobApplication>>,
}

impl Column {
    pub fn title(&self) -> &'static str {
        self.status.label()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    /// Group applications by status. Within a column the input order is kept.
    pub fn group(applications: &[Document<JobApplication>]) -> Self {
        let columns = JobStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                items: applications
                    .iter()
                    .filter(|a| a.status == status)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, status: JobStatus) -> Option<&Column> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }
}

/// Result of dragging a card to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Moved(Box<Document<JobApplication>>),
    /// Already in that column; nothing was sent
    Unchanged,
    /// Another move is still in flight; nothing was sent
    Busy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn app(id: &str, status: JobStatus) -> Document<JobApplication> {
        Document {
            id: id.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            data: JobApplication { company: id.into(), status, ..Default::default() },
        }
    }

    #[test]
    fn columns_follow_status_order() {
        let board = Board::group(&[
            app("a", JobStatus::Offer),
            app("b", JobStatus::Wishlist),
            app("c", JobStatus::Offer),
        ]);
        let titles: Vec<_> = board.columns.iter().map(Column::title).collect();
        assert_eq!(titles, vec!["Wishlist", "Applied", "Interview", "Offer", "Rejected", "Accepted"]);

        let offers = board.column(JobStatus::Offer).unwrap();
        assert_eq!(offers.items.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert!(board.column(JobStatus::Applied).unwrap().is_empty());
        assert_eq!(board.total(), 3);
    }
}
