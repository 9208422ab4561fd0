// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::ids::RowId;
use crate::record::Record;

/// Selected row ids. May hold ids that the current filter hides; every
/// bulk operation here only ever touches the rows it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<RowId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.selected.iter()
    }

    fn visible_selected<R: Record>(&self, visible: &[&R]) -> usize {
        visible
            .iter()
            .filter(|row| self.selected.contains(row.id()))
            .count()
    }

    pub fn is_all_selected<R: Record>(&self, visible: &[&R]) -> bool {
        !visible.is_empty() && self.visible_selected(visible) == visible.len()
    }

    pub fn is_indeterminate<R: Record>(&self, visible: &[&R]) -> bool {
        let count = self.visible_selected(visible);
        count > 0 && count < visible.len()
    }

    /// Adds or removes exactly the visible ids; ids outside `visible` are untouched.
    pub fn toggle_all<R: Record>(&mut self, visible: &[&R], checked: bool) {
        for row in visible {
            if checked {
                self.selected.insert(row.id().clone());
            } else {
                self.selected.remove(row.id());
            }
        }
    }

    pub fn toggle_one(&mut self, id: &RowId, checked: bool) {
        if checked {
            self.selected.insert(id.clone());
        } else {
            self.selected.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected rows among `rows`, in the order given.
    pub fn pick<'a, R: Record>(&self, rows: &[&'a R]) -> Vec<&'a R> {
        rows.iter()
            .copied()
            .filter(|row| self.selected.contains(row.id()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::ids::RowId;
    use crate::model::{Lead, LeadSource, LeadStage, NewLead};
    use time::{Date, Month};

    fn lead(index: usize, stage: LeadStage) -> Lead {
        Lead::from_new(
            RowId::new(format!("L-{index}")),
            NewLead {
                name: format!("Lead {index}"),
                email: format!("lead{index}@example.com"),
                property_ref: "Pine View".to_owned(),
                source: LeadSource::Website,
                budget: "$1,000".to_owned(),
                stage,
                created_at: Date::from_calendar_date(2025, Month::May, 1).unwrap_or(Date::MIN),
            },
        )
    }

    fn ten_leads() -> Vec<Lead> {
        (0..10)
            .map(|index| {
                let stage = if index % 3 == 0 {
                    LeadStage::Closed
                } else {
                    LeadStage::New
                };
                lead(index, stage)
            })
            .collect()
    }

    #[test]
    fn toggle_all_is_scoped_to_visible_rows() {
        let rows = ten_leads();
        let visible: Vec<&Lead> = rows
            .iter()
            .filter(|row| row.stage == LeadStage::New)
            .take(3)
            .collect();
        let mut selection = Selection::new();

        selection.toggle_all(&visible, true);

        assert_eq!(selection.len(), 3);
        for row in &visible {
            assert!(selection.contains(&row.id));
        }
        assert!(selection.is_all_selected(&visible));
        let everything: Vec<&Lead> = rows.iter().collect();
        assert!(!selection.is_all_selected(&everything));
    }

    #[test]
    fn unchecking_all_keeps_hidden_selection() {
        let rows = ten_leads();
        let mut selection = Selection::new();
        selection.toggle_one(&rows[9].id, true);
        let visible: Vec<&Lead> = rows.iter().take(3).collect();

        selection.toggle_all(&visible, true);
        selection.toggle_all(&visible, false);

        assert_eq!(selection.len(), 1);
        assert!(selection.contains(&rows[9].id));
    }

    #[test]
    fn tri_state_flags() {
        let rows = ten_leads();
        let visible: Vec<&Lead> = rows.iter().take(4).collect();
        let mut selection = Selection::new();
        assert!(!selection.is_all_selected(&visible));
        assert!(!selection.is_indeterminate(&visible));

        selection.toggle_one(&rows[1].id, true);
        assert!(selection.is_indeterminate(&visible));
        assert!(!selection.is_all_selected(&visible));

        selection.toggle_all(&visible, true);
        assert!(selection.is_all_selected(&visible));
        assert!(!selection.is_indeterminate(&visible));
    }

    #[test]
    fn empty_visible_set_is_never_all_selected() {
        let selection = Selection::new();
        let visible: Vec<&Lead> = Vec::new();
        assert!(!selection.is_all_selected(&visible));
        assert!(!selection.is_indeterminate(&visible));
    }

    #[test]
    fn pick_preserves_row_order() {
        let rows = ten_leads();
        let all: Vec<&Lead> = rows.iter().collect();
        let mut selection = Selection::new();
        selection.toggle_one(&rows[7].id, true);
        selection.toggle_one(&rows[2].id, true);
        let picked: Vec<_> = selection
            .pick(&all)
            .into_iter()
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(picked, vec!["L-2", "L-7"]);
        selection.clear();
        assert!(selection.is_empty());
    }
}
