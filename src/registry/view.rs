//! Filtering and sorting of the dashboard table

use std::cmp::Ordering;

use crate::models::{Gender, Patient, PaymentType};

/// Sortable table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// The "Name" column sorts on first name only
    FirstName,
    DateOfBirth,
    Gender,
    PaymentType,
    PaymentAmount,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::FirstName,
        SortColumn::DateOfBirth,
        SortColumn::Gender,
        SortColumn::PaymentType,
        SortColumn::PaymentAmount,
    ];

    /// Column header text
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::FirstName => "Name",
            SortColumn::DateOfBirth => "Date of Birth",
            SortColumn::Gender => "Gender",
            SortColumn::PaymentType => "Payment Type",
            SortColumn::PaymentAmount => "Payment Amount",
        }
    }

    fn key<'a>(&self, patient: &'a Patient) -> SortKey<'a> {
        match self {
            SortColumn::FirstName => SortKey::Text(&patient.first_name),
            SortColumn::DateOfBirth => SortKey::Text(&patient.date_of_birth),
            SortColumn::Gender => SortKey::Text(patient.gender.as_str()),
            SortColumn::PaymentType => SortKey::Text(patient.payment_type.as_str()),
            SortColumn::PaymentAmount => SortKey::Number(patient.payment_amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "▲",
            SortOrder::Descending => "▼",
        }
    }
}

/// Raw field value used by the comparator
enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

impl SortKey<'_> {
    /// Plain less-than/greater-than; incomparable values count as equal
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        }
    }
}

/// Search, filter and sort selections of the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search_term: String,
    pub gender_filter: Option<Gender>,
    pub payment_filter: Option<PaymentType>,
    pub sort: Option<(SortColumn, SortOrder)>,
}

impl ViewState {
    /// Column header click: same ascending column flips to descending,
    /// anything else sorts ascending on `column`.
    pub fn toggle_sort(&mut self, column: SortColumn) {
        let order = match self.sort {
            Some((current, SortOrder::Ascending)) if current == column => SortOrder::Descending,
            _ => SortOrder::Ascending,
        };
        self.sort = Some((column, order));
    }

    pub fn sort_by(&mut self, column: SortColumn, order: SortOrder) {
        self.sort = Some((column, order));
    }

    /// Arrow shown next to a column header
    pub fn sort_indicator(&self, column: SortColumn) -> &'static str {
        match self.sort {
            Some((current, order)) if current == column => order.arrow(),
            _ => "",
        }
    }

    /// Cycle None -> Male -> Female -> Other -> None
    pub fn cycle_gender_filter(&mut self) {
        self.gender_filter = cycle(self.gender_filter, &Gender::ALL);
    }

    /// Cycle None -> Online -> Cash -> None
    pub fn cycle_payment_filter(&mut self) {
        self.payment_filter = cycle(self.payment_filter, &PaymentType::ALL);
    }

    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.gender_filter = None;
        self.payment_filter = None;
    }

    /// Whether a patient passes search and both filters
    pub fn matches(&self, patient: &Patient) -> bool {
        let term = self.search_term.to_lowercase();
        let name_match = patient.first_name.to_lowercase().contains(&term)
            || patient.last_name.to_lowercase().contains(&term);

        name_match
            && self.gender_filter.map_or(true, |g| patient.gender == g)
            && self.payment_filter.map_or(true, |p| patient.payment_type == p)
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().copied(),
        Some(value) => options
            .iter()
            .position(|o| *o == value)
            .and_then(|i| options.get(i + 1))
            .copied(),
    }
}

/// Filtered-then-sorted view of `patients`. Equal keys keep list order.
pub fn visible_patients<'a>(patients: &'a [Patient], view: &ViewState) -> Vec<&'a Patient> {
    let mut visible: Vec<&Patient> = patients.iter().filter(|p| view.matches(p)).collect();

    if let Some((column, order)) = view.sort {
        visible.sort_by(|a, b| {
            let ordering = column.key(a).compare(&column.key(b));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::patient;

    fn ann_and_bob() -> Vec<Patient> {
        vec![
            patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash),
            patient("2", "Bob", "Lee", Gender::Male, PaymentType::Online),
        ]
    }

    fn names(visible: &[&Patient]) -> Vec<String> {
        visible.iter().map(|p| p.full_name()).collect()
    }

    #[test]
    fn test_search_matches_first_or_last_name() {
        let patients = ann_and_bob();
        let mut view = ViewState::default();

        view.search_term = "lee".to_string();
        assert_eq!(names(&visible_patients(&patients, &view)), ["Ann Lee", "Bob Lee"]);

        view.search_term = "ANN".to_string();
        assert_eq!(names(&visible_patients(&patients, &view)), ["Ann Lee"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let patients = ann_and_bob();

        let view = ViewState {
            gender_filter: Some(Gender::Female),
            ..Default::default()
        };
        assert_eq!(names(&visible_patients(&patients, &view)), ["Ann Lee"]);

        let view = ViewState {
            search_term: "lee".to_string(),
            payment_filter: Some(PaymentType::Online),
            ..Default::default()
        };
        assert_eq!(names(&visible_patients(&patients, &view)), ["Bob Lee"]);

        let view = ViewState {
            search_term: "ann".to_string(),
            payment_filter: Some(PaymentType::Online),
            ..Default::default()
        };
        assert!(visible_patients(&patients, &view).is_empty());
    }

    #[test]
    fn test_toggle_sort_transitions() {
        let mut view = ViewState::default();

        view.toggle_sort(SortColumn::FirstName);
        assert_eq!(view.sort, Some((SortColumn::FirstName, SortOrder::Ascending)));

        view.toggle_sort(SortColumn::FirstName);
        assert_eq!(view.sort, Some((SortColumn::FirstName, SortOrder::Descending)));

        view.toggle_sort(SortColumn::PaymentAmount);
        assert_eq!(view.sort, Some((SortColumn::PaymentAmount, SortOrder::Ascending)));

        view.toggle_sort(SortColumn::PaymentAmount);
        view.toggle_sort(SortColumn::PaymentAmount);
        assert_eq!(view.sort, Some((SortColumn::PaymentAmount, SortOrder::Ascending)));
    }

    #[test]
    fn test_sort_uses_raw_values() {
        let mut patients = ann_and_bob();
        patients[0].payment_amount = 900.0;
        patients[1].payment_amount = 80.0;
        patients.push(patient("3", "carl", "Zed", Gender::Other, PaymentType::Cash));
        patients[2].payment_amount = 100.0;

        let mut view = ViewState::default();
        view.toggle_sort(SortColumn::PaymentAmount);
        assert_eq!(
            names(&visible_patients(&patients, &view)),
            ["Bob Lee", "carl Zed", "Ann Lee"]
        );

        // Byte-wise comparison puts lowercase names after uppercase ones.
        view.toggle_sort(SortColumn::FirstName);
        assert_eq!(
            names(&visible_patients(&patients, &view)),
            ["Ann Lee", "Bob Lee", "carl Zed"]
        );
        view.toggle_sort(SortColumn::FirstName);
        assert_eq!(
            names(&visible_patients(&patients, &view)),
            ["carl Zed", "Bob Lee", "Ann Lee"]
        );
    }

    #[test]
    fn test_equal_keys_keep_list_order() {
        let patients = vec![
            patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash),
            patient("2", "Bob", "Lee", Gender::Male, PaymentType::Cash),
            patient("3", "Cid", "Lee", Gender::Male, PaymentType::Online),
        ];
        let mut view = ViewState::default();
        view.toggle_sort(SortColumn::PaymentType);

        assert_eq!(
            names(&visible_patients(&patients, &view)),
            ["Ann Lee", "Bob Lee", "Cid Lee"]
        );
    }

    #[test]
    fn test_sort_indicator_marks_only_sorted_column() {
        let mut view = ViewState::default();
        assert_eq!(view.sort_indicator(SortColumn::Gender), "");

        view.toggle_sort(SortColumn::Gender);
        let ascending = view.sort_indicator(SortColumn::Gender);
        view.toggle_sort(SortColumn::Gender);

        assert_eq!(ascending, "▲");
        assert_eq!(view.sort_indicator(SortColumn::Gender), "▼");
        assert_eq!(view.sort_indicator(SortColumn::DateOfBirth), "");
    }

    #[test]
    fn test_filter_cycling() {
        let mut view = ViewState::default();
        view.cycle_gender_filter();
        assert_eq!(view.gender_filter, Some(Gender::Male));
        view.cycle_gender_filter();
        view.cycle_gender_filter();
        assert_eq!(view.gender_filter, Some(Gender::Other));
        view.cycle_gender_filter();
        assert_eq!(view.gender_filter, None);

        view.cycle_payment_filter();
        view.cycle_payment_filter();
        assert_eq!(view.payment_filter, Some(PaymentType::Cash));
        view.cycle_payment_filter();
        assert_eq!(view.payment_filter, None);
    }
}
