use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use certwatch_core::{AppError, AppResult};
use certwatch_domain::{
    CertificationRule, EligibilityId, Employee, EmployeeEligibility, EmployeeId, RuleId,
    remaining_until,
};

use crate::eligibility_ports::{
    EligibilityListQuery, EligibilityListingRepository, EligibilityPage, EligibilityRowQuery,
    EligibilityView, RefreshScope, SourceSnapshotRepository,
};

use super::EligibilityService;

const MAX_PAGE_SIZE: usize = 500;

impl EligibilityService {
    /// Lists live eligibility rows joined with display fields.
    pub async fn list_eligibility(
        &self,
        query: EligibilityListQuery,
    ) -> AppResult<EligibilityPage> {
        if query.size == 0 || query.size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        if let Some(listing) = &self.listing {
            return self.list_from_store(listing.as_ref(), query).await;
        }

        let rows = self
            .repository
            .list_rows(EligibilityRowQuery {
                employee_ids: query.employee_ids.clone(),
                include_tombstoned: false,
                statuses: query.statuses.clone(),
                sources: query.sources.clone(),
            })
            .await?;
        let directory = DisplayDirectory::load(self.sources.as_ref(), RefreshScope::All).await?;
        let today = self.clock.today();
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase);

        let mut views: Vec<EligibilityView> = rows
            .iter()
            .map(|row| directory.project(row, today))
            .filter(|view| matches_display_filters(&query, view, search.as_deref()))
            .collect();
        views.sort_by(default_order);

        let total = views.len();
        let items = views
            .into_iter()
            .skip(query.page.saturating_mul(query.size))
            .take(query.size)
            .collect();

        Ok(EligibilityPage {
            items,
            total,
            page: query.page,
            size: query.size,
        })
    }

    async fn list_from_store(
        &self,
        listing: &dyn EligibilityListingRepository,
        query: EligibilityListQuery,
    ) -> AppResult<EligibilityPage> {
        let listed = listing.list_page(&query).await?;
        let today = self.clock.today();

        Ok(EligibilityPage {
            items: listed
                .rows
                .iter()
                .map(|entry| {
                    project_view(&entry.row, entry.employee.as_ref(), entry.rule.as_ref(), today)
                })
                .collect(),
            total: listed.total,
            page: query.page,
            size: query.size,
        })
    }

    /// Returns one eligibility row, live or tombstoned, with display fields.
    pub async fn get_eligibility(&self, id: EligibilityId) -> AppResult<EligibilityView> {
        let row = self.require_row(id).await?;
        self.project_row(&row).await
    }

    pub(super) async fn project_row(
        &self,
        row: &EmployeeEligibility,
    ) -> AppResult<EligibilityView> {
        let directory = DisplayDirectory::load(
            self.sources.as_ref(),
            RefreshScope::Employee(row.employee_id()),
        )
        .await?;

        Ok(directory.project(row, self.clock.today()))
    }
}

struct DisplayDirectory {
    employees: HashMap<EmployeeId, Employee>,
    rules: HashMap<RuleId, CertificationRule>,
}

impl DisplayDirectory {
    async fn load(sources: &dyn SourceSnapshotRepository, scope: RefreshScope) -> AppResult<Self> {
        let employees = sources.list_employees(scope).await?;
        let rules = sources.list_rules().await?;

        Ok(Self {
            employees: employees
                .into_iter()
                .map(|employee| (employee.id, employee))
                .collect(),
            rules: rules.into_iter().map(|rule| (rule.id, rule)).collect(),
        })
    }

    fn project(&self, row: &EmployeeEligibility, today: NaiveDate) -> EligibilityView {
        project_view(
            row,
            self.employees.get(&row.employee_id()),
            self.rules.get(&row.rule_id()),
            today,
        )
    }
}

fn project_view(
    row: &EmployeeEligibility,
    employee: Option<&Employee>,
    rule: Option<&CertificationRule>,
    today: NaiveDate,
) -> EligibilityView {
    let terms = row.terms();

    EligibilityView {
        id: row.id(),
        employee_id: row.employee_id(),
        nip: employee.map(|value| value.nip.clone()),
        employee_name: employee.map(|value| value.name.clone()),
        job_position_id: employee.and_then(Employee::job_position_id),
        job_title: employee.and_then(|value| value.job_title().map(str::to_owned)),
        join_date: employee.and_then(|value| value.join_date),
        rule_id: row.rule_id(),
        certification_code: rule.map(|value| value.certification_code.clone()),
        certification_name: rule.map(|value| value.certification_name.clone()),
        level_name: rule.and_then(|value| value.level_name.clone()),
        level: rule.and_then(|value| value.level),
        sub_field_code: rule.and_then(|value| value.sub_field_code.clone()),
        sub_field_name: rule.and_then(|value| value.sub_field_name.clone()),
        status: row.status(),
        source: row.source(),
        due_date: row.due_date(),
        is_active: row.is_active(),
        deleted_at: row.deleted_at(),
        mandatory_by: row.mandatory_by(employee.and_then(|value| value.join_date)),
        validity_months: terms.validity_months,
        reminder_months: terms.reminder_months,
        remaining: row
            .due_date()
            .map(|due_date| remaining_until(today, due_date)),
        created_at: row.created_at(),
        updated_at: row.updated_at(),
    }
}

fn matches_display_filters(
    query: &EligibilityListQuery,
    view: &EligibilityView,
    search: Option<&str>,
) -> bool {
    let job_matches = query.job_position_ids.is_empty()
        || view
            .job_position_id
            .is_some_and(|job_position_id| query.job_position_ids.contains(&job_position_id));
    let code_matches = query.certification_codes.is_empty()
        || view.certification_code.as_ref().is_some_and(|code| {
            query
                .certification_codes
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(code))
        });
    let level_matches = query.levels.is_empty()
        || view
            .level
            .is_some_and(|level| query.levels.contains(&level));
    let sub_field_matches = query.sub_field_codes.is_empty()
        || view.sub_field_code.as_ref().is_some_and(|code| {
            query
                .sub_field_codes
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(code))
        });

    job_matches
        && code_matches
        && level_matches
        && sub_field_matches
        && search.is_none_or(|needle| matches_search(view, needle))
}

fn matches_search(view: &EligibilityView, needle: &str) -> bool {
    [
        view.nip.as_deref(),
        view.employee_name.as_deref(),
        view.job_title.as_deref(),
        view.certification_code.as_deref(),
        view.certification_name.as_deref(),
        view.sub_field_name.as_deref(),
        Some(view.source.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

fn default_order(left: &EligibilityView, right: &EligibilityView) -> Ordering {
    nulls_last(&left.job_title, &right.job_title)
        .then_with(|| nulls_last(&left.certification_code, &right.certification_code))
        .then_with(|| nulls_last(&left.level, &right.level))
        .then_with(|| nulls_last(&left.sub_field_code, &right.sub_field_code))
        .then_with(|| left.status.cmp(&right.status))
        .then_with(|| left.employee_id.cmp(&right.employee_id))
        .then_with(|| left.rule_id.cmp(&right.rule_id))
        .then_with(|| left.source.cmp(&right.source))
}

fn nulls_last<T: Ord>(left: &Option<T>, right: &Option<T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
