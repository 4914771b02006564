use certwatch_application::{
    EligibilityChange, EligibilityChangeKind, EligibilityRepository, EligibilityRowQuery,
    EligibilityStatusUpdate, RefreshScope,
};
use certwatch_core::AppError;
use certwatch_domain::{
    EligibilitySource, EligibilityStatus, EmployeeEligibility, EmployeeId, RequirementKey, RuleId,
    RuleTerms,
};
use chrono::{Duration, NaiveDate, Utc};

use super::InMemoryEligibilityRepository;

fn row(employee_id: i64, rule_id: i64, source: EligibilitySource) -> EmployeeEligibility {
    EmployeeEligibility::new(
        EmployeeId::new(employee_id),
        RequirementKey {
            rule_id: RuleId::new(rule_id),
            source,
        },
        RuleTerms {
            validity_months: 12,
            reminder_months: 1,
            required_after_join_months: None,
        },
        Utc::now(),
    )
}

fn change(kind: EligibilityChangeKind, row: &EmployeeEligibility) -> EligibilityChange {
    EligibilityChange {
        kind,
        row: row.clone(),
    }
}

#[tokio::test]
async fn created_rows_are_listed_by_scope() {
    let repository = InMemoryEligibilityRepository::new();
    let left = row(100, 1, EligibilitySource::ByJob);
    let right = row(101, 1, EligibilitySource::ByJob);

    let written = repository
        .apply_changes(vec![
            change(EligibilityChangeKind::Created, &left),
            change(EligibilityChangeKind::Created, &right),
        ])
        .await;
    assert!(written.is_ok());
    assert_eq!(written.unwrap_or_default(), vec![left.id(), right.id()]);

    let scoped = repository
        .list_rows(EligibilityRowQuery::live_in_scope(RefreshScope::Employee(
            EmployeeId::new(101),
        )))
        .await;
    assert!(scoped.is_ok());
    assert_eq!(scoped.unwrap_or_default(), vec![right]);
}

#[tokio::test]
async fn second_live_row_for_a_key_folds_into_the_first() {
    let repository = InMemoryEligibilityRepository::new();
    let first = row(100, 1, EligibilitySource::ByJob);
    let other_source = row(100, 1, EligibilitySource::ByName);
    assert!(
        repository
            .apply_changes(vec![
                change(EligibilityChangeKind::Created, &first),
                change(EligibilityChangeKind::Created, &other_source),
            ])
            .await
            .is_ok()
    );

    let duplicate = row(100, 1, EligibilitySource::ByJob);
    let written = repository
        .apply_changes(vec![change(EligibilityChangeKind::Created, &duplicate)])
        .await;
    assert!(written.is_ok());
    assert_eq!(written.unwrap_or_default(), vec![first.id()]);

    let live = repository.list_rows(EligibilityRowQuery::default()).await;
    assert!(live.is_ok());
    assert_eq!(live.unwrap_or_default().len(), 2);
}

#[tokio::test]
async fn failed_batch_leaves_no_partial_writes() {
    let repository = InMemoryEligibilityRepository::new();
    let fresh = row(100, 1, EligibilitySource::ByJob);
    let unknown = row(100, 2, EligibilitySource::ByJob);

    let result = repository
        .apply_changes(vec![
            change(EligibilityChangeKind::Created, &fresh),
            change(EligibilityChangeKind::TermsRefreshed, &unknown),
        ])
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let all = repository
        .list_rows(EligibilityRowQuery::all_in_scope(RefreshScope::All))
        .await;
    assert!(all.is_ok());
    assert!(all.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn status_updates_apply_to_live_rows_only() {
    let repository = InMemoryEligibilityRepository::new();
    let live = row(100, 1, EligibilitySource::ByJob);
    let mut tombstoned = row(100, 2, EligibilitySource::ByJob);
    assert!(
        repository
            .apply_changes(vec![
                change(EligibilityChangeKind::Created, &live),
                change(EligibilityChangeKind::Created, &tombstoned),
            ])
            .await
            .is_ok()
    );
    tombstoned.tombstone(Utc::now() + Duration::seconds(1));
    assert!(
        repository
            .apply_changes(vec![change(EligibilityChangeKind::Tombstoned, &tombstoned)])
            .await
            .is_ok()
    );

    let due_date = NaiveDate::from_ymd_opt(2024, 6, 1);
    let updates = [live.id(), tombstoned.id()]
        .into_iter()
        .map(|id| EligibilityStatusUpdate {
            id,
            status: EligibilityStatus::Due,
            due_date,
            updated_at: Utc::now(),
        })
        .collect();
    let saved = repository.save_statuses(updates).await;
    assert!(saved.is_ok());
    assert_eq!(saved.unwrap_or_default(), 1);

    let stored = repository.find_row(live.id()).await;
    assert!(stored.is_ok());
    let stored = stored.unwrap_or_default();
    assert!(
        stored.is_some_and(|row| row.status() == EligibilityStatus::Due
            && row.due_date() == due_date)
    );

    let stored = repository.find_row(tombstoned.id()).await;
    assert!(stored.is_ok());
    assert!(
        stored
            .unwrap_or_default()
            .is_some_and(|row| row.status() == EligibilityStatus::NotYetCertified)
    );
}
