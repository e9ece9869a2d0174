//! End-to-end tests for the requisition lifecycle: folio allocation, line
//! editing, the draft/required/approved state machine, approval rules, and
//! the administrative reset.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use common::TestApp;
use rust_decimal_macros::dec;
use uuid::Uuid;

use warehouse_req_api::{
    entities::requisition::RequisitionStatus,
    errors::ServiceError,
    services::requisitions::{UpdateRequisitionDates, UpdateRequisitionLine},
};

#[tokio::test]
async fn folios_are_allocated_in_sequence() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;

    let first = app.create_draft(dest.id).await;
    let second = app.create_draft(dest.id).await;

    assert_eq!(first.folio, "WR/00001");
    assert_eq!(second.folio, "WR/00002");

    assert_eq!(first.status, RequisitionStatus::Draft);
    assert_eq!(first.claimant_id, app.current_actor());
    assert_eq!(first.approver_id, None);
    assert!(!first.ordered);
    assert!(!first.picked);
    assert_eq!(first.version, 1);
}

#[tokio::test]
async fn explicit_folio_must_be_unused() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;

    let mut input = app.requisition_input(dest.id);
    input.folio = Some("CUSTOM-7".to_string());
    let created = app
        .state
        .services
        .requisitions
        .create_requisition(input.clone())
        .await
        .expect("create requisition with explicit folio");
    assert_eq!(created.folio, "CUSTOM-7");

    let err = app
        .state
        .services
        .requisitions
        .create_requisition(input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The sequence is untouched by explicit folios.
    let sequenced = app.create_draft(dest.id).await;
    assert_eq!(sequenced.folio, "WR/00001");
}

#[tokio::test]
async fn lookup_by_folio() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let created = app.create_draft(dest.id).await;

    let found = app
        .state
        .services
        .requisitions
        .get_requisition_by_folio(&created.folio)
        .await
        .expect("find requisition by folio");
    assert_eq!(found.id, created.id);

    let err = app
        .state
        .services
        .requisitions
        .get_requisition_by_folio("WR/99999")
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn date_window_is_enforced_on_create_and_reschedule() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let today = Utc::now().date_naive();

    let mut input = app.requisition_input(dest.id);
    input.date_required = Some(today - Duration::days(1));
    let err = app
        .state
        .services
        .requisitions
        .create_requisition(input)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let requisition = app.create_draft(dest.id).await;
    let err = app
        .state
        .services
        .requisitions
        .update_dates(
            requisition.id,
            UpdateRequisitionDates {
                date_requested: None,
                date_required: Some(today - Duration::days(3)),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    // A consistent window is accepted and bumps the version.
    let rescheduled = app
        .state
        .services
        .requisitions
        .update_dates(
            requisition.id,
            UpdateRequisitionDates {
                date_requested: Some(today + Duration::days(1)),
                date_required: Some(today + Duration::days(10)),
            },
        )
        .await
        .expect("reschedule requisition");
    assert_eq!(rescheduled.date_requested, today + Duration::days(1));
    assert_eq!(rescheduled.date_required, Some(today + Duration::days(10)));
    assert_eq!(rescheduled.version, requisition.version + 1);
}

#[tokio::test]
async fn line_numbers_follow_submission_order() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item_a = app.seed_item("ITEM-A", dec!(10.00)).await;
    let item_b = app.seed_item("ITEM-B", dec!(20.00)).await;
    let item_c = app.seed_item("ITEM-C", dec!(30.00)).await;

    let requisition = app.create_draft(dest.id).await;
    let line_a = app
        .add_line(requisition.id, item_a.id, dec!(1), dec!(0), src.id)
        .await;
    let line_b = app
        .add_line(requisition.id, item_b.id, dec!(2), dec!(0), src.id)
        .await;
    let line_c = app
        .add_line(requisition.id, item_c.id, dec!(3), dec!(0), src.id)
        .await;
    assert_eq!(
        (line_a.line_number, line_b.line_number, line_c.line_number),
        (1, 2, 3)
    );

    app.state
        .services
        .requisitions
        .remove_line(requisition.id, line_b.id)
        .await
        .expect("remove middle line");

    // Numbering never reuses a freed slot.
    let line_d = app
        .add_line(requisition.id, item_b.id, dec!(4), dec!(0), src.id)
        .await;
    assert_eq!(line_d.line_number, 4);

    let lines = app
        .state
        .services
        .requisitions
        .list_lines(requisition.id)
        .await
        .expect("list lines");
    let numbers: Vec<i32> = lines.iter().map(|line| line.line_number).collect();
    assert_eq!(numbers, vec![1, 3, 4]);

    let total = app
        .state
        .services
        .requisitions
        .total_requested_qty(requisition.id)
        .await
        .expect("total requested qty");
    assert_eq!(total, dec!(8));
}

#[tokio::test]
async fn negative_line_quantities_are_rejected() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    let err = app
        .state
        .services
        .requisitions
        .add_line(
            requisition.id,
            warehouse_req_api::services::requisitions::NewRequisitionLine {
                item_id: item.id,
                requested_qty: dec!(-1),
                ordered_qty: dec!(0),
                source_location_id: src.id,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let line = app
        .add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    let err = app
        .state
        .services
        .requisitions
        .update_line(
            requisition.id,
            line.id,
            UpdateRequisitionLine {
                ordered_qty: Some(dec!(-2)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn mark_required_needs_at_least_one_line() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    let err = app
        .state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    let required = app
        .state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .expect("mark requisition required");
    assert_eq!(required.status, RequisitionStatus::Required);
}

#[tokio::test]
async fn approval_needs_at_least_one_line() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;

    let requisition = app.create_draft(dest.id).await;
    let reviewer = Uuid::new_v4();
    app.identity.set_actor(reviewer);
    let err = app
        .state
        .services
        .requisitions
        .approve(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn claimant_cannot_approve_own_requisition() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    app.state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .expect("mark required");

    // Still acting as the claimant.
    let err = app
        .state
        .services
        .requisitions
        .approve(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));

    let unchanged = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert_eq!(unchanged.status, RequisitionStatus::Required);
    assert_eq!(unchanged.approver_id, None);
}

#[tokio::test]
async fn privileged_claimant_may_self_approve() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;
    let claimant = app.current_actor();

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;

    app.identity.grant_privilege(claimant);
    let approved = app
        .state
        .services
        .requisitions
        .approve(requisition.id)
        .await
        .expect("privileged self-approval");
    assert_eq!(approved.status, RequisitionStatus::Approved);
    assert_eq!(approved.approver_id, Some(claimant));
}

#[tokio::test]
async fn approval_from_draft_skips_required() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;

    let reviewer = Uuid::new_v4();
    let approved = app.approve_as(requisition.id, reviewer).await;
    assert_eq!(approved.status, RequisitionStatus::Approved);
    assert_eq!(approved.approver_id, Some(reviewer));
}

#[tokio::test]
async fn first_approver_is_recorded_permanently() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;

    let first_reviewer = Uuid::new_v4();
    let approved = app.approve_as(requisition.id, first_reviewer).await;
    assert_eq!(approved.approver_id, Some(first_reviewer));

    let reset = app
        .state
        .services
        .requisitions
        .reset_to_draft(requisition.id)
        .await
        .expect("reset to draft");
    assert_eq!(reset.status, RequisitionStatus::Draft);
    assert_eq!(reset.approver_id, Some(first_reviewer));

    // A later approval by someone else does not displace the original
    // approver.
    let second_reviewer = Uuid::new_v4();
    let reapproved = app.approve_as(requisition.id, second_reviewer).await;
    assert_eq!(reapproved.status, RequisitionStatus::Approved);
    assert_eq!(reapproved.approver_id, Some(first_reviewer));
}

#[tokio::test]
async fn lines_are_frozen_after_approval() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    let line = app
        .add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let err = app
        .state
        .services
        .requisitions
        .add_line(
            requisition.id,
            warehouse_req_api::services::requisitions::NewRequisitionLine {
                item_id: item.id,
                requested_qty: dec!(1),
                ordered_qty: dec!(0),
                source_location_id: src.id,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    let err = app
        .state
        .services
        .requisitions
        .update_line(
            requisition.id,
            line.id,
            UpdateRequisitionLine {
                requested_qty: Some(dec!(9)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    let err = app
        .state
        .services
        .requisitions
        .remove_line(requisition.id, line.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    let err = app
        .state
        .services
        .requisitions
        .update_dates(requisition.id, UpdateRequisitionDates::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn invalid_transitions_are_rejected() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;

    // Draft cannot jump straight to done.
    let err = app
        .state
        .services
        .requisitions
        .mark_done(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    app.state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .expect("mark required");

    // Required cannot be marked required again.
    let err = app
        .state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));

    app.approve_as(requisition.id, Uuid::new_v4()).await;

    // Approved cannot be approved again.
    let err = app
        .state
        .services
        .requisitions
        .approve(requisition.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
}

#[tokio::test]
async fn reset_to_draft_is_unguarded() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    app.approve_as(requisition.id, Uuid::new_v4()).await;

    let reset = app
        .state
        .services
        .requisitions
        .reset_to_draft(requisition.id)
        .await
        .expect("reset approved requisition");
    assert_eq!(reset.status, RequisitionStatus::Draft);

    // Draft itself can be reset too.
    let reset_again = app
        .state
        .services
        .requisitions
        .reset_to_draft(requisition.id)
        .await
        .expect("reset draft requisition");
    assert_eq!(reset_again.status, RequisitionStatus::Draft);
}

#[tokio::test]
async fn every_mutation_bumps_the_version() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    assert_eq!(requisition.version, 1);

    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    let after_line = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload after add_line");
    assert_eq!(after_line.version, 2);

    let required = app
        .state
        .services
        .requisitions
        .mark_required(requisition.id)
        .await
        .expect("mark required");
    assert_eq!(required.version, 3);

    let approved = app.approve_as(requisition.id, Uuid::new_v4()).await;
    assert_eq!(approved.version, 4);
}

#[tokio::test]
async fn list_requisitions_filters_by_status_and_claimant() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;
    let first_claimant = app.current_actor();

    let draft = app.create_draft(dest.id).await;
    let required = app.create_draft(dest.id).await;
    app.add_line(required.id, item.id, dec!(5), dec!(0), src.id)
        .await;
    app.state
        .services
        .requisitions
        .mark_required(required.id)
        .await
        .expect("mark required");

    let other_claimant = Uuid::new_v4();
    app.identity.set_actor(other_claimant);
    let other = app.create_draft(dest.id).await;
    app.identity.set_actor(first_claimant);

    let drafts = app
        .state
        .services
        .requisitions
        .list_requisitions(warehouse_req_api::services::requisitions::RequisitionListFilter {
            status: Some(RequisitionStatus::Draft),
            ..Default::default()
        })
        .await
        .expect("list drafts");
    let draft_ids: Vec<Uuid> = drafts.iter().map(|r| r.id).collect();
    assert!(draft_ids.contains(&draft.id));
    assert!(draft_ids.contains(&other.id));
    assert!(!draft_ids.contains(&required.id));

    let mine = app
        .state
        .services
        .requisitions
        .list_requisitions(warehouse_req_api::services::requisitions::RequisitionListFilter {
            claimant_id: Some(other_claimant),
            ..Default::default()
        })
        .await
        .expect("list by claimant");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, other.id);
}

#[tokio::test]
async fn concurrent_transitions_let_exactly_one_caller_win() {
    let app = TestApp::new().await;
    let dest = app.seed_location("DEST").await;
    let src = app.seed_location("SRC").await;
    let item = app.seed_item("ITEM-A", dec!(10.00)).await;

    let requisition = app.create_draft(dest.id).await;
    app.add_line(requisition.id, item.id, dec!(5), dec!(0), src.id)
        .await;

    let svc_a = app.state.services.requisitions.clone();
    let svc_b = app.state.services.requisitions.clone();
    let (first, second) = tokio::join!(
        svc_a.mark_required(requisition.id),
        svc_b.mark_required(requisition.id)
    );

    let winners = [first.is_ok(), second.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(winners, 1, "exactly one concurrent transition may succeed");

    let reloaded = app
        .state
        .services
        .requisitions
        .get_requisition(requisition.id)
        .await
        .expect("reload requisition");
    assert_eq!(reloaded.status, RequisitionStatus::Required);
    assert_eq!(reloaded.version, 3, "the losing call must not bump the version");
}
