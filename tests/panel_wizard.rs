//! End-to-end behaviour of the panel wizard against an in-memory backend

mod common;

use common::{Call, FakeGateway};
use panel_console::api::models::SavedPanel;
use panel_console::api::Gateway;
use panel_console::editor::{AllocationMode, EditorContext, FinishOutcome, PanelWizard, WizardStep};
use serde_json::json;
use std::sync::Arc;

const CAMPAIGN: i64 = 7;
const ENTRY_URL: &str = "https://survey.example.com/s?pid=[PID]";

async fn open(fake: &Arc<FakeGateway>, context: EditorContext) -> PanelWizard {
    let gateway: Arc<dyn Gateway> = fake.clone();
    PanelWizard::open(gateway, context).await.unwrap()
}

async fn open_create(fake: &Arc<FakeGateway>) -> PanelWizard {
    open(fake, EditorContext::create(CAMPAIGN, AllocationMode::Manual)).await
}

fn fill_provider(wizard: &mut PanelWizard) {
    let form = wizard.provider_form_mut();
    form.set_provider(3);
    form.set_max_completes("250");
    form.set_cpi("1.75");
    form.set_entry_url(ENTRY_URL);
}

/// Fill step one and move to the quota step
fn advance_to_quotas(wizard: &mut PanelWizard) {
    fill_provider(wizard);
    assert!(wizard.next());
    assert!(wizard.next());
    assert_eq!(wizard.step(), WizardStep::Quotas);
}

#[tokio::test]
async fn test_open_loads_catalog_and_providers() {
    let fake = Arc::new(FakeGateway::new());
    let wizard = open_create(&fake).await;

    assert_eq!(wizard.catalog().data().map(|c| c.len()), Some(2));
    assert_eq!(wizard.providers().data().map(Vec::len), Some(1));
    assert_eq!(wizard.step(), WizardStep::Provider);
    assert!(!wizard.is_busy());
}

#[tokio::test]
async fn test_catalog_failure_leaves_list_empty() {
    let fake = Arc::new(FakeGateway {
        fail_catalog: true,
        ..FakeGateway::new()
    });
    let mut wizard = open_create(&fake).await;

    assert!(wizard.catalog().is_failure());
    assert!(wizard.providers().is_success());
    assert!(wizard.filtered_questions().is_empty());

    wizard.toggle_add_question(1);
    assert!(!wizard.selection().is_question_added(1));
}

#[tokio::test]
async fn test_provider_step_guards_progress() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;

    assert!(!wizard.next());
    assert_eq!(wizard.step(), WizardStep::Provider);
    assert!(wizard.provider_form().provider().is_touched());
    assert!(wizard.provider_form().entry_url().is_touched());

    fill_provider(&mut wizard);
    wizard.provider_form_mut().set_cpi("0");
    assert!(!wizard.next());

    wizard.provider_form_mut().set_cpi("0.01");
    assert!(wizard.next());
    assert_eq!(wizard.step(), WizardStep::Qualifications);
}

#[tokio::test]
async fn test_entering_quotas_clears_search() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    fill_provider(&mut wizard);
    wizard.next();

    wizard.set_search("GEN");
    let ids: Vec<i64> = wizard.filtered_questions().iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![2]);

    assert!(wizard.next());
    assert_eq!(wizard.search(), "");
    assert_eq!(wizard.filtered_questions().len(), 2);

    assert!(wizard.back());
    assert_eq!(wizard.step(), WizardStep::Qualifications);
    assert!(wizard.back());
    assert!(!wizard.back());
}

#[tokio::test]
async fn test_finish_posts_full_payload_and_resets() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    fill_provider(&mut wizard);
    wizard.next();

    wizard.toggle_add_question(2);
    wizard.toggle_option(2, 5);
    wizard.toggle_add_question(1);
    wizard.next();

    let quotas = wizard.quotas_mut();
    let quota = quotas.add_quota();
    quotas.set_name(quota, "Men");
    quotas.set_target(quota, "100");
    let condition = quotas.add_condition(quota).unwrap();
    quotas.set_condition_question(quota, condition, 2);
    quotas.set_condition_answer(quota, condition, 6);

    let outcome = wizard.finish(false).await;
    assert_eq!(outcome, FinishOutcome::Submitted(json!({ "status": "ok" })));

    assert_eq!(
        fake.calls(),
        vec![Call::CreatePanel {
            campaign_id: CAMPAIGN,
            body: json!({
                "panel": {
                    "panel_provider_id": 3,
                    "target_completes": 250,
                    "cpi": 1.75,
                    "entry_url": ENTRY_URL
                },
                "qualifications": [
                    { "qs_id": 2, "option_ids": [6] },
                    { "qs_id": 1, "option_ids": [1, 2, 3] }
                ],
                "quotas": [
                    {
                        "quota_name": "Men",
                        "target": 100,
                        "conditions": [{ "qs_id": 2, "opt_id": 6 }]
                    }
                ],
                "skip": false
            }),
        }]
    );

    assert_eq!(wizard.step(), WizardStep::Provider);
    assert!(wizard.selected_summary().is_empty());
    assert!(!wizard.selection().is_question_added(1));
    assert!(wizard.quotas().is_empty());
    assert_eq!(wizard.provider_form().provider().value(), "");
    assert!(!wizard.is_busy());
}

#[tokio::test]
async fn test_skip_posts_panel_only() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);
    wizard.toggle_add_question(1);

    let outcome = wizard.finish(true).await;
    assert!(matches!(outcome, FinishOutcome::Submitted(_)));

    let calls = fake.calls();
    let Call::CreatePanel { body, .. } = &calls[0] else {
        panic!("expected a create call, got {:?}", calls);
    };
    assert_eq!(body["skip"], json!(true));
    assert!(body.get("qualifications").is_none());
    assert!(body.get("quotas").is_none());
    assert_eq!(body["panel"]["panel_provider_id"], json!(3));
}

#[tokio::test]
async fn test_invalid_quota_blocks_finish() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);

    let quota = wizard.quotas_mut().add_quota();
    wizard.quotas_mut().set_target(quota, "20");
    assert_eq!(wizard.finish(false).await, FinishOutcome::Blocked);
    assert!(wizard.quotas().quotas()[quota].name().is_touched());

    wizard.quotas_mut().set_name(quota, "Everyone");
    wizard.quotas_mut().set_target(quota, "0");
    assert_eq!(wizard.finish(false).await, FinishOutcome::Blocked);
    assert_eq!(wizard.finish(true).await, FinishOutcome::Blocked);

    assert!(fake.calls().is_empty());
    assert_eq!(wizard.step(), WizardStep::Quotas);

    wizard.quotas_mut().set_target(quota, "20");
    assert!(matches!(wizard.finish(false).await, FinishOutcome::Submitted(_)));
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn test_finish_outside_last_step_is_blocked() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    fill_provider(&mut wizard);

    assert_eq!(wizard.finish(false).await, FinishOutcome::Blocked);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_dangling_condition_blocks_finish() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);
    wizard.toggle_add_question(2);

    let quota = wizard.quotas_mut().add_quota();
    wizard.quotas_mut().set_name(quota, "Women");
    wizard.quotas_mut().set_target(quota, "40");
    let condition = wizard.quotas_mut().add_condition(quota).unwrap();
    wizard.quotas_mut().set_condition_question(quota, condition, 2);
    wizard.quotas_mut().set_condition_answer(quota, condition, 5);

    wizard.toggle_add_question(2);
    let summary = wizard.selected_summary();
    assert!(wizard.quotas().options_for_condition(quota, condition, &summary).is_empty());
    assert_eq!(wizard.finish(false).await, FinishOutcome::Blocked);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_emptied_question_is_left_out_of_payload() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);

    wizard.toggle_add_question(1);
    for option in [1, 2, 3] {
        wizard.toggle_option(1, option);
    }

    assert!(wizard.selection().is_question_added(1));
    assert!(wizard.selected_summary().is_empty());
    assert_eq!(wizard.submission(false).qualifications, Some(Vec::new()));
}

#[tokio::test]
async fn test_submission_failure_resets_and_reports() {
    let fake = Arc::new(FakeGateway {
        fail_submit: true,
        ..FakeGateway::new()
    });
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);
    wizard.toggle_add_question(2);

    match wizard.finish(false).await {
        FinishOutcome::Failed(message) => assert!(message.contains("500"), "{}", message),
        other => panic!("expected failure, got {:?}", other),
    }

    assert_eq!(fake.calls().len(), 1);
    assert_eq!(wizard.step(), WizardStep::Provider);
    assert!(!wizard.selection().is_question_added(2));
    assert!(!wizard.is_busy());
}

#[tokio::test]
async fn test_auto_allocation_sends_auto_targets() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open(&fake, EditorContext::create(CAMPAIGN, AllocationMode::Auto)).await;
    assert_eq!(wizard.provider_form().max_completes().value(), "Auto");

    advance_to_quotas(&mut wizard);
    assert_eq!(wizard.provider_form().max_completes().value(), "Auto");
    let quota = wizard.quotas_mut().add_quota();
    wizard.quotas_mut().set_name(quota, "All");
    assert!(!wizard.quotas_mut().set_target(quota, "5"));

    assert!(matches!(wizard.finish(false).await, FinishOutcome::Submitted(_)));
    let calls = fake.calls();
    let Call::CreatePanel { body, .. } = &calls[0] else {
        panic!("expected a create call, got {:?}", calls);
    };
    assert_eq!(body["panel"]["target_completes"], json!("Auto"));
    assert_eq!(body["quotas"][0]["target"], json!("Auto"));
    assert_eq!(wizard.provider_form().max_completes().value(), "Auto");
}

fn saved_panel() -> SavedPanel {
    serde_json::from_value(json!({
        "panel_provider_id": "3",
        "target_completes": "120",
        "cpi": "2.25",
        "entry_url": "https://entry.example.com/?pid=[PID]",
        "qualifications": [{ "qs_id": "2", "option_ids": [5, 6] }],
        "quotas": [{
            "quota_name": "Women",
            "target": 60,
            "conditions": [{ "qs_id": "2", "opt_id": "5" }]
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_edit_restores_saved_panel() {
    let fake = Arc::new(FakeGateway {
        saved_panel: Some(saved_panel()),
        ..FakeGateway::new()
    });
    let wizard = open(&fake, EditorContext::edit(CAMPAIGN, 12, AllocationMode::Manual)).await;

    let form = wizard.provider_form();
    assert_eq!(form.provider().value(), "3");
    assert_eq!(form.max_completes().value(), "120");
    assert_eq!(form.cpi().value(), "2.25");
    assert!(form.is_valid());

    assert!(wizard.selection().is_question_added(2));
    assert!(wizard.selection().is_option_selected(2, 5));
    assert!(wizard.selection().is_option_selected(2, 6));

    let condition = &wizard.quotas().quotas()[0].conditions()[0];
    assert_eq!(condition.question().value(), "2");
    assert_eq!(condition.answer().value(), "5");

    let summary = wizard.selected_summary();
    let options: Vec<i64> = wizard
        .quotas()
        .options_for_condition(0, 0, &summary)
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(options, vec![5, 6]);
    assert!(wizard.quotas().is_valid(&summary));
}

#[tokio::test]
async fn test_edit_always_updates_with_full_payload() {
    let fake = Arc::new(FakeGateway {
        saved_panel: Some(saved_panel()),
        ..FakeGateway::new()
    });
    let mut wizard = open(&fake, EditorContext::edit(CAMPAIGN, 12, AllocationMode::Manual)).await;
    assert!(wizard.next());
    assert!(wizard.next());

    assert!(matches!(wizard.finish(true).await, FinishOutcome::Submitted(_)));

    let calls = fake.calls();
    let Call::UpdatePanel { campaign_id, panel_id, body } = &calls[0] else {
        panic!("expected an update call, got {:?}", calls);
    };
    assert_eq!((*campaign_id, *panel_id), (CAMPAIGN, 12));
    assert_eq!(body["skip"], json!(false));
    assert_eq!(body["qualifications"], json!([{ "qs_id": 2, "option_ids": [5, 6] }]));
    assert_eq!(body["quotas"][0]["conditions"][0], json!({ "qs_id": 2, "opt_id": 5 }));
    assert_eq!(body["panel"]["target_completes"], json!(120));
}

#[tokio::test]
async fn test_edit_fails_when_saved_panel_is_missing() {
    let fake = Arc::new(FakeGateway::new());
    let gateway: Arc<dyn Gateway> = fake.clone();
    let result = PanelWizard::open(gateway, EditorContext::edit(CAMPAIGN, 12, AllocationMode::Manual)).await;

    let err = result.err().expect("opening should fail");
    assert!(format!("{:#}", err).contains("Failed to load panel 12"));
}

#[tokio::test]
async fn test_cancel_discards_everything() {
    let fake = Arc::new(FakeGateway::new());
    let mut wizard = open_create(&fake).await;
    advance_to_quotas(&mut wizard);
    wizard.toggle_add_question(1);
    wizard.quotas_mut().add_quota();

    wizard.cancel();

    assert_eq!(wizard.step(), WizardStep::Provider);
    assert!(wizard.quotas().is_empty());
    assert!(!wizard.selection().is_question_added(1));
    assert!(fake.calls().is_empty());
    assert!(wizard.catalog().is_success());
}

#[tokio::test]
async fn test_edit_restores_age_quota() {
    let saved: SavedPanel = serde_json::from_value(json!({
        "panel_provider_id": 3,
        "target_completes": 100,
        "cpi": 1.5,
        "qualifications": [{ "qs_id": 1, "option_ids": [1, 2] }],
        "quotas": [{
            "quota_name": "Q1",
            "target": 10,
            "conditions": [{ "qs_id": 1, "opt_id": 1 }]
        }]
    }))
    .unwrap();
    let fake = Arc::new(FakeGateway {
        saved_panel: Some(saved),
        ..FakeGateway::new()
    });
    let wizard = open(&fake, EditorContext::edit(CAMPAIGN, 7, AllocationMode::Manual)).await;

    assert_eq!(wizard.selection().snapshot().added().collect::<Vec<_>>(), vec![1]);
    assert!(wizard.selection().is_option_selected(1, 1));
    assert!(wizard.selection().is_option_selected(1, 2));
    assert!(!wizard.selection().is_option_selected(1, 3));

    let quota = &wizard.quotas().quotas()[0];
    assert_eq!(quota.name().value(), "Q1");
    assert_eq!(quota.target().value(), "10");
    assert_eq!(quota.conditions()[0].question().value(), "1");
    assert_eq!(quota.conditions()[0].answer().value(), "1");
}

#[tokio::test]
async fn test_delete_panel_reaches_backend() {
    let fake = FakeGateway::new();
    fake.delete_panel(7, 3).await.unwrap();
    assert_eq!(fake.calls(), vec![Call::DeletePanel { campaign_id: 7, panel_id: 3 }]);
}

#[tokio::test]
async fn test_delete_panel_failure_is_reported() {
    let fake = FakeGateway {
        fail_submit: true,
        ..FakeGateway::new()
    };
    let err = fake.delete_panel(7, 3).await.unwrap_err();
    assert!(err.to_string().contains("final-delete"));
    assert_eq!(fake.calls(), vec![Call::DeletePanel { campaign_id: 7, panel_id: 3 }]);
}
