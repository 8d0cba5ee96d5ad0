//! Campaign draft lookups and submission against an in-memory backend

mod common;

use common::{Call, FakeGateway};
use panel_console::campaign::{CampaignDraft, CampaignStep};
use panel_console::editor::AllocationMode;
use serde_json::json;

fn fill_basics(draft: &mut CampaignDraft) {
    let basics = draft.basics_mut();
    basics.name.set_value("Brand tracker Q3");
    basics.loi.set_value("12");
    basics.ir.set_value("35");
    basics.total_completes.set_value("800");
    draft.set_country(2);
    draft.set_language(1);
}

#[tokio::test]
async fn test_lookups_load_together() {
    let fake = FakeGateway::new();
    let mut draft = CampaignDraft::new();
    assert!(!draft.is_loading());

    draft.load_lookups(&fake).await;

    assert!(!draft.is_loading());
    assert_eq!(draft.languages().data().map(Vec::len), Some(1));
    assert_eq!(draft.countries().data().map(|c| c[0].name.as_str()), Some("Germany"));
}

#[tokio::test]
async fn test_lookup_failure_still_settles() {
    let fake = FakeGateway {
        fail_countries: true,
        ..FakeGateway::new()
    };
    let mut draft = CampaignDraft::new();
    draft.load_lookups(&fake).await;

    assert!(!draft.is_loading());
    assert!(draft.countries().is_failure());
    assert!(draft.languages().is_success());
}

#[tokio::test]
async fn test_submit_posts_basics_and_redirects() {
    let fake = FakeGateway::new();
    let mut draft = CampaignDraft::new();
    fill_basics(&mut draft);
    assert!(draft.next());
    draft.set_allocation_mode(AllocationMode::Auto);
    assert!(draft.next());
    draft.redirects_mut().overquota.set_value("");
    assert!(draft.next());
    assert_eq!(draft.step(), CampaignStep::Review);

    let campaign_id = draft.submit(&fake).await.unwrap();
    assert_eq!(campaign_id, 41);

    assert_eq!(
        fake.calls(),
        vec![Call::CreateCampaign {
            body: json!({
                "campaignName": "Brand tracker Q3",
                "country_id": 2,
                "language_id": 1,
                "loi": 12,
                "ir": 35,
                "total_completes": 800,
                "allocation_mode": "auto",
                "redirect_complete": "https://panel.example.com/success?pid=[PID]&sid=[SID]",
                "redirect_terminate": "https://panel.example.com/terminate?pid=[PID]&sid=[SID]",
                "redirect_overquota": null
            }),
        }]
    );
}

#[tokio::test]
async fn test_incomplete_draft_is_not_sent() {
    let fake = FakeGateway::new();
    let mut draft = CampaignDraft::new();
    fill_basics(&mut draft);
    draft.basics_mut().loi.set_value("0");

    let err = draft.submit(&fake).await.unwrap_err();
    assert!(err.to_string().contains("LOI"));
    assert!(fake.calls().is_empty());
}
