//! End-to-end estimate lifecycle through the service layer:
//! - Role registry feeding a draft, commit, full-tree read-back
//! - Wire document -> draft -> commit -> figures
//! - Atomic rollback leaving zero rows behind
//! - Cascading delete and role referential protection
//! - Settings driving the low-margin flag
//! - On-disk persistence across reopen

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use est_core::draft::{EstimateDraft, EstimateHeader};
use est_core::enums::{Currency, DurationUnit, EstimateType};
use est_db::error::DatabaseError;
use est_db::service::EstimateService;

async fn test_service() -> EstimateService {
    EstimateService::new_local(":memory:").await.unwrap()
}

fn header(project: &str, client: &str) -> EstimateHeader {
    EstimateHeader {
        project_name: project.into(),
        client_name: client.into(),
        estimate_type: EstimateType::TimeAndMaterials,
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        duration: 3,
        duration_unit: DurationUnit::Months,
        currency: Currency::Usd,
    }
}

async fn table_count(svc: &EstimateService, table: &str) -> i64 {
    let mut rows = svc
        .db()
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get(0).unwrap()
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_commit_read_delete() {
    let svc = test_service().await;
    let consultant = svc
        .create_role("Senior Consultant", dec!(480), dec!(950))
        .await
        .unwrap();
    let engineer = svc
        .create_role("Platform Engineer", dec!(390), dec!(820))
        .await
        .unwrap();

    let mut draft = EstimateDraft::new(header("Migration", "Globex")).unwrap();
    let lead = draft.bind(consultant.id, None);
    let delivery = draft.bind(consultant.id, Some(engineer.id));
    draft.add_task("Discovery workshops", dec!(8), &[lead]).unwrap();
    draft
        .add_task("Pipeline build", dec!(22.5), &[lead, delivery])
        .unwrap();

    let id = svc.create_estimate(&draft).await.unwrap();

    let view = svc.get_estimate(id).await.unwrap();
    assert_eq!(view.estimate.project_name, "Migration");
    assert_eq!(view.estimate.currency, Currency::Usd);
    assert_eq!(view.bindings.len(), 2);
    assert_eq!(view.tasks.len(), 2);
    // The remapped binding sells as Consultant but costs as Engineer.
    assert_eq!(view.bindings[1].rate.sold_role_name, "Senior Consultant");
    assert_eq!(view.bindings[1].rate.internal_role_name, "Platform Engineer");
    assert_eq!(view.bindings[1].rate.internal_rate, dec!(390));
    assert_eq!(view.tasks[1].rates.len(), 2);

    svc.delete_estimate(id).await.unwrap();
    assert_eq!(table_count(&svc, "estimates").await, 0);
    assert_eq!(table_count(&svc, "estimate_roles").await, 0);
    assert_eq!(table_count(&svc, "estimate_tasks").await, 0);
    assert_eq!(table_count(&svc, "estimate_task_roles").await, 0);

    // Roles outlive the estimate and become deletable again.
    svc.delete_role(engineer.id).await.unwrap();
    svc.delete_role(consultant.id).await.unwrap();
    assert!(svc.list_roles().await.unwrap().is_empty());
}

#[tokio::test]
async fn wire_document_to_committed_figures() {
    let svc = test_service().await;
    let consultant = svc.create_role("Consultant", dec!(100), dec!(200)).await.unwrap();
    let engineer = svc.create_role("Engineer", dec!(50), dec!(150)).await.unwrap();

    let json = format!(
        r#"{{
            "projectName": "Atlas",
            "clientName": "Initech",
            "type": "Fixed Price",
            "startDate": "2026-11-02",
            "duration": 4,
            "projectRoles": [
                {{"roleId": {consultant_id}}},
                {{"roleId": {consultant_id}, "internalRoleId": {engineer_id}}}
            ],
            "tasks": [
                {{"description": "Build", "days": 4, "roleIndices": [0, 1]}}
            ]
        }}"#,
        consultant_id = consultant.id,
        engineer_id = engineer.id,
    );
    let doc = serde_json::from_str(&json).unwrap();
    let draft = EstimateDraft::from_input(doc).unwrap();
    // Omitted fields fall back to the wizard defaults.
    assert_eq!(draft.header().duration_unit, DurationUnit::Weeks);
    assert_eq!(draft.header().currency, Currency::Gbp);

    let id = svc.create_estimate(&draft).await.unwrap();
    let (_, figures) = svc.get_estimate_with_figures(id).await.unwrap();
    // 4x100 + 4x50 cost, 4x200 + 4x150 revenue
    assert_eq!(figures.total_cost, dec!(600));
    assert_eq!(figures.total_revenue, dec!(1400));
    assert_eq!(figures.margin_percent.round_dp(2), dec!(57.14));
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_commit_persists_nothing() {
    let svc = test_service().await;
    let real = svc.create_role("Real", dec!(100), dec!(200)).await.unwrap();

    let mut draft = EstimateDraft::new(header("Doomed", "Acme")).unwrap();
    let ok = draft.bind(real.id, None);
    let missing = draft.bind(real.id, Some(31337));
    draft.add_task("First", dec!(5), &[ok]).unwrap();
    draft.add_task("Second", dec!(3), &[missing]).unwrap();

    let result = svc.create_estimate(&draft).await;
    assert!(matches!(result, Err(DatabaseError::UnknownRole(31337))));

    for table in ["estimates", "estimate_roles", "estimate_tasks", "estimate_task_roles"] {
        assert_eq!(table_count(&svc, table).await, 0, "{table} should be empty");
    }
    // The service stays usable after the rollback.
    let id = svc
        .create_estimate(&EstimateDraft::new(header("Recovery", "Acme")).unwrap())
        .await
        .unwrap();
    assert!(id > 0);
}

// ---------------------------------------------------------------------------
// Referential protection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn role_referenced_by_estimate_cannot_be_deleted() {
    let svc = test_service().await;
    let sold = svc.create_role("Sold", dec!(100), dec!(200)).await.unwrap();
    let internal = svc.create_role("Internal", dec!(60), dec!(120)).await.unwrap();

    let mut draft = EstimateDraft::new(header("Pinned", "Acme")).unwrap();
    draft.bind(sold.id, Some(internal.id));
    let id = svc.create_estimate(&draft).await.unwrap();

    // Both sides of the binding are protected.
    assert!(matches!(
        svc.delete_role(sold.id).await,
        Err(DatabaseError::ReferentialConflict(_))
    ));
    assert!(matches!(
        svc.delete_role(internal.id).await,
        Err(DatabaseError::ReferentialConflict(_))
    ));

    svc.delete_estimate(id).await.unwrap();
    svc.delete_role(sold.id).await.unwrap();
    svc.delete_role(internal.id).await.unwrap();
}

// ---------------------------------------------------------------------------
// Settings and the low-margin flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn target_margin_change_flips_low_margin_flag() {
    let svc = test_service().await;
    let role = svc.create_role("Dev", dec!(75), dec!(100)).await.unwrap();

    let mut draft = EstimateDraft::new(header("Thin", "Acme")).unwrap();
    let binding = draft.bind(role.id, None);
    draft.add_task("Build", dec!(10), &[binding]).unwrap();
    let id = svc.create_estimate(&draft).await.unwrap();

    // Margin is 25%; the seeded target of 30 flags it.
    let (_, figures) = svc.get_estimate_with_figures(id).await.unwrap();
    assert_eq!(figures.margin_percent, dec!(25));
    assert!(figures.is_low_margin);

    svc.update_settings(Some(dec!(20)), None).await.unwrap();
    let (_, figures) = svc.get_estimate_with_figures(id).await.unwrap();
    assert!(!figures.is_low_margin);
}

// ---------------------------------------------------------------------------
// Persistence across reopen
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("estima.db");
    let path = path.to_str().unwrap();

    let estimate_id = {
        let svc = EstimateService::new_local(path).await.unwrap();
        let role = svc.create_role("Dev", dec!(80), dec!(160)).await.unwrap();
        let mut draft = EstimateDraft::new(header("Durable", "Acme")).unwrap();
        let binding = draft.bind(role.id, None);
        draft.add_task("Build", dec!(2.5), &[binding]).unwrap();
        svc.create_estimate(&draft).await.unwrap()
    };

    let svc = EstimateService::new_local(path).await.unwrap();
    let (view, figures) = svc.get_estimate_with_figures(estimate_id).await.unwrap();
    assert_eq!(view.estimate.project_name, "Durable");
    assert_eq!(view.tasks[0].days, dec!(2.5));
    assert_eq!(figures.total_cost, dec!(200));
    assert_eq!(figures.total_revenue, dec!(400));
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_and_search_headers() {
    let svc = test_service().await;
    for (project, client) in [
        ("Website Relaunch", "Acme"),
        ("Data Platform", "Globex"),
        ("Mobile App", "Initech"),
    ] {
        svc.create_estimate(&EstimateDraft::new(header(project, client)).unwrap())
            .await
            .unwrap();
    }

    let all = svc.list_estimates(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].project_name, "Mobile App");

    let by_project = svc.list_estimates(Some("platform")).await.unwrap();
    assert_eq!(by_project.len(), 1);
    assert_eq!(by_project[0].client_name, "Globex");

    let by_client = svc.list_estimates(Some("acme")).await.unwrap();
    assert_eq!(by_client.len(), 1);

    assert!(svc.list_estimates(Some("umbrella")).await.unwrap().is_empty());
}

#[tokio::test]
async fn settings_roundtrip_through_service() {
    let svc = test_service().await;
    let defaults = svc.get_settings().await.unwrap();
    assert_eq!(defaults.target_margin_percent, Decimal::from(30));
    assert_eq!(defaults.default_currency, Currency::Gbp);

    let updated = svc
        .update_settings(Some(dec!(35)), Some(Currency::Eur))
        .await
        .unwrap();
    assert_eq!(updated.target_margin_percent, dec!(35));
    assert_eq!(updated.default_currency, Currency::Eur);
}
