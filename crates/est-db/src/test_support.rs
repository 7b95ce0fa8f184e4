//! Shared test utilities for est-db unit tests.

pub(crate) mod helpers {
    use est_core::draft::EstimateDraft;
    use est_core::enums::{Currency, DurationUnit, EstimateType};

    use crate::EstimateDb;
    use crate::service::EstimateService;

    /// Create an in-memory service (schema migrated, settings seeded).
    pub async fn test_service() -> EstimateService {
        let db = EstimateDb::open_local(":memory:").await.unwrap();
        EstimateService::from_db(db)
    }

    /// A valid header for draft construction in tests.
    pub fn test_header() -> est_core::draft::EstimateHeader {
        est_core::draft::EstimateHeader {
            project_name: "Apollo".into(),
            client_name: "Acme".into(),
            estimate_type: EstimateType::FixedPrice,
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            duration: 6,
            duration_unit: DurationUnit::Weeks,
            currency: Currency::Gbp,
        }
    }

    /// An empty draft with the test header.
    pub fn empty_draft() -> EstimateDraft {
        EstimateDraft::new(test_header()).unwrap()
    }
}
