use rust_decimal_macros::dec;

use deal_analyzer::analysis::{AnalysisPolicy, DealAnalyzer, DealOverrides};
use deal_analyzer::engine::{AnalyzeOptions, ComparableSettings, DealPipeline, MessageOutcome};
use deal_analyzer::llm::Commentator;
use deal_analyzer::types::{ArvSource, Comparable, DealError, DealRating, RepairTier};

use crate::mock_listing::{MockListing, ScriptedCommentator};

fn pipeline(listing: MockListing) -> DealPipeline {
    DealPipeline::new(
        Box::new(listing),
        None,
        DealAnalyzer::default(),
        ComparableSettings::default(),
    )
}

#[tokio::test]
async fn test_heavy_rehab_fallback_valuation() {
    let report = pipeline(MockListing::new())
        .analyze_address("123 Main St, Austin, TX 78701", &AnalyzeOptions::default())
        .await
        .unwrap();

    let a = &report.analysis;
    assert_eq!(report.repair_estimate.tier, RepairTier::Heavy);
    assert_eq!(a.estimated_repairs, dec!(93750));
    assert_eq!(a.arv, dec!(230000));
    assert_eq!(a.arv_source, ArvSource::ListPriceFallback);
    assert_eq!(a.offer.rule_mao, dec!(67250));
    assert_eq!(a.offer.profit_mao, dec!(85650));
    assert_eq!(a.max_allowable_offer, dec!(67250));
    assert_eq!(a.total_investment, dec!(298350));
    assert_eq!(a.potential_profit, dec!(-68350));
    assert_eq!(a.roi_percentage, dec!(-22.91));
    assert_eq!(a.rating, DealRating::Poor);
    assert!(report.report.contains("Potential Profit: $-68,350.00"));
}

#[tokio::test]
async fn test_light_rehab_fallback_valuation() {
    let report = pipeline(MockListing::new())
        .analyze_address("77 Pine Rd, Dayton, OH", &AnalyzeOptions::default())
        .await
        .unwrap();

    let a = &report.analysis;
    assert_eq!(a.estimated_repairs, dec!(12500));
    assert_eq!(a.arv, dec!(69000));
    assert_eq!(a.offer.rule_mao, dec!(35800));
    assert_eq!(a.offer.profit_mao, dec!(41320));
    assert_eq!(a.rating, DealRating::Poor);
}

#[tokio::test]
async fn test_comparables_drive_arv() {
    let listing = MockListing::new()
        .with_comparables(vec![Comparable::priced(dec!(180000)), Comparable::priced(dec!(200000))]);
    let queries = listing.comps_queries();

    let report = pipeline(listing)
        .analyze_address("9 Oak Ave, Tampa, FL", &AnalyzeOptions::default())
        .await
        .unwrap();

    let a = &report.analysis;
    assert_eq!(a.arv, dec!(190000));
    assert_eq!(a.arv_source, ArvSource::Comparables);
    assert_eq!(a.estimated_repairs, dec!(36000));
    assert_eq!(a.max_allowable_offer, dec!(97000));
    assert_eq!(a.total_investment, dec!(119800));
    assert_eq!(a.potential_profit, dec!(70200));
    assert_eq!(a.roi_percentage, dec!(58.60));
    assert_eq!(a.rating, DealRating::Excellent);
    assert!(a.is_buy());

    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].city, "Tampa");
    assert_eq!(queries[0].min_price, dec!(60000));
    assert_eq!(queries[0].max_price, dec!(100000));
}

#[tokio::test]
async fn test_unpriced_comparables_fall_back() {
    let listing = MockListing::new().with_comparables(vec![Comparable::default(), Comparable::default()]);
    let report = pipeline(listing)
        .analyze_address("123 Main St, Austin, TX", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(report.analysis.arv_source, ArvSource::ListPriceFallback);
    assert_eq!(report.analysis.arv, dec!(230000));
}

#[tokio::test]
async fn test_comparables_outage_degrades() {
    let listing = MockListing::new().with_comparables(vec![Comparable::priced(dec!(500000))]);
    listing.fail_comparables("HTTP 503");

    let report = pipeline(listing)
        .analyze_address("123 Main St, Austin, TX", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(report.analysis.arv, dec!(230000));
    assert_eq!(report.comparables_used, 0);
}

#[tokio::test]
async fn test_unknown_address_not_found() {
    let err = pipeline(MockListing::new())
        .analyze_address("404 Missing Way, Austin, TX", &AnalyzeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DealError>(),
        Some(DealError::PropertyNotFound(addr)) if addr.contains("Missing Way")
    ));
}

#[tokio::test]
async fn test_missing_sqft_degrades_or_fails_by_policy() {
    let report = pipeline(MockListing::new())
        .analyze_address("5 Bare Lot, Reno, NV", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(report.analysis.estimated_repairs, dec!(0));
    assert_eq!(report.analysis.rating, DealRating::Poor);

    let strict = DealPipeline::new(
        Box::new(MockListing::new()),
        None,
        DealAnalyzer::new(AnalysisPolicy {
            require_complete_data: true,
            ..Default::default()
        }),
        ComparableSettings::default(),
    );
    let err = strict
        .analyze_address("5 Bare Lot, Reno, NV", &AnalyzeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DealError>(),
        Some(DealError::InsufficientData { field }) if field == "sqft"
    ));
}

#[tokio::test]
async fn test_user_overrides() {
    let options = AnalyzeOptions {
        overrides: DealOverrides {
            arv: Some(dec!(180000)),
            repair_costs: Some(dec!(20000)),
        },
        use_comparables: Some(false),
        ..Default::default()
    };
    let report = pipeline(MockListing::new())
        .analyze_address("77 Pine Rd, Dayton, OH", &options)
        .await
        .unwrap();
    // 180000 × 0.70 − 20000 = 106000 ≥ 60000
    assert_eq!(report.analysis.max_allowable_offer, dec!(106000));
    assert_eq!(report.analysis.rating, DealRating::Excellent);
    assert!(report.report.contains("Estimated Repairs (user_provided): $20,000.00"));
}

#[tokio::test]
async fn test_repeat_analysis_is_identical() {
    let p = pipeline(MockListing::new());
    let first = p
        .analyze_address("123 Main St, Austin, TX", &AnalyzeOptions::default())
        .await
        .unwrap();
    let second = p
        .analyze_address("123 Main St, Austin, TX", &AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(first.analysis, second.analysis);
    assert_eq!(first.report, second.report);
}

#[tokio::test]
async fn test_message_flow_with_commentator() {
    let commentator = ScriptedCommentator::new();
    let calls = commentator.calls.clone();
    let p = DealPipeline::new(
        Box::new(MockListing::new()),
        Some(Box::new(commentator) as Box<dyn Commentator>),
        DealAnalyzer::default(),
        ComparableSettings::default(),
    );

    match p.handle_message("Please analyze: 9 Oak Ave, Tampa, FL").await.unwrap() {
        MessageOutcome::Analysis(report) => {
            assert_eq!(report.property.address, "9 Oak Ave");
            assert_eq!(report.commentary.as_deref(), Some("9 Oak Ave rates POOR."));
        }
        MessageOutcome::Conversation(_) => panic!("expected analysis"),
    }

    match p.handle_message("What makes a good flip?").await.unwrap() {
        MessageOutcome::Conversation(text) => assert_eq!(text, "Focus on the 70% rule."),
        MessageOutcome::Analysis(_) => panic!("expected conversation"),
    }

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    assert!(calls[1].starts_with("commentary:"));
    assert!(calls[3].starts_with("chat:"));
}
