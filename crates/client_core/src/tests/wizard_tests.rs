use super::*;
use anyhow::anyhow;
use rand::{rngs::StdRng, SeedableRng};
use shared::error::ErrorField;

fn category(token: &str) -> Category {
    Category::new(token).expect("category")
}

/// Walks a controller to the review step with a valid draft.
fn controller_at_review(policy: SubmissionPolicy) -> WizardController {
    let mut controller = WizardController::new(policy);
    controller.select_category(category("cold-brew"));
    controller.advance().expect("step 1");
    controller.set_option(DrinkOption::Size(Size::Large));
    controller.toggle_addon("vanilla", Cents(50), true);
    controller.advance().expect("step 2");
    controller.select_mood(Mood::Energetic);
    controller.advance().expect("step 3");
    controller.set_contact_field(ContactField::Name, "Ada");
    controller.set_contact_field(ContactField::PickupTime, "30min");
    controller.advance().expect("step 4");
    assert_eq!(controller.step(), WizardStep::Review);
    controller
}

#[test]
fn fresh_draft_has_storefront_defaults() {
    let draft = OrderDraft::default();
    assert_eq!(draft.category(), None);
    assert_eq!(draft.size(), Size::Medium);
    assert_eq!(draft.milk(), MilkType::Whole);
    assert_eq!(draft.sweetness(), 50);
    assert_eq!(draft.ice(), 50);
    assert_eq!(draft.shots(), 2);
    assert!(draft.addons().is_empty());
    assert_eq!(draft.base_price(), Cents(599));
}

#[test]
fn shots_never_leave_range_under_any_adjustment_sequence() {
    let mut controller = WizardController::default();
    let deltas = [1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1, -1, -1, 1, 7, -9, 3];
    for delta in deltas {
        let shots = controller.adjust_shots(delta);
        assert!(shots <= MAX_SHOTS, "shots escaped range: {shots}");
    }

    let mut controller = WizardController::default();
    for _ in 0..10 {
        controller.adjust_shots(1);
    }
    assert_eq!(controller.draft().shots(), 5);
    for _ in 0..10 {
        controller.adjust_shots(-1);
    }
    assert_eq!(controller.draft().shots(), 0);
}

#[test]
fn out_of_range_shot_request_is_a_no_op() {
    let mut controller = WizardController::default();
    assert_eq!(controller.adjust_shots(4), 2);
    assert_eq!(controller.adjust_shots(-3), 2);
    assert_eq!(controller.adjust_shots(3), 5);
}

#[test]
fn sweetness_and_ice_store_clamped_values() {
    let mut controller = WizardController::default();
    for value in [-50, -1, 0, 1, 42, 99, 100, 101, 1_000] {
        let expected = value.clamp(0, 100) as u8;
        assert_eq!(controller.set_sweetness(value), expected);
        assert_eq!(controller.draft().sweetness(), expected);
        assert_eq!(controller.set_ice(value), expected);
        assert_eq!(controller.draft().ice(), expected);
    }
}

#[test]
fn option_groups_keep_one_active_value() {
    let mut controller = WizardController::default();
    controller.set_option(DrinkOption::Size(Size::Small));
    controller.set_option(DrinkOption::Size(Size::Large));
    controller.set_option(DrinkOption::Milk(MilkType::Oat));
    assert_eq!(controller.draft().size(), Size::Large);
    assert_eq!(controller.draft().milk(), MilkType::Oat);
}

#[test]
fn repeated_addon_enables_do_not_duplicate() {
    let mut controller = WizardController::default();
    controller.toggle_addon("vanilla", Cents(50), true);
    controller.toggle_addon("vanilla", Cents(50), true);
    controller.toggle_addon("caramel", Cents(75), true);
    assert_eq!(controller.draft().addons().len(), 2);
}

#[test]
fn addon_removal_is_exact() {
    let mut controller = WizardController::default();
    controller.toggle_addon("vanilla", Cents(50), true);
    controller.toggle_addon("caramel", Cents(75), true);
    controller.toggle_addon("whipped-cream", Cents(60), true);

    controller.toggle_addon("caramel", Cents(75), false);
    controller.toggle_addon("hazelnut", Cents(75), false);

    let names: Vec<&str> = controller
        .draft()
        .addons()
        .iter()
        .map(|addon| addon.name.as_str())
        .collect();
    assert_eq!(names, vec!["vanilla", "whipped-cream"]);
}

#[test]
fn re_adding_an_addon_trusts_the_latest_price() {
    let mut controller = WizardController::default();
    controller.toggle_addon("vanilla", Cents(50), true);
    controller.toggle_addon("vanilla", Cents(50), false);
    controller.toggle_addon("vanilla", Cents(80), true);
    assert_eq!(controller.draft().addons()[0].price, Cents(80));

    controller.toggle_addon("vanilla", Cents(90), true);
    assert_eq!(controller.draft().addons()[0].price, Cents(90));
}

#[test]
fn mood_selection_overrides_manual_customization() {
    let cases = [
        (Mood::Energetic, 3, 30),
        (Mood::Relaxing, 1, 70),
        (Mood::Focus, 2, 50),
    ];
    for (mood, shots, sweetness) in cases {
        let mut controller = WizardController::default();
        controller.adjust_shots(3);
        controller.set_sweetness(95);

        let advisory = controller.select_mood(mood).expect("draft is editable");

        assert_eq!(advisory.shots, shots);
        assert_eq!(advisory.sweetness, sweetness);
        assert_eq!(controller.draft().mood(), Some(mood));
        assert_eq!(controller.draft().shots(), shots);
        assert_eq!(controller.draft().sweetness(), sweetness);
    }
}

#[test]
fn mood_advisory_carries_recommendation_text() {
    assert!(mood_advisory(Mood::Relaxing).text.contains("caramel"));
    assert!(mood_advisory(Mood::Focus).text.contains("mocha"));
}

#[test]
fn advance_without_category_stays_on_step_one() {
    let mut controller = WizardController::default();
    let failure = controller.advance().expect_err("must fail");

    assert_eq!(failure.errors, vec![ValidationError::MissingCategory]);
    assert_eq!(failure.step, 1);
    assert_eq!(controller.step(), WizardStep::Category);
    assert_eq!(controller.step().position(), 1);
    assert_eq!(
        controller.displayed_errors()[0].field(),
        ErrorField::Prompt
    );
}

#[test]
fn advance_without_mood_stays_on_step_three() {
    let mut controller = WizardController::default();
    controller.select_category(category("latte"));
    controller.advance().expect("step 1");
    controller.advance().expect("step 2 always passes");

    let failure = controller.advance().expect_err("must fail");
    assert_eq!(failure.errors, vec![ValidationError::MissingMood]);
    assert_eq!(controller.step(), WizardStep::Mood);
}

#[test]
fn contact_step_reports_every_missing_field_at_once() {
    let mut controller = WizardController::default();
    controller.select_category(category("latte"));
    controller.advance().expect("step 1");
    controller.advance().expect("step 2");
    controller.select_mood(Mood::Focus);
    controller.advance().expect("step 3");
    controller.set_contact_field(ContactField::Name, "   ");

    let failure = controller.advance().expect_err("must fail");
    assert!(failure.contains(ValidationError::MissingName));
    assert!(failure.contains(ValidationError::MissingPickupTime));
    assert_eq!(failure.errors.len(), 2);
    assert_eq!(controller.step(), WizardStep::Contact);
    assert_eq!(controller.view().errors.len(), 2);
}

#[test]
fn displayed_errors_clear_on_next_attempt() {
    let mut controller = WizardController::default();
    controller.advance().expect_err("must fail");
    assert_eq!(controller.displayed_errors().len(), 1);

    controller.select_category(category("mocha"));
    controller.advance().expect("passes");
    assert!(controller.displayed_errors().is_empty());
}

#[test]
fn validate_is_pure_and_per_step() {
    let draft = OrderDraft::default();
    assert!(validate(&draft, WizardStep::Customize).is_ok());
    assert!(validate(&draft, WizardStep::Review).is_ok());
    assert!(validate(&draft, WizardStep::Category).is_err());
    assert!(validate(&draft, WizardStep::Mood).is_err());
    assert_eq!(draft, OrderDraft::default());
}

#[test]
fn retreat_never_goes_below_step_one() {
    let mut controller = WizardController::default();
    assert_eq!(controller.retreat(), WizardStep::Category);

    controller.select_category(category("espresso"));
    controller.advance().expect("step 1");
    controller.advance().expect("step 2");
    assert_eq!(controller.retreat(), WizardStep::Customize);
    assert_eq!(controller.retreat(), WizardStep::Category);
    assert_eq!(controller.retreat(), WizardStep::Category);
}

#[test]
fn advance_on_review_is_a_no_op() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    assert_eq!(controller.advance().expect("no-op"), WizardStep::Review);
    assert_eq!(controller.step(), WizardStep::Review);
}

#[test]
fn total_adds_size_surcharge_and_addons() {
    let mut controller = WizardController::default();
    controller.set_option(DrinkOption::Size(Size::Large));
    controller.toggle_addon("vanilla", Cents(50), true);
    assert_eq!(controller.compute_total(), Cents(849));

    controller.set_option(DrinkOption::Size(Size::Small));
    assert_eq!(controller.compute_total(), Cents(649));

    controller.toggle_addon("vanilla", Cents(50), false);
    controller.set_option(DrinkOption::Size(Size::Medium));
    assert_eq!(controller.compute_total(), Cents(699));
}

#[test]
fn review_summary_formats_every_field() {
    let controller = controller_at_review(SubmissionPolicy::default());
    let review = controller.review();

    assert_eq!(review.category, "Cold Brew");
    assert_eq!(review.size, "Large");
    assert_eq!(review.milk, "Whole");
    assert_eq!(review.sweetness, "30%");
    assert_eq!(review.ice, "50%");
    assert_eq!(review.shots, "3");
    assert_eq!(review.addons, "Vanilla");
    assert_eq!(review.mood, "Energetic");
    assert_eq!(review.name, "Ada");
    assert_eq!(review.phone, "Not provided");
    assert_eq!(review.pickup, "30 minutes");
    assert_eq!(review.total.to_string(), "$8.49");
}

#[test]
fn review_summary_without_addons_says_none() {
    let draft = OrderDraft::default();
    assert_eq!(ReviewSummary::from_draft(&draft).addons, "None");
}

#[test]
fn draft_is_read_only_on_review() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let before = controller.draft().clone();

    controller.select_category(category("matcha"));
    controller.adjust_shots(-1);
    controller.set_sweetness(0);
    controller.toggle_addon("caramel", Cents(75), true);
    controller.set_contact_field(ContactField::Name, "Grace");
    assert_eq!(controller.select_mood(Mood::Relaxing), None);

    assert_eq!(controller.draft(), &before);

    controller.retreat();
    controller.set_contact_field(ContactField::Name, "Grace");
    assert_eq!(controller.draft().name(), "Grace");
}

#[test]
fn view_tracks_buttons_and_progress() {
    let mut controller = WizardController::default();
    let view = controller.view();
    assert_eq!(view.progress_percent, 20);
    assert!(!view.show_previous);
    assert!(view.show_next);
    assert!(!view.show_confirm);

    controller.select_category(category("latte"));
    controller.advance().expect("step 1");
    let view = controller.view();
    assert_eq!(view.progress_percent, 40);
    assert!(view.show_previous);

    controller.advance().expect("step 2");
    assert_eq!(controller.view().progress_percent, 60);
    controller.select_mood(Mood::Focus);
    controller.advance().expect("step 3");
    assert_eq!(controller.step(), WizardStep::Contact);
    assert_eq!(controller.view().progress_percent, 80);

    let controller = controller_at_review(SubmissionPolicy::default());
    let view = controller.view();
    assert_eq!(view.progress_percent, 100);
    assert!(view.show_previous);
    assert!(!view.show_next);
    assert!(view.show_confirm);
    assert_eq!(view.order_number, None);
}

#[test]
fn payload_matches_intake_contract() {
    let controller = controller_at_review(SubmissionPolicy::default());
    let payload = controller.draft().to_payload(123_456);

    assert_eq!(payload.name, "Ada");
    assert_eq!(payload.phone, "Not provided");
    assert_eq!(payload.coffee_type, "Cold Brew - Large");
    assert_eq!(payload.customization.milk, "whole");
    assert_eq!(payload.customization.shots, 3);
    assert_eq!(payload.customization.sweetness, 30);
    assert_eq!(payload.customization.addons, vec!["vanilla".to_string()]);
    assert_eq!(payload.mood, "energetic");
    assert_eq!(payload.pickup_time, "30min");
    assert_eq!(payload.order_number, 123_456);
}

#[test]
fn contact_fields_are_stored_verbatim() {
    let mut controller = WizardController::default();
    controller.set_contact_field(ContactField::Name, "  Ada Lovelace ");
    controller.set_contact_field(ContactField::Phone, "+44 20 7946 0000");
    controller.set_contact_field(ContactField::PickupTime, "tomorrow");
    assert_eq!(controller.draft().name(), "  Ada Lovelace ");
    assert_eq!(controller.draft().phone(), "+44 20 7946 0000");
    assert_eq!(controller.draft().pickup_time(), "tomorrow");
    assert_eq!(controller.review().pickup, "tomorrow");
}

#[test]
fn open_with_preselected_category_skips_nothing_but_passes_step_one() {
    let mut controller =
        WizardController::open(SubmissionPolicy::default(), Some(category("cappuccino")));
    assert_eq!(controller.step(), WizardStep::Category);
    assert_eq!(
        controller.draft().category().map(Category::token),
        Some("cappuccino")
    );
    assert_eq!(controller.advance().expect("valid"), WizardStep::Customize);
}

#[test]
fn reset_discards_draft_and_position() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    controller.reset();
    assert_eq!(controller.step(), WizardStep::Category);
    assert_eq!(controller.draft(), &OrderDraft::default());
}

#[test]
fn subscribers_see_step_and_validation_events() {
    let mut controller = WizardController::default();
    let mut events = controller.subscribe();

    controller.advance().expect_err("no category");
    controller.select_category(category("latte"));
    controller.advance().expect("valid");

    assert!(matches!(
        events.try_recv(),
        Ok(WizardEvent::ValidationFailed(_))
    ));
    assert_eq!(events.try_recv().ok(), Some(WizardEvent::DraftChanged));
    assert_eq!(
        events.try_recv().ok(),
        Some(WizardEvent::StepChanged(WizardStep::Customize))
    );
}

#[test]
fn submission_is_only_accepted_on_review() {
    let mut controller = WizardController::default();
    assert!(matches!(
        controller.begin_submission(),
        Err(SubmitError::NotAtReview(WizardStep::Category))
    ));
}

#[test]
fn local_order_number_is_six_digits() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let pending = controller.begin_submission_with(&mut rng).expect("begin");
    assert!((100_000..=999_999).contains(&pending.order_number));
    assert_eq!(pending.payload.order_number, pending.order_number);
}

#[test]
fn second_confirm_while_in_flight_is_rejected() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let _pending = controller.begin_submission().expect("begin");

    assert!(matches!(
        controller.begin_submission(),
        Err(SubmitError::InFlight)
    ));
    assert!(controller.view().submitting);
    assert_eq!(controller.retreat(), WizardStep::Review);
}

#[test]
fn masked_failure_completes_with_local_number() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let pending = controller.begin_submission().expect("begin");
    let order_number = pending.order_number;

    let confirmation = controller
        .complete_submission(pending, Err(anyhow!("connection refused")))
        .expect("masked");

    assert_eq!(confirmation.display_number, order_number.to_string());
    assert!(!confirmation.delivered);
    assert_eq!(controller.step(), WizardStep::Success);
    assert_eq!(controller.view().order_number, Some(order_number.to_string()));
    assert_eq!(controller.view().progress_percent, 100);
    assert!(matches!(
        controller.begin_submission(),
        Err(SubmitError::AlreadyCompleted)
    ));
}

#[test]
fn server_order_id_replaces_local_number() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let pending = controller.begin_submission().expect("begin");

    let confirmation = controller
        .complete_submission(
            pending,
            Ok(OrderReceipt {
                order_id: Some("CB-1001".into()),
            }),
        )
        .expect("accepted");

    assert_eq!(confirmation.display_number, "CB-1001");
    assert!(confirmation.delivered);
}

#[test]
fn strict_policy_surfaces_failure_and_allows_retry() {
    let mut controller = controller_at_review(SubmissionPolicy::strict());
    let pending = controller.begin_submission().expect("begin");

    let err = controller
        .complete_submission(pending, Err(anyhow!("503 Service Unavailable")))
        .expect_err("strict");
    assert!(err.to_string().contains("503"));
    assert_eq!(controller.step(), WizardStep::Review);
    assert!(!controller.view().submitting);

    assert!(controller.begin_submission().is_ok());
}

#[test]
fn stale_completion_is_rejected() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let mut pending = controller.begin_submission().expect("begin");
    pending.order_number = pending.order_number.wrapping_add(1);

    assert!(matches!(
        controller.complete_submission(pending, Ok(OrderReceipt::default())),
        Err(SubmitError::NotInFlight)
    ));
}

#[test]
fn success_is_terminal_for_navigation() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let pending = controller.begin_submission().expect("begin");
    controller
        .complete_submission(pending, Ok(OrderReceipt::default()))
        .expect("complete");

    assert_eq!(controller.retreat(), WizardStep::Success);
    assert_eq!(controller.advance().expect("no-op"), WizardStep::Success);
    let view = controller.view();
    assert!(!view.show_previous && !view.show_next && !view.show_confirm);
}

#[test]
fn progress_is_reported_for_every_step() {
    let mut controller = WizardController::default();
    let mut seen = vec![controller.view().progress_percent];
    controller.select_category(category("americano"));
    controller.advance().expect("step 1");
    seen.push(controller.view().progress_percent);
    controller.advance().expect("step 2");
    seen.push(controller.view().progress_percent);
    controller.select_mood(Mood::Relaxing);
    controller.advance().expect("step 3");
    seen.push(controller.view().progress_percent);
    controller.set_contact_field(ContactField::Name, "Ada");
    controller.set_contact_field(ContactField::PickupTime, "asap");
    controller.advance().expect("step 4");
    seen.push(controller.view().progress_percent);

    assert_eq!(seen, vec![20, 40, 60, 80, 100]);
}

#[test]
fn mood_selection_is_refused_once_submitted() {
    let mut controller = controller_at_review(SubmissionPolicy::default());
    let pending = controller.begin_submission().expect("begin");
    controller
        .complete_submission(pending, Err(anyhow!("offline")))
        .expect("masked");
    assert_eq!(controller.step(), WizardStep::Success);

    assert_eq!(controller.select_mood(Mood::Focus), None);
    assert_eq!(controller.draft().mood(), Some(Mood::Energetic));
    assert_eq!(controller.draft().shots(), 3);
}

#[test]
fn total_saturates_with_oversized_addons() {
    let mut controller = WizardController::default();
    controller.toggle_addon("a", Cents(3_000_000_000), true);
    controller.toggle_addon("b", Cents(3_000_000_000), true);

    assert_eq!(controller.compute_total(), Cents(u32::MAX));
    assert_eq!(controller.review().total, Cents(u32::MAX));
}
