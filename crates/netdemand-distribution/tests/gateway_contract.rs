#![forbid(unsafe_code)]

//! Contract tests for the mutation gateway.
//!
//! Covers validation, direct and undoable add/remove, structural errors
//! reached through the public API, and the compound edits.

use netdemand_distribution::{
    DemandDistribution, DistributionError, RouteDistribution, VTypeDistribution,
    ValidationFailure,
};
use netdemand_undo::{CommandError, CommandSource, ElementId, HistoryManager};

fn vtypes() -> VTypeDistribution {
    VTypeDistribution::new(ElementId::new(1), "mix")
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn valid_member_on_empty_distribution() {
    let d = vtypes();
    for (key, weight) in [("bus", "2"), ("car", "0"), ("truck", "0.25"), ("a:b", "1e2")] {
        assert!(d.is_valid_distribution(key, weight), "{key}:{weight}");
    }
}

#[test]
fn validation_reports_reasons() {
    let mut d = vtypes();
    d.add_distribution("bus", "2").unwrap();

    assert_eq!(d.validate_distribution("", "1"), Err(ValidationFailure::EmptyKey));
    assert!(matches!(
        d.validate_distribution("two words", "1"),
        Err(ValidationFailure::InvalidKey { ch: ' ', .. })
    ));
    assert_eq!(
        d.validate_distribution("bus", "1"),
        Err(ValidationFailure::KeyExists { key: "bus".into() })
    );
    assert_eq!(
        d.validate_distribution("car", "-1"),
        Err(ValidationFailure::InvalidWeight { value: "-1".into() })
    );
    assert!(!d.is_valid_distribution("car", "NaN"));
    assert!(!d.is_valid_distribution("car", ""));
}

#[test]
fn removal_validation() {
    let mut d = vtypes();
    assert!(!d.is_valid_distribution_removal("bus"));
    d.add_distribution("bus", "2").unwrap();
    assert!(d.is_valid_distribution_removal("bus"));
    assert_eq!(
        d.validate_distribution_removal("car"),
        Err(ValidationFailure::KeyMissing { key: "car".into() })
    );
}

#[test]
fn validation_has_no_side_effects() {
    let d = vtypes();
    assert!(d.is_valid_distribution("bus", "2"));
    assert!(d.is_valid_distribution("bus", "2"));
    assert_eq!(d.attribute_distribution(), "");
}

// ============================================================================
// Direct mutation
// ============================================================================

#[test]
fn scenario_bus_car() {
    let mut d = vtypes();
    assert_eq!(d.attribute_distribution(), "");
    d.add_distribution("bus", "2").unwrap();
    assert_eq!(d.attribute_distribution(), "bus:2");
    d.add_distribution("car", "1").unwrap();
    assert_eq!(d.attribute_distribution(), "bus:2 car:1");
    d.remove_distribution("bus").unwrap();
    assert_eq!(d.attribute_distribution(), "car:1");
}

#[test]
fn add_then_remove_restores_serialization() {
    let mut d = vtypes();
    d.add_distribution("bus", "2").unwrap();
    let before = d.attribute_distribution();
    d.add_distribution("car", "1").unwrap();
    d.remove_distribution("car").unwrap();
    assert_eq!(d.attribute_distribution(), before);
}

#[test]
fn duplicate_add_fails_and_store_unchanged() {
    let mut d = vtypes();
    d.add_distribution("bus", "2").unwrap();
    let err = d.add_distribution("bus", "5").unwrap_err();
    assert_eq!(err, DistributionError::DuplicateKey { key: "bus".into() });
    assert!(err.is_structural());
    assert_eq!(d.attribute_distribution(), "bus:2");
}

#[test]
fn remove_unknown_fails_and_store_unchanged() {
    let mut d = vtypes();
    d.add_distribution("bus", "2").unwrap();
    let err = d.remove_distribution("car").unwrap_err();
    assert_eq!(err, DistributionError::KeyNotFound { key: "car".into() });
    assert!(err.is_structural());
    assert_eq!(d.attribute_distribution(), "bus:2");
}

#[test]
fn malformed_weight_is_invalid_argument() {
    let mut d = vtypes();
    let err = d.add_distribution("bus", "heavy").unwrap_err();
    assert!(matches!(err, DistributionError::InvalidArgument { .. }));
    let err = d.add_distribution("", "1").unwrap_err();
    assert!(matches!(err, DistributionError::InvalidArgument { .. }));
    assert_eq!(d.attribute_distribution(), "");
}

// ============================================================================
// Undoable mutation
// ============================================================================

#[test]
fn add_undo_redo() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("A", "0.5", &mut history).unwrap();
    assert_eq!(d.attribute_distribution(), "A:0.5");

    history.undo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "");

    history.redo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "A:0.5");
}

#[test]
fn repeated_cycling_is_stable() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("A", "0.5", &mut history).unwrap();
    for _ in 0..10 {
        history.undo().unwrap().unwrap();
        history.redo().unwrap().unwrap();
    }
    assert_eq!(d.attribute_distribution(), "A:0.5");
    assert_eq!(history.undo_depth(), 1);
}

#[test]
fn remove_undo_restores_weight_text_and_position() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution("a", "1").unwrap();
    d.add_distribution("b", "0.50").unwrap();
    d.add_distribution("c", "3").unwrap();

    d.remove_distribution_with_undo("b", &mut history).unwrap();
    assert_eq!(d.attribute_distribution(), "a:1 c:3");

    history.undo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "a:1 b:0.50 c:3");

    history.redo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "a:1 c:3");
}

#[test]
fn failed_mutation_records_nothing() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();

    assert!(d.add_distribution_with_undo("bus", "3", &mut history).is_err());
    assert!(d.remove_distribution_with_undo("car", &mut history).is_err());
    assert!(d.add_distribution_with_undo("car", "-3", &mut history).is_err());

    assert_eq!(history.undo_depth(), 1);
    assert_eq!(d.attribute_distribution(), "bus:2");
}

#[test]
fn direct_mutation_records_nothing() {
    let mut d = vtypes();
    let history = HistoryManager::default();
    d.add_distribution("bus", "2").unwrap();
    d.remove_distribution("bus").unwrap();
    assert!(!history.can_undo());
}

#[test]
fn one_history_serves_many_elements() {
    let mut vt = vtypes();
    let mut routes = RouteDistribution::new(ElementId::new(2), "alternatives");
    let mut history = HistoryManager::default();

    vt.add_distribution_with_undo("bus", "2", &mut history).unwrap();
    routes.add_distribution_with_undo("north", "3", &mut history).unwrap();
    vt.add_distribution_with_undo("car", "1", &mut history).unwrap();

    history.undo().unwrap().unwrap();
    assert_eq!(vt.attribute_distribution(), "bus:2");
    assert_eq!(routes.attribute_distribution(), "north:3");

    history.undo().unwrap().unwrap();
    assert_eq!(routes.attribute_distribution(), "");

    history.undo().unwrap().unwrap();
    assert_eq!(vt.attribute_distribution(), "");
    assert!(history.undo().is_none());
}

#[test]
fn out_of_band_edit_surfaces_as_failed_undo() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();

    // The entry disappears without going through the history.
    d.remove_distribution("bus").unwrap();

    assert!(history.undo().unwrap().is_err());
    assert_eq!(history.undo_depth(), 1);
}

// ============================================================================
// Compound edits
// ============================================================================

#[test]
fn set_weight_is_single_undo_step() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution("bus", "2").unwrap();
    d.add_distribution("car", "1").unwrap();

    d.set_distribution_weight("bus", "5", Some(&mut history)).unwrap();
    assert_eq!(d.attribute_distribution(), "car:1 bus:5");
    assert_eq!(history.undo_depth(), 1);

    history.undo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "bus:2 car:1");

    history.redo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "car:1 bus:5");
}

#[test]
fn set_weight_failures_change_nothing() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution("bus", "2").unwrap();

    assert!(matches!(
        d.set_distribution_weight("bus", "x", Some(&mut history)),
        Err(DistributionError::InvalidArgument { .. })
    ));
    assert_eq!(
        d.set_distribution_weight("car", "1", Some(&mut history)),
        Err(DistributionError::KeyNotFound { key: "car".into() })
    );
    assert_eq!(d.attribute_distribution(), "bus:2");
    assert!(!history.can_undo());
}

#[test]
fn set_attribute_replaces_contents() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution("bus", "2").unwrap();
    d.add_distribution("car", "1").unwrap();

    d.set_attribute_distribution("car:4 tram:1", Some(&mut history)).unwrap();
    assert_eq!(d.attribute_distribution(), "car:4 tram:1");
    assert_eq!(history.undo_depth(), 1);

    history.undo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "bus:2 car:1");

    history.redo().unwrap().unwrap();
    assert_eq!(d.attribute_distribution(), "car:4 tram:1");
}

#[test]
fn set_attribute_with_bad_string_changes_nothing() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution("bus", "2").unwrap();

    assert!(matches!(
        d.set_attribute_distribution("car:1 broken", Some(&mut history)),
        Err(DistributionError::Malformed { index: 1, .. })
    ));
    assert_eq!(
        d.set_attribute_distribution("a:1 a:2", None),
        Err(DistributionError::DuplicateKey { key: "a".into() })
    );
    assert_eq!(d.attribute_distribution(), "bus:2");
    assert!(!history.can_undo());
}

#[test]
fn set_attribute_empty_to_empty_records_nothing() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.set_attribute_distribution("", Some(&mut history)).unwrap();
    assert!(!history.can_undo());
}

#[test]
fn history_descriptions_name_the_edit() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();
    assert_eq!(history.next_undo_description(), Some("Add distribution member"));
    d.set_distribution_weight("bus", "3", Some(&mut history)).unwrap();
    assert_eq!(history.next_undo_description(), Some("Change distribution weight"));
    d.remove_distribution_with_undo("bus", &mut history).unwrap();
    assert_eq!(history.next_undo_description(), Some("Remove distribution member"));
}

#[test]
fn edit_sources_are_recorded() {
    let mut d = vtypes();
    let mut history = HistoryManager::default();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();
    assert_eq!(history.next_undo_metadata().unwrap().source, CommandSource::User);

    d.set_attribute_distribution("car:1", Some(&mut history)).unwrap();
    assert_eq!(history.next_undo_metadata().unwrap().source, CommandSource::Loader);

    d.set_distribution_weight("car", "4", Some(&mut history)).unwrap();
    assert_eq!(history.next_undo_metadata().unwrap().source, CommandSource::User);
}

// ============================================================================
// Dropped elements
// ============================================================================

#[test]
fn undo_after_element_dropped_reports_target_not_found() {
    let mut history = HistoryManager::default();
    let mut d = vtypes();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();
    drop(d);

    assert_eq!(
        history.undo(),
        Some(Err(CommandError::TargetNotFound(ElementId::new(1))))
    );
    assert_eq!(history.undo_depth(), 1);
    assert!(!history.can_redo());
}

#[test]
fn dropped_batch_reports_target_not_found() {
    let mut history = HistoryManager::default();
    let mut d = vtypes();
    d.add_distribution("bus", "2").unwrap();
    d.set_distribution_weight("bus", "3", Some(&mut history)).unwrap();
    drop(d);

    let result = history.undo().unwrap();
    assert_eq!(result, Err(CommandError::TargetNotFound(ElementId::new(1))));
}

#[test]
fn forgetting_a_dropped_element_keeps_other_history() {
    let mut history = HistoryManager::default();
    let mut routes = RouteDistribution::new(ElementId::new(2), "alternatives");
    let mut d = vtypes();

    routes.add_distribution_with_undo("north", "3", &mut history).unwrap();
    d.add_distribution_with_undo("bus", "2", &mut history).unwrap();
    d.add_distribution_with_undo("car", "1", &mut history).unwrap();

    let gone = d.element_id();
    drop(d);
    assert_eq!(history.forget_target(gone), 2);

    history.undo().unwrap().unwrap();
    assert_eq!(routes.attribute_distribution(), "");
    assert!(!history.can_undo());
}
