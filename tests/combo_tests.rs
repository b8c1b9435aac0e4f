use habitquest::combat::{ComboBonus, ComboDetector, SkillCast, SkillCombo};
use habitquest::data::default_combos;

fn combo(id: &str, sequence: &[&str], window_ms: i64) -> SkillCombo {
    SkillCombo {
        id: id.to_string(),
        name: id.to_string(),
        sequence: sequence.iter().map(|s| s.to_string()).collect(),
        time_window_ms: window_ms,
        bonus_effect: ComboBonus::default(),
        replace_with_skill: None,
    }
}

#[test]
fn completes_on_the_final_cast() {
    let mut detector = ComboDetector::new(default_combos(), 16);
    assert!(detector.record("slash", 1_000).is_none());
    assert!(detector.record("slash", 2_000).is_none());
    let matched = detector.record("slash", 3_000).expect("third slash completes the combo");
    assert_eq!(matched.combo_id, "triple_slash");
    assert_eq!(matched.bonus.damage_multiplier, Some(1.5));
}

#[test]
fn casts_outside_the_window_do_not_count() {
    let mut detector = ComboDetector::new(default_combos(), 16);
    detector.record("slash", 0);
    detector.record("slash", 5_000);
    assert!(detector.record("slash", 10_001).is_none());
    assert!(detector.record("slash", 11_000).is_some());
}

#[test]
fn interrupted_sequence_does_not_match() {
    let mut detector = ComboDetector::new(default_combos(), 16);
    detector.record("slash", 1_000);
    detector.record("heal", 2_000);
    assert!(detector.record("slash", 3_000).is_none());
    detector.record("slash", 4_000);
    assert!(detector.record("slash", 5_000).is_some());
}

#[test]
fn longest_matching_sequence_wins() {
    let combos = vec![
        combo("double", &["a", "b"], 10_000),
        combo("triple", &["x", "a", "b"], 10_000),
    ];
    let mut detector = ComboDetector::new(combos, 8);
    detector.record("x", 1);
    detector.record("a", 2);
    assert_eq!(detector.record("b", 3).unwrap().combo_id, "triple");

    detector.record("a", 4);
    assert_eq!(detector.record("b", 5).unwrap().combo_id, "double");
}

#[test]
fn equal_lengths_fall_back_to_configuration_order() {
    let combos = vec![combo("first", &["a", "b"], 10_000), combo("second", &["a", "b"], 10_000)];
    let mut detector = ComboDetector::new(combos, 8);
    detector.record("a", 1);
    assert_eq!(detector.record("b", 2).unwrap().combo_id, "first");
}

#[test]
fn replacement_combo_names_the_follow_up() {
    let mut detector = ComboDetector::new(default_combos(), 16);
    detector.record("slash", 1_000);
    detector.record("fireball", 2_000);
    let matched = detector.record("power_strike", 3_000).unwrap();
    assert_eq!(matched.replace_with_skill.as_deref(), Some("finisher"));
}

#[test]
fn history_is_bounded_and_restorable() {
    let mut detector = ComboDetector::new(default_combos(), 4);
    for t in 0..10 {
        detector.record("heal", t);
    }
    assert_eq!(detector.history().count(), 4);

    let saved: Vec<SkillCast> = vec![
        SkillCast { skill_id: "slash".to_string(), timestamp: 1_000 },
        SkillCast { skill_id: "slash".to_string(), timestamp: 2_000 },
    ];
    let mut restored = ComboDetector::new(default_combos(), 16).with_history(saved);
    assert!(restored.record("slash", 3_000).is_some());
    assert_eq!(restored.history().count(), 3);
}

#[test]
fn empty_sequences_never_match() {
    let mut detector = ComboDetector::new(vec![combo("nothing", &[], 10_000)], 4);
    assert!(detector.record("slash", 1).is_none());
}

#[test]
fn out_of_order_casts_never_match() {
    let mut detector = ComboDetector::new(default_combos(), 16);
    detector.record("slash", 1_000);
    detector.record("power_strike", 2_000);
    assert!(detector.record("fireball", 3_000).is_none());

    let mut detector = ComboDetector::new(default_combos(), 16);
    detector.record("slash", 1_000);
    detector.record("fireball", 2_000);
    assert!(detector.record("power_strike", 3_000).is_some());
    assert!(detector.record("heal", 4_000).is_none());
}
