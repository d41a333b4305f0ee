use crate::core::expression::parse;
use crate::core::types::{KeyStroke, Keysym, ModifierMask, Remap, Target};

#[test]
fn test_holds_is_bitmask_subset() {
    let state = ModifierMask::CONTROL | ModifierMask::SHIFT;

    assert!(state.holds(ModifierMask::CONTROL));
    assert!(state.holds(ModifierMask::empty()));
    assert!(state.holds(state));
    assert!(!state.holds(ModifierMask::CONTROL | ModifierMask::MOD1));
}

#[test]
fn test_unknown_bits_are_retained() {
    // Button1 lives above the modifier bits
    let state = ModifierMask::from_bits_retain((1 << 8) | ModifierMask::CONTROL.bits());

    assert!(state.holds(ModifierMask::CONTROL));
    assert_eq!(state.difference(ModifierMask::CONTROL).bits(), 1 << 8);
}

#[test]
fn test_specificity_counts_bits() {
    assert_eq!(ModifierMask::empty().specificity(), 0);
    assert_eq!((ModifierMask::CONTROL | ModifierMask::SHIFT).specificity(), 2);
}

#[test]
fn test_key_stroke_display_is_canonical() {
    let stroke = KeyStroke::new(Keysym(0xff51), ModifierMask::MOD1 | ModifierMask::CONTROL);
    assert_eq!(stroke.to_string(), "C-M-Left");

    // Printing and parsing agree
    assert_eq!(parse(&stroke.to_string()).unwrap(), stroke);
}

#[test]
fn test_unnamed_keysym_prints_hex() {
    assert_eq!(Keysym(0x1234_5678).to_string(), "0x12345678");
}

#[test]
fn test_remap_display() {
    let remap = Remap {
        from: parse("C-k").unwrap(),
        to: vec![
            Target::Input(parse("Shift-End").unwrap()),
            Target::Input(parse("C-x").unwrap()),
            Target::Execute("notify-send cut".to_string()),
        ],
    };

    let display = remap.to_string();
    assert_eq!(display, "C-k => Shift-End, C-x, exec \"notify-send cut\"");
}

#[test]
fn test_press_release_display() {
    let stroke = parse("Shift_L").unwrap();
    assert_eq!(Target::Press(stroke).to_string(), "press Shift_L");
    assert_eq!(Target::Release(stroke).to_string(), "release Shift_L");
}
