use gtfs_graph::bitset::Validity;

#[test]
fn shift_left_moves_every_bit() {
    let v = Validity::from_bools(&[true, false, true, false]);
    let shifted = v.shift_left_by(1);
    assert!(!shifted.get(0));
    assert!(shifted.get(1));
    assert!(!shifted.get(2));
    assert!(shifted.get(3));
}

#[test]
fn intersects_detects_overlap() {
    let a = Validity::from_bools(&[true, false, true]);
    let b = Validity::from_bools(&[false, true, true]);
    assert!(a.intersects(&b));
    let c = Validity::from_bools(&[false, true, false]);
    assert!(!a.intersects(&c));
}

#[test]
fn and_not_clears_shared_bits() {
    let mut a = Validity::from_bools(&[true, true, false]);
    let b = Validity::from_bools(&[true, false, false]);
    a.and_not_in_place(&b);
    assert!(!a.get(0));
    assert!(a.get(1));
}

#[test]
fn cardinality_counts_set_bits() {
    let v = Validity::from_bools(&[true, true, false, true]);
    assert_eq!(v.cardinality(), 3);
}
