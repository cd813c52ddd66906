//! Unit tests for soa-vec.

use crate::soa_record;

soa_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Foo {
        pub i: i32,
        pub s: String,
    }
}

impl Foo {
    fn new(i: i32) -> Self {
        Self { i, s: format!("hello {i}") }
    }

    /// A record-level conversion rule; proxies only expose it via `value()`.
    fn is_set(&self) -> bool {
        self.i != 0
    }
}

soa_record! {
    /// `PartialEq` is not reflexive for NaN.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Reading {
        pub value: f32,
        pub unit:  u8,
    }
}

soa_record! {
    /// The zero-sized first field can reserve any capacity; `big` cannot.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Tagged {
        pub unit: (),
        pub big:  u64,
    }
}

soa_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Pair {
        pub a:    u64,
        pub b:    u64,
        pub name: String,
    }
}

fn foos(range: std::ops::RangeInclusive<i32>) -> crate::SoaVec<Foo> {
    range.map(Foo::new).collect()
}

fn contents<R: crate::Record>(v: &crate::SoaVec<R>) -> Vec<R> {
    v.iter().map(|e| e.value()).collect()
}

// ── Scenario ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use super::*;
    use crate::SoaVec;

    #[test]
    fn build_access_erase_swap() {
        let mut v = SoaVec::from([Foo::new(1), Foo::new(2), Foo::new(3)]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.at(0).unwrap().value(), Foo { i: 1, s: "hello 1".into() });
        assert_eq!(v.field_array::<i32>("i").unwrap(), &[1, 2, 3]);

        let mut original = v.clone();

        let first = v.begin().index();
        let cursor = v.erase(first);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.get().value(), Foo::new(2));
        assert_eq!(v.len(), 2);
        assert_eq!(contents(&v), vec![Foo::new(2), Foo::new(3)]);

        original.swap_elements(0, 1);
        assert_eq!(contents(&original), vec![Foo::new(2), Foo::new(1), Foo::new(3)]);
    }

    #[test]
    fn record_rules_pass_through_value() {
        let v = SoaVec::from(vec![Foo::default(), Foo::new(4)]);
        assert!(!v.element(0).value().is_set());
        assert!(v.element(1).value().is_set());
    }

    #[test]
    fn debug_lists_records() {
        let v = foos(1..=1);
        assert_eq!(format!("{v:?}"), r#"[Foo { i: 1, s: "hello 1" }]"#);
    }
}

// ── Construction & assignment ─────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::*;
    use crate::{SoaError, SoaVec};

    #[test]
    fn empty_and_presized() {
        let v: SoaVec<Foo> = SoaVec::new();
        assert!(v.is_empty());
        assert!(v.front().is_none());
        assert!(v.back().is_none());

        let v = SoaVec::<Foo>::with_len(4);
        assert_eq!(contents(&v), vec![Foo::default(); 4]);

        let v = SoaVec::from_elem(3, &Foo::new(9));
        assert_eq!(contents(&v), vec![Foo::new(9); 3]);
        assert!(v.store().is_lockstep());
    }

    #[test]
    fn copy_is_independent() {
        let a = foos(1..=3);
        let mut b = a.clone();
        b.element_mut(0).set(Foo::new(7));
        assert_eq!(a.element(0).value(), Foo::new(1));
        assert_eq!(b.element(0).value(), Foo::new(7));

        let mut c = foos(1..=10);
        c.clone_from(&a);
        assert_eq!(c, a);
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a = foos(1..=3);
        let b = a.take();
        assert_eq!(a.len(), 0);
        assert!(a.store().is_lockstep());
        assert_eq!(contents(&b), vec![Foo::new(1), Foo::new(2), Foo::new(3)]);

        // Still usable after the move.
        a.push(Foo::new(5));
        assert_eq!(contents(&a), vec![Foo::new(5)]);

        let mut target = foos(7..=9);
        assert_eq!(target.len(), 3);
        target = a.take();
        assert_eq!(contents(&target), vec![Foo::new(5)]);
        assert!(a.is_empty());
    }

    #[test]
    fn assignment_discards_prior_content() {
        let mut v = foos(1..=5);
        v.assign(2, &Foo::new(0));
        assert_eq!(contents(&v), vec![Foo::new(0); 2]);

        v.assign_iter((10..=12).map(Foo::new));
        assert_eq!(v.column(Foo::i), &[10, 11, 12]);

        v.assign_from_slice(&[Foo::new(4)]);
        assert_eq!(contents(&v), vec![Foo::new(4)]);
    }

    #[test]
    fn checked_access() {
        let mut v = foos(1..=2);
        assert!(v.at(1).is_ok());
        match v.at(2) {
            Err(SoaError::OutOfRange { index, len }) => assert_eq!((index, len), (2, 2)),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
        assert!(v.at_mut(5).is_err());
        assert!(v.get(2).is_none());
        assert_eq!(v.back().unwrap().value(), Foo::new(2));
        v.front_mut().unwrap().set(Foo::new(8));
        v.back_mut().unwrap().set(Foo::new(9));
        assert_eq!(v.column(Foo::i), &[8, 9]);
    }

    #[test]
    #[should_panic]
    fn unchecked_access_past_end_panics() {
        let v = foos(1..=2);
        let _ = v.element(2).get(Foo::i);
    }
}

// ── Element proxies ───────────────────────────────────────────────────────────

#[cfg(test)]
mod element {
    use super::*;
    use crate::{ByType, SoaError, SoaVec, element};

    #[test]
    fn set_then_value_round_trips() {
        let mut v = foos(1..=3);
        let record = Foo { i: -4, s: "written".into() };
        let mut e = v.element_mut(1);
        e.set(record.clone());
        assert_eq!(e.value(), record);
        assert_eq!(e.replace(Foo::new(2)), record);
        assert_eq!(contents(&v), vec![Foo::new(1), Foo::new(2), Foo::new(3)]);
    }

    #[test]
    fn field_writes_go_to_the_array() {
        let mut v = foos(1..=3);
        {
            let mut e = v.element_mut(2);
            *e.get_mut(Foo::i) = 30;
            e.field_mut::<String>("s").unwrap().push('!');
            *e.field_mut::<i32>(ByType).unwrap() += 1;
        }
        assert_eq!(v.column(Foo::i), &[1, 2, 31]);
        assert_eq!(v.column(Foo::s)[2], "hello 3!");
    }

    #[test]
    fn selector_errors() {
        let v = SoaVec::from(vec![Pair::default()]);
        let e = v.element(0);
        assert!(matches!(e.field::<u64>(ByType), Err(SoaError::AmbiguousFieldType { .. })));
        assert!(matches!(e.field::<String>(0usize), Err(SoaError::FieldTypeMismatch { .. })));
        assert!(matches!(e.field::<u64>("c"), Err(SoaError::UnknownField { .. })));
        assert!(matches!(e.field::<u64>(9usize), Err(SoaError::FieldIndexOutOfRange { .. })));
        assert_eq!(e.field::<String>(ByType).unwrap(), "");
        assert_eq!(*e.field::<u64>("b").unwrap(), 0);
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn identity_fast_path_skips_field_comparison() {
        let v = SoaVec::from(vec![Reading { value: f32::NAN, unit: 1 }]);
        let p = v.element(0);
        assert_ne!(p.value(), p.value());
        assert!(p == p);
        assert!(v.element(0) == v.begin().get());
        assert!(v == v);

        let other = v.clone();
        assert!(other.element(0) != p);
    }

    #[test]
    fn proxy_compares_with_records() {
        let mut a = foos(1..=2);
        let b = foos(2..=2);
        assert!(a.element(1) == b.element(0));
        assert!(a.element(0) == Foo::new(1));
        assert!(a.element(0) != Foo::new(2));
        assert!(a.element_mut(1) == Foo::new(2));
    }

    #[test]
    fn swap_across_containers() {
        let mut a = foos(1..=2);
        let mut b = foos(5..=6);
        element::swap(&mut a.element_mut(0), &mut b.element_mut(1));
        assert_eq!(a.column(Foo::i), &[6, 2]);
        assert_eq!(b.column(Foo::i), &[5, 1]);
        assert_eq!(b.column(Foo::s)[1], "hello 1");
    }

    #[test]
    fn copy_element_within_container() {
        let mut v = foos(1..=3);
        v.copy_element(2, 0);
        assert_eq!(contents(&v), vec![Foo::new(3), Foo::new(2), Foo::new(3)]);
    }
}

// ── Cursors & iteration ───────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use super::*;

    #[test]
    fn arithmetic_and_ordering() {
        let v = foos(1..=5);
        let begin = v.begin();
        let end = v.end();
        assert_eq!(begin.distance(&end), 5);
        assert_eq!(end.distance(&begin), -5);
        assert!(end.is_end());
        assert!(!begin.is_end());

        let mut c = begin + 2;
        assert_eq!(c.get().value(), Foo::new(3));
        c.advance();
        assert_eq!(c.index(), 3);
        c.retreat().retreat();
        assert_eq!(c.index(), 1);
        c += 3;
        assert_eq!(c.index(), 4);
        c -= 4;
        assert!(c == begin);
        assert!(begin < end);
        assert_eq!((end - 1).get().value(), Foo::new(5));
        assert_eq!(end.offset(-5), begin);
        assert_eq!(begin.offset(5), end);
    }

    #[test]
    fn cursors_of_different_containers_are_unordered() {
        let a = foos(1..=2);
        let b = foos(1..=2);
        assert!(a.begin() != b.begin());
        assert_eq!(a.begin().partial_cmp(&b.begin()), None);
    }

    #[test]
    #[should_panic(expected = "end cursor")]
    fn dereferencing_end_panics() {
        let v = foos(1..=2);
        let _ = v.end().get();
    }

    #[test]
    #[should_panic(expected = "before the first position")]
    fn moving_before_begin_panics() {
        let v = foos(1..=2);
        let _ = v.begin() - 1;
    }

    #[test]
    #[should_panic(expected = "past the end")]
    fn jumping_past_end_panics() {
        let v = foos(1..=3);
        assert!((v.begin() + 3).is_end());
        let _ = v.begin() + 10;
    }

    #[test]
    #[should_panic(expected = "past the end")]
    fn advancing_from_end_panics() {
        let mut v = foos(1..=2);
        let mut c = v.cursor_mut(2);
        c.advance();
    }

    #[test]
    fn mutable_traversal() {
        let mut v = foos(1..=4);
        let mut c = v.begin_mut();
        while !c.is_end() {
            *c.get_mut().get_mut(Foo::i) *= 10;
            c.advance();
        }
        assert_eq!(v.column(Foo::i), &[10, 20, 30, 40]);

        let e = v.cursor_mut(1).into_element();
        assert_eq!(e.value(), Foo { i: 20, s: "hello 2".into() });
    }

    #[test]
    fn iterators() {
        let v = foos(1..=4);
        let it = v.iter();
        assert_eq!(it.len(), 4);
        let rev: Vec<i32> = v.iter().rev().map(|e| *e.get(Foo::i)).collect();
        assert_eq!(rev, vec![4, 3, 2, 1]);
        assert_eq!(v.iter().nth(2).unwrap().value(), Foo::new(3));
        assert!(v.iter().nth(9).is_none());

        let tail: Vec<i32> = (v.begin() + 2).into_iter().map(|e| *e.get(Foo::i)).collect();
        assert_eq!(tail, vec![3, 4]);
        assert_eq!(v.end().iter().count(), 0);

        let mut n = 0;
        for e in &v {
            n += *e.get(Foo::i);
        }
        assert_eq!(n, 10);
    }

    #[test]
    fn owned_iteration_moves_records_out() {
        let v = foos(1..=4);
        let mut it = v.into_iter();
        assert_eq!(it.next(), Some(Foo::new(1)));
        assert_eq!(it.next_back(), Some(Foo::new(4)));
        assert_eq!(it.len(), 2);
        assert_eq!(it.collect::<Vec<_>>(), vec![Foo::new(2), Foo::new(3)]);
    }
}

// ── Structural mutation ───────────────────────────────────────────────────────

#[cfg(test)]
mod mutation {
    use super::*;
    use crate::{SoaError, SoaVec};

    #[test]
    fn insert_shifts_and_returns_cursor() {
        let mut v = foos(1..=3);
        let c = v.insert(1, Foo::new(9));
        assert_eq!(c.index(), 1);
        assert_eq!(c.get().value(), Foo::new(9));
        assert_eq!(v.column(Foo::i), &[1, 9, 2, 3]);

        v.insert(4, Foo::new(4));
        assert_eq!(v.column(Foo::i), &[1, 9, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "insertion index")]
    fn insert_past_end_panics() {
        let mut v = foos(1..=3);
        v.insert(4, Foo::new(0));
    }

    #[test]
    fn insert_n_matches_sequential_inserts() {
        let value = Foo::new(7);
        for pos in 0..=3 {
            let mut batched = foos(1..=3);
            let c = batched.insert_n(pos, 3, &value);
            assert_eq!(c.index(), pos);

            let mut sequential = foos(1..=3);
            for k in 0..3 {
                sequential.insert(pos + k, value.clone());
            }
            assert_eq!(batched, sequential);
            assert!(batched.store().is_lockstep());
        }
    }

    #[test]
    fn range_insert_preserves_order() {
        let mut v = foos(1..=2);
        let c = v.insert_iter(1, (10..=13).map(Foo::new));
        assert_eq!(c.index(), 1);
        assert_eq!(v.column(Foo::i), &[1, 10, 11, 12, 13, 2]);

        v.insert_slice(0, &[Foo::new(-1), Foo::new(-2)]);
        assert_eq!(v.column(Foo::i), &[-1, -2, 1, 10, 11, 12, 13, 2]);
        assert_eq!(v.column(Foo::s)[1], "hello -2");
    }

    #[test]
    fn erase_shifts_following_records() {
        let mut v = foos(1..=5);
        let c = v.erase(2);
        assert_eq!(c.get().value(), Foo::new(4));
        assert_eq!(v.column(Foo::i), &[1, 2, 4, 5]);

        let c = v.erase(3);
        assert!(c.is_end());

        let c = v.erase_range(0..2);
        assert_eq!(c.index(), 0);
        assert_eq!(contents(&v), vec![Foo::new(4)]);

        v.erase_range(1..1);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn push_pop_truncate_clear() {
        let mut v = SoaVec::new();
        v.push(Foo::new(1));
        v.extend([Foo::new(2), Foo::new(3)]);
        assert_eq!(v.pop(), Some(Foo::new(3)));
        v.truncate(1);
        assert_eq!(contents(&v), vec![Foo::new(1)]);
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.pop(), None);
    }

    #[test]
    fn resize_both_ways() {
        let mut v = foos(1..=2);
        v.resize(4);
        assert_eq!(contents(&v)[2..], [Foo::default(), Foo::default()]);
        v.resize_with_value(6, &Foo::new(5));
        assert_eq!(v.column(Foo::i), &[1, 2, 0, 0, 5, 5]);
        v.resize_with_value(1, &Foo::new(5));
        assert_eq!(contents(&v), vec![Foo::new(1)]);
        v.try_resize(3).unwrap();
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn whole_store_swap() {
        let mut a = foos(1..=3);
        let mut b = foos(8..=9);
        a.swap(&mut b);
        assert_eq!(a.column(Foo::i), &[8, 9]);
        assert_eq!(b.column(Foo::i), &[1, 2, 3]);
    }

    #[test]
    fn retain_keeps_lockstep() {
        let mut v = foos(1..=6);
        v.retain(|e| *e.get(Foo::i) % 2 == 0);
        assert_eq!(contents(&v), vec![Foo::new(2), Foo::new(4), Foo::new(6)]);
        assert!(v.store().is_lockstep());
    }

    #[test]
    fn capacity_management() {
        let mut v = foos(1..=3);
        v.reserve(100);
        assert!(v.capacity() >= 103);
        v.shrink_to_fit();
        assert!(v.capacity() >= 3);
        assert!(v.max_len() > 0);
    }

    #[test]
    fn failed_growth_leaves_container_unchanged() {
        let mut v = foos(1..=3);
        let before = contents(&v);

        assert!(matches!(v.try_reserve(usize::MAX), Err(SoaError::Allocation { .. })));
        assert!(matches!(v.try_push(Foo::new(4)), Ok(())));
        v.pop();

        assert!(v.try_insert_n(1, usize::MAX, &Foo::new(0)).is_err());
        assert!(v.try_resize(usize::MAX).is_err());
        assert_eq!(contents(&v), before);
        assert!(v.store().is_lockstep());

        let c = v.try_insert(0, Foo::new(0)).unwrap();
        assert_eq!(c.index(), 0);
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn later_field_failure_rolls_back_earlier_fields() {
        let mut v = SoaVec::from_elem(3, &Tagged { unit: (), big: 7 });
        let capacity = v.capacity();

        match v.try_reserve(usize::MAX / 2) {
            Err(SoaError::Allocation { field, .. }) => assert_eq!(field, "big"),
            other => panic!("expected Allocation on `big`, got {other:?}"),
        }
        assert_eq!(v.len(), 3);
        assert_eq!(v.capacity(), capacity);
        assert!(v.store().is_lockstep());
        assert_eq!(v.column(Tagged::big), &[7, 7, 7]);

        assert!(v.try_push(Tagged { unit: (), big: 8 }).is_ok());
        assert_eq!(v.column(Tagged::big), &[7, 7, 7, 8]);
    }
}

// ── Randomised lockstep ───────────────────────────────────────────────────────

#[cfg(test)]
mod lockstep {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::SoaVec;

    /// Apply the same random operation to a `SoaVec` and a `Vec` model.
    fn step(rng: &mut SmallRng, v: &mut SoaVec<Foo>, model: &mut Vec<Foo>) {
        let len = model.len();
        let value = Foo::new(rng.gen_range(-100..100));
        match rng.gen_range(0..12) {
            0 | 1 => {
                v.push(value.clone());
                model.push(value);
            }
            2 => {
                let pos = rng.gen_range(0..=len);
                v.insert(pos, value.clone());
                model.insert(pos, value);
            }
            3 => {
                let pos = rng.gen_range(0..=len);
                let n = rng.gen_range(0..4);
                v.insert_n(pos, n, &value);
                model.splice(pos..pos, std::iter::repeat(value).take(n));
            }
            4 if len > 0 => {
                let pos = rng.gen_range(0..len);
                v.erase(pos);
                model.remove(pos);
            }
            5 => {
                let start = rng.gen_range(0..=len);
                let end = rng.gen_range(start..=len);
                v.erase_range(start..end);
                model.drain(start..end);
            }
            6 => assert_eq!(v.pop(), model.pop()),
            7 => {
                let n = rng.gen_range(0..=len + 3);
                v.resize_with_value(n, &value);
                model.resize(n, value);
            }
            8 if len > 0 => {
                let (a, b) = (rng.gen_range(0..len), rng.gen_range(0..len));
                v.swap_elements(a, b);
                model.swap(a, b);
            }
            9 if len > 0 => {
                let (from, to) = (rng.gen_range(0..len), rng.gen_range(0..len));
                v.copy_element(from, to);
                model[to] = model[from].clone();
            }
            10 => {
                v.retain(|e| *e.get(Foo::i) % 3 != 0);
                model.retain(|r| r.i % 3 != 0);
            }
            11 if len > 0 => {
                let pos = rng.gen_range(0..len);
                v.element_mut(pos).set(value.clone());
                model[pos] = value;
            }
            _ => {
                v.truncate(len / 2);
                model.truncate(len / 2);
            }
        }
    }

    #[test]
    fn random_operations_keep_arrays_in_lockstep() {
        for seed in [1, 7, 42] {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut v = SoaVec::new();
            let mut model = Vec::new();
            for _ in 0..400 {
                step(&mut rng, &mut v, &mut model);
                assert!(v.store().is_lockstep(), "seed {seed}: field lengths diverged");
                assert_eq!(v.len(), model.len());
            }
            assert_eq!(contents(&v), model, "seed {seed}");
        }
    }
}
