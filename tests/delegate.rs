use minidelegate::*;
use proptest::prelude::*;
use std::ptr::NonNull;

fn wrapping_add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

fn wrapping_mul(a: i32, b: i32) -> i32 {
    a.wrapping_mul(b)
}

fn checked_div(divisor: isize, x: isize) -> Option<isize> {
    x.checked_div(divisor)
}

fn clamp(low: u8, high: u8, x: u8) -> u8 {
    x.max(low).min(high)
}

struct Sensor {
    offset: i32,
    readings: u32,
}

impl Sensor {
    fn calibrated(&self, raw: i32) -> i32 {
        raw.wrapping_add(self.offset)
    }

    fn record(&mut self, raw: i32) -> u32 {
        self.offset = raw;
        self.readings += 1;
        self.readings
    }
}

proptest! {
    #[test]
    fn free_function_matches_direct_call(a in any::<i32>(), b in any::<i32>()) {
        let mut d: Delegate<'_, fn(i32, i32) -> i32> = Delegate::from_fn(wrapping_add);

        prop_assert_eq!(d.call(a, b), wrapping_add(a, b));

        d.bind(wrapping_mul);

        prop_assert_eq!(d.call(a, b), wrapping_mul(a, b));
    }

    #[test]
    fn curried_matches_direct_call(divisor in any::<isize>(), x in any::<isize>()) {
        let mut d: Delegate<'_, fn(isize) -> Option<isize>> = Delegate::from_bound(checked_div, divisor);

        prop_assert_eq!(d.call(x), checked_div(divisor, x));
    }

    #[test]
    fn method_matches_direct_call(offset in any::<i32>(), raw in any::<i32>()) {
        let sensor = Sensor { offset, readings: 0 };

        let mut d: Delegate<'_, fn(i32) -> i32> = Delegate::from_method(Sensor::calibrated, &sensor);

        prop_assert_eq!(d.call(raw), sensor.calibrated(raw));
        prop_assert_eq!(unsafe { d.instance() }, &sensor as *const Sensor as *const ());
    }

    #[test]
    fn closure_matches_direct_call(low in any::<u8>(), high in any::<u8>(), x in any::<u8>()) {
        let direct = move |x: u8| clamp(low, high, x);

        let mut d: Delegate<'_, fn(u8) -> u8> = Delegate::from_closure(direct);

        prop_assert_eq!(d.call(x), direct(x));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn equality_ignores_instance(first in any::<i32>(), second in any::<i32>()) {
        let a = Sensor { offset: first, readings: 0 };
        let b = Sensor { offset: second, readings: 0 };

        let x: Delegate<'_, fn(i32) -> i32> = Delegate::from_method(Sensor::calibrated, &a);
        let y: Delegate<'_, fn(i32) -> i32> = Delegate::from_method(Sensor::calibrated, &b);

        prop_assert_eq!(x, y);
    }
}

#[test]
fn default_is_unbound() {
    let d: Delegate<'_, fn(i32, i32) -> i32> = Delegate::default();

    assert!(!d.is_bound());
    assert!(unsafe { d.instance() }.is_null());
    assert_eq!(d, Delegate::new());
}

#[test]
#[should_panic(expected = "tried to call an unbound delegate")]
fn unbound_call_panics() {
    let mut d: Delegate<'_, fn(&'static str) -> usize> = Delegate::new();

    d.call("hello");
}

#[test]
fn method_mut_records() {
    let mut sensor = Sensor {
        offset: 0,
        readings: 0,
    };

    let mut d: Delegate<'_, fn(i32) -> u32> =
        unsafe { Delegate::from_method_mut(Sensor::record, NonNull::from(&mut sensor)) };

    assert_eq!(d.call(3), 1);
    assert_eq!(d.call(-4), 2);

    assert_eq!(sensor.readings, 2);
    assert_eq!(sensor.offset, -4);
}

#[test]
fn reset_is_idempotent() {
    let sensor = Sensor {
        offset: 1,
        readings: 0,
    };

    let mut bound: [Delegate<'_, fn(i32) -> i32>; 4] = [
        Delegate::new(),
        Delegate::from_fn(|x: i32| x),
        Delegate::from_method(Sensor::calibrated, &sensor),
        Delegate::from_closure(|x: i32| x + 1),
    ];

    for d in bound.iter_mut() {
        d.reset();

        let once = *d;

        d.reset();

        assert!(!d.is_bound());
        assert!(unsafe { d.instance() }.is_null());
        assert_eq!(*d, once);
        assert_eq!(*d, Delegate::new());
    }
}

#[test]
fn padded_payload() {
    // `(u8, u16)` leaves a padding byte in the storage.
    fn calibrate(trim: (u8, u16), raw: i32) -> i32 {
        raw.wrapping_add(trim.0 as i32).wrapping_sub(trim.1 as i32)
    }

    let sensor = Sensor {
        offset: 7,
        readings: 0,
    };

    let mut d: Delegate<'_, fn(i32) -> i32> = Delegate::from_bound(calibrate, (3u8, 1u16));
    let snapshot = d;

    assert_eq!(d.call(10), 12);
    assert_eq!(d, snapshot);
    assert_eq!(format!("{:?}", d), format!("{:?}", snapshot));

    d.bind_method(Sensor::calibrated, &sensor);

    assert_eq!(d.call(10), 17);
    assert_eq!(unsafe { d.instance() }, &sensor as *const Sensor as *const ());
}

#[test]
fn many_arguments() {
    fn sum(a: u8, b: u16, c: u32, d: u64, e: i8, f: i16, g: i32, h: i64) -> i128 {
        a as i128 + b as i128 + c as i128 + d as i128 + e as i128 + f as i128 + g as i128 + h as i128
    }

    let mut d: Delegate<'_, fn(u8, u16, u32, u64, i8, i16, i32, i64) -> i128> = Delegate::from_fn(sum);

    assert_eq!(d.call(1, 2, 3, 4, -5, -6, -7, -8), -16);

    let mut e: Delegate<'_, fn(u8, u8) -> u8> = Delegate::from_bound(clamp, 10u8);

    assert_eq!(e.call(20, 5), 10);
    assert_eq!(e.call(20, 15), 15);
    assert_eq!(e.call(20, 25), 20);
}

#[test]
fn reference_arguments() {
    fn first_word<'s>(text: &'s str) -> &'s str {
        text.split_whitespace().next().unwrap_or("")
    }

    // Higher-ranked `fn(&str)` is not a signature; lifetimes are named.
    let mut words: Delegate<'static, fn(&'static str) -> &'static str> = Delegate::from_fn(first_word);

    assert_eq!(words.call("hello delegate world"), "hello");
    assert_eq!(words.call(""), "");
}

#[test]
#[cfg_attr(miri, ignore)]
fn dispatch_table() {
    // A caller-managed list of delegates, the way an event system would hold them.
    fn double(x: i32) -> i32 {
        x * 2
    }

    let sensor = Sensor {
        offset: 100,
        readings: 0,
    };

    let mut listeners: Vec<Delegate<'_, fn(i32) -> i32>> = Vec::new();

    listeners.push(Delegate::from_fn(double));
    listeners.push(Delegate::from_method(Sensor::calibrated, &sensor));
    listeners.push(Delegate::from_bound(|factor: i32, x: i32| factor * x, 3));
    listeners.push(Delegate::from_closure(|x: i32| -x));

    let results: Vec<i32> = listeners.iter_mut().map(|d| d.call(5)).collect();

    assert_eq!(results, vec![10, 105, 15, -5]);

    // Removal by identity.
    let target: Delegate<'_, fn(i32) -> i32> = Delegate::from_fn(double);
    listeners.retain(|d| *d != target);

    assert_eq!(listeners.len(), 3);
    assert!(listeners.iter().all(|d| d.is_bound()));
}

#[test]
fn payload_budget() {
    assert!(fits::<usize>());
    assert!(fits::<&Sensor>());
    assert!(fits::<NonNull<Sensor>>());
    assert!(fits::<Option<&Sensor>>());
    assert!(!fits::<[usize; 2]>());
    assert!(!fits::<&[u8]>());

    assert!(fits_closure::<u8>());
    assert!(fits_closure::<()>());
    assert!(!fits_closure::<usize>());
    assert!(!fits_closure::<&Sensor>());
}
