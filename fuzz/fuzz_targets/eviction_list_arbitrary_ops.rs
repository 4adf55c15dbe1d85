#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use memokit::ds::EvictionList;

// Fuzz arbitrary operation sequences on EvictionList
//
// Mirrors every push_front, touch, remove and clear in a VecDeque model
// (newest at the front) and checks order, length and chain validity after
// each step.
fuzz_target!(|data: &[u8]| {
    let mut list: EvictionList<u8> = EvictionList::with_capacity(0);
    let mut model: VecDeque<u8> = VecDeque::new();

    for pair in data.chunks_exact(2) {
        let op = pair[0] % 5;
        let key = pair[1] % 32;
        let position = model.iter().position(|k| *k == key);

        match op {
            0 => {
                // push_front
                assert_eq!(list.push_front(key), position.is_none());
                if position.is_none() {
                    model.push_front(key);
                }
            }
            1 => {
                // touch never links a missing key
                assert_eq!(list.touch(&key), position.is_some());
                if let Some(at) = position {
                    model.remove(at);
                    model.push_front(key);
                }
            }
            2 => {
                // remove
                assert_eq!(list.remove(&key), position.is_some());
                if let Some(at) = position {
                    model.remove(at);
                }
            }
            3 => {
                // oldest-first walk matches the model
                let walked: Vec<u8> = list.iter().rev().copied().collect();
                let expected: Vec<u8> = model.iter().rev().copied().collect();
                assert_eq!(walked, expected);
                assert_eq!(list.oldest(), model.back());
            }
            4 => {
                list.clear();
                model.clear();
            }
            _ => unreachable!(),
        }

        assert_eq!(list.len(), model.len());
        assert!(list.iter().copied().eq(model.iter().copied()));
        assert!(list.validate().is_ok());
    }
});
