#![no_main]
use libfuzzer_sys::arbitrary;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

const CHECK_EVERY: usize = 8;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(Vec<u8>),
    InsertSlice(Vec<u8>, usize, usize),
    RoundTrip,
}

#[derive(Debug, Arbitrary)]
struct Input {
    buckets: u16,
    hashes: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let Input {
        buckets,
        hashes,
        ops,
    } = input;
    let Ok(mut f) = bitfilter::Filter::new(buckets as u32, hashes) else {
        assert!(buckets == 0 || hashes == 0);
        return;
    };
    // The "Model", every item inserted so far
    let mut inserted: Vec<Vec<u8>> = Vec::new();
    for (i, op) in ops.into_iter().enumerate() {
        match op {
            Op::Insert(item) => {
                f.insert(&item);
                inserted.push(item);
            }
            Op::InsertSlice(buf, begin, end) => {
                let item = bitfilter::Item::slice(&buf, begin..end);
                let bytes = item.as_bytes().to_vec();
                f.insert(item);
                assert!(f.contains(&bytes));
                inserted.push(bytes);
            }
            Op::RoundTrip => {
                let g = bitfilter::Filter::from_bytes(&f.to_bytes()).unwrap();
                assert_eq!(f, g);
                f = g;
            }
        }

        if i % CHECK_EVERY == 0 {
            for e in &inserted {
                assert!(f.contains(e), "false negative {e:?}");
            }
        }
    }

    let before = f.to_bytes();
    for e in &inserted {
        assert!(f.contains(e), "false negative {e:?}");
        f.insert(e);
    }
    // reinserting is a no-op
    assert_eq!(before, f.to_bytes());
});
