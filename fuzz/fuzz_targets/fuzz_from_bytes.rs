#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(f) = bitfilter::Filter::from_bytes(data) else {
        return;
    };
    let bytes = f.to_bytes();
    assert!(data.starts_with(&bytes));
    assert_eq!(bytes.len(), 5 + (f.bucket_count() as usize).div_ceil(8));
    assert!(f.count_ones() <= f.bucket_count() as u64);
    if f.is_empty() {
        assert!(!f.contains(data));
    }
    let _ = f.contains(bitfilter::Item::slice(data, 5..));
});
