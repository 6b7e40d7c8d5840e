//! Random numeric code generation

use rand::Rng;

/// Generates a string of exactly `length` random ASCII digits
///
/// Each digit is drawn independently and uniformly, so leading zeros are as
/// likely as any other digit. Uses the thread-local generator and needs no
/// coordination between callers.
///
/// # Panics
///
/// Panics if `length` is zero.
pub fn generate_code(length: usize) -> String {
    assert!(length > 0, "verification code length must be positive");

    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::verification_code::CODE_LENGTH;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_format() {
        for _ in 0..100 {
            let code = generate_code(CODE_LENGTH);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_code_custom_lengths() {
        assert_eq!(generate_code(1).len(), 1);
        assert_eq!(generate_code(12).len(), 12);
    }

    #[test]
    fn test_code_uniqueness() {
        let codes: HashSet<String> = (0..100).map(|_| generate_code(CODE_LENGTH)).collect();

        // There should be at least some unique codes (extremely unlikely to get all same)
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_every_digit_appears() {
        let digits: HashSet<char> = (0..200).flat_map(|_| generate_code(CODE_LENGTH).chars().collect::<Vec<_>>()).collect();
        assert_eq!(digits.len(), 10);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_zero_length_panics() {
        generate_code(0);
    }

    #[test]
    fn test_concurrent_generation() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..50).map(|_| generate_code(CODE_LENGTH)).collect::<Vec<_>>()))
            .collect();

        for handle in handles {
            for code in handle.join().unwrap() {
                assert_eq!(code.len(), CODE_LENGTH);
            }
        }
    }
}
