use rand::{distributions::Slice, Rng};

/// Upper-case letters and digits, without the easily confused `0`, `O`, `1` and `I`.
pub const COUPON_CODE_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Generates a random coupon code of `length` characters from [`COUPON_CODE_ALPHABET`].
pub fn generate_coupon_code(length: usize) -> String {
    // The alphabet is a non-empty constant, so `Slice::new` cannot fail
    let Ok(alphabet) = Slice::new(COUPON_CODE_ALPHABET) else { return String::new() };
    rand::thread_rng().sample_iter(alphabet).take(length).collect()
}
