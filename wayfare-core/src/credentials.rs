use rand::seq::SliceRandom;
use rand::Rng;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

pub const DEFAULT_PASSWORD_LENGTH: usize = 12;
const BCRYPT_COST: u32 = 10;

/// Generate a temporary password for an auto-provisioned account.
///
/// The result always contains at least one uppercase letter, one
/// lowercase letter, one digit and one symbol; the remaining characters
/// are drawn uniformly from the union of the four classes, and the final
/// order is shuffled so the guaranteed classes do not sit in fixed
/// positions. Lengths below 4 are raised to 4 to keep the guarantee
/// satisfiable.
pub fn generate_temp_password(length: usize) -> String {
    let length = length.max(4);
    let mut rng = rand::thread_rng();

    let mut chars: Vec<u8> = vec![
        UPPERCASE[rng.gen_range(0..UPPERCASE.len())],
        LOWERCASE[rng.gen_range(0..LOWERCASE.len())],
        DIGITS[rng.gen_range(0..DIGITS.len())],
        SYMBOLS[rng.gen_range(0..SYMBOLS.len())],
    ];

    let all: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS].concat();
    for _ in 4..length {
        chars.push(all[rng.gen_range(0..all.len())]);
    }

    chars.shuffle(&mut rng);
    String::from_utf8(chars).unwrap_or_default()
}

/// Hash a plaintext password for persistence. Plaintext is never stored.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, BCRYPT_COST)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(plain, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_class(password: &str, class: &[u8]) -> bool {
        password.bytes().any(|b| class.contains(&b))
    }

    #[test]
    fn generated_password_has_configured_length() {
        assert_eq!(generate_temp_password(12).len(), 12);
        assert_eq!(generate_temp_password(20).len(), 20);
    }

    #[test]
    fn short_lengths_are_raised_to_minimum() {
        assert_eq!(generate_temp_password(1).len(), 4);
    }

    #[test]
    fn generated_password_covers_all_four_classes() {
        for _ in 0..50 {
            let password = generate_temp_password(DEFAULT_PASSWORD_LENGTH);
            assert!(has_class(&password, UPPERCASE), "no uppercase: {password}");
            assert!(has_class(&password, LOWERCASE), "no lowercase: {password}");
            assert!(has_class(&password, DIGITS), "no digit: {password}");
            assert!(has_class(&password, SYMBOLS), "no symbol: {password}");
        }
    }

    #[test]
    fn hash_round_trip_verifies() {
        let hash = hash_password("Br@veNewW0rld").unwrap();
        assert!(verify_password("Br@veNewW0rld", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }
}
