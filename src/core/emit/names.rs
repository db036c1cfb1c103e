//! Random identifier generation shared by every back-end.

use rand::Rng;

const NAME_MIN: usize = 4;
const NAME_MAX: usize = 10;

/// `_`, then every ASCII letter paired with its case-flipped twin — mirrors
/// the original generator's `_aAbBcC...zZ` alphabet exactly, rather than a
/// plain `a-zA-Z` range, so the letter/flipped-case pairing (harmless here,
/// load-bearing nowhere) is preserved.
fn default_alphabet() -> Vec<char> {
    let mut alphabet = vec!['_'];
    for c in b'a'..=b'z' {
        alphabet.push(c as char);
        alphabet.push((c ^ 0x20) as char);
    }
    alphabet
}

/// A random identifier of 4-10 characters drawn from `_a-zA-Z`.
pub fn generate_identifier(rng: &mut impl Rng) -> String {
    let alphabet = default_alphabet();
    let len = rng.gen_range(NAME_MIN..=NAME_MAX);
    (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn generated_identifiers_are_within_length_bounds_and_charset() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let name = generate_identifier(&mut rng);
            assert!(name.len() >= NAME_MIN && name.len() <= NAME_MAX);
            assert!(name.chars().all(|c| c == '_' || c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn default_alphabet_pairs_every_letter_with_its_case_flip() {
        let alphabet = default_alphabet();
        assert_eq!(alphabet.len(), 1 + 26 * 2);
        assert!(alphabet.contains(&'a') && alphabet.contains(&'A'));
    }
}
