//! Hashids-compatible codec: reversible integer <-> opaque string transform.
//!
//! Output is deterministic for a given (salt, minimum length, alphabet) and compatible with
//! the reference Hashids implementations, so ids issued by other services sharing the same
//! settings decode here.

use crate::error::ConfigError;

pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
const DEFAULT_SEPS: &str = "cfhistuCFHISTU";
const MIN_ALPHABET_LENGTH: usize = 16;
const SEP_DIV: f64 = 3.5;
const GUARD_DIV: f64 = 12.0;

/// Immutable codec built once from process settings and shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct HashIdCodec {
    enabled: bool,
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    seps: Vec<char>,
    guards: Vec<char>,
}

impl HashIdCodec {
    /// Build an enabled codec. Fails when the alphabet has fewer than 16 unique characters or contains a space.
    pub fn new(salt: &str, min_length: usize, alphabet: &str) -> Result<Self, ConfigError> {
        let mut unique: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.len() < MIN_ALPHABET_LENGTH {
            return Err(ConfigError::InvalidAlphabet(format!(
                "must contain at least {} unique characters",
                MIN_ALPHABET_LENGTH
            )));
        }
        if unique.iter().any(|c| c.is_whitespace()) {
            return Err(ConfigError::InvalidAlphabet("must not contain whitespace".into()));
        }

        let salt: Vec<char> = salt.chars().collect();
        let filtered_seps: Vec<char> = DEFAULT_SEPS.chars().filter(|c| unique.contains(c)).collect();
        let mut alphabet: Vec<char> = unique.into_iter().filter(|c| !filtered_seps.contains(c)).collect();
        let mut seps = shuffle(&filtered_seps, &salt);

        if seps.is_empty() || (alphabet.len() as f64 / seps.len() as f64) > SEP_DIV {
            let mut seps_len = (alphabet.len() as f64 / SEP_DIV).ceil() as usize;
            if seps_len == 1 {
                seps_len = 2;
            }
            if seps_len > seps.len() {
                let diff = (seps_len - seps.len()).min(alphabet.len());
                seps.extend(alphabet.drain(..diff));
            } else {
                seps.truncate(seps_len);
            }
        }

        let mut alphabet = shuffle(&alphabet, &salt);
        let guard_count = (alphabet.len() as f64 / GUARD_DIV).ceil() as usize;
        let guards: Vec<char> = if alphabet.len() < 3 {
            seps.drain(..guard_count.min(seps.len())).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(HashIdCodec {
            enabled: true,
            salt,
            min_length,
            alphabet,
            seps,
            guards,
        })
    }

    /// Toggle the process-wide enable flag. A disabled codec still encodes and decodes;
    /// callers consult [`HashIdCodec::is_enabled`] to decide whether ids travel hashed.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn encode(&self, id: u64) -> String {
        self.encode_many(&[id])
    }

    /// `None` when the token is not a valid hash under this configuration.
    pub fn decode(&self, token: &str) -> Option<u64> {
        self.decode_many(token).first().copied()
    }

    pub fn encode_many(&self, numbers: &[u64]) -> String {
        if numbers.is_empty() {
            return String::new();
        }
        let mut alphabet = self.alphabet.clone();
        let numbers_hash = numbers
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, n)| acc.wrapping_add(n % (i as u64 + 100)));
        let lottery = alphabet[(numbers_hash % alphabet.len() as u64) as usize];
        let mut ret = vec![lottery];

        for (i, &number) in numbers.iter().enumerate() {
            alphabet = shuffle(&alphabet, &self.buffer(lottery, &alphabet));
            let last = to_alphabet(number, &alphabet);
            ret.extend_from_slice(&last);
            if i + 1 < numbers.len() {
                let extra = number % (last[0] as u64 + i as u64);
                ret.push(self.seps[(extra % self.seps.len() as u64) as usize]);
            }
        }

        if ret.len() < self.min_length {
            let idx = (numbers_hash.wrapping_add(ret[0] as u64)) % self.guards.len() as u64;
            ret.insert(0, self.guards[idx as usize]);
            if ret.len() < self.min_length {
                let idx = (numbers_hash.wrapping_add(ret[2] as u64)) % self.guards.len() as u64;
                ret.push(self.guards[idx as usize]);
            }
        }

        let half = alphabet.len() / 2;
        while ret.len() < self.min_length {
            let key = alphabet.clone();
            alphabet = shuffle(&alphabet, &key);
            let mut padded = alphabet[half..].to_vec();
            padded.extend_from_slice(&ret);
            padded.extend_from_slice(&alphabet[..half]);
            ret = padded;
            if ret.len() > self.min_length {
                let start = (ret.len() - self.min_length) / 2;
                ret = ret[start..start + self.min_length].to_vec();
            }
        }

        ret.into_iter().collect()
    }

    pub fn decode_many(&self, token: &str) -> Vec<u64> {
        let chars: Vec<char> = token.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        let parts: Vec<&[char]> = chars.split(|c| self.guards.contains(c)).collect();
        let idx = if parts.len() == 2 || parts.len() == 3 { 1 } else { 0 };
        let breakdown = parts[idx];
        let Some((&lottery, rest)) = breakdown.split_first() else {
            return Vec::new();
        };

        let mut alphabet = self.alphabet.clone();
        let mut out = Vec::new();
        for sub in rest.split(|c| self.seps.contains(c)) {
            alphabet = shuffle(&alphabet, &self.buffer(lottery, &alphabet));
            match from_alphabet(sub, &alphabet) {
                Some(n) => out.push(n),
                None => return Vec::new(),
            }
        }

        if self.encode_many(&out) != token {
            return Vec::new();
        }
        out
    }

    /// lottery + salt + alphabet, cut to the alphabet length.
    fn buffer(&self, lottery: char, alphabet: &[char]) -> Vec<char> {
        let mut buffer = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        buffer.push(lottery);
        buffer.extend_from_slice(&self.salt);
        buffer.extend_from_slice(alphabet);
        buffer.truncate(alphabet.len());
        buffer
    }
}

fn shuffle(alphabet: &[char], salt: &[char]) -> Vec<char> {
    let mut out = alphabet.to_vec();
    if salt.is_empty() {
        return out;
    }
    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..out.len()).rev() {
        v %= salt.len();
        let integer = salt[v] as usize;
        p += integer;
        let j = (integer + v + p) % i;
        out.swap(i, j);
        v += 1;
    }
    out
}

fn to_alphabet(mut input: u64, alphabet: &[char]) -> Vec<char> {
    let len = alphabet.len() as u64;
    let mut id = Vec::new();
    loop {
        id.push(alphabet[(input % len) as usize]);
        input /= len;
        if input == 0 {
            break;
        }
    }
    id.reverse();
    id
}

fn from_alphabet(input: &[char], alphabet: &[char]) -> Option<u64> {
    if input.is_empty() {
        return None;
    }
    let len = alphabet.len() as u64;
    input.iter().try_fold(0u64, |acc, c| {
        let pos = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(len)?.checked_add(pos)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(salt: &str, min_length: usize) -> HashIdCodec {
        HashIdCodec::new(salt, min_length, DEFAULT_ALPHABET).unwrap()
    }

    #[test]
    fn matches_reference_vectors() {
        let c = codec("this is my salt", 0);
        assert_eq!(c.encode(12345), "NkK9");
        assert_eq!(c.encode_many(&[683, 94108, 123, 5]), "aBMswoO2UB3Sj");
        assert_eq!(c.encode_many(&[1, 2, 3]), "laHquq");
        assert_eq!(c.decode_many("laHquq"), vec![1, 2, 3]);
        assert_eq!(c.decode("NkK9"), Some(12345));
    }

    #[test]
    fn pads_to_minimum_length() {
        let c = codec("this is my salt", 8);
        assert_eq!(c.encode(1), "gB0NV05e");
        assert_eq!(c.decode("gB0NV05e"), Some(1));
    }

    #[test]
    fn round_trips_across_range() {
        let c = codec("criteria", 6);
        for n in (0..5_000u64).chain([u32::MAX as u64, 1 << 40, u64::MAX / 3]) {
            let token = c.encode(n);
            assert!(token.chars().count() >= 6, "{} too short", token);
            assert_eq!(c.decode(&token), Some(n), "token {}", token);
        }
    }

    #[test]
    fn distinct_ids_get_distinct_tokens() {
        let c = codec("criteria", 0);
        let tokens: std::collections::HashSet<String> = (0..2_000u64).map(|n| c.encode(n)).collect();
        assert_eq!(tokens.len(), 2_000);
    }

    #[test]
    fn rejects_foreign_tokens() {
        let c = codec("criteria", 0);
        assert_eq!(c.decode(""), None);
        assert_eq!(c.decode("not a hash"), None);
        let other = codec("another salt", 0);
        let token = other.encode(987_654);
        assert_ne!(c.decode(&token), Some(987_654));
    }

    #[test]
    fn multi_number_round_trip() {
        let c = codec("criteria", 10);
        let token = c.encode_many(&[1, 2, 3]);
        assert_eq!(c.decode_many(&token), vec![1, 2, 3]);
        assert_eq!(c.encode_many(&[]), "");
    }

    #[test]
    fn rejects_short_alphabet() {
        let err = HashIdCodec::new("", 0, "abcdef").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAlphabet(_)));
        let err = HashIdCodec::new("", 0, "abcdefghij klmnopqrstu").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAlphabet(_)));
    }
}
