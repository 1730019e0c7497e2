//! Wrong-answer synthesis.
//!
//! Candidates come from three places, in order:
//!
//! 1. hand-authored alternatives attached to the [`ProblemEntry`],
//! 2. randomized strategies per value kind (small and proportional numeric
//!    offsets, decimal lattice steps, digit/token/letter mutations),
//! 3. a deterministic fallback sequence (`correct + 1, correct + 2, ...`
//!    adapted to the kind) once the randomized attempt budget is spent.
//!
//! The fallback is infinite and injective, so synthesis always returns
//! exactly `count` distinct values that differ from the correct one.

use std::collections::HashSet;

use crate::model::{Alphabet, ProblemEntry, Value, ValueKind};
use crate::random::{RandomSource, shuffle};

/// Small fixed offsets are drawn from `1..=SMALL_OFFSET_MAX`.
pub const SMALL_OFFSET_MAX: u64 = 10;
/// Proportional offsets reach up to this percentage of `|correct|`.
pub const PROPORTIONAL_PERCENT: u128 = 30;
/// Proportional offsets never span less than this.
pub const PROPORTIONAL_MIN: u64 = 5;
/// Decimal distractors sit on a lattice of this many hundredths (0.25).
pub const DECIMAL_STEP: i64 = 25;

const DECIMAL_SMALL_STEPS: u64 = 4;
const DECIMAL_MIN_SPAN_STEPS: u64 = 4;
const BOOLEAN_OPERATORS: [&str; 5] = ["AND", "OR", "XOR", "NAND", "NOR"];
const BOOLEAN_VARIABLES: [&str; 4] = ["A", "B", "C", "D"];
const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Produces plausible wrong answers for a correct value.
#[derive(Debug, Clone, Copy)]
pub struct DistractorSynthesizer {
    attempts_per_value: usize,
}

impl Default for DistractorSynthesizer {
    fn default() -> Self {
        Self {
            attempts_per_value: Self::DEFAULT_ATTEMPTS_PER_VALUE,
        }
    }
}

impl DistractorSynthesizer {
    pub const DEFAULT_ATTEMPTS_PER_VALUE: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Randomized attempts allowed per requested value before falling back.
    /// Zero skips the randomized strategies entirely.
    #[must_use]
    pub fn with_attempts_per_value(mut self, attempts: usize) -> Self {
        self.attempts_per_value = attempts;
        self
    }

    /// `count` distinct values, none equal to `correct`.
    pub fn synthesize<R: RandomSource + ?Sized>(
        &self,
        correct: &Value,
        kind: ValueKind,
        count: usize,
        rng: &mut R,
    ) -> Vec<Value> {
        self.collect(correct, kind, &[], count, rng)
    }

    /// Like [`Self::synthesize`], but tries the entry's hand-authored
    /// alternatives first.
    pub fn synthesize_for<R: RandomSource + ?Sized>(
        &self,
        entry: &ProblemEntry,
        count: usize,
        rng: &mut R,
    ) -> Vec<Value> {
        self.collect(entry.value(), entry.kind(), entry.alternatives(), count, rng)
    }

    fn collect<R: RandomSource + ?Sized>(
        &self,
        correct: &Value,
        kind: ValueKind,
        alternatives: &[Value],
        count: usize,
        rng: &mut R,
    ) -> Vec<Value> {
        let mut picked = Picked::new(correct, count);

        let mut authored = alternatives.to_vec();
        shuffle(rng, &mut authored);
        for alt in authored {
            if picked.is_full() {
                break;
            }
            picked.offer(alt);
        }

        let budget = self.attempts_per_value.saturating_mul(count);
        let mut attempts = 0;
        while !picked.is_full() && attempts < budget {
            attempts += 1;
            if let Some(candidate) = random_candidate(correct, kind, rng) {
                picked.offer(candidate);
            }
        }

        if !picked.is_full() {
            tracing::debug!(
                correct = %correct,
                missing = count - picked.values.len(),
                "distractor attempts exhausted, using fallback sequence"
            );
            for candidate in fallback_sequence(correct, kind) {
                if picked.is_full() {
                    break;
                }
                picked.offer(candidate);
            }
        }

        picked.values
    }
}

struct Picked {
    correct_label: String,
    labels: HashSet<String>,
    values: Vec<Value>,
    count: usize,
}

impl Picked {
    fn new(correct: &Value, count: usize) -> Self {
        Self {
            correct_label: correct.label(),
            labels: HashSet::new(),
            values: Vec::with_capacity(count),
            count,
        }
    }

    fn is_full(&self) -> bool {
        self.values.len() >= self.count
    }

    fn offer(&mut self, candidate: Value) {
        let label = candidate.label();
        if label == self.correct_label || self.labels.contains(&label) {
            return;
        }
        self.labels.insert(label);
        self.values.push(candidate);
    }
}

//
// ─── RANDOMIZED STRATEGIES ─────────────────────────────────────────────────────
//

fn random_candidate<R: RandomSource + ?Sized>(
    correct: &Value,
    kind: ValueKind,
    rng: &mut R,
) -> Option<Value> {
    match (correct, kind) {
        (Value::Integer(c), ValueKind::Integer) => integer_candidate(*c, rng).map(Value::Integer),
        (Value::Decimal(c), ValueKind::Decimal) => decimal_candidate(*c, rng).map(Value::Decimal),
        (Value::Symbol(s), ValueKind::Symbolic(alphabet)) => match alphabet {
            Alphabet::Radix(radix) => radix_candidate(s, radix, rng),
            Alphabet::Boolean => boolean_candidate(s, rng),
            Alphabet::Text => text_candidate(s, rng),
        }
        .map(Value::Symbol),
        _ => None,
    }
}

/// Span for proportional offsets: about 30% of `|c|`, at least `min`.
fn proportional_span(magnitude: u64, min: u64) -> u64 {
    let scaled = u128::from(magnitude) * PROPORTIONAL_PERCENT / 100;
    u64::try_from(scaled).unwrap_or(u64::MAX).max(min)
}

/// Applies `offset` with a random sign. Non-negative answers only get
/// non-negative distractors: a negative result flips to the other sign.
fn signed_step<R: RandomSource + ?Sized>(c: i64, offset: u64, rng: &mut R) -> Option<i64> {
    let offset = i64::try_from(offset).ok()?;
    let (first, second) = if rng.coin() {
        (c.checked_sub(offset), c.checked_add(offset))
    } else {
        (c.checked_add(offset), c.checked_sub(offset))
    };
    let acceptable = |v: &i64| c < 0 || *v >= 0;
    first
        .filter(acceptable)
        .or_else(|| second.filter(acceptable))
}

fn integer_candidate<R: RandomSource + ?Sized>(c: i64, rng: &mut R) -> Option<i64> {
    let offset = if rng.coin() {
        1 + rng.below(SMALL_OFFSET_MAX)
    } else {
        1 + rng.below(proportional_span(c.unsigned_abs(), PROPORTIONAL_MIN))
    };
    signed_step(c, offset, rng)
}

fn decimal_candidate<R: RandomSource + ?Sized>(c: i64, rng: &mut R) -> Option<i64> {
    let steps = if rng.coin() {
        1 + rng.below(DECIMAL_SMALL_STEPS)
    } else {
        let span = proportional_span(c.unsigned_abs(), 0) / DECIMAL_STEP.unsigned_abs();
        1 + rng.below(span.max(DECIMAL_MIN_SPAN_STEPS))
    };
    let offset = steps.checked_mul(DECIMAL_STEP.unsigned_abs())?;
    signed_step(c, offset, rng)
}

fn radix_candidate<R: RandomSource + ?Sized>(s: &str, radix: u32, rng: &mut R) -> Option<String> {
    let digits = Alphabet::Radix(radix).digits()?;
    if rng.coin() {
        // Numeric neighbour: ±1..=3 in the same base.
        let n = u128::from_str_radix(s, radix).ok()?;
        let offset = u128::from(1 + rng.below(3));
        let next = if rng.coin() {
            n.checked_sub(offset)?
        } else {
            n.checked_add(offset)?
        };
        return Some(to_radix(next, radix, s.chars().count()));
    }

    // Single digit substitution, never introducing a leading zero.
    let mut chars: Vec<char> = s.chars().collect();
    let pos = rng.index(chars.len());
    let current = chars[pos];
    let allowed: Vec<char> = digits
        .iter()
        .copied()
        .filter(|d| *d != current && !(pos == 0 && chars.len() > 1 && *d == '0'))
        .collect();
    if allowed.is_empty() {
        return None;
    }
    chars[pos] = allowed[rng.index(allowed.len())];
    Some(chars.into_iter().collect())
}

fn boolean_candidate<R: RandomSource + ?Sized>(s: &str, rng: &mut R) -> Option<String> {
    let mut tokens: Vec<String> = s.split_whitespace().map(str::to_owned).collect();
    if tokens.is_empty() {
        return None;
    }
    let pos = rng.index(tokens.len());
    let token = tokens[pos].clone();
    let upper = token.to_ascii_uppercase();

    if BOOLEAN_OPERATORS.contains(&upper.as_str()) {
        let others: Vec<&str> = BOOLEAN_OPERATORS
            .iter()
            .copied()
            .filter(|op| *op != upper)
            .collect();
        tokens[pos] = others[rng.index(others.len())].to_owned();
    } else if upper == "NOT" {
        tokens.remove(pos);
    } else if let Some(flipped) = flip_literal(&upper) {
        tokens[pos] = flipped.to_owned();
    } else if let Some(var) = variable_core(&token) {
        // Keep surrounding parentheses, swap the variable or negate it.
        let others: Vec<&str> = BOOLEAN_VARIABLES
            .iter()
            .copied()
            .filter(|v| *v != var)
            .collect();
        if rng.coin() {
            let replacement = others[rng.index(others.len())];
            tokens[pos] = token.replacen(var, replacement, 1);
        } else {
            tokens.insert(pos, "NOT".to_owned());
        }
    } else {
        return None;
    }

    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(" "))
}

fn flip_literal(token: &str) -> Option<&'static str> {
    match token {
        "0" => Some("1"),
        "1" => Some("0"),
        "TRUE" => Some("FALSE"),
        "FALSE" => Some("TRUE"),
        _ => None,
    }
}

/// The single-letter variable inside a token such as `A`, `(B` or `C)`.
fn variable_core(token: &str) -> Option<&'static str> {
    let core = token.trim_matches(|c| c == '(' || c == ')');
    BOOLEAN_VARIABLES.iter().copied().find(|v| *v == core)
}

fn text_candidate<R: RandomSource + ?Sized>(s: &str, rng: &mut R) -> Option<String> {
    let mut chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return None;
    }

    if rng.coin() && chars.len() >= 2 {
        let pos = rng.index(chars.len() - 1);
        if chars[pos] == chars[pos + 1] {
            return None;
        }
        chars.swap(pos, pos + 1);
        return Some(chars.into_iter().collect());
    }

    let vowel_positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| VOWELS.contains(&c.to_ascii_lowercase()))
        .map(|(i, _)| i)
        .collect();
    if vowel_positions.is_empty() {
        return None;
    }
    let pos = vowel_positions[rng.index(vowel_positions.len())];
    let current = chars[pos].to_ascii_lowercase();
    let others: Vec<char> = VOWELS.iter().copied().filter(|v| *v != current).collect();
    let mut replacement = others[rng.index(others.len())];
    if chars[pos].is_ascii_uppercase() {
        replacement = replacement.to_ascii_uppercase();
    }
    chars[pos] = replacement;
    Some(chars.into_iter().collect())
}

//
// ─── DETERMINISTIC FALLBACK ────────────────────────────────────────────────────
//

/// Infinite sequence of values distinct from `correct` and from each other.
///
/// Integers and decimals count upward from the answer and switch to counting
/// downward if the representation would overflow. Radix strings count upward
/// in their base. Other strings walk every single-position mutation in a
/// fixed order, then append a counter.
pub fn fallback_sequence(correct: &Value, kind: ValueKind) -> Box<dyn Iterator<Item = Value>> {
    match (correct.clone(), kind) {
        (Value::Integer(c), _) => Box::new(
            (1_i64..)
                .filter_map(move |k| c.checked_add(k).or_else(|| c.checked_sub(k)))
                .map(Value::Integer),
        ),
        (Value::Decimal(c), _) => Box::new(
            (1_i64..)
                .filter_map(move |k| {
                    let offset = k.checked_mul(DECIMAL_STEP)?;
                    c.checked_add(offset).or_else(|| c.checked_sub(offset))
                })
                .map(Value::Decimal),
        ),
        (Value::Symbol(s), ValueKind::Symbolic(Alphabet::Radix(radix))) => {
            let parsed = if (2..=36).contains(&radix) {
                u128::from_str_radix(&s, radix).ok()
            } else {
                None
            };
            match parsed {
                Some(n) => {
                    let width = s.chars().count();
                    Box::new(
                        (1_u128..)
                            .map_while(move |k| n.checked_add(k))
                            .map(move |v| Value::Symbol(to_radix(v, radix, width)))
                            .chain(suffixed(s)),
                    )
                }
                _ => Box::new(suffixed(s)),
            }
        }
        (Value::Symbol(s), ValueKind::Symbolic(alphabet)) => {
            let mutations = ordered_mutations(&s, alphabet);
            Box::new(mutations.into_iter().map(Value::Symbol).chain(suffixed(s)))
        }
        (Value::Symbol(s), _) => Box::new(suffixed(s)),
    }
}

fn suffixed(s: String) -> impl Iterator<Item = Value> {
    (1_u64..).map(move |k| Value::Symbol(format!("{s} ({k})")))
}

/// All single-position mutations of `s`, in a fixed order.
fn ordered_mutations(s: &str, alphabet: Alphabet) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    match alphabet {
        Alphabet::Text => {
            for pos in 0..chars.len().saturating_sub(1) {
                if chars[pos] != chars[pos + 1] {
                    let mut next = chars.clone();
                    next.swap(pos, pos + 1);
                    out.push(next.into_iter().collect());
                }
            }
            for (pos, c) in chars.iter().enumerate() {
                let lower = c.to_ascii_lowercase();
                if !VOWELS.contains(&lower) {
                    continue;
                }
                for v in VOWELS.iter().filter(|v| **v != lower) {
                    let mut next = chars.clone();
                    next[pos] = if c.is_ascii_uppercase() {
                        v.to_ascii_uppercase()
                    } else {
                        *v
                    };
                    out.push(next.into_iter().collect());
                }
            }
        }
        Alphabet::Boolean => {
            let tokens: Vec<&str> = s.split_whitespace().collect();
            for (pos, token) in tokens.iter().enumerate() {
                let upper = token.to_ascii_uppercase();
                let replacements: Vec<String> = if BOOLEAN_OPERATORS.contains(&upper.as_str()) {
                    BOOLEAN_OPERATORS
                        .iter()
                        .filter(|op| **op != upper)
                        .map(|op| (*op).to_owned())
                        .collect()
                } else if let Some(flipped) = flip_literal(&upper) {
                    vec![flipped.to_owned()]
                } else if let Some(var) = variable_core(token) {
                    BOOLEAN_VARIABLES
                        .iter()
                        .filter(|v| **v != var)
                        .map(|v| token.replacen(var, v, 1))
                        .collect()
                } else {
                    Vec::new()
                };
                for replacement in replacements {
                    let mut next: Vec<String> = tokens.iter().map(|t| (*t).to_owned()).collect();
                    next[pos] = replacement;
                    out.push(next.join(" "));
                }
            }
        }
        Alphabet::Radix(_) => {}
    }
    out
}

/// Formats `n` in `radix` with upper-case digits, left-padded with zeros to `width`.
#[must_use]
pub fn to_radix(mut n: u128, radix: u32, width: usize) -> String {
    let mut digits = Vec::new();
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let d = (n % u128::from(radix)) as u32;
        digits.push(char::from_digit(d, radix).map_or('?', |c| c.to_ascii_uppercase()));
        n /= u128::from(radix);
        if n == 0 {
            break;
        }
    }
    while digits.len() < width {
        digits.push('0');
    }
    digits.iter().rev().collect()
}
