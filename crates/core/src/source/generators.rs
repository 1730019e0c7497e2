//! Templated problem families.
//!
//! Each family draws operands from the injected random source and dedupes by
//! prompt, so a pool may come out smaller than requested when the operand
//! space is narrow.

use std::collections::HashSet;

use crate::distractor::to_radix;
use crate::model::{Alphabet, DECIMAL_SCALE, ProblemEntry, ProblemError, Value, ValueKind};
use crate::random::RandomSource;

/// Entries per generated category in the built-in catalog.
pub const GENERATED_POOL_SIZE: usize = 24;

const ATTEMPTS_PER_ENTRY: usize = 10;

/// Divisors whose quotients always terminate within two decimal places.
const DIVISORS: [i64; 7] = [2, 4, 5, 10, 20, 25, 50];

const BITWISE_OPERATORS: [&str; 3] = ["AND", "OR", "XOR"];

/// Boolean-algebra identities: expression, simplified form, common slips.
const IDENTITIES: &[(&str, &str, [&str; 3])] = &[
    ("NOT (A AND B)", "NOT A OR NOT B", ["NOT A AND NOT B", "A OR B", "NOT A AND B"]),
    ("NOT (A OR B)", "NOT A AND NOT B", ["NOT A OR NOT B", "A AND B", "NOT A OR B"]),
    ("A AND (A OR B)", "A", ["A OR B", "A AND B", "B"]),
    ("A OR (A AND B)", "A", ["A AND B", "A OR B", "B"]),
    ("A OR NOT A", "1", ["0", "A", "NOT A"]),
    ("A AND NOT A", "0", ["1", "A", "NOT A"]),
    ("A XOR A", "0", ["1", "A", "NOT A"]),
    ("A XOR 1", "NOT A", ["A", "1", "0"]),
    ("NOT NOT A", "A", ["NOT A", "1", "0"]),
    (
        "(A AND B) OR (A AND C)",
        "A AND (B OR C)",
        ["A OR (B AND C)", "A AND B AND C", "B OR C"],
    ),
];

/// Generated pools keyed by category, `size` entries each where possible.
///
/// # Errors
///
/// Returns `ProblemError` if a template produces an invalid entry.
pub fn generated<R: RandomSource + ?Sized>(
    rng: &mut R,
    size: usize,
) -> Result<Vec<(&'static str, Vec<ProblemEntry>)>, ProblemError> {
    Ok(vec![
        ("arithmetic", fill(rng, size, arithmetic)?),
        ("division", fill(rng, size, division)?),
        ("binary", fill(rng, size, binary)?),
        ("hex", fill(rng, size, hex)?),
        ("logic", logic(rng, size)?),
    ])
}

fn fill<R: RandomSource + ?Sized>(
    rng: &mut R,
    size: usize,
    make: fn(&mut R) -> Result<ProblemEntry, ProblemError>,
) -> Result<Vec<ProblemEntry>, ProblemError> {
    let mut prompts = HashSet::new();
    let mut out = Vec::with_capacity(size);
    for _ in 0..size.saturating_mul(ATTEMPTS_PER_ENTRY) {
        if out.len() >= size {
            break;
        }
        let entry = make(rng)?;
        if prompts.insert(entry.display().to_owned()) {
            out.push(entry);
        }
    }
    Ok(out)
}

/// Uniform integer in `lo..=hi`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn between<R: RandomSource + ?Sized>(rng: &mut R, lo: i64, hi: i64) -> i64 {
    lo + rng.below((hi - lo + 1) as u64) as i64
}

fn arithmetic<R: RandomSource + ?Sized>(rng: &mut R) -> Result<ProblemEntry, ProblemError> {
    let (prompt, answer, slips) = match rng.below(3) {
        0 => {
            let (a, b) = (between(rng, 12, 99), between(rng, 12, 99));
            // Forgotten or doubled carry.
            (format!("{a} + {b}"), a + b, vec![a + b - 10, a + b + 10])
        }
        1 => {
            let a = between(rng, 20, 99);
            let b = between(rng, 1, a - 1);
            (format!("{a} − {b}"), a - b, vec![a + b, a - b + 10])
        }
        _ => {
            let (a, b) = (between(rng, 2, 12), between(rng, 2, 12));
            (format!("{a} × {b}"), a * b, vec![a + b, a * (b + 1)])
        }
    };
    Ok(
        ProblemEntry::new("arithmetic", prompt, Value::Integer(answer), ValueKind::Integer)?
            .with_alternatives(slips.into_iter().filter(|v| *v >= 0).map(Value::Integer)),
    )
}

fn division<R: RandomSource + ?Sized>(rng: &mut R) -> Result<ProblemEntry, ProblemError> {
    let b = DIVISORS[rng.index(DIVISORS.len())];
    let a = between(rng, 1, 99);
    let hundredths = a * DECIMAL_SCALE / b;
    // Integer division that drops the remainder.
    let truncated = Value::Decimal(a / b * DECIMAL_SCALE);
    Ok(ProblemEntry::new(
        "division",
        format!("{a} ÷ {b}"),
        Value::Decimal(hundredths),
        ValueKind::Decimal,
    )?
    .with_hint("Answer to two decimal places at most")
    .with_alternatives([truncated]))
}

#[allow(clippy::cast_sign_loss)]
fn binary<R: RandomSource + ?Sized>(rng: &mut R) -> Result<ProblemEntry, ProblemError> {
    let n = between(rng, 2, 255) as u128;
    let answer = to_radix(n, 2, 0);
    let reversed: String = answer.chars().rev().collect();
    Ok(ProblemEntry::new(
        "binary",
        format!("{n} in binary"),
        Value::symbol(answer),
        ValueKind::Symbolic(Alphabet::Radix(2)),
    )?
    .with_example("13 in binary is 1101")
    .with_alternatives([Value::symbol(reversed), Value::symbol(to_radix(n + 1, 2, 0))]))
}

#[allow(clippy::cast_sign_loss)]
fn hex<R: RandomSource + ?Sized>(rng: &mut R) -> Result<ProblemEntry, ProblemError> {
    let n = between(rng, 16, 4095) as u128;
    let answer = to_radix(n, 16, 0);
    // Reading the decimal digits as if they were hex.
    let literal = n.to_string();
    Ok(ProblemEntry::new(
        "hex",
        format!("{n} in hexadecimal"),
        Value::symbol(answer),
        ValueKind::Symbolic(Alphabet::Radix(16)),
    )?
    .with_example("255 in hexadecimal is FF")
    .with_alternatives([Value::symbol(literal), Value::symbol(to_radix(n + 1, 16, 0))]))
}

fn logic<R: RandomSource + ?Sized>(
    rng: &mut R,
    size: usize,
) -> Result<Vec<ProblemEntry>, ProblemError> {
    let mut out = IDENTITIES
        .iter()
        .map(|(expr, simplified, slips)| {
            let entry = ProblemEntry::new(
                "logic",
                format!("Simplify: {expr}"),
                Value::symbol(*simplified),
                ValueKind::Symbolic(Alphabet::Boolean),
            )?
            .with_alternatives(slips.iter().map(|s| Value::symbol(*s)));
            Ok::<_, ProblemError>(entry)
        })
        .collect::<Result<Vec<_>, _>>()?;
    out.extend(fill(rng, size.saturating_sub(out.len()), bitwise)?);
    Ok(out)
}

fn bitwise<R: RandomSource + ?Sized>(rng: &mut R) -> Result<ProblemEntry, ProblemError> {
    let a = rng.below(16);
    let b = rng.below(16);
    let results = [a & b, a | b, a ^ b];
    let op = rng.index(BITWISE_OPERATORS.len());
    let nibble = |v: u64| to_radix(u128::from(v), 2, 4);

    let slips = results
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != op)
        .map(|(_, v)| Value::symbol(nibble(*v)));
    Ok(ProblemEntry::new(
        "logic",
        format!("{} {} {}", nibble(a), BITWISE_OPERATORS[op], nibble(b)),
        Value::symbol(nibble(results[op])),
        ValueKind::Symbolic(Alphabet::Radix(2)),
    )?
    .with_hint("Work bit by bit")
    .with_alternatives(slips))
}
