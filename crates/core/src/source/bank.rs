//! Static English → Spanish word bank.

use crate::model::{Alphabet, ProblemEntry, ProblemError, Value, ValueKind};

struct Word {
    english: &'static str,
    spanish: &'static str,
    hint: &'static str,
    example: &'static str,
}

const fn word(
    english: &'static str,
    spanish: &'static str,
    hint: &'static str,
    example: &'static str,
) -> Word {
    Word {
        english,
        spanish,
        hint,
        example,
    }
}

const ANIMALS: &[Word] = &[
    word("dog", "perro", "Man's best friend", "El perro ladra."),
    word("cat", "gato", "Purrs and chases mice", "El gato duerme."),
    word("horse", "caballo", "You can ride it", "El caballo corre rápido."),
    word("bird", "pájaro", "It has feathers", "El pájaro canta."),
    word("cow", "vaca", "Gives milk", "La vaca come hierba."),
    word("fish", "pez", "Lives in water", "El pez nada."),
    word("rabbit", "conejo", "Long ears, likes carrots", "El conejo salta."),
    word("pig", "cerdo", "Rolls in mud", "El cerdo es rosado."),
    word("sheep", "oveja", "Gives wool", "La oveja está en el campo."),
    word("mouse", "ratón", "Small and squeaks", "El ratón come queso."),
];

const FOOD: &[Word] = &[
    word("bread", "pan", "Baked from flour", "Compro pan cada día."),
    word("cheese", "queso", "Made from milk", "Me gusta el queso."),
    word("apple", "manzana", "Red or green fruit", "La manzana es roja."),
    word("water", "agua", "You drink it", "Bebo agua fría."),
    word("rice", "arroz", "Small white grains", "El arroz está listo."),
    word("egg", "huevo", "Laid by hens", "Como un huevo."),
    word("milk", "leche", "White drink from cows", "La leche está fría."),
    word("meat", "carne", "Not vegetarian", "La carne está asada."),
    word("soup", "sopa", "Eaten with a spoon", "La sopa está caliente."),
    word("sugar", "azúcar", "Sweet crystals", "No tomo azúcar."),
];

const COLORS: &[Word] = &[
    word("red", "rojo", "Color of blood", "El coche es rojo."),
    word("blue", "azul", "Color of the sky", "El mar es azul."),
    word("green", "verde", "Color of grass", "La hoja es verde."),
    word("yellow", "amarillo", "Color of the sun", "El plátano es amarillo."),
    word("black", "negro", "Color of night", "El gato es negro."),
    word("white", "blanco", "Color of snow", "La nieve es blanca."),
    word("orange", "naranja", "Also a fruit", "La camiseta es naranja."),
    word("purple", "morado", "Mix of red and blue", "La uva es morada."),
    word("brown", "marrón", "Color of chocolate", "La mesa es marrón."),
    word("gray", "gris", "Color of clouds before rain", "El cielo está gris."),
];

/// Vocabulary pools keyed by category. Every entry's alternatives are the
/// other translations in its category.
///
/// # Errors
///
/// Returns `ProblemError` if a bundled word fails validation.
pub fn vocabulary() -> Result<Vec<(&'static str, Vec<ProblemEntry>)>, ProblemError> {
    [("animals", ANIMALS), ("food", FOOD), ("colors", COLORS)]
        .into_iter()
        .map(|(key, words)| Ok::<_, ProblemError>((key, entries(key, words)?)))
        .collect()
}

fn entries(category: &str, words: &[Word]) -> Result<Vec<ProblemEntry>, ProblemError> {
    let kind = ValueKind::Symbolic(Alphabet::Text);
    words
        .iter()
        .map(|w| {
            let siblings = words
                .iter()
                .filter(|other| other.spanish != w.spanish)
                .map(|other| Value::symbol(other.spanish));
            let entry = ProblemEntry::new(category, w.english, Value::symbol(w.spanish), kind)?
                .with_hint(w.hint)
                .with_example(w.example)
                .with_alternatives(siblings);
            Ok::<_, ProblemError>(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_word_has_enough_siblings() {
        let pools = vocabulary().unwrap();
        assert_eq!(pools.len(), 3);
        for (key, entries) in pools {
            assert!(entries.len() >= 4, "{key} too small");
            for entry in entries {
                assert!(entry.alternatives().len() >= 3);
                assert!(!entry.alternatives().contains(entry.value()));
                assert!(entry.hint().is_some());
            }
        }
    }
}
