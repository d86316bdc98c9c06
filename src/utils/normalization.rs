//! Normalização de nomes para comparação e ordenação sem acentos

use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Remove acentos, converte para lowercase e colapsa espaços
/// usando NFKD (Normalization Form Compatibility Decomposition)
///
/// # Exemplos
/// ```
/// use taskflow::utils::normalization::normalize_string;
///
/// assert_eq!(normalize_string("  João   Silva "), "joao silva");
/// assert_eq!(normalize_string("Álvaro"), "alvaro");
/// ```
pub fn normalize_string(input: &str) -> String {
    input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordem alfabética insensível a acentos e caixa (como `localeCompare` em pt-BR)
///
/// Empates após a normalização são desfeitos pelo texto original, para que a
/// ordem seja estável.
pub fn comparar_nomes(a: &str, b: &str) -> Ordering {
    normalize_string(a)
        .cmp(&normalize_string(b))
        .then_with(|| a.cmp(b))
}
