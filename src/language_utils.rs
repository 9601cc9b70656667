use isolang::Language;

use crate::models::LanguageCode;

/// Language utilities for caption language codes
///
/// Codes travel as `xx` or `xx-YY`. Caller input is folded into that shape
/// through a fixed alias table before validation.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("jp", "ja"),
    ("japanese", "ja"),
    ("english", "en"),
    ("en-us", "en"),
    ("en-gb", "en"),
];

/// Normalize a raw language code
///
/// Lowercases, maps `_` to `-`, applies the alias table and finally restores
/// the upper-case region subtag (`pt_br` -> `pt-BR`). The result is not
/// guaranteed to be well formed; run it through `LanguageCode::parse`.
pub fn normalize_language_code(lang: &str) -> String {
    let normalized = lang.trim().to_lowercase().replace('_', "-");

    if let Some((_, target)) = LANGUAGE_ALIASES.iter().find(|(alias, _)| *alias == normalized) {
        return (*target).to_string();
    }

    match normalized.split_once('-') {
        Some((primary, region)) if primary.len() == 2 && region.len() == 2 => {
            format!("{}-{}", primary, region.to_uppercase())
        }
        _ => normalized,
    }
}

/// Normalize then validate
pub fn parse_language_code(lang: &str) -> Option<LanguageCode> {
    LanguageCode::parse(&normalize_language_code(lang)).ok()
}

/// Check if two language codes refer to the same primary language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let primary = |code: &str| {
        let normalized = normalize_language_code(code);
        normalized.split('-').next().unwrap_or_default().to_string()
    };

    let (first, second) = (primary(code1), primary(code2));
    !first.is_empty() && first == second
}

/// English name for the primary subtag, if it is a known ISO 639-1 code
pub fn get_language_name(code: &str) -> Option<String> {
    let normalized = normalize_language_code(code);
    let primary = normalized.split('-').next()?;
    Language::from_639_1(primary).map(|lang| lang.to_name().to_string())
}
