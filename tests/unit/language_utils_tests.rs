/*!
 * Tests for language code utilities
 */

use captionkit::language_utils::{
    get_language_name, language_codes_match, normalize_language_code, parse_language_code,
};

#[test]
fn test_normalize_withAliases_shouldMapToPrimaryCode() {
    assert_eq!(normalize_language_code("jp"), "ja");
    assert_eq!(normalize_language_code("Japanese"), "ja");
    assert_eq!(normalize_language_code("english"), "en");
    assert_eq!(normalize_language_code("en-US"), "en");
    assert_eq!(normalize_language_code("en_GB"), "en");
}

#[test]
fn test_normalize_withRegion_shouldUppercaseRegion() {
    assert_eq!(normalize_language_code("pt_br"), "pt-BR");
    assert_eq!(normalize_language_code(" ZH-tw "), "zh-TW");
}

#[test]
fn test_normalize_withPlainCode_shouldLowercase() {
    assert_eq!(normalize_language_code("FR"), "fr");
}

#[test]
fn test_parseLanguageCode_withInvalidInput_shouldReturnNone() {
    assert!(parse_language_code("klingon").is_none());
    assert!(parse_language_code("").is_none());
    assert_eq!(parse_language_code("JA").unwrap().as_str(), "ja");
}

#[test]
fn test_languageCodesMatch_withSamePrimary_shouldMatch() {
    assert!(language_codes_match("pt-BR", "pt"));
    assert!(language_codes_match("en_US", "english"));
    assert!(!language_codes_match("en", "ja"));
    assert!(!language_codes_match("", ""));
}

#[test]
fn test_getLanguageName_withKnownCode_shouldReturnEnglishName() {
    assert_eq!(get_language_name("ja").as_deref(), Some("Japanese"));
    assert_eq!(get_language_name("en-US").as_deref(), Some("English"));
    assert_eq!(get_language_name("zz"), None);
}
