use crate::error::{Error, Result};

const SEPARATOR: char = ' ';

/// Split text into words on runs of spaces. No other normalization is done.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(SEPARATOR).filter(|word| !word.is_empty()).collect()
}

/// A word is valid when it contains no control characters (below `' '`).
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// Split document text into words, rejecting the whole text on the first invalid word.
pub fn tokenize_document(text: &str) -> Result<Vec<&str>> {
    let words = split_into_words(text);
    if let Some(bad) = words.iter().find(|word| !is_valid_word(word)) {
        return Err(Error::InvalidTerm { word: bad.to_string() });
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_space_runs() {
        assert_eq!(split_into_words("  a cat   sat "), vec!["a", "cat", "sat"]);
        assert!(split_into_words("").is_empty());
        assert!(split_into_words("    ").is_empty());
    }

    #[test]
    fn control_characters_are_invalid() {
        assert!(is_valid_word("cat"));
        assert!(is_valid_word("-cat"));
        assert!(is_valid_word("кот"));
        assert!(!is_valid_word("c\u{12}at"));
        assert!(!is_valid_word("tab\there"));
    }

    #[test]
    fn document_with_invalid_word_is_rejected() {
        let err = tokenize_document("fine words and ba\u{1}d").unwrap_err();
        assert_eq!(err, Error::InvalidTerm { word: "ba\u{1}d".to_string() });
        assert_eq!(tokenize_document("a b").unwrap(), vec!["a", "b"]);
    }
}
