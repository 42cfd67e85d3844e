use nanoid::nanoid;

/// Alphabet for store-assigned identifiers (no ambiguous glyphs, no `_` so follow edge keys stay
/// unambiguous).
const DOCUMENT_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const DOCUMENT_ID_LENGTH: usize = 20;

/// Generates a new document identifier.
pub fn generate_document_id() -> String {
    nanoid!(DOCUMENT_ID_LENGTH, DOCUMENT_ID_ALPHABET)
}

/// Generates a new session token.
pub fn generate_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
