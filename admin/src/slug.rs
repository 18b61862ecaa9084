//! URL slugs derived from display names.

/// Turns a display name into a URL slug.
///
/// Letters are lowercased and Latin-1 accents are folded to ASCII; `@` reads as
/// `at`; every other run of characters becomes a single `-`. The result never
/// starts or ends with `-`.
///
/// ```
/// use shopfront_admin::slug::slugify;
///
/// assert_eq!(slugify("Crème Brûlée & Co."), "creme-brulee-co");
/// assert_eq!(slugify("hello@shop"), "hello-at-shop");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            let mut buf = [0_u8; 4];
            push_word(&mut slug, &mut pending_separator, c.encode_utf8(&mut buf));
        } else if c == '@' {
            pending_separator = true;
            push_word(&mut slug, &mut pending_separator, "at");
            pending_separator = true;
        } else if let Some(folded) = fold_latin1(c) {
            push_word(&mut slug, &mut pending_separator, folded);
        } else {
            pending_separator = true;
        }
    }

    slug
}

fn push_word(slug: &mut String, pending_separator: &mut bool, word: &str) {
    if *pending_separator && !slug.is_empty() {
        slug.push('-');
    }
    *pending_separator = false;
    slug.push_str(word);
}

/// ASCII spelling of a lowercase Latin-1 letter
const fn fold_latin1(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'æ' => "ae",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ð' => "d",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'þ' => "th",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}
