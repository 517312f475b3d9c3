//! Resource naming: singular/plural forms and camelCase.
//!
//! A resource declared as `"BlogPost"` is addressed at `/blogPosts`, its
//! documents are returned under `blogPost` / `blogPosts`, and its id
//! parameter is `:blogPostId`.

const IRREGULAR: [(&str, &str); 8] = [
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

const UNCOUNTABLE: [&str; 9] = [
    "equipment",
    "information",
    "news",
    "series",
    "species",
    "sheep",
    "fish",
    "data",
    "metadata",
];

/// Splits `word` into everything before its last component and the
/// lowercased last component (`"BlogPost"` -> `("Blog", "post")`).
fn split_tail(word: &str) -> (&str, String) {
    let start = word
        .char_indices()
        .rev()
        .find(|(i, c)| *i > 0 && (c.is_uppercase() || !c.is_alphanumeric()))
        .map_or(0, |(i, c)| if c.is_alphanumeric() { i } else { i + c.len_utf8() });
    (&word[..start], word[start..].to_lowercase())
}

/// Re-applies the case of the original tail's first letter to a replacement.
fn rejoin(head: &str, original_tail: &str, tail: &str) -> String {
    let capitalized = original_tail.chars().next().is_some_and(char::is_uppercase);
    let mut out = String::with_capacity(head.len() + tail.len());
    out.push_str(head);
    if capitalized {
        let mut chars = tail.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    } else {
        out.push_str(tail);
    }
    out
}

const fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn plural_tail(tail: &str) -> String {
    if UNCOUNTABLE.contains(&tail) {
        return tail.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == tail || *p == tail) {
        return (*plural).to_string();
    }
    let bytes = tail.as_bytes();
    let n = bytes.len();
    if tail.ends_with('y') && n > 1 && !is_vowel(bytes[n - 2]) {
        return format!("{}ies", &tail[..n - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|e| tail.ends_with(e)) {
        return format!("{tail}es");
    }
    format!("{tail}s")
}

fn singular_tail(tail: &str) -> String {
    if UNCOUNTABLE.contains(&tail) {
        return tail.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(s, p)| *p == tail || *s == tail) {
        return (*singular).to_string();
    }
    if let Some(stem) = tail.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for ending in ["sses", "xes", "zes", "ches", "shes"] {
        if let Some(stem) = tail.strip_suffix(ending) {
            return format!("{stem}{}", &ending[..ending.len() - 2]);
        }
    }
    if tail.ends_with("ss") || tail.ends_with("us") || tail.ends_with("is") {
        return tail.to_string();
    }
    tail.strip_suffix('s').unwrap_or(tail).to_string()
}

/// Plural form of `word`, pluralizing its last component.
///
/// # Example
///
/// ```
/// use resourceful_resource::naming::plural;
///
/// assert_eq!(plural("post"), "posts");
/// assert_eq!(plural("Category"), "Categories");
/// assert_eq!(plural("BlogPost"), "BlogPosts");
/// assert_eq!(plural("person"), "people");
/// ```
pub fn plural(word: &str) -> String {
    let (head, tail) = split_tail(word);
    rejoin(head, &word[head.len()..], &plural_tail(&tail))
}

/// Singular form of `word`, singularizing its last component.
///
/// # Example
///
/// ```
/// use resourceful_resource::naming::singular;
///
/// assert_eq!(singular("posts"), "post");
/// assert_eq!(singular("Categories"), "Category");
/// assert_eq!(singular("Token"), "Token");
/// ```
pub fn singular(word: &str) -> String {
    let (head, tail) = split_tail(word);
    rejoin(head, &word[head.len()..], &singular_tail(&tail))
}

/// camelCase form of `word`.
///
/// Words are split on non-alphanumeric characters and on lower-to-upper case
/// boundaries.
///
/// # Example
///
/// ```
/// use resourceful_resource::naming::camel_case;
///
/// assert_eq!(camel_case("BlogPost"), "blogPost");
/// assert_eq!(camel_case("blog_post"), "blogPost");
/// assert_eq!(camel_case("User"), "user");
/// ```
pub fn camel_case(word: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in word.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut out = String::with_capacity(word.len());
    for (i, w) in words.iter().enumerate() {
        let lower = w.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_rules() {
        assert_eq!(plural("example"), "examples");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("church"), "churches");
        assert_eq!(plural("key"), "keys");
        assert_eq!(plural("story"), "stories");
        assert_eq!(plural("address"), "addresses");
        assert_eq!(plural("sheep"), "sheep");
        assert_eq!(plural("Person"), "People");
    }

    #[test]
    fn test_singular_rules() {
        assert_eq!(singular("examples"), "example");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("stories"), "story");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("People"), "Person");
        assert_eq!(singular("User"), "User");
    }

    #[test]
    fn test_compound_names() {
        assert_eq!(plural("user_story"), "user_stories");
        assert_eq!(singular("BlogPosts"), "BlogPost");
        assert_eq!(camel_case(&plural("BlogPost")), "blogPosts");
        assert_eq!(camel_case(&singular("blog-posts")), "blogPost");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("Token"), "token");
        assert_eq!(camel_case("user profile"), "userProfile");
        assert_eq!(camel_case("HTTPRequest"), "httprequest");
        assert_eq!(camel_case("post2Comments"), "post2Comments");
        assert_eq!(camel_case(""), "");
    }
}
