//! Naming convention utilities for code generation.
//!
//! Struct names are derived deterministically from the module name plus
//! either an alias name or the access path that first reached an anonymous
//! object literal.
//!
//! # Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `get_user`, `getUser` | [`to_pascal_case`] | `GetUser` |
//! | `word` | [`capitalize`] | `Word` |
//! | `Sample.User` in `Sample` | [`alias_struct_name`] | `Sample_User` |
//! | `[getUser, returnType]` in `Sample` | [`path_struct_name`] | `Sample_GetUserReturnType` |
//! | `class` | [`member_name`] | `class_` |

/// Path segment appended for array element types.
pub const ELEMENT_SEGMENT: &str = "element";

/// Convert a string to PascalCase.
///
/// Splits on `-`, `_`, `.` and `/`, uppercases the first letter of every
/// word and keeps the rest of each word as written, so camelCase input keeps
/// its inner capitals.
///
/// # Examples
///
/// ```
/// use structgen_core::codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
/// assert_eq!(to_pascal_case("getUser"), "GetUser");
/// assert_eq!(to_pascal_case("hello"), "Hello");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(['-', '_', '.', '/']).map(capitalize).collect()
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use structgen_core::codegen::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Replace every character that cannot appear in a C++ identifier with `_`.
///
/// A leading digit gets a `_` prefix and empty input becomes `_`.
pub fn sanitize_identifier(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Whether `s` is a syntactically valid C++ identifier (keywords included).
pub fn is_cpp_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Identifier for a struct member holding the property `name`.
///
/// The dynamic-value key keeps the original property name; only the member
/// identifier is rewritten.
pub fn member_name(name: &str) -> String {
    let ident = sanitize_identifier(name);
    if is_cpp_keyword(&ident) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Struct name for an object defined by an alias.
///
/// The alias is prefixed with the module name unless it already carries it.
pub fn alias_struct_name(module_name: &str, alias: &str) -> String {
    let module = sanitize_identifier(module_name);
    let alias = sanitize_identifier(alias);

    if alias.starts_with(&format!("{module}_")) {
        alias
    } else {
        format!("{module}_{alias}")
    }
}

/// Struct name for an anonymous object literal reached through `path`.
pub fn path_struct_name(module_name: &str, path: &[String]) -> String {
    let module = sanitize_identifier(module_name);
    let tail: String = path.iter().map(|segment| to_pascal_case(segment)).collect();
    if tail.is_empty() {
        return module;
    }
    format!("{module}_{}", sanitize_identifier(&tail))
}

/// Name used for the `attempt`-th disambiguation of `base` (starting at 2).
pub fn suffixed_name(base: &str, attempt: usize) -> String {
    format!("{base}_{attempt}")
}

/// Include guard macro for a module header.
pub fn include_guard(prefix: &str, module_name: &str) -> String {
    format!(
        "{}_{}_H",
        prefix,
        sanitize_identifier(module_name).to_ascii_uppercase()
    )
}

/// Whether `word` is reserved in C++17 (plus alternative operator tokens).
pub fn is_cpp_keyword(word: &str) -> bool {
    matches!(
        word,
        "alignas"
            | "alignof"
            | "and"
            | "and_eq"
            | "asm"
            | "auto"
            | "bitand"
            | "bitor"
            | "bool"
            | "break"
            | "case"
            | "catch"
            | "char"
            | "char16_t"
            | "char32_t"
            | "class"
            | "compl"
            | "const"
            | "constexpr"
            | "const_cast"
            | "continue"
            | "decltype"
            | "default"
            | "delete"
            | "do"
            | "double"
            | "dynamic_cast"
            | "else"
            | "enum"
            | "explicit"
            | "export"
            | "extern"
            | "false"
            | "float"
            | "for"
            | "friend"
            | "goto"
            | "if"
            | "inline"
            | "int"
            | "long"
            | "mutable"
            | "namespace"
            | "new"
            | "noexcept"
            | "not"
            | "not_eq"
            | "nullptr"
            | "operator"
            | "or"
            | "or_eq"
            | "private"
            | "protected"
            | "public"
            | "register"
            | "reinterpret_cast"
            | "return"
            | "short"
            | "signed"
            | "sizeof"
            | "static"
            | "static_assert"
            | "static_cast"
            | "struct"
            | "switch"
            | "template"
            | "this"
            | "thread_local"
            | "throw"
            | "true"
            | "try"
            | "typedef"
            | "typeid"
            | "typename"
            | "union"
            | "unsigned"
            | "using"
            | "virtual"
            | "void"
            | "volatile"
            | "wchar_t"
            | "while"
            | "xor"
            | "xor_eq"
    )
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn to_pascal_case___converts_snake_case() {
        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_pascal_case("display_name"), "DisplayName");
    }

    #[test]
    fn to_pascal_case___converts_kebab_case() {
        assert_eq!(to_pascal_case("hello-world"), "HelloWorld");
        assert_eq!(to_pascal_case("my-module"), "MyModule");
    }

    #[test]
    fn to_pascal_case___keeps_camel_case_humps() {
        assert_eq!(to_pascal_case("getUser"), "GetUser");
        assert_eq!(to_pascal_case("returnType"), "ReturnType");
    }

    #[test]
    fn to_pascal_case___handles_simple_words() {
        assert_eq!(to_pascal_case("hello"), "Hello");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn capitalize___preserves_rest_of_string() {
        assert_eq!(capitalize("helloWorld"), "HelloWorld");
        assert_eq!(capitalize("ALLCAPS"), "ALLCAPS");
        assert_eq!(capitalize("a"), "A");
    }

    #[test]
    fn sanitize_identifier___replaces_invalid_characters() {
        assert_eq!(sanitize_identifier("Sample.User"), "Sample_User");
        assert_eq!(sanitize_identifier("content-type"), "content_type");
        assert_eq!(sanitize_identifier("a b"), "a_b");
    }

    #[test]
    fn sanitize_identifier___prefixes_leading_digit() {
        assert_eq!(sanitize_identifier("3d"), "_3d");
    }

    #[test]
    fn sanitize_identifier___empty___becomes_underscore() {
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn is_cpp_identifier___accepts_and_rejects() {
        assert!(is_cpp_identifier("value"));
        assert!(is_cpp_identifier("_x1"));
        assert!(!is_cpp_identifier("1x"));
        assert!(!is_cpp_identifier("a-b"));
        assert!(!is_cpp_identifier(""));
    }

    #[test]
    fn member_name___escapes_keywords() {
        assert_eq!(member_name("class"), "class_");
        assert_eq!(member_name("default"), "default_");
        assert_eq!(member_name("name"), "name");
    }

    #[test]
    fn alias_struct_name___module_qualified_alias___is_kept() {
        assert_eq!(alias_struct_name("Sample", "Sample.User"), "Sample_User");
    }

    #[test]
    fn alias_struct_name___bare_alias___gets_module_prefix() {
        assert_eq!(alias_struct_name("Sample", "User"), "Sample_User");
        assert_eq!(alias_struct_name("Sample", "SampleUser"), "Sample_SampleUser");
    }

    #[test]
    fn alias_struct_name___alias_equal_to_module___is_prefixed() {
        assert_eq!(alias_struct_name("Sample", "Sample"), "Sample_Sample");
    }

    #[test]
    fn path_struct_name___method_return___concatenates_pascal_segments() {
        let path = vec!["getUser".to_string(), "returnType".to_string()];

        assert_eq!(path_struct_name("Sample", &path), "Sample_GetUserReturnType");
    }

    #[test]
    fn path_struct_name___nested_property_and_element() {
        let path = vec![
            "draw".to_string(),
            "points".to_string(),
            ELEMENT_SEGMENT.to_string(),
        ];

        assert_eq!(path_struct_name("Sample", &path), "Sample_DrawPointsElement");
    }

    #[test]
    fn suffixed_name___appends_attempt() {
        assert_eq!(suffixed_name("Sample_Point", 2), "Sample_Point_2");
    }

    #[test]
    fn include_guard___uppercases_module() {
        assert_eq!(include_guard("STRUCTGEN", "Sample"), "STRUCTGEN_SAMPLE_H");
        assert_eq!(include_guard("RN", "my-module"), "RN_MY_MODULE_H");
    }
}
