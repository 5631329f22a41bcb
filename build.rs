// build.rs
//
// Generates the `t!` macro used for the engine placeholder labels and CLI messages.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

fn main() {
    // --- 1. Pick the language: `lang_*` features first, then MENUSET_LANG, then English ---
    let mut feature_langs: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    feature_langs.sort();

    let lang = match feature_langs.first() {
        Some(first) => {
            if feature_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    feature_langs, first
                );
            }
            first.clone()
        }
        None => env::var("MENUSET_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    };

    println!("cargo:rustc-env=MENUSET_LANG_EFFECTIVE={}", lang);
    println!("cargo:rerun-if-env-changed=MENUSET_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    // --- 2. English is always loaded; the selected language overrides its keys ---
    let mut translations = load_locale(FALLBACK_LANG)
        .unwrap_or_else(|| panic!("Missing fallback locale: locales/{}.toml", FALLBACK_LANG));

    if lang != FALLBACK_LANG {
        match load_locale(&lang) {
            Some(specific) => translations.extend(specific),
            None => println!(
                "cargo:warning=Locale 'locales/{}.toml' not found. Falling back to '{}'.",
                lang, FALLBACK_LANG
            ),
        }
    }

    // --- 3. Emit one macro arm per key, plus a compile-time error for unknown keys ---
    let mut macro_code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in &translations {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!("    (\"{}\") => {{ \"{}\" }};\n", key, escaped));
    }
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    macro_code.push('}');

    let out_dir = env::var("OUT_DIR").expect("cargo always sets OUT_DIR for build scripts");
    let dest_path = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest_path, macro_code).expect("Failed to write generated translations");
}

/// Reads `locales/<lang>.toml` into a sorted key/value map.
fn load_locale(lang: &str) -> Option<BTreeMap<String, String>> {
    let path = format!("locales/{}.toml", lang);
    let content = fs::read_to_string(&path).ok()?;
    let parsed = toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));
    Some(parsed)
}
