use crate::info::{Define, ProjectInfo};
use crate::parser::{logical_lines, split_assignment};
use std::fs;
use std::path::Path;

/// Harvest `DEFS`/`*INCLUDES`/`*CFLAGS`/`*CXXFLAGS`/`*CPPFLAGS` assignments
/// from the generated `Makefile` next to a `Makefile.am`, if one exists.
///
/// This pass is best-effort and runs even when the `Makefile.am` parse
/// failed; a missing generated `Makefile` is silently skipped.
pub(crate) fn harvest_generated_makefile(directory: &Path, info: &mut ProjectInfo) {
    let path = directory.join("Makefile");
    let Ok(contents) = fs::read_to_string(&path) else {
        return;
    };
    tracing::debug!(makefile = %path.display(), "harvesting generated Makefile flags");

    for line in logical_lines(&contents) {
        if line.starts_with('\t') || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, raw_values)) = split_assignment(&line) else {
            continue;
        };
        let tokens = reglue_flag_values(split_shell_words(raw_values));

        if key == "DEFS" {
            for token in &tokens {
                if let Some(define) = token
                    .strip_prefix("-D")
                    .and_then(Define::from_token)
                {
                    info.defines.insert(define);
                }
            }
        } else if key.ends_with("INCLUDES") {
            for token in &tokens {
                let body = token.strip_prefix("-I").unwrap_or(token);
                if let Some(path) = include_path_from(body, directory) {
                    info.push_include_path(path);
                }
            }
        } else if key.ends_with("CPPFLAGS") {
            for token in tokens {
                // Preprocessor flags that are neither a define nor an
                // include carry no information for the code model.
                let _ = classify(token, directory, info);
            }
        } else if key.ends_with("CXXFLAGS") {
            for token in tokens {
                if let Some(flag) = classify(token, directory, info) {
                    info.push_cxx_flag(flag);
                }
            }
        } else if key.ends_with("CFLAGS") {
            for token in tokens {
                if let Some(flag) = classify(token, directory, info) {
                    info.push_c_flag(flag);
                }
            }
        }
    }
}

/// First-match-wins classification: define, then include, then plain flag.
///
/// Returns the token back when it is a plain flag; define and include
/// tokens are recorded on `info` directly (unresolvable ones are dropped).
fn classify(token: String, directory: &Path, info: &mut ProjectInfo) -> Option<String> {
    if let Some(body) = token.strip_prefix("-D") {
        if let Some(define) = Define::from_token(body) {
            info.defines.insert(define);
        }
        return None;
    }
    if let Some(body) = token.strip_prefix("-I") {
        if let Some(path) = include_path_from(body, directory) {
            info.push_include_path(path);
        }
        return None;
    }
    Some(token)
}

/// Resolve the body of a `-I` token against the makefile's directory.
///
/// The literal value `.` means the directory itself; other relative values
/// are joined onto it. Unresolved `$(...)` references yield nothing.
fn include_path_from(body: &str, directory: &Path) -> Option<String> {
    let body = body.trim();
    if body.is_empty() || body.contains("$(") {
        return None;
    }
    if body == "." {
        return Some(directory.to_string_lossy().to_string());
    }
    let candidate = Path::new(body);
    if candidate.is_absolute() {
        Some(body.to_string())
    } else {
        Some(directory.join(candidate).to_string_lossy().to_string())
    }
}

/// Split a flag line the way a POSIX shell would: whitespace separates
/// words, single quotes are literal, double quotes honor backslash escapes,
/// and a bare backslash escapes the next character.
pub(crate) fn split_shell_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                in_word = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                if matches!(escaped, '"' | '\\' | '$' | '`') {
                                    current.push(escaped);
                                } else {
                                    current.push('\\');
                                    current.push(escaped);
                                }
                            }
                        }
                        _ => current.push(inner),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => {
                in_word = true;
                current.push(ch);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Re-attach a flag that the shell split from its value (`-D FOO` becomes
/// `-DFOO`) so classification sees one token per argument.
pub(crate) fn reglue_flag_values(words: Vec<String>) -> Vec<String> {
    const GLUED: &[&str] = &["-D", "-U", "-I"];
    let mut glued = Vec::with_capacity(words.len());
    let mut iter = words.into_iter();
    while let Some(word) = iter.next() {
        if GLUED.contains(&word.as_str()) {
            if let Some(value) = iter.next() {
                glued.push(format!("{word}{value}"));
                continue;
            }
        }
        glued.push(word);
    }
    glued
}
