//! File name policy: single-component validation, extension handling and
//! collision suffixes.

use std::path::{Component, Path};

use crate::{FiledropError, Result};

/// Check that `name` is exactly one normal path component.
///
/// Rejects the empty string, `.` and `..`, anything containing `/`, `\` or
/// NUL, and anything the platform would parse as more than one component.
pub fn validate_file_name(name: &str) -> Result<()> {
    let invalid = || FiledropError::InvalidName(name.to_string());

    if name.is_empty() || name == "." || name == ".." {
        return Err(invalid());
    }
    if name.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(invalid()),
    }
}

/// Split a name into base and extension.
///
/// The extension starts at the last `.` and keeps the dot, unless that dot is
/// the first character (`.hidden` has no extension).
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Build the `n`-th collision candidate: `base(n)ext`.
pub fn suffixed_name(name: &str, n: u32) -> String {
    let (base, ext) = split_extension(name);
    format!("{base}({n}){ext}")
}

/// Reduce a client-supplied upload name to its last path component.
///
/// Some browsers send a full local path. Both separators are honored no
/// matter which platform the server runs on.
pub fn client_file_name(raw: &str) -> Result<String> {
    let last = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    validate_file_name(last)?;
    Ok(last.to_string())
}

/// Compute the target of a rename.
///
/// Any extension on `new_name` is dropped and the extension of `original` is
/// appended, so `("report.pdf", "final.txt")` becomes `final.pdf`.
pub fn renamed_file_name(original: &str, new_name: &str) -> Result<String> {
    validate_file_name(new_name)?;

    let (_, ext) = split_extension(original);
    let (new_base, _) = split_extension(new_name);

    let target = format!("{new_base}{ext}");
    validate_file_name(&target)?;
    Ok(target)
}
