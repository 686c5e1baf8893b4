// SPDX-License-Identifier: GPL-3.0-only

//! Disk path validation
//!
//! A disk path is exactly one directory segment under a datastore root. The
//! rules are a small ordered list of predicates over the raw string; the
//! first violation wins. Plain spaces and `%` are allowed because the remote
//! naming scheme escapes them, the characters in [`FORBIDDEN_CHARACTERS`]
//! are not.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Longest accepted disk path, in characters.
pub const MAX_PATH_LENGTH: usize = 80;

/// Characters that would split the path into more than one segment.
pub const PATH_SEPARATORS: &[char] = &['/', '\\'];

/// Characters the remote naming scheme cannot round-trip.
pub const FORBIDDEN_CHARACTERS: &[char] = &['!', '?', '&', '^', '$', '#'];

/// Why a candidate disk path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPath {
    #[error("disk path is missing")]
    Missing,

    #[error("disk path is empty")]
    Empty,

    #[error("disk path is {length} characters long, limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("disk path {0:?} refers to a directory relative to the datastore root")]
    RelativeReference(String),

    #[error("disk path {path:?} contains path separator {separator:?}")]
    Separator { path: String, separator: char },

    #[error("disk path {path:?} contains drive separator ':'")]
    DriveSeparator { path: String },

    #[error("disk path {path:?} contains a line break")]
    LineBreak { path: String },

    #[error("disk path {path:?} contains forbidden character {character:?}")]
    ForbiddenCharacter { path: String, character: char },
}

type Check = fn(&str) -> Result<(), InvalidPath>;

const CHECKS: &[Check] = &[
    check_not_empty,
    check_length,
    check_relative_reference,
    check_separators,
    check_drive_separator,
    check_line_break,
    check_forbidden_characters,
];

/// Validate a candidate disk path, returning it unchanged when acceptable.
pub fn validate(path: Option<&str>) -> Result<&str, InvalidPath> {
    let path = path.ok_or(InvalidPath::Missing)?;
    CHECKS.iter().try_for_each(|check| check(path))?;
    Ok(path)
}

fn check_not_empty(path: &str) -> Result<(), InvalidPath> {
    if path.is_empty() {
        return Err(InvalidPath::Empty);
    }
    Ok(())
}

fn check_length(path: &str) -> Result<(), InvalidPath> {
    let length = path.chars().count();
    if length > MAX_PATH_LENGTH {
        return Err(InvalidPath::TooLong {
            length,
            limit: MAX_PATH_LENGTH,
        });
    }
    Ok(())
}

fn check_relative_reference(path: &str) -> Result<(), InvalidPath> {
    if path == "." || path == ".." {
        return Err(InvalidPath::RelativeReference(path.to_string()));
    }
    Ok(())
}

fn check_separators(path: &str) -> Result<(), InvalidPath> {
    match path.chars().find(|c| PATH_SEPARATORS.contains(c)) {
        Some(separator) => Err(InvalidPath::Separator {
            path: path.to_string(),
            separator,
        }),
        None => Ok(()),
    }
}

fn check_drive_separator(path: &str) -> Result<(), InvalidPath> {
    if path.contains(':') {
        return Err(InvalidPath::DriveSeparator {
            path: path.to_string(),
        });
    }
    Ok(())
}

fn check_line_break(path: &str) -> Result<(), InvalidPath> {
    if path.contains(['\n', '\r']) {
        return Err(InvalidPath::LineBreak {
            path: path.to_string(),
        });
    }
    Ok(())
}

fn check_forbidden_characters(path: &str) -> Result<(), InvalidPath> {
    match path.chars().find(|c| FORBIDDEN_CHARACTERS.contains(c)) {
        Some(character) => Err(InvalidPath::ForbiddenCharacter {
            path: path.to_string(),
            character,
        }),
        None => Ok(()),
    }
}

/// A disk path that passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiskPath(String);

impl DiskPath {
    pub fn parse(raw: &str) -> Result<Self, InvalidPath> {
        validate(Some(raw)).map(|path| Self(path.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for DiskPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DiskPath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_paths_are_rejected() {
        assert_eq!(validate(None), Err(InvalidPath::Missing));
        assert_eq!(validate(Some("")), Err(InvalidPath::Empty));
    }

    #[test]
    fn length_limit_is_inclusive() {
        let at_limit = "a".repeat(MAX_PATH_LENGTH);
        assert_eq!(validate(Some(at_limit.as_str())), Ok(at_limit.as_str()));

        let over_limit = "a".repeat(MAX_PATH_LENGTH + 1);
        assert_eq!(
            validate(Some(over_limit.as_str())),
            Err(InvalidPath::TooLong {
                length: 81,
                limit: MAX_PATH_LENGTH
            })
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let wide = "é".repeat(MAX_PATH_LENGTH);
        assert!(validate(Some(wide.as_str())).is_ok());
    }

    #[test]
    fn separators_are_rejected_anywhere() {
        for path in [
            "\\bosh_vms",
            "/bosh_vms",
            "nested/folder",
            "trailing/",
            "name space with slash/",
            "exciting!/folder",
        ] {
            assert!(
                matches!(validate(Some(path)), Err(InvalidPath::Separator { .. })),
                "{path:?} should be rejected as multi-segment"
            );
        }
    }

    #[test]
    fn relative_references_are_rejected() {
        assert_eq!(
            validate(Some("..")),
            Err(InvalidPath::RelativeReference("..".to_string()))
        );
        assert!(validate(Some(".")).is_err());
        assert!(validate(Some("...")).is_ok());
        assert!(validate(Some(".hidden")).is_ok());
    }

    #[test]
    fn drive_separator_is_rejected() {
        assert!(matches!(
            validate(Some("colon:name")),
            Err(InvalidPath::DriveSeparator { .. })
        ));
        // Separator check runs first for drive-rooted paths.
        assert!(matches!(
            validate(Some("C:\\\\vms")),
            Err(InvalidPath::Separator { separator: '\\', .. })
        ));
    }

    #[test]
    fn line_breaks_are_rejected() {
        assert!(matches!(
            validate(Some("foo\n")),
            Err(InvalidPath::LineBreak { .. })
        ));
        assert!(matches!(
            validate(Some("foo\rbar")),
            Err(InvalidPath::LineBreak { .. })
        ));
    }

    #[test]
    fn forbidden_characters_are_rejected() {
        for character in FORBIDDEN_CHARACTERS {
            let path = format!("disk{character}path");
            assert_eq!(
                validate(Some(path.as_str())),
                Err(InvalidPath::ForbiddenCharacter {
                    path: path.clone(),
                    character: *character
                })
            );
        }

        assert!(matches!(
            validate(Some("whatthef&^%$#")),
            Err(InvalidPath::ForbiddenCharacter { character: '&', .. })
        ));
        assert!(validate(Some("questionable?/folder")).is_err());
    }

    #[test]
    fn spaces_and_percent_are_allowed() {
        for path in [
            "disk_path_spec_playground",
            "bagels_and_lox",
            "valid %",
            "100%",
            "name with spaces",
            " leading space",
        ] {
            assert_eq!(validate(Some(path)), Ok(path));
        }
    }

    #[test]
    fn disk_path_parses_only_valid_input() {
        let path: DiskPath = "valid %".parse().expect("valid path");
        assert_eq!(path.as_str(), "valid %");
        assert_eq!(path.to_string(), "valid %");
        assert!(DiskPath::parse("trailing/").is_err());
    }
}
