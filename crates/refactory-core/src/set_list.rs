//! Paths of the rule sets bundled with the crate.

/// `mysql_*` calls to their `mysqli_*` counterparts.
pub const MYSQL_TO_MYSQLI: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sets/mysql-to-mysqli.json");

/// Legacy API upgrade. Includes [`MYSQL_TO_MYSQLI`].
pub const LEGACY_UPGRADE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sets/legacy-upgrade.json");

/// Remove leftover debugging calls.
pub const DEBUG_CLEANUP: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sets/debug-cleanup.json");

/// Every bundled set as `(name, path)`.
pub const ALL: &[(&str, &str)] = &[
    ("mysql-to-mysqli", MYSQL_TO_MYSQLI),
    ("legacy-upgrade", LEGACY_UPGRADE),
    ("debug-cleanup", DEBUG_CLEANUP),
];

/// Path of a bundled set by name.
pub fn find(name: &str) -> Option<&'static str> {
    ALL.iter()
        .find(|(set, _)| *set == name)
        .map(|(_, path)| *path)
}
