//! Platform name to CMake architecture lookup.
//!
//! Visual Studio generators take the target architecture through `-A`.
//! The table is injectable so hosts with unusual platform tags can extend
//! it from configuration.

use std::collections::BTreeMap;

use serde::Serialize;

/// Lookup from platform name (`win-amd64`) to `-A` value (`x64`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchTable {
    entries: BTreeMap<String, String>,
}

impl ArchTable {
    /// An empty table.
    pub fn empty() -> Self {
        ArchTable {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace one entry.
    pub fn with(mut self, plat_name: impl Into<String>, arch: impl Into<String>) -> Self {
        self.insert(plat_name, arch);
        self
    }

    pub fn insert(&mut self, plat_name: impl Into<String>, arch: impl Into<String>) {
        self.entries.insert(plat_name.into(), arch.into());
    }

    /// Overlay entries from another source; `overrides` wins.
    pub fn extend<K, V>(&mut self, overrides: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (plat, arch) in overrides {
            self.insert(plat, arch);
        }
    }

    pub fn get(&self, plat_name: &str) -> Option<&str> {
        self.entries.get(plat_name).map(String::as_str)
    }

    /// Known platform names, sorted.
    pub fn platforms(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl Default for ArchTable {
    /// CMake's Visual Studio platform names.
    fn default() -> Self {
        ArchTable::empty()
            .with("win32", "Win32")
            .with("win-amd64", "x64")
            .with("win-arm32", "ARM")
            .with("win-arm64", "ARM64")
    }
}

/// Platform tag for the running host, in the `win-amd64` / `linux-x86_64`
/// form the table is keyed by.
pub fn host_plat_name() -> String {
    plat_name_for(std::env::consts::OS, std::env::consts::ARCH)
}

/// Platform tag for an OS/arch pair as reported by `std::env::consts`.
pub fn plat_name_for(os: &str, arch: &str) -> String {
    match (os, arch) {
        ("windows", "x86") => "win32".to_string(),
        ("windows", "x86_64") => "win-amd64".to_string(),
        ("windows", "arm") => "win-arm32".to_string(),
        ("windows", "aarch64") => "win-arm64".to_string(),
        ("windows", other) => format!("win-{}", other),
        ("macos", "aarch64") => "macosx-arm64".to_string(),
        ("macos", other) => format!("macosx-{}", other),
        (os, arch) => format!("{}-{}", os, arch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = ArchTable::default();
        assert_eq!(table.get("win32"), Some("Win32"));
        assert_eq!(table.get("win-amd64"), Some("x64"));
        assert_eq!(table.get("win-arm32"), Some("ARM"));
        assert_eq!(table.get("win-arm64"), Some("ARM64"));
        assert_eq!(table.get("linux-x86_64"), None);
    }

    #[test]
    fn test_overrides_win() {
        let mut table = ArchTable::default();
        table.extend([("win-amd64", "AMD64"), ("win-riscv64", "RISCV64")]);
        assert_eq!(table.get("win-amd64"), Some("AMD64"));
        assert_eq!(table.get("win-riscv64"), Some("RISCV64"));
        assert_eq!(table.platforms().len(), 5);
    }

    #[test]
    fn test_plat_names() {
        assert_eq!(plat_name_for("windows", "x86_64"), "win-amd64");
        assert_eq!(plat_name_for("windows", "aarch64"), "win-arm64");
        assert_eq!(plat_name_for("windows", "x86"), "win32");
        assert_eq!(plat_name_for("linux", "x86_64"), "linux-x86_64");
        assert_eq!(plat_name_for("macos", "aarch64"), "macosx-arm64");
    }
}
