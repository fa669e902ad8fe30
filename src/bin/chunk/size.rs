//! Byte sizes with K, M and G suffixes

use cmdflag::FlagType;
use regex::Regex;
use std::sync::LazyLock;

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*([kmg]?)(?:i?b)?\s*$").expect("size pattern is valid")
});

const UNITS: [(u64, &str); 3] = [(1 << 30, "G"), (1 << 20, "M"), (1 << 10, "K")];

/// A number of bytes, written `512`, `4K`, `1M` or `2G`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let caps = SIZE_RE
            .captures(raw)
            .ok_or_else(|| "expected a number with an optional K, M or G suffix".to_string())?;
        let n: u64 = caps[1].parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
        let unit = match caps[2].to_ascii_uppercase().as_str() {
            "K" => 1 << 10,
            "M" => 1 << 20,
            "G" => 1 << 30,
            _ => 1,
        };
        n.checked_mul(unit)
            .map(ByteSize)
            .ok_or_else(|| "value out of range".to_string())
    }
}

impl FlagType for ByteSize {
    const TYPE_NAME: &'static str = "size";

    fn parse_flag(raw: &str) -> Result<Self, String> {
        ByteSize::parse(raw)
    }

    fn format_flag(&self) -> String {
        for (unit, suffix) in UNITS {
            if self.0 != 0 && self.0 % unit == 0 {
                return format!("{}{}", self.0 / unit, suffix);
            }
        }
        self.0.to_string()
    }
}
