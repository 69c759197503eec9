//! Kubernetes resource quantities (`100m`, `1.5Gi`, `2e3`) and their units.

use std::fmt;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::CoreError;

/// Largest value whose milli form still fits in an `i64`.
const MAX_MILLI_VALUE: i64 = i64::MAX / 1000;

/// Exact decimal form of a quantity: `digits * 10^exp10 * 2^exp2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuantity {
    digits: i128,
    exp10: i32,
    exp2: u32,
}

impl ParsedQuantity {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidQuantity(s.to_string());
        let s = s.trim();

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let number_end = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(number_end);

        let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let mut digits: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let d = c.to_digit(10).ok_or_else(invalid)?;
            digits = digits
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(d)))
                .ok_or_else(invalid)?;
        }
        let frac_len = i32::try_from(frac_part.len()).map_err(|_| invalid())?;

        let (exp10, exp2) = parse_suffix(suffix).ok_or_else(invalid)?;
        Ok(Self {
            digits: if negative { -digits } else { digits },
            exp10: exp10 - frac_len,
            exp2,
        })
    }

    /// Integer value rounded away from zero, saturating at `i64` bounds.
    pub fn value(&self) -> i64 {
        self.scaled(0)
    }

    /// Value in thousandths rounded away from zero.
    pub fn milli_value(&self) -> i64 {
        self.scaled(3)
    }

    pub fn as_f64(&self) -> f64 {
        self.digits as f64 * 10f64.powi(self.exp10) * 2f64.powi(self.exp2 as i32)
    }

    /// Fractional cores for CPU-like quantities; large values fall back to the integer form.
    pub fn as_cores(&self) -> f64 {
        let v = self.value();
        if v > MAX_MILLI_VALUE {
            return v as f64;
        }
        self.milli_value() as f64 / 1000.0
    }

    fn scaled(&self, extra_exp10: i32) -> i64 {
        let saturate = if self.digits < 0 { i64::MIN } else { i64::MAX };
        let Some(mut n) = 1i128
            .checked_shl(self.exp2)
            .filter(|_| self.exp2 < 127)
            .and_then(|m| self.digits.checked_mul(m))
        else {
            return saturate;
        };

        let exp = self.exp10 + extra_exp10;
        if exp >= 0 {
            for _ in 0..exp {
                match n.checked_mul(10) {
                    Some(v) => n = v,
                    None => return saturate,
                }
            }
        } else {
            let Some(div) = 10i128.checked_pow(exp.unsigned_abs()) else {
                return if n == 0 { 0 } else if n < 0 { -1 } else { 1 };
            };
            let q = n / div;
            n = if n % div == 0 { q } else if n < 0 { q - 1 } else { q + 1 };
        }
        i64::try_from(n).unwrap_or(saturate)
    }
}

fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let binary = match suffix {
        "Ki" => Some(10),
        "Mi" => Some(20),
        "Gi" => Some(30),
        "Ti" => Some(40),
        "Pi" => Some(50),
        "Ei" => Some(60),
        _ => None,
    };
    if let Some(exp2) = binary {
        return Some((0, exp2));
    }

    let decimal = match suffix {
        "" => Some(0),
        "n" => Some(-9),
        "u" => Some(-6),
        "m" => Some(-3),
        "k" => Some(3),
        "M" => Some(6),
        "G" => Some(9),
        "T" => Some(12),
        "P" => Some(15),
        "E" => Some(18),
        _ => None,
    };
    if let Some(exp10) = decimal {
        return Some((exp10, 0));
    }

    let exponent = suffix.strip_prefix(['e', 'E'])?;
    let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    exponent.parse::<i32>().ok().map(|e| (e, 0))
}

impl fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

/// Access to the parsed form of a Kubernetes [`Quantity`].
pub trait QuantityExt {
    fn parsed(&self) -> Result<ParsedQuantity, CoreError>;
}

impl QuantityExt for Quantity {
    fn parsed(&self) -> Result<ParsedQuantity, CoreError> {
        ParsedQuantity::parse(&self.0)
    }
}

/// Unit label attached to resource request/limit/capacity samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUnit {
    Core,
    Byte,
    Integer,
}

impl ResourceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceUnit::Core => "core",
            ResourceUnit::Byte => "byte",
            ResourceUnit::Integer => "integer",
        }
    }

    /// Unit of a resource name, or `None` for resources that are not reported.
    pub fn of(resource: &str) -> Option<Self> {
        match resource {
            "cpu" => Some(ResourceUnit::Core),
            "memory" | "storage" | "ephemeral-storage" => Some(ResourceUnit::Byte),
            "pods" => Some(ResourceUnit::Integer),
            r if r.starts_with("hugepages-") || r.starts_with("attachable-volumes-") => {
                Some(ResourceUnit::Byte)
            }
            r if is_extended_resource_name(r) => Some(ResourceUnit::Integer),
            _ => None,
        }
    }

    /// Sample value of a quantity in this unit.
    pub fn value_of(&self, q: &ParsedQuantity) -> f64 {
        match self {
            ResourceUnit::Core => q.as_cores(),
            ResourceUnit::Byte | ResourceUnit::Integer => q.value() as f64,
        }
    }
}

impl fmt::Display for ResourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-prefixed resource such as `nvidia.com/gpu`.
pub fn is_extended_resource_name(name: &str) -> bool {
    let native = !name.contains('/') || name.contains("kubernetes.io/");
    if native || name.starts_with("requests.") {
        return false;
    }
    let quota_name = format!("requests.{name}");
    match quota_name.split_once('/') {
        Some((prefix, local)) => is_dns_subdomain(prefix) && is_qualified_local_name(local),
        None => is_qualified_local_name(&quota_name),
    }
}

fn is_dns_subdomain(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|part| {
            !part.is_empty()
                && part.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
                && part.ends_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        })
}

fn is_qualified_local_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && s.starts_with(|c: char| c.is_ascii_alphanumeric())
        && s.ends_with(|c: char| c.is_ascii_alphanumeric())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
