//! Typed setting values and raw string conversion
//!
//! Every bindable property declares a [`ValueKind`]. Raw strings coming out of
//! the composite dictionary are converted with [`ValueKind::parse`], which is
//! total and deterministic: the same input always yields the same value or the
//! same failure.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Declared type of a bindable property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Bool,
	Int32,
	Int64,
	UInt16,
	UInt32,
	UInt64,
	Float64,
	String,
	Duration,
}

impl ValueKind {
	/// Convert a raw string into a value of this kind
	///
	/// Numbers and booleans are trimmed before parsing; strings are taken
	/// verbatim. Integers are base-10 and out-of-range input is rejected
	/// rather than truncated. Durations use `HH:MM:SS` with optional
	/// fractional seconds.
	///
	/// # Examples
	///
	/// ```
	/// use fig_conf::settings::value::{SettingValue, ValueKind};
	/// use std::time::Duration;
	///
	/// assert_eq!(ValueKind::Int64.parse(" 400 "), Some(SettingValue::Int64(400)));
	/// assert_eq!(ValueKind::Int32.parse("4.5"), None);
	/// assert_eq!(
	///     ValueKind::Duration.parse("00:20:00"),
	///     Some(SettingValue::Duration(Duration::from_secs(1200)))
	/// );
	/// ```
	pub fn parse(self, raw: &str) -> Option<SettingValue> {
		let trimmed = raw.trim();
		match self {
			Self::Bool => parse_bool(trimmed).map(SettingValue::Bool),
			Self::Int32 => trimmed.parse().ok().map(SettingValue::Int32),
			Self::Int64 => trimmed.parse().ok().map(SettingValue::Int64),
			Self::UInt16 => trimmed.parse().ok().map(SettingValue::UInt16),
			Self::UInt32 => trimmed.parse().ok().map(SettingValue::UInt32),
			Self::UInt64 => trimmed.parse().ok().map(SettingValue::UInt64),
			Self::Float64 => trimmed.parse().ok().map(SettingValue::Float64),
			Self::String => Some(SettingValue::String(raw.to_string())),
			Self::Duration => parse_duration(trimmed).map(SettingValue::Duration),
		}
	}

	/// Type name used in diagnostics
	pub fn name(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::Int32 => "i32",
			Self::Int64 => "i64",
			Self::UInt16 => "u16",
			Self::UInt32 => "u32",
			Self::UInt64 => "u64",
			Self::Float64 => "f64",
			Self::String => "String",
			Self::Duration => "Duration",
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A typed value held by a settings object
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
	Bool(bool),
	Int32(i32),
	Int64(i64),
	UInt16(u16),
	UInt32(u32),
	UInt64(u64),
	Float64(f64),
	String(String),
	Duration(Duration),
}

impl SettingValue {
	/// Kind of this value
	pub fn kind(&self) -> ValueKind {
		match self {
			Self::Bool(_) => ValueKind::Bool,
			Self::Int32(_) => ValueKind::Int32,
			Self::Int64(_) => ValueKind::Int64,
			Self::UInt16(_) => ValueKind::UInt16,
			Self::UInt32(_) => ValueKind::UInt32,
			Self::UInt64(_) => ValueKind::UInt64,
			Self::Float64(_) => ValueKind::Float64,
			Self::String(_) => ValueKind::String,
			Self::Duration(_) => ValueKind::Duration,
		}
	}

	/// Whether two values are indistinguishable
	///
	/// Floats compare by bit pattern, so a `NaN` equals itself and `0.0`
	/// differs from `-0.0`.
	pub fn same_as(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Float64(a), Self::Float64(b)) => a.to_bits() == b.to_bits(),
			_ => self == other,
		}
	}
}

impl fmt::Display for SettingValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(v) => write!(f, "{}", v),
			Self::Int32(v) => write!(f, "{}", v),
			Self::Int64(v) => write!(f, "{}", v),
			Self::UInt16(v) => write!(f, "{}", v),
			Self::UInt32(v) => write!(f, "{}", v),
			Self::UInt64(v) => write!(f, "{}", v),
			Self::Float64(v) => write!(f, "{}", v),
			Self::String(v) => f.write_str(v),
			Self::Duration(v) => f.write_str(&format_duration(*v)),
		}
	}
}

impl Serialize for SettingValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Bool(v) => serializer.serialize_bool(*v),
			Self::Int32(v) => serializer.serialize_i32(*v),
			Self::Int64(v) => serializer.serialize_i64(*v),
			Self::UInt16(v) => serializer.serialize_u16(*v),
			Self::UInt32(v) => serializer.serialize_u32(*v),
			Self::UInt64(v) => serializer.serialize_u64(*v),
			Self::Float64(v) => serializer.serialize_f64(*v),
			Self::String(v) => serializer.serialize_str(v),
			Self::Duration(v) => serializer.serialize_str(&format_duration(*v)),
		}
	}
}

/// Rust types that can be bound to a property
///
/// `Default` supplies the value of an optional property declared without an
/// explicit default.
pub trait SettingKind: Sized + Default {
	/// Kind this type binds to
	const KIND: ValueKind;

	fn into_value(self) -> SettingValue;

	fn from_value(value: &SettingValue) -> Option<Self>;
}

macro_rules! impl_setting_kind {
	($ty:ty, $variant:ident) => {
		impl SettingKind for $ty {
			const KIND: ValueKind = ValueKind::$variant;

			fn into_value(self) -> SettingValue {
				SettingValue::$variant(self)
			}

			fn from_value(value: &SettingValue) -> Option<Self> {
				match value {
					SettingValue::$variant(v) => Some(v.clone()),
					_ => None,
				}
			}
		}
	};
}

impl_setting_kind!(bool, Bool);
impl_setting_kind!(i32, Int32);
impl_setting_kind!(i64, Int64);
impl_setting_kind!(u16, UInt16);
impl_setting_kind!(u32, UInt32);
impl_setting_kind!(u64, UInt64);
impl_setting_kind!(f64, Float64);
impl_setting_kind!(String, String);
impl_setting_kind!(Duration, Duration);

fn parse_bool(raw: &str) -> Option<bool> {
	if raw.eq_ignore_ascii_case("true") {
		Some(true)
	} else if raw.eq_ignore_ascii_case("false") {
		Some(false)
	} else {
		None
	}
}

fn parse_digits(raw: &str) -> Option<u64> {
	if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	raw.parse().ok()
}

/// Parse an `HH:MM:SS[.fraction]` duration
///
/// Hours are unbounded; minutes and seconds must be below 60. At most nine
/// fractional digits are accepted.
pub fn parse_duration(raw: &str) -> Option<Duration> {
	let mut parts = raw.split(':');
	let (hours, minutes, seconds) = (parts.next()?, parts.next()?, parts.next()?);
	if parts.next().is_some() {
		return None;
	}

	let hours = parse_digits(hours)?;
	let minutes = parse_digits(minutes)?;
	let (whole, fraction) = match seconds.split_once('.') {
		Some((whole, fraction)) => (whole, Some(fraction)),
		None => (seconds, None),
	};
	let seconds = parse_digits(whole)?;
	if minutes >= 60 || seconds >= 60 {
		return None;
	}

	let nanos = match fraction {
		Some(fraction) => {
			if fraction.is_empty()
				|| fraction.len() > 9
				|| !fraction.bytes().all(|b| b.is_ascii_digit())
			{
				return None;
			}
			format!("{:0<9}", fraction).parse::<u32>().ok()?
		}
		None => 0,
	};

	let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
	Some(Duration::new(total, nanos))
}

/// Render a duration in the same `HH:MM:SS[.fraction]` form `parse_duration` reads
pub fn format_duration(duration: Duration) -> String {
	let total = duration.as_secs();
	let mut out = format!(
		"{:02}:{:02}:{:02}",
		total / 3600,
		(total % 3600) / 60,
		total % 60
	);
	let nanos = duration.subsec_nanos();
	if nanos != 0 {
		let fraction = format!("{:09}", nanos);
		out.push('.');
		out.push_str(fraction.trim_end_matches('0'));
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("00:20:00", Duration::from_secs(1200))]
	#[case("1:02:03", Duration::from_secs(3723))]
	#[case("100:00:00", Duration::from_secs(360_000))]
	#[case("00:00:01.5", Duration::from_millis(1500))]
	fn test_parse_duration_accepts(#[case] raw: &str, #[case] expected: Duration) {
		assert_eq!(parse_duration(raw), Some(expected));
	}

	#[rstest]
	#[case("")]
	#[case("20:00")]
	#[case("00:60:00")]
	#[case("00:00:60")]
	#[case("00:00:00:00")]
	#[case("-1:00:00")]
	#[case("00:00:01.")]
	#[case("aa:bb:cc")]
	fn test_parse_duration_rejects(#[case] raw: &str) {
		assert_eq!(parse_duration(raw), None);
	}

	#[test]
	fn test_format_duration() {
		assert_eq!(format_duration(Duration::from_secs(1200)), "00:20:00");
		assert_eq!(format_duration(Duration::from_millis(3_601_250)), "01:00:01.25");
	}

	#[rstest]
	#[case(ValueKind::Int32, "2147483648")]
	#[case(ValueKind::UInt16, "-1")]
	#[case(ValueKind::UInt16, "65536")]
	#[case(ValueKind::Int64, "12abc")]
	#[case(ValueKind::Int64, "0x10")]
	#[case(ValueKind::Bool, "yes")]
	#[case(ValueKind::Float64, "one")]
	fn test_parse_rejects_malformed(#[case] kind: ValueKind, #[case] raw: &str) {
		assert_eq!(kind.parse(raw), None);
	}

	#[test]
	fn test_parse_keeps_strings_verbatim() {
		assert_eq!(
			ValueKind::String.parse("  padded "),
			Some(SettingValue::String("  padded ".to_string()))
		);
	}

	#[test]
	fn test_parse_bool_is_case_insensitive() {
		assert_eq!(ValueKind::Bool.parse("TRUE"), Some(SettingValue::Bool(true)));
		assert_eq!(ValueKind::Bool.parse(" False"), Some(SettingValue::Bool(false)));
	}

	#[test]
	fn test_setting_kind_round_trip_through_value() {
		let value = 42_i64.into_value();
		assert_eq!(value.kind(), ValueKind::Int64);
		assert_eq!(i64::from_value(&value), Some(42));
		assert_eq!(i32::from_value(&value), None);
	}

	#[test]
	fn test_same_as_compares_floats_by_bits() {
		let nan = ValueKind::Float64.parse("NaN").unwrap();
		assert!(nan.same_as(&nan.clone()));
		assert!(!SettingValue::Float64(0.0).same_as(&SettingValue::Float64(-0.0)));
		assert!(SettingValue::Int32(1).same_as(&SettingValue::Int32(1)));
		assert!(!SettingValue::Int32(1).same_as(&SettingValue::Int64(1)));
	}

	#[test]
	fn test_serialize_duration_as_text() {
		let json = serde_json::to_string(&SettingValue::Duration(Duration::from_secs(90))).unwrap();
		assert_eq!(json, "\"00:01:30\"");
	}
}
