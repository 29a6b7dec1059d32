//! Canonical query-string encoding for API requests.
//!
//! [`Query`] keeps insertion order and only admits scalars or flat lists of scalars.
//! [`build_query_string`] drops unset and empty values, repeats the key for list elements,
//! and returns `None` when nothing survives so callers never append a bare `?`.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
// self
use crate::_prelude::*;

/// Everything outside the RFC 3986 unreserved set (`A-Z a-z 0-9 - _ . ~`).
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Single query value.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryScalar {
	/// Text emitted as-is.
	Text(String),
	/// Integer emitted in decimal form.
	Integer(i64),
	/// Floating-point number; non-finite values are kept as `NaN`/`Infinity`/`-Infinity`.
	Number(f64),
	/// Boolean emitted as `true`/`false`.
	Bool(bool),
	/// Value that was never set; always dropped.
	Unset,
}
impl QueryScalar {
	/// Returns the query representation, or `None` for [`QueryScalar::Unset`].
	pub fn stringify(&self) -> Option<String> {
		match self {
			Self::Text(value) => Some(value.clone()),
			Self::Integer(value) => Some(value.to_string()),
			Self::Number(value) => Some(format_number(*value)),
			Self::Bool(value) => Some(value.to_string()),
			Self::Unset => None,
		}
	}
}
impl From<&str> for QueryScalar {
	fn from(value: &str) -> Self {
		Self::Text(value.to_owned())
	}
}
impl From<String> for QueryScalar {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&String> for QueryScalar {
	fn from(value: &String) -> Self {
		Self::Text(value.clone())
	}
}
impl From<bool> for QueryScalar {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for QueryScalar {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<f32> for QueryScalar {
	fn from(value: f32) -> Self {
		Self::Number(value.into())
	}
}
impl<T> From<Option<T>> for QueryScalar
where
	T: Into<QueryScalar>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Unset, Into::into)
	}
}

macro_rules! impl_integer_scalar {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for QueryScalar {
				fn from(value: $ty) -> Self {
					Self::Integer(value.into())
				}
			}
		)*
	};
}

impl_integer_scalar!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_wide_integer_scalar {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for QueryScalar {
				/// Values outside the `i64` range keep their exact decimal text.
				fn from(value: $ty) -> Self {
					i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
				}
			}
		)*
	};
}

impl_wide_integer_scalar!(i128, isize, u64, u128, usize);

/// Value stored under one query key.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryValue {
	/// Single value emitted as one pair.
	Scalar(QueryScalar),
	/// Flat list emitted as one pair per surviving element.
	List(Vec<QueryScalar>),
}
impl<T> From<T> for QueryValue
where
	T: Into<QueryScalar>,
{
	fn from(value: T) -> Self {
		Self::Scalar(value.into())
	}
}
impl<T> From<Vec<T>> for QueryValue
where
	T: Into<QueryScalar>,
{
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

/// Insertion-ordered query mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query(Vec<(String, QueryValue)>);
impl Query {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an entry, keeping insertion order.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
		self.push(key, value);

		self
	}

	/// Appends an entry in place.
	pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
		self.0.push((key.into(), value.into()));
	}

	/// Returns `true` when no entries were added.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}
}
impl<K, V> FromIterator<(K, V)> for Query
where
	K: Into<String>,
	V: Into<QueryValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

/// Percent-encodes a query component, including `! ' ( ) *`, with uppercase hex digits.
pub fn encode_component(value: &str) -> String {
	percent_encoding::utf8_percent_encode(value, COMPONENT).to_string()
}

/// Serializes `query` into `k=v&k=v` form, or `None` when no pair survives.
///
/// Keys are emitted verbatim; only values are percent-encoded.
pub fn build_query_string(query: &Query) -> Option<String> {
	let mut pairs = Vec::new();

	for (key, value) in query.iter() {
		match value {
			QueryValue::Scalar(scalar) => push_pair(&mut pairs, key, scalar),
			QueryValue::List(items) =>
				for item in items {
					push_pair(&mut pairs, key, item);
				},
		}
	}

	if pairs.is_empty() { None } else { Some(pairs.join("&")) }
}

/// Appends `?<query>` to `path` when the query yields at least one pair.
pub fn append_query(path: &str, query: Option<&Query>) -> String {
	match query.and_then(build_query_string) {
		Some(encoded) => format!("{path}?{encoded}"),
		None => path.to_owned(),
	}
}

fn push_pair(pairs: &mut Vec<String>, key: &str, scalar: &QueryScalar) {
	let Some(value) = scalar.stringify() else {
		return;
	};

	if value.is_empty() {
		return;
	}

	pairs.push(format!("{key}={}", encode_component(&value)));
}

fn format_number(value: f64) -> String {
	if value.is_nan() {
		"NaN".into()
	} else if value.is_infinite() {
		if value.is_sign_positive() { "Infinity".into() } else { "-Infinity".into() }
	} else if value == 0. {
		// Negative zero renders as `0`.
		"0".into()
	} else if (1e-6..1e21).contains(&value.abs()) {
		value.to_string()
	} else {
		exponent_form(value)
	}
}

/// Shortest round-trip digits with a signed exponent: `1e+21`, `-2.5e-7`.
fn exponent_form(value: f64) -> String {
	let formatted = format!("{value:e}");

	match formatted.split_once('e') {
		Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
		_ => formatted,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_and_unset_mappings_produce_no_query() {
		assert_eq!(build_query_string(&Query::new()), None);
		assert_eq!(build_query_string(&Query::new().with("a", QueryScalar::Unset)), None);
		assert_eq!(build_query_string(&Query::new().with("a", None::<&str>)), None);
		assert_eq!(append_query("/api/items", Some(&Query::new())), "/api/items");
		assert_eq!(append_query("/api/items", None), "/api/items");
	}

	#[test]
	fn lists_repeat_keys_and_skip_unset_elements() {
		let query = Query::new()
			.with("a", vec![QueryScalar::Integer(1), QueryScalar::Unset, QueryScalar::Integer(2)]);

		assert_eq!(build_query_string(&query).as_deref(), Some("a=1&a=2"));
	}

	#[test]
	fn empty_strings_are_dropped() {
		assert_eq!(build_query_string(&Query::new().with("a", "")), None);
		assert_eq!(
			build_query_string(&Query::new().with("a", "").with("b", "x")).as_deref(),
			Some("b=x")
		);

		let tags = Query::new().with("tags", vec!["", "kept", ""]);

		assert_eq!(build_query_string(&tags).as_deref(), Some("tags=kept"));
	}

	#[test]
	fn component_encoding_escapes_sub_delimiters() {
		assert_eq!(encode_component("a b!'()*"), "a%20b%21%27%28%29%2A");
		assert_eq!(encode_component("safe-_.~"), "safe-_.~");
		assert_eq!(encode_component("é/?&="), "%C3%A9%2F%3F%26%3D");
	}

	#[test]
	fn scalars_stringify_like_query_values() {
		let query = Query::new()
			.with("flag", true)
			.with("off", false)
			.with("count", 3_u32)
			.with("ratio", 1.5)
			.with("whole", 2.0)
			.with("nan", f64::NAN)
			.with("inf", vec![f64::INFINITY, f64::NEG_INFINITY]);

		assert_eq!(
			build_query_string(&query).as_deref(),
			Some("flag=true&off=false&count=3&ratio=1.5&whole=2&nan=NaN&inf=Infinity&inf=-Infinity")
		);
	}

	#[test]
	fn extreme_magnitudes_switch_to_exponent_form() {
		let query = Query::new()
			.with("big", 1e21)
			.with("below", 1e20)
			.with("tiny", 1e-7)
			.with("small", 0.000001)
			.with("neg", -2.5e-7)
			.with("huge", f64::MAX);

		assert_eq!(
			build_query_string(&query).as_deref(),
			Some(
				"big=1e%2B21&below=100000000000000000000&tiny=1e-7&small=0.000001&neg=-2.5e-7&huge=1.7976931348623157e%2B308"
			)
		);
	}

	#[test]
	fn wide_integers_are_accepted() {
		let query = Query::new()
			.with("page", 2_usize)
			.with("offset", 40_u64)
			.with("max", u64::MAX)
			.with("min", i128::MIN);

		assert_eq!(
			build_query_string(&query).as_deref(),
			Some("page=2&offset=40&max=18446744073709551615&min=-170141183460469231731687303715884105728")
		);
		assert_eq!(QueryScalar::from(7_usize), QueryScalar::Integer(7));
		assert_eq!(QueryScalar::from(u64::MAX), QueryScalar::Text("18446744073709551615".into()));
	}

	#[test]
	fn keys_keep_insertion_order_and_pass_through_verbatim() {
		let query: Query = [("z", "1"), ("a b", "2"), ("m", "3")].into_iter().collect();

		assert_eq!(build_query_string(&query).as_deref(), Some("z=1&a b=2&m=3"));
		assert_eq!(append_query("/p", Some(&query)), "/p?z=1&a b=2&m=3");
	}
}
