//! Field type library
//!
//! A `Field` describes one attribute of an entity schema: its semantic kind,
//! an optional fixed default, an optional enumerated choice set and a
//! required marker. Every field knows how to synthesize a random valid value
//! via [`Field::synthesize`], with a fixed precedence:
//!
//! 1. a declared default is returned verbatim;
//! 2. otherwise a random element of the declared choice set;
//! 3. otherwise a type-appropriate random value.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

use crate::error::Result;
use crate::registry::Registry;
use crate::schema::Attr;

/// Character classes available to string synthesis.
///
/// Generated strings are deliberately short: the remote product stores most
/// string columns in 255-byte fields and rejects or truncates overlong
/// values, and short values keep failure logs readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Alpha,
    Numeric,
    Alphanumeric,
    Latin1,
    Utf8,
    Cjk,
}

impl Charset {
    fn sample(self, rng: &mut impl Rng) -> char {
        match self {
            Charset::Alpha => {
                let c = rng.gen_range(b'a'..=b'z');
                if rng.gen_bool(0.5) {
                    c.to_ascii_uppercase() as char
                } else {
                    c as char
                }
            }
            Charset::Numeric => rng.gen_range(b'0'..=b'9') as char,
            Charset::Alphanumeric => {
                if rng.gen_bool(0.3) {
                    Charset::Numeric.sample(rng)
                } else {
                    Charset::Alpha.sample(rng)
                }
            }
            Charset::Latin1 => char::from_u32(rng.gen_range(0x00C0..=0x00FF))
                .unwrap_or('\u{00E9}'),
            Charset::Cjk => char::from_u32(rng.gen_range(0x4E00..=0x9FFF))
                .unwrap_or('\u{4E2D}'),
            Charset::Utf8 => match rng.gen_range(0..4) {
                0 => Charset::Alpha.sample(rng),
                1 => Charset::Latin1.sample(rng),
                2 => char::from_u32(rng.gen_range(0x0391..=0x03C9)).unwrap_or('\u{03B1}'),
                _ => Charset::Cjk.sample(rng),
            },
        }
    }
}

/// The closed set of attribute kinds an entity field can have.
///
/// Relationship kinds carry the *name* of the target schema rather than a
/// direct reference; targets are resolved through [`Registry::builtin`] so
/// mutually referential schemas need no declaration ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Boolean,
    Integer { min: i64, max: i64 },
    Float,
    String { max_len: usize, charsets: Vec<Charset> },
    Email,
    Url,
    IpAddr,
    MacAddr,
    Date,
    DateTime,
    List,
    OneToOne { target: &'static str },
    OneToMany { target: &'static str },
}

/// A typed attribute descriptor. Immutable once declared on a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub choices: Option<Vec<Value>>,
    pub required: bool,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            default: None,
            choices: None,
            required: false,
        }
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Integer with a broad default range.
    pub fn integer() -> Self {
        Self::integer_range(1, 10_000_000)
    }

    pub fn integer_range(min: i64, max: i64) -> Self {
        Self::new(FieldKind::Integer { min, max })
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    /// String of up to 15 UTF-8 characters.
    pub fn string() -> Self {
        Self::string_with(15, &[Charset::Utf8])
    }

    pub fn string_with(max_len: usize, charsets: &[Charset]) -> Self {
        Self::new(FieldKind::String {
            max_len,
            charsets: charsets.to_vec(),
        })
    }

    /// Short alphabetic string, for identifiers the product is picky about.
    pub fn name() -> Self {
        Self::string_with(10, &[Charset::Alpha])
    }

    pub fn email() -> Self {
        Self::new(FieldKind::Email)
    }

    pub fn url() -> Self {
        Self::new(FieldKind::Url)
    }

    pub fn ip() -> Self {
        Self::new(FieldKind::IpAddr)
    }

    pub fn mac() -> Self {
        Self::new(FieldKind::MacAddr)
    }

    pub fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    pub fn datetime() -> Self {
        Self::new(FieldKind::DateTime)
    }

    pub fn list() -> Self {
        Self::new(FieldKind::List)
    }

    pub fn one_to_one(target: &'static str) -> Self {
        Self::new(FieldKind::OneToOne { target })
    }

    pub fn one_to_many(target: &'static str) -> Self {
        Self::new(FieldKind::OneToMany { target })
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_choices<V: Into<Value>>(mut self, choices: Vec<V>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Name of the target schema if this is a relationship field.
    pub fn relation_target(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::OneToOne { target } | FieldKind::OneToMany { target } => Some(target),
            _ => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.relation_target().is_some()
    }

    /// Produce a value for this field.
    ///
    /// A declared default always wins, then a random pick from the declared
    /// choice set, then kind-appropriate random generation. Repeated calls
    /// may yield different values; there are no side effects.
    pub fn synthesize(&self) -> Result<Attr> {
        if let Some(default) = &self.default {
            return Ok(Attr::Value(default.clone()));
        }
        let mut rng = rand::thread_rng();
        if let Some(choices) = &self.choices {
            let picked = choices
                .choose(&mut rng)
                .cloned()
                .unwrap_or(Value::Null);
            return Ok(Attr::Value(picked));
        }
        let value = match &self.kind {
            FieldKind::Boolean => Value::Bool(rng.gen()),
            FieldKind::Integer { min, max } => Value::from(rng.gen_range(*min..=*max)),
            FieldKind::Float => {
                serde_json::Number::from_f64(rng.gen::<f64>() * 10_000.0)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            FieldKind::String { max_len, charsets } => {
                Value::String(random_string(&mut rng, *max_len, charsets))
            }
            FieldKind::Email => Value::String(random_email(&mut rng)),
            FieldKind::Url => Value::String(random_url(&mut rng)),
            FieldKind::IpAddr => Value::String(random_ipv4(&mut rng)),
            FieldKind::MacAddr => Value::String(random_mac(&mut rng)),
            FieldKind::Date => Value::String(random_date(&mut rng).format("%Y-%m-%d").to_string()),
            FieldKind::DateTime => Value::String(
                random_datetime(&mut rng)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
            ),
            FieldKind::List => {
                let n = rng.gen_range(1..=3);
                Value::Array(
                    (0..n)
                        .map(|_| Value::String(random_string(&mut rng, 8, &[Charset::Alpha])))
                        .collect(),
                )
            }
            FieldKind::OneToOne { target } => {
                let instance = Registry::builtin().instance(target)?;
                return Ok(Attr::One(Box::new(instance)));
            }
            FieldKind::OneToMany { target } => {
                let instance = Registry::builtin().instance(target)?;
                return Ok(Attr::Many(vec![instance]));
            }
        };
        Ok(Attr::Value(value))
    }
}

fn random_string(rng: &mut impl Rng, max_len: usize, charsets: &[Charset]) -> String {
    let charset = charsets
        .choose(rng)
        .copied()
        .unwrap_or(Charset::Alphanumeric);
    let len = rng.gen_range(1..=max_len.max(1));
    (0..len).map(|_| charset.sample(rng)).collect()
}

fn random_email(rng: &mut impl Rng) -> String {
    let tlds = ["com", "org", "net", "biz", "info"];
    format!(
        "{}@{}.{}",
        random_string(rng, 8, &[Charset::Alpha]).to_lowercase(),
        random_string(rng, 8, &[Charset::Alpha]).to_lowercase(),
        tlds.choose(rng).unwrap_or(&"com"),
    )
}

fn random_url(rng: &mut impl Rng) -> String {
    let schemes = ["http", "https", "ftp"];
    let tlds = ["com", "org", "net"];
    format!(
        "{}://{}.{}",
        schemes.choose(rng).unwrap_or(&"http"),
        random_string(rng, 10, &[Charset::Alpha]).to_lowercase(),
        tlds.choose(rng).unwrap_or(&"com"),
    )
}

fn random_ipv4(rng: &mut impl Rng) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=254),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254),
    )
}

fn random_mac(rng: &mut impl Rng) -> String {
    (0..6)
        .map(|_| format!("{:02x}", rng.gen_range(0..=255u32)))
        .collect::<Vec<_>>()
        .join(":")
}

fn random_date(rng: &mut impl Rng) -> NaiveDate {
    let today = chrono::Local::now().date_naive();
    today + Duration::days(rng.gen_range(-5 * 365..=5 * 365))
}

fn random_datetime(rng: &mut impl Rng) -> NaiveDateTime {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(rng.gen_range(0..86_400), 0)
        .unwrap_or(NaiveTime::MIN);
    random_date(rng).and_time(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_default_wins_over_choices() {
        let field = Field::string()
            .with_default("fixed")
            .with_choices(vec!["a", "b", "c"]);
        for _ in 0..50 {
            assert_eq!(field.synthesize().unwrap(), Attr::Value(json!("fixed")));
        }
    }

    #[test]
    fn test_choices_are_respected() {
        let field = Field::string().with_choices(vec!["x", "y", "z"]);
        for _ in 0..100 {
            let attr = field.synthesize().unwrap();
            let Attr::Value(Value::String(s)) = attr else {
                panic!("expected a string value");
            };
            assert!(["x", "y", "z"].contains(&s.as_str()));
        }
    }

    #[test]
    fn test_string_respects_max_len() {
        let field = Field::string_with(7, &[Charset::Utf8]);
        for _ in 0..100 {
            let Attr::Value(Value::String(s)) = field.synthesize().unwrap() else {
                panic!("expected a string value");
            };
            let len = s.chars().count();
            assert!((1..=7).contains(&len), "bad length {len}: {s:?}");
        }
    }

    #[test_case(Charset::Numeric; "numeric")]
    #[test_case(Charset::Alpha; "alpha")]
    #[test_case(Charset::Alphanumeric; "alphanumeric")]
    fn test_charset_membership(charset: Charset) {
        let allowed = |c: char| match charset {
            Charset::Numeric => c.is_ascii_digit(),
            Charset::Alpha => c.is_ascii_alphabetic(),
            Charset::Alphanumeric => c.is_ascii_alphanumeric(),
            _ => true,
        };
        let field = Field::string_with(12, &[charset]);
        for _ in 0..20 {
            let Attr::Value(Value::String(s)) = field.synthesize().unwrap() else {
                panic!("expected a string value");
            };
            assert!(s.chars().all(allowed), "{s:?}");
        }
    }

    #[test]
    fn test_integer_range() {
        let field = Field::integer_range(5, 9);
        for _ in 0..50 {
            let Attr::Value(Value::Number(n)) = field.synthesize().unwrap() else {
                panic!("expected a number");
            };
            let n = n.as_i64().unwrap();
            assert!((5..=9).contains(&n));
        }
    }

    #[test]
    fn test_email_shape() {
        let Attr::Value(Value::String(s)) = Field::email().synthesize().unwrap() else {
            panic!("expected a string value");
        };
        let (local, domain) = s.split_once('@').expect("email has an @");
        assert!(!local.is_empty());
        assert!(domain.contains('.'));
    }

    #[test]
    fn test_ipv4_shape() {
        let Attr::Value(Value::String(s)) = Field::ip().synthesize().unwrap() else {
            panic!("expected a string value");
        };
        let octets: Vec<_> = s.split('.').collect();
        assert_eq!(octets.len(), 4);
        for octet in octets {
            octet.parse::<u8>().expect("octet in range");
        }
    }

    #[test]
    fn test_mac_shape() {
        let Attr::Value(Value::String(s)) = Field::mac().synthesize().unwrap() else {
            panic!("expected a string value");
        };
        let parts: Vec<_> = s.split(':').collect();
        assert_eq!(parts.len(), 6);
        for part in parts {
            u8::from_str_radix(part, 16).expect("hex byte");
        }
    }

    #[test]
    fn test_boolean_default_honored() {
        let field = Field::boolean().with_default(true);
        assert_eq!(field.synthesize().unwrap(), Attr::Value(json!(true)));
    }
}
