use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::{Key, RecordError};

/// Focus rating on the 1 (very distracted) to 5 (highly focused) scale.
#[derive(Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FocusRating(u8);

impl FocusRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(&self) -> u8 {
        self.0
    }

    /// The rating a participant selects by pressing a digit key.
    pub fn from_key(key: Key) -> Option<Self> {
        let digit = key.as_char().to_digit(10)?;
        Self::try_from(digit as u8).ok()
    }

    /// Keys accepted at the self-report prompt.
    pub fn keys() -> Vec<Key> {
        (Self::MIN..=Self::MAX)
            .filter_map(|d| char::from_digit(d as u32, 10))
            .map(Key::new)
            .collect()
    }
}

impl TryFrom<u8> for FocusRating {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(FocusRating(value))
        } else {
            Err(RecordError::InvalidRating(value))
        }
    }
}

/// Outcome of the post-condition self-report prompt.
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum SelfReport {
    Rated(FocusRating),
    NoResponse,
}

impl SelfReport {
    pub const NO_RESPONSE: &'static str = "No Response";

    pub fn from_key(key: Option<Key>) -> Self {
        key.and_then(FocusRating::from_key)
            .map_or(SelfReport::NoResponse, SelfReport::Rated)
    }

    pub fn rating(&self) -> Option<FocusRating> {
        match self {
            SelfReport::Rated(r) => Some(*r),
            SelfReport::NoResponse => None,
        }
    }
}

impl fmt::Display for SelfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfReport::Rated(r) => write!(f, "{}", r.value()),
            SelfReport::NoResponse => f.write_str(Self::NO_RESPONSE),
        }
    }
}

impl Serialize for SelfReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelfReport::Rated(r) => serializer.serialize_u8(r.value()),
            SelfReport::NoResponse => serializer.serialize_str(Self::NO_RESPONSE),
        }
    }
}

impl<'de> Deserialize<'de> for SelfReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SelfReportVisitor)
    }
}

struct SelfReportVisitor;

impl Visitor<'_> for SelfReportVisitor {
    type Value = SelfReport;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer in 1..=5 or {:?}", SelfReport::NO_RESPONSE)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SelfReport, E> {
        u8::try_from(v)
            .ok()
            .and_then(|v| FocusRating::try_from(v).ok())
            .map(SelfReport::Rated)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SelfReport, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SelfReport, E> {
        if v == SelfReport::NO_RESPONSE {
            Ok(SelfReport::NoResponse)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}
