//! Synthetic value primitives backing the recipe variants.
//!
//! Thin adapter over the `fake` crate plus `rand`/`chrono` for ranges and
//! timestamps. Every function threads the caller's RNG so a seeded engine
//! produces reproducible documents.

use chrono::{DateTime, Duration, TimeZone, Utc};
use fake::Fake;
use fake::faker::address::en::{CountryCode, CountryName};
use fake::faker::filesystem::en::FileExtension;
use fake::faker::internet::en::{DomainSuffix, FreeEmail, Username};
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use rand::Rng;
use rand::seq::IndexedRandom;

const PAST_WINDOW_DAYS: i64 = 3650;

const MALE_FIRST_NAMES: &[&str] = &[
    "James", "Liam", "Noah", "Oliver", "Elijah", "Lucas", "Mason", "Ethan", "Henry", "Leo",
    "Arthur", "Miguel",
];
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Olivia", "Emma", "Amelia", "Sophia", "Isabella", "Mia", "Charlotte", "Luna", "Alice", "Nora",
    "Helena", "Clara",
];

const POST_WORDS_EN: &[&str] = &[
    "today", "really", "great", "coffee", "morning", "weekend", "finally", "thinking", "about",
    "this", "new", "project", "love", "time", "work", "everyone", "best", "never", "always",
    "good", "little", "things", "happy", "sunset",
];
const POST_WORDS_PT_BR: &[&str] = &[
    "hoje", "muito", "bom", "cafe", "manha", "fim", "semana", "finalmente", "pensando", "sobre",
    "isso", "novo", "projeto", "amo", "tempo", "trabalho", "todos", "melhor", "nunca", "sempre",
    "legal", "coisas", "feliz", "praia",
];

/// Locales supported by locale-aware variants. Anything unrecognized falls
/// back to the default silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocaleKey {
    En,
    PtBr,
}

impl LocaleKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" | "en_US" | "en-US" => Some(Self::En),
            "pt" | "pt_BR" | "pt-BR" => Some(Self::PtBr),
            _ => None,
        }
    }

    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::En)
    }
}

/// Closed gender enumeration accepted by the name variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

pub fn boolean<R: Rng>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}

pub fn integer_in<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.random_range(min..=max)
}

pub fn float_in<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if min == max {
        return min;
    }
    rng.random_range(min..=max)
}

/// Lorem text with a word count drawn uniformly from `min..=max`.
pub fn words<R: Rng>(rng: &mut R, min: i64, max: i64) -> String {
    let count = rng.random_range(min..=max).max(0) as usize;
    let mut words = Vec::with_capacity(count);
    for _ in 0..count {
        words.push(Word().fake_with_rng::<String, _>(rng));
    }
    words.join(" ")
}

pub fn numeric_string<R: Rng>(rng: &mut R, min_len: i64, max_len: i64, leading_zeros: bool) -> String {
    let len = rng.random_range(min_len..=max_len).max(0) as usize;
    let mut digits = String::with_capacity(len);
    for index in 0..len {
        let digit = if index == 0 && !leading_zeros && len > 1 {
            rng.random_range(1..=9)
        } else {
            rng.random_range(0..=9)
        };
        digits.push(char::from(b'0' + digit as u8));
    }
    digits
}

pub fn url_domain<R: Rng>(rng: &mut R) -> String {
    let host = Word().fake_with_rng::<String, _>(rng).to_lowercase();
    let suffix = DomainSuffix().fake_with_rng::<String, _>(rng);
    format!("{host}.{suffix}")
}

pub fn url<R: Rng>(rng: &mut R, allow_numbers: bool) -> String {
    let domain = url_domain(rng);
    let segment_count = rng.random_range(1..=3);
    let mut segments = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
        if allow_numbers && rng.random_bool(0.5) {
            segments.push(rng.random_range(0..=9999_u32).to_string());
        } else {
            segments.push(Word().fake_with_rng::<String, _>(rng).to_lowercase());
        }
    }
    format!("https://{domain}/{}", segments.join("/"))
}

pub fn username<R: Rng>(rng: &mut R) -> String {
    Username().fake_with_rng::<String, _>(rng)
}

pub fn email<R: Rng>(rng: &mut R) -> String {
    FreeEmail().fake_with_rng::<String, _>(rng)
}

pub fn gender<R: Rng>(rng: &mut R) -> &'static str {
    if rng.random_bool(0.5) {
        Gender::Male.as_str()
    } else {
        Gender::Female.as_str()
    }
}

pub fn biography<R: Rng>(rng: &mut R) -> String {
    Sentence(8..16).fake_with_rng::<String, _>(rng)
}

pub fn first_name<R: Rng>(rng: &mut R, gender: Option<Gender>) -> String {
    match gender {
        // `fake` has no gender parameter, so gendered picks come from
        // curated lists.
        Some(Gender::Male) => pick_str(MALE_FIRST_NAMES, rng),
        Some(Gender::Female) => pick_str(FEMALE_FIRST_NAMES, rng),
        None => FirstName().fake_with_rng::<String, _>(rng),
    }
}

pub fn last_name<R: Rng>(rng: &mut R) -> String {
    LastName().fake_with_rng::<String, _>(rng)
}

pub fn full_name<R: Rng>(rng: &mut R, gender: Option<Gender>) -> String {
    match gender {
        Some(_) => format!("{} {}", first_name(rng, gender), last_name(rng)),
        None => Name().fake_with_rng::<String, _>(rng),
    }
}

pub fn country<R: Rng>(rng: &mut R) -> String {
    CountryName().fake_with_rng::<String, _>(rng)
}

pub fn country_code<R: Rng>(rng: &mut R) -> String {
    CountryCode().fake_with_rng::<String, _>(rng)
}

pub fn image_url<R: Rng>(rng: &mut R) -> String {
    let seed: u32 = rng.random_range(0..=99999);
    format!("https://picsum.photos/seed/{seed}/640/480")
}

pub fn file_name<R: Rng>(rng: &mut R) -> String {
    let stem = Word().fake_with_rng::<String, _>(rng).to_lowercase();
    let extension = FileExtension().fake_with_rng::<String, _>(rng);
    format!("{stem}.{extension}")
}

/// Opaque identifier: a v4 UUID built from RNG bytes so seeded runs stay
/// reproducible.
pub fn opaque_id<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0_u8; 16];
    rng.fill(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    uuid::Uuid::from_bytes(bytes).to_string()
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

pub fn timestamp_between<R: Rng>(rng: &mut R, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let seconds = rng.random_range(from.timestamp()..=to.timestamp());
    format_timestamp(timestamp_from_seconds(seconds, from))
}

/// Default "past" semantics: a timestamp within the trailing ten years.
pub fn timestamp_past<R: Rng>(rng: &mut R) -> String {
    let now = Utc::now();
    let offset = rng.random_range(0..=PAST_WINDOW_DAYS * 86_400);
    format_timestamp(now - Duration::seconds(offset))
}

/// Timestamp within `days` before the anchor, inclusive of the anchor.
/// Saturating arithmetic keeps extreme windows panic-free.
pub fn timestamp_before<R: Rng>(rng: &mut R, anchor: DateTime<Utc>, days: i64) -> String {
    let window = days.max(0).saturating_mul(86_400);
    let offset = rng.random_range(0..=window);
    let seconds = anchor.timestamp().saturating_sub(offset);
    format_timestamp(timestamp_from_seconds(seconds, anchor))
}

/// Timestamp within `days` after the anchor, inclusive of the anchor.
pub fn timestamp_after<R: Rng>(rng: &mut R, anchor: DateTime<Utc>, days: i64) -> String {
    let window = days.max(0).saturating_mul(86_400);
    let offset = rng.random_range(0..=window);
    let seconds = anchor.timestamp().saturating_add(offset);
    format_timestamp(timestamp_from_seconds(seconds, anchor))
}

/// Locale-aware post body with independent Bernoulli trials for hashtag and
/// link injection.
pub fn social_media_post<R: Rng>(
    rng: &mut R,
    locale: LocaleKey,
    min_words: i64,
    max_words: i64,
    hashtag_probability: f64,
    link_probability: f64,
) -> String {
    let source = match locale {
        LocaleKey::En => POST_WORDS_EN,
        LocaleKey::PtBr => POST_WORDS_PT_BR,
    };
    let count = rng.random_range(min_words..=max_words).max(1) as usize;
    let mut words = Vec::with_capacity(count + 2);
    for _ in 0..count {
        words.push(pick_str(source, rng));
    }
    if rng.random_bool(hashtag_probability) {
        words.push(format!("#{}", pick_str(source, rng)));
    }
    if rng.random_bool(link_probability) {
        words.push(url(rng, false));
    }
    words.join(" ")
}

fn pick_str<R: Rng>(source: &[&str], rng: &mut R) -> String {
    source.choose(rng).map(|s| s.to_string()).unwrap_or_default()
}

fn timestamp_from_seconds(seconds: i64, fallback: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or(fallback)
}
